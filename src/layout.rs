/*!
# Dagger: Layout

Every directory the build touches is a fixed suffix hung off one of three
roots, all relative to the invocation directory.
*/

use std::path::{
	Path,
	PathBuf,
};



/// # Scratch Root.
pub(super) const TMP: &str = "tmp";

/// # Distribution Root.
pub(super) const DIST: &str = "dist";

/// # Source Map Subdirectory.
///
/// This is relative to each pipeline's destination.
pub(super) const MAPS: &str = "maps";

/// # Server Subtree.
pub(super) const SERVER: &str = "server";

/// # Client Subtree.
pub(super) const CLIENT: &str = "client";

/// # Scripts Subtree (Client).
pub(super) const SCRIPTS: &str = "scripts";

/// # Pages Subtree (Client).
pub(super) const PAGES: &str = "pages";

/// # Styles Subtree (Client).
pub(super) const STYLES: &str = "styles";

/// # Client Entry Page.
pub(super) const INDEX: &str = "index.html";



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Tree.
///
/// The three mirrored trees.
pub(super) enum Tree {
	/// # Sources (the invocation root itself).
	Src,

	/// # Scratch Space.
	Tmp,

	/// # Distribution.
	Dist,
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Layout.
///
/// This anchors the fixed tree names to an invocation root.
pub(super) struct Layout {
	/// # Invocation Root.
	root: PathBuf,
}

impl Layout {
	/// # New.
	pub(super) fn new<P: Into<PathBuf>>(root: P) -> Self {
		Self { root: root.into() }
	}

	/// # Root.
	pub(super) fn root(&self) -> &Path { &self.root }

	/// # Tree Root.
	pub(super) fn tree(&self, tree: Tree) -> PathBuf {
		match tree {
			Tree::Src => self.root.clone(),
			Tree::Tmp => self.root.join(TMP),
			Tree::Dist => self.root.join(DIST),
		}
	}

	/// # Subtree.
	///
	/// Join any number of fixed suffixes onto a tree root.
	pub(super) fn dir(&self, tree: Tree, parts: &[&str]) -> PathBuf {
		let mut out = self.tree(tree);
		for p in parts { out.push(p); }
		out
	}
}
