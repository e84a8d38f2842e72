/*!
# Dagger: Files
*/

use crate::{
	Asset,
	DaggerError,
};
use glob::{
	MatchOptions,
	Pattern,
};
use std::path::{
	Path,
	PathBuf,
};



#[derive(Debug, Clone)]
/// # Source Selection.
///
/// A set of files to pull in, all named relative to a common base.
pub(super) struct Selection {
	/// # Base Directory.
	base: PathBuf,

	/// # Roots to Crawl (Files or Directories).
	roots: Vec<PathBuf>,

	/// # Required Extension (Lowercase, No Dot).
	ext: &'static str,
}

impl Selection {
	/// # New.
	pub(super) fn new<P: Into<PathBuf>>(base: P, ext: &'static str) -> Self {
		Self {
			base: base.into(),
			roots: Vec::new(),
			ext,
		}
	}

	#[must_use]
	/// # With Root.
	///
	/// Add a file or directory (relative to the base) to the search. Missing
	/// roots simply contribute nothing.
	pub(super) fn with_root<P: AsRef<Path>>(mut self, rel: P) -> Self {
		self.roots.push(self.base.join(rel));
		self
	}

	/// # Matches Extension?
	///
	/// The comparison is exact; `app.JS` is not a script.
	fn matches(&self, path: &Path) -> bool {
		path.extension().is_some_and(|e| e == self.ext)
	}

	/// # Root Pattern.
	///
	/// Directories are searched recursively for the extension; anything
	/// else is taken literally.
	fn pattern(&self, root: &Path) -> String {
		let escaped = Pattern::escape(&root.to_string_lossy());
		if root.is_dir() {
			format!("{}/**/*.{}", escaped.trim_end_matches('/'), self.ext)
		}
		else { escaped }
	}

	/// # Gather.
	///
	/// Search the roots and load every matching file, sorted by path so
	/// downstream concatenation is deterministic. Symlinks are followed, but
	/// each file keeps the name it was found under. Hidden files and
	/// directories are skipped.
	///
	/// ## Errors
	///
	/// Unreadable files or directories are errors.
	pub(super) fn gather(&self) -> Result<Vec<Asset>, DaggerError> {
		let options = MatchOptions {
			case_sensitive: true,
			require_literal_separator: true,
			require_literal_leading_dot: true,
		};

		let mut paths: Vec<PathBuf> = Vec::new();
		for root in &self.roots {
			let pattern = self.pattern(root);
			let found = glob::glob_with(&pattern, options)
				.map_err(|e| DaggerError::Pattern(format!("{pattern} ({})", e.msg)))?;
			for p in found {
				let p = p.map_err(|e| DaggerError::Read(e.path().to_path_buf()))?;
				if p.is_file() && self.matches(&p) { paths.push(p); }
			}
		}
		paths.sort();
		paths.dedup();

		paths.into_iter()
			.map(|p| {
				let rel = p.strip_prefix(&self.base)
					.map_err(|_| DaggerError::Read(p.clone()))?
					.to_path_buf();
				let raw = std::fs::read(&p).map_err(|_| DaggerError::Read(p.clone()))?;
				Ok(Asset::new(p, rel, raw))
			})
			.collect()
	}
}



/// # Write Assets.
///
/// Write each asset to the destination directory under its relative path.
/// Writes are atomic; a file is either fully written or not there at all.
///
/// Returns the total number of bytes written.
///
/// ## Errors
///
/// Any failure to create a directory or write a file is an error.
pub(super) fn write_all(dst: &Path, assets: &[Asset]) -> Result<u64, DaggerError> {
	let mut total = 0_u64;
	for asset in assets {
		let path = dst.join(asset.rel());
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)
				.map_err(|_| DaggerError::Write(parent.to_path_buf()))?;
		}
		write_atomic::write_file(&path, asset.contents())
			.map_err(|_| DaggerError::Write(path.clone()))?;
		total += asset.contents().len() as u64;
	}
	Ok(total)
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_gather() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let root = dir.path();
		let client = root.join("client");
		std::fs::create_dir_all(client.join("pages/deep")).expect("Mkdir failed.");
		std::fs::create_dir_all(client.join("styles")).expect("Mkdir failed.");
		std::fs::write(client.join("index.html"), b"<html></html>").expect("Write failed.");
		std::fs::write(client.join("pages/about.html"), b"<p>About</p>").expect("Write failed.");
		std::fs::write(client.join("pages/deep/faq.HTML"), b"<p>FAQ</p>").expect("Write failed.");
		std::fs::write(client.join("pages/notes.txt"), b"nope").expect("Write failed.");
		std::fs::write(client.join("pages/.draft.html"), b"<p>Draft</p>").expect("Write failed.");
		std::fs::write(client.join("styles/a.css"), b"a{}").expect("Write failed.");

		let found = Selection::new(&client, "html")
			.with_root("index.html")
			.with_root("pages")
			.gather()
			.expect("Gather failed.");

		// Extensions are case-sensitive, like the globs they replace.
		let rels: Vec<&Path> = found.iter().map(Asset::rel).collect();
		assert_eq!(rels, [Path::new("index.html"), Path::new("pages/about.html")]);
		assert_eq!(found[1].contents(), b"<p>About</p>");

		// Nothing there is fine.
		let none = Selection::new(root.join("missing"), "js")
			.with_root("scripts")
			.gather()
			.expect("Gather failed.");
		assert!(none.is_empty());
	}

	#[cfg(unix)]
	#[test]
	fn t_gather_symlinks() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let root = dir.path();
		let scripts = root.join("client/scripts");
		let shared = root.join("shared");
		std::fs::create_dir_all(&scripts).expect("Mkdir failed.");
		std::fs::create_dir_all(shared.join("lib")).expect("Mkdir failed.");
		std::fs::write(scripts.join("app.js"), b"let a = 1;").expect("Write failed.");
		std::fs::write(shared.join("util.js"), b"let u = 2;").expect("Write failed.");
		std::fs::write(shared.join("lib/deep.js"), b"let d = 3;").expect("Write failed.");

		// A linked file and a linked directory, both pointing outside the base.
		std::os::unix::fs::symlink(shared.join("util.js"), scripts.join("util.js"))
			.expect("Symlink failed.");
		std::os::unix::fs::symlink(shared.join("lib"), scripts.join("lib"))
			.expect("Symlink failed.");

		let found = Selection::new(root.join("client"), "js")
			.with_root("scripts")
			.gather()
			.expect("Gather failed.");

		let rels: Vec<&Path> = found.iter().map(Asset::rel).collect();
		assert_eq!(
			rels,
			[
				Path::new("scripts/app.js"),
				Path::new("scripts/lib/deep.js"),
				Path::new("scripts/util.js"),
			],
		);
		assert_eq!(found[2].contents(), b"let u = 2;");
	}

	#[test]
	fn t_write_all() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let dst = dir.path().join("dist/client");
		let assets = [
			Asset::new("/x/a.css", "styles/a.css", b"a{}".to_vec()),
			Asset::new("/x/b.css", "styles/sub/b.css", b"b{}".to_vec()),
		];

		assert_eq!(write_all(&dst, &assets), Ok(6));
		assert_eq!(std::fs::read(dst.join("styles/a.css")).ok().as_deref(), Some(&b"a{}"[..]));
		assert_eq!(std::fs::read(dst.join("styles/sub/b.css")).ok().as_deref(), Some(&b"b{}"[..]));
	}
}
