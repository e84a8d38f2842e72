/*!
# Dagger: Tasks

The build is a static tree of named tasks. Each stream of sources gets a
`pre` (clear its output), `transform` (copy in, pipe through, write out), and
`post` (clear its scratch space) step; everything else groups those.
*/

use crate::{
	clean::clean,
	DaggerError,
	files::Selection,
	graph::Task,
	layout::{
		CLIENT,
		INDEX,
		Layout,
		PAGES,
		SCRIPTS,
		SERVER,
		STYLES,
		Tree,
	},
	Mode,
	pipe::{
		Pipeline,
		ScriptOptions,
		StyleOptions,
	},
	report,
};
use dactyl::NiceU64;
use fyi_msg::Msg;
use std::path::{
	Path,
	PathBuf,
};



/// # Server Script Options.
const SERVER_SCRIPTS: ScriptOptions = ScriptOptions {
	lint: true,
	transpile: true,
	minify: false,
	concat_name: None,
};

/// # Client Script Options.
const CLIENT_SCRIPTS: ScriptOptions = ScriptOptions {
	lint: true,
	transpile: true,
	minify: true,
	concat_name: None,
};

/// # Client Style Options.
const CLIENT_STYLES: StyleOptions = StyleOptions {
	lint: true,
	minify: true,
	concat_name: None,
};

/// # The Tasks.
pub(super) static TASKS: [Task<Settings>; 19] = [
	// Main tasks.
	Task::new("default", &[], Some(list)),
	Task::new(
		"build",
		&["scripts:server:post", "scripts:client:post", "pages:post", "styles:post"],
		Some(clean_tmp),
	),
	Task::new("clean", &[], Some(clean_all)),
	Task::new("server", &["scripts:server:post"], None),
	Task::new("client", &["scripts:client:post"], None),
	Task::new("pages", &["pages:post"], None),
	Task::new("styles", &["styles:post"], None),

	// Server-side scripts.
	Task::new("scripts:server:post", &["scripts:server:transform"], Some(server_post)),
	Task::new("scripts:server:transform", &["scripts:server:pre"], Some(server_transform)),
	Task::new("scripts:server:pre", &[], Some(server_pre)),

	// Client-side scripts.
	Task::new("scripts:client:post", &["scripts:client:transform"], Some(client_post)),
	Task::new("scripts:client:transform", &["scripts:client:pre"], Some(client_transform)),
	Task::new("scripts:client:pre", &[], Some(client_pre)),

	// Pages.
	Task::new("pages:post", &["pages:transform"], Some(pages_post)),
	Task::new("pages:transform", &["pages:pre"], Some(pages_transform)),
	Task::new("pages:pre", &[], Some(pages_pre)),

	// Stylesheets.
	Task::new("styles:post", &["styles:transform"], Some(styles_post)),
	Task::new("styles:transform", &["styles:pre"], Some(styles_transform)),
	Task::new("styles:pre", &[], Some(styles_pre)),
];



#[derive(Debug, Clone)]
/// # Settings.
///
/// Everything a task body needs to know about the current run.
pub(super) struct Settings {
	/// # Layout.
	layout: Layout,

	/// # Configuration Name.
	configuration: Option<String>,

	/// # Quiet?
	quiet: bool,
}

impl Settings {
	/// # New.
	pub(super) fn new<P: Into<PathBuf>>(root: P, configuration: Option<String>, quiet: bool)
	-> Self {
		Self {
			layout: Layout::new(root),
			configuration,
			quiet,
		}
	}

	/// # Root.
	pub(super) fn root(&self) -> &Path { self.layout.root() }

	/// # Mode.
	pub(super) fn mode(&self) -> Mode { Mode::resolve(self.configuration.as_deref()) }

	/// # Transform.
	///
	/// Run a pipeline, staging through `tmp/<sub>` and landing in
	/// `dist/<sub>`.
	fn transform(&self, src: Selection, sub: &[&str], pipeline: &Pipeline)
	-> Result<(), DaggerError> {
		let tmp = self.layout.dir(Tree::Tmp, sub);
		let dst = self.layout.dir(Tree::Dist, sub);
		let (files, bytes) = pipeline.execute(&src, &tmp, &dst)?;

		if ! self.quiet {
			Msg::info(format!(
				"Wrote {} file{} ({} bytes) to {}.",
				files,
				if files == 1 { "" } else { "s" },
				NiceU64::from(bytes),
				dst.strip_prefix(self.root()).unwrap_or(dst.as_path()).display(),
			))
				.with_newline(true)
				.print();
		}

		Ok(())
	}
}



/// # List Tasks.
fn list(_: &Settings) -> Result<(), DaggerError> {
	report::print(&listing());
	Ok(())
}

/// # Clean Scratch.
fn clean_tmp(s: &Settings) -> Result<(), DaggerError> {
	clean([s.layout.tree(Tree::Tmp)])
}

/// # Clean Everything Generated.
fn clean_all(s: &Settings) -> Result<(), DaggerError> {
	clean([s.layout.tree(Tree::Dist), s.layout.tree(Tree::Tmp)])
}

fn server_pre(s: &Settings) -> Result<(), DaggerError> {
	clean([s.layout.dir(Tree::Dist, &[SERVER])])
}

fn server_transform(s: &Settings) -> Result<(), DaggerError> {
	s.transform(
		Selection::new(s.layout.dir(Tree::Src, &[SERVER]), "js").with_root(""),
		&[SERVER],
		&Pipeline::scripts(SERVER_SCRIPTS, s.mode()),
	)
}

fn server_post(s: &Settings) -> Result<(), DaggerError> {
	clean([s.layout.dir(Tree::Tmp, &[SERVER])])
}

fn client_pre(s: &Settings) -> Result<(), DaggerError> {
	clean([s.layout.dir(Tree::Dist, &[CLIENT, SCRIPTS])])
}

fn client_transform(s: &Settings) -> Result<(), DaggerError> {
	s.transform(
		Selection::new(s.layout.dir(Tree::Src, &[CLIENT]), "js").with_root(SCRIPTS),
		&[CLIENT],
		&Pipeline::scripts(CLIENT_SCRIPTS, s.mode()),
	)
}

fn client_post(s: &Settings) -> Result<(), DaggerError> {
	clean([s.layout.dir(Tree::Tmp, &[CLIENT, SCRIPTS])])
}

fn pages_pre(s: &Settings) -> Result<(), DaggerError> {
	clean([s.layout.dir(Tree::Dist, &[CLIENT, PAGES])])
}

/// # Pages Transform.
///
/// The index lives at the client root; everything else under `pages/`.
fn pages_transform(s: &Settings) -> Result<(), DaggerError> {
	s.transform(
		Selection::new(s.layout.dir(Tree::Src, &[CLIENT]), "html")
			.with_root(INDEX)
			.with_root(PAGES),
		&[CLIENT],
		&Pipeline::pages(),
	)
}

fn pages_post(s: &Settings) -> Result<(), DaggerError> {
	clean([s.layout.dir(Tree::Tmp, &[CLIENT, PAGES])])
}

fn styles_pre(s: &Settings) -> Result<(), DaggerError> {
	clean([s.layout.dir(Tree::Dist, &[CLIENT, STYLES])])
}

fn styles_transform(s: &Settings) -> Result<(), DaggerError> {
	s.transform(
		Selection::new(s.layout.dir(Tree::Src, &[CLIENT]), "css").with_root(STYLES),
		&[CLIENT],
		&Pipeline::styles(CLIENT_STYLES, s.mode()),
	)
}

fn styles_post(s: &Settings) -> Result<(), DaggerError> {
	clean([s.layout.dir(Tree::Tmp, &[CLIENT, STYLES])])
}

/// # Task Listing.
///
/// Top-level tasks first, then the `:`-namespaced internals, each sorted.
fn listing() -> String {
	let mut main: Vec<&str> = Vec::new();
	let mut sub: Vec<&str> = Vec::new();
	for task in &TASKS {
		if task.name == "default" { continue; }
		if task.name.contains(':') { sub.push(task.name); }
		else { main.push(task.name); }
	}
	main.sort_unstable();
	sub.sort_unstable();

	let mut out = String::new();
	for (title, list) in [("Main Tasks", main), ("Sub Tasks", sub)] {
		out.push_str(title);
		out.push('\n');
		out.push_str(&"-".repeat(30));
		out.push('\n');
		for name in list {
			out.push_str("    ");
			out.push_str(name);
			out.push('\n');
		}
		out.push('\n');
	}
	out
}
