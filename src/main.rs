/*!
# Dagger

Run a static tree of build tasks over a web project's sources.
*/

#![forbid(unsafe_code)]

#![warn(
	clippy::filetype_is_file,
	clippy::integer_division,
	clippy::needless_borrow,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::suboptimal_flops,
	clippy::unneeded_field_pattern,
	macro_use_extern_crate,
	missing_copy_implementations,
	missing_debug_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unreachable_pub,
	unused_crate_dependencies,
	unused_extern_crates,
	unused_import_braces,
)]

#![allow(
	clippy::doc_markdown,
	clippy::redundant_pub_crate,
)]



mod asset;
mod clean;
mod css;
mod err;
mod files;
mod graph;
mod js;
mod layout;
mod mode;
mod pipe;
mod report;
mod sourcemap;
mod tasks;

use argyle::Argument;
use asset::Asset;
use err::DaggerError;
use fyi_msg::Msg;
use graph::TaskGraph;
use mode::Mode;
use report::{
	Finding,
	Severity,
};
use sourcemap::SourceMap;
use std::{
	num::NonZeroUsize,
	path::PathBuf,
	sync::{
		Arc,
		atomic::{
			AtomicBool,
			Ordering::{
				Relaxed,
				SeqCst,
			},
		},
	},
};
use tasks::{
	Settings,
	TASKS,
};



/// # Main.
fn main() {
	match _main() {
		Ok(()) => {},
		Err(e @ (DaggerError::PrintHelp | DaggerError::PrintVersion)) => {
			println!("{e}");
		},
		Err(e) => {
			Msg::error(e.to_string()).eprint();
			std::process::exit(1);
		},
	}
}

#[inline]
/// # Actual Main.
fn _main() -> Result<(), DaggerError> {
	// Parse CLI arguments.
	let args = argyle::args()
		.with_keywords(include!(concat!(env!("OUT_DIR"), "/argyle.rs")));

	let mut configuration: Option<String> = None;
	let mut cwd: Option<PathBuf> = None;
	let mut jobs: Option<NonZeroUsize> = None;
	let mut quiet = false;
	let mut targets: Vec<String> = Vec::new();
	for arg in args {
		match arg {
			Argument::Key("-h" | "--help") => return Err(DaggerError::PrintHelp),
			Argument::Key("--silent") => { quiet = true; },
			Argument::Key("-V" | "--version") => return Err(DaggerError::PrintVersion),

			Argument::KeyWithValue("--configuration", s) => { configuration.replace(s); },
			Argument::KeyWithValue("-C" | "--cwd", s) => { cwd.replace(PathBuf::from(s)); },
			Argument::KeyWithValue("-j" | "--jobs", s) => {
				let n = s.trim().parse::<NonZeroUsize>().map_err(|_| DaggerError::Jobs)?;
				jobs.replace(n);
			},

			Argument::Other(s) =>
				if s.starts_with('-') { return Err(DaggerError::InvalidCli(s)); }
				else { targets.push(s); },
			Argument::InvalidUtf8(s) => return Err(DaggerError::InvalidCli(
				s.to_string_lossy().into_owned()
			)),

			// Nothing else is expected.
			_ => {},
		}
	}
	if targets.is_empty() { targets.push("default".to_owned()); }

	// Figure out where we're working.
	let root = match cwd {
		Some(dir) => std::fs::canonicalize(&dir).map_err(|_| DaggerError::Read(dir))?,
		None => std::env::current_dir().map_err(|_| DaggerError::Read(PathBuf::from(".")))?,
	};

	// Build and validate the plan before touching anything.
	let dag = TaskGraph::new(&TASKS)?;
	dag.check(&targets)?;

	let jobs = jobs.unwrap_or_else(|| std::thread::available_parallelism()
		.unwrap_or(NonZeroUsize::MIN)
	);

	// Set up the killswitch.
	let killed = Arc::new(AtomicBool::new(false));
	sigint(Arc::clone(&killed));

	let settings = Settings::new(root, configuration, quiet);
	let summary = dag.run(&targets, &settings, jobs, quiet, &killed)?;
	summary.result()?;

	if ! quiet {
		let done = summary.completed().len();
		Msg::success(format!(
			"Finished {} task{} in {} ms.",
			done,
			if done == 1 { "" } else { "s" },
			graph::nice_ms(summary.elapsed()),
		))
			.with_newline(true)
			.print();
	}

	Ok(())
}

/// # Hook Up CTRL+C.
///
/// Once stops dispatching new tasks, twice forces immediate shutdown.
fn sigint(killed: Arc<AtomicBool>) {
	let _res = ctrlc::set_handler(move ||
		if killed.compare_exchange(false, true, SeqCst, Relaxed).is_ok() {
			Msg::warning("Stopping after the current task(s) finish…")
				.with_newline(true)
				.eprint();
		}
		else { std::process::exit(1); }
	);
}
