/*!
# Dagger: Errors
*/

use fyi_msg::fyi_ansi::{
	ansi,
	csi,
	dim,
};
use std::{
	fmt,
	path::PathBuf,
};



/// # Help Text.
const HELP: &str = concat!(
		r"
     /\
    /  \
    |  |
    |  |      ", csi!(199), "Dagger", ansi!((cornflower_blue) " v", env!("CARGO_PKG_VERSION")), r#"
    |  |      Lint, transpile, bundle, minify, and copy
    |  |      web sources into a distribution tree.
  __|__|__
  \______/
     ||
     ()

USAGE:
    dagger [FLAGS] [OPTIONS] [TASK(S)]...

FLAGS:
    -h, --help        Print help information and exit.
        --silent      Suppress task start/finish chatter.
    -V, --version     Print version information and exit.

OPTIONS:
        --configuration <NAME>
                      Build configuration. "debug" (the default) generates
                      source maps; anything else is a release build.
    -C, --cwd <DIR>   Run as if started in <DIR> rather than the current
                      working directory.
    -j, --jobs <NUM>  Maximum number of tasks to run at once. Defaults to the
                      number of available threads.

ARGS:
    [TASK(S)]...      One or more tasks to run, along with everything they
                      depend on. If omitted, the available tasks are listed.

---

Sources are read from server/ and client/ (scripts/, pages/, styles/ and
index.html), staged in tmp/, and written to dist/.
"#
);



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Errors.
///
/// This is the binary's obligatory custom error type.
pub(super) enum DaggerError {
	Cycle(&'static str),
	Delete(PathBuf),
	Failed(Vec<&'static str>),
	InvalidCli(String),
	Jobs,
	Killed,
	Lint(usize),
	Minify(PathBuf, String),
	Panic,
	Pattern(String),
	PrintHelp,
	PrintVersion,
	Read(PathBuf),
	Syntax(PathBuf, usize, usize),
	UnknownDependency(&'static str, &'static str),
	UnknownTask(String),
	Utf8(PathBuf),
	Write(PathBuf),
}

impl std::error::Error for DaggerError {}

impl fmt::Display for DaggerError {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let prefix = self.as_str();
		match self {
			Self::Cycle(s) => write!(
				f,
				concat!("{} ", dim!("{}")),
				prefix,
				s,
			),
			Self::InvalidCli(s) | Self::Pattern(s) | Self::UnknownTask(s) => write!(
				f,
				concat!("{} ", dim!("{}")),
				prefix,
				s,
			),
			Self::Delete(p) | Self::Read(p) | Self::Utf8(p) | Self::Write(p) => write!(
				f,
				concat!("{} ", dim!("{}")),
				prefix,
				p.display(),
			),
			Self::Failed(names) => write!(
				f,
				concat!("{} ", dim!("{}")),
				prefix,
				names.join(", "),
			),
			Self::Lint(n) => write!(
				f,
				"{} {} lint error{}.",
				prefix,
				n,
				if *n == 1 { "" } else { "s" },
			),
			Self::Minify(p, reason) => write!(
				f,
				concat!("{} ", dim!("{}: {}")),
				prefix,
				p.display(),
				reason,
			),
			Self::Syntax(p, line, col) => write!(
				f,
				concat!("{} ", dim!("{}:{}:{}")),
				prefix,
				p.display(),
				line,
				col,
			),
			Self::UnknownDependency(task, dep) => write!(
				f,
				concat!("{} ", dim!("{} → {}")),
				prefix,
				task,
				dep,
			),
			_ => f.write_str(prefix),
		}
	}
}

impl DaggerError {
	/// # As String Slice.
	pub(super) const fn as_str(&self) -> &'static str {
		match self {
			Self::Cycle(_) => "The task graph has a cycle at:",
			Self::Delete(_) => "Unable to delete:",
			Self::Failed(_) => "One or more tasks failed:",
			Self::InvalidCli(_) => "Invalid/unknown argument:",
			Self::Jobs => "-j/--jobs must be a positive number.",
			Self::Killed => "The process was aborted early.",
			Self::Lint(_) => "Linting failed with",
			Self::Minify(_, _) => "Unable to minify:",
			Self::Panic => "The task panicked.",
			Self::Pattern(_) => "Invalid glob pattern:",
			Self::PrintHelp => HELP,
			Self::PrintVersion => concat!("Dagger v", env!("CARGO_PKG_VERSION")),
			Self::Read(_) => "Unable to read:",
			Self::Syntax(_, _, _) => "Syntax error in",
			Self::UnknownDependency(_, _) => "Unknown task dependency:",
			Self::UnknownTask(_) => "Unknown task:",
			Self::Utf8(_) => "Not valid UTF-8:",
			Self::Write(_) => "Unable to write:",
		}
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_display() {
		assert_eq!(DaggerError::Killed.to_string(), "The process was aborted early.");
		assert_eq!(DaggerError::Lint(1).to_string(), "Linting failed with 1 lint error.");
		assert_eq!(DaggerError::Lint(3).to_string(), "Linting failed with 3 lint errors.");

		let e = DaggerError::UnknownTask("bogus".to_owned()).to_string();
		assert!(e.starts_with("Unknown task: "));
		assert!(e.contains("bogus"));

		let e = DaggerError::Pattern("[".to_owned()).to_string();
		assert!(e.starts_with("Invalid glob pattern: "));

		let e = DaggerError::Failed(vec!["a", "b"]).to_string();
		assert!(e.contains("a, b"));
	}
}
