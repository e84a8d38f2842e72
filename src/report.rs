/*!
# Dagger: Lint Reports
*/

use fyi_msg::fyi_ansi::{
	ansi,
	dim,
	underline,
};
use std::{
	fmt::Write,
	io::Write as _,
	path::Path,
};



#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
/// # Severity.
pub(super) enum Severity {
	/// # Warning.
	Warning,

	/// # Error.
	Error,
}

impl Severity {
	/// # As Str.
	pub(super) const fn as_str(self) -> &'static str {
		match self {
			Self::Warning => "warning",
			Self::Error => "error",
		}
	}

	/// # Colored.
	const fn as_str_pretty(self) -> &'static str {
		match self {
			Self::Warning => ansi!((light_yellow) "warning"),
			Self::Error => ansi!((light_red) "error"),
		}
	}
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Lint Finding.
pub(super) struct Finding {
	/// # Line (One-Based).
	pub(super) line: usize,

	/// # Column (One-Based).
	pub(super) column: usize,

	/// # Severity.
	pub(super) severity: Severity,

	/// # Rule ID.
	///
	/// Parse problems have no rule.
	pub(super) rule: &'static str,

	/// # Message.
	pub(super) message: String,
}

impl Finding {
	/// # New.
	pub(super) fn new<S: Into<String>>(
		line: usize,
		column: usize,
		severity: Severity,
		rule: &'static str,
		message: S,
	) -> Self {
		Self { line, column, severity, rule, message: message.into() }
	}

	/// # Is Error?
	pub(super) fn is_error(&self) -> bool { self.severity == Severity::Error }
}



/// # Print.
///
/// Write to `STDOUT`, quietly giving up if it has gone away (e.g. a closed
/// pipe) rather than panicking.
pub(super) fn print(text: &str) {
	let mut handle = std::io::stdout().lock();
	let _res = handle.write_all(text.as_bytes()).and_then(|()| handle.flush());
}

#[must_use]
/// # Count Errors.
pub(super) fn error_count(findings: &[Finding]) -> usize {
	findings.iter().filter(|f| f.is_error()).count()
}

#[must_use]
/// # Stylish Report.
///
/// Format script findings the way ESLint's default formatter does: a block
/// per file with `line:col  severity  message  rule` rows, then a tally.
/// Files without findings are omitted; if nothing was found at all, the
/// result is empty.
pub(super) fn stylish<'a, I>(files: I) -> String
where I: IntoIterator<Item=(&'a Path, &'a [Finding])> {
	let mut out = String::new();
	let mut errors = 0_usize;
	let mut warnings = 0_usize;

	for (path, findings) in files {
		if findings.is_empty() { continue; }

		// Line the columns up.
		let pos: Vec<String> = findings.iter()
			.map(|f| format!("{}:{}", f.line, f.column))
			.collect();
		let pos_len = pos.iter().map(String::len).max().unwrap_or(0);
		let msg_len = findings.iter().map(|f| f.message.len()).max().unwrap_or(0);

		let _res = writeln!(&mut out, concat!("\n", underline!("{}")), path.display());
		for (f, pos) in findings.iter().zip(pos) {
			if f.is_error() { errors += 1; }
			else { warnings += 1; }

			let sev_pad = " ".repeat("warning".len() - f.severity.as_str().len());
			let _res = writeln!(
				&mut out,
				concat!("  ", dim!("{:<pos_len$}"), "  {}{}  {:<msg_len$}  ", dim!("{}")),
				pos,
				f.severity.as_str_pretty(),
				sev_pad,
				f.message,
				f.rule,
				pos_len = pos_len,
				msg_len = msg_len,
			);
		}
	}

	let total = errors + warnings;
	if total != 0 {
		let tally = format!(
			"✖ {} problem{} ({} error{}, {} warning{})",
			total,
			if total == 1 { "" } else { "s" },
			errors,
			if errors == 1 { "" } else { "s" },
			warnings,
			if warnings == 1 { "" } else { "s" },
		);
		let _res =
			if errors == 0 { writeln!(&mut out, concat!("\n", ansi!((bold, light_yellow) "{}"), "\n"), tally) }
			else { writeln!(&mut out, concat!("\n", ansi!((bold, light_red) "{}"), "\n"), tally) };
	}

	out
}

#[must_use]
/// # CSSLint Text Report.
///
/// Format stylesheet findings for one file the way CSSLint's text formatter
/// does. A clean file produces an empty string.
pub(super) fn csslint(path: &Path, findings: &[Finding]) -> String {
	if findings.is_empty() { return String::new(); }

	let name = path.file_name().map_or_else(
		|| path.to_string_lossy(),
		|n| n.to_string_lossy(),
	);

	let mut out = String::new();
	let _res = writeln!(
		&mut out,
		"\ncsslint: There {} {} problem{} in {}.",
		if findings.len() == 1 { "is" } else { "are" },
		findings.len(),
		if findings.len() == 1 { "" } else { "s" },
		path.display(),
	);

	for (idx, f) in findings.iter().enumerate() {
		let _res = writeln!(
			&mut out,
			"\n{}\n{}: {} at line {}, col {}\n{}",
			name,
			idx + 1,
			f.severity.as_str(),
			f.line,
			f.column,
			f.message,
		);
	}

	out
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_counts() {
		let findings = [
			Finding::new(1, 1, Severity::Error, "no-debugger", "Unexpected 'debugger' statement."),
			Finding::new(2, 5, Severity::Warning, "no-var", "Unexpected var, use let or const instead."),
			Finding::new(9, 1, Severity::Error, "no-empty", "Empty block statement."),
		];
		assert_eq!(error_count(&findings), 2);
		assert_eq!(error_count(&findings[1..2]), 0);
		assert!(Severity::Error > Severity::Warning);
	}

	#[test]
	fn t_stylish() {
		let findings = vec![
			Finding::new(3, 5, Severity::Error, "no-debugger", "Unexpected 'debugger' statement."),
			Finding::new(10, 1, Severity::Warning, "eqeqeq", "Expected '===' and instead saw '=='."),
		];
		let path = Path::new("/src/server/index.js");
		let out = stylish([(path, findings.as_slice())]);
		assert!(out.contains("/src/server/index.js"));
		assert!(out.contains("3:5"));
		assert!(out.contains("no-debugger"));
		assert!(out.contains("eqeqeq"));
		assert!(out.contains("\x1b[1;91m✖ 2 problems (1 error, 1 warning)\x1b[0m"));

		// Columns are padded to the widest entry.
		assert!(out.contains(concat!("  ", dim!("3:5 "), "  ", ansi!((light_red) "error"), "    ")));

		// Warnings alone get the softer tally.
		let out = stylish([(path, &findings[1..])]);
		assert!(out.contains("\x1b[1;93m✖ 1 problem (0 errors, 1 warning)\x1b[0m"));

		// Nothing to say.
		let empty: Vec<Finding> = Vec::new();
		assert!(stylish([(path, empty.as_slice())]).is_empty());
	}

	#[test]
	fn t_csslint() {
		let findings = vec![
			Finding::new(4, 1, Severity::Warning, "empty-rules", "Rule is empty."),
		];
		let out = csslint(Path::new("/src/client/styles/a.css"), &findings);
		assert!(out.contains("There is 1 problem in /src/client/styles/a.css."));
		assert!(out.contains("a.css\n1: warning at line 4, col 1\nRule is empty."));

		assert!(csslint(Path::new("a.css"), &[]).is_empty());
	}
}
