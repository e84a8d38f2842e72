/*!
# Dagger: CSS

Stylesheet linting and minification, courtesy of `lightningcss`.
*/

use crate::{
	DaggerError,
	Finding,
	Severity,
};
use lightningcss::{
	error::{
		Error,
		ParserError,
	},
	rules::CssRule,
	stylesheet::{
		MinifyOptions,
		ParserOptions,
		PrinterOptions,
		StyleSheet,
	},
	traits::ToCss,
};
use std::{
	path::Path,
	sync::{
		Arc,
		RwLock,
	},
};



/// # Lint.
///
/// Parse the stylesheet in recovery mode, reporting everything it had to
/// skip as an error, then run the style rules over whatever survived.
pub(super) fn lint(path: &Path, src: &str) -> Vec<Finding> {
	let warnings = Arc::new(RwLock::new(Vec::new()));
	let options = ParserOptions {
		filename: path.to_string_lossy().into_owned(),
		error_recovery: true,
		warnings: Some(Arc::clone(&warnings)),
		..ParserOptions::default()
	};

	let mut out = Vec::new();
	match StyleSheet::parse(src, options) {
		Ok(sheet) => { lint_rules(&sheet.rules.0, &mut out); },
		Err(e) => { out.push(parse_finding(&e)); },
	}

	if let Ok(list) = warnings.read() {
		out.extend(list.iter().map(parse_finding));
	}

	out.sort_by(|a, b| (a.line, a.column).cmp(&(b.line, b.column)));
	out
}

/// # Lint Rules (Recursive).
fn lint_rules(rules: &[CssRule<'_>], out: &mut Vec<Finding>) {
	for rule in rules {
		match rule {
			CssRule::Style(style) => {
				let line = style.loc.line as usize + 1;
				let column = (style.loc.column as usize).max(1);

				if
					style.declarations.declarations.is_empty() &&
					style.declarations.important_declarations.is_empty() &&
					style.rules.0.is_empty()
				{
					out.push(Finding::new(
						line, column, Severity::Warning, "empty-rules",
						"Rule is empty.",
					));
				}

				if ! style.declarations.important_declarations.is_empty() {
					out.push(Finding::new(
						line, column, Severity::Warning, "important",
						"Use of !important",
					));
				}

				if
					style.selectors.to_css_string(PrinterOptions::default())
						.is_ok_and(|s| has_id(&s))
				{
					out.push(Finding::new(
						line, column, Severity::Warning, "ids",
						"Don't use IDs in selectors.",
					));
				}

				lint_rules(&style.rules.0, out);
			},
			CssRule::Media(media) => { lint_rules(&media.rules.0, out); },
			CssRule::Supports(supports) => { lint_rules(&supports.rules.0, out); },
			_ => {},
		}
	}
}

/// # Parse Finding.
fn parse_finding(e: &Error<ParserError<'_>>) -> Finding {
	let (line, column) = e.loc.as_ref().map_or(
		(1, 1),
		|loc| (loc.line as usize + 1, (loc.column as usize).max(1)),
	);
	Finding::new(line, column, Severity::Error, "", e.kind.to_string())
}

/// # Has ID Selector?
///
/// Look for a `#` outside of attribute brackets and quotes.
fn has_id(selector: &str) -> bool {
	let mut depth = 0_usize;
	let mut quote: Option<char> = None;
	let mut chars = selector.chars();
	while let Some(c) = chars.next() {
		match (quote, c) {
			(_, '\\') => { chars.next(); },
			(Some(q), c) => if c == q { quote = None; },
			(None, '"' | '\'') => { quote.replace(c); },
			(None, '[') => { depth += 1; },
			(None, ']') => { depth = depth.saturating_sub(1); },
			(None, '#') if depth == 0 => return true,
			_ => {},
		}
	}
	false
}



/// # Minify.
///
/// ## Errors
///
/// A stylesheet that cannot be parsed, optimized, or printed is an error.
pub(super) fn minify(path: &Path, src: &str) -> Result<String, DaggerError> {
	let err = |e: String| DaggerError::Minify(path.to_path_buf(), e);

	let options = ParserOptions {
		filename: path.to_string_lossy().into_owned(),
		..ParserOptions::default()
	};
	let mut sheet = StyleSheet::parse(src, options).map_err(|e| err(e.to_string()))?;
	sheet.minify(MinifyOptions::default()).map_err(|e| err(e.to_string()))?;
	let printed = sheet.to_css(PrinterOptions { minify: true, ..PrinterOptions::default() })
		.map_err(|e| err(e.to_string()))?;

	Ok(printed.code)
}



#[cfg(test)]
mod test {
	use super::*;

	fn rules(src: &str) -> Vec<&'static str> {
		lint(Path::new("a.css"), src).into_iter().map(|f| f.rule).collect()
	}

	#[test]
	fn t_has_id() {
		assert!(has_id("#main"));
		assert!(has_id("div > #main .x"));
		assert!(! has_id(".main"));
		assert!(! has_id("a[href=\"#top\"]"));
		assert!(! has_id("a[href='#top']"));
		assert!(! has_id(".a\\#b"));
	}

	#[test]
	fn t_lint() {
		assert!(lint(Path::new("a.css"), "a { color: red; }\n").is_empty());

		assert_eq!(rules(".empty {}\n"), ["empty-rules"]);
		assert_eq!(rules("a { color: red !important; }\n"), ["important"]);
		assert_eq!(rules("#main { color: red; }\n"), ["ids"]);
		assert_eq!(rules("@media screen { .x {} }\n"), ["empty-rules"]);

		let found = lint(Path::new("a.css"), "a { color: red; }\n\n.empty {}\n");
		assert_eq!(found.len(), 1);
		assert_eq!(found[0].line, 3);
		assert_eq!(found[0].severity, Severity::Warning);
	}

	#[test]
	fn t_lint_recovery() {
		let found = lint(Path::new("a.css"), "a$$ { color: red; }\nb { color: blue; }\n");
		assert!(found.iter().any(Finding::is_error));
	}

	#[test]
	fn t_minify() {
		let src = "a {\n  color: red;\n}\n\nb {\n  margin: 0px;\n}\n";
		let out = minify(Path::new("a.css"), src).expect("Minify failed.");
		assert!(out.len() < src.len());
		assert!(! out.contains('\n'));
		assert!(out.contains("color:red"));

		assert!(matches!(
			minify(Path::new("bad.css"), "a$$ { color: red; }"),
			Err(DaggerError::Minify(_, _)),
		));
	}
}
