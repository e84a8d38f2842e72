/*!
# Dagger: JavaScript

Script linting and transpilation, both built on the tree-sitter JavaScript
grammar.
*/

use crate::{
	DaggerError,
	Finding,
	Severity,
};
use std::{
	collections::HashSet,
	path::Path,
};
use tree_sitter::{
	Node,
	Parser,
	Tree,
};



/// # Function-Like Parents.
///
/// An empty block hanging off one of these is a body, not a statement.
const FUNCTION_KINDS: [&str; 7] = [
	"arrow_function",
	"class_static_block",
	"function_declaration",
	"function_expression",
	"generator_function",
	"generator_function_declaration",
	"method_definition",
];

/// # Catch Binding Placeholder.
const CATCH_BINDING: &str = "_unused";



/// # Parse.
///
/// Returns `None` only if tree-sitter itself refuses to work, which it
/// shouldn't.
fn parse(src: &str) -> Option<Tree> {
	let mut parser = Parser::new();
	parser.set_language(&tree_sitter_javascript::LANGUAGE.into()).ok()?;
	parser.parse(src, None)
}

/// # First Syntax Problem.
///
/// Return the first `ERROR` or `MISSING` node in document order, if any.
fn first_problem(root: Node<'_>) -> Option<Node<'_>> {
	if ! root.has_error() { return None; }
	if root.is_error() || root.is_missing() { return Some(root); }

	let mut cursor = root.walk();
	for child in root.children(&mut cursor) {
		if let Some(found) = first_problem(child) { return Some(found); }
	}
	None
}

/// # Node Text.
fn text<'a>(node: Node<'_>, src: &'a str) -> &'a str {
	src.get(node.start_byte()..node.end_byte()).unwrap_or_default()
}

/// # Node Position (One-Based).
fn position(node: Node<'_>) -> (usize, usize) {
	let pos = node.start_position();
	(pos.row + 1, pos.column + 1)
}

/// # Is Tagged?
///
/// True if the template string is the argument list of a tag call.
fn is_tagged(node: Node<'_>) -> bool {
	node.parent().is_some_and(|p|
		p.kind() == "call_expression" &&
		p.child_by_field_name("arguments").is_some_and(|a| a == node)
	)
}



/// # Lint.
///
/// Run the static checks over one script. A parse failure is reported as a
/// single error and short-circuits the rules.
pub(super) fn lint(src: &str) -> Vec<Finding> {
	let Some(tree) = parse(src) else {
		return vec![Finding::new(1, 1, Severity::Error, "", "Parsing error: Unable to parse.")];
	};

	let root = tree.root_node();
	if let Some(bad) = first_problem(root) {
		let (line, column) = position(bad);
		let message =
			if bad.is_missing() { format!("Parsing error: Missing {}.", bad.kind()) }
			else {
				let snippet: String = text(bad, src).chars().take(20).collect();
				format!("Parsing error: Unexpected token {}", snippet.trim())
			};
		return vec![Finding::new(line, column, Severity::Error, "", message)];
	}

	let mut out = Vec::new();
	lint_node(root, src, &mut out);
	out.sort_by(|a, b| (a.line, a.column).cmp(&(b.line, b.column)));
	out
}

/// # Lint Node (Recursive).
fn lint_node(node: Node<'_>, src: &str, out: &mut Vec<Finding>) {
	let (line, column) = position(node);
	match node.kind() {
		"debugger_statement" => out.push(Finding::new(
			line, column, Severity::Error, "no-debugger",
			"Unexpected 'debugger' statement.",
		)),
		"variable_declaration" => out.push(Finding::new(
			line, column, Severity::Warning, "no-var",
			"Unexpected var, use let or const instead.",
		)),
		"statement_block" =>
			if
				node.named_child_count() == 0 &&
				! node.parent().is_some_and(|p| FUNCTION_KINDS.contains(&p.kind()))
			{
				out.push(Finding::new(
					line, column, Severity::Error, "no-empty",
					"Empty block statement.",
				));
			},
		"binary_expression" =>
			if let Some(op) = node.child_by_field_name("operator") {
				let kind = op.kind();
				if kind == "==" || kind == "!=" {
					let (line, column) = position(op);
					out.push(Finding::new(
						line, column, Severity::Warning, "eqeqeq",
						format!("Expected '{kind}=' and instead saw '{kind}'."),
					));
				}
			},
		"object" => dupe_keys(node, src, out),
		_ => {},
	}

	let mut cursor = node.walk();
	for child in node.children(&mut cursor) { lint_node(child, src, out); }
}

/// # Duplicate Keys.
///
/// Flag plain (non-computed) keys that appear more than once in the same
/// object literal.
fn dupe_keys(node: Node<'_>, src: &str, out: &mut Vec<Finding>) {
	let mut seen: HashSet<String> = HashSet::new();
	let mut cursor = node.walk();
	for pair in node.named_children(&mut cursor) {
		if pair.kind() != "pair" { continue; }
		let Some(key) = pair.child_by_field_name("key") else { continue; };
		let name = match key.kind() {
			"property_identifier" | "number" => text(key, src).to_owned(),
			"string" => text(key, src).trim_matches(|c| c == '"' || c == '\'').to_owned(),
			_ => continue,
		};

		if ! seen.insert(name.clone()) {
			let (line, column) = position(key);
			out.push(Finding::new(
				line, column, Severity::Error, "no-dupe-keys",
				format!("Duplicate key '{name}'."),
			));
		}
	}
}



/// # Transpile.
///
/// Lower the handful of newer syntax forms older runtimes choke on, copying
/// everything else verbatim. Line breaks are kept where they were, so the
/// output lines still match the source lines.
///
/// ## Errors
///
/// Any syntax error is fatal.
pub(super) fn transpile(path: &Path, src: &str) -> Result<String, DaggerError> {
	let tree = parse(src).ok_or_else(|| DaggerError::Syntax(path.to_path_buf(), 1, 1))?;
	let root = tree.root_node();
	if let Some(bad) = first_problem(root) {
		let (line, column) = position(bad);
		return Err(DaggerError::Syntax(path.to_path_buf(), line, column));
	}

	let mut out = String::with_capacity(src.len());
	out.push_str(src.get(..root.start_byte()).unwrap_or_default());
	Lower { src }.node(root, &mut out);
	out.push_str(src.get(root.end_byte()..).unwrap_or_default());
	Ok(out)
}



/// # Lowering Pass.
struct Lower<'a> {
	/// # Source.
	src: &'a str,
}

impl Lower<'_> {
	/// # Slice.
	fn slice(&self, start: usize, end: usize) -> &str {
		self.src.get(start..end).unwrap_or_default()
	}

	/// # Node.
	fn node(&self, node: Node<'_>, out: &mut String) {
		match node.kind() {
			"binary_expression" => {
				if let (Some(left), Some(op), Some(right)) = (
					node.child_by_field_name("left"),
					node.child_by_field_name("operator"),
					node.child_by_field_name("right"),
				) {
					if op.kind() == "**" {
						out.push_str("Math.pow(");
						self.node(left, out);
						out.push_str(", ");
						self.newlines(left.end_byte(), right.start_byte(), out);
						self.node(right, out);
						out.push(')');
						return;
					}
				}
			},
			"template_string" if ! is_tagged(node) => {
				self.template(node, out);
				return;
			},
			"catch_clause" if node.child_by_field_name("parameter").is_none() => {
				if let (Some(kw), Some(body)) = (node.child(0), node.child_by_field_name("body")) {
					out.push_str(self.slice(node.start_byte(), kw.end_byte()));
					out.push_str(" (");
					out.push_str(CATCH_BINDING);
					out.push(')');
					out.push_str(self.slice(kw.end_byte(), body.start_byte()));
					self.node(body, out);
					return;
				}
			},
			_ => {},
		}

		self.copy(node, out);
	}

	/// # Copy (With Lowered Children).
	fn copy(&self, node: Node<'_>, out: &mut String) {
		let mut pos = node.start_byte();
		let mut cursor = node.walk();
		for child in node.children(&mut cursor) {
			out.push_str(self.slice(pos, child.start_byte()));
			self.node(child, out);
			pos = child.end_byte();
		}
		out.push_str(self.slice(pos, node.end_byte()));
	}

	/// # Newlines Only.
	///
	/// Keep the line breaks from a span being dropped.
	fn newlines(&self, start: usize, end: usize, out: &mut String) {
		for c in self.slice(start, end).chars() {
			if c == '\n' { out.push('\n'); }
		}
	}

	/// # Template String.
	///
	/// Rewrite an untagged template as a parenthesized string concatenation.
	fn template(&self, node: Node<'_>, out: &mut String) {
		// The content sits between the backticks.
		let start = node.start_byte() + 1;
		let end = node.end_byte().saturating_sub(1).max(start);

		let mut subs = Vec::new();
		let mut cursor = node.walk();
		for child in node.named_children(&mut cursor) {
			if child.kind() == "template_substitution" { subs.push(child); }
		}

		if subs.is_empty() {
			self.quoted(start, end, out);
			return;
		}

		out.push('(');
		let mut pos = start;
		for sub in subs {
			self.quoted(pos, sub.start_byte(), out);
			out.push_str(" + (");
			let mut inner = sub.walk();
			for expr in sub.named_children(&mut inner) {
				if expr.kind() != "comment" { self.node(expr, out); }
			}
			out.push_str(") + ");
			pos = sub.end_byte();
		}
		self.quoted(pos, end, out);
		out.push(')');
	}

	/// # Double-Quoted Literal.
	///
	/// Convert raw template text to a double-quoted string. Escapes pass
	/// through untouched; bare line breaks close the literal and reopen it on
	/// the next line.
	fn quoted(&self, start: usize, end: usize, out: &mut String) {
		out.push('"');
		let mut chars = self.slice(start, end).chars();
		while let Some(c) = chars.next() {
			match c {
				'\\' => {
					out.push('\\');
					if let Some(next) = chars.next() { out.push(next); }
				},
				'"' => { out.push_str("\\\""); },
				'\r' => { out.push_str("\\r"); },
				'\n' => { out.push_str("\\n\" +\n\""); },
				c => { out.push(c); },
			}
		}
		out.push('"');
	}
}
