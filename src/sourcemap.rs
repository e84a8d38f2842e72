/*!
# Dagger: Source Maps

Maps are tracked at line granularity: each output line points back to one
line of one source, or nowhere.
*/

use serde::Serialize;



/// # Base64 Alphabet.
const B64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// # Source Root.
const SOURCE_ROOT: &str = "/source/";



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Origin.
///
/// A zero-based source index and line number.
pub(super) struct Origin {
	/// # Source Index.
	pub(super) source: u32,

	/// # Line.
	pub(super) line: u32,
}



#[derive(Debug, Clone, Default, Eq, PartialEq)]
/// # Source Map.
pub(super) struct SourceMap {
	/// # Source Paths (Slash-Separated, Relative).
	sources: Vec<String>,

	/// # Source Contents.
	contents: Vec<String>,

	/// # Output Lines.
	lines: Vec<Option<Origin>>,
}

impl SourceMap {
	/// # Identity.
	///
	/// Start tracking a single untouched source.
	pub(super) fn identity(source: String, content: &str) -> Self {
		let len = u32::try_from(line_count(content)).unwrap_or(u32::MAX);
		Self {
			sources: vec![source],
			contents: vec![content.to_owned()],
			lines: (0..len).map(|line| Some(Origin { source: 0, line })).collect(),
		}
	}

	#[cfg(test)]
	/// # Sources.
	pub(super) fn sources(&self) -> &[String] { &self.sources }

	#[cfg(test)]
	/// # Lines.
	pub(super) fn lines(&self) -> &[Option<Origin>] { &self.lines }

	/// # Append.
	///
	/// Tack another map onto the end of this one, as happens when the
	/// underlying files are joined with a newline.
	pub(super) fn append(&mut self, other: Self) {
		let offset = u32::try_from(self.sources.len()).unwrap_or(u32::MAX);
		self.sources.extend(other.sources);
		self.contents.extend(other.contents);
		self.lines.extend(
			other.lines.into_iter().map(|o| o.map(|o| Origin {
				source: o.source.saturating_add(offset),
				line: o.line,
			}))
		);
	}

	/// # Blank Lines.
	///
	/// Append unmapped output lines.
	pub(super) fn push_unmapped(&mut self, count: usize) {
		self.lines.extend(std::iter::repeat_n(None, count));
	}

	/// # Refit.
	///
	/// Reconcile the map with transformed output. If the line count is
	/// unchanged, the mapping stands; otherwise every output line collapses
	/// onto the first known origin.
	pub(super) fn refit(&mut self, content: &str) {
		let len = line_count(content);
		if len != self.lines.len() {
			let first = self.lines.iter().copied().find_map(|o| o);
			self.lines.clear();
			self.lines.resize(len, first);
		}
	}

	/// # Mappings.
	///
	/// Encode the line table as base64 VLQ segments. Each mapped line gets a
	/// single segment at column zero.
	pub(super) fn mappings(&self) -> String {
		let mut out = String::new();
		let mut prev_source: i64 = 0;
		let mut prev_line: i64 = 0;

		for (idx, origin) in self.lines.iter().enumerate() {
			if idx != 0 { out.push(';'); }
			if let Some(o) = origin {
				let source = i64::from(o.source);
				let line = i64::from(o.line);
				vlq(&mut out, 0);
				vlq(&mut out, source - prev_source);
				vlq(&mut out, line - prev_line);
				vlq(&mut out, 0);
				prev_source = source;
				prev_line = line;
			}
		}

		out
	}

	/// # To JSON.
	///
	/// Serialize the map for the output file named `file`.
	pub(super) fn to_json(&self, file: &str) -> String {
		let raw = RawMap {
			version: 3,
			file,
			source_root: SOURCE_ROOT,
			sources: &self.sources,
			sources_content: &self.contents,
			names: &[],
			mappings: self.mappings(),
		};

		// Strings and slices of strings always serialize.
		serde_json::to_string(&raw).unwrap_or_default()
	}
}



#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
/// # Serializable Map.
struct RawMap<'a> {
	/// # Version.
	version: u8,

	/// # Output File.
	file: &'a str,

	/// # Source Root.
	source_root: &'a str,

	/// # Sources.
	sources: &'a [String],

	/// # Sources Content.
	sources_content: &'a [String],

	/// # Names.
	names: &'a [String],

	/// # Mappings.
	mappings: String,
}



/// # Line Count.
///
/// The number of lines as a map sees them: splitting on `\n`, so a trailing
/// newline opens one last (empty) line.
pub(super) fn line_count(content: &str) -> usize {
	content.bytes().filter(|b| b'\n'.eq(b)).count() + 1
}

/// # Base64 VLQ.
///
/// Append one signed value.
fn vlq(out: &mut String, value: i64) {
	let mut v: u64 =
		if value < 0 { (value.unsigned_abs() << 1) | 1 }
		else { value.unsigned_abs() << 1 };

	loop {
		let mut digit = (v & 0b1_1111) as usize;
		v >>= 5;
		if v != 0 { digit |= 0b10_0000; }
		out.push(char::from(B64[digit]));
		if v == 0 { break; }
	}
}
