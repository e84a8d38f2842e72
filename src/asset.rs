/*!
# Dagger: Assets
*/

use crate::{
	DaggerError,
	Finding,
	SourceMap,
};
use std::path::{
	Path,
	PathBuf,
};



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Asset.
///
/// A single file in flight: where it came from, where it is headed (relative
/// to the pipeline's base), its current contents, and whatever has been
/// attached to it along the way.
pub(super) struct Asset {
	/// # Origin Path (for Reporting).
	origin: PathBuf,

	/// # Relative Path.
	rel: PathBuf,

	/// # Contents.
	contents: Vec<u8>,

	/// # Source Map.
	map: Option<SourceMap>,

	/// # Lint Findings.
	findings: Vec<Finding>,
}

impl Asset {
	/// # New.
	pub(super) fn new<P1, P2>(origin: P1, rel: P2, contents: Vec<u8>) -> Self
	where P1: Into<PathBuf>, P2: Into<PathBuf> {
		Self {
			origin: origin.into(),
			rel: rel.into(),
			contents,
			map: None,
			findings: Vec::new(),
		}
	}

	/// # Origin.
	pub(super) fn origin(&self) -> &Path { &self.origin }

	/// # Relative Path.
	pub(super) fn rel(&self) -> &Path { &self.rel }

	/// # Relative Path (Slashed).
	///
	/// Source maps and URLs want forward slashes regardless of platform.
	pub(super) fn rel_slashed(&self) -> String {
		self.rel.components()
			.map(|c| c.as_os_str().to_string_lossy())
			.collect::<Vec<_>>()
			.join("/")
	}

	/// # Contents.
	pub(super) fn contents(&self) -> &[u8] { &self.contents }

	/// # Contents as Text.
	///
	/// ## Errors
	///
	/// Scripts and stylesheets must be UTF-8.
	pub(super) fn text(&self) -> Result<&str, DaggerError> {
		std::str::from_utf8(&self.contents)
			.map_err(|_| DaggerError::Utf8(self.origin.clone()))
	}

	#[cfg(test)]
	/// # Source Map.
	pub(super) const fn map(&self) -> Option<&SourceMap> { self.map.as_ref() }

	/// # Take Source Map.
	pub(super) const fn take_map(&mut self) -> Option<SourceMap> { self.map.take() }

	/// # Lint Findings.
	pub(super) fn findings(&self) -> &[Finding] { &self.findings }

	/// # Set Relative Path.
	pub(super) fn set_rel(&mut self, rel: PathBuf) { self.rel = rel; }

	/// # Set Map.
	pub(super) fn set_map(&mut self, map: SourceMap) { self.map.replace(map); }

	/// # Set Findings.
	pub(super) fn set_findings(&mut self, findings: Vec<Finding>) {
		self.findings = findings;
	}

	/// # Replace Contents.
	///
	/// Swap in transformed text, refitting the source map (if any) to match.
	pub(super) fn replace_text(&mut self, text: String) {
		if let Some(map) = self.map.as_mut() { map.refit(&text); }
		self.contents = text.into_bytes();
	}

	/// # Append Bytes.
	pub(super) fn push_bytes(&mut self, bytes: &[u8]) {
		self.contents.extend_from_slice(bytes);
	}
}
