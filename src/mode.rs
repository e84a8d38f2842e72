/*!
# Dagger: Build Mode
*/



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Build Mode.
///
/// Development builds carry source maps; release builds do not.
pub(super) enum Mode {
	/// # Development.
	Debug,

	/// # Release.
	Release,
}

impl Mode {
	/// # The Value That Means Debug.
	const DEBUG: &str = "debug";

	#[must_use]
	/// # Resolve.
	///
	/// Derive the mode from the `--configuration` value, if any. An absent
	/// value or exactly `"debug"` means development; anything else, including
	/// case variants like `"Debug"`, means release.
	pub(super) fn resolve(configuration: Option<&str>) -> Self {
		match configuration {
			None => Self::Debug,
			Some(v) if v == Self::DEBUG => Self::Debug,
			Some(_) => Self::Release,
		}
	}

	#[must_use]
	/// # Is Development?
	pub(super) const fn is_development(self) -> bool {
		matches!(self, Self::Debug)
	}
}
