/*!
# Dagger: Build
*/

use argyle::KeyWordsBuilder;
use std::path::PathBuf;



/// # Pre-Compile CLI Keywords.
pub fn main() {
	println!("cargo:rerun-if-changed=Cargo.toml");

	let mut builder = KeyWordsBuilder::default();
	builder.push_keys([
		"-h", "--help",
		"--silent",
		"-V", "--version",
	]);
	builder.push_keys_with_values([
		"--configuration",
		"-C", "--cwd",
		"-j", "--jobs",
	]);
	builder.save(out_path("argyle.rs"));
}

/// # Output Path.
///
/// Append the sub-path to OUT_DIR and return it.
fn out_path(stub: &str) -> PathBuf {
	std::fs::canonicalize(std::env::var("OUT_DIR").expect("Missing OUT_DIR."))
		.expect("Missing OUT_DIR.")
		.join(stub)
}
