/*!
# Dagger: Cleaner
*/

use crate::DaggerError;
use glob::Pattern;
use std::{
	io::ErrorKind,
	path::{
		Path,
		PathBuf,
	},
};



/// # Clean Directories.
///
/// Recursively remove each of the literal paths, if they exist.
///
/// ## Errors
///
/// This will bubble up any deletion failures other than "not found".
pub(super) fn clean<P, I>(paths: I) -> Result<(), DaggerError>
where P: AsRef<Path>, I: IntoIterator<Item=P> {
	for path in paths {
		let path = path.as_ref();
		let pattern = Pattern::escape(&path.to_string_lossy());
		clean_glob(&pattern)?;
	}
	Ok(())
}

/// # Clean Glob.
///
/// Remove every file or directory matching the pattern. Nothing matching is
/// perfectly fine.
///
/// ## Errors
///
/// This will bubble up any deletion failures other than "not found", or an
/// invalid pattern.
pub(super) fn clean_glob(pattern: &str) -> Result<(), DaggerError> {
	let matches = glob::glob(pattern)
		.map_err(|e| DaggerError::Pattern(format!("{pattern} ({})", e.msg)))?;

	let mut found: Vec<PathBuf> = Vec::new();
	for m in matches {
		match m {
			Ok(p) => { found.push(p); },
			Err(e) =>
				if e.error().kind() != ErrorKind::NotFound {
					return Err(DaggerError::Delete(e.path().to_path_buf()));
				},
		}
	}

	// Parents sort before their children, so nested matches usually vanish
	// along with the first deletion.
	found.sort();
	for p in found { remove(&p)?; }

	Ok(())
}

/// # Remove One Path.
fn remove(path: &Path) -> Result<(), DaggerError> {
	// Symlinks are removed, not followed.
	let res = match std::fs::symlink_metadata(path) {
		Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(path),
		Ok(_) => std::fs::remove_file(path),
		Err(e) => Err(e),
	};

	match res {
		Ok(()) => Ok(()),
		Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
		Err(_) => Err(DaggerError::Delete(path.to_path_buf())),
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_clean() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let root = dir.path();

		let nested = root.join("dist/client/styles");
		std::fs::create_dir_all(&nested).expect("Mkdir failed.");
		std::fs::write(nested.join("a.css"), b"body{}").expect("Write failed.");
		std::fs::create_dir_all(root.join("tmp/server")).expect("Mkdir failed.");
		std::fs::write(root.join("keep.txt"), b"hi").expect("Write failed.");

		let targets = [root.join("dist"), root.join("tmp")];
		assert!(clean(&targets).is_ok());
		assert!(! root.join("dist").exists());
		assert!(! root.join("tmp").exists());
		assert!(root.join("keep.txt").exists());

		// Again, with nothing left to do.
		assert!(clean(&targets).is_ok());
		assert!(! root.join("dist").exists());
		assert!(! root.join("tmp").exists());
	}

	#[test]
	fn t_clean_glob() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let root = dir.path();
		std::fs::create_dir_all(root.join("out/sub")).expect("Mkdir failed.");
		std::fs::write(root.join("out/a.js"), b"1").expect("Write failed.");
		std::fs::write(root.join("out/b.css"), b"2").expect("Write failed.");
		std::fs::write(root.join("out/sub/c.js"), b"3").expect("Write failed.");

		let base = Pattern::escape(&root.to_string_lossy());
		assert!(clean_glob(&format!("{base}/out/**/*.js")).is_ok());
		assert!(! root.join("out/a.js").exists());
		assert!(! root.join("out/sub/c.js").exists());
		assert!(root.join("out/b.css").exists());
		assert!(root.join("out/sub").is_dir());

		// Bad patterns are errors.
		assert!(matches!(clean_glob("["), Err(DaggerError::Pattern(_))));
	}
}
