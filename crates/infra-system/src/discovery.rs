// Executable discovery
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use ninite_core::application::constants::DEFAULT_EXECUTABLE_NAME;
use ninite_core::ClassicError;

/// Resolve the Classic executable.
///
/// A file path is returned as-is. A directory gets `NinitePro.exe` appended
/// and the result must then be a file. Nothing checks the execute bit; a
/// non-executable file fails later at launch.
pub fn locate_executable(path: impl AsRef<Path>) -> Result<PathBuf, ClassicError> {
    let path = path.as_ref();
    let metadata = stat(path)?;
    if !metadata.is_dir() {
        return Ok(path.to_path_buf());
    }

    let candidate = path.join(DEFAULT_EXECUTABLE_NAME);
    debug!(dir = %path.display(), candidate = %candidate.display(), "Looking up default executable");

    if stat(&candidate)?.is_dir() {
        return Err(ClassicError::Discovery {
            path: candidate,
            source: std::io::Error::new(ErrorKind::InvalidInput, "expected a file, found a directory"),
        });
    }
    Ok(candidate)
}

fn stat(path: &Path) -> Result<std::fs::Metadata, ClassicError> {
    std::fs::metadata(path).map_err(|source| ClassicError::Discovery {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_path_is_used_verbatim() {
        let scratch = TempDir::new().unwrap();
        let exe = scratch.path().join("custom-ninite.exe");
        std::fs::write(&exe, b"").unwrap();

        assert_eq!(locate_executable(&exe).unwrap(), exe);
    }

    #[test]
    fn test_directory_gets_default_name() {
        let scratch = TempDir::new().unwrap();
        let dir = scratch.path();
        std::fs::write(dir.join(DEFAULT_EXECUTABLE_NAME), b"").unwrap();

        assert_eq!(
            locate_executable(dir).unwrap(),
            dir.join(DEFAULT_EXECUTABLE_NAME)
        );
    }

    #[test]
    fn test_directory_named_like_executable() {
        let scratch = TempDir::new().unwrap();
        std::fs::create_dir(scratch.path().join(DEFAULT_EXECUTABLE_NAME)).unwrap();

        match locate_executable(scratch.path()).unwrap_err() {
            ClassicError::Discovery { source, .. } => {
                assert_eq!(source.kind(), ErrorKind::InvalidInput);
            }
            other => panic!("expected discovery error, got {:?}", other),
        }
    }

    #[test]
    fn test_directory_without_executable() {
        let scratch = TempDir::new().unwrap();
        let dir = scratch.path();

        let err = locate_executable(dir).unwrap_err();
        match err {
            ClassicError::Discovery { path, source } => {
                assert_eq!(path, dir.join(DEFAULT_EXECUTABLE_NAME));
                assert_eq!(source.kind(), ErrorKind::NotFound);
            }
            other => panic!("expected discovery error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_path() {
        let err = locate_executable("/nonexistent/ninite").unwrap_err();
        assert!(matches!(err, ClassicError::Discovery { .. }));
    }
}
