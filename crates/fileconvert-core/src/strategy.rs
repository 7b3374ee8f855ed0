//! The conversion strategy contract and shared output verification.

use std::path::Path;

use crate::error::{ConvertError, Result};
use crate::options::ConversionOptions;
use crate::progress::ProgressSink;

/// One conversion direction. Strategies are stateless; all per-call state
/// lives on the stack of `run`, and every resource handle opened inside is
/// released before `run` returns.
pub trait ConversionStrategy: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Perform the conversion, reporting progress checkpoints along the way.
    fn run(
        &self,
        source: &Path,
        target: &Path,
        progress: &dyn ProgressSink,
        options: &ConversionOptions,
    ) -> Result<()>;
}

/// Verify that a written target exists with non-zero size. A conversion
/// that completes without fault but leaves a zero-byte file is a failure.
pub fn verify_output(target: &Path) -> Result<()> {
    match std::fs::metadata(target) {
        Ok(meta) if meta.len() > 0 => Ok(()),
        _ => Err(ConvertError::EmptyOutput(target.to_path_buf())),
    }
}

/// Create the target's parent directory if it does not exist yet.
pub fn ensure_parent_dir(target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Remove a zero-byte target left behind by a failed conversion so it
/// cannot be mistaken for valid output.
pub fn discard_partial_output(target: &Path) {
    if let Ok(meta) = std::fs::metadata(target) {
        if meta.len() == 0 {
            if std::fs::remove_file(target).is_ok() {
                log::debug!("removed empty partial output {}", target.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_verify_output_missing() {
        let path = std::env::temp_dir().join("fileconvert_verify_missing.bin");
        std::fs::remove_file(&path).ok();
        let err = verify_output(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyOutput);
    }

    #[test]
    fn test_verify_output_empty_and_nonempty() {
        let path = std::env::temp_dir().join("fileconvert_verify_empty.bin");
        std::fs::write(&path, b"").unwrap();
        assert_eq!(
            verify_output(&path).unwrap_err().kind(),
            ErrorKind::EmptyOutput
        );

        std::fs::write(&path, b"data").unwrap();
        verify_output(&path).unwrap();
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_discard_partial_output() {
        let path = std::env::temp_dir().join("fileconvert_partial.bin");
        std::fs::write(&path, b"").unwrap();
        discard_partial_output(&path);
        assert!(!path.exists());

        // Non-empty files are left alone.
        std::fs::write(&path, b"keep").unwrap();
        discard_partial_output(&path);
        assert!(path.exists());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_ensure_parent_dir() {
        let dir = std::env::temp_dir().join("fileconvert_parent_test/nested");
        std::fs::remove_dir_all(std::env::temp_dir().join("fileconvert_parent_test")).ok();
        let target = dir.join("out.txt");
        ensure_parent_dir(&target).unwrap();
        assert!(dir.exists());
        std::fs::remove_dir_all(std::env::temp_dir().join("fileconvert_parent_test")).ok();
    }
}
