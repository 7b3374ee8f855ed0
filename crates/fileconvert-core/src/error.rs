use std::path::PathBuf;

use thiserror::Error;

use crate::format::FileFormat;

/// Conversion failure, tagged by kind so callers can distinguish an
/// unsupported format from a corrupt input without parsing log text.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("source file does not exist: {0}")]
    InputMissing(PathBuf),

    #[error("unsupported conversion: {source_desc} -> {target_desc}")]
    UnsupportedPair {
        source_desc: String,
        target_desc: String,
    },

    #[error("required capability unavailable: {0}")]
    CapabilityUnavailable(&'static str),

    #[error("transform fault: {0}")]
    TransformFault(String),

    #[error("conversion produced no output: {0}")]
    EmptyOutput(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Discriminant for [`ConvertError`], matching the error taxonomy exposed
/// to callers. I/O faults surface as `TransformFault`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InputMissing,
    UnsupportedPair,
    CapabilityUnavailable,
    TransformFault,
    EmptyOutput,
}

impl ConvertError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::InputMissing(_) => ErrorKind::InputMissing,
            ConvertError::UnsupportedPair { .. } => ErrorKind::UnsupportedPair,
            ConvertError::CapabilityUnavailable(_) => ErrorKind::CapabilityUnavailable,
            ConvertError::TransformFault(_) => ErrorKind::TransformFault,
            ConvertError::EmptyOutput(_) => ErrorKind::EmptyOutput,
            ConvertError::Io(_) => ErrorKind::TransformFault,
        }
    }

    /// Build an `UnsupportedPair` from format tokens or raw extensions.
    pub fn unsupported(source: Option<FileFormat>, target: Option<FileFormat>) -> Self {
        let desc = |f: Option<FileFormat>| match f {
            Some(f) => f.extension().to_string(),
            None => "unknown".to_string(),
        };
        ConvertError::UnsupportedPair {
            source_desc: desc(source),
            target_desc: desc(target),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(
            ConvertError::InputMissing(PathBuf::from("/x")).kind(),
            ErrorKind::InputMissing
        );
        assert_eq!(
            ConvertError::unsupported(Some(FileFormat::Txt), Some(FileFormat::Csv)).kind(),
            ErrorKind::UnsupportedPair
        );
        assert_eq!(
            ConvertError::CapabilityUnavailable("pdftoppm").kind(),
            ErrorKind::CapabilityUnavailable
        );
        let io = ConvertError::from(std::io::Error::new(std::io::ErrorKind::Other, "x"));
        assert_eq!(io.kind(), ErrorKind::TransformFault);
    }

    #[test]
    fn test_unsupported_message() {
        let err = ConvertError::unsupported(Some(FileFormat::Txt), None);
        assert_eq!(err.to_string(), "unsupported conversion: txt -> unknown");
    }
}
