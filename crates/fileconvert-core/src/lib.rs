//! Core contracts for the fileconvert pipeline: the format model, the
//! routing table, errors, progress reporting, options, and capability
//! probes. Strategy crates depend on this; nothing here touches a codec.

pub mod error;
pub mod format;
pub mod options;
pub mod probe;
pub mod progress;
pub mod strategy;

pub use error::{ConvertError, ErrorKind, Result};
pub use format::{available_targets, available_targets_for_extension, ConversionKind, FileFormat};
pub use options::ConversionOptions;
pub use progress::ProgressSink;
pub use strategy::ConversionStrategy;
