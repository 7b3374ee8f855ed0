//! File format conversion between image, document, and
//! tabular formats, with capability routing and tiered fallback.
//!
//! The entry points are [`convert`] / [`convert_with_options`] for running
//! a conversion and [`available_targets_for_extension`] for populating a
//! format picker. Failures carry an explicit [`ErrorKind`] so callers can
//! distinguish an unsupported pair from a corrupt input.

pub mod router;

pub use router::{convert, convert_with_options};

pub use fileconvert_core::error::{ConvertError, ErrorKind, Result};
pub use fileconvert_core::format::{
    available_targets, available_targets_for_extension, ConversionKind, FileFormat,
};
pub use fileconvert_core::options::ConversionOptions;
pub use fileconvert_core::progress::{
    CollectingProgress, FnProgress, NullProgress, ProgressSink,
};
