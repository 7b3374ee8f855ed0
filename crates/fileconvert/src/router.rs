//! The conversion router: validates a request, classifies the format pair,
//! and dispatches to exactly one strategy.
//!
//! No fault escapes `convert`: strategy panics are caught and folded into
//! the error type, and a zero-byte target left by a failed attempt is
//! removed so it cannot be mistaken for valid output.

use std::panic::AssertUnwindSafe;
use std::path::Path;

use fileconvert_core::error::{ConvertError, ErrorKind, Result};
use fileconvert_core::format::{ConversionKind, FileFormat};
use fileconvert_core::options::ConversionOptions;
use fileconvert_core::progress::{MonotonicProgress, ProgressSink};
use fileconvert_core::strategy::{discard_partial_output, ensure_parent_dir, ConversionStrategy};

use fileconvert_document::{
    DocxToPdfStrategy, DocxToTextStrategy, PdfToImagesStrategy, PdfToTextStrategy,
    TextToDocxStrategy, TextToPdfStrategy,
};
use fileconvert_image::{ImageToImageStrategy, ImageToPdfStrategy};
use fileconvert_tabular::TabularStrategy;

/// Convert `source` into `target`, with the target format taken from the
/// target path's extension. Progress lands on `progress` as integer
/// percentages, monotonically non-decreasing, starting at 10.
pub fn convert(source: &Path, target: &Path, progress: &dyn ProgressSink) -> Result<()> {
    convert_with_options(source, target, progress, &ConversionOptions::default())
}

pub fn convert_with_options(
    source: &Path,
    target: &Path,
    progress: &dyn ProgressSink,
    options: &ConversionOptions,
) -> Result<()> {
    let result = run_pipeline(source, target, progress, options);

    if let Err(ref e) = result {
        match e.kind() {
            ErrorKind::UnsupportedPair => log::warn!("conversion rejected: {}", e),
            _ => log::error!(
                "conversion {} -> {} failed: {}",
                source.display(),
                target.display(),
                e
            ),
        }
        discard_partial_output(target);
    }
    result
}

fn run_pipeline(
    source: &Path,
    target: &Path,
    progress: &dyn ProgressSink,
    options: &ConversionOptions,
) -> Result<()> {
    if !source.is_file() {
        return Err(ConvertError::InputMissing(source.to_path_buf()));
    }

    ensure_parent_dir(target)?;

    let source_format = format_from_path(source);
    let target_format = format_from_path(target);
    let (source_format, target_format) = match (source_format, target_format) {
        (Some(s), Some(t)) => (s, t),
        (s, t) => return Err(ConvertError::unsupported(s, t)),
    };

    let progress = MonotonicProgress::new(progress);
    progress.report(10);

    let kind = match ConversionKind::classify(source_format, target_format) {
        Some(kind) => kind,
        None => {
            progress.report(100);
            return Err(ConvertError::unsupported(
                Some(source_format),
                Some(target_format),
            ));
        }
    };

    let strategy = strategy_for(kind);
    log::info!(
        "converting {} -> {} ({} via {})",
        source.display(),
        target.display(),
        kind.name(),
        strategy.name()
    );

    // Contain strategy panics at the router boundary.
    match std::panic::catch_unwind(AssertUnwindSafe(|| {
        strategy.run(source, target, &progress, options)
    })) {
        Ok(result) => result,
        Err(payload) => Err(ConvertError::TransformFault(format!(
            "panic in {} strategy: {}",
            strategy.name(),
            panic_message(&payload)
        ))),
    }
}

fn format_from_path(path: &Path) -> Option<FileFormat> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(FileFormat::from_extension)
}

fn strategy_for(kind: ConversionKind) -> &'static dyn ConversionStrategy {
    match kind {
        ConversionKind::ImageToImage => &ImageToImageStrategy,
        ConversionKind::ImageToPdf => &ImageToPdfStrategy,
        ConversionKind::PdfToImages => &PdfToImagesStrategy,
        ConversionKind::PdfToText => &PdfToTextStrategy,
        ConversionKind::DocxToPdf => &DocxToPdfStrategy,
        ConversionKind::DocxToText => &DocxToTextStrategy,
        ConversionKind::TextToPdf => &TextToPdfStrategy,
        ConversionKind::TextToDocx => &TextToDocxStrategy,
        ConversionKind::TabularToTabular => &TabularStrategy,
    }
}

fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
