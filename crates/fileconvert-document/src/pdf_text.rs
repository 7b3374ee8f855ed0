//! PDF text extraction strategy.
//!
//! Primary technique extracts per-page text with lopdf (pages in parallel,
//! joined in order). When the result is suspiciously small and `pdftotext`
//! is present, the output is re-extracted with it and overwritten if that
//! yields more.

use std::path::Path;
use std::process::Command;

use lopdf::Document;
use rayon::prelude::*;

use fileconvert_core::error::{ConvertError, Result};
use fileconvert_core::options::ConversionOptions;
use fileconvert_core::probe::PDFTOTEXT;
use fileconvert_core::progress::ProgressSink;
use fileconvert_core::strategy::{verify_output, ConversionStrategy};

/// Separator written between extracted pages.
pub const PAGE_SEPARATOR: &str = "\n\n--- Page Break ---\n\n";

pub struct PdfToTextStrategy;

impl ConversionStrategy for PdfToTextStrategy {
    fn name(&self) -> &str {
        "PDF to Text"
    }

    fn run(
        &self,
        source: &Path,
        target: &Path,
        progress: &dyn ProgressSink,
        options: &ConversionOptions,
    ) -> Result<()> {
        progress.report(10);

        let doc = Document::load(source)
            .map_err(|e| ConvertError::TransformFault(format!("failed to load PDF: {}", e)))?;

        let pages = doc.get_pages();
        let mut page_numbers: Vec<u32> = pages.keys().copied().collect();
        page_numbers.sort();
        let total = page_numbers.len();
        if total == 0 {
            return Err(ConvertError::TransformFault(
                "PDF has no pages".to_string(),
            ));
        }

        progress.report(20);

        // Extract in parallel, write sequentially in page order.
        let extracted: Vec<String> = page_numbers
            .par_iter()
            .map(|&n| doc.extract_text(&[n]).unwrap_or_default())
            .collect();

        let mut text = String::new();
        for (i, page_text) in extracted.iter().enumerate() {
            text.push_str(page_text);
            text.push_str(PAGE_SEPARATOR);
            progress.report((20 + (i + 1) * 70 / total) as u8);
        }
        std::fs::write(target, &text)?;

        // Separator bytes don't count as extracted content.
        let extracted_len: usize = extracted.iter().map(|p| p.trim().len()).sum();
        if extracted_len < options.min_text_bytes {
            log::warn!(
                "lopdf extracted only {} bytes from {}; trying pdftotext",
                extracted_len,
                source.display()
            );
            retry_with_pdftotext(source, target, extracted_len)?;
        }

        verify_output(target)?;
        progress.report(100);
        log::info!(
            "extracted text from {} pages into {}",
            total,
            target.display()
        );
        Ok(())
    }
}

/// Re-extract with pdftotext and overwrite the target when it produced
/// more content than the primary pass.
fn retry_with_pdftotext(source: &Path, target: &Path, primary_len: usize) -> Result<()> {
    if !PDFTOTEXT.is_available() {
        log::info!("pdftotext not available; keeping primary extraction");
        return Ok(());
    }

    let tmp = tempfile::NamedTempFile::new()?;
    let output = Command::new("pdftotext")
        .arg(source.as_os_str())
        .arg(tmp.path().as_os_str())
        .output()
        .map_err(|e| ConvertError::TransformFault(format!("failed to run pdftotext: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::warn!("pdftotext failed: {}", stderr);
        return Ok(());
    }

    let alternative = std::fs::read_to_string(tmp.path()).unwrap_or_default();
    if alternative.trim().len() > primary_len {
        std::fs::write(target, alternative)?;
        log::info!("pdftotext extraction replaced primary output");
    }
    Ok(())
}
