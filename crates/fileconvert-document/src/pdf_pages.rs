//! PDF rasterization strategy: one image file per page.
//!
//! Preferred technique shells out to `pdftoppm` (poppler-utils) into a temp
//! dir and moves the rendered pages into place. Without pdftoppm a blank
//! placeholder image stands in for the first page; degraded output is
//! preferred over outright failure here.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::{Rgb, RgbImage};
use lopdf::Document;

use fileconvert_core::error::{ConvertError, Result};
use fileconvert_core::format::FileFormat;
use fileconvert_core::options::ConversionOptions;
use fileconvert_core::probe::PDFTOPPM;
use fileconvert_core::progress::ProgressSink;
use fileconvert_core::strategy::{verify_output, ConversionStrategy};

/// Placeholder page dimensions in pixels.
const PLACEHOLDER_W: u32 = 800;
const PLACEHOLDER_H: u32 = 1000;

pub struct PdfToImagesStrategy;

impl ConversionStrategy for PdfToImagesStrategy {
    fn name(&self) -> &str {
        "PDF to Images"
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
        let total_pages = doc.get_pages().len();
        drop(doc);

        if total_pages == 0 {
            return Err(ConvertError::TransformFault(
                "PDF has no pages".to_string(),
            ));
        }

        let target_format = FileFormat::from_extension(
            target.extension().and_then(|e| e.to_str()).unwrap_or(""),
        )
        .ok_or_else(|| ConvertError::unsupported(Some(FileFormat::Pdf), None))?;

        progress.report(20);

        let first_page = if PDFTOPPM.is_available() {
            render_with_pdftoppm(source, target, target_format, total_pages, progress, options)?
        } else {
            log::warn!(
                "pdftoppm not available; writing placeholder image for {}",
                source.display()
            );
            write_placeholder_page(target, target_format)?
        };

        verify_output(&first_page)?;
        progress.report(100);
        Ok(())
    }
}

/// Page file path: `<target-stem>_page<N>.<ext>`, N 1-based.
pub fn page_path(target: &Path, page: usize, format: FileFormat) -> PathBuf {
    let stem = target
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let name = format!("{}_page{}.{}", stem, page, format.extension());
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(name),
        _ => PathBuf::from(name),
    }
}

fn render_with_pdftoppm(
    source: &Path,
    target: &Path,
    format: FileFormat,
    total_pages: usize,
    progress: &dyn ProgressSink,
    options: &ConversionOptions,
) -> Result<PathBuf> {
    let tmp_dir = tempfile::TempDir::new()
        .map_err(|e| ConvertError::TransformFault(format!("failed to create temp dir: {}", e)))?;

    let prefix = tmp_dir.path().join("page");
    let prefix_str = prefix
        .to_str()
        .ok_or_else(|| ConvertError::TransformFault("invalid temp path".to_string()))?;

    let format_flag = match format {
        FileFormat::Png => "-png",
        _ => "-jpeg",
    };

    log::info!(
        "rendering {} pages with pdftoppm at {} DPI",
        total_pages,
        options.render_dpi
    );

    let output = Command::new("pdftoppm")
        .arg(format_flag)
        .arg("-r")
        .arg(options.render_dpi.to_string())
        .arg(source.as_os_str())
        .arg(prefix_str)
        .output()
        .map_err(|e| ConvertError::TransformFault(format!("failed to run pdftoppm: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ConvertError::TransformFault(format!(
            "pdftoppm failed: {}",
            stderr
        )));
    }

    // pdftoppm zero-pads page numbers; lexicographic order is page order.
    let mut rendered: Vec<PathBuf> = std::fs::read_dir(tmp_dir.path())?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();
    rendered.sort();

    if rendered.is_empty() {
        return Err(ConvertError::TransformFault(
            "pdftoppm produced no pages".to_string(),
        ));
    }

    let mut first_page = None;
    for (i, rendered_path) in rendered.iter().enumerate() {
        let dest = page_path(target, i + 1, format);
        std::fs::copy(rendered_path, &dest)?;
        if first_page.is_none() {
            first_page = Some(dest);
        }
        progress.report((20 + (i + 1) * 80 / total_pages).min(100) as u8);
    }

    log::info!(
        "wrote {} page images for {}",
        rendered.len(),
        source.display()
    );
    Ok(first_page.expect("non-empty rendered list"))
}

fn write_placeholder_page(target: &Path, format: FileFormat) -> Result<PathBuf> {
    let img = RgbImage::from_pixel(PLACEHOLDER_W, PLACEHOLDER_H, Rgb([255, 255, 255]));
    let dest = page_path(target, 1, format);
    img.save(&dest)
        .map_err(|e| ConvertError::TransformFault(format!("placeholder encode: {}", e)))?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fileconvert_core::error::ErrorKind;
    use fileconvert_core::progress::NullProgress;

    #[test]
    fn test_page_path_naming() {
        let target = Path::new("/out/scan.png");
        assert_eq!(
            page_path(target, 1, FileFormat::Png),
            PathBuf::from("/out/scan_page1.png")
        );
        assert_eq!(
            page_path(target, 12, FileFormat::Jpeg),
            PathBuf::from("/out/scan_page12.jpg")
        );
    }

    #[test]
    fn test_placeholder_page_written() {
        let dir = std::env::temp_dir().join("fileconvert_placeholder_test");
        std::fs::create_dir_all(&dir).unwrap();
        let target = dir.join("doc.png");

        let written = write_placeholder_page(&target, FileFormat::Png).unwrap();
        assert_eq!(written, dir.join("doc_page1.png"));
        let img = image::open(&written).unwrap();
        assert_eq!(img.width(), PLACEHOLDER_W);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_zero_page_pdf_fails() {
        let dir = std::env::temp_dir().join("fileconvert_pdf_pages_test");
        std::fs::create_dir_all(&dir).unwrap();
        let source = dir.join("empty.pdf");
        crate::testutil::write_zero_page_pdf(&source);

        let err = PdfToImagesStrategy
            .run(
                &source,
                &dir.join("out.jpg"),
                &NullProgress,
                &ConversionOptions::default(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransformFault);
        std::fs::remove_dir_all(&dir).ok();
    }
}
