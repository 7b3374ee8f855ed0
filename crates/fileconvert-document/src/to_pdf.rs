//! DOCX-to-PDF and text-to-PDF strategies.
//!
//! Both walk the same three-tier fallback plan: a direct whole-document
//! conversion via soffice when LibreOffice is installed, then a styled
//! printpdf layout, then a fixed-width monospace layout as the last resort.
//! A tier is accepted only if it leaves a non-empty target file.

use std::path::Path;
use std::process::Command;

use printpdf::{BuiltinFont, PdfDocument, PdfSaveOptions};

use fileconvert_core::error::{ConvertError, Result};
use fileconvert_core::format::ConversionKind;
use fileconvert_core::options::ConversionOptions;
use fileconvert_core::probe::{fallback_plan, Technique};
use fileconvert_core::progress::ProgressSink;
use fileconvert_core::strategy::{verify_output, ConversionStrategy};

use crate::docx::{self, DocxBlock};
use crate::pagebuilder::{
    PageBuilder, FONT_SIZE_BODY, FONT_SIZE_H1, FONT_SIZE_H2, FONT_SIZE_H3, FONT_SIZE_MONO,
    MONO_CHARS_PER_LINE,
};

pub struct DocxToPdfStrategy;

impl ConversionStrategy for DocxToPdfStrategy {
    fn name(&self) -> &str {
        "DOCX to PDF"
    }

    fn run(
        &self,
        source: &Path,
        target: &Path,
        progress: &dyn ProgressSink,
        _options: &ConversionOptions,
    ) -> Result<()> {
        progress.report(20);
        let blocks = docx::read_blocks(source)?;

        run_tiers(
            ConversionKind::DocxToPdf,
            source,
            target,
            progress,
            |builder, styled| render_blocks(builder, &blocks, styled),
        )
    }
}

pub struct TextToPdfStrategy;

impl ConversionStrategy for TextToPdfStrategy {
    fn name(&self) -> &str {
        "Text to PDF"
    }

    fn run(
        &self,
        source: &Path,
        target: &Path,
        progress: &dyn ProgressSink,
        _options: &ConversionOptions,
    ) -> Result<()> {
        progress.report(20);
        let content = std::fs::read_to_string(source)
            .map_err(|e| ConvertError::TransformFault(format!("cannot read text: {}", e)))?;
        let lines: Vec<&str> = content.lines().collect();

        run_tiers(
            ConversionKind::TextToPdf,
            source,
            target,
            progress,
            |builder, styled| render_lines(builder, &lines, styled),
        )
    }
}

/// Walk the fallback plan until a tier leaves verified output. `render`
/// fills a page builder for the two layout tiers (`styled` = false means
/// the monospace last resort).
fn run_tiers<F>(
    kind: ConversionKind,
    source: &Path,
    target: &Path,
    progress: &dyn ProgressSink,
    render: F,
) -> Result<()>
where
    F: Fn(&mut PageBuilder, bool),
{
    let mut last_error: Option<ConvertError> = None;

    for &technique in fallback_plan(kind) {
        if !technique.is_available() {
            log::info!("{:?} unavailable, falling through", technique);
            continue;
        }

        let attempt = match technique {
            Technique::SofficeConvert => soffice_convert(source, target),
            Technique::StyledLayout => {
                let mut builder = PageBuilder::new();
                render(&mut builder, true);
                save_pdf(builder, target)
            }
            Technique::MonospaceLayout => {
                let mut builder = PageBuilder::with_chars_per_line(MONO_CHARS_PER_LINE);
                render(&mut builder, false);
                save_pdf(builder, target)
            }
            _ => continue,
        };

        match attempt.and_then(|()| verify_output(target)) {
            Ok(()) => {
                progress.report(80);
                progress.report(100);
                log::info!(
                    "{} produced {} via {:?}",
                    kind.name(),
                    target.display(),
                    technique
                );
                return Ok(());
            }
            Err(e) => {
                log::warn!("{:?} tier failed: {}; falling through", technique, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or(ConvertError::CapabilityUnavailable(
        "no usable PDF conversion technique",
    )))
}

/// Direct whole-document conversion through LibreOffice.
fn soffice_convert(source: &Path, target: &Path) -> Result<()> {
    let tmp_dir = tempfile::TempDir::new()?;

    let output = Command::new("soffice")
        .arg("--headless")
        .arg("--convert-to")
        .arg("pdf")
        .arg("--outdir")
        .arg(tmp_dir.path().as_os_str())
        .arg(source.as_os_str())
        .output()
        .map_err(|e| ConvertError::TransformFault(format!("failed to run soffice: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ConvertError::TransformFault(format!(
            "soffice failed: {}",
            stderr
        )));
    }

    let stem = source
        .file_stem()
        .ok_or_else(|| ConvertError::TransformFault("source has no file stem".to_string()))?;
    let produced = tmp_dir.path().join(stem).with_extension("pdf");
    std::fs::copy(&produced, target)
        .map_err(|e| ConvertError::TransformFault(format!("soffice output missing: {}", e)))?;
    Ok(())
}

fn save_pdf(builder: PageBuilder, target: &Path) -> Result<()> {
    let title = target
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Untitled");
    let mut doc = PdfDocument::new(title);
    let pages = builder.finish();

    let mut warnings = Vec::new();
    let bytes = doc.with_pages(pages).save(&PdfSaveOptions::default(), &mut warnings);
    std::fs::write(target, bytes)?;
    Ok(())
}

fn render_blocks(builder: &mut PageBuilder, blocks: &[DocxBlock], styled: bool) {
    for block in blocks {
        match block {
            DocxBlock::Paragraph {
                text,
                heading_level,
            } => {
                if text.is_empty() {
                    builder.vertical_space(if styled { FONT_SIZE_BODY } else { FONT_SIZE_MONO });
                } else if styled {
                    match heading_level {
                        Some(1) => {
                            builder.write_line(text, FONT_SIZE_H1, BuiltinFont::HelveticaBold)
                        }
                        Some(2) => {
                            builder.write_line(text, FONT_SIZE_H2, BuiltinFont::HelveticaBold)
                        }
                        Some(_) => {
                            builder.write_line(text, FONT_SIZE_H3, BuiltinFont::HelveticaBold)
                        }
                        None => builder.write_wrapped(text, FONT_SIZE_BODY, BuiltinFont::Helvetica),
                    }
                    builder.gap(2.0);
                } else {
                    builder.write_wrapped(text, FONT_SIZE_MONO, BuiltinFont::Courier);
                }
            }
            DocxBlock::Table { rows } => {
                let font = if styled {
                    BuiltinFont::Helvetica
                } else {
                    BuiltinFont::Courier
                };
                let size = if styled { FONT_SIZE_BODY } else { FONT_SIZE_MONO };
                for row in rows {
                    builder.write_line(&row.join(" | "), size, font);
                }
                if styled {
                    builder.gap(2.0);
                }
            }
        }
    }
}

fn render_lines(builder: &mut PageBuilder, lines: &[&str], styled: bool) {
    for line in lines {
        if line.trim().is_empty() {
            // Blank lines become vertical spacing, not dropped.
            builder.vertical_space(if styled { FONT_SIZE_BODY } else { FONT_SIZE_MONO });
        } else if styled {
            builder.write_wrapped(line, FONT_SIZE_BODY, BuiltinFont::Helvetica);
        } else {
            builder.write_wrapped(line, FONT_SIZE_MONO, BuiltinFont::Courier);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fileconvert_core::progress::CollectingProgress;

    #[test]
    fn test_text_to_pdf_styled_layout() {
        let dir = std::env::temp_dir().join("fileconvert_text_pdf_test");
        std::fs::create_dir_all(&dir).unwrap();
        let source = dir.join("in.txt");
        std::fs::write(&source, "Hello world.\n\nSecond paragraph after a blank line.\n").unwrap();
        let target = dir.join("out.pdf");

        let spy = CollectingProgress::new();
        TextToPdfStrategy
            .run(&source, &target, &spy, &ConversionOptions::default())
            .unwrap();

        let data = std::fs::read(&target).unwrap();
        assert_eq!(&data[..5], b"%PDF-");
        let values = spy.values();
        assert_eq!(values.first(), Some(&20));
        assert_eq!(values.last(), Some(&100));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_docx_to_pdf() {
        let dir = std::env::temp_dir().join("fileconvert_docx_pdf_test");
        std::fs::create_dir_all(&dir).unwrap();
        let source = dir.join("in.docx");
        docx::write_from_lines(&source, &["A paragraph.", "", "Another."]).unwrap();
        let target = dir.join("out.pdf");

        DocxToPdfStrategy
            .run(
                &source,
                &target,
                &fileconvert_core::progress::NullProgress,
                &ConversionOptions::default(),
            )
            .unwrap();

        let data = std::fs::read(&target).unwrap();
        assert_eq!(&data[..5], b"%PDF-");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_corrupt_docx_fails_before_tiers() {
        let dir = std::env::temp_dir().join("fileconvert_docx_corrupt_test");
        std::fs::create_dir_all(&dir).unwrap();
        let source = dir.join("bad.docx");
        std::fs::write(&source, b"not a zip").unwrap();

        let err = DocxToPdfStrategy
            .run(
                &source,
                &dir.join("out.pdf"),
                &fileconvert_core::progress::NullProgress,
                &ConversionOptions::default(),
            )
            .unwrap_err();
        assert_eq!(
            err.kind(),
            fileconvert_core::error::ErrorKind::TransformFault
        );
        std::fs::remove_dir_all(&dir).ok();
    }
}
