//! Capability probes for external tools, and the per-kind fallback plans.
//!
//! Each probe shells out to `which` once per process and memoizes the
//! answer. Fallback order is data, not control flow: strategies walk the
//! plan for their conversion kind and tests assert on it directly.

use std::process::Command;
use std::sync::OnceLock;

use crate::format::ConversionKind;

/// A probe for one external program.
pub struct ToolProbe {
    program: &'static str,
    state: OnceLock<bool>,
}

impl ToolProbe {
    pub const fn new(program: &'static str) -> Self {
        Self {
            program,
            state: OnceLock::new(),
        }
    }

    pub fn program(&self) -> &'static str {
        self.program
    }

    /// Whether the program is on PATH. Evaluated once, then cached.
    pub fn is_available(&self) -> bool {
        *self.state.get_or_init(|| {
            let found = Command::new("which")
                .arg(self.program)
                .output()
                .map(|out| out.status.success())
                .unwrap_or(false);
            if found {
                log::debug!("capability probe: {} available", self.program);
            } else {
                log::info!("capability probe: {} not found on PATH", self.program);
            }
            found
        })
    }
}

/// `pdftoppm` (poppler-utils), preferred PDF rasterizer.
pub static PDFTOPPM: ToolProbe = ToolProbe::new("pdftoppm");

/// `pdftotext` (poppler-utils), alternative PDF text extractor.
pub static PDFTOTEXT: ToolProbe = ToolProbe::new("pdftotext");

/// `soffice` (LibreOffice), direct whole-document converter.
pub static SOFFICE: ToolProbe = ToolProbe::new("soffice");

/// One candidate technique within a strategy, attempted in plan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Technique {
    /// Rasterize PDF pages with pdftoppm.
    PdftoppmRender,
    /// Blank placeholder image in place of a real rasterization.
    PlaceholderImage,
    /// Extract PDF text with lopdf.
    LopdfExtract,
    /// Extract PDF text with pdftotext.
    PdftotextExtract,
    /// Whole-document conversion via soffice.
    SofficeConvert,
    /// Paragraph reconstruction with basic styling (printpdf).
    StyledLayout,
    /// Last-resort fixed-width word-wrap layout (printpdf).
    MonospaceLayout,
    /// Single built-in technique with no fallback.
    Builtin,
}

impl Technique {
    /// Whether the technique's external requirement is present. Builtin
    /// techniques are always available.
    pub fn is_available(&self) -> bool {
        match self {
            Technique::PdftoppmRender => PDFTOPPM.is_available(),
            Technique::PdftotextExtract => PDFTOTEXT.is_available(),
            Technique::SofficeConvert => SOFFICE.is_available(),
            _ => true,
        }
    }
}

/// The ordered fallback plan for a conversion kind. The first available
/// technique that produces verified output wins.
pub fn fallback_plan(kind: ConversionKind) -> &'static [Technique] {
    use Technique::*;
    match kind {
        ConversionKind::PdfToImages => &[PdftoppmRender, PlaceholderImage],
        ConversionKind::PdfToText => &[LopdfExtract, PdftotextExtract],
        ConversionKind::DocxToPdf | ConversionKind::TextToPdf => {
            &[SofficeConvert, StyledLayout, MonospaceLayout]
        }
        _ => &[Builtin],
    }
}
