//! File format model and conversion routing table.
//!
//! `ConversionKind::classify` is the single authority on which format pairs
//! are convertible; `available_targets` is derived from it so the capability
//! table shown to callers can never disagree with the router's dispatch.

use serde::{Deserialize, Serialize};

/// Supported file formats.
///
/// "jpg" and "jpeg" are two spellings of the same format and both parse to
/// `Jpeg`; the canonical extension is "jpg".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileFormat {
    Jpeg,
    Png,
    Bmp,
    Webp,
    Gif,
    Pdf,
    Docx,
    Txt,
    Csv,
    Xlsx,
    Json,
    Xml,
    Html,
}

impl FileFormat {
    /// Parse from a file extension (no leading dot, case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "bmp" => Some(Self::Bmp),
            "webp" => Some(Self::Webp),
            "gif" => Some(Self::Gif),
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "txt" => Some(Self::Txt),
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            "json" => Some(Self::Json),
            "xml" => Some(Self::Xml),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }

    /// Get the canonical file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::Webp => "webp",
            Self::Gif => "gif",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Txt => "txt",
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Html => "html",
        }
    }

    /// Get MIME type.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Bmp => "image/bmp",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Txt => "text/plain",
            Self::Csv => "text/csv",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Json => "application/json",
            Self::Xml => "application/xml",
            Self::Html => "text/html",
        }
    }

    /// Is this one of the raster image formats?
    pub fn is_image(&self) -> bool {
        matches!(
            self,
            Self::Jpeg | Self::Png | Self::Bmp | Self::Webp | Self::Gif
        )
    }

    /// Is this one of the tabular data formats readable as a table?
    pub fn is_tabular_source(&self) -> bool {
        matches!(self, Self::Csv | Self::Xlsx | Self::Json)
    }

    /// All formats, in display order.
    pub fn all() -> &'static [FileFormat] {
        &[
            Self::Jpeg,
            Self::Png,
            Self::Bmp,
            Self::Webp,
            Self::Gif,
            Self::Pdf,
            Self::Docx,
            Self::Txt,
            Self::Csv,
            Self::Xlsx,
            Self::Json,
            Self::Xml,
            Self::Html,
        ]
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension().to_uppercase())
    }
}

/// The supported conversion families. One variant per strategy; the router
/// dispatches with a single exhaustive match over this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionKind {
    ImageToImage,
    ImageToPdf,
    PdfToImages,
    PdfToText,
    DocxToPdf,
    DocxToText,
    TextToPdf,
    TextToDocx,
    TabularToTabular,
}

impl ConversionKind {
    /// Classify a (source, target) format pair. `None` means the pair is
    /// not convertible. A format never converts to itself.
    pub fn classify(source: FileFormat, target: FileFormat) -> Option<Self> {
        use FileFormat::*;

        if source == target {
            return None;
        }

        if source.is_image() {
            return match target {
                t if t.is_image() => Some(Self::ImageToImage),
                Pdf => Some(Self::ImageToPdf),
                _ => None,
            };
        }

        match source {
            Pdf => match target {
                Jpeg | Png => Some(Self::PdfToImages),
                Txt => Some(Self::PdfToText),
                _ => None,
            },
            Docx => match target {
                Pdf => Some(Self::DocxToPdf),
                Txt => Some(Self::DocxToText),
                _ => None,
            },
            Txt => match target {
                Pdf => Some(Self::TextToPdf),
                Docx => Some(Self::TextToDocx),
                _ => None,
            },
            Csv | Xlsx | Json => match target {
                Csv | Xlsx | Json | Xml | Html => Some(Self::TabularToTabular),
                _ => None,
            },
            _ => None,
        }
    }

    /// Human-readable name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ImageToImage => "image-to-image",
            Self::ImageToPdf => "image-to-pdf",
            Self::PdfToImages => "pdf-to-images",
            Self::PdfToText => "pdf-to-text",
            Self::DocxToPdf => "docx-to-pdf",
            Self::DocxToText => "docx-to-text",
            Self::TextToPdf => "text-to-pdf",
            Self::TextToDocx => "text-to-docx",
            Self::TabularToTabular => "tabular",
        }
    }
}

/// Output formats reachable from `format`, derived from the router's own
/// classification.
pub fn available_targets(format: FileFormat) -> Vec<FileFormat> {
    FileFormat::all()
        .iter()
        .copied()
        .filter(|&t| ConversionKind::classify(format, t).is_some())
        .collect()
}

/// Capability query by raw extension, for UI format pickers. Unknown
/// extensions yield an empty list, never an error.
pub fn available_targets_for_extension(ext: &str) -> Vec<&'static str> {
    match FileFormat::from_extension(ext) {
        Some(f) => available_targets(f).iter().map(|t| t.extension()).collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!(FileFormat::from_extension("png"), Some(FileFormat::Png));
        assert_eq!(FileFormat::from_extension("PDF"), Some(FileFormat::Pdf));
        assert_eq!(FileFormat::from_extension("unknown"), None);
        assert_eq!(FileFormat::Xlsx.extension(), "xlsx");
    }

    #[test]
    fn test_jpg_jpeg_unified() {
        assert_eq!(FileFormat::from_extension("jpg"), Some(FileFormat::Jpeg));
        assert_eq!(FileFormat::from_extension("jpeg"), Some(FileFormat::Jpeg));
        assert_eq!(FileFormat::from_extension("JPEG"), Some(FileFormat::Jpeg));
        assert_eq!(FileFormat::Jpeg.extension(), "jpg");
        assert_eq!(
            available_targets_for_extension("jpg"),
            available_targets_for_extension("jpeg")
        );
    }

    #[test]
    fn test_no_self_targets() {
        for &f in FileFormat::all() {
            assert_eq!(ConversionKind::classify(f, f), None, "{} -> itself", f);
            assert!(!available_targets(f).contains(&f));
        }
    }

    #[test]
    fn test_image_family_targets() {
        let targets = available_targets(FileFormat::Png);
        assert_eq!(targets.len(), 5);
        assert!(targets.contains(&FileFormat::Jpeg));
        assert!(targets.contains(&FileFormat::Bmp));
        assert!(targets.contains(&FileFormat::Webp));
        assert!(targets.contains(&FileFormat::Gif));
        assert!(targets.contains(&FileFormat::Pdf));
    }

    #[test]
    fn test_document_targets() {
        assert_eq!(
            available_targets(FileFormat::Pdf),
            vec![FileFormat::Jpeg, FileFormat::Png, FileFormat::Txt]
        );
        assert_eq!(
            available_targets(FileFormat::Docx),
            vec![FileFormat::Pdf, FileFormat::Txt]
        );
        assert_eq!(
            available_targets(FileFormat::Txt),
            vec![FileFormat::Pdf, FileFormat::Docx]
        );
    }

    #[test]
    fn test_tabular_targets_symmetric() {
        for f in [FileFormat::Csv, FileFormat::Xlsx, FileFormat::Json] {
            let targets = available_targets(f);
            assert_eq!(targets.len(), 4, "{}", f);
            assert!(targets.contains(&FileFormat::Xml));
            assert!(targets.contains(&FileFormat::Html));
            for other in [FileFormat::Csv, FileFormat::Xlsx, FileFormat::Json] {
                if other != f {
                    assert!(targets.contains(&other), "{} -> {}", f, other);
                }
            }
        }
    }

    #[test]
    fn test_xml_html_are_sinks() {
        assert!(available_targets(FileFormat::Xml).is_empty());
        assert!(available_targets(FileFormat::Html).is_empty());
        assert_eq!(available_targets_for_extension("xml"), Vec::<&str>::new());
    }

    #[test]
    fn test_unknown_extension_empty() {
        assert!(available_targets_for_extension("exe").is_empty());
        assert!(available_targets_for_extension("").is_empty());
    }

    #[test]
    fn test_classify_matches_table() {
        // Every listed target must classify, everything else must not.
        for &f in FileFormat::all() {
            let targets = available_targets(f);
            for &t in FileFormat::all() {
                let classified = ConversionKind::classify(f, t).is_some();
                assert_eq!(classified, targets.contains(&t), "{} -> {}", f, t);
            }
        }
    }

    #[test]
    fn test_classify_kinds() {
        use ConversionKind::*;
        assert_eq!(
            ConversionKind::classify(FileFormat::Png, FileFormat::Jpeg),
            Some(ImageToImage)
        );
        assert_eq!(
            ConversionKind::classify(FileFormat::Gif, FileFormat::Pdf),
            Some(ImageToPdf)
        );
        assert_eq!(
            ConversionKind::classify(FileFormat::Pdf, FileFormat::Png),
            Some(PdfToImages)
        );
        assert_eq!(
            ConversionKind::classify(FileFormat::Pdf, FileFormat::Txt),
            Some(PdfToText)
        );
        assert_eq!(
            ConversionKind::classify(FileFormat::Json, FileFormat::Html),
            Some(TabularToTabular)
        );
        assert_eq!(ConversionKind::classify(FileFormat::Txt, FileFormat::Csv), None);
        assert_eq!(ConversionKind::classify(FileFormat::Pdf, FileFormat::Docx), None);
    }
}
