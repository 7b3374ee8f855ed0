//! Conversion options shared across the strategies.

use serde::{Deserialize, Serialize};

/// All options controlling a conversion. Loadable from TOML config files;
/// missing fields fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    // -- General --
    pub verbose: u8,

    // -- Image --
    /// JPEG quality (1-100) for JPEG outputs.
    pub jpeg_quality: u8,
    /// Resolution at which an image is embedded as a single-page PDF.
    pub image_pdf_dpi: f32,

    // -- PDF --
    /// Rasterization resolution for PDF-to-image conversion.
    pub render_dpi: u16,
    /// Extracted PDF text below this many bytes is considered suspicious
    /// and the alternative extractor is tried.
    pub min_text_bytes: usize,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            verbose: 0,
            jpeg_quality: 80,
            image_pdf_dpi: 100.0,
            render_dpi: 300,
            min_text_bytes: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_round_trip() {
        let mut opts = ConversionOptions::default();
        opts.jpeg_quality = 95;
        opts.render_dpi = 150;
        opts.min_text_bytes = 64;

        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: ConversionOptions = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.jpeg_quality, 95);
        assert_eq!(parsed.render_dpi, 150);
        assert_eq!(parsed.min_text_bytes, 64);
    }

    #[test]
    fn test_toml_partial_config() {
        let toml_str = r#"
jpeg_quality = 90
"#;
        let opts: ConversionOptions = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.jpeg_quality, 90);
        // Defaults filled in
        assert_eq!(opts.render_dpi, 300);
        assert_eq!(opts.image_pdf_dpi, 100.0);
        assert_eq!(opts.min_text_bytes, 16);
    }
}
