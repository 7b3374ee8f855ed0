//! Image conversion strategies: raster-to-raster and raster-to-PDF.
//!
//! Decoding and encoding go through the `image` crate. JPEG targets get
//! alpha flattened onto a white background (the format has no alpha
//! channel); GIF targets are handed RGBA data so the encoder can build an
//! adaptive palette. PDF embedding uses printpdf with the image placed at a
//! fixed resolution on a page sized to the pixel dimensions.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage};
use printpdf::{Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, RawImage, XObjectTransform};

use fileconvert_core::error::{ConvertError, Result};
use fileconvert_core::format::FileFormat;
use fileconvert_core::options::ConversionOptions;
use fileconvert_core::progress::ProgressSink;
use fileconvert_core::strategy::{verify_output, ConversionStrategy};

/// Converts between raster image formats.
pub struct ImageToImageStrategy;

impl ConversionStrategy for ImageToImageStrategy {
    fn name(&self) -> &str {
        "Image to Image"
    }

    fn run(
        &self,
        source: &Path,
        target: &Path,
        progress: &dyn ProgressSink,
        options: &ConversionOptions,
    ) -> Result<()> {
        progress.report(20);

        let img = image::open(source)
            .map_err(|e| ConvertError::TransformFault(format!("image decode: {}", e)))?;

        let target_format = FileFormat::from_extension(
            target.extension().and_then(|e| e.to_str()).unwrap_or(""),
        )
        .ok_or_else(|| ConvertError::unsupported(None, None))?;

        progress.report(60);

        match target_format {
            FileFormat::Jpeg => {
                // JPEG has no alpha channel; composite onto white first.
                let rgb = flatten_onto_white(&img);
                let mut out = std::fs::File::create(target)?;
                let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                    &mut out,
                    options.jpeg_quality.clamp(1, 100),
                );
                rgb.write_with_encoder(encoder)
                    .map_err(|e| ConvertError::TransformFault(format!("jpeg encode: {}", e)))?;
            }
            FileFormat::Gif => {
                // The GIF encoder quantizes RGBA input to an adaptive palette.
                let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
                rgba.save_with_format(target, ImageFormat::Gif)
                    .map_err(|e| ConvertError::TransformFault(format!("gif encode: {}", e)))?;
            }
            FileFormat::Png | FileFormat::Bmp | FileFormat::Webp => {
                let fmt = match target_format {
                    FileFormat::Png => ImageFormat::Png,
                    FileFormat::Bmp => ImageFormat::Bmp,
                    _ => ImageFormat::WebP,
                };
                img.save_with_format(target, fmt)
                    .map_err(|e| ConvertError::TransformFault(format!("image encode: {}", e)))?;
            }
            _ => return Err(ConvertError::unsupported(None, Some(target_format))),
        }

        verify_output(target)?;
        progress.report(100);
        log::info!(
            "converted image {} -> {}",
            source.display(),
            target.display()
        );
        Ok(())
    }
}

/// Embeds an image as a single-page PDF.
pub struct ImageToPdfStrategy;

impl ConversionStrategy for ImageToPdfStrategy {
    fn name(&self) -> &str {
        "Image to PDF"
    }

    fn run(
        &self,
        source: &Path,
        target: &Path,
        progress: &dyn ProgressSink,
        options: &ConversionOptions,
    ) -> Result<()> {
        progress.report(20);

        let img = image::open(source)
            .map_err(|e| ConvertError::TransformFault(format!("image decode: {}", e)))?;
        let (px_w, px_h) = img.dimensions();

        // PDF images carry no alpha here; force RGB before embedding.
        let rgb = flatten_onto_white(&img);
        let mut png_bytes = Vec::new();
        DynamicImage::ImageRgb8(rgb)
            .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
            .map_err(|e| ConvertError::TransformFault(format!("image re-encode: {}", e)))?;

        progress.report(60);

        let dpi = options.image_pdf_dpi;
        let page_w = Mm(px_w as f32 * 25.4 / dpi);
        let page_h = Mm(px_h as f32 * 25.4 / dpi);

        let title = target
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Untitled");
        let mut doc = PdfDocument::new(title);

        let mut warnings = Vec::new();
        let raw = RawImage::decode_from_bytes(&png_bytes, &mut warnings)
            .map_err(|e| ConvertError::TransformFault(format!("pdf image embed: {}", e)))?;
        let image_id = doc.add_image(&raw);

        let ops = vec![Op::UseXobject {
            id: image_id,
            transform: XObjectTransform {
                translate_x: Some(Mm(0.0).into()),
                translate_y: Some(Mm(0.0).into()),
                dpi: Some(dpi),
                ..Default::default()
            },
        }];
        let page = PdfPage::new(page_w, page_h, ops);

        let mut warnings = Vec::new();
        let pdf_bytes = doc
            .with_pages(vec![page])
            .save(&PdfSaveOptions::default(), &mut warnings);
        std::fs::write(target, pdf_bytes)?;

        verify_output(target)?;
        progress.report(100);
        log::info!(
            "embedded {}x{} image as PDF {}",
            px_w,
            px_h,
            target.display()
        );
        Ok(())
    }
}

/// Composite any alpha channel onto a white background, yielding RGB.
/// Images without alpha pass through unchanged.
fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }
    let rgba = img.to_rgba8();
    let mut rgb = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, px) in rgba.enumerate_pixels() {
        let a = px[3] as u16;
        let blend = |c: u8| ((c as u16 * a + 255 * (255 - a)) / 255) as u8;
        rgb.put_pixel(x, y, Rgb([blend(px[0]), blend(px[1]), blend(px[2])]));
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;
    use fileconvert_core::progress::CollectingProgress;
    use image::Rgba;

    fn sample_rgba(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("sample.png");
        let mut img = image::RgbaImage::new(4, 4);
        for (x, _, px) in img.enumerate_pixels_mut() {
            // Left half opaque red, right half fully transparent.
            *px = if x < 2 {
                Rgba([200, 10, 10, 255])
            } else {
                Rgba([0, 0, 0, 0])
            };
        }
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_flatten_alpha_onto_white() {
        let mut img = image::RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([100, 100, 100, 255]));
        img.put_pixel(1, 0, Rgba([0, 0, 0, 0]));
        let rgb = flatten_onto_white(&DynamicImage::ImageRgba8(img));
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([100, 100, 100]));
        assert_eq!(rgb.get_pixel(1, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_flatten_no_alpha_passthrough() {
        let mut img = RgbImage::new(1, 1);
        img.put_pixel(0, 0, Rgb([1, 2, 3]));
        let rgb = flatten_onto_white(&DynamicImage::ImageRgb8(img));
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([1, 2, 3]));
    }

    #[test]
    fn test_rgba_png_to_jpg() {
        let tmp = tempfile::tempdir().unwrap();
        let source = sample_rgba(tmp.path());
        let target = tmp.path().join("out.jpg");

        let spy = CollectingProgress::new();
        ImageToImageStrategy
            .run(&source, &target, &spy, &ConversionOptions::default())
            .unwrap();

        assert!(target.metadata().unwrap().len() > 0);
        assert_eq!(spy.values(), vec![20, 60, 100]);
        // Output must decode as an image again.
        let round = image::open(&target).unwrap();
        assert_eq!(round.dimensions(), (4, 4));
    }

    #[test]
    fn test_jpg_conversion_deterministic() {
        let tmp = tempfile::tempdir().unwrap();
        let source = sample_rgba(tmp.path());
        let target = tmp.path().join("out.jpg");
        let opts = ConversionOptions::default();

        ImageToImageStrategy
            .run(&source, &target, &fileconvert_core::progress::NullProgress, &opts)
            .unwrap();
        let first = std::fs::read(&target).unwrap();

        ImageToImageStrategy
            .run(&source, &target, &fileconvert_core::progress::NullProgress, &opts)
            .unwrap();
        let second = std::fs::read(&target).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_image_to_pdf() {
        let tmp = tempfile::tempdir().unwrap();
        let source = sample_rgba(tmp.path());
        let target = tmp.path().join("out.pdf");

        let spy = CollectingProgress::new();
        ImageToPdfStrategy
            .run(&source, &target, &spy, &ConversionOptions::default())
            .unwrap();

        let data = std::fs::read(&target).unwrap();
        assert_eq!(&data[..5], b"%PDF-");
        assert_eq!(spy.values(), vec![20, 60, 100]);
    }

    #[test]
    fn test_corrupt_source_is_transform_fault() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("broken.png");
        std::fs::write(&source, b"not an image").unwrap();
        let target = tmp.path().join("out.jpg");

        let err = ImageToImageStrategy
            .run(
                &source,
                &target,
                &fileconvert_core::progress::NullProgress,
                &ConversionOptions::default(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), fileconvert_core::error::ErrorKind::TransformFault);
    }
}
