//! Document conversion strategies: PDF rasterization and text extraction,
//! DOCX parsing/assembly, and the tiered PDF producers.

pub mod docx;
mod docx_text;
mod pagebuilder;
mod pdf_pages;
mod pdf_text;
mod to_pdf;

pub use docx_text::{DocxToTextStrategy, TextToDocxStrategy, TABLE_END, TABLE_START};
pub use pdf_pages::{page_path, PdfToImagesStrategy};
pub use pdf_text::{PdfToTextStrategy, PAGE_SEPARATOR};
pub use to_pdf::{DocxToPdfStrategy, TextToPdfStrategy};

#[cfg(test)]
pub(crate) mod testutil {
    use lopdf::dictionary;
    use std::path::Path;

    /// A structurally valid PDF with a page tree but zero pages.
    pub(crate) fn write_zero_page_pdf(path: &Path) {
        let mut doc = lopdf::Document::with_version("1.5");
        let kids: Vec<lopdf::Object> = Vec::new();
        let pages_id = doc.add_object(lopdf::dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => 0,
        });
        let catalog_id = doc.add_object(lopdf::dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }
}
