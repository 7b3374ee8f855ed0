//! OOXML (DOCX) reading and writing.
//!
//! A DOCX file is a ZIP archive of Office Open XML parts. Reading walks
//! `word/document.xml` with quick-xml and produces an ordered list of
//! blocks (paragraphs and tables). Writing assembles the minimal package:
//! `[Content_Types].xml`, `_rels/.rels`, and `word/document.xml`.

use std::io::{Read, Write};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use fileconvert_core::error::{ConvertError, Result};

/// One block-level element of a DOCX body, in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum DocxBlock {
    Paragraph {
        text: String,
        /// 1-3 when the paragraph carries a Heading style, None for body text.
        heading_level: Option<u8>,
    },
    Table {
        rows: Vec<Vec<String>>,
    },
}

/// Parse the body of a DOCX file into blocks.
pub fn read_blocks(path: &Path) -> Result<Vec<DocxBlock>> {
    let file = std::fs::File::open(path)
        .map_err(|e| ConvertError::TransformFault(format!("cannot open {}: {}", path.display(), e)))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| ConvertError::TransformFault(format!("invalid DOCX ZIP: {}", e)))?;

    let mut document_xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ConvertError::TransformFault(format!("missing word/document.xml: {}", e)))?
        .read_to_string(&mut document_xml)
        .map_err(|e| ConvertError::TransformFault(format!("word/document.xml: {}", e)))?;

    Ok(parse_document_xml(&document_xml))
}

/// Walk document.xml events and collect paragraphs and tables.
/// Paragraphs inside table cells contribute to the cell, not the block list.
fn parse_document_xml(xml: &str) -> Vec<DocxBlock> {
    let mut reader = Reader::from_str(xml);
    let mut blocks = Vec::new();

    let mut para_text = String::new();
    let mut in_paragraph = false;
    let mut heading_level: Option<u8> = None;

    let mut table_depth = 0usize;
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                match e.local_name().as_ref() {
                    b"p" => {
                        in_paragraph = true;
                        para_text.clear();
                        heading_level = None;
                    }
                    b"tbl" => {
                        table_depth += 1;
                        if table_depth == 1 {
                            rows.clear();
                        }
                    }
                    b"tr" if table_depth == 1 => row.clear(),
                    b"tc" if table_depth == 1 => cell_text.clear(),
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                // Self-closing <w:p/> is an empty paragraph.
                b"p" if table_depth == 0 => {
                    blocks.push(DocxBlock::Paragraph {
                        text: String::new(),
                        heading_level: None,
                    });
                }
                b"pStyle" if in_paragraph => {
                    for attr in e.attributes().flatten() {
                        if attr.key.local_name().as_ref() == b"val" {
                            let val = String::from_utf8_lossy(&attr.value);
                            heading_level = heading_level_from_style(&val);
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                if let Ok(text) = e.unescape() {
                    if table_depth > 0 {
                        cell_text.push_str(&text);
                    } else if in_paragraph {
                        para_text.push_str(&text);
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"p" => {
                    if table_depth == 0 && in_paragraph {
                        blocks.push(DocxBlock::Paragraph {
                            text: para_text.trim().to_string(),
                            heading_level,
                        });
                    }
                    in_paragraph = false;
                }
                b"tc" if table_depth == 1 => {
                    row.push(cell_text.trim().to_string());
                }
                b"tr" if table_depth == 1 => {
                    if !row.is_empty() {
                        rows.push(std::mem::take(&mut row));
                    }
                }
                b"tbl" => {
                    if table_depth == 1 && !rows.is_empty() {
                        blocks.push(DocxBlock::Table {
                            rows: std::mem::take(&mut rows),
                        });
                    }
                    table_depth = table_depth.saturating_sub(1);
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }

    blocks
}

fn heading_level_from_style(style: &str) -> Option<u8> {
    let level = style.strip_prefix("Heading")?.parse::<u8>().ok()?;
    if (1..=6).contains(&level) {
        Some(level.min(3))
    } else {
        None
    }
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

/// Write a DOCX with one paragraph per input line. Blank lines become
/// empty paragraphs, so blank-line count survives a round trip.
pub fn write_from_lines(target: &Path, lines: &[&str]) -> Result<()> {
    let mut body = String::new();
    for line in lines {
        if line.trim().is_empty() {
            body.push_str("<w:p/>");
        } else {
            body.push_str("<w:p><w:r><w:t xml:space=\"preserve\">");
            body.push_str(&escape_xml(line));
            body.push_str("</w:t></w:r></w:p>");
        }
        body.push('\n');
    }

    let document_xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\n\
         <w:body>\n{}<w:sectPr/>\n</w:body>\n</w:document>",
        body
    );

    let file = std::fs::File::create(target)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", options)
        .map_err(|e| ConvertError::TransformFault(format!("DOCX write: {}", e)))?;
    zip.write_all(CONTENT_TYPES_XML.as_bytes())?;

    zip.start_file("_rels/.rels", options)
        .map_err(|e| ConvertError::TransformFault(format!("DOCX write: {}", e)))?;
    zip.write_all(RELS_XML.as_bytes())?;

    zip.start_file("word/document.xml", options)
        .map_err(|e| ConvertError::TransformFault(format!("DOCX write: {}", e)))?;
    zip.write_all(document_xml.as_bytes())?;

    zip.finish()
        .map_err(|e| ConvertError::TransformFault(format!("DOCX finalize: {}", e)))?;
    Ok(())
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_paragraphs_and_headings() {
        let xml = r#"<w:document xmlns:w="http://example/w"><w:body>
            <w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Title</w:t></w:r></w:p>
            <w:p><w:r><w:t>Hello </w:t></w:r><w:r><w:t>world</w:t></w:r></w:p>
            <w:p/>
        </w:body></w:document>"#;
        let blocks = parse_document_xml(xml);
        assert_eq!(
            blocks[0],
            DocxBlock::Paragraph {
                text: "Title".to_string(),
                heading_level: Some(1)
            }
        );
        assert_eq!(
            blocks[1],
            DocxBlock::Paragraph {
                text: "Hello world".to_string(),
                heading_level: None
            }
        );
    }

    #[test]
    fn test_parse_table() {
        let xml = r#"<w:document xmlns:w="http://example/w"><w:body>
            <w:tbl>
              <w:tr><w:tc><w:p><w:r><w:t>a</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>b</w:t></w:r></w:p></w:tc></w:tr>
              <w:tr><w:tc><w:p><w:r><w:t>1</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>2</w:t></w:r></w:p></w:tc></w:tr>
            </w:tbl>
        </w:body></w:document>"#;
        let blocks = parse_document_xml(xml);
        assert_eq!(
            blocks,
            vec![DocxBlock::Table {
                rows: vec![
                    vec!["a".to_string(), "b".to_string()],
                    vec!["1".to_string(), "2".to_string()]
                ]
            }]
        );
    }

    #[test]
    fn test_table_paragraphs_do_not_leak() {
        let xml = r#"<w:body>
            <w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
            <w:p><w:r><w:t>after</w:t></w:r></w:p>
        </w:body>"#;
        let blocks = parse_document_xml(xml);
        assert_eq!(blocks.len(), 2);
        assert!(matches!(blocks[0], DocxBlock::Table { .. }));
        assert_eq!(
            blocks[1],
            DocxBlock::Paragraph {
                text: "after".to_string(),
                heading_level: None
            }
        );
    }

    #[test]
    fn test_heading_style_parsing() {
        assert_eq!(heading_level_from_style("Heading1"), Some(1));
        assert_eq!(heading_level_from_style("Heading2"), Some(2));
        // Deep levels render like h3.
        assert_eq!(heading_level_from_style("Heading6"), Some(3));
        assert_eq!(heading_level_from_style("BodyText"), None);
        assert_eq!(heading_level_from_style("Heading9"), None);
    }

    #[test]
    fn test_write_read_round_trip() {
        let tmp = std::env::temp_dir().join("fileconvert_docx_roundtrip.docx");
        write_from_lines(&tmp, &["First line", "", "Second & <line>"]).unwrap();

        let blocks = read_blocks(&tmp).unwrap();
        assert_eq!(blocks.len(), 3);
        assert_eq!(
            blocks[0],
            DocxBlock::Paragraph {
                text: "First line".to_string(),
                heading_level: None
            }
        );
        assert_eq!(
            blocks[1],
            DocxBlock::Paragraph {
                text: String::new(),
                heading_level: None
            }
        );
        assert_eq!(
            blocks[2],
            DocxBlock::Paragraph {
                text: "Second & <line>".to_string(),
                heading_level: None
            }
        );
        std::fs::remove_file(&tmp).ok();
    }
}
