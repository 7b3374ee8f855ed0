//! XLSX reading and writing.
//!
//! An XLSX file is a ZIP of SpreadsheetML parts. Reading resolves shared
//! strings and walks the first worksheet; writing assembles a minimal
//! single-sheet package using inline strings.

use std::io::{Read, Write};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use fileconvert_core::error::{ConvertError, Result};

use crate::table::DataTable;

pub fn read_file(path: &Path) -> Result<DataTable> {
    let file = std::fs::File::open(path)
        .map_err(|e| ConvertError::TransformFault(format!("cannot open {}: {}", path.display(), e)))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| ConvertError::TransformFault(format!("invalid XLSX ZIP: {}", e)))?;

    let shared = match read_entry(&mut archive, "xl/sharedStrings.xml") {
        Some(xml) => parse_shared_strings(&xml),
        None => Vec::new(),
    };

    let sheet_name = archive
        .file_names()
        .filter(|n| n.starts_with("xl/worksheets/") && n.ends_with(".xml"))
        .min()
        .map(|n| n.to_string())
        .ok_or_else(|| ConvertError::TransformFault("XLSX has no worksheet".to_string()))?;

    let sheet_xml = read_entry(&mut archive, &sheet_name)
        .ok_or_else(|| ConvertError::TransformFault(format!("cannot read {}", sheet_name)))?;

    let grid = parse_sheet(&sheet_xml, &shared);
    let mut grid = grid.into_iter();
    let columns = grid
        .next()
        .ok_or_else(|| ConvertError::TransformFault("XLSX sheet has no header row".to_string()))?;

    let mut table = DataTable::new(columns);
    for row in grid {
        table.push_row(row);
    }
    Ok(table)
}

fn read_entry(archive: &mut zip::ZipArchive<std::fs::File>, name: &str) -> Option<String> {
    let mut entry = archive.by_name(name).ok()?;
    let mut s = String::new();
    entry.read_to_string(&mut s).ok()?;
    Some(s)
}

/// Shared strings: one entry per `<si>`, concatenating its `<t>` runs.
fn parse_shared_strings(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_t = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"t" if in_si => in_t = true,
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                if in_t {
                    if let Ok(text) = e.unescape() {
                        current.push_str(&text);
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"si" => {
                    strings.push(current.clone());
                    in_si = false;
                }
                b"t" => in_t = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }
    strings
}

#[derive(Clone, Copy, PartialEq)]
enum CellType {
    Shared,
    Inline,
    Other,
}

fn parse_sheet(xml: &str, shared: &[String]) -> Vec<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut grid: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();

    let mut cell_col = 0usize;
    let mut cell_type = CellType::Other;
    let mut value = String::new();
    let mut capture = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                match e.local_name().as_ref() {
                    b"row" => row.clear(),
                    b"c" => {
                        cell_col = row.len();
                        cell_type = CellType::Other;
                        value.clear();
                        for attr in e.attributes().flatten() {
                            match attr.key.local_name().as_ref() {
                                b"r" => {
                                    let cell_ref = String::from_utf8_lossy(&attr.value);
                                    if let Some(col) = column_index(&cell_ref) {
                                        cell_col = col;
                                    }
                                }
                                b"t" => {
                                    cell_type = match attr.value.as_ref() {
                                        b"s" => CellType::Shared,
                                        b"inlineStr" => CellType::Inline,
                                        _ => CellType::Other,
                                    };
                                }
                                _ => {}
                            }
                        }
                    }
                    b"v" => capture = true,
                    b"t" if cell_type == CellType::Inline => capture = true,
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if capture {
                    if let Ok(text) = e.unescape() {
                        value.push_str(&text);
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"v" | b"t" => capture = false,
                b"c" => {
                    let resolved = match cell_type {
                        CellType::Shared => value
                            .parse::<usize>()
                            .ok()
                            .and_then(|i| shared.get(i).cloned())
                            .unwrap_or_default(),
                        _ => value.clone(),
                    };
                    if row.len() <= cell_col {
                        row.resize(cell_col + 1, String::new());
                    }
                    row[cell_col] = resolved;
                }
                b"row" => {
                    grid.push(std::mem::take(&mut row));
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }
    grid
}

/// Column index from an A1-style reference ("B7" -> 1).
fn column_index(cell_ref: &str) -> Option<usize> {
    let letters: String = cell_ref.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    if letters.is_empty() {
        return None;
    }
    let mut idx = 0usize;
    for c in letters.chars() {
        idx = idx * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1);
    }
    Some(idx - 1)
}

/// Column letters for an index (1 -> "B").
fn column_letters(mut idx: usize) -> String {
    let mut letters = String::new();
    idx += 1;
    while idx > 0 {
        let rem = (idx - 1) % 26;
        letters.insert(0, (b'A' + rem as u8) as char);
        idx = (idx - 1) / 26;
    }
    letters
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

pub fn write_file(path: &Path, table: &DataTable) -> Result<()> {
    let mut sheet = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">\n\
         <sheetData>\n",
    );

    let mut write_row = |sheet: &mut String, row_num: usize, cells: &[String]| {
        sheet.push_str(&format!("<row r=\"{}\">", row_num));
        for (col, cell) in cells.iter().enumerate() {
            sheet.push_str(&format!(
                "<c r=\"{}{}\" t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
                column_letters(col),
                row_num,
                escape_xml(cell)
            ));
        }
        sheet.push_str("</row>\n");
    };

    write_row(&mut sheet, 1, &table.columns);
    for (i, row) in table.rows.iter().enumerate() {
        write_row(&mut sheet, i + 2, row);
    }
    sheet.push_str("</sheetData>\n</worksheet>");

    let file = std::fs::File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES_XML),
        ("_rels/.rels", RELS_XML),
        ("xl/workbook.xml", WORKBOOK_XML),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML),
        ("xl/worksheets/sheet1.xml", sheet.as_str()),
    ] {
        zip.start_file(name, options)
            .map_err(|e| ConvertError::TransformFault(format!("XLSX write: {}", e)))?;
        zip.write_all(content.as_bytes())?;
    }

    zip.finish()
        .map_err(|e| ConvertError::TransformFault(format!("XLSX finalize: {}", e)))?;
    Ok(())
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
