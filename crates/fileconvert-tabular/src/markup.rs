//! XML and HTML table rendering (output-only formats).

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use fileconvert_core::error::{ConvertError, Result};

use crate::table::DataTable;

/// One root element, one child per row, one grandchild per column named
/// after the sanitized header, text content = cell value.
pub fn to_xml(table: &DataTable) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| ConvertError::TransformFault(format!("XML write: {}", e)))?;
    writer
        .write_event(Event::Start(BytesStart::new("data")))
        .map_err(|e| ConvertError::TransformFault(format!("XML write: {}", e)))?;

    let names: Vec<String> = table.columns.iter().map(|c| element_name(c)).collect();
    for row in &table.rows {
        writer
            .write_event(Event::Start(BytesStart::new("row")))
            .map_err(|e| ConvertError::TransformFault(format!("XML write: {}", e)))?;
        for (name, cell) in names.iter().zip(row) {
            writer
                .write_event(Event::Start(BytesStart::new(name.as_str())))
                .map_err(|e| ConvertError::TransformFault(format!("XML write: {}", e)))?;
            writer
                .write_event(Event::Text(BytesText::new(cell)))
                .map_err(|e| ConvertError::TransformFault(format!("XML write: {}", e)))?;
            writer
                .write_event(Event::End(BytesEnd::new(name.as_str())))
                .map_err(|e| ConvertError::TransformFault(format!("XML write: {}", e)))?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("row")))
            .map_err(|e| ConvertError::TransformFault(format!("XML write: {}", e)))?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("data")))
        .map_err(|e| ConvertError::TransformFault(format!("XML write: {}", e)))?;
    Ok(writer.into_inner().into_inner())
}

/// A column header as a legal XML element name.
fn element_name(header: &str) -> String {
    let mut name: String = header
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if name.is_empty() {
        name.push_str("column");
    }
    let first = name.chars().next().unwrap();
    if !(first.is_ascii_alphabetic() || first == '_') {
        name.insert(0, '_');
    }
    name
}

/// Standalone HTML page with the table rendered as `<table>`.
pub fn to_html(table: &DataTable) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("  <meta charset=\"utf-8\">\n");
    html.push_str("  <style>table { border-collapse: collapse; } td, th { border: 1px solid #ccc; padding: 0.3em 0.6em; }</style>\n");
    html.push_str("</head>\n<body>\n");
    html.push_str("  <table>\n    <tr>");
    for header in &table.columns {
        html.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    html.push_str("</tr>\n");
    for row in &table.rows {
        html.push_str("    <tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", escape_html(cell)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("  </table>\n</body>\n</html>\n");
    html
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
