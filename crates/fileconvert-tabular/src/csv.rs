//! CSV reading and writing. Quoted fields may contain commas, doubled
//! quotes, and line breaks; the first record is the header.

use fileconvert_core::error::{ConvertError, Result};

use crate::table::DataTable;

pub fn read_str(content: &str) -> Result<DataTable> {
    let records = parse_records(content);
    let mut records = records.into_iter();

    let columns = records
        .next()
        .ok_or_else(|| ConvertError::TransformFault("CSV has no header row".to_string()))?;

    let mut table = DataTable::new(columns);
    for row in records {
        table.push_row(row);
    }
    Ok(table)
}

pub fn write_str(table: &DataTable) -> String {
    let mut out = String::new();
    write_record(&mut out, &table.columns);
    for row in &table.rows {
        write_record(&mut out, row);
    }
    out
}

fn write_record(out: &mut String, fields: &[String]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&quote_field(field));
    }
    out.push('\n');
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn parse_records(content: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = content.chars().peekable();
    let mut saw_any = false;

    while let Some(c) = chars.next() {
        saw_any = true;
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(c),
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => record.push(std::mem::take(&mut field)),
                '\r' => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                '\n' => {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                _ => field.push(c),
            }
        }
    }

    // Trailing record without a final newline.
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    // A file that is just a trailing newline yields no records.
    if !saw_any {
        return Vec::new();
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let table = read_str("id,name\n1,alice\n2,bob\n").unwrap();
        assert_eq!(table.columns, vec!["id", "name"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["2".to_string(), "bob".to_string()]);
    }

    #[test]
    fn test_parse_quoted_fields() {
        let table = read_str("a,b\n\"x,y\",\"say \"\"hi\"\"\"\n").unwrap();
        assert_eq!(table.rows[0][0], "x,y");
        assert_eq!(table.rows[0][1], "say \"hi\"");
    }

    #[test]
    fn test_parse_embedded_newline() {
        let table = read_str("a,b\n\"line1\nline2\",z\n").unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][0], "line1\nline2");
    }

    #[test]
    fn test_parse_crlf() {
        let table = read_str("a,b\r\n1,2\r\n").unwrap();
        assert_eq!(table.rows, vec![vec!["1".to_string(), "2".to_string()]]);
    }

    #[test]
    fn test_no_trailing_newline() {
        let table = read_str("a,b\n1,2").unwrap();
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(read_str("").is_err());
    }

    #[test]
    fn test_write_round_trip() {
        let mut table = DataTable::new(vec!["a".into(), "b".into()]);
        table.push_row(vec!["plain".into(), "needs,quote".into()]);
        table.push_row(vec!["has \"q\"".into(), "multi\nline".into()]);

        let csv = write_str(&table);
        let round = read_str(&csv).unwrap();
        assert_eq!(round, table);
    }
}
