//! JSON reading and writing.
//!
//! Three source shapes are accepted: an array of objects (one row per
//! object), a single flat object (one row), and a nested object (flattened
//! to dotted-path keys, one row). Output is always an array of records.

use serde_json::{Map, Number, Value};

use fileconvert_core::error::{ConvertError, Result};

use crate::table::DataTable;

pub fn read_str(content: &str) -> Result<DataTable> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| ConvertError::TransformFault(format!("invalid JSON: {}", e)))?;

    match value {
        Value::Array(items) => read_records(items),
        Value::Object(map) => {
            if map.values().any(|v| v.is_object()) {
                let mut flat = Map::new();
                flatten_into(&mut flat, "", &Value::Object(map));
                read_single_object(flat)
            } else {
                read_single_object(map)
            }
        }
        other => Err(ConvertError::TransformFault(format!(
            "unsupported JSON shape: {}",
            shape_name(&other)
        ))),
    }
}

fn read_records(items: Vec<Value>) -> Result<DataTable> {
    let mut columns: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(items.len());

    for item in items {
        match item {
            Value::Object(map) => {
                for key in map.keys() {
                    if !columns.iter().any(|c| c == key) {
                        columns.push(key.clone());
                    }
                }
                objects.push(map);
            }
            other => {
                return Err(ConvertError::TransformFault(format!(
                    "JSON array element is not an object: {}",
                    shape_name(&other)
                )))
            }
        }
    }

    let mut table = DataTable::new(columns);
    for map in objects {
        let row = table
            .columns
            .iter()
            .map(|col| map.get(col).map(value_to_cell).unwrap_or_default())
            .collect();
        table.rows.push(row);
    }
    Ok(table)
}

fn read_single_object(map: Map<String, Value>) -> Result<DataTable> {
    let columns: Vec<String> = map.keys().cloned().collect();
    let row: Vec<String> = map.values().map(value_to_cell).collect();
    let mut table = DataTable::new(columns);
    table.rows.push(row);
    Ok(table)
}

/// Flatten nested objects into dotted-path keys. Arrays and scalars are
/// stringified in place.
fn flatten_into(out: &mut Map<String, Value>, prefix: &str, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(out, &path, val);
            }
        }
        other => {
            out.insert(prefix.to_string(), other.clone());
        }
    }
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Serialize as an array of records. Cells that round-trip as numbers or
/// booleans are written typed; everything else stays a string.
pub fn write_str(table: &DataTable) -> Result<String> {
    let records: Vec<Value> = table
        .rows
        .iter()
        .map(|row| {
            let mut map = Map::new();
            for (col, cell) in table.columns.iter().zip(row) {
                map.insert(col.clone(), cell_to_value(cell));
            }
            Value::Object(map)
        })
        .collect();

    serde_json::to_string_pretty(&Value::Array(records))
        .map_err(|e| ConvertError::TransformFault(format!("JSON serialize: {}", e)))
}

fn cell_to_value(cell: &str) -> Value {
    if let Ok(i) = cell.parse::<i64>() {
        // Reject representations that would change on round trip ("007").
        if i.to_string() == cell {
            return Value::Number(Number::from(i));
        }
    }
    if let Ok(f) = cell.parse::<f64>() {
        if f.is_finite() && f.to_string() == cell {
            if let Some(n) = Number::from_f64(f) {
                return Value::Number(n);
            }
        }
    }
    match cell {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(cell.to_string()),
    }
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
