//! Tabular conversion strategy: CSV/XLSX/JSON in, CSV/XLSX/JSON/XML/HTML
//! out, through a single row/column table structure.

pub mod csv;
pub mod json_io;
pub mod markup;
pub mod table;
pub mod xlsx;

use std::path::Path;

use fileconvert_core::error::{ConvertError, Result};
use fileconvert_core::format::FileFormat;
use fileconvert_core::options::ConversionOptions;
use fileconvert_core::progress::ProgressSink;
use fileconvert_core::strategy::{verify_output, ConversionStrategy};

pub use table::DataTable;

pub struct TabularStrategy;

impl ConversionStrategy for TabularStrategy {
    fn name(&self) -> &str {
        "Tabular"
    }

    fn run(
        &self,
        source: &Path,
        target: &Path,
        progress: &dyn ProgressSink,
        _options: &ConversionOptions,
    ) -> Result<()> {
        progress.report(10);

        let source_format = format_of(source)?;
        let target_format = format_of(target)?;

        let table = read_table(source, source_format)?;
        progress.report(50);

        write_table(target, target_format, &table)?;
        verify_output(target)?;
        progress.report(100);

        log::info!(
            "converted {} rows x {} columns: {} -> {}",
            table.rows.len(),
            table.columns.len(),
            source_format,
            target_format
        );
        Ok(())
    }
}

fn format_of(path: &Path) -> Result<FileFormat> {
    FileFormat::from_extension(path.extension().and_then(|e| e.to_str()).unwrap_or(""))
        .ok_or_else(|| ConvertError::unsupported(None, None))
}

/// Load a source file into a table based on its format.
pub fn read_table(source: &Path, format: FileFormat) -> Result<DataTable> {
    match format {
        FileFormat::Csv => {
            let content = std::fs::read_to_string(source)
                .map_err(|e| ConvertError::TransformFault(format!("cannot read CSV: {}", e)))?;
            csv::read_str(&content)
        }
        FileFormat::Xlsx => xlsx::read_file(source),
        FileFormat::Json => {
            let content = std::fs::read_to_string(source)
                .map_err(|e| ConvertError::TransformFault(format!("cannot read JSON: {}", e)))?;
            json_io::read_str(&content)
        }
        other => Err(ConvertError::unsupported(Some(other), None)),
    }
}

/// Write a table to the target format.
pub fn write_table(target: &Path, format: FileFormat, table: &DataTable) -> Result<()> {
    match format {
        FileFormat::Csv => std::fs::write(target, csv::write_str(table))?,
        FileFormat::Xlsx => xlsx::write_file(target, table)?,
        FileFormat::Json => std::fs::write(target, json_io::write_str(table)?)?,
        FileFormat::Xml => std::fs::write(target, markup::to_xml(table)?)?,
        FileFormat::Html => std::fs::write(target, markup::to_html(table))?,
        other => return Err(ConvertError::unsupported(None, Some(other))),
    }
    Ok(())
}
