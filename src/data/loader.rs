use std::path::Path;

use crate::data::parser;
use crate::error::LoadError;

/// Raw contents of a data file: column names and column data as strings.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub column_data: Vec<Vec<String>>, // column-major: column_data[col_idx][row_idx]
    pub row_count: usize,
}

impl RawTable {
    /// Build a table from a header row and row-major data rows. Short rows are
    /// padded with empty cells.
    pub fn from_rows(header: &[String], data_rows: &[Vec<String>]) -> Self {
        let columns: Vec<String> = header.iter().map(|s| s.trim().to_string()).collect();
        let mut column_data: Vec<Vec<String>> = vec![Vec::with_capacity(data_rows.len()); columns.len()];

        for row in data_rows {
            for (col_idx, col_data) in column_data.iter_mut().enumerate() {
                col_data.push(row.get(col_idx).cloned().unwrap_or_default());
            }
        }

        Self {
            columns,
            column_data,
            row_count: data_rows.len(),
        }
    }

    /// Case-insensitive column lookup.
    pub fn column(&self, name: &str) -> Option<&[String]> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
            .map(|idx| self.column_data[idx].as_slice())
    }
}

/// Load a CSV or Excel file and return the column names and raw string data.
pub fn load_table(path: &Path) -> Result<RawTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let table = match ext.as_str() {
        "csv" | "txt" => load_csv(path)?,
        "xls" | "xlsx" => load_excel(path)?,
        _ => return Err(LoadError::UnsupportedFormat(ext)),
    };

    if table.row_count == 0 {
        return Err(LoadError::Empty(path.to_path_buf()));
    }
    tracing::debug!(
        "Loaded {} rows x {} columns from {:?}",
        table.row_count,
        table.columns.len(),
        path
    );
    Ok(table)
}

fn load_csv(path: &Path) -> Result<RawTable, LoadError> {
    let content = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = parser::decode_text(content);
    let header_row = parser::detect_csv_header(&text, b',', 50);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut all_rows: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        all_rows.push(record.iter().map(str::to_string).collect());
    }

    if header_row >= all_rows.len() {
        return Err(LoadError::Empty(path.to_path_buf()));
    }

    Ok(RawTable::from_rows(
        &all_rows[header_row],
        &all_rows[header_row + 1..],
    ))
}

fn load_excel(path: &Path) -> Result<RawTable, LoadError> {
    use calamine::{open_workbook_auto, Data, Reader};

    let spreadsheet_err = |message: String| LoadError::Spreadsheet {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_err(e.to_string()))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| spreadsheet_err("No sheets found".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| spreadsheet_err(e.to_string()))?;

    let rows: Vec<Vec<Option<String>>> = range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => None,
                    Data::String(s) => Some(s.clone()),
                    Data::Float(f) => Some(f.to_string()),
                    Data::Int(i) => Some(i.to_string()),
                    Data::Bool(b) => Some(b.to_string()),
                    Data::DateTime(dt) => dt
                        .as_datetime()
                        .map(|ts| crate::data::datetime::format_timestamp(&ts))
                        .or_else(|| Some(dt.to_string())),
                    Data::DateTimeIso(s) => Some(s.clone()),
                    Data::DurationIso(s) => Some(s.clone()),
                    Data::Error(e) => Some(format!("{e:?}")),
                })
                .collect()
        })
        .collect();

    if rows.is_empty() {
        return Err(LoadError::Empty(path.to_path_buf()));
    }

    let header_row = parser::detect_sheet_header(&rows);
    let to_strings = |row: &Vec<Option<String>>| -> Vec<String> {
        row.iter().map(|c| c.clone().unwrap_or_default()).collect()
    };
    let header = to_strings(&rows[header_row]);
    let data_rows: Vec<Vec<String>> = rows[header_row + 1..].iter().map(to_strings).collect();

    Ok(RawTable::from_rows(&header, &data_rows))
}

/// Parse a string column as numbers. Unparsable or non-finite cells become
/// `None`.
pub fn column_to_f64(data: &[String]) -> Vec<Option<f64>> {
    data.iter()
        .map(|s| s.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect()
}
