use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveDateTime};

use crate::data::datetime::DATE_FORMATS;

/// Decode file bytes as UTF-8, falling back to latin-1 (each byte maps to the
/// same Unicode code point).
pub fn decode_text(content: Vec<u8>) -> String {
    match String::from_utf8(content) {
        Ok(text) => text,
        Err(err) => err.into_bytes().iter().map(|&b| b as char).collect(),
    }
}

/// Detect the header row of CSV text. Returns the 0-based row index of the
/// last all-text row having the most common column count, or 0.
pub fn detect_csv_header(text: &str, delimiter: u8, max_lines: usize) -> usize {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let rows: Vec<Vec<String>> = reader
        .records()
        .take(max_lines)
        .filter_map(Result::ok)
        .map(|record| record.iter().map(str::to_string).collect::<Vec<_>>())
        .filter(|row| !row.is_empty())
        .collect();

    let mut counts: HashMap<usize, usize> = HashMap::new();
    for row in &rows {
        *counts.entry(row.len()).or_insert(0) += 1;
    }
    let most_common = counts
        .into_iter()
        .max_by_key(|&(len, c)| (c, len))
        .map(|(len, _)| len)
        .unwrap_or(0);

    (0..rows.len())
        .rev()
        .find(|&i| {
            let row = &rows[i];
            row.len() == most_common && row.iter().all(|cell| is_header_cell(cell))
        })
        .unwrap_or(0)
}

/// Detect the header row of spreadsheet rows (empty cells are `None`).
pub fn detect_sheet_header(rows: &[Vec<Option<String>>]) -> usize {
    let used_cols = rows
        .iter()
        .flat_map(|row| {
            row.iter()
                .enumerate()
                .filter(|(_, c)| c.is_some())
                .map(|(i, _)| i)
        })
        .collect::<HashSet<_>>()
        .len();

    (0..rows.len())
        .rev()
        .find(|&i| {
            let row = &rows[i];
            let non_empty = row.iter().filter(|c| c.is_some()).count();
            non_empty >= used_cols && row.iter().flatten().all(|cell| is_header_cell(cell))
        })
        .unwrap_or(0)
}

fn is_header_cell(cell: &str) -> bool {
    let trimmed = cell.trim();
    !trimmed.is_empty() && trimmed.parse::<f64>().is_err() && !is_date_like(trimmed)
}

fn is_date_like(s: &str) -> bool {
    let has_separators = s.contains('/') || s.contains(':') || s.contains('-');
    if !has_separators {
        return false;
    }

    DATE_FORMATS.iter().any(|fmt| {
        NaiveDateTime::parse_from_str(s, fmt).is_ok() || NaiveDate::parse_from_str(s, fmt).is_ok()
    }) || chrono::DateTime::parse_from_rfc3339(s).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_after_preamble() {
        let text = "Exported by hive gateway\n\
                    id,record,created_at\n\
                    1,412.0,2025-03-01 10:00:00\n\
                    2,415.5,2025-03-01 10:15:00\n";
        assert_eq!(detect_csv_header(text, b',', 50), 1);
    }

    #[test]
    fn headerless_file_defaults_to_first_row() {
        let text = "1,412.0,2025-03-01 10:00:00\n2,415.5,2025-03-01 10:15:00\n";
        assert_eq!(detect_csv_header(text, b',', 50), 0);
    }

    #[test]
    fn sheet_header_skips_title_row() {
        let rows = vec![
            vec![Some("Hive export".to_string()), None],
            vec![Some("created_at".to_string()), Some("record".to_string())],
            vec![Some("2025-03-01 10:00:00".to_string()), Some("35.1".to_string())],
        ];
        assert_eq!(detect_sheet_header(&rows), 1);
    }

    #[test]
    fn latin1_fallback() {
        assert_eq!(decode_text(vec![b'I', b'n', 0xB0, b'C']), "In\u{00B0}C");
    }
}
