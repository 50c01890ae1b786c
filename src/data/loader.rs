use std::borrow::Cow;
use std::fmt;
use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader};
use encoding_rs::Encoding;
use serde::Serialize;

use super::error::LoadError;
use super::model::Dataset;
use super::schema::{normalize_column_name, parse_whole_number, ColumnIndex};

/// Encoding label used when the caller does not declare one.
pub const DEFAULT_ENCODING: &str = "utf-8";

// ---------------------------------------------------------------------------
// Source format
// ---------------------------------------------------------------------------

/// Declared layout of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SourceFormat {
    Csv,
    Excel,
    TabDelimited,
}

impl SourceFormat {
    /// Parse a format tag such as `csv`, `excel` or `tab-delimited`.
    pub fn from_tag(tag: &str) -> Result<Self, LoadError> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "excel" | "xlsx" | "xls" => Ok(Self::Excel),
            "tab" | "tsv" | "txt" | "tab-delimited" => Ok(Self::TabDelimited),
            _ => Err(LoadError::UnsupportedFormat(tag.to_string())),
        }
    }

    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" | "xls" | "xlsm" | "xlsb" => Ok(Self::Excel),
            "txt" | "tsv" => Ok(Self::TabDelimited),
            other => Err(LoadError::UnsupportedFormat(format!(".{other}"))),
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "excel",
            Self::TabDelimited => "tab-delimited",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Parse `bytes` as a league table.
///
/// `encoding` is a WHATWG label (`utf-8`, `latin1`, `windows-1252`, ...) and
/// only applies to the text formats; a byte-order mark takes precedence.
pub fn load(bytes: &[u8], format: SourceFormat, encoding: &str) -> Result<Dataset, LoadError> {
    let table = match format {
        SourceFormat::Csv => read_delimited(bytes, b',', encoding)?,
        SourceFormat::TabDelimited => read_delimited(bytes, b'\t', encoding)?,
        SourceFormat::Excel => read_excel(bytes)?,
    };
    build_dataset(table)
}

/// Read a file from disk, choosing the format from its extension.
pub fn load_path(path: &Path, encoding: &str) -> Result<Dataset, LoadError> {
    let format = SourceFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    load(&bytes, format, encoding)
}

// ---------------------------------------------------------------------------
// Raw table: normalized headers + cell text
// ---------------------------------------------------------------------------

struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn build_dataset(table: RawTable) -> Result<Dataset, LoadError> {
    check_season_column(&table)?;
    let index = ColumnIndex::resolve(&table.headers)?;

    let rows = table
        .rows
        .iter()
        .enumerate()
        .map(|(i, cells)| index.build_row(cells.as_slice(), i + 1))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Dataset::new(rows, table.headers))
}

/// `season_end_year` is coerced before the required-column check, so a bad
/// season value is reported even when other columns are missing.
fn check_season_column(table: &RawTable) -> Result<(), LoadError> {
    for (col, header) in table.headers.iter().enumerate() {
        if header != "season_end_year" {
            continue;
        }
        for (i, cells) in table.rows.iter().enumerate() {
            let raw = cells.get(col).map(String::as_str).unwrap_or("");
            if parse_whole_number(raw).is_none() {
                return Err(LoadError::TypeCoercion {
                    column: header.clone(),
                    row: i + 1,
                    value: raw.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn is_blank(cells: &[String]) -> bool {
    cells.iter().all(|c| c.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Delimited text (CSV / TSV)
// ---------------------------------------------------------------------------

fn decode_text<'a>(bytes: &'a [u8], label: &str) -> Result<Cow<'a, str>, LoadError> {
    let encoding = Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| LoadError::UnsupportedEncoding(label.to_string()))?;

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        log::warn!("Malformed {} input; invalid bytes were replaced", used.name());
    }
    Ok(text)
}

fn read_delimited(bytes: &[u8], delimiter: u8, encoding: &str) -> Result<RawTable, LoadError> {
    let text = decode_text(bytes, encoding)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(normalize_column_name)
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let cells: Vec<String> = record.iter().map(str::to_string).collect();
        if is_blank(&cells) {
            continue;
        }
        rows.push(cells);
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// Excel
// ---------------------------------------------------------------------------

/// First worksheet, first row as header.
fn read_excel(bytes: &[u8]) -> Result<RawTable, LoadError> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::EmptyWorkbook)??;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = sheet_rows
        .next()
        .map(|header| {
            header
                .iter()
                .map(|c| normalize_column_name(&cell_text(c)))
                .collect()
        })
        .unwrap_or_default();

    let rows = sheet_rows
        .map(|r| r.iter().map(cell_text).collect::<Vec<_>>())
        .filter(|cells| !is_blank(cells))
        .collect();

    Ok(RawTable { headers, rows })
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        // Spreadsheets store every number as a float; keep whole numbers integral.
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 => format!("{f:.0}"),
        other => other.to_string(),
    }
}
