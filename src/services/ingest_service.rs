use crate::core::{
    FileRecord, IngestError, IngestOptions, Row, RowLengthPolicy, SourceType, Table,
};
use calamine::{Data, Reader};
use chrono::Timelike;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, warn};

/// A decoded file together with its metadata
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub record: FileRecord,
    pub table: Table,
}

/// IngestService turns raw file bytes into a uniform [`Table`]
///
/// This service is responsible for:
/// - Picking a decode strategy from the file name
/// - Decoding delimited text (with a Windows-1252 fallback for non UTF-8 input)
/// - Decoding the configured worksheet of a spreadsheet
/// - Dropping blank rows and applying the row length policy
pub struct IngestService {
    options: IngestOptions,
}

impl IngestService {
    pub fn new(options: IngestOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    /// Read and decode a file from disk
    pub fn ingest_path(&self, path: &Path) -> Result<LoadedFile, IngestError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unnamed")
            .to_string();

        // Reject unknown formats before touching the file
        let source_type = SourceType::from_file_name(&name)
            .ok_or_else(|| IngestError::UnsupportedFormat(name.clone()))?;

        let bytes = std::fs::read(path)?;
        let table = self.decode(source_type, &bytes)?;
        let record = FileRecord::new(name, source_type, &table);

        info!(
            "Loaded '{}' as {}: {} columns, {} rows",
            record.name, source_type, record.column_count, record.row_count
        );
        Ok(LoadedFile { record, table })
    }

    /// Decode bytes; `name` only selects the strategy
    pub fn ingest(&self, name: &str, bytes: &[u8]) -> Result<Table, IngestError> {
        let source_type = SourceType::from_file_name(name)
            .ok_or_else(|| IngestError::UnsupportedFormat(name.to_string()))?;
        self.decode(source_type, bytes)
    }

    fn decode(&self, source_type: SourceType, bytes: &[u8]) -> Result<Table, IngestError> {
        let records = match source_type {
            SourceType::Csv => self.decode_csv(bytes),
            SourceType::Spreadsheet => self.decode_spreadsheet(bytes),
        }
        .inspect_err(|e| warn!("Failed to decode {} input: {}", source_type, e))?;
        self.build_table(records)
    }

    fn decode_csv(&self, bytes: &[u8]) -> Result<Vec<Row>, IngestError> {
        let text = decode_text(bytes);

        let delimiter = u8::try_from(self.options.delimiter).map_err(|_| {
            IngestError::Read(format!(
                "delimiter '{}' is not a single-byte character",
                self.options.delimiter
            ))
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(text.as_bytes());

        let mut records = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result
                .map_err(|e| IngestError::Read(format!("record {}: {}", index + 1, e)))?;
            records.push(record.iter().map(str::to_string).collect());
        }
        debug!("Parsed {} delimited records", records.len());
        Ok(records)
    }

    fn decode_spreadsheet(&self, bytes: &[u8]) -> Result<Vec<Row>, IngestError> {
        let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

        let sheet_index = self.options.sheet_index;
        let range = match workbook.worksheet_range_at(sheet_index) {
            Some(range) => range?,
            None if sheet_index == 0 => return Err(IngestError::EmptyFile),
            None => {
                return Err(IngestError::Read(format!(
                    "workbook has no worksheet at index {sheet_index}"
                )));
            }
        };

        let records: Vec<Row> = range
            .rows()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();
        debug!("Parsed {} worksheet rows", records.len());
        Ok(records)
    }

    /// Split headers from data, drop blank rows and apply the row length policy
    fn build_table(&self, mut records: Vec<Row>) -> Result<Table, IngestError> {
        if records.is_empty() {
            return Err(IngestError::EmptyFile);
        }

        let headers = if self.options.header_row {
            records.remove(0)
        } else {
            let width = records.iter().map(Vec::len).max().unwrap_or(0);
            (1..=width).map(|i| format!("column_{i}")).collect()
        };

        let width = headers.len();
        let rows = records
            .into_iter()
            .filter(|row| !is_blank(row))
            .map(|row| apply_policy(row, width, self.options.row_length_policy))
            .collect();

        Ok(Table::new(headers, rows))
    }
}

impl Default for IngestService {
    fn default() -> Self {
        Self::new(IngestOptions::default())
    }
}

fn is_blank(row: &Row) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

fn apply_policy(mut row: Row, width: usize, policy: RowLengthPolicy) -> Row {
    match policy {
        RowLengthPolicy::Keep => {}
        RowLengthPolicy::Pad => {
            if row.len() < width {
                row.resize(width, String::new());
            }
        }
        RowLengthPolicy::Truncate => row.truncate(width),
    }
    row
}

/// UTF-8 (BOM stripped) when valid, Windows-1252 otherwise
fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// String form of a spreadsheet cell
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(d) => match d.as_datetime() {
            Some(dt) if dt.hour() == 0 && dt.minute() == 0 && dt.second() == 0 => {
                dt.format("%Y-%m-%d").to_string()
            }
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => d.as_f64().to_string(),
        },
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}
