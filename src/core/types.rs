use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

/// A single record: ordered cell strings. A cell past the end of the row is absent.
pub type Row = Vec<String>;

/// Identifier for one loaded file. A new upload starts a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for one opened detail view instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(Uuid);

impl ViewId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ViewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a row for enrichment caching: the session it was loaded in plus
/// its index in the base dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowKey {
    pub session: SessionId,
    pub row: usize,
}

impl RowKey {
    pub fn new(session: SessionId, row: usize) -> Self {
        Self { session, row }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.session, self.row)
    }
}

/// Decode strategy picked from the file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceType {
    Csv,
    Spreadsheet,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Spreadsheet => "spreadsheet",
        }
    }

    /// Pick a decode strategy by extension (case-insensitive)
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())?;
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Spreadsheet),
            _ => None,
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(Self::Csv),
            "spreadsheet" => Ok(Self::Spreadsheet),
            _ => Err(format!("Unknown source type: {}", s)),
        }
    }
}

/// What to do with rows whose cell count differs from the header count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowLengthPolicy {
    /// Leave rows exactly as parsed
    #[default]
    Keep,
    /// Pad short rows with empty cells up to the header count
    Pad,
    /// Drop cells beyond the header count
    Truncate,
}

/// Ingestion options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestOptions {
    /// First record holds the column names
    pub header_row: bool,
    /// Worksheet to decode for spreadsheet files
    pub sheet_index: usize,
    pub delimiter: char,
    pub row_length_policy: RowLengthPolicy,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            header_row: true,
            sheet_index: 0,
            delimiter: ',',
            row_length_policy: RowLengthPolicy::Keep,
        }
    }
}

/// The base dataset produced by ingestion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Cell text; a missing cell reads as empty
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Header-to-value mapping for one base row
    pub fn field_mapping(&self, row: usize) -> Option<FieldMapping> {
        self.rows
            .get(row)
            .map(|r| FieldMapping::from_row(&self.headers, r))
    }
}

/// Header-to-cell association for one row.
///
/// Entries keep header order for display. Lookups follow object-key semantics:
/// when a header repeats, the later value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    entries: Vec<(String, String)>,
}

impl FieldMapping {
    pub fn from_row(headers: &[String], row: &[String]) -> Self {
        let entries = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), row.get(i).cloned().unwrap_or_default()))
            .collect();
        Self { entries }
    }

    pub fn from_pairs<K: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// All pairs in header order, duplicates included
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value for an exact key; the last pairing wins
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First alias with a non-empty value
    pub fn resolve<S: AsRef<str>>(&self, aliases: &[S]) -> Option<&str> {
        aliases
            .iter()
            .filter_map(|alias| self.get(alias.as_ref()))
            .find(|v| !v.is_empty())
    }

    /// Like [`resolve`](Self::resolve) but falls back to `placeholder`
    pub fn resolve_or<'a, S: AsRef<str>>(&'a self, aliases: &[S], placeholder: &'a str) -> &'a str {
        self.resolve(aliases).unwrap_or(placeholder)
    }

    /// One entry per distinct key, at the key's first position, carrying the
    /// key's effective (last) value.
    pub fn lookup_entries(&self) -> Vec<(&str, &str)> {
        let mut out: Vec<(&str, &str)> = Vec::with_capacity(self.entries.len());
        for (k, _) in &self.entries {
            if out.iter().any(|(seen, _)| *seen == k.as_str()) {
                continue;
            }
            if let Some(v) = self.get(k) {
                out.push((k.as_str(), v));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_session_id_creation() {
        let id1 = SessionId::new();
        let id2 = SessionId::new();

        assert_ne!(id1, id2, "IDs should be unique");
        assert!(!id1.as_str().is_empty());
    }

    #[test]
    fn test_source_type_from_file_name() {
        assert_eq!(SourceType::from_file_name("leads.csv"), Some(SourceType::Csv));
        assert_eq!(SourceType::from_file_name("LEADS.CSV"), Some(SourceType::Csv));
        assert_eq!(SourceType::from_file_name("book.xlsx"), Some(SourceType::Spreadsheet));
        assert_eq!(SourceType::from_file_name("book.xls"), Some(SourceType::Spreadsheet));
        assert_eq!(SourceType::from_file_name("notes.txt"), None);
        assert_eq!(SourceType::from_file_name("no_extension"), None);
    }

    #[test]
    fn test_source_type_conversion() {
        assert_eq!(SourceType::from_str("csv").unwrap(), SourceType::Csv);
        assert_eq!(SourceType::Spreadsheet.as_str(), "spreadsheet");
        assert!(SourceType::from_str("parquet").is_err());
    }

    #[test]
    fn test_table_cell_missing_reads_empty() {
        let table = Table::new(strings(&["a", "b", "c"]), vec![strings(&["1"])]);
        assert_eq!(table.cell(0, 0), "1");
        assert_eq!(table.cell(0, 2), "");
        assert_eq!(table.cell(5, 0), "");
    }

    #[test]
    fn test_field_mapping_later_duplicate_wins() {
        let mapping = FieldMapping::from_row(
            &strings(&["Name", "Email", "Name"]),
            &strings(&["first", "x@y.z", "second"]),
        );
        assert_eq!(mapping.get("Name"), Some("second"));
        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping.lookup_entries(), vec![("Name", "second"), ("Email", "x@y.z")]);
    }

    #[test]
    fn test_field_mapping_short_row_reads_empty() {
        let mapping = FieldMapping::from_row(&strings(&["a", "b"]), &strings(&["1"]));
        assert_eq!(mapping.get("b"), Some(""));
        assert_eq!(mapping.get("zzz"), None);
    }

    #[test]
    fn test_resolve_skips_empty_aliases() {
        let mapping = FieldMapping::from_pairs([("Contact Name", ""), ("Nom", "Dupont")]);
        assert_eq!(mapping.resolve(&["Contact Name", "Nom"]), Some("Dupont"));
        assert_eq!(mapping.resolve_or(&["Missing"], "valued prospect"), "valued prospect");
    }
}
