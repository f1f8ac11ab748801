//! Error types for file ingestion

/// Failures that stop a load operation
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The decoded record set has no records at all
    #[error("the file is empty")]
    EmptyFile,

    /// The file name matches neither the delimited nor the spreadsheet family
    #[error("unsupported file format '{0}' (expected .csv, .xlsx or .xls)")]
    UnsupportedFormat(String),

    /// The byte stream could not be decoded
    #[error("failed to read file: {0}")]
    Read(String),
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::Read(err.to_string())
    }
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        IngestError::Read(err.to_string())
    }
}

impl From<calamine::Error> for IngestError {
    fn from(err: calamine::Error) -> Self {
        IngestError::Read(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(IngestError::EmptyFile.to_string(), "the file is empty");
        assert!(
            IngestError::UnsupportedFormat("notes.txt".into())
                .to_string()
                .contains("notes.txt")
        );
    }

    #[test]
    fn test_io_error_maps_to_read() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "interrupted");
        assert!(matches!(IngestError::from(io), IngestError::Read(_)));
    }
}
