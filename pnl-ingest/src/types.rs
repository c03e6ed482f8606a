use pnl_core::Transaction;
use serde::{Deserialize, Serialize};

use crate::error::IngestError;

/// Closed set of recognized source formats. Adding a format is a
/// compile-time-checked extension: the builder matches exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceFormat {
    PdfStatement,
    XlsHtml,
    CsvBankV1,
    CsvBankV2,
    CsvStandard,
}

/// A fully-buffered input file handed in by the upload collaborator.
/// The core never touches a filesystem path.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Account identifier derived from the file name (stem without extension)
    pub fn account(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.name,
        }
    }

    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
    }
}

/// Format-agnostic intermediate record produced by every extractor and
/// consumed only by the transaction builder. Amounts are still raw text here.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct RawRow {
    pub date_text: String,
    pub description_text: String,
    pub amount_text: Option<String>,
    pub debit_text: Option<String>,
    pub credit_text: Option<String>,
    pub balance_text: Option<String>,
    pub source_line: usize,
}

/// A row that failed to normalize; dropped from the ledger but reported
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RowError {
    pub source_line: usize,
    pub reason: String,
}

/// Successful per-file output: the canonical transactions plus every row
/// that was dropped along the way. Never a silent partial success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    pub account: String,
    pub format: SourceFormat,
    pub transactions: Vec<Transaction>,
    pub dropped_rows: Vec<RowError>,
}

/// A file that failed as a whole, isolated from its batch siblings
#[derive(Debug)]
pub struct FileFailure {
    pub file: String,
    pub error: IngestError,
}

/// Outcome of a multi-file ingest: one entry per file, success or failure
#[derive(Debug, Default)]
pub struct BatchResult {
    pub statements: Vec<Statement>,
    pub failures: Vec<FileFailure>,
}

impl BatchResult {
    /// Concatenate all per-account transaction sequences. No deduplication
    /// is attempted across files; the same statement uploaded twice
    /// double-counts.
    pub fn merged_transactions(&self) -> Vec<Transaction> {
        self.statements
            .iter()
            .flat_map(|s| s.transactions.iter().cloned())
            .collect()
    }

    pub fn dropped_row_count(&self) -> usize {
        self.statements.iter().map(|s| s.dropped_rows.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_from_file_name() {
        let f = InputFile::new("leumi_2024_q1.csv", vec![]);
        assert_eq!(f.account(), "leumi_2024_q1");
        assert_eq!(f.extension().as_deref(), Some("csv"));

        let bare = InputFile::new("statement", vec![]);
        assert_eq!(bare.account(), "statement");
        assert_eq!(bare.extension(), None);
    }
}
