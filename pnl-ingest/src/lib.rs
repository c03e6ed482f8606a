//! pnl-ingest: statement format detection, document/CSV extraction, and the
//! transaction builder that turns raw statement rows into canonical
//! transactions.

pub mod builder;
pub mod detect;
pub mod error;
pub mod export;
mod numbers;
mod parsers;
mod rtl;
pub mod types;

pub use builder::{CategoryRule, ClassifierConfig, ingest_batch, ingest_file};
pub use detect::detect_format;
pub use error::IngestError;
pub use export::{to_bank_v1_csv, to_standard_csv};
pub use types::{BatchResult, FileFailure, InputFile, RowError, SourceFormat, Statement};
