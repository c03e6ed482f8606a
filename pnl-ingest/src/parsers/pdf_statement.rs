//! PDF statement extractor.
//!
//! Statement pages are flattened to text, then matched line by line against
//! the positional row layout the bank prints:
//!
//!   balance  amount  reference  description  value-date  posting-date
//!
//! Hebrew description runs arrive in visual order and are restored before
//! they leave this module. Lines that fail the pattern are counted rather
//! than aborting; too many of them means the file is not the expected
//! statement layout at all.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::IngestError;
use crate::rtl;
use crate::types::{RawRow, SourceFormat};

/// Fraction of date-bearing lines allowed to miss the row pattern before
/// the whole extraction is rejected
const UNPARSED_TOLERANCE: f64 = 0.25;

/// Hebrew banking markers expected somewhere in a genuine statement, in both
/// logical and visually-reversed spellings
const STATEMENT_INDICATORS: [&str; 8] = [
    "לאומי", "ימואל", "תנועות", "תועונת", "חשבון", "ןובשח", "יתרה", "הרתי",
];

fn row_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"^\s*(?P<balance>\(?[\d,]+(?:\.\d{1,2})?\)?-?)\s+",
            r"(?P<amount>\(?[\d,]+(?:\.\d{1,2})?\)?-?)\s+",
            r"(?P<reference>\S+)\s+",
            r"(?P<desc>.+?)\s+",
            r"(?P<value_date>\d{2}/\d{2}/\d{2})\s+",
            r"(?P<posting_date>\d{2}/\d{2}/\d{2})\s*$",
        ))
        .expect("static regex")
    })
}

fn date_probe_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{2}/\d{2}/\d{2}").expect("static regex"))
}

/// Extraction output: recovered rows plus every candidate line that did not
/// match, kept for diagnostics.
#[derive(Debug)]
pub(crate) struct PdfExtraction {
    pub rows: Vec<RawRow>,
    pub unparsed: Vec<(usize, String)>,
}

/// Flatten PDF bytes to text and parse statement rows out of it.
pub(crate) fn extract(bytes: &[u8]) -> Result<PdfExtraction, IngestError> {
    let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
        IngestError::FormatMismatch {
            format: SourceFormat::PdfStatement,
            reason: format!("pdf text extraction failed: {e}"),
        }
    })?;
    parse_text(&text)
}

/// Parse already-extracted statement text. Split from [`extract`] so the
/// line-level logic is testable without PDF fixtures.
pub(crate) fn parse_text(text: &str) -> Result<PdfExtraction, IngestError> {
    if !STATEMENT_INDICATORS.iter().any(|kw| text.contains(kw)) {
        return Err(IngestError::FormatMismatch {
            format: SourceFormat::PdfStatement,
            reason: "no bank statement markers in extracted text".to_string(),
        });
    }

    let mut rows = Vec::new();
    let mut unparsed = Vec::new();
    let mut candidates = 0usize;

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || !date_probe_re().is_match(line) {
            continue;
        }
        candidates += 1;

        match row_re().captures(line) {
            Some(caps) => {
                let description = rtl::restore_visual_order(caps["desc"].trim());
                rows.push(RawRow {
                    date_text: caps["posting_date"].to_string(),
                    description_text: description,
                    amount_text: Some(caps["amount"].to_string()),
                    debit_text: None,
                    credit_text: None,
                    balance_text: Some(caps["balance"].to_string()),
                    source_line: idx,
                });
            }
            None => unparsed.push((idx, line.to_string())),
        }
    }

    if candidates == 0 {
        return Err(IngestError::FormatMismatch {
            format: SourceFormat::PdfStatement,
            reason: "no transaction-shaped lines in extracted text".to_string(),
        });
    }

    let unparsed_fraction = unparsed.len() as f64 / candidates as f64;
    if unparsed_fraction > UNPARSED_TOLERANCE {
        return Err(IngestError::FormatMismatch {
            format: SourceFormat::PdfStatement,
            reason: format!(
                "{} of {} transaction-shaped lines did not match the row layout",
                unparsed.len(),
                candidates
            ),
        });
    }

    Ok(PdfExtraction { rows, unparsed })
}
