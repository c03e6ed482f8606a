//! CSV statement normalizer for the three known schema variants.
//!
//! V1 and V2 share the four-column `Date,Description,Amount,Balance` layout
//! (they differ in date format and sign convention, which the builder
//! resolves); Standard is the canonical five-column export. The `csv` reader
//! handles quoted embedded commas and CRLF; blank trailing records and the
//! line-ending-only artifact at EOF are dropped here.

use crate::error::IngestError;
use crate::types::{RawRow, SourceFormat};

pub(crate) fn extract(text: &str, format: SourceFormat) -> Result<Vec<RawRow>, IngestError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let five_column = match format {
        SourceFormat::CsvBankV1 | SourceFormat::CsvBankV2 => false,
        SourceFormat::CsvStandard => true,
        SourceFormat::PdfStatement | SourceFormat::XlsHtml => {
            return Err(IngestError::FormatMismatch {
                format,
                reason: "not a delimited text format".to_string(),
            });
        }
    };

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| IngestError::FormatMismatch {
            format,
            reason: format!("csv parse error: {e}"),
        })?;

        // Header already verified by detection
        if idx == 0 {
            continue;
        }
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let cell = |i: usize| record.get(i).unwrap_or("").trim().to_string();
        rows.push(RawRow {
            date_text: cell(0),
            description_text: cell(1),
            amount_text: Some(cell(2)),
            debit_text: None,
            credit_text: None,
            // Standard carries Category,Type in columns 3-4 instead of a
            // balance; the builder reclassifies from description keywords
            balance_text: if five_column { None } else { Some(cell(3)) },
            source_line: idx,
        });
    }

    Ok(rows)
}
