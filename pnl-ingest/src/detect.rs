//! Format detection: classify a raw file into one of the known source
//! formats, or refuse. Detection fails closed; `None` means the file is
//! rejected, never parsed on a best-effort basis.

use regex::Regex;
use std::sync::OnceLock;

use crate::types::{InputFile, SourceFormat};

const BANK_HEADER: [&str; 4] = ["Date", "Description", "Amount", "Balance"];
const STANDARD_HEADER: [&str; 5] = ["Date", "Description", "Amount", "Category", "Type"];

fn ddmmyy_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{2}/\d{2}/\d{2}$").expect("static regex"))
}

fn iso_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static regex"))
}

/// True if the cell text is shaped like one of the accepted date formats
pub(crate) fn looks_like_date(cell: &str) -> bool {
    let cell = cell.trim();
    ddmmyy_re().is_match(cell) || iso_date_re().is_match(cell)
}

/// Classify a file by extension and, for text content, by its header line
/// and the date shape of the first data row. Tolerates a UTF-8 BOM and both
/// CRLF and LF line endings.
pub fn detect_format(file: &InputFile) -> Option<SourceFormat> {
    match file.extension().as_deref() {
        Some("pdf") => return Some(SourceFormat::PdfStatement),
        Some("xls") => return Some(SourceFormat::XlsHtml),
        _ => {}
    }

    let text = std::str::from_utf8(&file.bytes).ok()?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut lines = text
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty());

    let header: Vec<&str> = lines.next()?.split(',').map(str::trim).collect();

    if header == STANDARD_HEADER {
        return Some(SourceFormat::CsvStandard);
    }

    if header == BANK_HEADER {
        // V1 vs V2 is decided solely by the first data row's date shape
        let first_cell = lines.next()?.split(',').next()?.trim().to_string();
        if ddmmyy_re().is_match(&first_cell) {
            return Some(SourceFormat::CsvBankV1);
        }
        if iso_date_re().is_match(&first_cell) {
            return Some(SourceFormat::CsvBankV2);
        }
    }

    None
}
