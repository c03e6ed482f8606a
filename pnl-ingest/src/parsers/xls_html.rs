//! XLS-HTML statement extractor.
//!
//! The bank's "XLS" export is an HTML document with the transactions in a
//! table. The table is located by its Hebrew column headers; after the
//! header row is found, data cells are read positionally by column index
//! (header cells carry extra whitespace and markup). Rows whose date cell
//! does not parse as a date, such as a trailing totals row, are skipped
//! silently.

use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

use crate::detect::looks_like_date;
use crate::error::IngestError;
use crate::types::{RawRow, SourceFormat};

fn tr_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("tr").expect("static selector"))
}

struct ColumnLayout {
    date: usize,
    description: usize,
    debit: usize,
    credit: usize,
    balance: usize,
}

impl ColumnLayout {
    fn from_header(cells: &[String]) -> Option<Self> {
        let find = |kw: &str| cells.iter().position(|c| c.contains(kw));
        Some(Self {
            date: find("תאריך")?,
            description: find("תיאור")?,
            debit: find("חובה")?,
            credit: find("זכות")?,
            balance: find("יתרה")?,
        })
    }

    fn width(&self) -> usize {
        [
            self.date,
            self.description,
            self.debit,
            self.credit,
            self.balance,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }
}

fn cell_texts(tr: ElementRef<'_>) -> Vec<String> {
    tr.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| {
            let name = cell.value().name();
            name.eq_ignore_ascii_case("td") || name.eq_ignore_ascii_case("th")
        })
        .map(|cell| {
            cell.text()
                .collect::<Vec<_>>()
                .join(" ")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

pub(crate) fn extract(bytes: &[u8]) -> Result<Vec<RawRow>, IngestError> {
    let html = std::str::from_utf8(bytes)?;
    parse_html(html)
}

pub(crate) fn parse_html(html: &str) -> Result<Vec<RawRow>, IngestError> {
    let doc = Html::parse_document(html);

    let all_rows: Vec<Vec<String>> = doc.select(tr_selector()).map(cell_texts).collect();

    let (header_idx, layout) = all_rows
        .iter()
        .enumerate()
        .find_map(|(idx, cells)| ColumnLayout::from_header(cells).map(|l| (idx, l)))
        .ok_or_else(|| IngestError::FormatMismatch {
            format: SourceFormat::XlsHtml,
            reason: "transaction table with expected headers not found".to_string(),
        })?;

    let mut rows = Vec::new();
    for (idx, cells) in all_rows.iter().enumerate().skip(header_idx + 1) {
        if cells.len() < layout.width() {
            continue;
        }
        let date_text = cells[layout.date].clone();
        if !looks_like_date(&date_text) {
            // Totals and footer rows land here
            continue;
        }
        rows.push(RawRow {
            date_text,
            description_text: cells[layout.description].clone(),
            amount_text: None,
            debit_text: Some(cells[layout.debit].clone()),
            credit_text: Some(cells[layout.credit].clone()),
            balance_text: Some(cells[layout.balance].clone()),
            source_line: idx,
        });
    }

    Ok(rows)
}
