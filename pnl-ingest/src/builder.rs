//! Transaction builder: the one place where raw field tuples become
//! canonical signed transactions.
//!
//! Each detected format commits to exactly one sign-resolution rule:
//!
//! - `CsvBankV2` / `CsvStandard`: the amount column is already signed and is
//!   used as-is.
//! - `XlsHtml`: separate debit and credit columns; amount = credit - debit.
//! - `CsvBankV1` / `PdfStatement`: the amount column is an unsigned
//!   magnitude; the sign comes from the running-balance movement, which
//!   requires a consistent chronological direction within the file.
//!
//! Rows whose date or amount cannot be parsed are dropped and reported,
//! never silently zeroed.

use chrono::NaiveDate;
use pnl_core::{Category, Transaction, TxnKind};

use crate::detect;
use crate::error::IngestError;
use crate::numbers::parse_amount;
use crate::parsers::{csv_bank, pdf_statement, xls_html};
use crate::types::{BatchResult, FileFailure, InputFile, RawRow, RowError, SourceFormat, Statement};

/// Absurd-magnitude guard; rows beyond this are reported and dropped
const MAX_REASONABLE_AMOUNT: f64 = 1_000_000_000.0;

/// One description-keyword-to-category rule; first match wins
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub keyword: String,
    pub category: Category,
}

impl CategoryRule {
    pub fn new(keyword: impl Into<String>, category: Category) -> Self {
        Self {
            keyword: keyword.into(),
            category,
        }
    }
}

/// Keyword configuration for classification. Owned by the presentation
/// layer and passed in; the defaults cover the bank's Hebrew statement
/// vocabulary.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Descriptions matching any of these are internal movements
    pub transfer_keywords: Vec<String>,
    pub category_rules: Vec<CategoryRule>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        let transfer_keywords = [
            "העברה עצמית",
            "העברה פנימית",
            "העברה דיגיטל",
            "הע. אינטרנט",
            "TRANSFER",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let category_rules = vec![
            CategoryRule::new("לאומי ויזא", Category::CreditCards),
            CategoryRule::new("כרטיסי אשראי", Category::CreditCards),
            CategoryRule::new("מקס איט", Category::CreditCards),
            CategoryRule::new("VISA", Category::CreditCards),
            CategoryRule::new("לאומי למשכנת", Category::Mortgage),
            CategoryRule::new("משכנת", Category::Mortgage),
            CategoryRule::new("משכורת", Category::Salary),
            CategoryRule::new("שכר", Category::Salary),
            CategoryRule::new("SALARY", Category::Salary),
            CategoryRule::new("מס הכנסה", Category::Taxes),
            CategoryRule::new("עיריית", Category::Taxes),
            CategoryRule::new("מכבי", Category::Health),
            CategoryRule::new("שירותי בריאו", Category::Health),
            CategoryRule::new("הראל", Category::Insurance),
            CategoryRule::new("ביטוח", Category::Insurance),
            CategoryRule::new("קופת פנסיה", Category::Pension),
            CategoryRule::new("גמל", Category::Pension),
            CategoryRule::new("פיקדון", Category::Deposits),
            CategoryRule::new("פקדון", Category::Deposits),
            CategoryRule::new("הפקד", Category::Deposits),
            CategoryRule::new("רבית", Category::Deposits),
            CategoryRule::new("ריבית", Category::Deposits),
            CategoryRule::new("משיכת מזומן", Category::Cash),
            CategoryRule::new("מסלול בסיסי", Category::BankFees),
            CategoryRule::new("עמל", Category::BankFees),
            CategoryRule::new("העברה", Category::Transfers),
        ];

        Self {
            transfer_keywords,
            category_rules,
        }
    }
}

impl ClassifierConfig {
    fn classify(&self, description: &str, amount: f64) -> (TxnKind, Category) {
        let desc = description.to_uppercase();

        let is_transfer = self
            .transfer_keywords
            .iter()
            .any(|kw| desc.contains(&kw.to_uppercase()));
        let kind = if is_transfer {
            TxnKind::Transfer
        } else if amount > 0.0 {
            TxnKind::Income
        } else {
            TxnKind::Expense
        };

        let category = self
            .category_rules
            .iter()
            .find(|rule| desc.contains(&rule.keyword.to_uppercase()))
            .map(|rule| rule.category)
            .unwrap_or(Category::Uncategorized);

        (kind, category)
    }
}

/// Strict date parsing: DD/MM/YY (yy < 50 means 20yy) and ISO YYYY-MM-DD.
/// Anything else is a row error.
pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    let mut parts = text.split('/');
    let day: u32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let yy: i32 = parts.next().filter(|p| p.len() == 2)?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let year = if yy < 50 { 2000 + yy } else { 1900 + yy };
    NaiveDate::from_ymd_opt(year, month, day)
}

// A row that survived field-level parsing but not yet sign resolution
struct ParsedRow {
    date: NaiveDate,
    description: String,
    magnitude: f64,
    balance: Option<f64>,
    source_line: usize,
}

fn sanity_check(amount: f64, balance: Option<f64>) -> bool {
    amount.abs() <= MAX_REASONABLE_AMOUNT
        && balance.map(|b| b.abs() <= MAX_REASONABLE_AMOUNT).unwrap_or(true)
}

/// Resolve signed amounts for formats whose amount column is an unsigned
/// magnitude, using running-balance movement. Rows must run in one
/// chronological direction; reverse-chronological files (the PDF prints
/// newest first) are flipped before resolution.
fn resolve_by_balance_delta(
    format: SourceFormat,
    mut rows: Vec<ParsedRow>,
) -> Result<Vec<(ParsedRow, f64)>, IngestError> {
    let ascending = rows.windows(2).all(|w| w[0].date <= w[1].date);
    let descending = rows.windows(2).all(|w| w[0].date >= w[1].date);
    if !ascending && !descending {
        return Err(IngestError::FormatMismatch {
            format,
            reason: "rows are not in a consistent chronological order; refusing to derive signs"
                .to_string(),
        });
    }
    if descending && !ascending {
        rows.reverse();
    }

    let mut previous_balance: Option<f64> = None;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let magnitude = row.magnitude.abs();
        let amount = match (previous_balance, row.balance) {
            (Some(prev), Some(current)) if current > prev => magnitude,
            // First row has no predecessor; outflow is the documented
            // default for this bank's exports
            _ => -magnitude,
        };
        previous_balance = row.balance.or(previous_balance);
        out.push((row, amount));
    }
    Ok(out)
}

/// Build a canonical statement from raw rows. Exhaustive over the closed
/// format set so a new source format cannot compile without a sign rule.
fn build_statement(
    format: SourceFormat,
    account: &str,
    rows: Vec<RawRow>,
    config: &ClassifierConfig,
) -> Result<Statement, IngestError> {
    let mut dropped: Vec<RowError> = Vec::new();
    let mut parsed: Vec<ParsedRow> = Vec::new();

    for row in rows {
        let Some(date) = parse_date(&row.date_text) else {
            dropped.push(RowError {
                source_line: row.source_line,
                reason: format!("unparsable date: {}", row.date_text),
            });
            continue;
        };

        let magnitude = match format {
            SourceFormat::XlsHtml => {
                let debit = row.debit_text.as_deref().and_then(parse_amount);
                let credit = row.credit_text.as_deref().and_then(parse_amount);
                if debit.is_none() && credit.is_none() {
                    dropped.push(RowError {
                        source_line: row.source_line,
                        reason: "no debit or credit amount".to_string(),
                    });
                    continue;
                }
                credit.unwrap_or(0.0) - debit.unwrap_or(0.0)
            }
            SourceFormat::PdfStatement
            | SourceFormat::CsvBankV1
            | SourceFormat::CsvBankV2
            | SourceFormat::CsvStandard => {
                match row.amount_text.as_deref().and_then(parse_amount) {
                    Some(value) => value,
                    None => {
                        dropped.push(RowError {
                            source_line: row.source_line,
                            reason: format!(
                                "unparsable amount: {}",
                                row.amount_text.as_deref().unwrap_or("")
                            ),
                        });
                        continue;
                    }
                }
            }
        };

        let balance = row.balance_text.as_deref().and_then(parse_amount);
        if !sanity_check(magnitude, balance) {
            dropped.push(RowError {
                source_line: row.source_line,
                reason: "amount or balance out of reasonable range".to_string(),
            });
            continue;
        }

        let description = if row.description_text.trim().is_empty() {
            "תנועה".to_string()
        } else {
            row.description_text.trim().to_string()
        };

        parsed.push(ParsedRow {
            date,
            description,
            magnitude,
            balance,
            source_line: row.source_line,
        });
    }

    // One resolution rule per format, decided exactly once per invocation
    let resolved: Vec<(ParsedRow, f64)> = match format {
        SourceFormat::CsvBankV2 | SourceFormat::CsvStandard | SourceFormat::XlsHtml => parsed
            .into_iter()
            .map(|row| {
                let amount = row.magnitude;
                (row, amount)
            })
            .collect(),
        SourceFormat::CsvBankV1 | SourceFormat::PdfStatement => {
            resolve_by_balance_delta(format, parsed)?
        }
    };

    let mut transactions: Vec<Transaction> = resolved
        .into_iter()
        .map(|(row, amount)| {
            let (kind, category) = config.classify(&row.description, amount);
            Transaction {
                date: row.date,
                description: row.description,
                amount,
                category,
                kind,
                source_account: account.to_string(),
                running_balance: row.balance,
            }
        })
        .collect();
    transactions.sort_by_key(|t| t.date);

    Ok(Statement {
        account: account.to_string(),
        format,
        transactions,
        dropped_rows: dropped,
    })
}

/// Ingest a single buffered file: detect, extract, and build. Row-level
/// problems surface on the returned statement; file-level problems are the
/// error.
pub fn ingest_file(file: &InputFile, config: &ClassifierConfig) -> Result<Statement, IngestError> {
    let Some(format) = detect::detect_format(file) else {
        return Err(IngestError::UnrecognizedFormat {
            filename: file.name.clone(),
        });
    };

    let (rows, mut pre_dropped) = match format {
        SourceFormat::PdfStatement => {
            let extraction = pdf_statement::extract(&file.bytes)?;
            let dropped = extraction
                .unparsed
                .into_iter()
                .map(|(line, text)| RowError {
                    source_line: line,
                    reason: format!("line did not match the statement row layout: {text}"),
                })
                .collect();
            (extraction.rows, dropped)
        }
        SourceFormat::XlsHtml => (xls_html::extract(&file.bytes)?, Vec::new()),
        SourceFormat::CsvBankV1 | SourceFormat::CsvBankV2 | SourceFormat::CsvStandard => {
            let text = std::str::from_utf8(&file.bytes)?;
            (csv_bank::extract(text, format)?, Vec::new())
        }
    };

    let mut statement = build_statement(format, file.account(), rows, config)?;
    pre_dropped.append(&mut statement.dropped_rows);
    statement.dropped_rows = pre_dropped;
    Ok(statement)
}

/// Ingest many files independently. One malformed statement never aborts
/// the batch; it lands in `failures` while siblings proceed.
pub fn ingest_batch(files: &[InputFile], config: &ClassifierConfig) -> BatchResult {
    let mut result = BatchResult::default();
    for file in files {
        match ingest_file(file, config) {
            Ok(statement) => result.statements.push(statement),
            Err(error) => result.failures.push(FileFailure {
                file: file.name.clone(),
                error,
            }),
        }
    }
    result
}
