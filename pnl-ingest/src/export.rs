//! Canonical CSV serialization.
//!
//! Two shapes are written: the five-column Standard schema (the system's
//! own canonical export) and the four-column Bank-V1 schema, which stores
//! an unsigned magnitude plus running balance. Both are bit-compatible
//! with the corresponding import paths. Amounts are written with two
//! decimals; full precision lives only inside the core.

use csv::WriterBuilder;
use pnl_core::Transaction;

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String, csv::Error> {
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Serialize to the Standard schema: `Date,Description,Amount,Category,Type`
pub fn to_standard_csv(transactions: &[Transaction]) -> Result<String, csv::Error> {
    let mut wtr = WriterBuilder::new().from_writer(Vec::new());
    wtr.write_record(["Date", "Description", "Amount", "Category", "Type"])?;
    for txn in transactions {
        wtr.write_record([
            txn.date.format("%Y-%m-%d").to_string(),
            txn.description.clone(),
            format!("{:.2}", txn.amount),
            txn.category.to_string(),
            txn.kind.to_string(),
        ])?;
    }
    finish(wtr)
}

/// Serialize to the Bank-V1 schema: `Date,Description,Amount,Balance` with
/// DD/MM/YY dates and unsigned amounts. Transactions without a running
/// balance write an empty balance cell.
pub fn to_bank_v1_csv(transactions: &[Transaction]) -> Result<String, csv::Error> {
    let mut wtr = WriterBuilder::new().from_writer(Vec::new());
    wtr.write_record(["Date", "Description", "Amount", "Balance"])?;
    for txn in transactions {
        wtr.write_record([
            txn.date.format("%d/%m/%y").to_string(),
            txn.description.clone(),
            format!("{:.2}", txn.amount.abs()),
            txn.running_balance
                .map(|b| format!("{b:.2}"))
                .unwrap_or_default(),
        ])?;
    }
    finish(wtr)
}
