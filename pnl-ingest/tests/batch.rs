//! End-to-end batch ingestion: multiple accounts, mixed formats, partial
//! failure, and aggregation over the merged ledger.

use pnl_core::{Category, YearMonth, aggregate};
use pnl_ingest::{ClassifierConfig, IngestError, InputFile, ingest_batch};

fn file(name: &str, content: &str) -> InputFile {
    InputFile::new(name, content.as_bytes().to_vec())
}

fn three_account_batch() -> Vec<InputFile> {
    vec![
        file(
            "checking.csv",
            "Date,Description,Amount,Balance\n\
             01/01/24,Groceries,200.00,4800.00\n\
             15/01/24,SALARY ACME,10000.00,14800.00\n\
             20/03/24,עיריית ירושלים,450.00,14350.00\n",
        ),
        file(
            "savings.csv",
            "Date,Description,Amount,Category,Type\n\
             2024-02-10,ריבית לפקדון,35.00,deposits,Income\n\
             2024-02-28,העברה עצמית,-1000.00,transfers,Transfer\n",
        ),
        file("scan.txt", "definitely not a statement\n"),
    ]
}

#[test]
fn test_one_bad_file_does_not_abort_the_batch() {
    let batch = ingest_batch(&three_account_batch(), &ClassifierConfig::default());

    assert_eq!(batch.statements.len(), 2);
    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.failures[0].file, "scan.txt");
    assert!(matches!(
        batch.failures[0].error,
        IngestError::UnrecognizedFormat { .. }
    ));
}

#[test]
fn test_merged_ledger_keeps_source_accounts() {
    let batch = ingest_batch(&three_account_batch(), &ClassifierConfig::default());
    let merged = batch.merged_transactions();
    assert_eq!(merged.len(), 5);
    assert_eq!(
        merged
            .iter()
            .filter(|t| t.source_account == "checking")
            .count(),
        3
    );
    assert_eq!(
        merged
            .iter()
            .filter(|t| t.source_account == "savings")
            .count(),
        2
    );
}

#[test]
fn test_aggregation_conserves_flow_and_fills_gap_months() {
    let batch = ingest_batch(&three_account_batch(), &ClassifierConfig::default());
    let merged = batch.merged_transactions();
    let summary = aggregate(&merged, None);

    // January through March, February present despite carrying only the
    // savings-account rows
    assert_eq!(summary.buckets.len(), 3);
    assert_eq!(summary.buckets[0].month, YearMonth::new(2024, 1));
    assert_eq!(summary.buckets[2].month, YearMonth::new(2024, 3));

    let bucket_net: f64 = summary.buckets.iter().map(|b| b.net_flow).sum();
    let txn_net: f64 = merged.iter().map(|t| t.amount).sum();
    assert!((bucket_net - txn_net).abs() < 1e-9);

    assert_eq!(summary.expense_by_category.get(&Category::Taxes), Some(&450.0));
}

#[test]
fn test_duplicate_upload_double_counts() {
    // Known limitation: no cross-file deduplication
    let statement = file(
        "checking.csv",
        "Date,Description,Amount,Balance\n01/01/24,Groceries,200.00,4800.00\n",
    );
    let batch = ingest_batch(
        &[statement.clone(), statement],
        &ClassifierConfig::default(),
    );
    assert_eq!(batch.merged_transactions().len(), 2);
}
