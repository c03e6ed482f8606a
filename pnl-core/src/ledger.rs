//! Monthly P&L aggregation.
//!
//! `aggregate` is a pure function over `(transactions, filter)`: no cached
//! state, recomputed on every call. Summation runs in ascending date order so
//! identical input always produces identical buckets.

use crate::transaction::{Category, Transaction};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A calendar month, the bucket key for all P&L reporting.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The following calendar month
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (y, m) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got: {s}"))?;
        let year: i32 = y.parse().map_err(|_| format!("bad year in: {s}"))?;
        let month: u32 = m.parse().map_err(|_| format!("bad month in: {s}"))?;
        if !(1..=12).contains(&month) {
            return Err(format!("month out of range in: {s}"));
        }
        Ok(Self { year, month })
    }
}

/// Inclusive month range applied before aggregation. An out-of-range filter
/// yields an empty summary, not an error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateFilter {
    pub start: YearMonth,
    pub end: YearMonth,
}

impl DateFilter {
    pub fn new(start: YearMonth, end: YearMonth) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, month: YearMonth) -> bool {
        self.start <= month && month <= self.end
    }
}

/// One month of aggregated flows. Derived data, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyBucket {
    pub month: YearMonth,
    pub total_income: f64,
    pub total_expense: f64,
    pub net_flow: f64,
    /// Last known running balance within the month, if any source supplied one
    pub ending_balance: Option<f64>,
    /// Expense totals per category (absolute values)
    pub expense_by_category: BTreeMap<Category, f64>,
}

impl MonthlyBucket {
    fn empty(month: YearMonth) -> Self {
        Self {
            month,
            total_income: 0.0,
            total_expense: 0.0,
            net_flow: 0.0,
            ending_balance: None,
            expense_by_category: BTreeMap::new(),
        }
    }
}

/// Aggregation result: ordered monthly buckets plus category totals over the
/// same range.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LedgerSummary {
    pub buckets: Vec<MonthlyBucket>,
    pub expense_by_category: BTreeMap<Category, f64>,
}

/// Fold transactions into monthly buckets, optionally restricted to a month
/// range. Months with no transactions between the first and last active month
/// still appear as zero buckets so timelines stay continuous.
pub fn aggregate(transactions: &[Transaction], filter: Option<DateFilter>) -> LedgerSummary {
    let mut active: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| match filter {
            Some(f) => f.contains(YearMonth::from_date(t.date)),
            None => true,
        })
        .collect();
    if active.is_empty() {
        return LedgerSummary::default();
    }

    // Stable sort: deterministic summation order regardless of input order
    active.sort_by_key(|t| t.date);

    let first = YearMonth::from_date(active[0].date);
    let last = YearMonth::from_date(active[active.len() - 1].date);

    let mut buckets: BTreeMap<YearMonth, MonthlyBucket> = BTreeMap::new();
    let mut month = first;
    loop {
        buckets.insert(month, MonthlyBucket::empty(month));
        if month == last {
            break;
        }
        month = month.next();
    }

    let mut expense_by_category: BTreeMap<Category, f64> = BTreeMap::new();
    for txn in &active {
        let key = YearMonth::from_date(txn.date);
        let bucket = buckets
            .entry(key)
            .or_insert_with(|| MonthlyBucket::empty(key));
        if txn.amount > 0.0 {
            bucket.total_income += txn.amount;
        } else {
            bucket.total_expense += -txn.amount;
            *bucket
                .expense_by_category
                .entry(txn.category)
                .or_insert(0.0) += -txn.amount;
            *expense_by_category.entry(txn.category).or_insert(0.0) += -txn.amount;
        }
        bucket.net_flow += txn.amount;
        if txn.running_balance.is_some() {
            bucket.ending_balance = txn.running_balance;
        }
    }

    LedgerSummary {
        buckets: buckets.into_values().collect(),
        expense_by_category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TxnKind;
    use chrono::NaiveDate;

    fn txn(date: (i32, u32, u32), amount: f64, category: Category) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            description: "test".to_string(),
            amount,
            category,
            kind: if amount > 0.0 {
                TxnKind::Income
            } else {
                TxnKind::Expense
            },
            source_account: "acct".to_string(),
            running_balance: None,
        }
    }

    #[test]
    fn test_net_flow_conserves_total() {
        let txns = vec![
            txn((2024, 1, 5), 1000.0, Category::Salary),
            txn((2024, 1, 20), -350.25, Category::CreditCards),
            txn((2024, 3, 2), -120.50, Category::Health),
            txn((2024, 3, 15), 40.0, Category::Uncategorized),
        ];
        let summary = aggregate(&txns, None);
        let bucket_net: f64 = summary.buckets.iter().map(|b| b.net_flow).sum();
        let txn_net: f64 = txns.iter().map(|t| t.amount).sum();
        assert!((bucket_net - txn_net).abs() < 1e-9);
    }

    #[test]
    fn test_gap_months_appear_as_zero_buckets() {
        let txns = vec![
            txn((2024, 1, 5), 100.0, Category::Salary),
            txn((2024, 3, 5), -50.0, Category::Health),
        ];
        let summary = aggregate(&txns, None);
        assert_eq!(summary.buckets.len(), 3);
        assert_eq!(summary.buckets[1].month, YearMonth::new(2024, 2));
        assert_eq!(summary.buckets[1].net_flow, 0.0);
        assert_eq!(summary.buckets[1].total_income, 0.0);
        assert_eq!(summary.buckets[1].total_expense, 0.0);
    }

    #[test]
    fn test_out_of_range_filter_yields_empty_summary() {
        let txns = vec![txn((2024, 1, 5), 100.0, Category::Salary)];
        let filter = DateFilter::new(YearMonth::new(2030, 1), YearMonth::new(2030, 6));
        let summary = aggregate(&txns, Some(filter));
        assert!(summary.buckets.is_empty());
        assert!(summary.expense_by_category.is_empty());
    }

    #[test]
    fn test_filter_restricts_range() {
        let txns = vec![
            txn((2024, 1, 5), 100.0, Category::Salary),
            txn((2024, 2, 5), -80.0, Category::Health),
            txn((2024, 5, 5), -10.0, Category::Cash),
        ];
        let filter = DateFilter::new(YearMonth::new(2024, 1), YearMonth::new(2024, 2));
        let summary = aggregate(&txns, Some(filter));
        assert_eq!(summary.buckets.len(), 2);
        assert_eq!(summary.expense_by_category.get(&Category::Health), Some(&80.0));
        assert!(summary.expense_by_category.get(&Category::Cash).is_none());
    }

    #[test]
    fn test_totals_order_independent() {
        let mut txns = vec![
            txn((2024, 1, 5), 1000.0, Category::Salary),
            txn((2024, 1, 20), -350.25, Category::CreditCards),
            txn((2024, 2, 2), -120.50, Category::Health),
        ];
        let forward = aggregate(&txns, None);
        txns.reverse();
        let backward = aggregate(&txns, None);
        assert_eq!(forward.buckets.len(), backward.buckets.len());
        for (a, b) in forward.buckets.iter().zip(backward.buckets.iter()) {
            assert!((a.net_flow - b.net_flow).abs() < 1e-9);
            assert!((a.total_income - b.total_income).abs() < 1e-9);
            assert!((a.total_expense - b.total_expense).abs() < 1e-9);
        }
    }

    #[test]
    fn test_ending_balance_is_last_known_in_month() {
        let mut a = txn((2024, 1, 5), 100.0, Category::Salary);
        a.running_balance = Some(4200.0);
        let mut b = txn((2024, 1, 25), -50.0, Category::Health);
        b.running_balance = Some(4150.0);
        let summary = aggregate(&[a, b], None);
        assert_eq!(summary.buckets[0].ending_balance, Some(4150.0));
    }

    #[test]
    fn test_year_month_parse_and_display() {
        let ym: YearMonth = "2024-03".parse().unwrap();
        assert_eq!(ym, YearMonth::new(2024, 3));
        assert_eq!(ym.to_string(), "2024-03");
        assert_eq!(YearMonth::new(2024, 12).next(), YearMonth::new(2025, 1));
        assert!("2024-13".parse::<YearMonth>().is_err());
    }
}
