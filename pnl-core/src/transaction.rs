//! Canonical transaction types shared by the ingestion and reporting layers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A normalized, immutable ledger entry. One is created per source row during
/// ingestion; merges across accounts only concatenate sequences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Calendar date, no time component
    pub date: NaiveDate,
    /// Free text, may contain right-to-left script
    pub description: String,
    /// Positive = inflow, negative = outflow
    pub amount: f64,
    pub category: Category,
    pub kind: TxnKind,
    /// Identifier of the originating file/account
    pub source_account: String,
    /// Running balance, present only when the source format supplied one
    pub running_balance: Option<f64>,
}

impl Transaction {
    /// Returns true for outflows
    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    /// Returns true for inflows
    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }
}

/// High-level flow classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TxnKind {
    #[serde(rename = "income")]
    Income,
    #[serde(rename = "expense")]
    Expense,
    #[serde(rename = "transfer")]
    Transfer,
}

impl fmt::Display for TxnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TxnKind::Income => "Income",
            TxnKind::Expense => "Expense",
            TxnKind::Transfer => "Transfer",
        };
        f.write_str(s)
    }
}

impl FromStr for TxnKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Income" | "income" => Ok(TxnKind::Income),
            "Expense" | "expense" => Ok(TxnKind::Expense),
            "Transfer" | "transfer" => Ok(TxnKind::Transfer),
            other => Err(format!("unknown transaction kind: {other}")),
        }
    }
}

/// Spending categories matched deterministically against description text.
/// The keyword lists that feed the matcher are caller-supplied configuration;
/// this enum is only the closed target set.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub enum Category {
    #[serde(rename = "credit-cards")]
    CreditCards,
    #[serde(rename = "transfers")]
    Transfers,
    #[serde(rename = "bank-fees")]
    BankFees,
    #[serde(rename = "insurance")]
    Insurance,
    #[serde(rename = "pension")]
    Pension,
    #[serde(rename = "health")]
    Health,
    #[serde(rename = "taxes")]
    Taxes,
    #[serde(rename = "mortgage")]
    Mortgage,
    #[serde(rename = "salary")]
    Salary,
    #[serde(rename = "deposits")]
    Deposits,
    #[serde(rename = "cash")]
    Cash,
    #[serde(rename = "uncategorized")]
    Uncategorized,
}

impl Category {
    pub const ALL: [Category; 12] = [
        Category::CreditCards,
        Category::Transfers,
        Category::BankFees,
        Category::Insurance,
        Category::Pension,
        Category::Health,
        Category::Taxes,
        Category::Mortgage,
        Category::Salary,
        Category::Deposits,
        Category::Cash,
        Category::Uncategorized,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::CreditCards => "credit-cards",
            Category::Transfers => "transfers",
            Category::BankFees => "bank-fees",
            Category::Insurance => "insurance",
            Category::Pension => "pension",
            Category::Health => "health",
            Category::Taxes => "taxes",
            Category::Mortgage => "mortgage",
            Category::Salary => "salary",
            Category::Deposits => "deposits",
            Category::Cash => "cash",
            Category::Uncategorized => "uncategorized",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_sign_helpers() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let txn = Transaction {
            date,
            description: "העברת משכורת".to_string(),
            amount: 12_500.0,
            category: Category::Salary,
            kind: TxnKind::Income,
            source_account: "leumi-main".to_string(),
            running_balance: Some(18_200.55),
        };
        assert!(txn.is_income());
        assert!(!txn.is_expense());
    }

    #[test]
    fn test_category_round_trip() {
        for cat in Category::ALL {
            assert_eq!(cat.as_str().parse::<Category>().unwrap(), cat);
        }
        assert!("gadgets".parse::<Category>().is_err());
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("Transfer".parse::<TxnKind>().unwrap(), TxnKind::Transfer);
        assert_eq!("income".parse::<TxnKind>().unwrap(), TxnKind::Income);
        assert!("debit".parse::<TxnKind>().is_err());
    }

    #[test]
    fn test_serde_renames() {
        let json = serde_json::to_string(&Category::CreditCards).unwrap();
        assert_eq!(json, "\"credit-cards\"");
        let json = serde_json::to_string(&TxnKind::Expense).unwrap();
        assert_eq!(json, "\"expense\"");
    }
}
