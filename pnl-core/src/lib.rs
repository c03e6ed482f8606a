//! pnl-core: canonical ledger types, monthly P&L aggregation, and the
//! retirement projection engine.

pub mod ledger;
pub mod retirement;
pub mod transaction;

pub use ledger::{DateFilter, LedgerSummary, MonthlyBucket, YearMonth, aggregate};
pub use retirement::{
    ASSUMED_MONTHLY_RATE, DEFAULT_RETIREMENT_AGE, MandatoryRate, RetirementParameters,
    RetirementProjection, SeriesPoint, project, round_currency,
};
pub use transaction::{Category, Transaction, TxnKind};
