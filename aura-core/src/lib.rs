//! aura-core: transaction types, store, and report shapes for the Aura analyzer

pub mod aggregate;
pub mod report;
pub mod store;
pub mod transaction;

pub use report::{
    CategorySlice, ExpenseReport, ExpenseSummary, Insight, InsightKind, LedgerReport,
    LedgerSummary, TrendPoint,
};
pub use store::TransactionStore;
pub use transaction::{Category, Classification, FlowKind, Transaction};
