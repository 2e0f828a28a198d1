//! Typed shapes of the AI-derived analysis report.
//!
//! Field names serialize in camelCase to match the JSON schema the remote
//! model is asked to fill. A report is created fresh on every successful
//! analysis call and superseded wholesale by the next one.

use serde::{Deserialize, Serialize};

/// One spending bucket: category name and its total.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategorySlice {
    pub name: String,
    pub value: f64,
}

/// Polarity tag on an insight
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Positive,
    Negative,
    Neutral,
}

/// One short natural-language observation about the data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Insight {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: InsightKind,
}

/// Summary block of the categorized (expense-only) report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    pub total_expenses: f64,
    pub top_category: String,
}

/// Report shape for the categorized variant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseReport {
    pub summary: ExpenseSummary,
    pub spending_by_category: Vec<CategorySlice>,
    pub insights: Vec<Insight>,
}

/// Summary block of the income/expense report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_savings: f64,
    pub largest_expense_category: String,
    /// Percentage of income kept; 0 when there is no income.
    pub savings_rate: f64,
}

/// One month's income/expense totals. `name` is a calendar month label (`Jan`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendPoint {
    pub name: String,
    pub income: f64,
    pub expenses: f64,
}

/// Report shape for the income/expense variant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LedgerReport {
    pub summary: LedgerSummary,
    pub spending_by_category: Vec<CategorySlice>,
    pub monthly_trend: Vec<TrendPoint>,
    pub insights: Vec<Insight>,
}
