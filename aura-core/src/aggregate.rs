//! Deterministic aggregate computations over a transaction set.
//!
//! These mirror the numeric semantics the remote model is instructed to
//! produce, so the offline analyzer and the scripted test doubles stay in
//! agreement with the hosted one.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::report::{CategorySlice, TrendPoint};
use crate::transaction::Transaction;

pub fn total_expenses(txns: &[Transaction]) -> f64 {
    txns.iter()
        .filter(|t| t.is_expense())
        .map(|t| t.amount)
        .sum()
}

pub fn total_income(txns: &[Transaction]) -> f64 {
    txns.iter()
        .filter(|t| !t.is_expense())
        .map(|t| t.amount)
        .sum()
}

pub fn net_savings(txns: &[Transaction]) -> f64 {
    total_income(txns) - total_expenses(txns)
}

/// Percentage of income kept. Zero income yields 0 rather than a division error.
pub fn savings_rate(txns: &[Transaction]) -> f64 {
    let income = total_income(txns);
    if income == 0.0 {
        0.0
    } else {
        net_savings(txns) / income * 100.0
    }
}

/// Expense totals grouped by resolved category name, largest first.
/// `limit` caps the number of buckets (the ledger report keeps the top 6).
pub fn spending_by_category(txns: &[Transaction], limit: Option<usize>) -> Vec<CategorySlice> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for t in txns.iter().filter(|t| t.is_expense()) {
        *totals.entry(t.classification.bucket()).or_insert(0.0) += t.amount;
    }

    let mut slices: Vec<CategorySlice> = totals
        .into_iter()
        .map(|(name, value)| CategorySlice {
            name: name.to_string(),
            value,
        })
        .collect();

    // BTreeMap iteration gives a stable name order for ties.
    slices.sort_by(|a, b| b.value.total_cmp(&a.value));
    if let Some(n) = limit {
        slices.truncate(n);
    }
    slices
}

/// Name of the largest expense bucket, if any expense exists.
pub fn top_category(txns: &[Transaction]) -> Option<String> {
    spending_by_category(txns, Some(1))
        .into_iter()
        .next()
        .map(|s| s.name)
}

/// Income/expense totals bucketed by calendar month, chronological order.
/// Rows whose date cannot be read as a date are left out of the trend.
pub fn monthly_trend(txns: &[Transaction]) -> Vec<TrendPoint> {
    let mut months: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();
    for t in txns {
        let Some(date) = parse_date(&t.date) else {
            continue;
        };
        let entry = months.entry(month_key(date)).or_insert((0.0, 0.0));
        if t.is_expense() {
            entry.1 += t.amount;
        } else {
            entry.0 += t.amount;
        }
    }

    months
        .into_iter()
        .map(|((year, month), (income, expenses))| TrendPoint {
            name: month_label(year, month),
            income,
            expenses,
        })
        .collect()
}

fn month_key(date: NaiveDate) -> (i32, u32) {
    use chrono::Datelike;
    (date.year(), date.month())
}

fn month_label(year: i32, month: u32) -> String {
    // month came from a parsed NaiveDate, so the first of it is valid
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b").to_string())
        .unwrap_or_default()
}

/// Tolerant date read: ISO form first, then US statement form.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%Y"))
        .ok()
}
