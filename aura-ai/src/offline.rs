//! Deterministic local analysis, used when no model credential is configured
//! and as the reference implementation of the numeric semantics the remote
//! model is instructed to follow.

use aura_core::aggregate;
use aura_core::report::{
    CategorySlice, ExpenseReport, ExpenseSummary, Insight, InsightKind, LedgerReport,
    LedgerSummary,
};
use aura_core::transaction::Transaction;

use crate::error::AiError;

/// Number of spending buckets the ledger report keeps.
const LEDGER_CATEGORY_LIMIT: usize = 6;

/// Local counterpart of `analyze_expenses`: same contract, no remote call.
pub fn offline_expense_report(txns: &[Transaction]) -> Result<ExpenseReport, AiError> {
    if txns.is_empty() {
        return Err(AiError::EmptyInput);
    }

    let spending = aggregate::spending_by_category(txns, None);
    let total = aggregate::total_expenses(txns);
    let top = aggregate::top_category(txns).unwrap_or_else(|| "Other".to_string());
    let insights = expense_insights(total, &spending);

    Ok(ExpenseReport {
        summary: ExpenseSummary {
            total_expenses: total,
            top_category: top,
        },
        spending_by_category: spending,
        insights,
    })
}

/// Local counterpart of `analyze_ledger`: empty input short-circuits to `None`.
pub fn offline_ledger_report(txns: &[Transaction]) -> Option<LedgerReport> {
    if txns.is_empty() {
        return None;
    }

    let spending = aggregate::spending_by_category(txns, Some(LEDGER_CATEGORY_LIMIT));
    let summary = LedgerSummary {
        total_income: aggregate::total_income(txns),
        total_expenses: aggregate::total_expenses(txns),
        net_savings: aggregate::net_savings(txns),
        largest_expense_category: aggregate::top_category(txns)
            .unwrap_or_else(|| "None".to_string()),
        savings_rate: aggregate::savings_rate(txns),
    };
    let insights = ledger_insights(&summary, &spending);

    Some(LedgerReport {
        summary,
        spending_by_category: spending,
        monthly_trend: aggregate::monthly_trend(txns),
        insights,
    })
}

fn expense_insights(total: f64, spending: &[CategorySlice]) -> Vec<Insight> {
    let mut insights = Vec::new();

    if let Some(top) = spending.first() {
        let share = if total > 0.0 { top.value / total } else { 0.0 };
        if share > 0.4 {
            insights.push(Insight {
                title: "Concentrated spending".to_string(),
                description: format!(
                    "{:.0}% of your spending goes to {}. Reviewing this category first gives the biggest opportunity to save.",
                    share * 100.0,
                    top.name
                ),
                kind: InsightKind::Negative,
            });
        } else {
            insights.push(Insight {
                title: "Balanced spending".to_string(),
                description: format!(
                    "No single category dominates your spending; {} is the largest at {:.0}%.",
                    top.name,
                    share * 100.0
                ),
                kind: InsightKind::Positive,
            });
        }
    }

    insights.push(Insight {
        title: "Spending spread".to_string(),
        description: format!(
            "Your expenses of {:.2} fall into {} categor{}.",
            total,
            spending.len(),
            if spending.len() == 1 { "y" } else { "ies" }
        ),
        kind: InsightKind::Neutral,
    });

    insights
}

fn ledger_insights(summary: &LedgerSummary, spending: &[CategorySlice]) -> Vec<Insight> {
    let mut insights = Vec::new();

    if summary.net_savings < 0.0 {
        insights.push(Insight {
            title: "Spending exceeds income".to_string(),
            description: format!(
                "You spent {:.2} more than you earned in this period.",
                -summary.net_savings
            ),
            kind: InsightKind::Negative,
        });
    } else if summary.savings_rate >= 20.0 {
        insights.push(Insight {
            title: "Healthy savings rate".to_string(),
            description: format!(
                "You kept {:.0}% of your income, which is a strong savings rate.",
                summary.savings_rate
            ),
            kind: InsightKind::Positive,
        });
    } else {
        insights.push(Insight {
            title: "Room to save more".to_string(),
            description: format!(
                "You kept {:.0}% of your income. Nudging this toward 20% builds a stronger buffer.",
                summary.savings_rate
            ),
            kind: InsightKind::Neutral,
        });
    }

    if let Some(top) = spending.first() {
        let share = if summary.total_expenses > 0.0 {
            top.value / summary.total_expenses
        } else {
            0.0
        };
        insights.push(Insight {
            title: format!("Largest category: {}", top.name),
            description: format!(
                "{} accounts for {:.0}% of your expenses ({:.2}).",
                top.name,
                share * 100.0,
                top.value
            ),
            kind: if share > 0.35 {
                InsightKind::Negative
            } else {
                InsightKind::Neutral
            },
        });
    }

    insights
}
