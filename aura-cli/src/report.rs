//! Plain-text rendering of analysis reports.

use aura_core::report::{ExpenseReport, Insight, InsightKind, LedgerReport};

pub fn print_expense_report(report: &ExpenseReport, txn_count: usize) {
    println!("Analyzed {txn_count} transactions.");
    println!();
    println!("Total expenses: {:.2}", report.summary.total_expenses);
    println!("Top category:   {}", report.summary.top_category);

    println!();
    println!("Spending by category:");
    for slice in &report.spending_by_category {
        println!("  {:<18} {:>10.2}", slice.name, slice.value);
    }

    print_insights(&report.insights);
}

pub fn print_ledger_report(report: &LedgerReport, txn_count: usize) {
    println!("Analyzed {txn_count} transactions.");
    println!();
    println!("Total income:     {:>10.2}", report.summary.total_income);
    println!("Total expenses:   {:>10.2}", report.summary.total_expenses);
    println!("Net savings:      {:>10.2}", report.summary.net_savings);
    println!("Savings rate:     {:>9.1}%", report.summary.savings_rate);
    println!(
        "Largest expense:  {}",
        report.summary.largest_expense_category
    );

    println!();
    println!("Spending by category:");
    for slice in &report.spending_by_category {
        println!("  {:<18} {:>10.2}", slice.name, slice.value);
    }

    if !report.monthly_trend.is_empty() {
        println!();
        println!("Monthly trend:");
        println!("  {:<6} {:>10} {:>10}", "", "income", "expenses");
        for point in &report.monthly_trend {
            println!(
                "  {:<6} {:>10.2} {:>10.2}",
                point.name, point.income, point.expenses
            );
        }
    }

    print_insights(&report.insights);
}

fn print_insights(insights: &[Insight]) {
    if insights.is_empty() {
        return;
    }
    println!();
    println!("Insights:");
    for insight in insights {
        let tag = match insight.kind {
            InsightKind::Positive => "positive",
            InsightKind::Negative => "negative",
            InsightKind::Neutral => "neutral",
        };
        println!("  [{tag}] {}: {}", insight.title, insight.description);
    }
}
