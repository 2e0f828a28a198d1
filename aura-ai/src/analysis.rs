//! Build analysis instructions and response schemas, invoke the model, and
//! parse the reply into a typed report.

use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::error;

use aura_core::report::{ExpenseReport, LedgerReport};
use aura_core::transaction::{Classification, Transaction};

use crate::error::AiError;
use crate::model::{ChatTurn, GenerateRequest, GenerativeModel};

/// Flatten transactions into the block embedded in the instruction:
/// one `date,description,amount,label` line per transaction, where the label
/// is the category (categorized variant) or `income`/`expense` (ledger).
/// Deterministic for a fixed list.
pub fn serialize_transactions(txns: &[Transaction]) -> String {
    txns.iter()
        .map(|t| {
            let label = match &t.classification {
                Classification::Category(c) => c.as_str(),
                Classification::Flow { kind, .. } => kind.as_str(),
            };
            format!("{},{},{},{}", t.date, t.description, t.amount, label)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn expense_instruction(data: &str) -> String {
    format!(
        "You are an expert financial analyst AI named Aura. Your goal is to provide clear and helpful insights based on a user's list of recent expenses.\n\
         Analyze the following list of transactions (formatted as Date,Description,Amount,Category):\n\
         \n\
         {data}\n\
         \n\
         Please perform the following analysis:\n\
         1. Calculate summary metrics: total expenses and the name of the top spending category.\n\
         2. Provide a breakdown of spending by category for all categories present.\n\
         3. Generate 2-3 actionable insights to help the user manage their spending better. For example, identify high spending areas, suggest potential savings, or comment on spending diversity.\n\
         \n\
         Return your analysis strictly in the JSON format defined by the provided schema.\n\
         Do not include any introductory text or markdown formatting. The output must be a single, valid JSON object."
    )
}

fn ledger_instruction(data: &str) -> String {
    format!(
        "You are an expert financial analyst AI named Aura. Your goal is to provide clear and helpful insights based on a user's list of income and expense transactions.\n\
         Analyze the following list of transactions (formatted as Date,Description,Amount,Type):\n\
         \n\
         {data}\n\
         \n\
         Please perform the following analysis:\n\
         1. Calculate summary metrics: total income, total expenses, net savings (income minus expenses), the name of the largest expense category, and the savings rate as a percentage of income (use 0 if there is no income).\n\
         2. Provide a breakdown of spending by category, limited to the top 6 categories by total.\n\
         3. Compute a monthly trend of income and expenses, bucketed by calendar month and labeled with short month names (Jan, Feb, ...), in chronological order.\n\
         4. Generate 2-4 actionable insights to help the user manage their finances better.\n\
         \n\
         Return your analysis strictly in the JSON format defined by the provided schema.\n\
         Do not include any introductory text or markdown formatting. The output must be a single, valid JSON object."
    )
}

fn insights_schema(count_hint: &str) -> Value {
    json!({
        "type": "ARRAY",
        "description": format!("An array of {count_hint} actionable and insightful observations about the user's finances."),
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING", "description": "A short, catchy title for the insight." },
                "description": { "type": "STRING", "description": "A detailed explanation of the insight and what it means." },
                "type": { "type": "STRING", "description": "The type of insight: 'positive', 'negative', or 'neutral'." }
            },
            "required": ["title", "description", "type"]
        }
    })
}

fn spending_by_category_schema() -> Value {
    json!({
        "type": "ARRAY",
        "description": "An array of objects, each representing a spending category and its total amount.",
        "items": {
            "type": "OBJECT",
            "properties": {
                "name": { "type": "STRING" },
                "value": { "type": "NUMBER" }
            },
            "required": ["name", "value"]
        }
    })
}

fn expense_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {
                "type": "OBJECT",
                "properties": {
                    "totalExpenses": { "type": "NUMBER", "description": "Total sum of all expense transactions." },
                    "topCategory": { "type": "STRING", "description": "The category with the highest spending." }
                },
                "required": ["totalExpenses", "topCategory"]
            },
            "spendingByCategory": spending_by_category_schema(),
            "insights": insights_schema("2-3")
        },
        "required": ["summary", "spendingByCategory", "insights"]
    })
}

fn ledger_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {
                "type": "OBJECT",
                "properties": {
                    "totalIncome": { "type": "NUMBER", "description": "Total sum of all income transactions." },
                    "totalExpenses": { "type": "NUMBER", "description": "Total sum of all expense transactions." },
                    "netSavings": { "type": "NUMBER", "description": "Total income minus total expenses." },
                    "largestExpenseCategory": { "type": "STRING", "description": "The expense category with the highest total." },
                    "savingsRate": { "type": "NUMBER", "description": "Net savings as a percentage of total income; 0 when there is no income." }
                },
                "required": ["totalIncome", "totalExpenses", "netSavings", "largestExpenseCategory", "savingsRate"]
            },
            "spendingByCategory": spending_by_category_schema(),
            "monthlyTrend": {
                "type": "ARRAY",
                "description": "Income and expense totals per calendar month, in chronological order.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING", "description": "Short month label, e.g. 'Jan'." },
                        "income": { "type": "NUMBER" },
                        "expenses": { "type": "NUMBER" }
                    },
                    "required": ["name", "income", "expenses"]
                }
            },
            "insights": insights_schema("2-4")
        },
        "required": ["summary", "spendingByCategory", "monthlyTrend", "insights"]
    })
}

/// Analyze a categorized expense set. Fails with `EmptyInput` on an empty
/// list; every remote failure surfaces as the uniform `AnalysisFailed`.
pub async fn analyze_expenses(
    model: &dyn GenerativeModel,
    txns: &[Transaction],
) -> Result<ExpenseReport, AiError> {
    if txns.is_empty() {
        return Err(AiError::EmptyInput);
    }
    let instruction = expense_instruction(&serialize_transactions(txns));
    request_report(model, instruction, expense_schema())
        .await
        .map_err(log_and_normalize)
}

/// Analyze an income/expense set. An empty list is the caller's
/// responsibility: the call short-circuits with `Ok(None)` without invoking
/// the model.
pub async fn analyze_ledger(
    model: &dyn GenerativeModel,
    txns: &[Transaction],
) -> Result<Option<LedgerReport>, AiError> {
    if txns.is_empty() {
        return Ok(None);
    }
    let instruction = ledger_instruction(&serialize_transactions(txns));
    request_report(model, instruction, ledger_schema())
        .await
        .map(Some)
        .map_err(log_and_normalize)
}

fn log_and_normalize(e: anyhow::Error) -> AiError {
    error!(error = ?e, "analysis call failed");
    AiError::AnalysisFailed
}

async fn request_report<T: DeserializeOwned>(
    model: &dyn GenerativeModel,
    instruction: String,
    schema: Value,
) -> Result<T> {
    let req = GenerateRequest {
        system_instruction: None,
        turns: vec![ChatTurn {
            role: "user".to_string(),
            content: instruction,
        }],
        response_schema: Some(schema),
        json_output: true,
    };

    let text = model.generate(&req).await?;
    if text.is_empty() {
        bail!("API returned an empty response.");
    }
    serde_json::from_str(&text).context("parse analysis JSON")
}
