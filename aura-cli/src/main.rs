use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;
use tracing::Level;

use aura_ai::{
    ChatOptions, GeminiClient, analyze_expenses, analyze_ledger, offline_expense_report,
    offline_ledger_report,
};
use aura_core::transaction::{Category, Classification, FlowKind, Transaction};
use aura_core::{ExpenseReport, LedgerReport, TransactionStore};
use aura_ingest::{CsvSchema, parse_csv};

mod chat;
mod config;
mod report;

#[derive(Parser, Debug)]
#[command(name = "aura", version, about = "AI-assisted personal-finance analysis")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a transaction CSV and produce a financial report
    Analyze {
        /// Path to the CSV upload
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Which CSV schema the data follows
        #[arg(long, value_enum, default_value_t = SchemaArg::Categories)]
        schema: SchemaArg,

        /// Manually entered transaction, DESC:AMOUNT:LABEL (repeatable).
        /// LABEL is a category for the categories schema, income/expense
        /// for the income-expense schema.
        #[arg(long = "add", value_name = "DESC:AMOUNT:LABEL")]
        add: Vec<String>,

        /// Skip the remote model and compute the report locally
        #[arg(long)]
        offline: bool,
    },

    /// Chat with the Aura assistant
    Chat,

    /// Write a default ~/.aura/config.toml
    ConfigInit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SchemaArg {
    Categories,
    IncomeExpense,
}

impl From<SchemaArg> for CsvSchema {
    fn from(value: SchemaArg) -> Self {
        match value {
            SchemaArg::Categories => CsvSchema::Categories,
            SchemaArg::IncomeExpense => CsvSchema::IncomeExpense,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Analyze {
            csv,
            schema,
            add,
            offline,
        } => run_analyze(csv, schema, add, offline).await,
        Command::Chat => run_chat().await,
        Command::ConfigInit => config::init_config(),
    }
}

async fn run_analyze(
    csv: Option<PathBuf>,
    schema: SchemaArg,
    add: Vec<String>,
    offline: bool,
) -> Result<()> {
    let cfg = config::load_config()?;

    let mut store = TransactionStore::new();
    if let Some(path) = csv {
        let text =
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        for txn in parse_csv(&text, schema.into())? {
            store.add(txn);
        }
    }
    for entry in &add {
        store.add(parse_manual_entry(entry, schema)?);
    }
    if store.is_empty() {
        bail!("nothing to analyze; pass --csv and/or --add");
    }

    let remote = if offline { None } else { remote_model(&cfg) };
    if remote.is_none() && !offline {
        println!(
            "No credential in ${}; computing the report locally.",
            cfg.llm.api_key_env
        );
        println!();
    }

    match schema {
        SchemaArg::Categories => {
            let report: ExpenseReport = match &remote {
                Some(model) => analyze_expenses(model, store.transactions()).await?,
                None => offline_expense_report(store.transactions())?,
            };
            report::print_expense_report(&report, store.len());
        }
        SchemaArg::IncomeExpense => {
            let report: Option<LedgerReport> = match &remote {
                Some(model) => analyze_ledger(model, store.transactions()).await?,
                None => offline_ledger_report(store.transactions()),
            };
            // The store is non-empty here, so the ledger call cannot short-circuit.
            match report {
                Some(r) => report::print_ledger_report(&r, store.len()),
                None => bail!("no report produced"),
            }
        }
    }

    Ok(())
}

async fn run_chat() -> Result<()> {
    let cfg = config::load_config()?;
    let Some(key) = config::api_key(&cfg) else {
        bail!(
            "chat needs a model credential; set ${} and retry",
            cfg.llm.api_key_env
        );
    };

    let client = GeminiClient::new(key, cfg.llm.model.clone()).with_base_url(cfg.llm.base_url.clone());
    let options = ChatOptions {
        max_turns_context: cfg.chat.max_turns_context,
    };
    chat::run_chat(client, options).await
}

fn remote_model(cfg: &config::Config) -> Option<GeminiClient> {
    let key = config::api_key(cfg)?;
    Some(GeminiClient::new(key, cfg.llm.model.clone()).with_base_url(cfg.llm.base_url.clone()))
}

/// Parse a `DESC:AMOUNT:LABEL` flag into a manually entered transaction.
fn parse_manual_entry(raw: &str, schema: SchemaArg) -> Result<Transaction> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [description, amount, label, rest @ ..] = parts.as_slice() else {
        bail!("--add expects DESC:AMOUNT:LABEL, got {raw:?}");
    };

    let description = description.trim();
    if description.is_empty() {
        bail!("--add needs a non-empty description: {raw:?}");
    }

    let amount: f64 = amount
        .trim()
        .parse()
        .with_context(|| format!("--add amount is not a number: {raw:?}"))?;
    if !amount.is_finite() || amount <= 0.0 {
        bail!("--add amount must be positive: {raw:?}");
    }

    let classification = match schema {
        SchemaArg::Categories => {
            if !rest.is_empty() {
                bail!("--add expects DESC:AMOUNT:CATEGORY, got {raw:?}");
            }
            let Some(category) = Category::from_name(label) else {
                bail!(
                    "unknown category {label:?}; expected one of {}",
                    Category::ALL.map(|c| c.as_str()).join(", ")
                );
            };
            Classification::Category(category)
        }
        SchemaArg::IncomeExpense => {
            let Some(kind) = FlowKind::from_name(label) else {
                bail!("--add type must be income or expense, got {label:?}");
            };
            let category = rest
                .first()
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .map(|c| c.to_string());
            Classification::Flow { kind, category }
        }
    };

    Ok(Transaction::manual(description, amount, classification))
}
