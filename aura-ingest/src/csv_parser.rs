//! Parse user-uploaded CSV exports into typed transactions.
//!
//! Expected shape: a header line naming (case-insensitive, any order)
//! `date`, `description`, `amount`, and either `category` or `type`
//! depending on the deployed schema, followed by comma-separated rows.
//! Quoted fields and embedded commas are not supported.

use chrono::Utc;
use thiserror::Error;
use tracing::warn;

use aura_core::transaction::{Category, Classification, FlowKind, Transaction};

/// Which of the two deployed CSV schemas a file is parsed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvSchema {
    /// `date,description,amount,category`: every row an expense in the closed set
    Categories,
    /// `date,description,amount,type[,category]`: income/expense rows with
    /// an optional free-text category column
    IncomeExpense,
}

impl CsvSchema {
    /// Header name of the variant's labeling column.
    fn label_column(&self) -> &'static str {
        match self {
            CsvSchema::Categories => "category",
            CsvSchema::IncomeExpense => "type",
        }
    }

    fn label_column_display(&self) -> &'static str {
        match self {
            CsvSchema::Categories => "Category",
            CsvSchema::IncomeExpense => "Type",
        }
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    /// The header line is missing a required column. Fatal to the parse.
    #[error("Invalid CSV headers. Must include Date, Description, Amount, {0}.")]
    InvalidFormat(&'static str),
    /// Every data row was rejected. Fatal to the parse.
    #[error("No valid transactions found in the CSV file.")]
    NoValidRows,
}

/// Resolved column indices, order-independent.
struct Columns {
    width: usize,
    date: usize,
    description: usize,
    amount: usize,
    label: usize,
    /// IncomeExpense only: free-text category column, when present
    extra_category: Option<usize>,
}

impl Columns {
    fn locate(header: &csv::StringRecord, schema: CsvSchema) -> Result<Columns, ParseError> {
        let cells: Vec<String> = header
            .iter()
            .map(|c| c.trim().to_ascii_lowercase())
            .collect();
        let find = |name: &str| cells.iter().position(|c| c == name);

        let (Some(date), Some(description), Some(amount), Some(label)) = (
            find("date"),
            find("description"),
            find("amount"),
            find(schema.label_column()),
        ) else {
            return Err(ParseError::InvalidFormat(schema.label_column_display()));
        };

        let extra_category = match schema {
            CsvSchema::Categories => None,
            CsvSchema::IncomeExpense => find("category"),
        };

        Ok(Columns {
            width: header.len(),
            date,
            description,
            amount,
            label,
            extra_category,
        })
    }
}

/// Parse CSV text, returning every valid transaction.
///
/// Individual bad rows are skipped with a warning; only a malformed header
/// (`InvalidFormat`) or an empty result (`NoValidRows`) fails the call.
pub fn parse_csv(text: &str, schema: CsvSchema) -> Result<Vec<Transaction>, ParseError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .quoting(false)
        .has_headers(false)
        .from_reader(text.as_bytes());

    let ingested_at = Utc::now().timestamp_millis();
    let mut columns: Option<Columns> = None;
    let mut txns = Vec::new();

    for (row, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(row, error = %e, "skipping unreadable CSV row");
                continue;
            }
        };

        // First line is the header.
        let Some(cols) = columns.as_ref() else {
            columns = Some(Columns::locate(&record, schema)?);
            continue;
        };

        if let Some(txn) = read_row(&record, cols, schema, ingested_at, row) {
            txns.push(txn);
        }
    }

    // No records at all means no header either.
    if columns.is_none() {
        return Err(ParseError::InvalidFormat(schema.label_column_display()));
    }

    if txns.is_empty() {
        return Err(ParseError::NoValidRows);
    }
    Ok(txns)
}

fn read_row(
    record: &csv::StringRecord,
    cols: &Columns,
    schema: CsvSchema,
    ingested_at: i64,
    row: usize,
) -> Option<Transaction> {
    if record.len() < cols.width {
        warn!(row, fields = record.len(), "skipping short CSV row");
        return None;
    }

    let field = |i: usize| record.get(i).unwrap_or("").trim();

    let description = field(cols.description);
    if description.is_empty() {
        warn!(row, "skipping row with empty description");
        return None;
    }

    let amount: f64 = match field(cols.amount).parse() {
        Ok(a) => a,
        Err(_) => {
            warn!(row, "skipping row with unparseable amount");
            return None;
        }
    };
    if !amount.is_finite() || amount == 0.0 {
        warn!(row, amount, "skipping row with invalid amount");
        return None;
    }

    let classification = match schema {
        CsvSchema::Categories => {
            let Some(category) = Category::from_name(field(cols.label)) else {
                warn!(row, category = field(cols.label), "skipping row with unknown category");
                return None;
            };
            Classification::Category(category)
        }
        CsvSchema::IncomeExpense => {
            let Some(kind) = FlowKind::from_name(field(cols.label)) else {
                warn!(row, kind = field(cols.label), "skipping row with unknown flow type");
                return None;
            };
            let category = cols
                .extra_category
                .map(|i| field(i))
                .filter(|c| !c.is_empty())
                .map(|c| c.to_string());
            Classification::Flow { kind, category }
        }
    };

    Some(Transaction::new(
        format!("{ingested_at}-{row}"),
        field(cols.date),
        description,
        amount.abs(),
        classification,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_categorized() {
        let csv = "Date,Description,Amount,Category\n\
                   2024-01-01,Coffee,5.50,Food\n\
                   2024-01-02,Bus ticket,2.75,Transport\n";
        let txns = parse_csv(csv, CsvSchema::Categories).unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].description, "Coffee");
        assert_eq!(txns[0].amount, 5.50);
        assert_eq!(
            txns[0].classification,
            Classification::Category(Category::Food)
        );
        assert!(txns.iter().all(|t| t.amount > 0.0));
    }

    #[test]
    fn test_row_skipping_is_independent_per_row() {
        // The concrete scenario from the upload contract: the bad row is
        // dropped, the negative amount is normalized.
        let csv = "Date,Description,Amount,Category\n\
                   2024-01-01,Coffee,5.50,Food\n\
                   2024-01-02,Bad Row,notanumber,Food\n\
                   2024-01-03,Groceries,-75.20,Food\n";
        let txns = parse_csv(csv, CsvSchema::Categories).unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].description, "Coffee");
        assert_eq!(txns[1].description, "Groceries");
        assert_eq!(txns[1].amount, 75.20);
    }

    #[test]
    fn test_missing_header_column_is_fatal() {
        let csv = "Date,Desc,Amount,Category\n2024-01-01,Coffee,5.50,Food\n";
        let err = parse_csv(csv, CsvSchema::Categories).unwrap_err();
        assert!(matches!(err, ParseError::InvalidFormat(_)));
        assert!(err.to_string().contains("Date, Description, Amount, Category"));
    }

    #[test]
    fn test_all_rows_rejected_is_fatal() {
        let csv = "Date,Description,Amount,Category\n\
                   2024-01-01,Coffee,zero,Food\n\
                   2024-01-02,Haircut,12.00,Grooming\n\
                   2024-01-03,Short\n";
        let err = parse_csv(csv, CsvSchema::Categories).unwrap_err();
        assert!(matches!(err, ParseError::NoValidRows));
    }

    #[test]
    fn test_header_is_case_insensitive_and_order_independent() {
        let csv = "AMOUNT, category ,Date,DESCRIPTION\n9.99,food,2024-01-01,Snacks\n";
        let txns = parse_csv(csv, CsvSchema::Categories).unwrap();
        assert_eq!(txns[0].amount, 9.99);
        assert_eq!(txns[0].description, "Snacks");
        assert_eq!(txns[0].date, "2024-01-01");
    }

    #[test]
    fn test_category_matching_is_case_insensitive() {
        let csv = "Date,Description,Amount,Category\n\
                   2024-01-01,A,1.00,food\n\
                   2024-01-02,B,1.00,FOOD\n\
                   2024-01-03,C,1.00,Food\n";
        let txns = parse_csv(csv, CsvSchema::Categories).unwrap();
        assert_eq!(txns.len(), 3);
        assert!(txns
            .iter()
            .all(|t| t.classification == Classification::Category(Category::Food)));
    }

    #[test]
    fn test_negative_amount_is_normalized() {
        let csv = "Date,Description,Amount,Category\n2024-01-01,Refund gone wrong,-42.50,Shopping\n";
        let txns = parse_csv(csv, CsvSchema::Categories).unwrap();
        assert_eq!(txns[0].amount, 42.50);
    }

    #[test]
    fn test_zero_amount_is_skipped() {
        let csv = "Date,Description,Amount,Category\n\
                   2024-01-01,Nothing,0,Food\n\
                   2024-01-02,Coffee,5.50,Food\n";
        let txns = parse_csv(csv, CsvSchema::Categories).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].description, "Coffee");
    }

    #[test]
    fn test_trailing_blank_lines_are_ignored() {
        let csv = "Date,Description,Amount,Category\n2024-01-01,Coffee,5.50,Food\n\n\n";
        let txns = parse_csv(csv, CsvSchema::Categories).unwrap();
        assert_eq!(txns.len(), 1);
    }

    #[test]
    fn test_date_is_kept_verbatim() {
        let csv = "Date,Description,Amount,Category\n01/31/2024,Coffee,5.50,Food\n";
        let txns = parse_csv(csv, CsvSchema::Categories).unwrap();
        assert_eq!(txns[0].date, "01/31/2024");
    }

    #[test]
    fn test_quoted_fields_are_not_interpreted() {
        // Embedded commas shift the field positions; the amount cell no
        // longer parses and the row is dropped rather than repaired.
        let csv = "Date,Description,Amount,Category\n\
                   2024-01-01,\"Coffee, oat milk\",5.50,Food\n\
                   2024-01-02,Plain coffee,3.00,Food\n";
        let txns = parse_csv(csv, CsvSchema::Categories).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].description, "Plain coffee");
    }

    #[test]
    fn test_ids_are_unique_per_row() {
        let csv = "Date,Description,Amount,Category\n\
                   2024-01-01,A,1.00,Food\n\
                   2024-01-02,B,2.00,Food\n";
        let txns = parse_csv(csv, CsvSchema::Categories).unwrap();
        assert_ne!(txns[0].id, txns[1].id);
    }

    #[test]
    fn test_income_expense_variant() {
        let csv = "Date,Description,Amount,Type,Category\n\
                   2024-01-05,Salary,3000.00,Income,\n\
                   2024-01-10,Rent,-1500.00,expense,Rent\n\
                   2024-01-11,Transfer,100.00,transfer,\n";
        let txns = parse_csv(csv, CsvSchema::IncomeExpense).unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(
            txns[0].classification,
            Classification::Flow {
                kind: FlowKind::Income,
                category: None,
            }
        );
        assert_eq!(
            txns[1].classification,
            Classification::Flow {
                kind: FlowKind::Expense,
                category: Some("Rent".to_string()),
            }
        );
        assert_eq!(txns[1].amount, 1500.00);
    }

    #[test]
    fn test_income_expense_header_requires_type() {
        let csv = "Date,Description,Amount,Category\n2024-01-01,Coffee,5.50,Food\n";
        let err = parse_csv(csv, CsvSchema::IncomeExpense).unwrap_err();
        assert!(err.to_string().contains("Type"));
    }

    #[test]
    fn test_empty_input_is_invalid_format() {
        let err = parse_csv("", CsvSchema::Categories).unwrap_err();
        assert!(matches!(err, ParseError::InvalidFormat(_)));
    }
}
