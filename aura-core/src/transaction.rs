//! Transaction types shared by ingestion, analysis, and the CLI.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed spending-category set used by the categorized variant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Food,
    Transport,
    Shopping,
    Entertainment,
    Utilities,
    Health,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Food,
        Category::Transport,
        Category::Shopping,
        Category::Entertainment,
        Category::Utilities,
        Category::Health,
        Category::Other,
    ];

    /// Canonical display name
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::Utilities => "Utilities",
            Category::Health => "Health",
            Category::Other => "Other",
        }
    }

    /// Case-insensitive lookup against the closed set. Exact name only, no synonyms.
    pub fn from_name(name: &str) -> Option<Category> {
        let name = name.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of money in the income/expense variant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlowKind {
    Income,
    Expense,
}

impl FlowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowKind::Income => "income",
            FlowKind::Expense => "expense",
        }
    }

    /// Case-insensitive lookup of `income`/`expense`.
    pub fn from_name(name: &str) -> Option<FlowKind> {
        match name.trim().to_ascii_lowercase().as_str() {
            "income" => Some(FlowKind::Income),
            "expense" => Some(FlowKind::Expense),
            _ => None,
        }
    }
}

/// How a transaction is labeled. The two deployed CSV schemas are mutually
/// exclusive; a parse produces a list homogeneous in variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Classification {
    /// Categorized variant: every row is an expense in the closed set.
    Category(Category),
    /// Income/expense variant: direction plus an optional free-text category.
    Flow {
        kind: FlowKind,
        category: Option<String>,
    },
}

impl Classification {
    pub fn is_expense(&self) -> bool {
        match self {
            Classification::Category(_) => true,
            Classification::Flow { kind, .. } => *kind == FlowKind::Expense,
        }
    }

    /// Resolved bucket name used when grouping spending.
    pub fn bucket(&self) -> &str {
        match self {
            Classification::Category(c) => c.as_str(),
            Classification::Flow { category, .. } => {
                category.as_deref().unwrap_or("Uncategorized")
            }
        }
    }
}

/// One recorded financial event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Unique id assigned at creation time
    pub id: String,
    /// Calendar date. Manual entries are ISO `YYYY-MM-DD`; CSV rows keep the
    /// raw trimmed source string verbatim.
    pub date: String,
    pub description: String,
    /// Always positive; sign is normalized at ingestion.
    pub amount: f64,
    pub classification: Classification,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        date: impl Into<String>,
        description: impl Into<String>,
        amount: f64,
        classification: Classification,
    ) -> Self {
        Self {
            id: id.into(),
            date: date.into(),
            description: description.into(),
            amount,
            classification,
        }
    }

    /// Build a manually entered transaction: timestamp id, today's date in ISO form.
    pub fn manual(
        description: impl Into<String>,
        amount: f64,
        classification: Classification,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: format!("manual-{}", now.timestamp_millis()),
            date: now.format("%Y-%m-%d").to_string(),
            description: description.into(),
            amount,
            classification,
        }
    }

    pub fn is_expense(&self) -> bool {
        self.classification.is_expense()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_lookup_is_case_insensitive() {
        assert_eq!(Category::from_name("food"), Some(Category::Food));
        assert_eq!(Category::from_name("FOOD"), Some(Category::Food));
        assert_eq!(Category::from_name("Food"), Some(Category::Food));
        assert_eq!(Category::from_name(" health "), Some(Category::Health));
        assert_eq!(Category::from_name("groceries"), None);
    }

    #[test]
    fn test_flow_kind_lookup() {
        assert_eq!(FlowKind::from_name("Income"), Some(FlowKind::Income));
        assert_eq!(FlowKind::from_name("EXPENSE"), Some(FlowKind::Expense));
        assert_eq!(FlowKind::from_name("transfer"), None);
    }

    #[test]
    fn test_bucket_resolution() {
        let cat = Classification::Category(Category::Transport);
        assert_eq!(cat.bucket(), "Transport");

        let flow = Classification::Flow {
            kind: FlowKind::Expense,
            category: Some("Rent".to_string()),
        };
        assert_eq!(flow.bucket(), "Rent");

        let bare = Classification::Flow {
            kind: FlowKind::Expense,
            category: None,
        };
        assert_eq!(bare.bucket(), "Uncategorized");
    }

    #[test]
    fn test_manual_transaction_has_iso_date() {
        let t = Transaction::manual("Coffee", 5.5, Classification::Category(Category::Food));
        assert!(t.id.starts_with("manual-"));
        assert_eq!(t.date.len(), 10);
        assert_eq!(&t.date[4..5], "-");
    }
}
