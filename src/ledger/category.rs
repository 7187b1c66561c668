use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of transaction purposes. Serialized as the display label so
/// stored data stays readable and matches what the assistant is asked to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Food & Drink")]
    Food,
    Transport,
    Shopping,
    Entertainment,
    Housing,
    Utilities,
    Income,
    Other,
}

/// Direction of money flow for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Food,
        Category::Transport,
        Category::Shopping,
        Category::Entertainment,
        Category::Housing,
        Category::Utilities,
        Category::Income,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Food => "Food & Drink",
            Category::Transport => "Transport",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::Housing => "Housing",
            Category::Utilities => "Utilities",
            Category::Income => "Income",
            Category::Other => "Other",
        }
    }

    pub fn kind(self) -> TransactionKind {
        match self {
            Category::Income => TransactionKind::Income,
            _ => TransactionKind::Expense,
        }
    }

    /// Every category that can carry a spending limit.
    pub fn expense_categories() -> impl Iterator<Item = Category> {
        Self::ALL.into_iter().filter(|c| *c != Category::Income)
    }

    /// Exact label membership. Anything else is not a category.
    pub fn from_label(label: &str) -> Option<Category> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }

    /// Lenient lookup for typed input: case-insensitive labels plus short
    /// aliases such as `food` or `bills`.
    pub fn parse_loose(input: &str) -> Option<Category> {
        let needle = input.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        if let Some(found) = Self::ALL
            .into_iter()
            .find(|c| c.label().to_lowercase() == needle)
        {
            return Some(found);
        }
        let alias = match needle.as_str() {
            "food" | "drink" | "dining" | "groceries" => Category::Food,
            "travel" | "transit" => Category::Transport,
            "shop" => Category::Shopping,
            "fun" | "leisure" => Category::Entertainment,
            "rent" | "home" => Category::Housing,
            "bills" | "utility" => Category::Utilities,
            "salary" | "pay" => Category::Income,
            "misc" => Category::Other,
            _ => return None,
        };
        Some(alias)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Income => f.write_str("income"),
            TransactionKind::Expense => f.write_str("expense"),
        }
    }
}
