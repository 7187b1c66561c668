use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::{Category, TransactionKind};

/// A single recorded movement of money. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    pub category: Category,
    pub note: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_recurring: bool,
}

impl Transaction {
    /// Builds a manual entry; `kind` is derived from the category.
    pub fn new(
        amount: f64,
        category: Category,
        note: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            amount,
            category,
            note: note.into(),
            date,
            kind: category.kind(),
            is_recurring: false,
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// Signed contribution to the running balance.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }

    /// Re-derives `kind` from the category. Returns true when the stored value
    /// disagreed and had to be corrected.
    pub(crate) fn repair_kind(&mut self) -> bool {
        let expected = self.category.kind();
        if self.kind == expected {
            return false;
        }
        self.kind = expected;
        true
    }
}

/// Fresh identifier for user-created records.
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn kind_follows_category() {
        let pay = Transaction::new(1000.0, Category::Income, "Salary", at(1));
        let lunch = Transaction::new(12.0, Category::Food, "Lunch", at(2));
        assert!(pay.is_income());
        assert!(lunch.is_expense());
        assert_eq!(pay.signed_amount(), 1000.0);
        assert_eq!(lunch.signed_amount(), -12.0);
    }

    #[test]
    fn ids_are_unique() {
        let a = Transaction::new(1.0, Category::Other, "a", at(1));
        let b = Transaction::new(1.0, Category::Other, "b", at(1));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn json_uses_camel_case_and_type_field() {
        let mut txn = Transaction::new(5.0, Category::Transport, "Bus", at(4));
        txn.is_recurring = true;
        let value = serde_json::to_value(&txn).unwrap();
        assert_eq!(value["type"], "expense");
        assert_eq!(value["isRecurring"], true);
        assert_eq!(value["category"], "Transport");
    }

    #[test]
    fn manual_entries_omit_recurring_flag() {
        let txn = Transaction::new(5.0, Category::Transport, "Bus", at(4));
        let value = serde_json::to_value(&txn).unwrap();
        assert!(value.get("isRecurring").is_none());
    }

    #[test]
    fn repair_kind_fixes_mismatch() {
        let mut txn = Transaction::new(5.0, Category::Income, "Refund", at(4));
        txn.kind = TransactionKind::Expense;
        assert!(txn.repair_kind());
        assert_eq!(txn.kind, TransactionKind::Income);
        assert!(!txn.repair_kind());
    }
}
