//! Recurring rules and the materializer that turns elapsed periods into
//! concrete transactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::{Category, TransactionKind};
use super::time_interval::{advance, Frequency};
use super::transaction::{new_id, Transaction};

/// Prefix applied to notes of generated transactions.
pub const AUTO_NOTE_PREFIX: &str = "[Auto] ";

/// Template that periodically materializes into transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringRule {
    pub id: String,
    pub amount: f64,
    pub category: Category,
    pub note: String,
    pub frequency: Frequency,
    pub start_date: DateTime<Utc>,
    pub last_processed_date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

impl RecurringRule {
    /// Creates a rule anchored at `created_at`. Nothing is backdated: the first
    /// emission happens one full period after creation.
    pub fn new(
        amount: f64,
        category: Category,
        note: impl Into<String>,
        frequency: Frequency,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            amount,
            category,
            note: note.into(),
            frequency,
            start_date: created_at,
            last_processed_date: created_at,
            kind: category.kind(),
        }
    }

    pub fn next_due(&self) -> DateTime<Utc> {
        advance(self.last_processed_date, self.frequency)
    }

    /// Concrete transaction for the boundary at `date`. The id is derived from
    /// the rule and the instant so the same occurrence always maps to the
    /// same record.
    pub fn instance_at(&self, date: DateTime<Utc>) -> Transaction {
        Transaction {
            id: format!("rec-gen-{}-{}", self.id, date.timestamp_millis()),
            amount: self.amount,
            category: self.category,
            note: format!("{AUTO_NOTE_PREFIX}{}", self.note),
            date,
            kind: self.kind,
            is_recurring: true,
        }
    }

    /// Restores `last_processed_date >= start_date` and the category/type
    /// pairing for rules read from storage. Returns true if anything changed.
    pub(crate) fn repair(&mut self) -> bool {
        let mut changed = false;
        if self.last_processed_date < self.start_date {
            self.last_processed_date = self.start_date;
            changed = true;
        }
        let expected = self.category.kind();
        if self.kind != expected {
            self.kind = expected;
            changed = true;
        }
        changed
    }
}

/// Result of one materializer pass.
#[derive(Debug, Clone, Default)]
pub struct Materialized {
    /// Newly generated transactions, oldest first across all rules.
    pub transactions: Vec<Transaction>,
    /// How many rules had at least one elapsed period.
    pub rules_advanced: usize,
}

impl Materialized {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// Emits one transaction for every period boundary in
/// `(rule.last_processed_date, now]` and advances each rule accordingly.
///
/// Calling again with the same `now` emits nothing, since every rule has
/// already caught up. A rule unused for months yields one entry per period,
/// never a single lump sum.
pub fn materialize_due(now: DateTime<Utc>, rules: &mut [RecurringRule]) -> Materialized {
    let mut outcome = Materialized::default();

    for rule in rules.iter_mut() {
        let mut emitted = 0usize;
        let mut next = rule.next_due();
        // `advance` saturates at the far end of the calendar; stop if it stalls.
        while next <= now && next > rule.last_processed_date {
            outcome.transactions.push(rule.instance_at(next));
            rule.last_processed_date = next;
            next = rule.next_due();
            emitted += 1;
        }
        if emitted > 0 {
            outcome.rules_advanced += 1;
            tracing::debug!(
                rule = %rule.id,
                emitted,
                last_processed = %rule.last_processed_date,
                "materialized recurring rule"
            );
        }
    }

    outcome.transactions.sort_by_key(|txn| txn.date);
    outcome
}
