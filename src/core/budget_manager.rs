use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};

use crate::core::services::{BudgetProgress, CategorySpending, SummaryService};
use crate::core::time::Clock;
use crate::errors::{BudgetError, Result};
use crate::insights::{self, Advisor, CategorizedEntry, WELCOME_INSIGHT};
use crate::ledger::{materialize_due, BudgetMap, Category, Frequency, RecurringRule, Transaction};
use crate::storage::{self, StorageBackend, BUDGETS_KEY, RECURRING_KEY, TRANSACTIONS_KEY};

/// Assistant operations that may be in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    QuickAdd,
    Insights,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::QuickAdd => f.write_str("quick-add"),
            RequestKind::Insights => f.write_str("insights"),
        }
    }
}

/// Proof that a request was started. Carries the transaction revision seen at
/// issue time so a late insights answer can be recognized as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    kind: RequestKind,
    serial: u64,
    revision: u64,
}

impl RequestTicket {
    pub fn kind(&self) -> RequestKind {
        self.kind
    }
}

/// Owns the canonical collections. Every mutation is synced to storage, and
/// every change to the recurring rules is followed by a materializer pass.
pub struct BudgetManager {
    transactions: Vec<Transaction>,
    budgets: BudgetMap,
    recurring: Vec<RecurringRule>,
    insight_text: String,
    /// Bumped whenever the transaction collection changes.
    revision: u64,
    pending: HashMap<RequestKind, u64>,
    next_serial: u64,
    storage: Box<dyn StorageBackend>,
    clock: Box<dyn Clock>,
}

impl BudgetManager {
    /// Loads all three collections (missing or corrupt ones start empty) and
    /// catches recurring rules up to the current instant.
    pub fn open(storage: Box<dyn StorageBackend>, clock: Box<dyn Clock>) -> Self {
        let mut transactions: Vec<Transaction> =
            storage::load_or_default(storage.as_ref(), TRANSACTIONS_KEY);
        let mut budgets: BudgetMap = storage::load_or_default(storage.as_ref(), BUDGETS_KEY);
        let mut recurring: Vec<RecurringRule> =
            storage::load_or_default(storage.as_ref(), RECURRING_KEY);

        let repaired_transactions = transactions
            .iter_mut()
            .map(|t| t.repair_kind())
            .filter(|changed| *changed)
            .count();
        if repaired_transactions > 0 {
            tracing::warn!(
                count = repaired_transactions,
                "stored transactions had a type that disagreed with their category; re-derived"
            );
        }
        let repaired_budgets = budgets.sanitize();
        if repaired_budgets > 0 {
            tracing::warn!(count = repaired_budgets, "dropped or reset invalid budget limits");
        }
        let repaired_rules = recurring
            .iter_mut()
            .map(|r| r.repair())
            .filter(|changed| *changed)
            .count();
        if repaired_rules > 0 {
            tracing::warn!(count = repaired_rules, "repaired inconsistent recurring rules");
        }

        tracing::info!(
            transactions = transactions.len(),
            budgets = budgets.len(),
            recurring = recurring.len(),
            "budget state loaded"
        );

        let mut manager = Self {
            transactions,
            budgets,
            recurring,
            insight_text: WELCOME_INSIGHT.to_string(),
            revision: 0,
            pending: HashMap::new(),
            next_serial: 0,
            storage,
            clock,
        };
        manager.materialize();
        manager
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // Mutations

    /// Prepends `transaction` and returns its id.
    pub fn add_transaction(&mut self, transaction: Transaction) -> String {
        let id = transaction.id.clone();
        tracing::debug!(id = %id, amount = transaction.amount, category = %transaction.category, "transaction added");
        self.transactions.insert(0, transaction);
        self.revision += 1;
        self.persist_transactions();
        id
    }

    /// Manual entry dated now.
    pub fn record(&mut self, amount: f64, category: Category, note: &str) -> Result<String> {
        let note = validate_entry(amount, note)?;
        let transaction = Transaction::new(amount, category, note, self.clock.now());
        Ok(self.add_transaction(transaction))
    }

    /// Appends `rule` and runs a materializer pass. A rule whose
    /// `last_processed_date` lies in the past is backfilled immediately.
    pub fn add_recurring_rule(&mut self, rule: RecurringRule) -> String {
        let id = rule.id.clone();
        tracing::info!(id = %id, frequency = %rule.frequency, "recurring rule added");
        self.recurring.push(rule);
        self.persist_recurring();
        self.materialize();
        id
    }

    /// Builds a rule anchored at the current instant; the first entry is
    /// generated one period from now.
    pub fn create_recurring_rule(
        &mut self,
        amount: f64,
        category: Category,
        note: &str,
        frequency: Frequency,
    ) -> Result<String> {
        let note = validate_entry(amount, note)?;
        let rule = RecurringRule::new(amount, category, note, frequency, self.clock.now());
        Ok(self.add_recurring_rule(rule))
    }

    pub fn remove_recurring_rule(&mut self, id: &str) -> bool {
        let before = self.recurring.len();
        self.recurring.retain(|rule| rule.id != id);
        let removed = self.recurring.len() != before;
        if removed {
            tracing::info!(id, "recurring rule removed");
            self.persist_recurring();
        }
        self.materialize();
        removed
    }

    /// Upserts a limit and returns the stored value (negative and non-finite
    /// inputs are stored as zero). Income cannot carry a limit.
    pub fn set_budget_limit(&mut self, category: Category, limit: f64) -> Result<f64> {
        let stored = self.budgets.set_limit(category, limit).ok_or_else(|| {
            BudgetError::InvalidInput(format!("{category} cannot have a budget limit"))
        })?;
        self.persist_budgets();
        Ok(stored)
    }

    pub fn remove_transaction(&mut self, id: &str) -> bool {
        let before = self.transactions.len();
        self.transactions.retain(|t| t.id != id);
        if self.transactions.len() == before {
            return false;
        }
        self.revision += 1;
        self.persist_transactions();
        true
    }

    /// Removes every transaction; rules and budgets are untouched. Returns the
    /// number removed.
    pub fn clear_transactions(&mut self) -> usize {
        let removed = self.transactions.len();
        if removed == 0 {
            return 0;
        }
        self.transactions.clear();
        self.revision += 1;
        self.persist_transactions();
        tracing::info!(removed, "transactions cleared");
        removed
    }

    /// Runs one materializer pass at the current instant and prepends the
    /// generated transactions. Returns how many were added.
    pub fn materialize(&mut self) -> usize {
        let outcome = materialize_due(self.clock.now(), &mut self.recurring);
        if outcome.is_empty() {
            return 0;
        }

        let fresh: Vec<Transaction> = {
            let existing: HashSet<&str> =
                self.transactions.iter().map(|t| t.id.as_str()).collect();
            outcome
                .transactions
                .into_iter()
                .filter(|t| !existing.contains(t.id.as_str()))
                .collect()
        };
        let added = fresh.len();

        if added > 0 {
            self.transactions.splice(0..0, fresh);
            self.revision += 1;
            self.persist_transactions();
        }
        self.persist_recurring();
        tracing::info!(
            added,
            rules = outcome.rules_advanced,
            "recurring transactions materialized"
        );
        added
    }

    // Assistant requests

    /// Marks a request of `kind` as in flight. Only one request per kind may
    /// be outstanding; other mutations stay available meanwhile.
    pub fn begin_request(&mut self, kind: RequestKind) -> Result<RequestTicket> {
        if self.pending.contains_key(&kind) {
            return Err(BudgetError::RequestPending(kind));
        }
        self.next_serial += 1;
        self.pending.insert(kind, self.next_serial);
        Ok(RequestTicket {
            kind,
            serial: self.next_serial,
            revision: self.revision,
        })
    }

    pub fn is_pending(&self, kind: RequestKind) -> bool {
        self.pending.contains_key(&kind)
    }

    /// Drops an in-flight request without applying anything.
    pub fn cancel_request(&mut self, ticket: RequestTicket) {
        if self.pending.get(&ticket.kind) == Some(&ticket.serial) {
            self.pending.remove(&ticket.kind);
        }
    }

    fn settle(&mut self, ticket: RequestTicket, expected: RequestKind) -> Result<()> {
        if ticket.kind != expected || self.pending.get(&expected) != Some(&ticket.serial) {
            return Err(BudgetError::UnknownRequest(expected));
        }
        self.pending.remove(&expected);
        Ok(())
    }

    /// Completes a quick-add by recording the categorized entry.
    pub fn finish_quick_add(
        &mut self,
        ticket: RequestTicket,
        entry: CategorizedEntry,
    ) -> Result<String> {
        self.settle(ticket, RequestKind::QuickAdd)?;
        let mut entry = entry;
        if !entry.amount.is_finite() || entry.amount < 0.0 {
            tracing::warn!(amount = entry.amount, "quick-add amount unusable; recording 0");
            entry.amount = 0.0;
        }
        let transaction = entry.into_transaction(self.clock.now());
        Ok(self.add_transaction(transaction))
    }

    /// Applies an insights answer. Returns `Ok(false)` and keeps the current
    /// text when the transactions changed after the ticket was issued.
    pub fn finish_insights(&mut self, ticket: RequestTicket, text: String) -> Result<bool> {
        self.settle(ticket, RequestKind::Insights)?;
        if ticket.revision != self.revision {
            tracing::debug!(
                issued = ticket.revision,
                current = self.revision,
                "discarding stale insights"
            );
            return Ok(false);
        }
        self.insight_text = text;
        Ok(true)
    }

    /// Categorizes `text` through `advisor` and records the result.
    pub fn quick_add(&mut self, advisor: &Advisor, text: &str) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(BudgetError::InvalidInput("quick-add text is empty".into()));
        }
        let ticket = self.begin_request(RequestKind::QuickAdd)?;
        let entry = advisor.categorize_from_text(text);
        self.finish_quick_add(ticket, entry)
    }

    pub fn refresh_insights(&mut self, advisor: &Advisor) -> Result<bool> {
        let ticket = self.begin_request(RequestKind::Insights)?;
        let text = advisor.insights(&self.transactions);
        self.finish_insights(ticket, text)
    }

    // Queries

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn budgets(&self) -> &BudgetMap {
        &self.budgets
    }

    pub fn recurring_rules(&self) -> &[RecurringRule] {
        &self.recurring
    }

    pub fn balance(&self) -> f64 {
        SummaryService::total_balance(&self.transactions)
    }

    pub fn spending(&self) -> CategorySpending {
        SummaryService::category_spending(&self.transactions)
    }

    pub fn history(&self, query: &str) -> Vec<&Transaction> {
        SummaryService::filtered_history(&self.transactions, query)
    }

    pub fn budget_progress(&self, category: Category) -> BudgetProgress {
        SummaryService::budget_progress(category, &self.budgets, &self.spending())
    }

    pub fn budget_overview(&self) -> Vec<BudgetProgress> {
        SummaryService::budget_overview(&self.budgets, &self.spending())
    }

    pub fn expense_breakdown(&self) -> Vec<(Category, f64)> {
        SummaryService::expense_breakdown(&self.spending())
    }

    pub fn recent(&self, count: usize) -> &[Transaction] {
        SummaryService::recent(&self.transactions, count)
    }

    pub fn insight_text(&self) -> &str {
        &self.insight_text
    }

    pub fn insight_items(&self) -> Vec<String> {
        insights::insight_items(&self.insight_text)
    }

    // Persistence

    fn persist_transactions(&self) {
        self.persist(TRANSACTIONS_KEY, &self.transactions);
    }

    fn persist_budgets(&self) {
        self.persist(BUDGETS_KEY, &self.budgets);
    }

    fn persist_recurring(&self) {
        self.persist(RECURRING_KEY, &self.recurring);
    }

    fn persist<T: serde::Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(err) = storage::save(self.storage.as_ref(), key, value) {
            tracing::warn!(key, error = %err, "failed to persist collection; in-memory state kept");
        }
    }
}

fn validate_entry(amount: f64, note: &str) -> Result<&str> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(BudgetError::InvalidInput(format!(
            "amount must be a non-negative number, got {amount}"
        )));
    }
    let note = note.trim();
    if note.is_empty() {
        return Err(BudgetError::InvalidInput("note must not be empty".into()));
    }
    Ok(note)
}
