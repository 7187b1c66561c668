//! Aggregation helpers for balances, category spend, and budget progress.

use std::collections::BTreeMap;

use crate::ledger::{BudgetMap, Category, Transaction};

/// Category → summed expense amount. Categories without expenses are absent;
/// callers treat absence as zero.
pub type CategorySpending = BTreeMap<Category, f64>;

/// Usage of one category's limit.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetProgress {
    pub category: Category,
    pub spent: f64,
    /// `None` when no positive limit is set ("no goal").
    pub limit: Option<f64>,
    /// `spent / limit * 100`; `None` without a goal.
    pub percent: Option<f64>,
    pub over_budget: bool,
}

impl BudgetProgress {
    /// Percent clamped to 100 for progress bars; zero without a goal.
    pub fn display_percent(&self) -> f64 {
        self.percent.map(|p| p.min(100.0)).unwrap_or(0.0)
    }

    pub fn has_goal(&self) -> bool {
        self.limit.is_some()
    }
}

/// Pure projections over a transaction list. Nothing here mutates or caches.
pub struct SummaryService;

impl SummaryService {
    /// Σ income − Σ expense, unrounded. An empty list is `+0.0`.
    pub fn total_balance(transactions: &[Transaction]) -> f64 {
        transactions
            .iter()
            .map(Transaction::signed_amount)
            .fold(0.0, |acc, amount| acc + amount)
    }

    pub fn category_spending(transactions: &[Transaction]) -> CategorySpending {
        let mut spending = CategorySpending::new();
        for txn in transactions.iter().filter(|t| t.is_expense()) {
            *spending.entry(txn.category).or_insert(0.0) += txn.amount;
        }
        spending
    }

    /// Case-insensitive substring match against the note or the category
    /// label. A blank query returns everything; input order is kept.
    pub fn filtered_history<'a>(
        transactions: &'a [Transaction],
        query: &str,
    ) -> Vec<&'a Transaction> {
        if query.trim().is_empty() {
            return transactions.iter().collect();
        }
        let needle = query.to_lowercase();
        transactions
            .iter()
            .filter(|t| {
                t.note.to_lowercase().contains(&needle)
                    || t.category.label().to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn budget_progress(
        category: Category,
        budgets: &BudgetMap,
        spending: &CategorySpending,
    ) -> BudgetProgress {
        let limit = budgets.limit(category);
        let spent = spending.get(&category).copied().unwrap_or(0.0);
        if limit > 0.0 {
            BudgetProgress {
                category,
                spent,
                limit: Some(limit),
                percent: Some(spent / limit * 100.0),
                over_budget: spent > limit,
            }
        } else {
            BudgetProgress {
                category,
                spent,
                limit: None,
                percent: None,
                over_budget: false,
            }
        }
    }

    /// Progress for every expense category, in declaration order.
    pub fn budget_overview(budgets: &BudgetMap, spending: &CategorySpending) -> Vec<BudgetProgress> {
        Category::expense_categories()
            .map(|category| Self::budget_progress(category, budgets, spending))
            .collect()
    }

    /// Non-zero expense totals in declaration order, suitable for a chart.
    pub fn expense_breakdown(spending: &CategorySpending) -> Vec<(Category, f64)> {
        Category::expense_categories()
            .filter_map(|category| {
                let amount = spending.get(&category).copied().unwrap_or(0.0);
                (amount > 0.0).then_some((category, amount))
            })
            .collect()
    }

    /// The first `count` entries of the collection.
    pub fn recent(transactions: &[Transaction], count: usize) -> &[Transaction] {
        &transactions[..count.min(transactions.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn txn(amount: f64, category: Category, note: &str) -> Transaction {
        Transaction::new(
            amount,
            category,
            note,
            Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        )
    }

    fn sample() -> Vec<Transaction> {
        vec![
            txn(100.0, Category::Income, "Paycheck"),
            txn(30.0, Category::Food, "Groceries"),
            txn(20.0, Category::Food, "Pizza night"),
        ]
    }

    #[test]
    fn balance_and_spending_for_sample() {
        let txns = sample();
        assert_eq!(SummaryService::total_balance(&txns), 50.0);
        let spending = SummaryService::category_spending(&txns);
        assert_eq!(spending.get(&Category::Food), Some(&50.0));
        assert_eq!(spending.len(), 1);
    }

    #[test]
    fn balance_is_order_independent() {
        let mut txns = sample();
        let forward = SummaryService::total_balance(&txns);
        txns.reverse();
        assert_eq!(SummaryService::total_balance(&txns), forward);
    }

    #[test]
    fn empty_list_has_zero_balance_and_no_spending() {
        let balance = SummaryService::total_balance(&[]);
        assert_eq!(balance, 0.0);
        assert!(balance.is_sign_positive());
        assert!(SummaryService::category_spending(&[]).is_empty());
    }

    #[test]
    fn income_never_counts_as_spending() {
        let spending = SummaryService::category_spending(&sample());
        assert!(!spending.contains_key(&Category::Income));
    }

    #[test]
    fn blank_query_returns_everything_in_order() {
        let txns = sample();
        let all = SummaryService::filtered_history(&txns, "   ");
        let ids: Vec<_> = all.iter().map(|t| t.id.as_str()).collect();
        let expected: Vec<_> = txns.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn query_matches_note_or_category_case_insensitively() {
        let txns = sample();
        let by_note = SummaryService::filtered_history(&txns, "PIZZA");
        assert_eq!(by_note.len(), 1);
        let by_category = SummaryService::filtered_history(&txns, "drink");
        assert_eq!(by_category.len(), 2);
        let none = SummaryService::filtered_history(&txns, "rent");
        assert!(none.is_empty());
    }

    #[test]
    fn progress_without_goal_is_not_applicable() {
        let spending = SummaryService::category_spending(&sample());
        let progress =
            SummaryService::budget_progress(Category::Food, &BudgetMap::new(), &spending);
        assert_eq!(progress.limit, None);
        assert_eq!(progress.percent, None);
        assert!(!progress.over_budget);
        assert_eq!(progress.spent, 50.0);
        assert_eq!(progress.display_percent(), 0.0);
    }

    #[test]
    fn progress_reports_percent_and_overage() {
        let spending = SummaryService::category_spending(&sample());
        let mut budgets = BudgetMap::new();
        budgets.set_limit(Category::Food, 40.0);
        let progress = SummaryService::budget_progress(Category::Food, &budgets, &spending);
        assert_eq!(progress.percent, Some(125.0));
        assert!(progress.over_budget);
        assert_eq!(progress.display_percent(), 100.0);

        budgets.set_limit(Category::Food, 50.0);
        let exact = SummaryService::budget_progress(Category::Food, &budgets, &spending);
        assert!(!exact.over_budget);
        assert_eq!(exact.percent, Some(100.0));
    }

    #[test]
    fn overview_covers_expense_categories() {
        let overview = SummaryService::budget_overview(&BudgetMap::new(), &CategorySpending::new());
        assert_eq!(overview.len(), 7);
        assert_eq!(overview[0].category, Category::Food);
    }

    #[test]
    fn breakdown_skips_empty_categories() {
        let mut txns = sample();
        txns.push(txn(12.0, Category::Transport, "Bus"));
        let breakdown =
            SummaryService::expense_breakdown(&SummaryService::category_spending(&txns));
        assert_eq!(
            breakdown,
            vec![(Category::Food, 50.0), (Category::Transport, 12.0)]
        );
    }

    #[test]
    fn recent_truncates() {
        let txns = sample();
        assert_eq!(SummaryService::recent(&txns, 2).len(), 2);
        assert_eq!(SummaryService::recent(&txns, 8).len(), 3);
    }
}
