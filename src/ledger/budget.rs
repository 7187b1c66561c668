use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::category::Category;

/// Spending limits per category. A category without an entry has an implicit
/// limit of zero, shown to users as "no goal". Income never carries a limit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BudgetMap {
    limits: BTreeMap<Category, f64>,
}

impl BudgetMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit for `category`, zero when unset.
    pub fn limit(&self, category: Category) -> f64 {
        self.limits.get(&category).copied().unwrap_or(0.0)
    }

    pub fn has_goal(&self, category: Category) -> bool {
        self.limit(category) > 0.0
    }

    /// Inserts or overwrites a limit. Negative and non-finite values are
    /// stored as zero. Returns the value actually stored, or `None` when the
    /// category cannot carry a limit.
    pub fn set_limit(&mut self, category: Category, limit: f64) -> Option<f64> {
        if category == Category::Income {
            return None;
        }
        let normalized = normalize_limit(limit);
        self.limits.insert(category, normalized);
        Some(normalized)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.limits.iter().map(|(category, limit)| (*category, *limit))
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }

    /// Drops entries that could not have been written through `set_limit`.
    /// Returns how many entries were touched.
    pub(crate) fn sanitize(&mut self) -> usize {
        let before = self.limits.len();
        self.limits.remove(&Category::Income);
        let mut touched = before - self.limits.len();
        for limit in self.limits.values_mut() {
            let normalized = normalize_limit(*limit);
            if normalized != *limit {
                *limit = normalized;
                touched += 1;
            }
        }
        touched
    }
}

fn normalize_limit(limit: f64) -> f64 {
    if limit.is_finite() && limit > 0.0 {
        limit
    } else {
        0.0
    }
}
