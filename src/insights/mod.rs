//! Assistant features backed by a hosted model: categorizing free-text
//! entries and producing short spending tips. Every path has a deterministic
//! fallback, so callers always get a usable value.

pub mod gemini;
pub mod heuristic;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::config::AiSettings;
use crate::ledger::{Category, Transaction};

pub use gemini::GeminiClient;
pub use heuristic::categorize_locally;

pub const EMPTY_HISTORY_INSIGHT: &str = "Add some transactions to see AI insights!";
pub const NO_PROVIDER_INSIGHT: &str =
    "AI insights are unavailable (No API Key)|Check documentation|Manual tracking enabled";
pub const FAILED_INSIGHT: &str =
    "Insights temporarily unavailable|Continue tracking|AI is resting";
pub const BLANK_RESPONSE_INSIGHT: &str = "Track more to see patterns|Keep saving|Stay consistent";
pub const WELCOME_INSIGHT: &str =
    "Welcome to iBudget Pro|Add expenses to start|AI insights will appear here";

const MAX_INSIGHT_ITEMS: usize = 3;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model returned status {0}: {1}")]
    Status(u16, String),
    #[error("malformed model response: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for AiError {
    fn from(err: serde_json::Error) -> Self {
        AiError::Malformed(err.to_string())
    }
}

/// Fields exactly as the model returned them; nothing is trusted yet.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCategorization {
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub note: Option<String>,
}

/// A validated reading of a quick-add line.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorizedEntry {
    pub amount: f64,
    pub category: Category,
    pub note: String,
}

impl CategorizedEntry {
    /// Validates a model answer against the raw input. Unknown categories
    /// become `Other`, a missing note falls back to the input text, and a
    /// missing or unusable amount becomes zero.
    pub fn from_raw(raw: RawCategorization, text: &str) -> Self {
        let amount = raw
            .amount
            .filter(|amount| amount.is_finite() && *amount > 0.0)
            .unwrap_or(0.0);
        let category = raw
            .category
            .as_deref()
            .and_then(Category::from_label)
            .unwrap_or(Category::Other);
        let note = raw
            .note
            .filter(|note| !note.trim().is_empty())
            .unwrap_or_else(|| text.to_string());
        Self {
            amount,
            category,
            note,
        }
    }

    pub fn into_transaction(self, date: DateTime<Utc>) -> Transaction {
        Transaction::new(self.amount, self.category, self.note, date)
    }
}

/// A hosted model able to answer both assistant questions.
pub trait InsightProvider: Send + Sync {
    fn categorize(&self, text: &str) -> Result<RawCategorization, AiError>;

    /// Pipe-delimited tips for the given history. May be blank.
    fn insights(&self, transactions: &[Transaction]) -> Result<String, AiError>;
}

/// Front door for assistant features. Holds an optional provider and applies
/// the fallback policy around it.
pub struct Advisor {
    provider: Option<Box<dyn InsightProvider>>,
}

impl Advisor {
    pub fn new(provider: Box<dyn InsightProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// An advisor that never calls out.
    pub fn offline() -> Self {
        Self { provider: None }
    }

    /// Connects to the configured model when enabled and a key is present.
    pub fn from_settings(settings: &AiSettings) -> Self {
        if !settings.enabled {
            tracing::info!("assistant disabled in configuration");
            return Self::offline();
        }
        match GeminiClient::from_settings(settings) {
            Ok(Some(client)) => Self::new(Box::new(client)),
            Ok(None) => {
                tracing::warn!(
                    env = %settings.api_key_env,
                    "API key is missing; assistant features will use local fallbacks"
                );
                Self::offline()
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to build assistant client; using local fallbacks");
                Self::offline()
            }
        }
    }

    pub fn is_online(&self) -> bool {
        self.provider.is_some()
    }

    /// Never fails: no provider, a backend error, or a malformed answer all
    /// fall back to [`categorize_locally`].
    pub fn categorize_from_text(&self, text: &str) -> CategorizedEntry {
        let Some(provider) = self.provider.as_ref() else {
            return categorize_locally(text);
        };
        match provider.categorize(text) {
            Ok(raw) => CategorizedEntry::from_raw(raw, text),
            Err(err) => {
                tracing::warn!(error = %err, "categorization failed; using local heuristic");
                categorize_locally(text)
            }
        }
    }

    /// Pipe-delimited tips. Empty history short-circuits without calling out.
    pub fn insights(&self, transactions: &[Transaction]) -> String {
        if transactions.is_empty() {
            return EMPTY_HISTORY_INSIGHT.to_string();
        }
        let Some(provider) = self.provider.as_ref() else {
            return NO_PROVIDER_INSIGHT.to_string();
        };
        match provider.insights(transactions) {
            Ok(text) if text.trim().is_empty() => BLANK_RESPONSE_INSIGHT.to_string(),
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "insight request failed");
                FAILED_INSIGHT.to_string()
            }
        }
    }
}

/// Splits a pipe-delimited insight string into at most three trimmed tips.
pub fn insight_items(text: &str) -> Vec<String> {
    text.split('|')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .take(MAX_INSIGHT_ITEMS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Failing;

    impl InsightProvider for Failing {
        fn categorize(&self, _text: &str) -> Result<RawCategorization, AiError> {
            Err(AiError::Status(503, "unavailable".into()))
        }

        fn insights(&self, _transactions: &[Transaction]) -> Result<String, AiError> {
            Err(AiError::Malformed("no candidates".into()))
        }
    }

    struct Canned {
        raw: RawCategorization,
        tips: String,
        calls: Arc<AtomicUsize>,
    }

    impl InsightProvider for Canned {
        fn categorize(&self, _text: &str) -> Result<RawCategorization, AiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.raw.clone())
        }

        fn insights(&self, _transactions: &[Transaction]) -> Result<String, AiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.tips.clone())
        }
    }

    fn canned(raw: RawCategorization, tips: &str) -> (Advisor, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let advisor = Advisor::new(Box::new(Canned {
            raw,
            tips: tips.into(),
            calls: calls.clone(),
        }));
        (advisor, calls)
    }

    fn one_transaction() -> Vec<Transaction> {
        vec![Transaction::new(4.0, Category::Food, "Bagel", Utc::now())]
    }

    #[test]
    fn failing_backend_falls_back_to_heuristic() {
        let advisor = Advisor::new(Box::new(Failing));
        let entry = advisor.categorize_from_text("Coffee 5");
        assert_eq!(
            entry,
            CategorizedEntry {
                amount: 5.0,
                category: Category::Other,
                note: "Coffee 5".into()
            }
        );
    }

    #[test]
    fn offline_advisor_uses_heuristic() {
        let entry = Advisor::offline().categorize_from_text("Rent 1200 June");
        assert_eq!(entry.amount, 1200.0);
        assert_eq!(entry.category, Category::Other);
    }

    #[test]
    fn unknown_model_category_becomes_other() {
        let raw = RawCategorization {
            amount: Some(18.5),
            category: Some("Groceries".into()),
            note: Some("Weekly shop".into()),
        };
        let (advisor, _) = canned(raw, "");
        let entry = advisor.categorize_from_text("weekly shop 18.50");
        assert_eq!(entry.category, Category::Other);
        assert_eq!(entry.amount, 18.5);
        assert_eq!(entry.note, "Weekly shop");
    }

    #[test]
    fn known_model_category_is_kept_and_missing_fields_default() {
        let raw = RawCategorization {
            amount: None,
            category: Some("Transport".into()),
            note: Some("  ".into()),
        };
        let (advisor, _) = canned(raw, "");
        let entry = advisor.categorize_from_text("uber home");
        assert_eq!(entry.category, Category::Transport);
        assert_eq!(entry.amount, 0.0);
        assert_eq!(entry.note, "uber home");
    }

    #[test]
    fn empty_history_never_calls_out() {
        let (advisor, calls) = canned(RawCategorization::default(), "a|b");
        assert_eq!(advisor.insights(&[]), EMPTY_HISTORY_INSIGHT);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn insight_fallbacks() {
        let txns = one_transaction();
        assert_eq!(Advisor::offline().insights(&txns), NO_PROVIDER_INSIGHT);
        assert_eq!(Advisor::new(Box::new(Failing)).insights(&txns), FAILED_INSIGHT);
        let (blank, _) = canned(RawCategorization::default(), "  ");
        assert_eq!(blank.insights(&txns), BLANK_RESPONSE_INSIGHT);
        let (ok, calls) = canned(RawCategorization::default(), "Cook at home|Cancel gym");
        assert_eq!(ok.insights(&txns), "Cook at home|Cancel gym");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn disabled_settings_produce_offline_advisor() {
        let settings = AiSettings {
            enabled: false,
            ..AiSettings::default()
        };
        assert!(!Advisor::from_settings(&settings).is_online());
    }

    #[test]
    fn insight_items_trim_and_cap() {
        assert_eq!(
            insight_items(" Cook more | |Cancel subs|Walk|Extra "),
            vec!["Cook more", "Cancel subs", "Walk"]
        );
        assert_eq!(insight_items(EMPTY_HISTORY_INSIGHT).len(), 1);
        assert!(insight_items("||").is_empty());
    }
}
