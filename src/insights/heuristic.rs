use once_cell::sync::Lazy;
use regex::Regex;

use super::CategorizedEntry;
use crate::ledger::Category;

static FIRST_NUMBER: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[0-9]+").ok());

/// Offline reading of a quick-add line: the first run of ASCII digits is the
/// amount (zero when there is none or it overflows), the category is `Other`,
/// and the note is the raw input.
pub fn categorize_locally(text: &str) -> CategorizedEntry {
    let amount = FIRST_NUMBER
        .as_ref()
        .and_then(|pattern| pattern.find(text))
        .and_then(|found| found.as_str().parse::<f64>().ok())
        .filter(|amount| amount.is_finite())
        .unwrap_or(0.0);
    CategorizedEntry {
        amount,
        category: Category::Other,
        note: text.to_string(),
    }
}
