mod common;

use chrono::{Duration, TimeZone, Utc};
use common::at;
use ibudget_core::ledger::{advance, materialize_due, Category, Frequency, RecurringRule};

#[test]
fn monthly_rule_catches_up_one_entry_per_period() {
    let mut rules = vec![RecurringRule::new(
        9.99,
        Category::Entertainment,
        "Streaming",
        Frequency::Monthly,
        at(2024, 1, 15),
    )];

    let outcome = materialize_due(at(2024, 4, 20), &mut rules);

    let dates: Vec<_> = outcome.transactions.iter().map(|t| t.date).collect();
    assert_eq!(dates, vec![at(2024, 2, 15), at(2024, 3, 15), at(2024, 4, 15)]);
    assert_eq!(rules[0].last_processed_date, at(2024, 4, 15));
    assert_eq!(outcome.rules_advanced, 1);
    assert!(outcome.transactions.iter().all(|t| t.amount == 9.99 && t.is_recurring));
}

#[test]
fn second_pass_at_same_instant_emits_nothing() {
    let mut rules = vec![RecurringRule::new(
        3.0,
        Category::Food,
        "Coffee",
        Frequency::Daily,
        at(2024, 3, 1),
    )];
    let now = at(2024, 3, 8);
    assert_eq!(materialize_due(now, &mut rules).transactions.len(), 7);
    assert!(materialize_due(now, &mut rules).is_empty());
}

#[test]
fn boundary_equal_to_now_is_emitted() {
    let mut rules = vec![RecurringRule::new(
        50.0,
        Category::Utilities,
        "Phone",
        Frequency::Weekly,
        at(2024, 6, 1),
    )];
    let outcome = materialize_due(at(2024, 6, 8), &mut rules);
    assert_eq!(outcome.transactions.len(), 1);

    let just_before = at(2024, 6, 15) - Duration::seconds(1);
    assert!(materialize_due(just_before, &mut rules).is_empty());
}

#[test]
fn end_of_month_clamps_and_keeps_clamped_day() {
    let jan31 = at(2024, 1, 31);
    let feb = advance(jan31, Frequency::Monthly);
    assert_eq!(feb, at(2024, 2, 29));
    assert_eq!(advance(feb, Frequency::Monthly), at(2024, 3, 29));
    assert_eq!(advance(at(2023, 1, 31), Frequency::Monthly), at(2023, 2, 28));
}

#[test]
fn time_of_day_is_preserved() {
    let start = Utc.with_ymd_and_hms(2024, 5, 10, 18, 45, 12).unwrap();
    assert_eq!(
        advance(start, Frequency::Weekly),
        Utc.with_ymd_and_hms(2024, 5, 17, 18, 45, 12).unwrap()
    );
}

#[test]
fn generated_ids_are_stable_per_occurrence() {
    let rule = RecurringRule::new(1.0, Category::Other, "x", Frequency::Daily, at(2024, 1, 1));
    let first = rule.instance_at(at(2024, 1, 2));
    let again = rule.instance_at(at(2024, 1, 2));
    assert_eq!(first.id, again.id);
    assert_eq!(first.id, format!("rec-gen-{}-{}", rule.id, at(2024, 1, 2).timestamp_millis()));
    assert_eq!(first.note, "[Auto] x");
}

#[test]
fn output_is_ordered_oldest_first_across_rules() {
    let mut rules = vec![
        RecurringRule::new(10.0, Category::Housing, "Weekly", Frequency::Weekly, at(2024, 1, 1)),
        RecurringRule::new(2.0, Category::Food, "Daily", Frequency::Daily, at(2024, 1, 5)),
    ];
    let outcome = materialize_due(at(2024, 1, 9), &mut rules);
    let dates: Vec<_> = outcome.transactions.iter().map(|t| t.date).collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);
    assert_eq!(outcome.rules_advanced, 2);
}
