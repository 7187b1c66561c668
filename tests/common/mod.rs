#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};
use ibudget_core::{
    core::{BudgetManager, FixedClock},
    storage::JsonStorage,
};
use tempfile::TempDir;

pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// A manager over a fresh data directory. The `TempDir` guard must outlive
/// every manager opened on it.
pub fn setup_test_env(now: DateTime<Utc>) -> (BudgetManager, FixedClock, TempDir) {
    let temp = TempDir::new().expect("create temp dir");
    let clock = FixedClock::new(now);
    let manager = open_on(&data_dir(&temp), &clock);
    (manager, clock, temp)
}

pub fn data_dir(temp: &TempDir) -> PathBuf {
    temp.path().join("data")
}

pub fn open_on(dir: &PathBuf, clock: &FixedClock) -> BudgetManager {
    let storage = JsonStorage::new(Some(dir.clone())).expect("create json storage");
    BudgetManager::open(Box::new(storage), Box::new(clock.clone()))
}
