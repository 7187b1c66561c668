use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// How often a recurring rule fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn label(self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" | "d" => Ok(Frequency::Daily),
            "weekly" | "week" | "w" => Ok(Frequency::Weekly),
            "monthly" | "month" | "m" => Ok(Frequency::Monthly),
            other => Err(format!(
                "unknown frequency `{other}` (expected daily, weekly, or monthly)"
            )),
        }
    }
}

/// Moves `from` forward by exactly one period, preserving the time of day.
///
/// * `Daily` adds one calendar day, `Weekly` seven.
/// * `Monthly` keeps the day-of-month; when the target month is shorter the
///   day is clamped to its last valid day (Jan 31 becomes Feb 28 or 29). The
///   clamped day is kept for later advances, so Jan 31 → Feb 29 → Mar 29.
///
/// Calendar arithmetic happens in UTC. Results past the representable range
/// saturate at `DateTime::<Utc>::MAX_UTC`, which is always later than any
/// real `now`, so callers looping on `next <= now` still terminate.
pub fn advance(from: DateTime<Utc>, frequency: Frequency) -> DateTime<Utc> {
    let shifted = match frequency {
        Frequency::Daily => from.checked_add_signed(Duration::days(1)),
        Frequency::Weekly => from.checked_add_signed(Duration::weeks(1)),
        Frequency::Monthly => {
            let naive = from.naive_utc();
            shift_month(naive.date(), 1).map(|date| {
                DateTime::<Utc>::from_naive_utc_and_offset(date.and_time(naive.time()), Utc)
            })
        }
    };
    shifted.unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn shift_month(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let index = date.year() * 12 + date.month0() as i32 + months;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

pub(crate) fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    first_next.pred_opt().map(|last| last.day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap()
    }

    #[test]
    fn daily_and_weekly_add_calendar_days() {
        assert_eq!(advance(utc(2024, 2, 28), Frequency::Daily), utc(2024, 2, 29));
        assert_eq!(advance(utc(2024, 12, 31), Frequency::Daily), utc(2025, 1, 1));
        assert_eq!(advance(utc(2024, 12, 28), Frequency::Weekly), utc(2025, 1, 4));
    }

    #[test]
    fn monthly_keeps_day_of_month() {
        assert_eq!(advance(utc(2024, 1, 15), Frequency::Monthly), utc(2024, 2, 15));
        assert_eq!(advance(utc(2024, 12, 15), Frequency::Monthly), utc(2025, 1, 15));
    }

    #[test]
    fn monthly_clamps_to_end_of_february() {
        assert_eq!(advance(utc(2024, 1, 31), Frequency::Monthly), utc(2024, 2, 29));
        assert_eq!(advance(utc(2023, 1, 31), Frequency::Monthly), utc(2023, 2, 28));
        assert_eq!(advance(utc(2023, 1, 29), Frequency::Monthly), utc(2023, 2, 28));
    }

    #[test]
    fn monthly_clamp_drifts_forward() {
        let feb = advance(utc(2023, 1, 31), Frequency::Monthly);
        assert_eq!(advance(feb, Frequency::Monthly), utc(2023, 3, 28));
        assert_eq!(advance(utc(2024, 3, 31), Frequency::Monthly), utc(2024, 4, 30));
    }

    #[test]
    fn time_of_day_is_preserved() {
        let start = Utc.with_ymd_and_hms(2024, 5, 31, 23, 59, 58).unwrap();
        let next = advance(start, Frequency::Monthly);
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 6, 30, 23, 59, 58).unwrap());
    }

    #[test]
    fn advance_saturates_instead_of_panicking() {
        let end = DateTime::<Utc>::MAX_UTC;
        assert_eq!(advance(end, Frequency::Daily), DateTime::<Utc>::MAX_UTC);
        assert_eq!(advance(end, Frequency::Monthly), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2100, 2), Some(28));
        assert_eq!(days_in_month(2000, 2), Some(29));
        assert_eq!(days_in_month(2024, 12), Some(31));
    }

    #[test]
    fn frequency_parses_and_serializes() {
        assert_eq!("Monthly".parse::<Frequency>(), Ok(Frequency::Monthly));
        assert_eq!("w".parse::<Frequency>(), Ok(Frequency::Weekly));
        assert!("yearly".parse::<Frequency>().is_err());
        assert_eq!(serde_json::to_string(&Frequency::Daily).unwrap(), "\"daily\"");
    }
}
