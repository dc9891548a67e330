//src/analytics.rs
use chrono::{DateTime, Datelike, Utc};

use crate::models::WorkoutRecord;

pub const TYPE_LABELS: [&str; 4] = ["Cardio", "Strength", "Flexibility", "Balance"];

/// A single month, used as the bucket key for activity counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthKey {
    pub year: i32,
    /// 1-based month number.
    pub month: u32,
}

impl MonthKey {
    pub fn of(ts: DateTime<Utc>) -> Self {
        Self {
            year: ts.year(),
            month: ts.month(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self.month {
            1 => "Jan",
            2 => "Feb",
            3 => "Mar",
            4 => "Apr",
            5 => "May",
            6 => "Jun",
            7 => "Jul",
            8 => "Aug",
            9 => "Sep",
            10 => "Oct",
            11 => "Nov",
            _ => "Dec",
        }
    }
}

/// January through December of the given calendar year.
pub fn calendar_year_months(year: i32) -> Vec<MonthKey> {
    (1..=12).map(|month| MonthKey { year, month }).collect()
}

/// The last `n` months ending at (and including) the month of `today`,
/// oldest first. Crosses year boundaries.
pub fn rolling_months(today: DateTime<Utc>, n: u32) -> Vec<MonthKey> {
    let end = today.year() * 12 + (today.month() as i32 - 1);
    (0..n as i32)
        .rev()
        .map(|back| {
            let total = end - back;
            MonthKey {
                year: total.div_euclid(12),
                month: (total.rem_euclid(12) + 1) as u32,
            }
        })
        .collect()
}

/// Counts workouts per month over the given month window. Records outside
/// the window are ignored; months with no records count zero.
pub fn monthly_counts(records: &[WorkoutRecord], months: &[MonthKey]) -> Vec<(MonthKey, usize)> {
    months
        .iter()
        .map(|&key| {
            let count = records
                .iter()
                .filter(|w| MonthKey::of(w.created_at_ts) == key)
                .count();
            (key, count)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSlice {
    pub label: &'static str,
    pub count: usize,
    /// Integer percentage of the total, rounded to nearest.
    pub percent: u32,
}

/// Per-type counts and percentages over the four known workout types.
/// Records with any other type value still contribute to the total, so the
/// percentages are of all workouts, not of the matched ones.
pub fn type_breakdown(records: &[WorkoutRecord]) -> (Vec<TypeSlice>, usize) {
    let total = records.len();
    let slices = TYPE_LABELS
        .iter()
        .map(|&label| {
            let count = records
                .iter()
                .filter(|w| w.workout_type.trim() == label)
                .count();
            let percent = ((count as f64 / total.max(1) as f64) * 100.0).round() as u32;
            TypeSlice {
                label,
                count,
                percent,
            }
        })
        .collect();
    (slices, total)
}
