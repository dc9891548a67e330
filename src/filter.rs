//src/filter.rs
use std::fmt;

use strum_macros::EnumIter;

use crate::models::WorkoutRecord;

/// Duration facet buckets. Boundaries are inclusive on the side the label
/// suggests: a 10-minute workout lands in "10-20 min", a 20-minute one does
/// too, a 21-minute one in "20-40 min".
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum DurationBucket {
    Under10,
    TenToTwenty,
    TwentyToForty,
    OverForty,
}

impl DurationBucket {
    pub fn contains(self, minutes: i64) -> bool {
        match self {
            DurationBucket::Under10 => minutes > 0 && minutes < 10,
            DurationBucket::TenToTwenty => (10..=20).contains(&minutes),
            DurationBucket::TwentyToForty => minutes > 20 && minutes <= 40,
            DurationBucket::OverForty => minutes > 40,
        }
    }
}

impl fmt::Display for DurationBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DurationBucket::Under10 => "Under 10 min",
            DurationBucket::TenToTwenty => "10-20 min",
            DurationBucket::TwentyToForty => "20-40 min",
            DurationBucket::OverForty => "40+ min",
        };
        write!(f, "{label}")
    }
}

/// Everything the list view filters on. All criteria are conjunctive; within
/// one facet the selected values are alternatives.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub query: String,
    pub muscle_groups: Vec<String>,
    pub types: Vec<String>,
    pub durations: Vec<DurationBucket>,
    pub difficulties: Vec<String>,
}

impl FilterCriteria {
    pub fn with_query(query: &str) -> Self {
        Self {
            query: query.to_string(),
            ..Self::default()
        }
    }

    /// Applies the text rule and every facet, preserving input order.
    pub fn apply<'a>(&self, records: &'a [WorkoutRecord]) -> Vec<&'a WorkoutRecord> {
        let query = self.query.trim().to_lowercase();
        records
            .iter()
            .filter(|w| self.matches(w, &query))
            .collect()
    }

    fn matches(&self, workout: &WorkoutRecord, query: &str) -> bool {
        matches_text(workout, query)
            && facet_hit(&self.muscle_groups, workout.muscle_group.as_deref())
            && facet_hit(&self.types, Some(&workout.workout_type))
            && duration_hit(&self.durations, workout.duration_minutes)
            && facet_hit(&self.difficulties, workout.difficulty.as_deref())
    }
}

/// Text matching rule: an empty query matches everything, a single character
/// matches as a prefix of the name, anything longer matches as a substring
/// of name, exercise key, or type. Comparison is case-insensitive.
fn matches_text(workout: &WorkoutRecord, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    if query.chars().count() == 1 {
        return workout.name.to_lowercase().starts_with(query);
    }
    workout.name.to_lowercase().contains(query)
        || workout.exercise.to_lowercase().contains(query)
        || workout.workout_type.to_lowercase().contains(query)
}

/// An empty selection passes everything. Otherwise the record's field must
/// be present and equal (ignoring case) to one of the selected values.
fn facet_hit(selected: &[String], value: Option<&str>) -> bool {
    if selected.is_empty() {
        return true;
    }
    match value {
        Some(value) => selected.iter().any(|s| s.eq_ignore_ascii_case(value)),
        None => false,
    }
}

/// Records without a duration are treated as zero minutes, which no bucket
/// contains, so any duration selection excludes them.
fn duration_hit(selected: &[DurationBucket], minutes: Option<i64>) -> bool {
    if selected.is_empty() {
        return true;
    }
    let minutes = minutes.unwrap_or(0);
    selected.iter().any(|b| b.contains(minutes))
}

/// The favorites view: text-filtered records that are marked favorite.
/// Facets do not apply here.
pub fn favorites<'a>(records: &'a [WorkoutRecord], query: &str) -> Vec<&'a WorkoutRecord> {
    let query = query.trim().to_lowercase();
    records
        .iter()
        .filter(|w| w.favorite && matches_text(w, &query))
        .collect()
}
