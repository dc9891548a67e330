//src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One workout entry as the rest of the application sees it.
///
/// `workout_type` is held in display form (first letter capitalized); the
/// wire format carries it lowercase. The facet attributes at the bottom are
/// not part of the server schema and are only populated by local data, so
/// they stay optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub id: i64,
    pub name: String,
    pub workout_type: String,
    pub exercise: String,
    pub sets: i64,
    pub reps: i64,
    /// Set once when the entry is created, never changed afterwards.
    pub created_at_ts: DateTime<Utc>,
    pub favorite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muscle_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

/// A workout row as the server sends it.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WorkoutRow {
    pub id: i64,
    #[serde(default)]
    pub exercise_name: String,
    #[serde(default)]
    pub exercise_type: String,
    #[serde(default)]
    pub exercise_key: String,
    #[serde(default)]
    pub sets: i64,
    #[serde(default)]
    pub reps: i64,
    #[serde(default)]
    pub performed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    // SQLite-backed servers send 0/1 here, newer ones a real boolean.
    #[serde(default, deserialize_with = "bool_from_int_or_bool")]
    pub is_favorite: bool,
}

/// Body of `POST /workouts` and `PATCH /workouts/:id`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPayload {
    pub exercise_name: String,
    pub exercise_type: String,
    pub exercise_key: String,
    pub sets: i64,
    pub reps: i64,
    pub performed_at: Option<DateTime<Utc>>,
}

fn bool_from_int_or_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_i64().is_some_and(|i| i != 0),
        _ => false,
    })
}

/// Capitalizes the first character, leaving the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

impl WorkoutRecord {
    /// Maps a wire row into the in-memory representation.
    ///
    /// The creation timestamp prefers `performed_at`, then `created_at`, and
    /// only falls back to the current time when the server sent neither.
    pub fn from_row(row: WorkoutRow) -> Self {
        let created_at_ts = row
            .performed_at
            .or(row.created_at)
            .unwrap_or_else(Utc::now);
        Self {
            id: row.id,
            name: row.exercise_name,
            workout_type: capitalize(&row.exercise_type),
            exercise: row.exercise_key,
            sets: row.sets,
            reps: row.reps,
            created_at_ts,
            favorite: row.is_favorite,
            muscle_group: None,
            duration_minutes: None,
            difficulty: None,
        }
    }

    /// Maps the in-memory representation back to a request payload.
    /// The server lowercases `exercise_type` on its side.
    pub fn to_payload(&self) -> WorkoutPayload {
        WorkoutPayload {
            exercise_name: self.name.clone(),
            exercise_type: self.workout_type.clone(),
            exercise_key: self.exercise.clone(),
            sets: self.sets,
            reps: self.reps,
            performed_at: None,
        }
    }
}
