use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use std::path::PathBuf;

// --- Declare modules ---
pub mod analytics;
pub mod api;
pub mod config;
pub mod filter;
pub mod models;
pub mod store;

// --- Expose public types ---
pub use analytics::{MonthKey, TypeSlice};
pub use api::{ApiClient, ApiError, HttpTransport, Method, Transport};
pub use config::{get_config_path as get_config_path_util, Config, ConfigError};
pub use filter::{DurationBucket, FilterCriteria};
pub use models::{WorkoutRecord, WorkoutRow};
pub use store::{Store, StoreError};

/// Reads the canonical row out of a create/update response. The server
/// sends the row as the response body itself; a `workout` wrapper object is
/// tolerated too. Returns `None` for an empty or unreadable body.
fn record_from_response(body: &Value) -> Option<WorkoutRecord> {
    let row = match body.get("workout") {
        Some(wrapped) => wrapped.clone(),
        None => body.clone(),
    };
    serde_json::from_value::<WorkoutRow>(row)
        .ok()
        .map(WorkoutRecord::from_row)
}

/// Fields of a workout being created.
#[derive(Default, Clone)]
pub struct NewWorkout<'a> {
    pub name: &'a str,
    pub workout_type: &'a str,
    pub exercise: &'a str,
    pub sets: i64,
    pub reps: i64,
}

/// An in-progress edit of one workout. Created by `begin_edit`, mutated
/// through `edit_draft_mut`, and either committed by `save_edit` or
/// discarded by `cancel_edit`. The store is untouched until the commit
/// succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct EditDraft {
    pub id: i64,
    pub name: String,
    pub workout_type: String,
    pub exercise: String,
    pub sets: i64,
    pub reps: i64,
}

/// Main application service. Holds configuration, the workout store, the
/// API client (absent in offline mode), and the current edit session.
pub struct WorkoutApp<T: Transport> {
    pub config: Config,
    pub store: Store,
    client: Option<ApiClient<T>>,
    edit_session: Option<EditDraft>,
    config_path: PathBuf,
}

impl WorkoutApp<HttpTransport> {
    /// Initializes the application: loads config and, depending on the
    /// offline flag, either opens the local store file or builds an HTTP
    /// client carrying any previously saved session token.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded or the offline store
    /// file cannot be read.
    pub fn initialize() -> Result<Self> {
        let config_path =
            config::get_config_path().context("Failed to determine config file path")?;
        let app_config = config::load(&config_path)
            .context(format!("Failed to load config from {config_path:?}"))?;

        if app_config.offline {
            let store_path =
                config::get_store_path().context("Failed to determine store file path")?;
            let store = Store::with_persistence(store_path)
                .context("Failed to open local workout store")?;
            info!("Running in offline mode, {} workouts loaded", store.len());
            return Ok(Self {
                config: app_config,
                store,
                client: None,
                edit_session: None,
                config_path,
            });
        }

        let session_path =
            config::get_session_path().context("Failed to determine session file path")?;
        let token = match config::load_token(&session_path) {
            Ok(token) => token,
            Err(err) => {
                warn!("Ignoring unreadable session file: {err}");
                None
            }
        };
        let transport = HttpTransport::new(&app_config.api_base_url)
            .context("Failed to build HTTP client")?;
        let client = ApiClient::new(transport, token, Some(session_path));

        Ok(Self {
            config: app_config,
            store: Store::in_memory(),
            client: Some(client),
            edit_session: None,
            config_path,
        })
    }
}

impl<T: Transport> WorkoutApp<T> {
    /// Builds an online service around an existing client. Used by tests to
    /// inject a scripted transport.
    pub fn with_client(config: Config, client: ApiClient<T>) -> Self {
        Self {
            config,
            store: Store::in_memory(),
            client: Some(client),
            edit_session: None,
            config_path: PathBuf::new(),
        }
    }

    /// Builds an offline service around an existing store.
    pub fn offline_with_store(config: Config, store: Store) -> Self {
        Self {
            config,
            store,
            client: None,
            edit_session: None,
            config_path: PathBuf::new(),
        }
    }

    pub fn get_config_path(&self) -> &std::path::Path {
        &self.config_path
    }

    pub fn is_offline(&self) -> bool {
        self.client.is_none()
    }

    pub fn is_logged_in(&self) -> bool {
        self.client.as_ref().is_some_and(ApiClient::has_token)
    }

    fn client_mut(&mut self) -> Result<&mut ApiClient<T>> {
        match self.client.as_mut() {
            Some(client) => Ok(client),
            None => bail!("Not available in offline mode"),
        }
    }

    // --- Auth ---

    /// Logs in with email and password, storing the returned access token.
    ///
    /// # Errors
    ///
    /// Returns an error on empty credentials, a rejected login, or a
    /// response with no token.
    pub fn login(&mut self, email: &str, password: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            bail!("Email and password cannot be empty");
        }
        let client = self.client_mut()?;
        let response = client.request_no_retry(
            Method::Post,
            "/auth/login",
            Some(json!({ "email": email, "password": password })),
        )?;
        if !response.ok() {
            bail!("Login failed: {}", response.error_message());
        }
        let body = response.json();
        let token = body
            .get("token")
            .or_else(|| body.get("accessToken"))
            .and_then(Value::as_str)
            .map(String::from);
        match token {
            Some(token) => {
                client
                    .store_token(&token)
                    .context("Failed to save session token")?;
                info!("Logged in as {email}");
                Ok(())
            }
            None => bail!("Login response did not include a token"),
        }
    }

    /// Creates an account and stores the returned access token.
    ///
    /// # Errors
    ///
    /// Returns an error on empty credentials or a rejected signup.
    pub fn signup(&mut self, email: &str, password: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            bail!("Email and password cannot be empty");
        }
        let client = self.client_mut()?;
        let response = client.request_no_retry(
            Method::Post,
            "/auth/signup",
            Some(json!({ "email": email, "password": password })),
        )?;
        if !response.ok() {
            bail!("Signup failed: {}", response.error_message());
        }
        let body = response.json();
        if let Some(token) = body
            .get("token")
            .or_else(|| body.get("accessToken"))
            .and_then(Value::as_str)
        {
            client
                .store_token(token)
                .context("Failed to save session token")?;
        }
        info!("Account created for {email}");
        Ok(())
    }

    /// Logs out: tells the server to revoke the refresh credential, then
    /// clears the local session either way.
    pub fn logout(&mut self) -> Result<()> {
        let client = self.client_mut()?;
        if let Err(err) = client.request(Method::Post, "/auth/logout", None) {
            warn!("Logout request failed, clearing local session anyway: {err}");
        }
        client.clear_session();
        self.store.replace_all(Vec::new());
        self.edit_session = None;
        Ok(())
    }

    // --- Fetching ---

    /// Fetches the workout list from the server, replacing the store's
    /// contents. A no-op in offline mode.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::SessionExpired` (and clears the saved session)
    /// when the server still answers 401 after the refresh attempt.
    pub fn fetch_workouts(&mut self) -> Result<()> {
        if self.is_offline() {
            return Ok(());
        }
        let client = self.client_mut()?;
        let response = client.request(Method::Get, "/workouts", None)?;
        if response.status == 401 {
            client.clear_session();
            bail!(ApiError::SessionExpired);
        }
        if !response.ok() {
            bail!("Failed to fetch workouts: {}", response.error_message());
        }
        let body = response.json();
        let mut records = Vec::new();
        if let Some(rows) = body.get("workouts").and_then(Value::as_array) {
            // Rows are mapped individually so one bad row does not throw
            // away the rest of the list.
            for row in rows {
                match serde_json::from_value::<WorkoutRow>(row.clone()) {
                    Ok(row) => records.push(WorkoutRecord::from_row(row)),
                    Err(err) => warn!("Skipping unreadable workout row: {err}"),
                }
            }
        }
        self.store.replace_all(records);
        Ok(())
    }

    // --- Creation ---

    /// Adds a workout. Online, the store is only touched once the server
    /// confirms the creation; offline, the entry is assigned a local id and
    /// persisted immediately.
    ///
    /// # Errors
    ///
    /// Returns an error on empty fields or a rejected request; the store is
    /// left untouched in that case.
    pub fn add_workout(&mut self, params: NewWorkout) -> Result<i64> {
        let name = params.name.trim();
        let workout_type = params.workout_type.trim();
        let exercise = params.exercise.trim();
        if name.is_empty() || workout_type.is_empty() || exercise.is_empty() {
            bail!("Name, type and exercise are required");
        }

        let record = WorkoutRecord {
            id: 0,
            name: name.to_string(),
            workout_type: models::capitalize(workout_type),
            exercise: exercise.to_string(),
            sets: params.sets,
            reps: params.reps,
            created_at_ts: Utc::now(),
            favorite: false,
            muscle_group: None,
            duration_minutes: None,
            difficulty: None,
        };

        if self.is_offline() {
            let mut record = record;
            record.id = Utc::now().timestamp_millis();
            let id = record.id;
            self.store.prepend(record);
            self.store
                .persist()
                .context("Failed to save local workout store")?;
            return Ok(id);
        }

        let payload = serde_json::to_value(record.to_payload())?;
        let client = self.client_mut()?;
        let response = client.request(Method::Post, "/workouts", Some(payload))?;
        if !response.ok() {
            error!("Workout creation rejected: {}", response.error_message());
            bail!("Failed to add workout: {}", response.error_message());
        }
        // The server's row carries the assigned id; only an empty body
        // leaves the locally built record in place.
        let created = record_from_response(&response.json()).unwrap_or(record);
        let id = created.id;
        self.store.prepend(created);
        Ok(id)
    }

    // --- Edit session ---

    /// Opens an edit session for the given workout, seeding the draft from
    /// the stored record. Replaces any session already open.
    ///
    /// # Errors
    ///
    /// Returns an error when no workout with that id exists.
    pub fn begin_edit(&mut self, id: i64) -> Result<()> {
        let record = match self.store.get(id) {
            Some(record) => record,
            None => bail!("No workout with id {id}"),
        };
        self.edit_session = Some(EditDraft {
            id,
            name: record.name.clone(),
            workout_type: record.workout_type.clone(),
            exercise: record.exercise.clone(),
            sets: record.sets,
            reps: record.reps,
        });
        Ok(())
    }

    pub fn edit_draft(&self) -> Option<&EditDraft> {
        self.edit_session.as_ref()
    }

    pub fn edit_draft_mut(&mut self) -> Option<&mut EditDraft> {
        self.edit_session.as_mut()
    }

    pub fn cancel_edit(&mut self) {
        self.edit_session = None;
    }

    /// Commits the open edit session. The store is only updated once the
    /// server accepts the change; on failure the session stays open with
    /// the user's draft intact.
    ///
    /// # Errors
    ///
    /// Returns an error when no session is open, fields are empty, or the
    /// request fails.
    pub fn save_edit(&mut self) -> Result<()> {
        let draft = match &self.edit_session {
            Some(draft) => draft.clone(),
            None => bail!("No edit in progress"),
        };
        if draft.name.trim().is_empty()
            || draft.workout_type.trim().is_empty()
            || draft.exercise.trim().is_empty()
        {
            bail!("Name, type and exercise are required");
        }
        let existing = match self.store.get(draft.id) {
            Some(record) => record.clone(),
            None => bail!("No workout with id {}", draft.id),
        };
        let updated = WorkoutRecord {
            name: draft.name.trim().to_string(),
            workout_type: models::capitalize(draft.workout_type.trim()),
            exercise: draft.exercise.trim().to_string(),
            sets: draft.sets,
            reps: draft.reps,
            ..existing
        };

        if self.is_offline() {
            self.store.replace(updated);
            self.store
                .persist()
                .context("Failed to save local workout store")?;
            self.edit_session = None;
            return Ok(());
        }

        let payload = serde_json::to_value(updated.to_payload())?;
        let client = self.client_mut()?;
        let path = format!("/workouts/{}", draft.id);
        let response = client.request(Method::Patch, &path, Some(payload))?;
        if !response.ok() {
            error!("Workout update rejected: {}", response.error_message());
            bail!("Failed to save workout: {}", response.error_message());
        }
        let committed = record_from_response(&response.json()).unwrap_or(updated);
        self.store.replace(committed);
        self.edit_session = None;
        Ok(())
    }

    // --- Optimistic mutations ---

    /// Flips a workout's favorite flag. The store is updated immediately;
    /// if the server rejects the change, that one flag is flipped back.
    ///
    /// # Errors
    ///
    /// Returns an error when no such workout exists or the request fails
    /// (after the rollback has been applied).
    pub fn toggle_favorite(&mut self, id: i64) -> Result<()> {
        let current = match self.store.get(id) {
            Some(record) => record.favorite,
            None => bail!("No workout with id {id}"),
        };
        let next = !current;

        let Some(client) = self.client.as_mut() else {
            self.store.update(id, |w| w.favorite = next);
            self.store
                .persist()
                .context("Failed to save local workout store")?;
            return Ok(());
        };
        let path = format!("/workouts/{id}/favorite");
        store::mutate_optimistic(
            &mut self.store,
            |store| {
                store.update(id, |w| w.favorite = next);
            },
            |store| {
                store.update(id, |w| w.favorite = current);
            },
            || client.request(Method::Patch, &path, Some(json!({ "isFavorite": next }))),
        )
        .map_err(|err| {
            error!("Favorite toggle for workout {id} failed: {err}");
            err
        })?;
        Ok(())
    }

    /// Deletes a workout. The record disappears from the store immediately;
    /// a rejected request restores the store to its pre-delete snapshot. An
    /// edit session open on the deleted workout is closed first.
    ///
    /// # Errors
    ///
    /// Returns an error when no such workout exists or the request fails
    /// (after the snapshot has been restored).
    pub fn delete_workout(&mut self, id: i64) -> Result<()> {
        if self.store.get(id).is_none() {
            bail!("No workout with id {id}");
        }
        if self.edit_session.as_ref().is_some_and(|d| d.id == id) {
            self.edit_session = None;
        }

        let Some(client) = self.client.as_mut() else {
            self.store.remove(id);
            self.store
                .persist()
                .context("Failed to save local workout store")?;
            return Ok(());
        };
        let snapshot = self.store.snapshot();
        let path = format!("/workouts/{id}");
        store::mutate_optimistic(
            &mut self.store,
            |store| {
                store.remove(id);
            },
            |store| store.restore(snapshot),
            || client.request(Method::Delete, &path, None),
        )
        .map_err(|err| {
            error!("Deletion of workout {id} failed: {err}");
            err
        })?;
        Ok(())
    }

    // --- Projections ---

    /// The list view: all workouts passing the given criteria.
    pub fn visible_workouts(&self, criteria: &FilterCriteria) -> Vec<&WorkoutRecord> {
        criteria.apply(self.store.records())
    }

    /// The favorites view: text-filtered favorites only.
    pub fn favorite_workouts(&self, query: &str) -> Vec<&WorkoutRecord> {
        filter::favorites(self.store.records(), query)
    }

    // --- Analytics ---

    /// Workouts per month for a calendar year.
    pub fn monthly_counts_for_year(&self, year: i32) -> Vec<(MonthKey, usize)> {
        let months = analytics::calendar_year_months(year);
        analytics::monthly_counts(self.store.records(), &months)
    }

    /// Workouts per month over the trailing twelve months.
    pub fn monthly_counts_rolling(&self, today: DateTime<Utc>) -> Vec<(MonthKey, usize)> {
        let months = analytics::rolling_months(today, 12);
        analytics::monthly_counts(self.store.records(), &months)
    }

    /// Count and percentage per workout type, plus the overall total.
    pub fn type_breakdown(&self) -> (Vec<TypeSlice>, usize) {
        analytics::type_breakdown(self.store.records())
    }
}
