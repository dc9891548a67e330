//src/main.rs
mod cli; // Keep cli module for parsing args

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Utc};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use std::io::{stdin, stdout, Write};
use tracing_subscriber::{fmt, EnvFilter};

use setlog::{FilterCriteria, HttpTransport, WorkoutApp, WorkoutRecord};

fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("warn".parse()?),
        )
        .init();

    let cli_args = cli::parse_args();

    // Initialize the application service (loads config and session)
    let mut service =
        WorkoutApp::initialize().context("Failed to initialize application service")?;

    match cli_args.command {
        // --- Auth Commands ---
        cli::Commands::Login { email } => {
            let password = prompt_password("Password: ")?;
            service.login(&email, &password)?;
            println!("Logged in as '{}'.", email.trim());
        }
        cli::Commands::Signup { email } => {
            let password = prompt_password("Choose a password: ")?;
            service.signup(&email, &password)?;
            println!("Account created for '{}'.", email.trim());
        }
        cli::Commands::Logout => {
            service.logout()?;
            println!("Logged out.");
        }

        // --- Workout Entry Commands ---
        cli::Commands::List {
            query,
            favorites,
            muscles,
            types,
            durations,
            difficulties,
        } => {
            hydrate(&mut service)?;
            let query = query.unwrap_or_default();
            let total = service.store.len();
            if favorites {
                let visible = service.favorite_workouts(&query);
                println!("Showing {} of {} workouts (favorites)", visible.len(), total);
                print_workout_table(&visible);
            } else {
                let criteria = FilterCriteria {
                    query,
                    muscle_groups: muscles,
                    types,
                    durations: durations.into_iter().map(Into::into).collect(),
                    difficulties,
                };
                let visible = service.visible_workouts(&criteria);
                println!("Showing {} of {} workouts", visible.len(), total);
                print_workout_table(&visible);
            }
        }
        cli::Commands::Add {
            name,
            workout_type,
            exercise,
            sets,
            reps,
        } => {
            let params = setlog::NewWorkout {
                name: &name,
                workout_type: &workout_type,
                exercise: &exercise,
                sets,
                reps,
            };
            match service.add_workout(params) {
                Ok(id) => println!("Successfully added workout '{}' ID: {}", name.trim(), id),
                Err(e) => bail!("Error adding workout: {}", e),
            }
        }
        cli::Commands::Edit {
            id,
            name,
            workout_type,
            exercise,
            sets,
            reps,
        } => {
            hydrate(&mut service)?;
            service.begin_edit(id)?;
            if let Some(draft) = service.edit_draft_mut() {
                if let Some(name) = name {
                    draft.name = name;
                }
                if let Some(workout_type) = workout_type {
                    draft.workout_type = workout_type;
                }
                if let Some(exercise) = exercise {
                    draft.exercise = exercise;
                }
                if let Some(sets) = sets {
                    draft.sets = sets;
                }
                if let Some(reps) = reps {
                    draft.reps = reps;
                }
            }
            match service.save_edit() {
                Ok(()) => println!("Successfully updated workout ID: {id}"),
                Err(e) => bail!("Error editing workout {}: {}", id, e),
            }
        }
        cli::Commands::Favorite { id } => {
            hydrate(&mut service)?;
            service.toggle_favorite(id)?;
            let state = service
                .store
                .get(id)
                .map_or("unknown", |w| if w.favorite { "on" } else { "off" });
            println!("Favorite for workout {id} is now {state}.");
        }
        cli::Commands::Delete { id } => {
            hydrate(&mut service)?;
            service.delete_workout(id)?;
            println!("Successfully deleted workout ID: {id}");
        }

        // --- Stats Commands ---
        cli::Commands::Stats { year, rolling } => {
            hydrate(&mut service)?;
            let counts = if rolling {
                service.monthly_counts_rolling(Utc::now())
            } else {
                let year = year.unwrap_or_else(|| Utc::now().year());
                service.monthly_counts_for_year(year)
            };
            print_monthly_table(&counts);
            let (slices, total) = service.type_breakdown();
            print_type_table(&slices, total);
        }
        cli::Commands::ConfigPath => {
            let path =
                setlog::get_config_path_util().context("Failed to determine config path")?;
            println!("Config file is located at: {path:?}");
        }
    }

    Ok(())
}

/// Pulls the workout list from the server before commands that read or
/// mutate it. Offline mode already has the store loaded from disk.
fn hydrate(service: &mut WorkoutApp<HttpTransport>) -> Result<()> {
    if service.is_offline() {
        return Ok(());
    }
    if !service.is_logged_in() {
        bail!("Not logged in. Run 'setlog login <email>' first.");
    }
    service
        .fetch_workouts()
        .context("Failed to fetch workouts from the server")
}

fn prompt_password(prompt: &str) -> Result<String> {
    print!("{prompt}");
    stdout().flush()?;
    let mut input = String::new();
    stdin().read_line(&mut input)?;
    let password = input.trim().to_string();
    if password.is_empty() {
        bail!("Password cannot be empty.");
    }
    Ok(password)
}

fn print_workout_table(workouts: &[&WorkoutRecord]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Date").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Type").add_attribute(Attribute::Bold),
            Cell::new("Exercise").add_attribute(Attribute::Bold),
            Cell::new("Sets").add_attribute(Attribute::Bold),
            Cell::new("Reps").add_attribute(Attribute::Bold),
            Cell::new("Fav").add_attribute(Attribute::Bold),
        ]);

    for workout in workouts {
        table.add_row(vec![
            Cell::new(workout.id.to_string()),
            Cell::new(workout.created_at_ts.format("%Y-%m-%d").to_string()),
            Cell::new(&workout.name),
            Cell::new(&workout.workout_type),
            Cell::new(&workout.exercise),
            Cell::new(workout.sets.to_string()),
            Cell::new(workout.reps.to_string()),
            if workout.favorite {
                Cell::new("*").fg(Color::Yellow)
            } else {
                Cell::new("")
            },
        ]);
    }
    println!("{table}");
}

fn print_monthly_table(counts: &[(setlog::MonthKey, usize)]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Month").add_attribute(Attribute::Bold),
            Cell::new("Workouts").add_attribute(Attribute::Bold),
        ]);
    for (month, count) in counts {
        table.add_row(vec![
            Cell::new(format!("{} {}", month.label(), month.year)),
            Cell::new(count.to_string()),
        ]);
    }
    println!("{table}");
}

fn print_type_table(slices: &[setlog::TypeSlice], total: usize) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Type").add_attribute(Attribute::Bold),
            Cell::new("Count").add_attribute(Attribute::Bold),
            Cell::new("Share").add_attribute(Attribute::Bold),
        ]);
    for slice in slices {
        table.add_row(vec![
            Cell::new(slice.label),
            Cell::new(slice.count.to_string()),
            Cell::new(format!("{}%", slice.percent)),
        ]);
    }
    println!("{table}");
    println!("Total workouts: {total}");
}
