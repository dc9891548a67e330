// src/cli.rs
use clap::{Parser, Subcommand, ValueEnum};

use setlog::DurationBucket;

#[derive(Parser, Debug)]
#[command(author, version, about = "A CLI client for a workout log service", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DurationBucketCli {
    Under10,
    #[value(name = "10-20")]
    TenToTwenty,
    #[value(name = "20-40")]
    TwentyToForty,
    #[value(name = "40-plus")]
    OverForty,
}

impl From<DurationBucketCli> for DurationBucket {
    fn from(value: DurationBucketCli) -> Self {
        match value {
            DurationBucketCli::Under10 => DurationBucket::Under10,
            DurationBucketCli::TenToTwenty => DurationBucket::TenToTwenty,
            DurationBucketCli::TwentyToForty => DurationBucket::TwentyToForty,
            DurationBucketCli::OverForty => DurationBucket::OverForty,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in to the workout service (prompts for the password)
    Login {
        /// Account email address
        email: String,
    },
    /// Create an account (prompts for the password)
    Signup {
        /// Account email address
        email: String,
    },
    /// Log out and discard the saved session
    Logout,
    /// List workouts, optionally filtered
    List {
        /// Text filter: one character matches name prefixes, more matches
        /// substrings of name, exercise or type
        #[arg(short, long)]
        query: Option<String>,
        /// Show only favorites (facet filters do not apply)
        #[arg(short, long)]
        favorites: bool,
        /// Filter by muscle group (repeatable)
        #[arg(short, long = "muscle")]
        muscles: Vec<String>,
        /// Filter by workout type (repeatable)
        #[arg(short, long = "type")]
        types: Vec<String>,
        /// Filter by duration bucket (repeatable)
        #[arg(short, long = "duration", value_enum)]
        durations: Vec<DurationBucketCli>,
        /// Filter by difficulty (repeatable)
        #[arg(long = "difficulty")]
        difficulties: Vec<String>,
    },
    /// Add a new workout entry
    Add {
        /// Display name of the workout (e.g., "Morning Run")
        #[arg(short, long)]
        name: String,
        /// Workout type (cardio, strength, flexibility, balance)
        #[arg(short = 't', long = "type")]
        workout_type: String,
        /// Exercise key (e.g., "running", "bench-press")
        #[arg(short, long)]
        exercise: String,
        /// Number of sets performed
        #[arg(short, long, value_parser = clap::value_parser!(i64).range(1..=12))]
        sets: i64,
        /// Number of repetitions per set
        #[arg(short, long, value_parser = clap::value_parser!(i64).range(1..=30))]
        reps: i64,
    },
    /// Edit an existing workout entry
    Edit {
        /// ID of the workout to edit
        id: i64,
        /// New display name
        #[arg(short, long)]
        name: Option<String>,
        /// New workout type
        #[arg(short = 't', long = "type")]
        workout_type: Option<String>,
        /// New exercise key
        #[arg(short, long)]
        exercise: Option<String>,
        /// New number of sets
        #[arg(short, long, value_parser = clap::value_parser!(i64).range(1..=12))]
        sets: Option<i64>,
        /// New number of reps
        #[arg(short, long, value_parser = clap::value_parser!(i64).range(1..=30))]
        reps: Option<i64>,
    },
    /// Toggle a workout's favorite flag
    Favorite {
        /// ID of the workout
        id: i64,
    },
    /// Delete a workout entry
    Delete {
        /// ID of the workout to delete
        id: i64,
    },
    /// Show monthly activity and the per-type breakdown
    Stats {
        /// Calendar year to bucket by (defaults to the current year)
        #[arg(short, long, conflicts_with = "rolling")]
        year: Option<i32>,
        /// Use the trailing twelve months instead of a calendar year
        #[arg(long)]
        rolling: bool,
    },
    /// Show the location of the config file
    ConfigPath,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
