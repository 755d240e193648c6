// ABOUTME: Seeds the exercise catalog with the default set of lifts
// ABOUTME: Inserts nothing when the catalog already has entries, so it is safe to re-run
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

use anyhow::{Context, Result};
use clap::Parser;
use ironlog_server::{
    config::environment::ServerConfig,
    database::{exercises::NewExercise, Database},
    logging,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "seed-catalog")]
#[command(about = "Insert the default exercise catalog into an empty database")]
struct Args {
    /// Database URL, defaults to DATABASE_URL
    #[arg(long)]
    database_url: Option<String>,
}

/// (name, primary muscle, secondary muscles, equipment, description)
const CATALOG: &[(&str, &str, &[&str], &str, &str)] = &[
    (
        "Bench Press",
        "chest",
        &["triceps", "shoulders"],
        "barbell",
        "Press the bar from the chest while lying on a flat bench.",
    ),
    (
        "Squat",
        "quadriceps",
        &["glutes", "hamstrings", "lower back"],
        "barbell",
        "Back squat to at least parallel with the bar on the upper back.",
    ),
    (
        "Deadlift",
        "hamstrings",
        &["glutes", "lower back", "traps"],
        "barbell",
        "Pull the bar from the floor to lockout with a neutral spine.",
    ),
    (
        "Pull-Up",
        "lats",
        &["biceps", "rear delts"],
        "pull-up bar",
        "Pull from a dead hang until the chin clears the bar.",
    ),
    (
        "Overhead Press",
        "shoulders",
        &["triceps", "upper chest"],
        "barbell",
        "Press the bar from the front rack to overhead lockout while standing.",
    ),
    (
        "Barbell Row",
        "upper back",
        &["lats", "biceps", "rear delts"],
        "barbell",
        "Row the bar to the lower ribs with the torso hinged forward.",
    ),
    (
        "Romanian Deadlift",
        "hamstrings",
        &["glutes", "lower back"],
        "barbell",
        "Hinge at the hips with soft knees, lowering the bar along the legs.",
    ),
    (
        "Dumbbell Curl",
        "biceps",
        &["forearms"],
        "dumbbell",
        "Curl the dumbbells with the elbows pinned to the sides.",
    ),
    (
        "Triceps Pushdown",
        "triceps",
        &[],
        "cable",
        "Extend the elbows against a cable attachment.",
    ),
    (
        "Walking Lunge",
        "quadriceps",
        &["glutes", "hamstrings"],
        "dumbbell",
        "Alternate forward lunges while walking.",
    ),
];

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_from_env()?;

    let config = ServerConfig::from_env()?;
    let url = args.database_url.unwrap_or(config.database.url);
    let database = Database::new(&url, config.database.max_connections).await?;

    let existing = database
        .exercises()
        .count()
        .await
        .context("Failed to count catalog entries")?;
    if existing > 0 {
        info!(existing, "Catalog already populated, nothing to seed");
        return Ok(());
    }

    for (name, primary_muscle, secondary_muscles, equipment, description) in CATALOG {
        let entry = NewExercise {
            name: (*name).to_owned(),
            primary_muscle: (*primary_muscle).to_owned(),
            secondary_muscles: secondary_muscles.iter().map(|m| (*m).to_owned()).collect(),
            equipment: (*equipment).to_owned(),
            description: (*description).to_owned(),
        };
        database
            .exercises()
            .create(&entry)
            .await
            .with_context(|| format!("Failed to insert catalog entry {name}"))?;
    }

    info!(inserted = CATALOG.len(), "Exercise catalog seeded");
    Ok(())
}
