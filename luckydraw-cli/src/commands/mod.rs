use crate::app::App;
use crate::controller::Controller;
use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Table};
use dialoguer::Confirm;
use luckydraw_core::{
    open_history_store, open_winner_store, CsvRecordSource, DrawConfig, RecordSource,
};
use luckydraw_engine::DrawEngine;
use std::path::{Path, PathBuf};

/// Start the full-screen presenter, optionally with a roster already loaded.
pub async fn run_draw(data_dir: &Path, config: &DrawConfig, roster: Option<PathBuf>) -> Result<()> {
    let winners = open_winner_store(data_dir, config).await?;
    let mut engine = DrawEngine::new(winners, config.tick_interval());
    let mut controller = Controller::new();

    if let Some(path) = roster {
        controller
            .load_roster(&CsvRecordSource::new(path), &mut engine)
            .await;
    }

    App::new(engine, controller).run().await
}

pub async fn list_winners(data_dir: &Path, config: &DrawConfig) -> Result<()> {
    let store = open_history_store(data_dir, config).await?;
    let history = store.history().await?;

    if history.is_empty() {
        println!("No winners recorded yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Name", "Identifier", "Won At"]);

    for (n, entry) in history.iter().enumerate() {
        table.add_row(vec![
            (n + 1).to_string(),
            entry.name.clone(),
            entry.identifier.clone().unwrap_or_default(),
            entry
                .won_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        ]);
    }

    println!("{}", table);
    println!("{} winners in total", store.len());
    Ok(())
}

pub async fn reset_winners(data_dir: &Path, config: &DrawConfig, force: bool) -> Result<()> {
    let mut store = open_history_store(data_dir, config).await?;

    if store.is_empty() {
        println!("No winners recorded, nothing to reset.");
        return Ok(());
    }

    if !force {
        let confirm = Confirm::new()
            .with_prompt(format!(
                "Forget all {} recorded winners? They will be eligible again.",
                store.len()
            ))
            .default(false)
            .interact()?;

        if !confirm {
            println!("Reset cancelled.");
            return Ok(());
        }
    }

    store.clear().await?;
    println!("Winner history cleared.");
    Ok(())
}

pub async fn check_roster(data_dir: &Path, config: &DrawConfig, roster: &Path) -> Result<()> {
    let source = CsvRecordSource::new(roster);
    let participants = source.read().await?;
    let store = open_history_store(data_dir, config).await?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Name", "Identifier", "Eligible"]);

    let mut eligible = 0;
    for participant in &participants {
        let won = store.contains(participant.identity());
        if !won {
            eligible += 1;
        }
        table.add_row(vec![
            participant.identity(),
            participant.identifier().unwrap_or(""),
            if won { "already won" } else { "yes" },
        ]);
    }

    println!("{}", table);
    println!(
        "{}: {} participants, {} still eligible",
        source.describe(),
        participants.len(),
        eligible
    );
    Ok(())
}
