//! Command-line host for the work-items core.
//!
//! # Responsibility
//! - Resolve configuration, start logging, restore the saved tree.
//! - Run one command against the store; autosave persists the result.
//! - Print the tree with labels and status badges.

mod cli;

use clap::Parser;
use cli::{Cli, Command};
use log::{error, info, warn};
use std::process::ExitCode;
use workitems_core::db::open_db;
use workitems_core::{
    attach_autosave, init_logging, item_label, restore_store, CommandService, CoreConfig,
    DeleteOutcome, SqliteSnapshotRepository, TreeProjection, WorkItemStore,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command.unwrap_or(Command::Tree)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), String> {
    let config = CoreConfig::global().map_err(|err| err.to_string())?;
    let log_dir = config.log_dir();
    init_logging(config.log_level, &log_dir.to_string_lossy())?;

    let mut store = open_store(config)?;
    let name = command.name();
    let result = dispatch(&mut store, command);
    if let Err(message) = &result {
        error!("event=cli_command module=cli status=error command={name} error={message}");
    }
    result
}

/// Restores the saved tree and attaches autosave to a fresh store.
fn open_store(config: &CoreConfig) -> Result<WorkItemStore, String> {
    let repo = || {
        open_db(&config.db_path)
            .map_err(|err| err.to_string())
            .and_then(|conn| {
                SqliteSnapshotRepository::try_new(conn, config.workspace_key.as_str())
                    .map_err(|err| err.to_string())
            })
    };

    let mut store = WorkItemStore::new();
    let outcome = restore_store(&mut store, &repo()?).map_err(|err| err.to_string())?;
    info!(
        "event=cli_start module=cli status=ok restore={} items={} workspace={}",
        outcome,
        store.len(),
        config.workspace_key
    );
    attach_autosave(&mut store, repo()?);
    Ok(store)
}

fn dispatch(store: &mut WorkItemStore, command: Command) -> Result<(), String> {
    let mut commands = CommandService::new(store);
    match command {
        Command::Tree => {}
        Command::AddEpic { title } => {
            let id = commands.add_epic(title).map_err(to_message)?;
            println!("{id}");
        }
        Command::AddFeature { epic_id, title } => {
            let id = commands.add_feature(epic_id, title).map_err(to_message)?;
            println!("{id}");
        }
        Command::AddIntent { epic_id, title } => {
            let id = commands
                .add_solution_intent(epic_id, title)
                .map_err(to_message)?;
            println!("{id}");
        }
        Command::AddStory { feature_id, title } => {
            let id = commands.add_story(feature_id, title).map_err(to_message)?;
            println!("{id}");
        }
        Command::GenerateFeatures { epic_id, count } => {
            let ids = commands
                .generate_features(epic_id, count)
                .map_err(to_message)?;
            print_ids(&ids);
        }
        Command::GenerateStories { feature_id, count } => {
            let ids = commands
                .generate_stories(feature_id, count)
                .map_err(to_message)?;
            print_ids(&ids);
        }
        Command::EditTitle { id, title } => {
            commands.edit_title(id, title).map_err(to_message)?;
        }
        Command::Show { id } => {
            println!("{}", commands.show_details(id).map_err(to_message)?);
            return Ok(());
        }
        Command::Delete { id, yes } => {
            let outcome = commands
                .delete_item(id, |item| {
                    yes || confirm(&format!(
                        "Delete {} \"{}\" and everything under it?",
                        item.kind.display_name(),
                        item_label(item)
                    ))
                })
                .map_err(to_message)?;
            match outcome {
                DeleteOutcome::Cancelled => {
                    println!("Deletion cancelled.");
                    return Ok(());
                }
                DeleteOutcome::Deleted { removed } => println!("removed {removed}"),
            }
        }
        Command::Reset { yes } => {
            if !yes && !confirm("Delete every work item?") {
                println!("Reset cancelled.");
                return Ok(());
            }
            store.reset_state();
            return Ok(());
        }
    }

    print_tree(store);
    Ok(())
}

fn print_ids(ids: &[workitems_core::ItemId]) {
    for id in ids {
        println!("{id}");
    }
}

fn print_tree(store: &WorkItemStore) {
    let rows = TreeProjection::new(store).flatten();
    if rows.is_empty() {
        println!("(no work items)");
        return;
    }
    for (depth, node) in rows {
        let badge = node.badge.description();
        let marker = if node.collapsible { "+" } else { "-" };
        let kind = node.kind.display_name();
        if badge.is_empty() {
            println!("{}{marker} [{kind}] {} {}", "  ".repeat(depth), node.label, node.id);
        } else {
            println!(
                "{}{marker} [{kind}] {} ({badge}) {}",
                "  ".repeat(depth),
                node.label,
                node.id
            );
        }
    }
}

/// Asks a yes/no question; any prompt failure counts as "no".
fn confirm(prompt: &str) -> bool {
    match inquire::Confirm::new(prompt).with_default(false).prompt() {
        Ok(answer) => answer,
        Err(err) => {
            warn!("event=cli_confirm module=cli status=error error={err}");
            false
        }
    }
}

fn to_message(err: impl std::fmt::Display) -> String {
    err.to_string()
}
