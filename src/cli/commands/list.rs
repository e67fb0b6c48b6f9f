//! List command - show the script catalog

use super::workspace::Workspace;
use crate::catalog::{CatalogEntry, TaskGroup};
use crate::cli::args::{ListArgs, OutputFormat};
use crate::config::Settings;
use crate::error::CompanionResult;
use crate::ui::{self, UiContext};
use crate::workspace::RootSnapshot;
use console::style;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Execute the list command
pub async fn execute(args: ListArgs, settings: &Arc<Settings>) -> CompanionResult<()> {
    let workspace = Workspace::open(&args.roots, Arc::clone(settings)).await?;
    workspace.require_single_loaded()?;

    let catalog = workspace.catalog.get_catalog().await;
    let snapshots = workspace.snapshots();

    match args.format {
        OutputFormat::Table => print_table(&catalog, &snapshots),
        OutputFormat::Json => print_json(&catalog)?,
        OutputFormat::Plain => print_plain(&catalog, snapshots.len() > 1),
    }

    Ok(())
}

#[derive(Serialize)]
struct EntryView<'a> {
    root: &'a Path,
    script: &'a str,
    group: Option<TaskGroup>,
}

fn print_table(catalog: &[CatalogEntry], snapshots: &[RootSnapshot]) {
    let ctx = UiContext::detect();

    if catalog.is_empty() {
        ui::step_info(&ctx, "No scripts found");
    } else {
        ui::intro(&ctx, "Scripts");
        println!(
            "{:<24} {:<10} {:<40}",
            style("SCRIPT").bold(),
            style("GROUP").bold(),
            style("ROOT").bold()
        );
        println!("{}", "-".repeat(76));

        for entry in catalog {
            let group = entry
                .group()
                .map(|g| style(g.to_string()).cyan())
                .unwrap_or_else(|| style("-".to_string()).dim());
            println!(
                "{:<24} {:<10} {:<40}",
                entry.script,
                group,
                entry.root.path().display()
            );
        }

        println!();
        println!("{} script(s)", catalog.len());
    }

    for snapshot in snapshots.iter().filter(|s| !s.is_loaded()) {
        ui::step_warn_hint(
            &ctx,
            &format!("{} not loaded", snapshot.handle.name()),
            &snapshot.status.to_string(),
        );
    }
}

fn print_json(catalog: &[CatalogEntry]) -> CompanionResult<()> {
    let views: Vec<EntryView<'_>> = catalog
        .iter()
        .map(|e| EntryView {
            root: e.root.path(),
            script: &e.script,
            group: e.group(),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&views)?);
    Ok(())
}

fn print_plain(catalog: &[CatalogEntry], qualify: bool) {
    for entry in catalog {
        if qualify {
            println!("{}\t{}", entry.root.path().display(), entry.script);
        } else {
            println!("{}", entry.script);
        }
    }
}
