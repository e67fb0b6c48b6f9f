//! Status command - show per-root load state

use super::workspace::Workspace;
use crate::cli::args::{OutputFormat, StatusArgs};
use crate::config::Settings;
use crate::error::CompanionResult;
use crate::ui::{self, UiContext};
use crate::workspace::RootSnapshot;
use std::sync::Arc;

/// Execute the status command
pub async fn execute(args: StatusArgs, settings: &Arc<Settings>) -> CompanionResult<()> {
    let workspace = Workspace::open(&args.roots, Arc::clone(settings)).await?;
    let snapshots = workspace.snapshots();

    match args.format {
        OutputFormat::Table => {
            let show_scripts = settings.snapshot().composer.show_scripts;
            print_table(&snapshots, show_scripts);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshots)?),
        OutputFormat::Plain => {
            for snapshot in &snapshots {
                println!("{}\t{}", snapshot.handle.path().display(), snapshot.status);
            }
        }
    }

    Ok(())
}

fn print_table(snapshots: &[RootSnapshot], show_scripts: bool) {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "Workspace Status");

    for snapshot in snapshots {
        ui::section(&ctx, &snapshot.handle.name());
        ui::key_value(&ctx, "Path", &snapshot.handle.path().display().to_string());
        ui::key_value(
            &ctx,
            "Status",
            &ui::status_styled(snapshot.status).to_string(),
        );

        if snapshot.is_loaded() {
            let dev = snapshot.dependencies.iter().filter(|d| d.is_dev).count();
            ui::key_value(&ctx, "Scripts", &snapshot.scripts.len().to_string());
            ui::key_value(
                &ctx,
                "Dependencies",
                &format!("{} ({} dev)", snapshot.dependencies.len(), dev),
            );
        }
        if snapshot.stale {
            ui::key_value(&ctx, "Stale", "reload pending");
        }
        if let Some(at) = snapshot.last_loaded {
            ui::key_value(&ctx, "Last loaded", &at.format("%Y-%m-%d %H:%M:%S").to_string());
        }
        if let Some(ref error) = snapshot.last_error {
            ui::step_error_detail(&ctx, "Manifest error", error);
        }

        if show_scripts && !snapshot.scripts.is_empty() {
            let names: Vec<&str> = snapshot.scripts.iter().map(String::as_str).collect();
            ui::remark(&ctx, &names.join(", "));
        }
    }

    println!();
    let loaded = snapshots.iter().filter(|s| s.is_loaded()).count();
    if loaded == snapshots.len() {
        ui::step_ok(&ctx, &format!("{} root(s) loaded", loaded));
    } else {
        ui::step_warn_hint(
            &ctx,
            &format!("{} of {} root(s) loaded", loaded, snapshots.len()),
            "see above for details",
        );
    }
}
