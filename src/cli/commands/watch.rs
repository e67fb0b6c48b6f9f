//! Watch command - follow manifest and configuration changes

use super::workspace::Workspace;
use crate::catalog::CatalogEntry;
use crate::cli::args::WatchArgs;
use crate::config::{ConfigManager, Settings};
use crate::error::{CompanionError, CompanionResult};
use crate::ui::{self, UiContext};
use crate::workspace::{ManifestWatcher, NotifyWatcher, RegistryEvent, RootSnapshot};
use console::style;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Execute the watch command
pub async fn execute(
    args: WatchArgs,
    settings: &Arc<Settings>,
    manager: &ConfigManager,
) -> CompanionResult<()> {
    let ctx = UiContext::detect();
    let mut workspace = Workspace::new(Arc::clone(settings));

    let (event_tx, mut events) = mpsc::unbounded_channel();
    let _subscription = workspace.registry.subscribe(move |event| {
        let _ = event_tx.send(event.clone());
    });

    workspace.add_roots(&args.roots).await?;
    workspace.registry.settled().await;
    print_catalog(&ctx, &workspace.catalog.get_catalog().await);

    let (config_tx, mut config_events) = mpsc::unbounded_channel();
    let config_watch = match NotifyWatcher.watch(manager.path(), config_tx) {
        Ok(guard) => Some(guard),
        Err(e) => {
            warn!("{}; configuration changes will not be applied", e);
            None
        }
    };
    let mut config_watched = config_watch.is_some();

    ui::remark(&ctx, "Watching for changes, press Ctrl-C to stop");

    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                let mut burst = vec![event];
                while let Ok(event) = events.try_recv() {
                    burst.push(event);
                }
                workspace.registry.settled().await;
                for event in dedup(burst) {
                    print_event(&ctx, &event, workspace.registry.get(event.root()));
                }
                print_catalog(&ctx, &workspace.catalog.get_catalog().await);
            }
            change = config_events.recv(), if config_watched => match change {
                Some(_) => reload_config(manager, settings).await,
                None => config_watched = false,
            },
            signal = tokio::signal::ctrl_c() => {
                signal.map_err(|e| CompanionError::io("waiting for Ctrl-C", e))?;
                break;
            }
        }
    }

    ui::step_ok(&ctx, "Stopped watching");
    Ok(())
}

/// Last event per root, in order of first appearance
fn dedup(burst: Vec<RegistryEvent>) -> Vec<RegistryEvent> {
    let mut latest: Vec<RegistryEvent> = Vec::with_capacity(burst.len());
    for event in burst {
        match latest.iter_mut().find(|e| e.root() == event.root()) {
            Some(slot) => *slot = event,
            None => latest.push(event),
        }
    }
    latest
}

async fn reload_config(manager: &ConfigManager, settings: &Settings) {
    match manager.load().await {
        Ok(config) => {
            let changes = settings.replace(config);
            info!("Configuration reloaded, {} setting(s) changed", changes.len());
        }
        Err(e) => warn!("Keeping previous configuration: {}", e),
    }
}

fn print_event(ctx: &UiContext, event: &RegistryEvent, snapshot: Option<RootSnapshot>) {
    println!();
    match (event, snapshot) {
        (RegistryEvent::Removed(root), _) | (RegistryEvent::Loaded(root), None) => {
            ui::step_info(ctx, &format!("{} removed", root.name()));
        }
        (RegistryEvent::Loaded(root), Some(snapshot)) => {
            let status = ui::status_styled(snapshot.status);
            match snapshot.last_error {
                Some(error) => ui::step_error_detail(
                    ctx,
                    &format!("{} reloaded ({})", root.name(), status),
                    &error,
                ),
                None => ui::step_ok_detail(
                    ctx,
                    &format!("{} reloaded", root.name()),
                    &status.to_string(),
                ),
            }
        }
    }
}

fn print_catalog(ctx: &UiContext, catalog: &[CatalogEntry]) {
    if catalog.is_empty() {
        ui::step_info(ctx, "No scripts found");
        return;
    }

    for entry in catalog {
        let group = entry
            .group()
            .map(|g| format!(" [{}]", g))
            .unwrap_or_default();
        println!(
            "  {}{} {}",
            style(&entry.script).bold(),
            style(group).cyan(),
            style(entry.root.name()).dim()
        );
    }
}
