//! Tasks command - show how each script would be run

use super::workspace::Workspace;
use crate::catalog::{resolve_executable, CatalogEntry, TaskCommand, TaskGroup};
use crate::cli::args::{OutputFormat, TasksArgs};
use crate::config::{Config, Settings};
use crate::error::CompanionResult;
use crate::ui::{self, UiContext};
use console::style;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

#[derive(Serialize)]
struct TaskView<'a> {
    root: &'a Path,
    script: &'a str,
    group: Option<TaskGroup>,
    command: TaskCommand,
    command_line: String,
}

/// Execute the tasks command
pub async fn execute(args: TasksArgs, settings: &Arc<Settings>) -> CompanionResult<()> {
    let workspace = Workspace::open(&args.roots, Arc::clone(settings)).await?;
    workspace.require_single_loaded()?;

    let config = settings.snapshot();
    let catalog = workspace.catalog.get_catalog().await;
    let tasks = build(&catalog, &config);

    match args.format {
        OutputFormat::Table => print_table(&tasks),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tasks)?),
        OutputFormat::Plain => {
            for task in &tasks {
                println!("{}", task.command_line);
            }
        }
    }

    Ok(())
}

fn build<'a>(catalog: &'a [CatalogEntry], config: &Config) -> Vec<TaskView<'a>> {
    catalog
        .iter()
        .map(|entry| {
            let executable = resolve_executable(config, Some(entry.root.path()), true);
            let command = TaskCommand::for_entry(entry, &executable);
            TaskView {
                root: entry.root.path(),
                script: &entry.script,
                group: entry.group(),
                command_line: command.command_line(),
                command,
            }
        })
        .collect()
}

fn print_table(tasks: &[TaskView<'_>]) {
    let ctx = UiContext::detect();

    if tasks.is_empty() {
        ui::step_info(&ctx, "No tasks found");
        return;
    }

    ui::intro(&ctx, "Tasks");
    for task in tasks {
        let label = match task.group {
            Some(group) => format!("{} [{}]", task.script, group),
            None => task.script.to_string(),
        };
        println!("  {}", style(label).bold());
        ui::remark(&ctx, &task.command_line);
    }
}
