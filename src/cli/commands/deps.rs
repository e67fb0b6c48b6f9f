//! Deps command - show declared dependencies of one root

use super::workspace::{require_loaded, Workspace};
use crate::cli::args::{DepsArgs, OutputFormat};
use crate::config::Settings;
use crate::error::{CompanionError, CompanionResult};
use crate::manifest::Dependency;
use crate::ui::{self, UiContext};
use console::style;
use std::sync::Arc;

/// Execute the deps command
pub async fn execute(args: DepsArgs, settings: &Arc<Settings>) -> CompanionResult<()> {
    let roots: Vec<_> = args.root.iter().cloned().collect();
    let workspace = Workspace::open(&roots, Arc::clone(settings)).await?;

    let snapshot = workspace
        .snapshots()
        .into_iter()
        .next()
        .ok_or_else(|| CompanionError::Internal("no workspace root opened".to_string()))?;
    require_loaded(&snapshot)?;

    let deps = filter(snapshot.dependencies, args.dev, args.no_dev);

    match args.format {
        OutputFormat::Table => print_table(&snapshot.handle.name(), &deps),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&deps)?),
        OutputFormat::Plain => {
            for dep in &deps {
                println!("{} {}", dep.name, dep.constraint);
            }
        }
    }

    Ok(())
}

fn filter(deps: Vec<Dependency>, dev_only: bool, no_dev: bool) -> Vec<Dependency> {
    deps.into_iter()
        .filter(|d| match (dev_only, no_dev) {
            (true, _) => d.is_dev,
            (_, true) => !d.is_dev,
            _ => true,
        })
        .collect()
}

fn print_table(root: &str, deps: &[Dependency]) {
    let ctx = UiContext::detect();

    if deps.is_empty() {
        ui::step_info(&ctx, &format!("No dependencies declared in {}", root));
        return;
    }

    ui::intro(&ctx, &format!("Dependencies of {}", root));
    println!(
        "{:<40} {:<20} {:<12}",
        style("PACKAGE").bold(),
        style("CONSTRAINT").bold(),
        style("SECTION").bold()
    );
    println!("{}", "-".repeat(74));

    for dep in deps {
        let section = if dep.is_dev {
            style(dep.section()).yellow()
        } else {
            style(dep.section()).green()
        };
        println!("{:<40} {:<20} {:<12}", dep.name, dep.constraint, section);
    }

    println!();
    println!("{} dependenc(ies)", deps.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dep(name: &str, is_dev: bool) -> Dependency {
        Dependency {
            name: name.to_string(),
            constraint: "^1.0".to_string(),
            is_dev,
        }
    }

    #[test]
    fn filter_by_section() {
        let deps = vec![dep("a/a", false), dep("b/b", true)];

        let all = filter(deps.clone(), false, false);
        assert_eq!(all.len(), 2);

        let dev = filter(deps.clone(), true, false);
        assert_eq!(dev, vec![dep("b/b", true)]);

        let runtime = filter(deps, false, true);
        assert_eq!(runtime, vec![dep("a/a", false)]);
    }
}
