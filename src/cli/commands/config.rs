//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{CompanionError, CompanionResult};
use crate::ui::{self, UiContext};
use std::path::{Path, PathBuf};

const GLOBAL_KEYS: [&str; 5] = [
    "general.log_format",
    "composer.enabled",
    "composer.executable",
    "composer.show_scripts",
    "php.executable",
];

const ROOT_KEYS: [&str; 2] = ["composer.enabled", "composer.executable"];

/// Execute the config command
pub async fn execute(args: ConfigArgs, manager: &ConfigManager) -> CompanionResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(&manager.load().await?)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value, root }) => {
            let mut config = manager.load().await?;
            let root = match root {
                Some(dir) => Some(canonical_root(&dir).await),
                None => None,
            };
            set_value(&mut config, &key, &value, root.as_deref())?;
            manager.save(&config).await?;

            let ctx = UiContext::detect();
            match root {
                Some(dir) => ui::step_ok(
                    &ctx,
                    &format!("Set {} = {} for {}", key, value, dir.display()),
                ),
                None => ui::step_ok(&ctx, &format!("Set {} = {}", key, value)),
            }
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> CompanionResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> CompanionResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::step_ok_detail(
        &ctx,
        "Configuration initialized",
        &path.display().to_string(),
    );
    Ok(())
}

/// Root keys are stored under the canonical directory so they match the
/// paths the registry sees
async fn canonical_root(dir: &Path) -> PathBuf {
    tokio::fs::canonicalize(dir)
        .await
        .unwrap_or_else(|_| dir.to_path_buf())
}

fn set_value(
    config: &mut Config,
    key: &str,
    value: &str,
    root: Option<&Path>,
) -> CompanionResult<()> {
    if let Some(root) = root {
        let overrides = config.root_mut(root);
        return match key {
            "composer.enabled" => {
                overrides.enabled = Some(parse_bool(value)?);
                Ok(())
            }
            "composer.executable" => {
                overrides.executable = optional(value);
                Ok(())
            }
            _ => Err(unknown_key(key, &ROOT_KEYS)),
        };
    }

    match key {
        "general.log_format" => {
            if !matches!(value, "text" | "json") {
                return Err(CompanionError::User(format!(
                    "Invalid log format: {}. Use text/json",
                    value
                )));
            }
            config.general.log_format = value.to_string();
        }
        "composer.enabled" => config.composer.enabled = parse_bool(value)?,
        "composer.executable" => config.composer.executable = optional(value),
        "composer.show_scripts" => config.composer.show_scripts = parse_bool(value)?,
        "php.executable" => config.php.executable = optional(value),
        _ => return Err(unknown_key(key, &GLOBAL_KEYS)),
    }
    Ok(())
}

/// Empty value clears the setting
fn optional(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn unknown_key(key: &str, valid: &[&str]) -> CompanionError {
    CompanionError::User(format!(
        "Unknown config key: {} (valid keys: {})",
        key,
        valid.join(", ")
    ))
}

fn parse_bool(value: &str) -> CompanionResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(CompanionError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_global_keys() {
        let mut config = Config::default();
        set_value(&mut config, "composer.enabled", "no", None).unwrap();
        set_value(&mut config, "composer.executable", "/opt/composer", None).unwrap();
        set_value(&mut config, "php.executable", "/usr/bin/php", None).unwrap();
        set_value(&mut config, "general.log_format", "json", None).unwrap();

        assert!(!config.composer.enabled);
        assert_eq!(config.composer.executable.as_deref(), Some("/opt/composer"));
        assert_eq!(config.php.executable.as_deref(), Some("/usr/bin/php"));
        assert_eq!(config.general.log_format, "json");

        set_value(&mut config, "composer.executable", "", None).unwrap();
        assert_eq!(config.composer.executable, None);
    }

    #[test]
    fn set_root_keys() {
        let mut config = Config::default();
        let root = Path::new("/work/legacy");
        set_value(&mut config, "composer.enabled", "false", Some(root)).unwrap();

        assert!(!config.enabled_for(root));
        assert!(config.enabled_for(Path::new("/work/app")));

        let err = set_value(&mut config, "php.executable", "php", Some(root)).unwrap_err();
        assert!(err.to_string().contains("composer.enabled"));
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = Config::default();
        assert!(set_value(&mut config, "composer.enabled", "maybe", None).is_err());
        assert!(set_value(&mut config, "general.log_format", "xml", None).is_err());
        assert!(set_value(&mut config, "vm.name", "x", None).is_err());
    }
}
