//! Mapping catalog entries to runnable composer commands

use super::cache::CatalogEntry;
use crate::config::Config;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Executable used when none is configured
pub const DEFAULT_EXECUTABLE: &str = "composer";

/// Interpreter for `.phar` executables on Windows when none is configured
pub const DEFAULT_PHP: &str = "php.exe";

/// Conventional task group implied by a script name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskGroup {
    Build,
    Test,
    Rebuild,
    Clean,
}

impl TaskGroup {
    /// Group for a script name, ignoring case
    pub fn classify(script: &str) -> Option<Self> {
        match script.to_lowercase().as_str() {
            "build" => Some(Self::Build),
            "test" => Some(Self::Test),
            "watch" => Some(Self::Rebuild),
            "clean" => Some(Self::Clean),
            _ => None,
        }
    }
}

impl fmt::Display for TaskGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Build => "build",
            Self::Test => "test",
            Self::Rebuild => "rebuild",
            Self::Clean => "clean",
        };
        write!(f, "{}", name)
    }
}

/// Shell command running one script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskCommand {
    /// Executable, already quoted; may include an interpreter prefix
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl TaskCommand {
    /// `<executable> run <script> -d <root>`, run from the root directory
    pub fn for_entry(entry: &CatalogEntry, executable: &str) -> Self {
        let dir = entry.root.path();
        Self {
            program: executable.to_string(),
            args: vec![
                "run".to_string(),
                entry.script.clone(),
                "-d".to_string(),
                dir.display().to_string(),
            ],
            cwd: dir.to_path_buf(),
        }
    }

    /// Full command line with arguments quoted where needed
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&quote_path(arg));
        }
        line
    }
}

impl fmt::Display for TaskCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command_line())
    }
}

/// Wrap a path in double quotes if it contains a space
pub fn quote_path(path: &str) -> String {
    if path.contains(' ') {
        format!("\"{}\"", path)
    } else {
        path.to_string()
    }
}

/// Composer executable for `root`, ready to prefix a command line
pub fn resolve_executable(config: &Config, root: Option<&Path>, quoting: bool) -> String {
    resolve_for_platform(config, root, quoting, cfg!(windows), |p| p.exists())
}

fn resolve_for_platform(
    config: &Config,
    root: Option<&Path>,
    quoting: bool,
    windows: bool,
    exists: impl Fn(&Path) -> bool,
) -> String {
    let mut exe = config
        .executable_for(root)
        .unwrap_or(DEFAULT_EXECUTABLE)
        .to_string();

    if windows {
        if let Some(stem) = exe.strip_suffix(".phar") {
            let bat = format!("{}.bat", stem);
            if bat.contains('\\') && exists(Path::new(&bat)) {
                exe = bat;
            } else {
                let php = config.php.executable.as_deref().unwrap_or(DEFAULT_PHP);
                return format!("{} {}", quote_path(php), quote_path(&exe));
            }
        }
    }

    if quoting {
        quote_path(&exe)
    } else {
        exe
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::RootHandle;

    fn entry(dir: &str, script: &str) -> CatalogEntry {
        CatalogEntry {
            root: RootHandle::new(dir),
            script: script.to_string(),
        }
    }

    #[test]
    fn classify_groups() {
        assert_eq!(TaskGroup::classify("build"), Some(TaskGroup::Build));
        assert_eq!(TaskGroup::classify("Test"), Some(TaskGroup::Test));
        assert_eq!(TaskGroup::classify("WATCH"), Some(TaskGroup::Rebuild));
        assert_eq!(TaskGroup::classify("clean"), Some(TaskGroup::Clean));
        assert_eq!(TaskGroup::classify("lint"), None);
        assert_eq!(TaskGroup::classify("build:prod"), None);
    }

    #[test]
    fn command_for_entry() {
        let cmd = TaskCommand::for_entry(&entry("/work/my app", "test"), "composer");
        assert_eq!(cmd.program, "composer");
        assert_eq!(cmd.args, ["run", "test", "-d", "/work/my app"]);
        assert_eq!(cmd.cwd, PathBuf::from("/work/my app"));
        assert_eq!(cmd.command_line(), "composer run test -d \"/work/my app\"");
    }

    #[test]
    fn quoting() {
        assert_eq!(quote_path("/usr/bin/composer"), "/usr/bin/composer");
        assert_eq!(quote_path("C:\\Program Files\\composer"), "\"C:\\Program Files\\composer\"");
    }

    #[test]
    fn executable_fallbacks() {
        let mut config = Config::default();
        assert_eq!(resolve_executable(&config, None, true), "composer");

        config.composer.executable = Some("/opt/my tools/composer".into());
        assert_eq!(
            resolve_executable(&config, None, true),
            "\"/opt/my tools/composer\""
        );
        assert_eq!(
            resolve_executable(&config, None, false),
            "/opt/my tools/composer"
        );

        config.root_mut(Path::new("/work/legacy")).executable = Some("/opt/composer1".into());
        assert_eq!(
            resolve_executable(&config, Some(Path::new("/work/legacy")), true),
            "/opt/composer1"
        );
    }

    #[test]
    fn phar_runs_through_php_on_windows() {
        let mut config = Config::default();
        config.composer.executable = Some("C:\\tools\\composer.phar".into());

        let exe = resolve_for_platform(&config, None, true, true, |_| false);
        assert_eq!(exe, "php.exe C:\\tools\\composer.phar");

        config.php.executable = Some("C:\\Program Files\\php\\php.exe".into());
        let exe = resolve_for_platform(&config, None, true, true, |_| false);
        assert_eq!(exe, "\"C:\\Program Files\\php\\php.exe\" C:\\tools\\composer.phar");

        let exe = resolve_for_platform(&config, None, true, false, |_| false);
        assert_eq!(exe, "C:\\tools\\composer.phar");
    }

    #[test]
    fn phar_prefers_sibling_bat() {
        let mut config = Config::default();
        config.composer.executable = Some("C:\\tools\\composer.phar".into());

        let exe = resolve_for_platform(&config, None, true, true, |p| {
            p == Path::new("C:\\tools\\composer.bat")
        });
        assert_eq!(exe, "C:\\tools\\composer.bat");

        // Bare names never resolve to a .bat
        config.composer.executable = Some("composer.phar".into());
        let exe = resolve_for_platform(&config, None, true, true, |_| true);
        assert_eq!(exe, "php.exe composer.phar");
    }
}
