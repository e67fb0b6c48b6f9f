//! Integration tests for Companion

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{
        "name": "acme/app",
        "scripts": {"build": "make", "test": "phpunit", "lint": "phpcs"},
        "require": {"php": ">=8.1", "monolog/monolog": "^3.0"},
        "require-dev": {"phpunit/phpunit": "^10.0"}
    }"#;

    /// Scratch config file and workspace root
    struct Fixture {
        _config_dir: TempDir,
        config: PathBuf,
        root: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let config_dir = TempDir::new().unwrap();
            let config = config_dir.path().join("config.toml");
            Self {
                _config_dir: config_dir,
                config,
                root: TempDir::new().unwrap(),
            }
        }

        fn with_manifest(contents: &str) -> Self {
            let fixture = Self::new();
            std::fs::write(fixture.root.path().join("composer.json"), contents).unwrap();
            fixture
        }

        fn root(&self) -> &Path {
            self.root.path()
        }

        fn cmd(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("companion");
            cmd.env_remove("COMPANION_CONFIG")
                .env_remove("RUST_LOG")
                .arg("--config")
                .arg(&self.config);
            cmd
        }
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("companion")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Composer manifest scripts"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("companion")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("companion"));
    }

    #[test]
    fn list_plain_prints_scripts() {
        let f = Fixture::with_manifest(MANIFEST);
        f.cmd()
            .arg("list")
            .arg(f.root())
            .args(["--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::eq("build\nlint\ntest\n"));
    }

    #[test]
    fn list_json_includes_groups() {
        let f = Fixture::with_manifest(MANIFEST);
        f.cmd()
            .arg("list")
            .arg(f.root())
            .args(["--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""script": "test""#))
            .stdout(predicate::str::contains(r#""group": "test""#))
            .stdout(predicate::str::contains(r#""group": null"#));
    }

    #[test]
    fn list_defaults_to_current_directory() {
        let f = Fixture::with_manifest(MANIFEST);
        f.cmd()
            .current_dir(f.root())
            .args(["list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("build"));
    }

    #[test]
    fn list_without_manifest_fails_with_hint() {
        let f = Fixture::new();
        f.cmd()
            .arg("list")
            .arg(f.root())
            .assert()
            .failure()
            .stderr(predicate::str::contains("No composer.json"))
            .stderr(predicate::str::contains("composer init"));
    }

    #[test]
    fn list_rejects_missing_directory() {
        let f = Fixture::new();
        f.cmd()
            .arg("list")
            .arg(f.root().join("nope"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Not a workspace root"));
    }

    #[test]
    fn malformed_manifest_is_reported() {
        let f = Fixture::with_manifest("{\"scripts\": ");
        f.cmd()
            .arg("deps")
            .arg(f.root())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid composer.json"));
    }

    #[test]
    fn deps_filters_dev() {
        let f = Fixture::with_manifest(MANIFEST);
        f.cmd()
            .arg("deps")
            .arg(f.root())
            .args(["--dev", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::eq("phpunit/phpunit ^10.0\n"));

        f.cmd()
            .arg("deps")
            .arg(f.root())
            .args(["--no-dev", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::eq("php >=8.1\nmonolog/monolog ^3.0\n"));
    }

    #[test]
    fn status_plain_reports_each_root() {
        let loaded = Fixture::with_manifest(MANIFEST);
        let empty = TempDir::new().unwrap();
        loaded
            .cmd()
            .arg("status")
            .arg(loaded.root())
            .arg(empty.path())
            .args(["--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\tloaded"))
            .stdout(predicate::str::contains("\tmissing"));
    }

    #[test]
    fn tasks_plain_prints_command_lines() {
        let f = Fixture::with_manifest(r#"{"scripts": {"build": "make"}}"#);
        f.cmd()
            .args(["config", "set", "composer.executable", "/opt/composer"])
            .assert()
            .success();

        f.cmd()
            .arg("tasks")
            .arg(f.root())
            .args(["--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("/opt/composer run build -d "));
    }

    #[test]
    fn disabled_root_is_reported() {
        let f = Fixture::with_manifest(MANIFEST);
        f.cmd()
            .args(["config", "set", "composer.enabled", "false", "--root"])
            .arg(f.root())
            .assert()
            .success();

        f.cmd()
            .arg("list")
            .arg(f.root())
            .assert()
            .failure()
            .stderr(predicate::str::contains("disabled"));

        f.cmd()
            .arg("status")
            .arg(f.root())
            .args(["--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\tdisabled"));
    }

    #[test]
    fn disabled_hint_reenables_root() {
        let f = Fixture::with_manifest(MANIFEST);
        f.cmd()
            .args(["config", "set", "composer.enabled", "false", "--root"])
            .arg(f.root())
            .assert()
            .success();

        // The global flag does not override the root's own setting
        f.cmd()
            .args(["config", "set", "composer.enabled", "true"])
            .assert()
            .success();
        f.cmd()
            .arg("list")
            .arg(f.root())
            .assert()
            .failure()
            .stderr(predicate::str::contains("config set composer.enabled true --root"));

        let root = std::fs::canonicalize(f.root()).unwrap();
        f.cmd()
            .args(["config", "set", "composer.enabled", "true", "--root"])
            .arg(&root)
            .assert()
            .success();
        f.cmd()
            .arg("list")
            .arg(f.root())
            .args(["--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("build"));
    }

    #[test]
    fn status_lists_scripts_unless_disabled() {
        let f = Fixture::with_manifest(MANIFEST);
        f.cmd()
            .arg("status")
            .arg(f.root())
            .assert()
            .success()
            .stdout(predicate::str::contains("build, lint, test"));

        f.cmd()
            .args(["config", "set", "composer.show_scripts", "false"])
            .assert()
            .success();
        f.cmd()
            .arg("status")
            .arg(f.root())
            .assert()
            .success()
            .stdout(predicate::str::contains("Scripts: 3"))
            .stdout(predicate::str::contains("build, lint, test").not());
    }

    #[test]
    fn config_path() {
        let f = Fixture::new();
        f.cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_init_and_show() {
        let f = Fixture::new();
        f.cmd().args(["config", "init"]).assert().success();
        assert!(f.config.exists());

        f.cmd()
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--force"));

        f.cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[composer]"));
    }

    #[test]
    fn config_set_rejects_unknown_key() {
        let f = Fixture::new();
        f.cmd()
            .args(["config", "set", "vm.name", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn invalid_config_fails_with_hint() {
        let f = Fixture::with_manifest(MANIFEST);
        std::fs::write(&f.config, "[composer\n").unwrap();
        f.cmd()
            .arg("list")
            .arg(f.root())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"))
            .stderr(predicate::str::contains("config init --force"));

        f.cmd().args(["config", "init", "--force"]).assert().success();
        f.cmd().arg("list").arg(f.root()).assert().success();
    }
}
