//! Tests for layered settings loading

use std::fs;
use std::path::{Path, PathBuf};

use config::{Environment, Map};
use tempfile::TempDir;

use mrca::application::{ApplicationError, MatchMode};
use mrca::config::{project_config_path, Settings};

/// Environment source with exactly the given variables.
fn env_from(vars: &[(&str, &str)]) -> Environment {
    let source: Map<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Environment::with_prefix("MRCA").source(Some(source))
}

fn write_global(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("mrca.toml");
    fs::write(&path, content).unwrap();
    path
}

fn load(global: Option<&Path>, project: &Path, vars: &[(&str, &str)]) -> Settings {
    Settings::load_layers(global, Some(project), env_from(vars)).unwrap()
}

#[test]
fn given_no_config_files_when_loading_then_uses_defaults() {
    let global = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    let settings = load(Some(&global.path().join("mrca.toml")), project.path(), &[]);

    assert_eq!(settings, Settings::default());
}

#[test]
fn given_project_config_when_loading_then_overrides_defaults() {
    let project = TempDir::new().unwrap();
    fs::write(
        project_config_path(project.path()),
        "root_label = \"<ROOT>\"\nmatch_mode = \"full\"\n",
    )
    .unwrap();

    let settings = load(None, project.path(), &[]);

    assert_eq!(settings.root_label, "<ROOT>");
    assert_eq!(settings.match_mode, MatchMode::Full);
}

#[test]
fn given_all_layers_when_loading_then_later_layers_win() {
    let global = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let global_path = write_global(
        &global,
        "root_label = \"global\"\nmatch_mode = \"full\"\nignore_case = true\n",
    );
    fs::write(project_config_path(project.path()), "root_label = \"project\"\n").unwrap();

    let settings = load(Some(&global_path), project.path(), &[]);
    assert_eq!(settings.root_label, "project");
    assert_eq!(settings.match_mode, MatchMode::Full);
    assert!(settings.ignore_case);

    let settings = load(Some(&global_path), project.path(), &[("MRCA_ROOT_LABEL", "env")]);
    assert_eq!(settings.root_label, "env");
}

#[test]
fn given_template_as_project_config_when_loading_then_keeps_defaults() {
    let project = TempDir::new().unwrap();
    fs::write(project_config_path(project.path()), Settings::template()).unwrap();

    let settings = load(None, project.path(), &[]);

    assert_eq!(settings, Settings::default());
}

#[test]
fn given_malformed_project_config_when_loading_then_reports_config_error() {
    let project = TempDir::new().unwrap();
    fs::write(project_config_path(project.path()), "root_label = [").unwrap();

    let result = Settings::load_layers(None, Some(project.path()), env_from(&[]));

    match result {
        Err(ApplicationError::Config { message }) => assert!(message.contains(".mrca.toml")),
        other => panic!("expected config error, got {other:?}"),
    }
}
