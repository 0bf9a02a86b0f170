//! Integration tests for layered Settings loading
//!
//! Every source is passed explicitly to `Settings::load_layers`, so the host's
//! global config and environment never leak in.

use std::fs;
use std::path::{Path, PathBuf};

use config::{Environment, Map};
use tempfile::TempDir;

use course_catalog::application::{ApplicationError, MalformedLinePolicy};
use course_catalog::config::{local_config_path, Settings};
use course_catalog::domain::DuplicatePolicy;

fn env_of(pairs: &[(&str, &str)]) -> Environment {
    let map: Map<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Settings::env_source().source(Some(map))
}

fn no_env() -> Environment {
    env_of(&[])
}

fn write_global(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("course-catalog.toml");
    fs::write(&path, content).unwrap();
    path
}

fn write_local(dir: &TempDir, content: &str) {
    fs::write(local_config_path(dir.path()), content).unwrap();
}

#[test]
fn given_no_sources_when_load_then_defaults() {
    let local = TempDir::new().unwrap();

    let settings = Settings::load_layers(None, local.path(), no_env()).expect("load settings");

    assert_eq!(settings, Settings::default());
}

#[test]
fn given_missing_global_file_when_load_then_skipped() {
    let local = TempDir::new().unwrap();
    let global = local.path().join("nowhere").join("course-catalog.toml");

    let settings =
        Settings::load_layers(Some(&global), local.path(), no_env()).expect("load settings");

    assert_eq!(settings, Settings::default());
}

#[test]
fn given_local_config_when_load_then_overrides_defaults() {
    // Arrange
    let local = TempDir::new().unwrap();
    write_local(
        &local,
        r#"
default_file = "/data/courses.csv"
delimiter = ";"
duplicates = "overwrite"
on_malformed = "skip"
"#,
    );

    // Act
    let settings = Settings::load_layers(None, local.path(), no_env()).expect("load settings");

    // Assert
    assert_eq!(settings.default_file, PathBuf::from("/data/courses.csv"));
    assert_eq!(settings.delimiter, ';');
    assert_eq!(settings.duplicates, DuplicatePolicy::Overwrite);
    assert_eq!(settings.on_malformed, MalformedLinePolicy::Skip);
    assert_eq!(settings.default_token, "default");
}

#[test]
fn given_global_local_and_env_when_load_then_later_layers_win() {
    // Arrange
    let global_dir = TempDir::new().unwrap();
    let global = write_global(
        &global_dir,
        r#"
default_file = "/global/courses.csv"
default_token = "std"
delimiter = "|"
duplicates = "reject"
"#,
    );
    let local = TempDir::new().unwrap();
    write_local(
        &local,
        r#"
delimiter = ";"
duplicates = "overwrite"
"#,
    );
    let env = env_of(&[("COURSE_CATALOG_DUPLICATES", "retain")]);

    // Act
    let settings = Settings::load_layers(Some(&global), local.path(), env).expect("load settings");

    // Assert
    // global only
    assert_eq!(settings.default_file, PathBuf::from("/global/courses.csv"));
    assert_eq!(settings.default_token, "std");
    // local over global
    assert_eq!(settings.delimiter, ';');
    // env over local
    assert_eq!(settings.duplicates, DuplicatePolicy::Retain);
    // untouched default
    assert_eq!(settings.on_malformed, MalformedLinePolicy::Abort);
}

#[test]
fn given_unknown_policy_in_local_config_when_load_then_config_error() {
    let local = TempDir::new().unwrap();
    write_local(&local, "duplicates = \"merge\"\n");

    let result = Settings::load_layers(None, local.path(), no_env());

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_invalid_global_toml_when_load_then_config_error() {
    let global_dir = TempDir::new().unwrap();
    let global = write_global(&global_dir, "delimiter = \n");
    let local = TempDir::new().unwrap();

    let result = Settings::load_layers(Some(&global), local.path(), no_env());

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_tilde_in_default_file_when_load_then_expanded() {
    let local = TempDir::new().unwrap();
    write_local(&local, "default_file = \"~/courses.csv\"\n");

    let settings = Settings::load_layers(None, local.path(), no_env()).expect("load settings");

    let home = std::env::var("HOME").expect("HOME should be set");
    assert_eq!(settings.default_file, Path::new(&home).join("courses.csv"));
}
