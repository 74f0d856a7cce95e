use hoist_engine::config::{ConfigError, ConfigLoader, HoistConfig};
use hoist_engine::executor::ProjectView;
use hoist_engine::query::{Filter, FilterPlacement};
use hoist_engine::serialize::OutputEncoding;
use serial_test::serial;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[test]
fn test_default_values() {
    let config = HoistConfig::default();
    assert_eq!(config.bookmarks.application, "Hookmark");
    assert_eq!(config.projects.application, "OmniFocus");
    assert_eq!(config.projects.filter, Filter::None);
    assert_eq!(config.projects.filter_placement, FilterPlacement::Remote);
    assert_eq!(config.projects.view, ProjectView::Ranked);
    assert_eq!(config.jxa.osascript, PathBuf::from("/usr/bin/osascript"));
    assert_eq!(config.jxa.compile_timeout_secs, 5);
    assert_eq!(config.output, OutputEncoding::Array);
}

#[tokio::test]
async fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
bookmarks:
  application: Hook
projects:
  filter: open
  filter_placement: local
  view: summary
jxa:
  compile_timeout_secs: 10
output: string
"#
    )
    .unwrap();

    let config = ConfigLoader::load_from(file.path()).await.unwrap();

    assert_eq!(config.bookmarks.application, "Hook");
    assert_eq!(config.projects.application, "OmniFocus");
    assert_eq!(config.projects.filter, Filter::open_projects());
    assert_eq!(config.projects.filter_placement, FilterPlacement::Local);
    assert_eq!(config.projects.view, ProjectView::Summary);
    assert_eq!(config.jxa.compile_timeout_secs, 10);
    assert_eq!(config.jxa.osacompile, PathBuf::from("/usr/bin/osacompile"));
    assert_eq!(config.output, OutputEncoding::String);
}

#[tokio::test]
async fn test_status_list_filter() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "projects:\n  filter: \"active, on-hold\"").unwrap();

    let config = ConfigLoader::load_from(file.path()).await.unwrap();
    assert_eq!(
        config.projects.filter,
        Filter::any_of("status", ["active status", "on hold status"])
    );
}

#[tokio::test]
async fn test_unknown_status_is_a_parse_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "projects:\n  filter: paused").unwrap();

    let err = ConfigLoader::load_from(file.path()).await.unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[tokio::test]
async fn test_load_from_nonexistent_file() {
    let err = ConfigLoader::load_from(Path::new("/nonexistent/path/hoist.yaml"))
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[tokio::test]
#[serial]
async fn test_env_var_selects_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "projects:\n  application: OmniFocus 3").unwrap();

    // SAFETY: serialized with the other tests that touch the environment.
    unsafe { std::env::set_var(hoist_engine::config::CONFIG_ENV, file.path()) };
    let result = ConfigLoader::load_default().await;
    unsafe { std::env::remove_var(hoist_engine::config::CONFIG_ENV) };

    assert_eq!(result.unwrap().projects.application, "OmniFocus 3");
}

#[tokio::test]
#[serial]
async fn test_env_var_pointing_nowhere_fails() {
    unsafe { std::env::set_var(hoist_engine::config::CONFIG_ENV, "/nonexistent/hoist.yaml") };
    let result = ConfigLoader::load_default().await;
    unsafe { std::env::remove_var(hoist_engine::config::CONFIG_ENV) };

    assert!(result.is_err());
}
