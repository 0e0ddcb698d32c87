// Configuration loading through the public API

use std::fs;

use errpanic::config::{
    create_default_config, parse_config_file, ConfigBuilder, ConfigSource, EnvConfig, FileConfig,
    Settings,
};
use errpanic::error::{BacktracePolicy, ConfigError};
use tempfile::tempdir;

#[test]
fn test_default_template_matches_defaults() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("errpanic.toml");

    create_default_config(&path).unwrap();

    let settings = ConfigBuilder::new().add_config_file(&path).unwrap().build();
    assert_eq!(settings, Settings::default());
}

#[test]
fn test_file_then_env_layering() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("errpanic.toml");
    fs::write(
        &path,
        r#"
            backtrace = "never"

            [hook]
            install = false
            log_event = false
        "#,
    )
    .unwrap();

    let prefix = "ERRPANIC_IT_LAYERING";
    std::env::set_var(format!("{prefix}_HOOK"), "yes");

    let env = EnvConfig::new(prefix);
    let file = FileConfig::with_path(&path);
    let settings = ConfigBuilder::new()
        .load_all(&[&file as &dyn ConfigSource, &env])
        .unwrap()
        .build();

    std::env::remove_var(format!("{prefix}_HOOK"));

    assert_eq!(settings.backtrace, BacktracePolicy::Never);
    assert!(settings.hook.install);
    assert!(!settings.hook.log_event);
    assert!(settings.hook.chain_previous);
}

#[test]
fn test_unreadable_config_reports_path() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("errpanic.toml");
    fs::write(&path, "[hook]\ninstall = \"sometimes\"\n").unwrap();

    let err = parse_config_file(&path).unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("errpanic.toml"));
}
