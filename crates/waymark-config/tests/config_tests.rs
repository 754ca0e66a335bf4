// SPDX-FileCopyrightText: 2026 Waymark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Waymark configuration system.

use waymark_config::diagnostic::{suggest_key, ConfigError};
use waymark_config::model::WaymarkConfig;
use waymark_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_waymark_config() {
    let toml = r#"
[storage]
database_path = "/tmp/flows.db"
wal_mode = false

[flows]
sweep_interval_secs = 300

[conflicts]
prompt_interval_secs = 120
audit_log_path = "/tmp/conflicts.log"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.storage.database_path, "/tmp/flows.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.flows.sweep_interval_secs, 300);
    assert_eq!(config.conflicts.prompt_interval_secs, 120);
    assert_eq!(config.conflicts.audit_log_path, "/tmp/conflicts.log");
}

/// Unknown field in [storage] section produces an UnknownField error.
#[test]
fn unknown_field_in_storage_produces_error() {
    let toml = r#"
[storage]
databse_path = "flows.db"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    // Figment wraps serde's deny_unknown_fields error
    assert!(
        err_str.contains("unknown field") || err_str.contains("databse_path"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Unknown field in [conflicts] section produces an UnknownField error.
#[test]
fn unknown_field_in_conflicts_produces_error() {
    let toml = r#"
[conflicts]
audit_log_pth = "conflicts.log"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("audit_log_pth"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let toml = "";
    let config = load_config_from_str(toml).expect("empty TOML should use defaults");

    assert!(config.storage.database_path.ends_with("waymark.db"));
    assert!(config.storage.wal_mode);
    assert_eq!(config.flows.sweep_interval_secs, 0);
    assert_eq!(config.conflicts.prompt_interval_secs, 60);
    assert!(config.conflicts.audit_log_path.ends_with("flow_conflicts.log"));
}

/// A dotted override takes precedence over the TOML value, the same way a
/// WAYMARK_STORAGE_DATABASE_PATH env var does through the mapped provider.
#[test]
fn override_wins_over_toml_value() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let toml_content = r#"
[storage]
database_path = "from-toml.db"
"#;

    let config: WaymarkConfig = Figment::new()
        .merge(Serialized::defaults(WaymarkConfig::default()))
        .merge(Toml::string(toml_content))
        .merge(("storage.database_path", "from-env.db"))
        .extract()
        .expect("should merge override");

    assert_eq!(config.storage.database_path, "from-env.db");
}

/// `conflicts.prompt_interval_secs` maps as one key despite its underscores
/// (NOT conflicts.prompt.interval.secs).
#[test]
fn underscore_keys_map_as_single_segments() {
    use figment::{providers::Serialized, Figment};

    let config: WaymarkConfig = Figment::new()
        .merge(Serialized::defaults(WaymarkConfig::default()))
        .merge(("conflicts.prompt_interval_secs", 90u64))
        .extract()
        .expect("should set prompt_interval_secs via dot notation");

    assert_eq!(config.conflicts.prompt_interval_secs, 90);
}

/// Serialized defaults provide sensible values for all fields.
#[test]
fn serialized_defaults_are_sensible() {
    let config = WaymarkConfig::default();

    assert!(config.storage.database_path.ends_with("waymark.db"));
    assert!(config.storage.wal_mode);
    assert_eq!(config.flows.sweep_interval_secs, 0);
    assert_eq!(config.conflicts.prompt_interval_secs, 60);
    assert!(config.conflicts.audit_log_path.ends_with("flow_conflicts.log"));
}

/// Missing config files are silently skipped (Figment's Toml::file() behavior).
#[test]
fn missing_config_files_silently_skipped() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let config: WaymarkConfig = Figment::new()
        .merge(Serialized::defaults(WaymarkConfig::default()))
        .merge(Toml::file("/nonexistent/path/waymark.toml"))
        .extract()
        .expect("missing file should be silently skipped");

    // Should just get defaults
    assert_eq!(config.conflicts.prompt_interval_secs, 60);
}

/// Unexpected top-level section is rejected by deny_unknown_fields.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[logging]
level = "debug"
"#;

    let err = load_config_from_str(toml).expect_err("unknown top-level section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("logging"),
        "error should mention unknown field, got: {err_str}"
    );
}

// ============================================================================
// Diagnostic tests
// ============================================================================

/// Unknown key "wal_mod" in [storage] suggests "wal_mode".
#[test]
fn diagnostic_wal_mod_suggests_wal_mode() {
    let valid_keys = &["database_path", "wal_mode"];
    let suggestion = suggest_key("wal_mod", valid_keys);
    assert_eq!(suggestion, Some("wal_mode".to_string()));
}

/// Unknown key "sweep_interval_sec" in [flows] suggests the full key.
#[test]
fn diagnostic_sweep_interval_sec_suggests_full_key() {
    let valid_keys = &["sweep_interval_secs"];
    let suggestion = suggest_key("sweep_interval_sec", valid_keys);
    assert_eq!(suggestion, Some("sweep_interval_secs".to_string()));
}

/// Unknown key "zzzzzz" with no close match does NOT produce a suggestion.
#[test]
fn diagnostic_no_suggestion_for_distant_typo() {
    let valid_keys = &["database_path", "wal_mode"];
    let suggestion = suggest_key("zzzzzz", valid_keys);
    assert!(suggestion.is_none(), "should not suggest for distant typo");
}

/// Error output from load_and_validate_str includes the unknown key name.
#[test]
fn diagnostic_error_includes_unknown_key() {
    let toml = r#"
[storage]
databse_path = "flows.db"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    assert!(!errors.is_empty(), "should have at least one error");

    let has_unknown_key = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "databse_path"
                && suggestion.as_deref() == Some("database_path")
                && valid_keys.contains("database_path")
        })
    });
    assert!(
        has_unknown_key,
        "should have UnknownKey error for 'databse_path' with suggestion 'database_path', got: {errors:?}"
    );
}

/// Error output includes the list of valid keys for the section.
#[test]
fn diagnostic_error_includes_valid_keys() {
    let toml = r#"
[conflicts]
audit_log_pth = "conflicts.log"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let has_valid_keys = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { valid_keys, .. } if {
            valid_keys.contains("prompt_interval_secs") && valid_keys.contains("audit_log_path")
        })
    });
    assert!(
        has_valid_keys,
        "error should list valid keys for [conflicts] section"
    );
}

/// Invalid type (string where number expected) produces clear message.
#[test]
fn diagnostic_invalid_type_message() {
    let toml = r#"
[flows]
sweep_interval_secs = "not_a_number"
"#;

    let err = load_config_from_str(toml).expect_err("should reject invalid type");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("invalid type") || err_str.contains("sweep_interval_secs"),
        "error should mention type mismatch, got: {err_str}"
    );
}

/// ConfigError implements miette::Diagnostic (can be rendered).
#[test]
fn config_error_implements_diagnostic() {
    use miette::Diagnostic;

    let error = ConfigError::UnknownKey {
        key: "databse_path".to_string(),
        suggestion: Some("database_path".to_string()),
        valid_keys: "database_path, wal_mode".to_string(),
        span: None,
        src: None,
    };

    // Verify it implements Diagnostic
    let code = error.code();
    assert!(code.is_some(), "should have diagnostic code");

    let help = error.help();
    assert!(help.is_some(), "should have help text");
    let help_str = help.unwrap().to_string();
    assert!(
        help_str.contains("did you mean `database_path`"),
        "help should contain suggestion, got: {help_str}"
    );
}

/// ConfigError can be rendered using miette's graphical handler.
#[test]
fn config_error_renders_with_miette() {
    use miette::GraphicalReportHandler;

    let error = ConfigError::UnknownKey {
        key: "databse_path".to_string(),
        suggestion: Some("database_path".to_string()),
        valid_keys: "database_path, wal_mode".to_string(),
        span: None,
        src: None,
    };

    let handler = GraphicalReportHandler::new();
    let mut buf = String::new();
    handler
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(!buf.is_empty(), "rendered report should not be empty");
    assert!(
        buf.contains("databse_path"),
        "rendered report should mention the key"
    );
}

/// load_and_validate_str with valid TOML returns Ok config.
#[test]
fn load_and_validate_valid_toml() {
    let toml = r#"
[storage]
database_path = "/tmp/flows.db"
"#;

    let config = load_and_validate_str(toml).expect("valid TOML should validate");
    assert_eq!(config.storage.database_path, "/tmp/flows.db");
}

/// Validation catches a zero prompt interval.
#[test]
fn validation_catches_zero_prompt_interval() {
    let toml = r#"
[conflicts]
prompt_interval_secs = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("zero interval should fail");
    let has_validation_error = errors.iter().any(|e| {
        matches!(e, ConfigError::Validation { message } if message.contains("prompt_interval_secs"))
    });
    assert!(
        has_validation_error,
        "should have validation error for zero prompt interval"
    );
}
