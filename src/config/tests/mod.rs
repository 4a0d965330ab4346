//! Unit tests for config module
//!
//! Tests configuration types, defaults, and serialization.
//! No filesystem dependencies - all in-memory.

#![allow(clippy::panic, clippy::unwrap_used)]

use std::time::Duration;

use crate::PlayctlError;
use crate::config::{Config, LogLevel};

#[test]
fn config_default() {
    let config = Config::default();

    assert_eq!(config.general.log_level, LogLevel::Info);
    assert_eq!(config.playback.seek_delta_ms, 30_000);
    assert_eq!(config.playback.poll_interval_ms, 1000);
    assert!(config.playback.restore_last_played);
}

#[test]
fn config_serialize_toml() {
    let toml_str = Config::default().to_toml_string().unwrap();

    assert!(toml_str.contains("[general]"));
    assert!(toml_str.contains("[playback]"));
    assert!(toml_str.contains("seek_delta_ms = 30000"));
}

#[test]
fn config_partial_playback_section_keeps_other_defaults() {
    let config = Config::from_toml_str(
        r#"
        [playback]
        seek_delta_ms = 10000
        "#,
        None,
    )
    .unwrap();

    assert_eq!(config.playback.seek_delta_ms, 10_000);
    assert_eq!(config.playback.poll_interval(), Duration::from_secs(1));
    assert!(config.playback.restore_last_played);
}

#[test]
fn config_log_level_lowercase() {
    let config = Config::from_toml_str(
        r#"
        [general]
        log_level = "debug"
        "#,
        None,
    )
    .unwrap();

    assert_eq!(config.general.log_level, LogLevel::Debug);
    assert_eq!(config.general.log_level.to_string(), "debug");
}

#[test]
fn config_rejects_non_positive_seek_delta() {
    let err = Config::from_toml_str(
        r#"
        [playback]
        seek_delta_ms = 0
        "#,
        None,
    )
    .unwrap_err();

    match err {
        PlayctlError::InvalidConfigField { field, .. } => {
            assert_eq!(field, "playback.seek_delta_ms");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn config_invalid_toml_reports_string_location() {
    let err = Config::from_toml_str("[playback\nseek_delta_ms = ", None).unwrap_err();

    match err {
        PlayctlError::TomlParseError { location, .. } => assert_eq!(location, "string"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn zero_poll_interval_is_clamped() {
    let config = Config::from_toml_str(
        r#"
        [playback]
        poll_interval_ms = 0
        "#,
        None,
    )
    .unwrap();

    assert_eq!(config.playback.poll_interval(), Duration::from_millis(1));
}

#[test]
fn config_serialize_roundtrip() {
    let original = Config::default();

    let toml_str = original.to_toml_string().unwrap();
    let deserialized = Config::from_toml_str(&toml_str, None).unwrap();

    assert_eq!(original, deserialized);
}
