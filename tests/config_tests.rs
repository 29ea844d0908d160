// SPDX-License-Identifier: GPL-3.0-only

//! Configuration serialization and default tests

use blackspot::constants;
use blackspot::Config;

#[test]
fn test_defaults_match_constants() {
    let config = Config::default();

    assert_eq!(config.device, constants::DEFAULT_DEVICE);
    assert_eq!(config.width, constants::FRAME_WIDTH);
    assert_eq!(config.height, constants::FRAME_HEIGHT);
    assert_eq!(config.threshold, constants::BLACK_THRESHOLD);
    assert_eq!(config.min_blob_area, constants::MIN_BLACK_AREA);
    assert_eq!(config.warm_up_ms, constants::WARM_UP.as_millis() as u64);
    assert!(config.leds_enabled);
}

#[test]
fn test_default_threshold_is_valid() {
    assert!(Config::default().threshold.validate().is_ok());
}

#[test]
fn test_json_round_trip() {
    let config = Config {
        device: "/dev/video2".to_string(),
        min_blob_area: 500,
        leds_enabled: false,
        ..Config::default()
    };

    let json = serde_json::to_string_pretty(&config).unwrap();
    let restored: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, config);
}

#[test]
fn test_partial_config_fills_defaults() {
    // Older or hand-edited config files may omit fields
    let config: Config = serde_json::from_str(r#"{"min_blob_area": 2500}"#).unwrap();

    assert_eq!(config.min_blob_area, 2500);
    assert_eq!(config.device, constants::DEFAULT_DEVICE);
    assert_eq!(config.threshold, constants::BLACK_THRESHOLD);
}

#[test]
fn test_threshold_json_shape() {
    let json = serde_json::to_string(&Config::default().threshold).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["l_min"], 0);
    assert_eq!(value["l_max"], 40);
    assert_eq!(value["a_min"], -10);
    assert_eq!(value["a_max"], 10);
    assert_eq!(value["b_min"], -10);
    assert_eq!(value["b_max"], 10);
}
