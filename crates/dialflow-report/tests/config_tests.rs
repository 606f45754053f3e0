//! Mapping configuration parsing.

use dialflow_report::prelude::*;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[test]
fn test_parse_device_mapping_json() -> TestResult {
    let json = r#"{
        "buttons": { "1:8": "TopLeft", "1:16": "TopRight", "2": "Thumb" },
        "scrollWheels": { "6": "Scroll", "7": "Jog" }
    }"#;
    let config: DecoderConfig = serde_json::from_str(json)?;

    assert_eq!(config.buttons.resolve(1, 8), Some("TopLeft"));
    assert_eq!(config.buttons.resolve(1, 16), Some("TopRight"));
    assert_eq!(config.buttons.resolve(2, 99), Some("Thumb"));
    assert_eq!(config.scroll_wheels.get(7), Some("Jog"));
    Ok(())
}

#[test]
fn test_missing_sections_default_to_empty() -> TestResult {
    let config: DecoderConfig = serde_json::from_str(r#"{ "scrollWheels": { "0": "Main" } }"#)?;
    assert!(config.buttons.is_empty());
    assert_eq!(config.scroll_wheels.len(), 1);

    let config: DecoderConfig = serde_json::from_str("{}")?;
    assert_eq!(config, DecoderConfig::default());
    Ok(())
}

#[test]
fn test_invalid_key_is_rejected() {
    let result: Result<DecoderConfig, _> =
        serde_json::from_str(r#"{ "buttons": { "first": "X" } }"#);
    assert!(result.is_err());

    let result: Result<DecoderConfig, _> =
        serde_json::from_str(r#"{ "buttons": { "1:256": "X" } }"#);
    assert!(result.is_err());
}

#[test]
fn test_mapping_serializes_back_to_string_keys() -> TestResult {
    let json = serde_json::to_value(DecoderConfig::mx_dialpad())?;
    assert_eq!(json["buttons"]["1:64"], "BottomRight");
    assert_eq!(json["scrollWheels"]["6"], "Scroll");
    Ok(())
}
