use medscribe::pad::Color;
use medscribe::settings::Settings;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn missing_file_gives_defaults() {
    let dir = tempdir().unwrap();
    let settings = Settings::load(dir.path().join("settings.json")).unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.search_debounce(), Duration::from_millis(300));
    assert_eq!(settings.search_min_query_len, 2);
    assert_eq!(settings.notice_duration(), Duration::from_secs(5));
    assert!(settings.dispense_endpoint.is_none());
}

#[test]
fn partial_file_fills_remaining_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{"pen_width": 5.0, "recognizer": "mock_api"}"#).unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.pen_width, 5.0);
    assert_eq!(settings.recognizer, "mock_api");
    assert_eq!(settings.pad_size, [400.0, 200.0]);
    assert_eq!(settings.recognition_latency(), Duration::from_secs(2));
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let mut settings = Settings::default();
    settings.pen_color = [200, 10, 10, 255];
    settings.dispense_endpoint = Some("http://localhost:8000/dispense".into());
    settings.search_debounce_ms = 150;
    settings.save(&path).unwrap();

    let loaded = Settings::load(&path).unwrap();
    assert_eq!(loaded, settings);
    assert_eq!(loaded.pen_style().color, Color::rgba(200, 10, 10, 255));
}

#[test]
fn invalid_pen_width_falls_back() {
    let settings = Settings {
        pen_width: -1.0,
        ..Settings::default()
    };
    assert_eq!(settings.pen_style().width, 3.0);
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{not json").unwrap();
    assert!(Settings::load(&path).is_err());
}
