use textpane_config::{EditorConfig, FontConfig};

#[test]
fn test_load_creates_default_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("textpane.json");
    assert!(!path.exists());

    let config = EditorConfig::load_or_create(&path);
    assert!(path.exists());
    assert_eq!(config, EditorConfig::default());

    // File should contain valid JSON
    let contents = std::fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["max_line_len"], 8192);
}

#[test]
fn test_load_existing_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("textpane.json");
    let json = r#"{
        "word_wrap": true,
        "max_line_len": 100,
        "tab_width_chars": 4,
        "font": { "char_width": 10, "line_height": 20 }
    }"#;
    std::fs::write(&path, json).unwrap();

    let config = EditorConfig::load_or_create(&path);
    assert!(config.word_wrap);
    assert_eq!(config.max_line_len, 100);
    assert_eq!(config.tab_width_chars, 4);
    assert_eq!(config.font, FontConfig { char_width: 10, line_height: 20 });
    assert_eq!(config.wheel_lines, 3);
}

#[test]
fn test_broken_json_returns_defaults_and_keeps_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("textpane.json");
    std::fs::write(&path, "{ this is not valid json }}}").unwrap();

    let config = EditorConfig::load_or_create(&path);
    assert_eq!(config, EditorConfig::default());
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "{ this is not valid json }}}"
    );
}

#[test]
fn test_load_reports_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("textpane.json");
    std::fs::write(&path, "[1, 2").unwrap();

    let err = EditorConfig::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse config"));
}

#[test]
fn test_save_then_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("textpane.json");

    let config = EditorConfig {
        word_wrap: true,
        undo_block_size: 50,
        max_undo_depth: 0,
        overwrite: true,
        ..Default::default()
    };
    config.save(&path).unwrap();

    let loaded = EditorConfig::load_or_create(&path);
    assert_eq!(loaded, config);
}

#[test]
fn test_sanitize_clamps_values_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("textpane.json");
    let json = r#"{
        "max_line_len": 0,
        "buffer_growth": 0,
        "wheel_lines": -2,
        "font": { "char_width": -1 }
    }"#;
    std::fs::write(&path, json).unwrap();

    let config = EditorConfig::load_or_create(&path);
    assert_eq!(config.max_line_len, 1);
    assert_eq!(config.buffer_growth, 1);
    assert_eq!(config.wheel_lines, 0);
    assert_eq!(config.font.char_width, 1);
}

#[test]
fn test_save_into_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("textpane.json");
    assert!(EditorConfig::default().save(&path).is_err());
    // Loading still yields defaults.
    assert_eq!(EditorConfig::load_or_create(&path), EditorConfig::default());
}
