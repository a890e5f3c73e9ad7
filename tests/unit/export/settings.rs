use super::*;

#[test]
fn defaults() {
    let s = ExportSettings::default();
    assert_eq!(s.supersample, 2);
    assert_eq!(s.decode_timeout, Duration::from_secs(30));
    assert_eq!(s.file_name, "year-recap.png");
    assert_eq!(s.background, ColorDef::WHITE);
    assert!(s.validate().is_ok());
}

#[test]
fn overrides_apply_only_when_valid() {
    let s = ExportSettings::default().with_overrides(Some(" 3 "), Some("1500"));
    assert_eq!(s.supersample, 3);
    assert_eq!(s.decode_timeout, Duration::from_millis(1500));

    let s = ExportSettings::default().with_overrides(Some("9"), Some("soon"));
    assert_eq!(s.supersample, 2);
    assert_eq!(s.decode_timeout, Duration::from_secs(30));

    let s = ExportSettings::default().with_overrides(Some("0"), Some("0"));
    assert_eq!(s, ExportSettings::default());
}

#[test]
fn validate_rejects_bad_values() {
    let s = ExportSettings {
        supersample: 0,
        ..ExportSettings::default()
    };
    assert!(s.validate().is_err());

    let s = ExportSettings {
        file_name: "  ".to_owned(),
        ..ExportSettings::default()
    };
    assert!(s.validate().is_err());
}
