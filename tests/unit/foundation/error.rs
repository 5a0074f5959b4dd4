use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        LapseError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(LapseError::render("x").to_string().contains("render error:"));
    assert!(
        LapseError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn missing_metadata_names_field_and_path() {
    let err = LapseError::missing_metadata("photos/a.jpg", TimestampField::DatetimeOriginal);
    let msg = err.to_string();
    assert!(msg.contains("datetime_original"));
    assert!(msg.contains("photos/a.jpg"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = LapseError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
