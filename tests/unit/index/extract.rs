use super::*;

#[test]
fn field_names_parse_case_insensitively() {
    assert_eq!(
        "datetime_original".parse::<TimestampField>().unwrap(),
        TimestampField::DatetimeOriginal
    );
    assert_eq!(
        "DateTime".parse::<TimestampField>().unwrap(),
        TimestampField::Datetime
    );
    assert_eq!(
        " file_modified ".parse::<TimestampField>().unwrap(),
        TimestampField::FileModified
    );
}

#[test]
fn unknown_field_lists_known_names() {
    let err = "gps_time".parse::<TimestampField>().unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("gps_time"));
    assert!(msg.contains("datetime_digitized"));
}

#[test]
fn display_matches_parse() {
    for f in TimestampField::ALL {
        assert_eq!(f.to_string().parse::<TimestampField>().unwrap(), f);
    }
}

#[test]
fn exif_datetime_parses_to_wall_clock_seconds() {
    assert_eq!(parse_exif_datetime(b"1970:01:01 00:01:05"), Some(65));
    assert_eq!(parse_exif_datetime(b"2000:01:01 00:00:00"), Some(946_684_800));
}

#[test]
fn zeroed_or_garbage_dates_are_rejected() {
    assert_eq!(parse_exif_datetime(b"0000:00:00 00:00:00"), None);
    assert_eq!(parse_exif_datetime(b"yesterday"), None);
}

#[test]
fn file_without_exif_reports_missing_metadata() {
    let dir = std::path::PathBuf::from("target").join("extract_no_exif");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("plain.jpg");
    std::fs::write(&path, b"not really a jpeg").unwrap();

    let err = MetadataExtractor
        .extract(&path, TimestampField::DatetimeOriginal)
        .unwrap_err();
    assert!(matches!(
        err,
        LapseError::MissingMetadata {
            field: TimestampField::DatetimeOriginal,
            ..
        }
    ));
}

#[test]
fn file_modified_uses_filesystem_time() {
    let dir = std::path::PathBuf::from("target").join("extract_mtime");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("a.jpg");
    std::fs::write(&path, b"x").unwrap();
    let when = std::time::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000);
    std::fs::File::options()
        .write(true)
        .open(&path)
        .unwrap()
        .set_modified(when)
        .unwrap();

    let ts = MetadataExtractor
        .extract(&path, TimestampField::FileModified)
        .unwrap();
    assert_eq!(ts, 1_000_000);
}
