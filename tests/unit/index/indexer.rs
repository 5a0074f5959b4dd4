use std::collections::HashMap;

use super::*;

struct FakeExtractor(HashMap<&'static str, UnixSeconds>);

impl TimestampExtractor for FakeExtractor {
    fn extract(&self, source: &Path, field: TimestampField) -> LapseResult<UnixSeconds> {
        let name = source.file_name().and_then(|n| n.to_str()).unwrap_or("");
        self.0
            .get(name)
            .copied()
            .ok_or_else(|| LapseError::missing_metadata(source, field))
    }
}

fn scratch(name: &str, files: &[&str]) -> PathBuf {
    let dir = PathBuf::from("target").join("indexer_tests").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    for f in files {
        std::fs::write(dir.join(f), b"x").unwrap();
    }
    dir
}

#[test]
fn directory_roots_are_filtered_and_sorted_by_name() {
    let dir = scratch("sorted", &["b.JPG", "a.jpg", "c.png", "d.jpeg"]);
    std::fs::create_dir_all(dir.join("nested.jpg")).unwrap();

    let got = enumerate_sources(&[&dir], &IndexOptions::default().extensions).unwrap();
    let names: Vec<_> = got
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["a.jpg", "b.JPG", "d.jpeg"]);
}

#[test]
fn roots_are_visited_in_given_order() {
    let first = scratch("order_first", &["z.jpg"]);
    let second = scratch("order_second", &["a.jpg"]);
    let got = enumerate_sources(&[&first, &second], &IndexOptions::default().extensions).unwrap();
    assert_eq!(got, vec![first.join("z.jpg"), second.join("a.jpg")]);
}

#[test]
fn file_roots_are_taken_as_is() {
    let dir = scratch("file_root", &["shot.raw"]);
    let file = dir.join("shot.raw");
    let got = enumerate_sources(&[&file], &IndexOptions::default().extensions).unwrap();
    assert_eq!(got, vec![file]);
}

#[test]
fn index_keeps_traversal_order_and_applies_offset() {
    let dir = scratch("offset", &["a.jpg", "b.jpg", "c.jpg"]);
    let extractor = FakeExtractor(HashMap::from([("a.jpg", 100), ("b.jpg", 50), ("c.jpg", 200)]));
    let indexer = FrameIndexer::new(
        extractor,
        IndexOptions {
            offset_secs: -10,
            ..IndexOptions::default()
        },
    );

    let frames = indexer.index(&[&dir]).unwrap();
    let stamps: Vec<_> = frames.iter().map(|f| f.timestamp).collect();
    assert_eq!(stamps, vec![90, 40, 190]);
    assert_eq!(frames[1].source, dir.join("b.jpg"));
}

#[test]
fn missing_field_aborts_the_run() {
    let dir = scratch("missing", &["a.jpg", "b.jpg"]);
    let indexer = FrameIndexer::new(
        FakeExtractor(HashMap::from([("a.jpg", 1)])),
        IndexOptions::default(),
    );
    let err = indexer.index(&[&dir]).unwrap_err();
    match err {
        LapseError::MissingMetadata { path, field } => {
            assert_eq!(path, dir.join("b.jpg"));
            assert_eq!(field, TimestampField::DatetimeOriginal);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn probe_reports_first_and_last_in_traversal_order() {
    let dir = scratch("probe", &["a.jpg", "b.jpg", "c.jpg"]);
    let indexer = FrameIndexer::new(
        FakeExtractor(HashMap::from([("a.jpg", 30), ("b.jpg", 10), ("c.jpg", 20)])),
        IndexOptions::default(),
    );
    let span = indexer.probe(&[&dir]).unwrap();
    assert_eq!(
        span,
        IndexSpan {
            frames: 3,
            first: 30,
            last: 20
        }
    );
}

#[test]
fn probe_of_empty_input_is_an_error() {
    let dir = scratch("probe_empty", &[]);
    let indexer = FrameIndexer::new(FakeExtractor(HashMap::new()), IndexOptions::default());
    assert!(matches!(
        indexer.probe(&[&dir]),
        Err(LapseError::Validation(_))
    ));
}
