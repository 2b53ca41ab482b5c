use std::fs;
use std::path::Path;

use eegannot::{annotation_path_for, AnnotError, AnnotationStore, RecordingInfo, ValidationFailure};

fn cleanup_test_file(filename: &str) {
    if Path::new(filename).exists() {
        fs::remove_file(filename).ok();
    }
}

fn test_recording(duration: f64) -> RecordingInfo {
    RecordingInfo {
        id: "subject01.edf".to_string(),
        channel_names: vec!["Fp1".to_string(), "Fp2".to_string()],
        sample_rate: 256.0,
        duration,
    }
}

#[test]
fn test_save_load_round_trip() {
    let filename = "test_round_trip_annotations.json";
    let recording = test_recording(120.0);

    // Save phase
    {
        let mut store = AnnotationStore::new(&recording);
        store.add(42.0, 44.5, "Artifact", None).unwrap();
        store.add(10.0, 15.0, "Spike", Some("Fp1")).unwrap();
        store.add(99.9, 99.9, "Blink", None).unwrap();
        store.save(filename).unwrap();
        assert!(!store.is_dirty());
    }

    // Load phase - fresh store, same recording
    {
        let mut store = AnnotationStore::new(&recording);
        let report = store.load(filename).unwrap();

        assert_eq!(report.loaded, 3);
        assert!(report.skipped.is_empty());
        assert!(report.duration_mismatch.is_none());
        assert!(report.is_clean());

        let entries: Vec<(f64, f64, &str, Option<&str>)> = store
            .list()
            .iter()
            .map(|e| {
                (
                    e.annotation.start,
                    e.annotation.end,
                    e.annotation.label.as_str(),
                    e.annotation.channel.as_deref(),
                )
            })
            .collect();
        assert_eq!(
            entries,
            vec![
                (10.0, 15.0, "Spike", Some("Fp1")),
                (42.0, 44.5, "Artifact", None),
                (99.9, 99.9, "Blink", None),
            ]
        );
    }

    cleanup_test_file(filename);
}

#[test]
fn test_round_trip_preserves_creation_timestamps() {
    let filename = "test_timestamp_annotations.json";
    let recording = test_recording(120.0);

    let created = {
        let mut store = AnnotationStore::new(&recording);
        store.add(10.0, 15.0, "Spike", None).unwrap();
        store.save(filename).unwrap();
        store.list()[0].annotation.created
    };

    let mut store = AnnotationStore::new(&recording);
    store.load(filename).unwrap();
    assert_eq!(store.list()[0].annotation.created, created);

    cleanup_test_file(filename);
}

#[test]
fn test_duration_mismatch_is_warning_not_failure() {
    let filename = "test_mismatch_annotations.json";

    // Saved against a 60 s recording
    {
        let mut store = AnnotationStore::new(&test_recording(60.0));
        store.add(10.0, 15.0, "Spike", None).unwrap();
        store.save(filename).unwrap();
    }

    // Loaded against a 120 s recording: records come back, mismatch reported
    {
        let mut store = AnnotationStore::new(&test_recording(120.0));
        let report = store.load(filename).unwrap();

        assert_eq!(report.duration_mismatch, Some((60.0, 120.0)));
        assert!(!report.is_clean());
        assert_eq!(report.loaded, 1);
        assert_eq!(store.len(), 1);
    }

    cleanup_test_file(filename);
}

#[test]
fn test_out_of_range_records_skipped_and_reported() {
    let filename = "test_partial_load_annotations.json";

    // Saved against a long recording
    {
        let mut store = AnnotationStore::new(&test_recording(300.0));
        store.add(10.0, 15.0, "fits", None).unwrap();
        store.add(100.0, 250.0, "too long", None).unwrap();
        store.add(280.0, 290.0, "way out", None).unwrap();
        store.save(filename).unwrap();
    }

    // Loaded against a much shorter one: bad records skipped, not fatal
    {
        let mut store = AnnotationStore::new(&test_recording(120.0));
        let report = store.load(filename).unwrap();

        assert_eq!(report.loaded, 1);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].annotation.label, "fits");

        for skipped in &report.skipped {
            assert!(matches!(
                skipped.reason,
                ValidationFailure::EndPastDuration { .. }
            ));
        }
        let skipped_labels: Vec<&str> = report
            .skipped
            .iter()
            .map(|s| s.annotation.label.as_str())
            .collect();
        assert_eq!(skipped_labels, vec!["too long", "way out"]);

        // In-memory state no longer matches the file on disk
        assert!(store.is_dirty());
    }

    cleanup_test_file(filename);
}

#[test]
fn test_load_replaces_existing_collection() {
    let filename = "test_replace_annotations.json";
    let recording = test_recording(120.0);

    {
        let mut store = AnnotationStore::new(&recording);
        store.add(10.0, 15.0, "from file", None).unwrap();
        store.save(filename).unwrap();
    }

    let mut store = AnnotationStore::new(&recording);
    store.add(50.0, 60.0, "pre-existing", None).unwrap();
    store.load(filename).unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(store.list()[0].annotation.label, "from file");

    cleanup_test_file(filename);
}

#[test]
fn test_unparseable_file_is_format_error() {
    let filename = "test_garbage_annotations.json";
    fs::write(filename, "this is not json {{{").unwrap();

    let mut store = AnnotationStore::new(&test_recording(120.0));
    let err = store.load(filename).unwrap_err();
    assert!(matches!(err, AnnotError::Format(_)));

    // Failed load leaves the collection alone
    assert!(store.is_empty());
    assert!(!store.is_dirty());

    cleanup_test_file(filename);
}

#[test]
fn test_valid_json_wrong_shape_is_format_error() {
    let filename = "test_wrong_shape_annotations.json";
    fs::write(filename, r#"{"annotations": "nope"}"#).unwrap();

    let mut store = AnnotationStore::new(&test_recording(120.0));
    let err = store.load(filename).unwrap_err();
    assert!(matches!(err, AnnotError::Format(_)));

    cleanup_test_file(filename);
}

#[test]
fn test_missing_file_is_io_error() {
    let mut store = AnnotationStore::new(&test_recording(120.0));
    let err = store.load("no_such_annotations.json").unwrap_err();
    assert!(matches!(err, AnnotError::Io(_)));
}

#[test]
fn test_failed_load_keeps_collection() {
    let filename = "test_keep_on_fail_annotations.json";
    fs::write(filename, "][").unwrap();

    let mut store = AnnotationStore::new(&test_recording(120.0));
    store.add(10.0, 15.0, "survivor", None).unwrap();

    assert!(store.load(filename).is_err());
    assert_eq!(store.len(), 1);
    assert_eq!(store.list()[0].annotation.label, "survivor");

    cleanup_test_file(filename);
}

#[test]
fn test_file_written_by_external_tool_loads() {
    // Hand-written JSON in the documented schema, not produced by save()
    let filename = "test_external_annotations.json";
    fs::write(
        filename,
        r#"{
            "recording": "subject01.edf",
            "duration": 120.0,
            "exportTimestamp": "2026-08-29T10:00:00Z",
            "annotations": [
                {
                    "startTime": 10.0,
                    "endTime": 15.0,
                    "label": "Spike",
                    "channel": "Fp1",
                    "timestamp": "2026-08-29T09:59:00Z"
                },
                {
                    "startTime": 30.0,
                    "endTime": 30.0,
                    "label": "Blink",
                    "timestamp": "2026-08-29T09:59:30Z"
                }
            ]
        }"#,
    )
    .unwrap();

    let mut store = AnnotationStore::new(&test_recording(120.0));
    let report = store.load(filename).unwrap();

    assert!(report.is_clean());
    assert_eq!(store.len(), 2);
    assert_eq!(store.list()[0].annotation.channel.as_deref(), Some("Fp1"));
    // Absent channel key means all channels
    assert_eq!(store.list()[1].annotation.channel, None);

    cleanup_test_file(filename);
}

#[test]
fn test_save_overwrites_previous_file() {
    let filename = "test_overwrite_annotations.json";
    let recording = test_recording(120.0);

    let mut store = AnnotationStore::new(&recording);
    store.add(10.0, 15.0, "v1", None).unwrap();
    store.save(filename).unwrap();

    store.clear();
    store.add(20.0, 25.0, "v2", None).unwrap();
    store.save(filename).unwrap();

    let mut fresh = AnnotationStore::new(&recording);
    fresh.load(filename).unwrap();
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh.list()[0].annotation.label, "v2");

    cleanup_test_file(filename);
}

#[test]
fn test_annotation_path_for_companion_file() {
    assert_eq!(
        annotation_path_for("data/subject01.edf"),
        Path::new("data/subject01_annotations.json")
    );
}
