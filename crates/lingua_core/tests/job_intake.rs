use lingua_core::{sanitize_for_transport, InputSnapshot, Job, Reason, TuningMode};

#[test]
fn snapshot_text_is_trimmed() {
    lingua_logging::initialize_for_tests();

    let input = InputSnapshot {
        text: "  bonjour le monde \n".to_string(),
        ..InputSnapshot::default()
    };
    let job = Job::from_snapshot(&input, Reason::Manual).expect("non-empty input");
    assert_eq!(job.text, "bonjour le monde");
    assert_eq!(job.reason, Reason::Manual);
}

#[test]
fn whitespace_only_input_yields_no_job() {
    let input = InputSnapshot {
        text: "   \n\t".to_string(),
        ..InputSnapshot::default()
    };
    assert!(Job::from_snapshot(&input, Reason::Auto).is_none());
}

#[test]
fn snapshot_languages_and_tuning_are_captured() {
    let input = InputSnapshot {
        text: "hola".to_string(),
        auto_detect: false,
        source: "es".to_string(),
        target: "de".to_string(),
        tuning: TuningMode::Auto,
    };
    let job = Job::from_snapshot(&input, Reason::LangChange).expect("non-empty input");
    assert!(!job.auto_detect);
    assert_eq!(job.manual_source, "es");
    assert_eq!(job.target, "de");
}

#[test]
fn file_jobs_carry_the_file_name() {
    let job = Job::for_file("report.txt", "fr");
    assert_eq!(job.text, "report.txt");
    assert_eq!(job.target, "fr");
    assert_eq!(job.reason, Reason::FileUpload);
    assert!(!job.auto_detect);
}

#[test]
fn sanitize_strips_unicode_separators_only() {
    let text = "line one\u{2028}line two\u{2029}line three\nline four";
    assert_eq!(
        sanitize_for_transport(text),
        "line oneline twoline three\nline four"
    );
}
