use lingua_core::{auto_tune, GenerateParams, TuningMode};
use pretty_assertions::assert_eq;

#[test]
fn code_like_text_gets_repetition_penalty() {
    let params = auto_tune("let x = foo(bar);");
    assert_eq!(params.num_beams, 1);
    assert_eq!(params.repetition_penalty, 1.1);
    assert_eq!(params.no_repeat_ngram_size, 4);
    assert_eq!(params.encoder_no_repeat_ngram_size, 4);
}

#[test]
fn technical_vocabulary_matches_case_insensitively() {
    let lower = auto_tune("the api accepts one parameter");
    let upper = auto_tune("the API accepts one PARAMETER");
    assert_eq!(lower.repetition_penalty, 1.1);
    assert_eq!(lower, upper);
}

#[test]
fn long_plain_text_widens_the_beam() {
    let text = "la lala ".repeat(50);
    assert!(text.chars().count() > 300);
    let params = auto_tune(&text);
    assert_eq!(params.num_beams, 4);
    assert_eq!(params.no_repeat_ngram_size, 3);
}

#[test]
fn short_plain_text_decodes_greedily() {
    let params = auto_tune("hello there my friend");
    assert_eq!(params.num_beams, 1);
    assert_eq!(params.repetition_penalty, 1.0);
    assert_eq!(params.no_repeat_ngram_size, 2);
}

#[test]
fn medium_plain_text_uses_the_balanced_profile() {
    let text = "la lala ".repeat(20);
    let count = text.chars().count();
    assert!(count >= 80 && count <= 300);
    let params = auto_tune(&text);
    assert_eq!(params.num_beams, 2);
    assert_eq!(params.no_repeat_ngram_size, 3);
}

#[test]
fn code_classification_wins_over_length() {
    // Short, but the braces decide the profile first.
    let params = auto_tune("{}");
    assert_eq!(params.num_beams, 1);
    assert_eq!(params.repetition_penalty, 1.1);
}

#[test]
fn manual_mode_bypasses_the_selector() {
    let manual = GenerateParams {
        num_beams: 8,
        repetition_penalty: 1.5,
        no_repeat_ngram_size: 5,
        encoder_no_repeat_ngram_size: 5,
    };
    let resolved = TuningMode::Manual(manual.clone()).resolve("let x = foo();");
    assert_eq!(resolved, manual);
}

#[test]
fn auto_mode_resolves_through_the_selector() {
    let resolved = TuningMode::Auto.resolve("hello");
    assert_eq!(resolved, auto_tune("hello"));
}
