use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Beam-search and repetition settings sent verbatim to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateParams {
    pub num_beams: u32,
    pub repetition_penalty: f64,
    pub no_repeat_ngram_size: u32,
    pub encoder_no_repeat_ngram_size: u32,
}

/// Automatic profile selection or explicit user-set parameters. The two
/// are mutually exclusive per request.
#[derive(Debug, Clone, PartialEq)]
pub enum TuningMode {
    Auto,
    Manual(GenerateParams),
}

impl TuningMode {
    /// Resolves to concrete parameters for `text`.
    pub fn resolve(&self, text: &str) -> GenerateParams {
        match self {
            TuningMode::Auto => auto_tune(text),
            TuningMode::Manual(params) => params.clone(),
        }
    }
}

static CODE_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[`{}();=<>]").expect("code punctuation pattern"));
static TECHNICAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)parameter|function|class|API|null|void|return")
        .expect("technical vocabulary pattern")
});

/// Classifies `text` into a generation profile, first match wins.
pub fn auto_tune(text: &str) -> GenerateParams {
    // Technical prose and code fragments repeat the worst under beam search.
    if CODE_LIKE.is_match(text) || TECHNICAL.is_match(text) {
        return GenerateParams {
            num_beams: 1,
            repetition_penalty: 1.1,
            no_repeat_ngram_size: 4,
            encoder_no_repeat_ngram_size: 4,
        };
    }

    let length = text.chars().count();

    // Long passages benefit from a wider beam.
    if length > 300 {
        return GenerateParams {
            num_beams: 4,
            repetition_penalty: 1.0,
            no_repeat_ngram_size: 3,
            encoder_no_repeat_ngram_size: 3,
        };
    }

    // Short sentences are most stable under greedy decoding.
    if length < 80 {
        return GenerateParams {
            num_beams: 1,
            repetition_penalty: 1.0,
            no_repeat_ngram_size: 2,
            encoder_no_repeat_ngram_size: 2,
        };
    }

    GenerateParams {
        num_beams: 2,
        repetition_penalty: 1.0,
        no_repeat_ngram_size: 3,
        encoder_no_repeat_ngram_size: 3,
    }
}
