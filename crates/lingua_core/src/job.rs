use crate::tuning::TuningMode;

/// Why a translation was requested. Diagnostic only; routing never depends
/// on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// Debounced/throttled input change.
    Auto,
    /// Explicit translate button.
    Manual,
    /// Source or target language selection changed.
    LangChange,
    /// Language pair (and possibly input/result) swapped.
    Swap,
    /// Auto-detect checkbox toggled.
    AutoDetectToggle,
    /// A file was uploaded for translation.
    FileUpload,
}

impl Reason {
    pub fn as_str(self) -> &'static str {
        match self {
            Reason::Auto => "auto",
            Reason::Manual => "manual",
            Reason::LangChange => "lang-change",
            Reason::Swap => "swap",
            Reason::AutoDetectToggle => "auto-detect-toggle",
            Reason::FileUpload => "file-upload",
        }
    }
}

/// Form state captured at trigger time. The embedding surface passes this
/// in; nothing here reads widgets.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSnapshot {
    pub text: String,
    pub auto_detect: bool,
    pub source: String,
    pub target: String,
    pub tuning: TuningMode,
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self {
            text: String::new(),
            auto_detect: true,
            source: "en".to_string(),
            target: "zh".to_string(),
            tuning: TuningMode::Auto,
        }
    }
}

/// A single requested translation unit. Immutable once built; consumed at
/// most once by the lifecycle, discarded when superseded.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub text: String,
    pub auto_detect: bool,
    /// Ignored by the service when `auto_detect` is set.
    pub manual_source: String,
    pub target: String,
    pub reason: Reason,
    pub tuning: TuningMode,
}

impl Job {
    /// Builds a job from the captured form state. Returns `None` when the
    /// trimmed input is empty; callers treat that as the cancel path.
    pub fn from_snapshot(input: &InputSnapshot, reason: Reason) -> Option<Self> {
        let text = input.text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            auto_detect: input.auto_detect,
            manual_source: input.source.clone(),
            target: input.target.clone(),
            reason,
            tuning: input.tuning.clone(),
        })
    }

    /// Job stand-in for an uploaded file; the file name doubles as the
    /// display text and the source language is fixed.
    pub fn for_file(file_name: &str, target: &str) -> Self {
        Self {
            text: file_name.to_string(),
            auto_detect: false,
            manual_source: "en".to_string(),
            target: target.to_string(),
            reason: Reason::FileUpload,
            tuning: TuningMode::Auto,
        }
    }
}
