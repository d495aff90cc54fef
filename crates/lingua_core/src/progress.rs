use std::time::Duration;

/// Snapshot emitted for display on every poll tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressView {
    pub current_sentence: u32,
    pub total_sentences: u32,
    pub elapsed_secs: f64,
    pub eta_secs: f64,
}

/// Converts sparse percentage samples into a current-sentence index and a
/// countdown ETA. Rebuilt for every task.
///
/// The ETA is fixed once, from the first non-zero sample, as an
/// average-per-sentence extrapolation, then decremented by wall-clock
/// deltas. It is never recomputed from a later percentage, so the display
/// does not jump when throughput is uneven.
#[derive(Debug, Default)]
pub struct ProgressEstimator {
    total_sentences: Option<u32>,
    initial_eta: Option<f64>,
    last_sample: Option<Duration>,
}

impl ProgressEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears per-task state ahead of a new task.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Feeds one poll sample. `percent` is the server-reported completion
    /// (0-100), `total_sentences` its sentence count if it sent one, and
    /// `elapsed` the wall time since the task started.
    pub fn sample(
        &mut self,
        percent: f64,
        total_sentences: Option<u32>,
        elapsed: Duration,
    ) -> ProgressView {
        if self.total_sentences.is_none() {
            if let Some(total) = total_sentences {
                self.total_sentences = Some(total.max(1));
            }
        }
        // A server that never reports a total pins the display to 1/1:
        // "in progress" without a countdown.
        let total = self.total_sentences.unwrap_or(1);
        let current = ((f64::from(total) * percent / 100.0).ceil() as u32).clamp(1, total);

        if self.initial_eta.is_none() && percent > 0.0 {
            let avg_per_sentence = elapsed.as_secs_f64() / f64::from(current);
            let remaining = f64::from(total - current);
            self.initial_eta = Some((remaining * avg_per_sentence).max(0.0));
        }

        let mut eta = 0.0;
        if let Some(initial) = self.initial_eta {
            let last = self.last_sample.unwrap_or(elapsed);
            let delta = elapsed.saturating_sub(last).as_secs_f64();
            eta = (initial - delta).max(0.0);
            self.initial_eta = Some(eta);
        }
        self.last_sample = Some(elapsed);

        ProgressView {
            current_sentence: current,
            total_sentences: total,
            elapsed_secs: elapsed.as_secs_f64(),
            eta_secs: eta,
        }
    }
}
