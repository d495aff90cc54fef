use crate::job::Job;

/// Last-write-wins intake buffer between "a job arrived" and "a job was
/// accepted for execution".
///
/// This is deliberately not a FIFO: enqueuing replaces whatever is pending,
/// and a replaced job is never executed.
#[derive(Debug, Default)]
pub struct JobQueue {
    slot: Option<Job>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the pending job with `job`, returning the job it displaced
    /// (for diagnostics).
    pub fn enqueue(&mut self, job: Job) -> Option<Job> {
        self.slot.replace(job)
    }

    /// Takes the most recent job, leaving the queue empty.
    pub fn drain(&mut self) -> Option<Job> {
        self.slot.take()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub fn len(&self) -> usize {
        usize::from(self.slot.is_some())
    }
}
