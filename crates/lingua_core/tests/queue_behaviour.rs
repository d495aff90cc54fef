use lingua_core::{InputSnapshot, Job, JobQueue, Reason};

fn job(text: &str, reason: Reason) -> Job {
    let input = InputSnapshot {
        text: text.to_string(),
        ..InputSnapshot::default()
    };
    Job::from_snapshot(&input, reason).expect("non-empty job")
}

#[test]
fn drain_returns_only_the_most_recent_job() {
    let mut queue = JobQueue::new();
    queue.enqueue(job("first", Reason::Auto));
    queue.enqueue(job("second", Reason::Auto));
    queue.enqueue(job("third", Reason::Manual));

    let drained = queue.drain().expect("one pending job");
    assert_eq!(drained.text, "third");
    assert_eq!(drained.reason, Reason::Manual);

    // Superseded jobs were discarded, not deferred.
    assert!(queue.drain().is_none());
    assert!(queue.is_empty());
}

#[test]
fn enqueue_reports_the_displaced_job() {
    let mut queue = JobQueue::new();
    assert!(queue.enqueue(job("first", Reason::Auto)).is_none());

    let displaced = queue.enqueue(job("second", Reason::LangChange));
    assert_eq!(displaced.expect("displaced job").text, "first");
    assert_eq!(queue.len(), 1);
}

#[test]
fn drained_queue_accepts_new_work() {
    let mut queue = JobQueue::new();
    queue.enqueue(job("first", Reason::Auto));
    queue.drain();

    queue.enqueue(job("later", Reason::Swap));
    assert_eq!(queue.drain().expect("pending job").text, "later");
}
