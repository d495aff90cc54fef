use lingua_core::{HistoryEntry, HistoryLog, HISTORY_CAPACITY};

fn entry(text: &str) -> HistoryEntry {
    HistoryEntry {
        text: text.to_string(),
        result: format!("{text}-translated"),
        source: "en".to_string(),
        target: "zh".to_string(),
        cost_secs: "1.25".to_string(),
        recorded_utc: "2026-01-01T00:00:00Z".to_string(),
    }
}

#[test]
fn entries_are_newest_first() {
    let mut log = HistoryLog::new();
    log.push(entry("old"));
    log.push(entry("new"));

    let texts: Vec<_> = log.entries().iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["new", "old"]);
}

#[test]
fn capacity_drops_the_oldest_entries() {
    let mut log = HistoryLog::new();
    for i in 0..(HISTORY_CAPACITY + 5) {
        log.push(entry(&format!("entry-{i}")));
    }

    assert_eq!(log.len(), HISTORY_CAPACITY);
    // The newest survives, the first five pushed are gone.
    assert_eq!(log.entries()[0].text, format!("entry-{}", HISTORY_CAPACITY + 4));
    assert!(log.entries().iter().all(|e| e.text != "entry-0"));
}

#[test]
fn from_entries_enforces_the_cap() {
    let entries: Vec<_> = (0..(HISTORY_CAPACITY + 20))
        .map(|i| entry(&format!("entry-{i}")))
        .collect();
    let log = HistoryLog::from_entries(entries);
    assert_eq!(log.len(), HISTORY_CAPACITY);
}

#[test]
fn clear_empties_the_log() {
    let mut log = HistoryLog::new();
    log.push(entry("only"));
    log.clear();
    assert!(log.is_empty());
}
