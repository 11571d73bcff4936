//! Concurrent ingestion against a shared counter.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{sync::Arc, thread};

use {
    chatrank_activity::{ActivityCounter, CounterSettings, Dispatch},
    chrono::{DateTime, TimeDelta, Utc},
};

const THREADS: usize = 8;
const MESSAGES_PER_THREAD: usize = 250;

fn counter() -> Arc<ActivityCounter> {
    Arc::new(ActivityCounter::new(CounterSettings {
        trigger_keyword: "#rank".into(),
        result_limit: THREADS,
        retention: TimeDelta::hours(1),
    }))
}

#[test]
fn concurrent_appends_lose_nothing() {
    let counter = counter();
    let now = DateTime::<Utc>::UNIX_EPOCH;

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let counter = Arc::clone(&counter);
            thread::spawn(move || {
                let sender = format!("sender-{t}");
                for _ in 0..MESSAGES_PER_THREAD {
                    counter.handle_text("shared", &sender, "abc", now);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(counter.ledger_len("shared"), THREADS * MESSAGES_PER_THREAD);
    let ranked = counter.query("shared", now);
    assert_eq!(ranked.len(), THREADS);
    assert!(
        ranked
            .iter()
            .all(|e| e.total == (MESSAGES_PER_THREAD as u64) * 3)
    );
}

#[test]
fn queries_interleaved_with_appends_see_whole_messages() {
    let counter = counter();
    let now = DateTime::<Utc>::UNIX_EPOCH;

    let writers: Vec<_> = (0..4)
        .map(|t| {
            let counter = Arc::clone(&counter);
            thread::spawn(move || {
                let sender = format!("w{t}");
                for i in 0..MESSAGES_PER_THREAD {
                    let group = format!("group-{}", i % 3);
                    counter.handle_text(&group, &sender, "xy", now);
                }
            })
        })
        .collect();

    let reader = {
        let counter = Arc::clone(&counter);
        thread::spawn(move || {
            for i in 0..MESSAGES_PER_THREAD {
                let group = format!("group-{}", i % 3);
                match counter.handle_text(&group, "reader", "#rank", now) {
                    Dispatch::Reply(text) => {
                        for line in text.lines() {
                            let (_, total) = line.rsplit_once(": ").unwrap();
                            let total: u64 = total.parse().unwrap();
                            // Every message weighs 2; a torn read would break this.
                            assert_eq!(total % 2, 0);
                        }
                    },
                    Dispatch::Ignored => {},
                    Dispatch::Recorded { .. } => panic!("query was recorded"),
                }
            }
        })
    };

    for handle in writers {
        handle.join().unwrap();
    }
    reader.join().unwrap();

    let total: usize = (0..3)
        .map(|g| counter.ledger_len(&format!("group-{g}")))
        .sum();
    assert_eq!(total, 4 * MESSAGES_PER_THREAD);
    assert_eq!(counter.group_count(), 3);
}
