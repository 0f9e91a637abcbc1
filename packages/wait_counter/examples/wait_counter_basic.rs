//! Example demonstrating the key `wait_counter` types working together:
//! - `WaitBackend` / `WaitBackendFactory`: a simple statistics-keeping sink
//! - `register_wait_backend`: plugging the sink into the process
//! - `WaitHandle` and its guard: measuring waits at call sites
//!
//! Run with: `cargo run --example wait_counter_basic`.
#![expect(
    clippy::arithmetic_side_effects,
    reason = "this is example code that does not need production-level safety"
)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use wait_counter::{Token, WaitBackend, WaitBackendFactory, WaitHandle, register_wait_backend};

/// Accumulated wait statistics for one key.
#[derive(Debug, Default)]
struct KeyStats {
    completed_waits: usize,
    total_waited: Duration,
}

/// A backend that sums wait durations for its key.
///
/// Tokens index a slot holding the start time of each in-flight wait, so
/// overlapping waits from multiple threads stay correlated.
#[derive(Debug)]
struct StatsBackend {
    key: String,
    next_slot: AtomicUsize,
    in_flight: Mutex<HashMap<usize, Instant>>,
    stats: Arc<Mutex<HashMap<String, KeyStats>>>,
}

impl WaitBackend for StatsBackend {
    fn start(&self, now: Instant) -> Token {
        let slot = self.next_slot.fetch_add(1, Ordering::Relaxed);
        self.in_flight.lock().unwrap().insert(slot, now);
        Token::new(slot)
    }

    fn stop(&self, now: Instant, token: Token) {
        let Some(started) = self.in_flight.lock().unwrap().remove(&token.value()) else {
            return;
        };

        let mut stats = self.stats.lock().unwrap();
        let entry = stats.entry(self.key.clone()).or_default();
        entry.completed_waits += 1;
        entry.total_waited += now.saturating_duration_since(started);
    }
}

/// Attaches a `StatsBackend` to every key whose name ends in `_wait`.
#[derive(Debug)]
struct StatsFactory {
    stats: Arc<Mutex<HashMap<String, KeyStats>>>,
}

impl WaitBackendFactory for StatsFactory {
    fn create(&self, key: &str) -> Option<Box<dyn WaitBackend>> {
        key.ends_with("_wait").then(|| {
            Box::new(StatsBackend {
                key: key.to_owned(),
                next_slot: AtomicUsize::new(0),
                in_flight: Mutex::new(HashMap::new()),
                stats: Arc::clone(&self.stats),
            }) as Box<dyn WaitBackend>
        })
    }
}

fn main() {
    println!("=== Wait Counter Example ===");
    println!();

    // Register the backend before any keys are resolved - a key's backend
    // list is fixed at its first resolution.
    let stats = Arc::new(Mutex::new(HashMap::new()));
    register_wait_backend(StatsFactory {
        stats: Arc::clone(&stats),
    });
    println!("✓ Registered statistics backend");
    println!();

    // A guarded wait: the stop is delivered when the guard drops.
    let queue_wait = WaitHandle::new("queue_pop_wait");
    {
        let _guard = queue_wait.measure();
        thread::sleep(Duration::from_millis(25));
    }

    // Overlapping waits from multiple threads against one key.
    let workers: Vec<_> = (0..4_u64)
        .map(|i| {
            let handle = queue_wait.clone();
            thread::spawn(move || {
                let _guard = handle.measure();
                thread::sleep(Duration::from_millis(10 * (i + 1)));
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    // This key does not match the factory's filter, so no backend is
    // attached and measuring it is a no-op.
    let ignored = WaitHandle::new("not_instrumented");
    assert_eq!(ignored.backend_count(), 0);
    {
        let _guard = ignored.measure();
        thread::sleep(Duration::from_millis(5));
    }

    println!("Collected wait statistics:");
    for (key, key_stats) in stats.lock().unwrap().iter() {
        println!(
            "  {key}: {} waits, {:?} total",
            key_stats.completed_waits, key_stats.total_waited
        );
    }
}
