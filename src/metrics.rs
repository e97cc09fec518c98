//! Process-wide save counters.
//! Totals are plain atomics; per-stream breakdowns live behind a mutex-guarded map.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

static SAVES_ATTEMPTED: AtomicU64 = AtomicU64::new(0);
static SAVES_SUCCEEDED: AtomicU64 = AtomicU64::new(0);
static SAVES_FAILED: AtomicU64 = AtomicU64::new(0);
static EVENTS_COALESCED: AtomicU64 = AtomicU64::new(0);

static STREAM_COUNTERS: OnceLock<Mutex<HashMap<String, StreamCounter>>> = OnceLock::new();

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamCounter {
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Events replaced by a newer one before the quiet period ended.
    pub coalesced: u64,
}

fn stream_lock() -> &'static Mutex<HashMap<String, StreamCounter>> {
    STREAM_COUNTERS.get_or_init(|| Mutex::new(HashMap::new()))
}

fn with_stream(stream: &str, update: impl FnOnce(&mut StreamCounter)) {
    // a poisoned map only loses the breakdown; totals are still counted
    if let Ok(mut guard) = stream_lock().lock() {
        update(guard.entry(stream.to_string()).or_default());
    }
}

pub fn record_save_attempt(stream: &str) {
    SAVES_ATTEMPTED.fetch_add(1, Ordering::Relaxed);
    with_stream(stream, |c| c.attempted = c.attempted.saturating_add(1));
}

pub fn record_save_success(stream: &str) {
    SAVES_SUCCEEDED.fetch_add(1, Ordering::Relaxed);
    with_stream(stream, |c| c.succeeded = c.succeeded.saturating_add(1));
}

pub fn record_save_failure(stream: &str) {
    SAVES_FAILED.fetch_add(1, Ordering::Relaxed);
    with_stream(stream, |c| c.failed = c.failed.saturating_add(1));
}

pub fn record_coalesced(stream: &str) {
    EVENTS_COALESCED.fetch_add(1, Ordering::Relaxed);
    with_stream(stream, |c| c.coalesced = c.coalesced.saturating_add(1));
}

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub saves_attempted: u64,
    pub saves_succeeded: u64,
    pub saves_failed: u64,
    pub events_coalesced: u64,
    pub streams: HashMap<String, StreamCounter>,
}

impl Snapshot {
    pub fn stream(&self, name: &str) -> StreamCounter {
        self.streams.get(name).copied().unwrap_or_default()
    }
}

pub fn snapshot() -> Snapshot {
    let streams = stream_lock()
        .lock()
        .map(|guard| guard.clone())
        .unwrap_or_default();
    Snapshot {
        saves_attempted: SAVES_ATTEMPTED.load(Ordering::Relaxed),
        saves_succeeded: SAVES_SUCCEEDED.load(Ordering::Relaxed),
        saves_failed: SAVES_FAILED.load(Ordering::Relaxed),
        events_coalesced: EVENTS_COALESCED.load(Ordering::Relaxed),
        streams,
    }
}
