//! Time-bounded media cache.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

/// Millisecond wall clock.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Clock backed by the system time (works on wasm through `web-time`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        web_time::SystemTime::now()
            .duration_since(web_time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Hand-driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

struct Entry<T> {
    value: T,
    hit: u64,
}

/// URL-keyed resource cache with lazy age-based eviction.
///
/// Entries whose last hit is older than the TTL are dropped on every
/// [`get`](Self::get) and [`set`](Self::set). There is no size bound.
pub struct MediaCache<T: Clone> {
    entries: HashMap<String, Entry<T>>,
    ttl_ms: u64,
    clock: Rc<dyn Clock>,
}

impl<T: Clone> MediaCache<T> {
    pub fn new(ttl_ms: u64) -> Self {
        Self::with_clock(ttl_ms, Rc::new(SystemClock))
    }

    pub fn with_clock(ttl_ms: u64, clock: Rc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            ttl_ms,
            clock,
        }
    }

    /// Look up `key`, refreshing its hit time.
    pub fn get(&mut self, key: &str) -> Option<T> {
        let now = self.clock.now_ms();
        self.evict(now);
        let entry = self.entries.get_mut(key)?;
        entry.hit = now;
        Some(entry.value.clone())
    }

    pub fn set(&mut self, key: impl Into<String>, value: T) {
        let now = self.clock.now_ms();
        self.entries.insert(key.into(), Entry { value, hit: now });
        self.evict(now);
    }

    /// Whether `key` is present, without evicting or refreshing.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn evict(&mut self, now: u64) {
        let ttl = self.ttl_ms;
        let before = self.entries.len();
        self.entries.retain(|_, entry| now.saturating_sub(entry.hit) <= ttl);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            log::debug!("media cache evicted {evicted} stale entries");
        }
    }
}
