//! # Duplicate-Scan Suppression
//!
//! Hardware barcode scanners presenting as keyboards commonly deliver the
//! same code two or three times within a few hundred milliseconds. Those
//! repeats are noise, not operator intent: they are dropped inside a short
//! time window keyed by `(product, code)`, and dropping one is not an error.
//!
//! Time is passed in explicitly so the window is testable without sleeping.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::SCAN_DEDUP_WINDOW_MS;

// =============================================================================
// Scan Debouncer
// =============================================================================

/// Time-window de-duplication of barcode scans.
#[derive(Debug, Clone)]
pub struct ScanDebouncer {
    window: Duration,
    last_seen: HashMap<(String, String), DateTime<Utc>>,
}

impl Default for ScanDebouncer {
    fn default() -> Self {
        ScanDebouncer::new(Duration::milliseconds(SCAN_DEDUP_WINDOW_MS))
    }
}

impl ScanDebouncer {
    /// Creates a debouncer with the given suppression window.
    pub fn new(window: Duration) -> Self {
        ScanDebouncer {
            window,
            last_seen: HashMap::new(),
        }
    }

    /// Decides whether a scan of `(product_id, code)` at `now` should be
    /// processed. Returns `false` for a repeat inside the window; accepted
    /// scans restart the window for their key.
    pub fn accept(&mut self, product_id: &str, code: &str, now: DateTime<Utc>) -> bool {
        let key = (product_id.to_string(), code.to_string());

        if let Some(last) = self.last_seen.get(&key) {
            if now - *last < self.window {
                return false;
            }
        }

        self.last_seen.insert(key, now);
        true
    }

    /// Drops entries older than the window, bounding memory over a long
    /// shift. Call opportunistically (e.g. on cart submit).
    pub fn prune(&mut self, now: DateTime<Utc>) {
        let window = self.window;
        self.last_seen.retain(|_, last| now - *last < window);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
