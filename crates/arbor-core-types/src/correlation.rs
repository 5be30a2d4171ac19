//! Identifiers that tie log lines, errors and journal entries together

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Tags the log lines and errors of one dispatched request
///
/// A UUIDv7 string, so ids sort by creation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for RequestId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Highest event id handed out so far in this process
static LAST_EVENT_ID: AtomicI64 = AtomicI64::new(0);

/// Correlation token for a captured failure
///
/// Distinct from the journal row id. Values are strictly positive and
/// strictly increasing within a process: each id is the current UTC time in
/// nanoseconds, bumped past the previous id when the clock has not advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(i64);

impl EventId {
    /// Issue the next event id
    pub fn next() -> Self {
        let now = unix_nanos();
        let mut last = LAST_EVENT_ID.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match LAST_EVENT_ID.compare_exchange_weak(
                last,
                candidate,
                Ordering::SeqCst,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Self(candidate),
                Err(observed) => last = observed,
            }
        }
    }

    /// Wrap a value read back from storage
    pub fn from_raw(value: i64) -> Self {
        Self(value)
    }

    /// Raw 64-bit value
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn unix_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_request_ids_are_distinct_uuids() {
        let a = RequestId::new();
        let b = RequestId::new();

        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
        assert_eq!(a.to_string(), a.as_str());
    }

    #[test]
    fn test_event_ids_are_positive_and_increasing() {
        let a = EventId::next();
        let b = EventId::next();

        assert!(a.get() > 0);
        assert!(b > a);
    }

    #[test]
    fn test_event_ids_unique_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| (0..500).map(|_| EventId::next()).collect::<Vec<_>>()))
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate event id {}", id);
            }
        }
        assert_eq!(seen.len(), 8 * 500);
    }

    #[test]
    fn test_event_id_serializes_as_number() {
        let id = EventId::from_raw(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
    }

    #[test]
    fn test_request_id_from_existing_string() {
        let id = RequestId::from("req-1".to_string());
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"req-1\"");
    }
}
