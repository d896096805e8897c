//! Warning feed for the status bar.
//!
//! The terminal belongs to the editor, so warnings cannot go to stderr. A
//! [`StatusFeed`] layer keeps the most recent events at or above a minimum
//! level in a bounded ring; the UI polls a [`StatusReader`] for anything newer
//! than what it has already shown.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// One captured event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Monotonic sequence number, starting at 1.
    pub seq: u64,
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl StatusEntry {
    /// Short form for the status bar, e.g. `WARN: cannot save`.
    pub fn status_line(&self) -> String {
        format!("{}: {}", self.level, self.message)
    }
}

#[derive(Debug)]
struct Ring {
    entries: VecDeque<StatusEntry>,
    capacity: usize,
    next_seq: u64,
}

impl Ring {
    fn push(&mut self, level: Level, target: String, message: String) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.next_seq += 1;
        self.entries.push_back(StatusEntry {
            seq: self.next_seq,
            level,
            target,
            message,
        });
    }
}

/// `tracing` layer that records events at or above `min_level`.
#[derive(Debug, Clone)]
pub struct StatusFeed {
    ring: Arc<Mutex<Ring>>,
    min_level: Level,
}

impl StatusFeed {
    /// Keeps up to `capacity` entries at WARN and above.
    pub fn new(capacity: usize) -> Self {
        Self::with_min_level(capacity, Level::WARN)
    }

    pub fn with_min_level(capacity: usize, min_level: Level) -> Self {
        Self {
            ring: Arc::new(Mutex::new(Ring {
                entries: VecDeque::with_capacity(capacity),
                capacity: capacity.max(1),
                next_seq: 0,
            })),
            min_level,
        }
    }

    pub fn reader(&self) -> StatusReader {
        StatusReader {
            ring: Arc::clone(&self.ring),
        }
    }
}

impl<S: Subscriber> Layer<S> for StatusFeed {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        // Level ordering is by verbosity: ERROR < WARN < INFO.
        if *metadata.level() > self.min_level {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        if let Ok(mut ring) = self.ring.lock() {
            ring.push(
                *metadata.level(),
                metadata.target().to_string(),
                visitor.finish(),
            );
        }
    }
}

/// Read handle onto a [`StatusFeed`].
#[derive(Debug, Clone)]
pub struct StatusReader {
    ring: Arc<Mutex<Ring>>,
}

impl StatusReader {
    /// Snapshot of every retained entry, oldest first.
    pub fn entries(&self) -> Vec<StatusEntry> {
        self.ring
            .lock()
            .map(|ring| ring.entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Entries with a sequence number greater than `seq`.
    pub fn since(&self, seq: u64) -> Vec<StatusEntry> {
        self.ring
            .lock()
            .map(|ring| {
                ring.entries
                    .iter()
                    .filter(|e| e.seq > seq)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Most recent entry, if any.
    pub fn latest(&self) -> Option<StatusEntry> {
        self.ring
            .lock()
            .ok()
            .and_then(|ring| ring.entries.back().cloned())
    }

    pub fn len(&self) -> usize {
        self.ring.lock().map(|ring| ring.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Collects the `message` field plus any structured fields as `key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else {
            format!("{} ({})", self.message, self.fields.join(", "))
        }
    }
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.push(format!("{}={value:?}", field.name()));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={value}", field.name()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    #[test]
    fn test_feed_keeps_warnings_only() {
        let feed = StatusFeed::new(10);
        let reader = feed.reader();
        let _guard = tracing_subscriber::registry().with(feed).set_default();

        tracing::info!("opened file");
        tracing::warn!("cannot scan directory");
        tracing::error!("save failed");

        let entries = reader.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, Level::WARN);
        assert_eq!(entries[1].status_line(), "ERROR: save failed");
    }

    #[test]
    fn test_ring_evicts_oldest() {
        let feed = StatusFeed::new(2);
        let reader = feed.reader();
        let _guard = tracing_subscriber::registry().with(feed).set_default();

        tracing::warn!("one");
        tracing::warn!("two");
        tracing::warn!("three");

        let messages: Vec<String> = reader.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["two", "three"]);
        assert_eq!(reader.latest().map(|e| e.seq), Some(3));
    }

    #[test]
    fn test_since_returns_newer_entries() {
        let feed = StatusFeed::new(10);
        let reader = feed.reader();
        let _guard = tracing_subscriber::registry().with(feed).set_default();

        tracing::warn!("first");
        let seen = reader.latest().map(|e| e.seq).unwrap_or(0);
        tracing::warn!("second");

        let fresh = reader.since(seen);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].message, "second");
        assert!(reader.since(fresh[0].seq).is_empty());
    }

    #[test]
    fn test_structured_fields_are_appended() {
        let feed = StatusFeed::new(4);
        let reader = feed.reader();
        let _guard = tracing_subscriber::registry().with(feed).set_default();

        tracing::warn!(path = "reg.toml", "Skipping registry file");

        let entry = reader.latest().unwrap();
        assert_eq!(entry.message, "Skipping registry file (path=reg.toml)");
    }

    #[test]
    fn test_custom_min_level() {
        let feed = StatusFeed::with_min_level(4, Level::INFO);
        let reader = feed.reader();
        let _guard = tracing_subscriber::registry().with(feed).set_default();

        tracing::debug!("noise");
        tracing::info!("saved");

        assert_eq!(reader.len(), 1);
    }

    #[test]
    fn test_empty_reader() {
        let reader = StatusFeed::new(3).reader();
        assert!(reader.is_empty());
        assert!(reader.latest().is_none());
    }
}
