use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing forwarding activity.
#[derive(Default)]
pub struct PipelineMetrics {
    events_processed: AtomicU64,
    records_forwarded: AtomicU64,
}

impl PipelineMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed event and the number of records forwarded for it.
    pub fn record_event(&self, forwarded: u64) {
        self.events_processed.fetch_add(1, Ordering::Relaxed);
        self.records_forwarded.fetch_add(forwarded, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_processed: self.events_processed.load(Ordering::Relaxed),
            records_forwarded: self.records_forwarded.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of forwarding counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of events fully processed since startup.
    pub events_processed: u64,
    /// Total records forwarded to the sink across all events.
    pub records_forwarded: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_events_and_forwarded_counts() {
        let metrics = PipelineMetrics::new();
        metrics.record_event(2);
        metrics.record_event(3);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.events_processed, 2);
        assert_eq!(snapshot.records_forwarded, 5);
    }

    #[test]
    fn snapshot_is_consistent() {
        let metrics = PipelineMetrics::new();
        assert_eq!(metrics.snapshot().events_processed, 0);
        assert_eq!(metrics.snapshot().records_forwarded, 0);
    }
}
