//! Structured progress reporting for ingestion runs.
//!
//! Besides per-run callbacks, a process-wide counter records every unit
//! handed successfully to a sink. It only ever grows.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

static UNITS_PRODUCED: AtomicU64 = AtomicU64::new(0);

/// Record one stored unit in the process-wide counter.
pub fn record_unit() -> u64 {
    UNITS_PRODUCED.fetch_add(1, Ordering::Relaxed) + 1
}

/// Units stored since process start, across all runs.
pub fn units_produced() -> u64 {
    UNITS_PRODUCED.load(Ordering::Relaxed)
}

/// Progress event emitted during ingestion.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Phase of the operation: "discover", "extract", "chunk", "store"
    pub phase: &'static str,

    /// Current progress (documents found, pages read, units stored)
    pub current: u64,

    /// Total expected work (if known)
    pub total: Option<u64>,

    /// Human-readable message
    pub message: String,

    /// Seconds since the reporter was created
    pub elapsed_secs: Option<f64>,
}

impl ProgressEvent {
    pub fn new(
        phase: &'static str,
        current: u64,
        total: Option<u64>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            current,
            total,
            message: message.into(),
            elapsed_secs: None,
        }
    }

    /// Percentage complete, when the total is known.
    pub fn percentage(&self) -> Option<f64> {
        self.total.map(|t| {
            if t > 0 {
                (self.current as f64 / t as f64) * 100.0
            } else {
                0.0
            }
        })
    }

    /// Format as a simple user-facing line.
    pub fn format_simple(&self) -> String {
        let progress = match self.total {
            Some(total) => format!("{}/{}", self.current, total),
            None => self.current.to_string(),
        };
        let pct = self
            .percentage()
            .map(|p| format!(" ({:.0}%)", p))
            .unwrap_or_default();

        format!("[{}] {}{} - {}", self.phase, progress, pct, self.message)
    }
}

/// Callback for progress events.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Emits progress events through an optional callback.
#[derive(Clone)]
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
    start_time: Instant,
}

impl ProgressReporter {
    pub fn new(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
            start_time: Instant::now(),
        }
    }

    /// Reporter that drops every event.
    pub fn noop() -> Self {
        Self {
            callback: None,
            start_time: Instant::now(),
        }
    }

    pub fn emit(&self, mut event: ProgressEvent) {
        let Some(callback) = &self.callback else {
            return;
        };

        let elapsed = self.start_time.elapsed().as_secs_f64();
        event.elapsed_secs = Some(elapsed);

        tracing::trace!(
            phase = event.phase,
            current = event.current,
            total = ?event.total,
            message = %event.message,
            elapsed_secs = elapsed,
            "Progress event"
        );

        callback(event);
    }

    pub fn discover(&self, found: u64, path: &str) {
        self.emit(ProgressEvent::new(
            "discover",
            found,
            None,
            format!("scanning {}", path),
        ));
    }

    pub fn extract(&self, page: u64, total: Option<u64>, document: &str) {
        self.emit(ProgressEvent::new(
            "extract",
            page,
            total,
            format!("reading {}", document),
        ));
    }

    pub fn chunk(&self, page: u64, total: Option<u64>, chunks_created: usize) {
        self.emit(ProgressEvent::new(
            "chunk",
            page,
            total,
            format!("{} chunks created", chunks_created),
        ));
    }

    pub fn store(&self, stored: u64, document: &str) {
        self.emit(ProgressEvent::new(
            "store",
            stored,
            None,
            format!("{} units from {}", stored, document),
        ));
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::noop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_progress_event_format() {
        let event = ProgressEvent::new("extract", 5, Some(10), "reading book.pdf");
        let formatted = event.format_simple();
        assert!(formatted.contains("[extract]"));
        assert!(formatted.contains("5/10"));
        assert!(formatted.contains("50%"));
    }

    #[test]
    fn test_progress_reporter_emit() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();

        let reporter = ProgressReporter::new(Arc::new(move |event| {
            sink.lock().unwrap().push(event);
        }));
        reporter.chunk(3, Some(10), 4);

        let captured = events.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].phase, "chunk");
        assert_eq!(captured[0].current, 3);
        assert!(captured[0].elapsed_secs.is_some());
    }

    #[test]
    fn test_unit_counter_is_monotonic() {
        let before = units_produced();
        let after = record_unit();
        assert!(after > before);
        assert!(units_produced() >= after);
    }
}
