//! Span helpers for integrity operations.

use tracing::{info_span, Span};

/// Span covering the export of one clinical document.
pub fn export_span(resource_id: &str) -> Span {
    info_span!("export", resource_id = %resource_id)
}

/// Span covering one round trip to a SQLite table.
pub fn storage_span(table: &str, operation: &str) -> Span {
    info_span!("storage", table = %table, op = %operation)
}

/// Timing utility for operations.
pub struct Timer {
    start: std::time::Instant,
    operation: &'static str,
}

impl Timer {
    /// Start a new timer.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }

    /// Complete the timer and record duration.
    pub fn finish(self) {
        tracing::debug!(
            operation = %self.operation,
            duration_ms = %self.elapsed_ms(),
            "operation completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans_can_be_entered() {
        let span = export_span("visit-1");
        let _guard = span.enter();
        let _inner = storage_span("audit_events", "insert").entered();
    }

    #[test]
    fn test_timer_measures() {
        let timer = Timer::start("noop");
        assert!(timer.elapsed_ms() < 60_000);
        timer.finish();
    }
}
