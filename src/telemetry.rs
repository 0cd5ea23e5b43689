use crate::traits::Telemetry;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counts rerun events in memory and reports each one through `tracing`.
#[derive(Debug, Default)]
pub struct TracingTelemetry {
    reruns: AtomicU64,
}

impl TracingTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rerun_count(&self) -> u64 {
        self.reruns.load(Ordering::Relaxed)
    }
}

impl Telemetry for TracingTelemetry {
    fn record_rerun_event(&self) {
        let total = self.reruns.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(total, "rerun checks event recorded");
    }
}
