//! Periodic throughput reporting for a running snapshot write.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};

/// Monotonic write counter shared by the writer (increments) and the
/// monitor (reads).
#[derive(Debug, Clone, Default)]
pub struct WriteCounter(Arc<AtomicU64>);

impl WriteCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Final node and edge counts handed to the monitor with the stop signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FinalCounts {
    pub nodes: usize,
    pub edges: usize,
}

/// What the monitor observed over the whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ThroughputSummary {
    pub elapsed: Duration,
    pub total_writes: u64,
    /// Writes per interval, one entry per elapsed interval.
    pub samples: Vec<u64>,
    pub nodes: usize,
    pub edges: usize,
}

impl ThroughputSummary {
    pub fn peak_rate(&self) -> u64 {
        self.samples.iter().copied().max().unwrap_or(0)
    }
}

/// Handle to a running monitor task.
pub struct ThroughputMonitor {
    stop: oneshot::Sender<FinalCounts>,
    task: JoinHandle<ThroughputSummary>,
}

impl ThroughputMonitor {
    /// Start sampling `counter` every `interval`.
    pub fn spawn(counter: WriteCounter, interval: Duration) -> Self {
        let (stop, stop_rx) = oneshot::channel();
        let task = tokio::spawn(observe(counter, interval, stop_rx));
        Self { stop, task }
    }

    /// Send the stop signal and wait for the final summary.
    pub async fn stop(self, counts: FinalCounts) -> ThroughputSummary {
        // The receiver only disappears if the task already ended.
        let _ = self.stop.send(counts);
        match self.task.await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("throughput monitor ended abnormally: {}", e);
                ThroughputSummary {
                    nodes: counts.nodes,
                    edges: counts.edges,
                    ..Default::default()
                }
            }
        }
    }
}

async fn observe(
    counter: WriteCounter,
    period: Duration,
    mut stop: oneshot::Receiver<FinalCounts>,
) -> ThroughputSummary {
    let start = Instant::now();
    let mut ticker = interval_at(start + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut previous = 0u64;
    let mut samples = Vec::new();

    let counts = loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = counter.get();
                let delta = now - previous;
                previous = now;
                samples.push(delta);
                info!("save speed: {} writes per {:?}", delta, period);
            }
            counts = &mut stop => break counts.unwrap_or_default(),
        }
    };

    let summary = ThroughputSummary {
        elapsed: start.elapsed(),
        total_writes: counter.get(),
        samples,
        nodes: counts.nodes,
        edges: counts.edges,
    };
    info!(
        "save complete, total: {} nodes and {} edges, cost: {:?}",
        summary.nodes, summary.edges, summary.elapsed
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_samples_per_interval() {
        let counter = WriteCounter::new();
        let monitor = ThroughputMonitor::spawn(counter.clone(), Duration::from_secs(1));

        for _ in 0..5 {
            counter.increment();
        }
        tokio::time::sleep(Duration::from_millis(1500)).await;
        for _ in 0..3 {
            counter.increment();
        }
        tokio::time::sleep(Duration::from_millis(1000)).await;

        let summary = monitor.stop(FinalCounts { nodes: 4, edges: 4 }).await;
        assert_eq!(summary.samples, vec![5, 3]);
        assert_eq!(summary.total_writes, 8);
        assert_eq!(summary.peak_rate(), 5);
        assert_eq!(summary.nodes, 4);
        assert_eq!(summary.elapsed, Duration::from_millis(2500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_before_first_tick() {
        let counter = WriteCounter::new();
        let monitor = ThroughputMonitor::spawn(counter.clone(), Duration::from_secs(1));
        counter.increment();

        let summary = monitor.stop(FinalCounts { nodes: 1, edges: 0 }).await;
        assert!(summary.samples.is_empty());
        assert_eq!(summary.total_writes, 1);
    }
}
