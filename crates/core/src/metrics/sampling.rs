use super::{MetricsCollector, SampleReport};
use crate::error::{CoreError, Result};
use crate::model::MonitorSnapshot;
use log::{debug, warn};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    /// Terminal; a stopped loop cannot be started again
    Stopped,
}

struct Worker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// Drives `MetricsCollector::sample` on a dedicated thread at a fixed interval
pub struct SamplingLoop {
    collector: Arc<Mutex<MetricsCollector>>,
    interval: Duration,
    worker: Option<Worker>,
    stopped: bool,
}

impl SamplingLoop {
    pub fn new(collector: MetricsCollector, interval: Duration) -> Self {
        Self {
            collector: Arc::new(Mutex::new(collector)),
            interval,
            worker: None,
            stopped: false,
        }
    }

    pub fn state(&self) -> LoopState {
        match (&self.worker, self.stopped) {
            (Some(_), _) => LoopState::Running,
            (None, true) => LoopState::Stopped,
            (None, false) => LoopState::Idle,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Shared handle for observers
    pub fn collector(&self) -> Arc<Mutex<MetricsCollector>> {
        Arc::clone(&self.collector)
    }

    /// Spawn the sampling thread; no-op when already running, an error once stopped
    pub fn start(&mut self) -> Result<()> {
        match self.state() {
            LoopState::Running => return Ok(()),
            LoopState::Stopped => return Err(CoreError::Sampling("loop already stopped".to_string())),
            LoopState::Idle => {}
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let collector = Arc::clone(&self.collector);
        let interval = self.interval;

        let handle = thread::Builder::new()
            .name("sensmon-sampler".to_string())
            .spawn(move || {
                let mut next_tick = Instant::now() + interval;
                loop {
                    let wait = next_tick.saturating_duration_since(Instant::now());
                    match stop_rx.recv_timeout(wait) {
                        Err(RecvTimeoutError::Timeout) => {
                            // Collector stays unlocked during the vendor query
                            let query = lock(&collector).gpu_query();
                            let gpu_output = query.map(|q| q.run());
                            let report = lock(&collector).sample_with(gpu_output);
                            if !report.failures.is_empty() {
                                debug!("Tick: {} sensors read, {} failed", report.sensors_read, report.failures.len());
                            }
                            next_tick += interval;
                            let now = Instant::now();
                            if next_tick < now {
                                next_tick = now + interval;
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("Sampling thread exiting");
            })?;

        self.worker = Some(Worker { stop_tx, handle });
        debug!("Sampling every {} ms", interval.as_millis());
        Ok(())
    }

    /// Stop and join the sampling thread.
    ///
    /// An in-flight tick completes first; no tick runs after this returns.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.stopped = true;

        let _ = worker.stop_tx.send(());
        if let Err(e) = worker.handle.join() {
            warn!("Sampling thread panicked: {:?}", e);
        }
    }

    pub fn reset_all(&self) -> SampleReport {
        lock(&self.collector).reset_all()
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        lock(&self.collector).snapshot()
    }
}

impl Drop for SamplingLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Lock the collector, recovering from a poisoned mutex
pub fn lock(collector: &Mutex<MetricsCollector>) -> MutexGuard<'_, MetricsCollector> {
    collector.lock().unwrap_or_else(PoisonError::into_inner)
}
