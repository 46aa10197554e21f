//! Frame counting and the once-per-second FPS report.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use tokio::{runtime::Handle, task::JoinHandle, time::MissedTickBehavior};

/// Frames rendered since the last [`take`](Self::take). Clones share the
/// same counter.
#[derive(Debug, Clone, Default)]
pub struct FrameCounter(Arc<AtomicU32>);

impl FrameCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }

    /// Returns the count and resets it in one atomic step.
    pub fn take(&self) -> u32 {
        self.0.swap(0, Ordering::Relaxed)
    }
}

/// A job run on a tokio runtime every `period`, first after one period.
/// Missed periods are not replayed. Aborted on [`cancel`](Self::cancel) or
/// drop.
#[derive(Debug)]
pub struct PeriodicTask {
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    pub fn spawn<F>(runtime: &Handle, period: Duration, mut job: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let handle = runtime.spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            // After a stall run once and restart the period, no catch-up burst.
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                job();
            }
        });
        Self { handle }
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub const FPS_PERIOD: Duration = Duration::from_secs(1);

/// Prints `FPS: <n>` every second and resets the counter.
pub fn spawn_fps_reporter(runtime: &Handle, counter: FrameCounter) -> PeriodicTask {
    PeriodicTask::spawn(runtime, FPS_PERIOD, move || {
        println!("FPS: {}", counter.take());
    })
}
