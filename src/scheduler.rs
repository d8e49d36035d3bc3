//! Periodic background jobs.
//!
//! A job fires every `interval` on its own worker thread. If the previous run
//! is still in flight the tick is skipped, so runs never overlap. Stopping
//! signals the timer thread over a channel and joins it.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{bounded, RecvTimeoutError, Sender};
use tracing::{debug, error, info, warn};

use crate::pipeline::PipelineOrchestrator;

type Job = Arc<dyn Fn() + Send + Sync>;

/// Counters shared with the timer thread.
#[derive(Debug, Default)]
struct SchedulerStats {
    in_flight: AtomicBool,
    runs: AtomicUsize,
    skipped: AtomicUsize,
}

/// Handle to a running periodic job. Dropping it stops the timer.
pub struct Scheduler {
    stop: Sender<()>,
    timer: Option<JoinHandle<()>>,
    job: Job,
    stats: Arc<SchedulerStats>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("stats", &self.stats)
            .finish()
    }
}

impl Scheduler {
    /// Start calling `job` every `interval`.
    pub fn start<F>(interval: Duration, job: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let (stop, stop_rx) = bounded::<()>(1);
        let job: Job = Arc::new(job);
        let stats = Arc::new(SchedulerStats::default());

        let timer_job = Arc::clone(&job);
        let timer_stats = Arc::clone(&stats);
        let timer = thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    spawn_guarded(&timer_job, &timer_stats);
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });
        info!(interval_secs = interval.as_secs_f64(), "Scheduler started");

        Self {
            stop,
            timer: Some(timer),
            job,
            stats,
        }
    }

    /// Run the job now on the calling thread, unless a run is in flight.
    /// Returns whether it ran.
    pub fn trigger_now(&self) -> bool {
        run_guarded(&self.job, &self.stats)
    }

    /// A run is executing right now.
    pub fn is_in_flight(&self) -> bool {
        self.stats.in_flight.load(Ordering::SeqCst)
    }

    /// Completed runs.
    pub fn runs(&self) -> usize {
        self.stats.runs.load(Ordering::SeqCst)
    }

    /// Ticks skipped because a run was still in flight.
    pub fn skipped(&self) -> usize {
        self.stats.skipped.load(Ordering::SeqCst)
    }

    /// Stop the timer and wait for it to exit. An in-flight run finishes on
    /// its own worker thread.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.stop.try_send(());
        if let Some(timer) = self.timer.take() {
            if timer.join().is_err() {
                error!("Scheduler timer thread panicked");
            }
            info!(runs = self.runs(), skipped = self.skipped(), "Scheduler stopped");
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_guarded(job: &Job, stats: &Arc<SchedulerStats>) {
    if stats.in_flight.load(Ordering::SeqCst) {
        stats.skipped.fetch_add(1, Ordering::SeqCst);
        warn!("Previous scheduled run still in flight; skipping tick");
        return;
    }
    let job = Arc::clone(job);
    let stats = Arc::clone(stats);
    thread::spawn(move || {
        run_guarded(&job, &stats);
    });
}

/// Clears the in-flight flag when dropped, including while a job unwinds.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn run_guarded(job: &Job, stats: &SchedulerStats) -> bool {
    let Some(_in_flight) = InFlightGuard::acquire(&stats.in_flight) else {
        stats.skipped.fetch_add(1, Ordering::SeqCst);
        return false;
    };
    debug!("Scheduled run starting");
    job();
    stats.runs.fetch_add(1, Ordering::SeqCst);
    true
}

/// Run [`PipelineOrchestrator::scheduled_check`] every `interval`.
pub fn schedule_pipeline(pipeline: Arc<PipelineOrchestrator>, interval: Duration) -> Scheduler {
    Scheduler::start(interval, move || match pipeline.scheduled_check() {
        Ok(Some(result)) => info!(
            version_id = ?result.version_id,
            status = ?result.status,
            "Scheduled retrain finished"
        ),
        Ok(None) => debug!("Scheduled check: no retrain needed"),
        Err(e) => error!(error = %e, "Scheduled check failed"),
    })
}
