//! Periodic job runner.
//!
//! # Responsibility
//! - Run named jobs on their own background thread at a fixed cadence.
//! - Re-run a job sooner when it reports [`JobOutcome::Retry`].
//! - Stop jobs individually or all at once.
//!
//! # Invariants
//! - Jobs must be idempotent; a run may be skipped or repeated.
//! - A job never overlaps with itself (one thread per job).
//! - A panicking job is reported as a retry, not propagated.

use log::{info, warn};
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

/// Result of one job run as seen by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Success,
    /// Generic failure; the scheduler retries after its retry delay.
    Retry(String),
}

/// Cadence settings for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobSchedule {
    pub period: Duration,
    pub retry_delay: Duration,
    /// Run once right away instead of waiting a full period first.
    pub run_immediately: bool,
}

impl JobSchedule {
    pub fn every(period: Duration) -> Self {
        Self {
            period,
            retry_delay: period,
            run_immediately: false,
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay.min(self.period);
        self
    }

    pub fn immediately(mut self) -> Self {
        self.run_immediately = true;
        self
    }
}

/// Handle to one running job.
pub struct JobHandle {
    name: String,
    stop: Sender<()>,
    thread: Option<JoinHandle<()>>,
}

impl JobHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stops the job and waits for an in-flight run to finish.
    pub fn cancel(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        let _ = self.stop.send(());
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("event=job_join module=scheduler status=error job={}", self.name);
            }
        }
    }
}

impl Drop for JobHandle {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

/// Registry of named periodic jobs.
#[derive(Default)]
pub struct Scheduler {
    jobs: BTreeMap<String, JobHandle>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `job` under `name`, replacing any job already using the name.
    pub fn schedule<F>(&mut self, name: impl Into<String>, schedule: JobSchedule, job: F)
    where
        F: FnMut() -> JobOutcome + Send + 'static,
    {
        let name = name.into();
        if let Some(previous) = self.jobs.remove(&name) {
            previous.cancel();
        }
        let handle = spawn_job(name.clone(), schedule, job);
        self.jobs.insert(name, handle);
    }

    /// Stops one job; returns whether it was running.
    pub fn cancel(&mut self, name: &str) -> bool {
        match self.jobs.remove(name) {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Stops every job.
    pub fn cancel_all(&mut self) {
        for (_, handle) in std::mem::take(&mut self.jobs) {
            handle.cancel();
        }
    }

    pub fn job_names(&self) -> Vec<String> {
        self.jobs.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

fn spawn_job<F>(name: String, schedule: JobSchedule, mut job: F) -> JobHandle
where
    F: FnMut() -> JobOutcome + Send + 'static,
{
    let (stop_tx, stop_rx) = channel::<()>();
    let thread_name = name.clone();

    let thread = std::thread::Builder::new()
        .name(format!("hearth-job-{name}"))
        .spawn(move || {
            info!("event=job_start module=scheduler status=ok job={thread_name}");
            let mut wait = if schedule.run_immediately {
                Duration::ZERO
            } else {
                schedule.period
            };

            loop {
                match stop_rx.recv_timeout(wait) {
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {}
                }

                let outcome = catch_unwind(AssertUnwindSafe(&mut job))
                    .unwrap_or_else(|_| JobOutcome::Retry("job panicked".to_string()));
                wait = match outcome {
                    JobOutcome::Success => schedule.period,
                    JobOutcome::Retry(reason) => {
                        warn!(
                            "event=job_run module=scheduler status=retry job={} reason={}",
                            thread_name, reason
                        );
                        schedule.retry_delay
                    }
                };
            }
            info!("event=job_stop module=scheduler status=ok job={thread_name}");
        });

    let thread = match thread {
        Ok(handle) => Some(handle),
        Err(err) => {
            warn!("event=job_spawn module=scheduler status=error job={name} error={err}");
            None
        }
    };

    JobHandle {
        name,
        stop: stop_tx,
        thread,
    }
}

#[cfg(test)]
mod tests {
    use super::{JobOutcome, JobSchedule, Scheduler};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn wait_for(counter: &AtomicUsize, at_least: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while counter.load(Ordering::SeqCst) < at_least && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn runs_periodically_until_cancelled() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new();
        let counter = Arc::clone(&runs);
        scheduler.schedule(
            "tick",
            JobSchedule::every(Duration::from_millis(10)).immediately(),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                JobOutcome::Success
            },
        );

        wait_for(&runs, 3);
        assert!(scheduler.cancel("tick"));
        let after_cancel = runs.load(Ordering::SeqCst);
        assert!(after_cancel >= 3);
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(runs.load(Ordering::SeqCst), after_cancel);
        assert!(!scheduler.cancel("tick"));
    }

    #[test]
    fn retry_uses_shorter_delay() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new();
        let counter = Arc::clone(&runs);
        scheduler.schedule(
            "flaky",
            JobSchedule::every(Duration::from_secs(3600))
                .with_retry_delay(Duration::from_millis(5))
                .immediately(),
            move || {
                let run = counter.fetch_add(1, Ordering::SeqCst);
                if run < 2 {
                    JobOutcome::Retry("store busy".to_string())
                } else {
                    JobOutcome::Success
                }
            },
        );

        wait_for(&runs, 3);
        scheduler.cancel_all();
        assert_eq!(runs.load(Ordering::SeqCst), 3);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn panicking_job_keeps_scheduler_alive() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new();
        let counter = Arc::clone(&runs);
        scheduler.schedule(
            "panics",
            JobSchedule::every(Duration::from_millis(5)).immediately(),
            move || {
                let run = counter.fetch_add(1, Ordering::SeqCst);
                if run == 0 {
                    panic!("first run explodes");
                }
                JobOutcome::Success
            },
        );
        wait_for(&runs, 2);
        scheduler.cancel_all();
        assert!(runs.load(Ordering::SeqCst) >= 2);
    }
}
