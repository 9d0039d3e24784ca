//! Recurring wall-clock jobs: "every day at 8 AM in UTC-6", optionally gated
//! to one day of the week. Each job runs on its own tokio task so a slow or
//! failing firing never stalls the others.

pub mod recurrence;

use chrono::{Datelike, Duration, FixedOffset, NaiveTime, Utc, Weekday};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{self, Instant};
use tracing::{debug, error, info};

const PERIOD: std::time::Duration = std::time::Duration::from_secs(24 * 60 * 60);

type JobAction = Arc<
    dyn Fn() -> Pin<
            Box<dyn Future<Output = Result<(), Box<dyn std::error::Error + Send + Sync>>> + Send>,
        > + Send
        + Sync,
>;

/// A named job that fires daily at a fixed local time, forever.
///
/// The action is a plain function of whatever capabilities it captured at
/// construction (store handle, notification gate); the scheduler keeps no
/// state for it between firings.
pub struct RecurringJob {
    name: String,
    fire_at: NaiveTime,
    zone: FixedOffset,
    day_filter: Option<Weekday>,
    action: JobAction,
}

impl RecurringJob {
    pub fn new<F, Fut>(
        name: impl Into<String>,
        fire_at: NaiveTime,
        zone: FixedOffset,
        day_filter: Option<Weekday>,
        action: F,
    ) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), Box<dyn std::error::Error + Send + Sync>>>
            + Send
            + 'static,
    {
        Self {
            name: name.into(),
            fire_at,
            zone,
            day_filter,
            action: Arc::new(move || Box::pin(action())),
        }
    }
}

/// Owns the registered jobs and their timer tasks.
///
/// Nothing about the next fire time is persisted: a restart recomputes every
/// delay from the new "now".
pub struct JobScheduler {
    jobs: Vec<RecurringJob>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl JobScheduler {
    pub fn new() -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            jobs: Vec::new(),
            shutdown_tx,
            shutdown_rx,
        }
    }

    pub fn register(&mut self, job: RecurringJob) {
        info!("Registered recurring job '{}'", job.name);
        self.jobs.push(job);
    }

    /// Spawns one timer task per registered job. The tasks run until `stop`
    /// is called or the scheduler is dropped.
    pub fn start(&mut self) {
        for job in self.jobs.drain(..) {
            let shutdown = self.shutdown_rx.clone();
            tokio::spawn(run_job(job, shutdown));
        }
    }

    /// Cancels pending timers. An in-flight firing runs to completion; no new
    /// ones are scheduled. Calling this twice is a no-op.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

async fn run_job(job: RecurringJob, mut shutdown: watch::Receiver<bool>) {
    let now = Utc::now().with_timezone(&job.zone);
    let delay = recurrence::initial_delay(now, job.fire_at, job.day_filter);
    info!(
        "Job '{}' first fires in {} seconds",
        job.name,
        delay.num_seconds()
    );

    let mut next = Instant::now() + delay.to_std().unwrap_or_default();
    // the local occurrence each tick stands for; advanced in lockstep with
    // `next` so the weekday gate follows the schedule rather than whatever
    // the clock says after a slow action
    let mut occurrence = now.naive_local() + delay;
    loop {
        if *shutdown.borrow() {
            info!("Job '{}' stopped", job.name);
            return;
        }

        tokio::select! {
            _ = time::sleep_until(next) => {}
            changed = shutdown.changed() => {
                if changed.is_err() {
                    // scheduler dropped
                    return;
                }
                continue;
            }
        }

        match job.day_filter {
            Some(day) if occurrence.weekday() != day => {
                debug!(
                    "Job '{}' idle on {}, waiting for {}",
                    job.name,
                    occurrence.weekday(),
                    day
                );
            }
            _ => {
                if let Err(why) = (job.action)().await {
                    error!("Job '{}' firing at {} failed: {}", job.name, occurrence, why);
                }
            }
        }

        // fixed-rate: the next tick is measured from the scheduled time, and
        // any ticks an overrunning action swallowed are skipped
        next += PERIOD;
        occurrence = occurrence + Duration::days(1);
        while next <= Instant::now() {
            next += PERIOD;
            occurrence = occurrence + Duration::days(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn zone() -> FixedOffset {
        FixedOffset::west(6 * 3600)
    }

    fn counting_job(name: &str, fired: Arc<AtomicUsize>) -> RecurringJob {
        RecurringJob::new(
            name,
            NaiveTime::from_hms(8, 0, 0),
            zone(),
            None,
            move || {
                let fired = Arc::clone(&fired);
                async move {
                    fired.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn failing_action_does_not_cancel_future_firings() {
        let failures = Arc::new(AtomicUsize::new(0));
        let fired = Arc::new(AtomicUsize::new(0));

        let mut scheduler = JobScheduler::new();
        let counter = Arc::clone(&failures);
        scheduler.register(RecurringJob::new(
            "always-fails",
            NaiveTime::from_hms(8, 0, 0),
            zone(),
            None,
            move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err("boom".into())
                }
            },
        ));
        scheduler.register(counting_job("healthy", Arc::clone(&fired)));
        scheduler.start();

        // three days of paused time covers the initial delay plus two periods
        time::sleep(Duration::from_secs(3 * 86_400)).await;

        assert!(failures.load(Ordering::SeqCst) >= 2);
        assert!(fired.load(Ordering::SeqCst) >= 2);
        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn day_filter_gates_firings_between_weekly_occurrences() {
        let fired = Arc::new(AtomicUsize::new(0));

        let mut scheduler = JobScheduler::new();
        let counter = Arc::clone(&fired);
        scheduler.register(RecurringJob::new(
            "fridays-only",
            NaiveTime::from_hms(19, 45, 0),
            zone(),
            Some(Weekday::Fri),
            move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            },
        ));
        scheduler.start();

        // the first fire lands on a Friday at most seven days out; the daily
        // ticks in between must stay silent, leaving only weekly occurrences
        // inside a fifteen-day window
        time::sleep(Duration::from_secs(15 * 86_400)).await;

        let count = fired.load(Ordering::SeqCst);
        assert!(count >= 2, "weekly job never refired, count {}", count);
        assert!(count <= 3, "daily ticks leaked through the gate, count {}", count);
        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn overrunning_action_skips_the_swallowed_tick() {
        let fired = Arc::new(AtomicUsize::new(0));

        let mut scheduler = JobScheduler::new();
        let counter = Arc::clone(&fired);
        scheduler.register(RecurringJob::new(
            "slow",
            NaiveTime::from_hms(8, 0, 0),
            zone(),
            None,
            move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    // runs well past the next scheduled tick
                    time::sleep(Duration::from_secs(30 * 3600)).await;
                    Ok(())
                }
            },
        ));
        scheduler.start();

        // with the swallowed tick skipped the job fires every 48 hours:
        // first fire, +48 h, +96 h inside this window. Queueing the tick
        // would fire again right after each 30 h action, roughly every 30 h.
        time::sleep(Duration::from_secs(5 * 86_400 + 3_600)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 3);
        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_future_firings_and_is_idempotent() {
        let fired = Arc::new(AtomicUsize::new(0));

        let mut scheduler = JobScheduler::new();
        scheduler.register(counting_job("stopped-early", Arc::clone(&fired)));
        scheduler.start();
        scheduler.stop();
        scheduler.stop();

        time::sleep(Duration::from_secs(2 * 86_400)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
