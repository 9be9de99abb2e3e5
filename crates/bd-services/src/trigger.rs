//! Calendar trigger for the lifecycle sweep
//!
//! One task per phase. Each task sleeps until the phase's next wall-clock time
//! in the business time zone, runs the phase for the clock's "today", and
//! loops until the shutdown token is cancelled.

use std::sync::Arc;
use std::time::Duration;

use bd_core::clock::Clock;
use bd_core::config::{ConfigError, SchedulerConfig};
use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use chrono_tz::Tz;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::lifecycle::{LifecycleScheduler, Phase};

const FALLBACK_SLEEP: Duration = Duration::from_secs(60);

/// Time left until the next `at` in `tz`, measured from `now`
pub fn duration_until_next(at: NaiveTime, tz: Tz, now: DateTime<Utc>) -> Duration {
    let local_now = now.with_timezone(&tz);
    let today = local_now.date_naive();
    let target_date = if local_now.time() >= at {
        today.succ_opt().unwrap_or(today)
    } else {
        today
    };

    let naive_target = target_date.and_time(at);
    let target = match naive_target.and_local_timezone(tz).earliest() {
        Some(t) => t,
        // Skipped by a DST jump
        None => match (naive_target + TimeDelta::hours(1)).and_local_timezone(tz).earliest() {
            Some(t) => t,
            None => {
                tracing::error!(%at, %tz, "Cannot resolve local trigger time, retrying later");
                return FALLBACK_SLEEP;
            }
        },
    };

    target
        .signed_duration_since(local_now)
        .to_std()
        .ok()
        .filter(|d| !d.is_zero())
        .unwrap_or(FALLBACK_SLEEP)
}

pub struct CalendarTrigger {
    lifecycle: Arc<LifecycleScheduler>,
    clock: Arc<dyn Clock>,
    tz: Tz,
    schedule: Vec<(Phase, NaiveTime)>,
    shutdown: CancellationToken,
}

impl CalendarTrigger {
    pub fn new(
        lifecycle: Arc<LifecycleScheduler>,
        clock: Arc<dyn Clock>,
        tz: Tz,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            lifecycle,
            clock,
            tz,
            schedule: Vec::new(),
            shutdown,
        }
    }

    /// Trigger with the four configured phase times
    pub fn from_config(
        lifecycle: Arc<LifecycleScheduler>,
        clock: Arc<dyn Clock>,
        config: &SchedulerConfig,
        shutdown: CancellationToken,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(lifecycle, clock, config.tz()?, shutdown)
            .with_phase(Phase::Start, config.start_time()?)
            .with_phase(Phase::Finish, config.finish_time()?)
            .with_phase(Phase::Delivery, config.delivery_time()?)
            .with_phase(Phase::Progress, config.progress_time()?))
    }

    pub fn with_phase(mut self, phase: Phase, at: NaiveTime) -> Self {
        self.schedule.push((phase, at));
        self
    }

    /// Start one task per scheduled phase
    pub fn spawn(self) -> Vec<JoinHandle<()>> {
        let trigger = Arc::new(self);
        trigger
            .schedule
            .iter()
            .map(|&(phase, at)| {
                let trigger = trigger.clone();
                tokio::spawn(async move { trigger.phase_loop(phase, at).await })
            })
            .collect()
    }

    async fn phase_loop(&self, phase: Phase, at: NaiveTime) {
        tracing::info!(phase = %phase, %at, tz = %self.tz, "Calendar trigger armed");
        loop {
            let sleep_for = duration_until_next(at, self.tz, self.clock.now());
            tracing::debug!(phase = %phase, minutes = sleep_for.as_secs() / 60, "Next sweep scheduled");

            tokio::select! {
                _ = tokio::time::sleep(sleep_for) => {}
                _ = self.shutdown.cancelled() => {
                    tracing::info!(phase = %phase, "Calendar trigger stopped");
                    return;
                }
            }

            let date = self.clock.today();
            if let Err(e) = self.lifecycle.run(phase, date).await {
                tracing::error!(phase = %phase, %date, error = %e, "Scheduled sweep failed");
            }
        }
    }
}
