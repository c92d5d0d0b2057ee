//! Daily schedule resynchronization.
//!
//! One cycle: fetch fixtures, plan reminder jobs, swap them in as the next
//! schedule generation. A failed fetch is a no-op cycle — a stale schedule is
//! preferred over an empty one, so the installed generation is only replaced
//! when a fetch succeeds (even if the new list is legitimately empty).

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use tokio::sync::watch;
use tracing::{info, warn};

use matchday_core::config::ScheduleConfig;
use matchday_fixtures::{FixtureCache, FixtureFeed};
use matchday_scheduler::{plan, SchedulerHandle};

pub struct ResyncController<F: FixtureFeed> {
    feed: F,
    scheduler: SchedulerHandle,
    cache: FixtureCache,
    lead_hours: Vec<u32>,
    tz: Tz,
    boundary_hour: u32,
    boundary_minute: u32,
}

impl<F: FixtureFeed> ResyncController<F> {
    pub fn new(
        feed: F,
        scheduler: SchedulerHandle,
        cache: FixtureCache,
        schedule: &ScheduleConfig,
        tz: Tz,
    ) -> Self {
        Self {
            feed,
            scheduler,
            cache,
            lead_hours: schedule.lead_hours.clone(),
            tz,
            boundary_hour: schedule.resync_hour,
            boundary_minute: schedule.resync_minute,
        }
    }

    /// One fetch-plan-swap cycle. Returns `true` when a new generation was
    /// installed.
    pub async fn run_cycle(&self) -> bool {
        match self.feed.fetch().await {
            Ok(fixtures) => {
                let now = Utc::now();
                let jobs = plan(&fixtures, now, &self.lead_hours);
                info!(
                    fixtures = fixtures.len(),
                    jobs = jobs.len(),
                    "resync: schedule rebuilt from feed"
                );
                self.cache.replace(fixtures);
                self.scheduler.resync_to(jobs);
                true
            }
            Err(e) => {
                warn!(error = %e, "resync: fixture fetch failed — keeping the current schedule");
                false
            }
        }
    }

    /// Run once immediately, then at the configured local time every day,
    /// until `shutdown` broadcasts `true`.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("resync controller started");
        self.run_cycle().await;

        loop {
            let next = next_daily_instant(
                self.tz,
                self.boundary_hour,
                self.boundary_minute,
                Utc::now(),
            );
            let wait = (next - Utc::now())
                .to_std()
                .unwrap_or(std::time::Duration::from_secs(1));

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    self.run_cycle().await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("resync controller shutting down");
                        break;
                    }
                }
            }
        }
    }
}

/// The next occurrence of `hour:minute` local time in `tz`, strictly after
/// `after`.
///
/// Scans forward day by day: today's boundary may already have passed, and a
/// boundary inside a spring-forward DST gap does not exist on that day at all,
/// in which case the next day's boundary applies. An ambiguous (fall-back)
/// boundary resolves to its first occurrence.
pub(crate) fn next_daily_instant(
    tz: Tz,
    hour: u32,
    minute: u32,
    after: DateTime<Utc>,
) -> DateTime<Utc> {
    let local = after.with_timezone(&tz);
    for offset in 0..3 {
        let date = local.date_naive() + Duration::days(offset);
        if let Some(candidate) = tz
            .with_ymd_and_hms(date.year(), date.month(), date.day(), hour, minute, 0)
            .earliest()
        {
            if candidate > local {
                return candidate.with_timezone(&Utc);
            }
        }
    }
    // Unreachable for a valid hour:minute; keeps the cycle alive regardless.
    after + Duration::days(1)
}
