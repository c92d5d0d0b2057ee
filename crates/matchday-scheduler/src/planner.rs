use std::collections::HashSet;

use chrono::{DateTime, Utc};

use matchday_core::types::Fixture;

use crate::types::{JobKey, ReminderJob};

/// Derive the reminder jobs still in the future for `fixtures`.
///
/// Pure function of its inputs: the same fixtures, `now`, and lead times
/// always produce the same job set, which makes resync idempotent.
///
/// For each fixture kicking off strictly after `now`, one job per lead time
/// whose fire instant (`kickoff − lead`) is still ahead of `now` — a match
/// starting in 3 hours gets only its 2h reminder. Duplicate fixture ids in
/// the feed yield one job per `(match, lead)` pair. The result is ordered by
/// fire instant.
pub fn plan(fixtures: &[Fixture], now: DateTime<Utc>, lead_hours: &[u32]) -> Vec<ReminderJob> {
    let mut seen: HashSet<JobKey> = HashSet::new();
    let mut jobs: Vec<ReminderJob> = Vec::new();

    for fixture in fixtures {
        if fixture.kickoff <= now {
            continue;
        }
        for &lead in lead_hours {
            let job = ReminderJob::for_fixture(fixture, lead);
            if job.fire_at <= now {
                continue;
            }
            if !seen.insert(job.key) {
                continue;
            }
            jobs.push(job);
        }
    }

    jobs.sort_by_key(|j| (j.fire_at, j.key));
    jobs
}
