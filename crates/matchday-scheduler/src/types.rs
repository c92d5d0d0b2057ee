use chrono::{DateTime, Duration, Utc};

use matchday_core::notice::ReminderNotice;
use matchday_core::types::Fixture;

/// Canonical job identity: one reminder per `(match, lead time)` pair.
/// Compared by value — no string-concatenated ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobKey {
    pub match_id: u64,
    pub lead_hours: u32,
}

/// A planned reminder firing. Owned by the scheduler engine from installation
/// until it fires or its generation is superseded.
#[derive(Debug, Clone)]
pub struct ReminderJob {
    pub key: JobKey,
    /// Kickoff minus the lead time.
    pub fire_at: DateTime<Utc>,
    /// Payload handed to the dispatcher when the job fires.
    pub notice: ReminderNotice,
}

impl ReminderJob {
    /// Build the job for `fixture` at `lead_hours` before kickoff.
    pub fn for_fixture(fixture: &Fixture, lead_hours: u32) -> Self {
        Self {
            key: JobKey {
                match_id: fixture.id,
                lead_hours,
            },
            fire_at: fixture.kickoff - Duration::hours(lead_hours as i64),
            notice: ReminderNotice {
                match_id: fixture.id,
                opponent: fixture.opponent.clone(),
                competition: fixture.competition,
                kickoff: fixture.kickoff,
                lead_hours,
            },
        }
    }
}
