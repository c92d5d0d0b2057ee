//! Fired-reminder payload — shared between the scheduler engine and the
//! delivery channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::CompetitionKind;

/// A reminder that has come due. Produced by the scheduler engine when a job
/// fires; consumed by the notification dispatcher, which fans it out to every
/// currently registered chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderNotice {
    /// External match id — used for logging and dedup keys.
    pub match_id: u64,
    /// Opponent name, for the message text.
    pub opponent: String,
    /// Competition bucket, for the message text.
    pub competition: CompetitionKind,
    /// Kickoff instant (UTC); formatted into the configured timezone at send time.
    pub kickoff: DateTime<Utc>,
    /// How many hours before kickoff this reminder was scheduled for.
    pub lead_hours: u32,
}
