use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use matchday_core::types::Fixture;

/// Snapshot of the last successful feed fetch.
///
/// Replaced wholesale by the resync controller; read by the chat commands.
/// Never updated on a failed fetch, so a feed outage leaves the last good
/// snapshot visible (same stale-over-empty policy as the schedule itself).
#[derive(Clone, Default)]
pub struct FixtureCache {
    inner: Arc<RwLock<Vec<Fixture>>>,
}

impl FixtureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot with a fresh fixture list.
    pub fn replace(&self, fixtures: Vec<Fixture>) {
        *self.inner.write().unwrap() = fixtures;
    }

    /// Up to `limit` fixtures kicking off after `now`, soonest first.
    pub fn upcoming(&self, now: DateTime<Utc>, limit: usize) -> Vec<Fixture> {
        self.inner
            .read()
            .unwrap()
            .iter()
            .filter(|f| f.kickoff > now)
            .take(limit)
            .cloned()
            .collect()
    }
}
