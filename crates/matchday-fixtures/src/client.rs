use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use matchday_core::config::FeedConfig;
use matchday_core::types::{CompetitionKind, Fixture};

use crate::error::{FeedError, Result};

/// Seam between the resync controller and the real feed, so resync behaviour
/// can be tested without network access.
#[async_trait]
pub trait FixtureFeed: Send + Sync {
    /// Fetch all scheduled fixtures for the tracked team, kickoff-ordered.
    async fn fetch(&self) -> Result<Vec<Fixture>>;
}

/// HTTP client for the football-data.org v4 fixtures endpoint.
pub struct FixtureClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
    team_id: u64,
}

impl FixtureClient {
    pub fn new(config: &FeedConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_token: config.api_token.clone(),
            team_id: config.team_id,
        }
    }
}

#[async_trait]
impl FixtureFeed for FixtureClient {
    async fn fetch(&self) -> Result<Vec<Fixture>> {
        let url = format!("{}/teams/{}/matches", self.base_url, self.team_id);

        debug!(%url, "fetching scheduled fixtures");

        let resp = self
            .http
            .get(&url)
            .query(&[("status", "SCHEDULED")])
            .header("X-Auth-Token", &self.api_token)
            .send()
            .await
            .map_err(|e| FeedError::Unavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Unavailable(format!("HTTP {status}")));
        }

        let payload: FeedPayload = resp
            .json()
            .await
            .map_err(|e| FeedError::Malformed(e.to_string()))?;

        Ok(normalize(payload, self.team_id))
    }
}

// --- wire format --------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FeedPayload {
    #[serde(default)]
    matches: Vec<RawMatch>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMatch {
    id: u64,
    utc_date: Option<String>,
    competition: Option<RawCompetition>,
    home_team: Option<RawTeam>,
    away_team: Option<RawTeam>,
}

#[derive(Debug, Deserialize)]
struct RawCompetition {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTeam {
    id: Option<u64>,
    name: Option<String>,
}

/// Convert the raw payload into normalized fixtures, kickoff-ordered.
///
/// Rows with a missing or unparsable `utcDate` are data errors: dropped,
/// counted and logged, never fatal.
fn normalize(payload: FeedPayload, team_id: u64) -> Vec<Fixture> {
    let total = payload.matches.len();
    let mut fixtures: Vec<Fixture> = Vec::with_capacity(total);
    let mut dropped = 0usize;

    for raw in payload.matches {
        let kickoff = match parse_kickoff(raw.utc_date.as_deref()) {
            Some(dt) => dt,
            None => {
                dropped += 1;
                warn!(match_id = raw.id, "fixture has no usable kickoff time — dropped");
                continue;
            }
        };

        let label = raw
            .competition
            .and_then(|c| c.name)
            .unwrap_or_default();

        fixtures.push(Fixture {
            id: raw.id,
            kickoff,
            opponent: resolve_opponent(raw.home_team, raw.away_team, team_id),
            competition: CompetitionKind::classify(&label),
        });
    }

    fixtures.sort_by_key(|f| (f.kickoff, f.id));
    if dropped > 0 {
        warn!(dropped, total, "fixtures dropped during normalization");
    }
    fixtures
}

fn parse_kickoff(utc_date: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = utc_date?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// The opponent is whichever participant is not the tracked team.
fn resolve_opponent(home: Option<RawTeam>, away: Option<RawTeam>, team_id: u64) -> String {
    let name_of = |team: Option<RawTeam>| team.and_then(|t| t.name);
    let home_is_us = home
        .as_ref()
        .and_then(|t| t.id)
        .map(|id| id == team_id)
        .unwrap_or(false);

    let opponent = if home_is_us { name_of(away) } else { name_of(home) };
    opponent.unwrap_or_else(|| "Unknown Opponent".to_string())
}
