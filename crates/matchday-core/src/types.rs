use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Competition bucket for a fixture, derived from the feed's competition label.
///
/// The fallback is intentionally permissive: anything that is neither the
/// Champions League nor La Liga lands in [`CompetitionKind::League`], matching
/// the behaviour the service has always had (domestic cups included).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionKind {
    ChampionsLeague,
    LaLiga,
    League,
}

impl CompetitionKind {
    /// Classify a raw competition label from the feed.
    pub fn classify(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.contains("champions") {
            CompetitionKind::ChampionsLeague
        } else if lower.contains("liga") {
            CompetitionKind::LaLiga
        } else {
            CompetitionKind::League
        }
    }

    /// Short human-readable label used in chat messages.
    pub fn label(&self) -> &'static str {
        match self {
            CompetitionKind::ChampionsLeague => "Champions League",
            CompetitionKind::LaLiga => "La Liga",
            CompetitionKind::League => "League",
        }
    }
}

/// A normalized upcoming match from the fixture feed.
///
/// Immutable within one scheduling cycle; the whole list is replaced on every
/// resync. Kickoff instants are kept in UTC — the configured local timezone is
/// applied only when formatting messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    /// Stable external match id from the feed.
    pub id: u64,
    /// Kickoff instant (UTC).
    pub kickoff: DateTime<Utc>,
    /// Name of the opposing team.
    pub opponent: String,
    /// Competition bucket.
    pub competition: CompetitionKind,
}
