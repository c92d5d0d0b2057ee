//! `matchday-core` — shared types and configuration for the Matchday service.
//!
//! Everything that more than one subsystem needs lives here: the loaded
//! configuration ([`config::MatchdayConfig`]), the normalized fixture record
//! ([`types::Fixture`]), and the fired-reminder payload ([`notice::ReminderNotice`])
//! that travels from the scheduler to the delivery channel.

pub mod config;
pub mod error;
pub mod notice;
pub mod types;

pub use config::MatchdayConfig;
pub use error::{MatchdayError, Result};
pub use notice::ReminderNotice;
pub use types::{CompetitionKind, Fixture};
