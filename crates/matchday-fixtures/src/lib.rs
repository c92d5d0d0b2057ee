//! `matchday-fixtures` — fixture feed client for football-data.org (v4).
//!
//! [`FixtureClient`] fetches the tracked team's scheduled matches and
//! normalizes them into [`matchday_core::Fixture`] records. Records with a
//! missing or unparsable kickoff time are dropped and logged as data errors —
//! a bad row never fails the fetch. Feed failures are never fatal: the resync
//! controller logs them and keeps the previously installed schedule.
//!
//! [`FixtureCache`] holds a snapshot of the last successful fetch for the chat
//! commands (`/start`, `/next`), which must not hit the feed on every message.

pub mod cache;
pub mod client;
pub mod error;

pub use cache::FixtureCache;
pub use client::{FixtureClient, FixtureFeed};
pub use error::{FeedError, Result};
