//! Service context shared by the command handler and the dispatcher.

use chrono_tz::Tz;

use matchday_fixtures::FixtureCache;
use matchday_registry::RecipientRegistry;
use matchday_scheduler::SchedulerHandle;

/// Everything a Telegram handler needs, constructed once in `main` and passed
/// down explicitly — the single-instance-per-process pieces live here instead
/// of in module globals.
pub struct BotContext {
    pub registry: RecipientRegistry,
    pub fixtures: FixtureCache,
    pub scheduler: SchedulerHandle,
    /// Display name of the tracked team.
    pub team_name: String,
    /// Timezone for kickoff times shown in messages.
    pub tz: Tz,
}
