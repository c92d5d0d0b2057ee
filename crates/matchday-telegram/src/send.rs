//! Message formatting and sending helpers.
//!
//! Reminders are short plain-text messages, so no parse mode and no chunking —
//! Telegram's 4096-character limit is never in play here.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use teloxide::prelude::*;

use matchday_core::notice::ReminderNotice;
use matchday_core::types::Fixture;

use crate::error::TelegramError;

/// Send plain text to a chat.
pub async fn send_text(bot: &Bot, chat_id: ChatId, text: &str) -> Result<(), TelegramError> {
    bot.send_message(chat_id, text).await?;
    Ok(())
}

/// Kickoff instant rendered in the configured local timezone.
pub fn format_kickoff(kickoff: DateTime<Utc>, tz: Tz) -> String {
    kickoff
        .with_timezone(&tz)
        .format("%Y-%m-%d %H:%M %Z")
        .to_string()
}

/// The reminder message sent to every recipient when a job fires.
pub fn format_reminder(team_name: &str, notice: &ReminderNotice, tz: Tz) -> String {
    format!(
        "Reminder: {team_name} match against {} ({}) at {} in {} hours!",
        notice.opponent,
        notice.competition.label(),
        format_kickoff(notice.kickoff, tz),
        notice.lead_hours,
    )
}

/// One line of the upcoming-fixtures list shown by /start and /next.
pub fn format_fixture_line(fixture: &Fixture, tz: Tz) -> String {
    format!(
        "• {} vs {} — {}",
        fixture.competition.label(),
        fixture.opponent,
        format_kickoff(fixture.kickoff, tz),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use matchday_core::types::CompetitionKind;

    #[test]
    fn reminder_message_shape() {
        let notice = ReminderNotice {
            match_id: 1,
            opponent: "Real Madrid".into(),
            competition: CompetitionKind::LaLiga,
            kickoff: Utc.with_ymd_and_hms(2026, 9, 1, 19, 0, 0).unwrap(),
            lead_hours: 2,
        };
        let text = format_reminder("FC Barcelona", &notice, chrono_tz::Asia::Jerusalem);
        assert_eq!(
            text,
            "Reminder: FC Barcelona match against Real Madrid (La Liga) at 2026-09-01 22:00 IDT in 2 hours!"
        );
    }

    #[test]
    fn kickoff_rendered_in_local_timezone() {
        let kickoff = Utc.with_ymd_and_hms(2026, 1, 15, 19, 0, 0).unwrap();
        // Israel standard time is UTC+2 in January.
        assert_eq!(
            format_kickoff(kickoff, chrono_tz::Asia::Jerusalem),
            "2026-01-15 21:00 IST"
        );
    }

    #[test]
    fn fixture_line_shape() {
        let fixture = Fixture {
            id: 1,
            kickoff: Utc.with_ymd_and_hms(2026, 9, 1, 19, 0, 0).unwrap(),
            opponent: "Bayern München".into(),
            competition: CompetitionKind::ChampionsLeague,
        };
        let line = format_fixture_line(&fixture, chrono_tz::UTC);
        assert_eq!(
            line,
            "• Champions League vs Bayern München — 2026-09-01 19:00 UTC"
        );
    }
}
