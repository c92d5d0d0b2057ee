//! Reminder fan-out: one fired job → every currently registered chat.

use std::sync::Arc;

use async_trait::async_trait;
use chrono_tz::Tz;
use futures_util::future::join_all;
use teloxide::prelude::*;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use matchday_core::notice::ReminderNotice;
use matchday_registry::RecipientRegistry;

use crate::error::TelegramError;
use crate::send;

/// Outbound send primitive, abstracted so fan-out behaviour is testable
/// without a live bot.
#[async_trait]
pub trait NoticeSender: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TelegramError>;
}

/// Production sender backed by a teloxide `Bot`.
pub struct BotSender {
    bot: Bot,
}

impl BotSender {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl NoticeSender for BotSender {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        send::send_text(&self.bot, ChatId(chat_id), text).await
    }
}

/// Aggregate result of one fan-out, for observability only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub delivered: usize,
    pub failed: usize,
}

/// Fans a fired reminder out to the registry's current membership.
///
/// The recipient list is read at fire time, never cached across firings —
/// chats registered after the schedule was built still get the reminder, and
/// chats that left are not contacted. One failing or unreachable recipient is
/// logged and counted; it never aborts delivery to the rest, and `dispatch`
/// itself never fails.
pub struct NotificationDispatcher<S> {
    sender: S,
    registry: RecipientRegistry,
    team_name: String,
    tz: Tz,
}

impl<S: NoticeSender> NotificationDispatcher<S> {
    pub fn new(sender: S, registry: RecipientRegistry, team_name: String, tz: Tz) -> Self {
        Self {
            sender,
            registry,
            team_name,
            tz,
        }
    }

    pub async fn dispatch(&self, notice: &ReminderNotice) -> DispatchOutcome {
        let recipients = match self.registry.list() {
            Ok(recipients) => recipients,
            Err(e) => {
                warn!(error = %e, "dispatch: recipient list unavailable — nothing sent");
                return DispatchOutcome {
                    delivered: 0,
                    failed: 0,
                };
            }
        };

        if recipients.is_empty() {
            debug!(match_id = notice.match_id, "dispatch: no recipients registered");
            return DispatchOutcome {
                delivered: 0,
                failed: 0,
            };
        }

        let text = send::format_reminder(&self.team_name, notice, self.tz);

        // All recipients are attempted concurrently; a slow one delays only
        // its own send.
        let attempts = recipients.iter().map(|recipient| {
            let text = text.as_str();
            async move {
                let chat_id: i64 = match recipient.parse() {
                    Ok(id) => id,
                    Err(_) => {
                        warn!(%recipient, "dispatch: recipient is not a telegram chat id");
                        return false;
                    }
                };
                match self.sender.send_text(chat_id, text).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(%recipient, error = %e, "reminder delivery failed");
                        false
                    }
                }
            }
        });

        let results = join_all(attempts).await;
        let delivered = results.iter().filter(|ok| **ok).count();
        let failed = results.len() - delivered;

        info!(
            match_id = notice.match_id,
            lead_hours = notice.lead_hours,
            delivered,
            failed,
            "reminder dispatched"
        );
        DispatchOutcome { delivered, failed }
    }
}

/// Background task consuming fired reminders from the scheduler engine.
///
/// Each firing is dispatched in its own spawned task, so a slow fan-out never
/// delays the next due reminder.
pub async fn run_delivery<S: NoticeSender + 'static>(
    dispatcher: Arc<NotificationDispatcher<S>>,
    mut rx: mpsc::Receiver<ReminderNotice>,
) {
    while let Some(notice) = rx.recv().await {
        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move {
            dispatcher.dispatch(&notice).await;
        });
    }
    info!("delivery task exiting (channel closed)");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use matchday_core::types::CompetitionKind;
    use std::sync::Mutex;

    struct FakeSender {
        fail_chat: Option<i64>,
        sent: Mutex<Vec<i64>>,
    }

    impl FakeSender {
        fn new(fail_chat: Option<i64>) -> Self {
            Self {
                fail_chat,
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl NoticeSender for FakeSender {
        async fn send_text(&self, chat_id: i64, _text: &str) -> Result<(), TelegramError> {
            if self.fail_chat == Some(chat_id) {
                return Err(TelegramError::InvalidChatId("unreachable".into()));
            }
            self.sent.lock().unwrap().push(chat_id);
            Ok(())
        }
    }

    fn notice() -> ReminderNotice {
        ReminderNotice {
            match_id: 42,
            opponent: "Girona".into(),
            competition: CompetitionKind::LaLiga,
            kickoff: Utc::now() + chrono::Duration::hours(2),
            lead_hours: 2,
        }
    }

    fn dispatcher(
        fail_chat: Option<i64>,
        chats: &[&str],
    ) -> NotificationDispatcher<FakeSender> {
        let registry =
            RecipientRegistry::new(rusqlite::Connection::open_in_memory().unwrap()).unwrap();
        for chat in chats {
            registry.add(chat).unwrap();
        }
        NotificationDispatcher::new(
            FakeSender::new(fail_chat),
            registry,
            "FC Barcelona".into(),
            chrono_tz::UTC,
        )
    }

    #[tokio::test]
    async fn all_recipients_reached() {
        let d = dispatcher(None, &["1001", "1002"]);
        let outcome = d.dispatch(&notice()).await;
        assert_eq!(
            outcome,
            DispatchOutcome {
                delivered: 2,
                failed: 0
            }
        );
        let mut sent = d.sender.sent.lock().unwrap().clone();
        sent.sort_unstable();
        assert_eq!(sent, vec![1001, 1002]);
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_the_rest() {
        let d = dispatcher(Some(1002), &["1001", "1002", "1003"]);
        let outcome = d.dispatch(&notice()).await;
        assert_eq!(outcome.delivered, 2);
        assert_eq!(outcome.failed, 1);
        let mut sent = d.sender.sent.lock().unwrap().clone();
        sent.sort_unstable();
        assert_eq!(sent, vec![1001, 1003]);
    }

    #[tokio::test]
    async fn non_numeric_recipient_counted_failed() {
        let d = dispatcher(None, &["1001", "not-a-chat"]);
        let outcome = d.dispatch(&notice()).await;
        assert_eq!(outcome.delivered, 1);
        assert_eq!(outcome.failed, 1);
    }

    #[tokio::test]
    async fn empty_registry_is_a_quiet_noop() {
        let d = dispatcher(None, &[]);
        let outcome = d.dispatch(&notice()).await;
        assert_eq!(
            outcome,
            DispatchOutcome {
                delivered: 0,
                failed: 0
            }
        );
    }

    #[tokio::test]
    async fn membership_read_at_fire_time() {
        let d = dispatcher(None, &["1001"]);
        // A chat registered after the schedule was built still receives the
        // reminder fired later.
        d.registry.add("1002").unwrap();
        let outcome = d.dispatch(&notice()).await;
        assert_eq!(outcome.delivered, 2);
    }
}
