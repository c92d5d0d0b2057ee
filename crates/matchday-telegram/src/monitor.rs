//! Webhook registration health monitor.
//!
//! Telegram webhook registrations can drift silently: another deployment of
//! the same token, a platform migration, or a manual `setWebhook` all leave
//! this process running but unreachable. The monitor polls `getWebhookInfo`
//! at a fixed interval, compares the registered URL with the expected one,
//! and re-registers on mismatch. A failed tick is logged and retried on the
//! next one; the loop only ends at process shutdown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use teloxide::prelude::*;
use tokio::sync::watch;
use tracing::{info, warn};
use url::Url;

/// Shared flag answering "does the registration currently point at us?",
/// surfaced by the liveness probe. Starts out unmatched until the first
/// successful check.
#[derive(Clone, Default)]
pub struct RegistrationStatus {
    matched: Arc<AtomicBool>,
}

impl RegistrationStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matched(&self) -> bool {
        self.matched.load(Ordering::Relaxed)
    }

    fn set(&self, matched: bool) {
        self.matched.store(matched, Ordering::Relaxed);
    }
}

/// `true` when the currently registered webhook URL is exactly `expected`.
/// An empty registration (no webhook set) is a mismatch.
pub fn registration_matches(current: Option<&str>, expected: &str) -> bool {
    current == Some(expected)
}

/// Poll the webhook registration every `interval_secs` until `shutdown`
/// broadcasts `true`, repairing it whenever it has drifted.
pub async fn run_webhook_monitor(
    bot: Bot,
    expected: Url,
    status: RegistrationStatus,
    interval_secs: u64,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(url = %expected, interval_secs, "webhook health monitor started");
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    loop {
        tokio::select! {
            _ = interval.tick() => check_registration(&bot, &expected, &status).await,
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    info!("webhook health monitor shutting down");
                    break;
                }
            }
        }
    }
}

async fn check_registration(bot: &Bot, expected: &Url, status: &RegistrationStatus) {
    let info = match bot.get_webhook_info().await {
        Ok(info) => info,
        Err(e) => {
            warn!(error = %e, "webhook info query failed — retrying next tick");
            return;
        }
    };

    let current = info.url.as_ref().map(Url::as_str);
    if registration_matches(current, expected.as_str()) {
        status.set(true);
        return;
    }

    status.set(false);
    warn!(
        current = current.unwrap_or("<none>"),
        expected = %expected,
        "webhook registration drifted — re-registering"
    );

    match bot.set_webhook(expected.clone()).await {
        Ok(_) => {
            info!(url = %expected, "webhook re-registered");
            status.set(true);
        }
        Err(e) => warn!(error = %e, "webhook re-registration failed — retrying next tick"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_url_matches() {
        assert!(registration_matches(
            Some("https://bot.example.com/webhook"),
            "https://bot.example.com/webhook"
        ));
    }

    #[test]
    fn different_url_is_a_mismatch() {
        assert!(!registration_matches(
            Some("https://old.example.com/webhook"),
            "https://bot.example.com/webhook"
        ));
    }

    #[test]
    fn missing_registration_is_a_mismatch() {
        assert!(!registration_matches(None, "https://bot.example.com/webhook"));
    }

    #[test]
    fn status_starts_unmatched() {
        let status = RegistrationStatus::new();
        assert!(!status.matched());
        status.set(true);
        assert!(status.matched());
    }
}
