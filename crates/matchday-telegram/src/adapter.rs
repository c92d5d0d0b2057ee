//! Telegram channel adapter.
//!
//! Wraps a teloxide `Bot` + `Dispatcher` and drives the inbound update loop
//! until the process exits — long polling by default, or a registered webhook
//! listener in webhook deployments. Transport framing of webhook callbacks is
//! teloxide's concern; updates land in the same command handler either way.

use std::net::SocketAddr;
use std::sync::Arc;

use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;
use tracing::{error, info, warn};
use url::Url;

use crate::context::BotContext;
use crate::handler::{handle_command, Command};

/// Webhook settings resolved and validated at startup.
#[derive(Debug, Clone)]
pub struct ResolvedWebhook {
    /// Public HTTPS URL Telegram delivers updates to.
    pub url: Url,
    /// Local address the webhook listener binds.
    pub addr: SocketAddr,
}

pub struct TelegramAdapter {
    bot: Bot,
    ctx: Arc<BotContext>,
}

impl TelegramAdapter {
    pub fn new(bot: Bot, ctx: Arc<BotContext>) -> Self {
        Self { bot, ctx }
    }

    /// Drive the update loop for the lifetime of the process.
    ///
    /// With `webhook` set, registers and serves a webhook listener; if that
    /// fails to start, the webhook subsystem is abandoned for this run and the
    /// adapter falls back to long polling so delivery keeps working.
    pub async fn run(self, webhook: Option<ResolvedWebhook>) {
        let handler = Update::filter_message()
            .filter_command::<Command>()
            .endpoint(handle_command);

        let mut dispatcher = Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![self.ctx])
            .default_handler(|_upd| async {})
            .build();

        if let Some(webhook) = webhook {
            let options = webhooks::Options::new(webhook.addr, webhook.url.clone());
            match webhooks::axum(self.bot.clone(), options).await {
                Ok(listener) => {
                    info!(url = %webhook.url, "Telegram: starting webhook dispatcher");
                    dispatcher
                        .dispatch_with_listener(
                            listener,
                            LoggingErrorHandler::with_custom_text(
                                "error from the webhook update listener",
                            ),
                        )
                        .await;
                    return;
                }
                Err(e) => {
                    error!(error = %e, "webhook listener failed to start — falling back to long polling");
                }
            }
        }

        // Polling conflicts with a registered webhook; clear any stale one.
        if let Err(e) = self.bot.delete_webhook().await {
            warn!(error = %e, "could not clear stale webhook registration");
        }
        info!("Telegram: starting long-polling dispatcher");
        dispatcher.dispatch().await;
    }
}
