//! `matchday-telegram` — Telegram delivery channel.
//!
//! Wraps a teloxide `Bot`: the [`adapter::TelegramAdapter`] drives the inbound
//! dispatcher (long polling or webhook), [`dispatch::NotificationDispatcher`]
//! fans fired reminders out to every registered chat with per-recipient
//! failure isolation, and [`monitor::run_webhook_monitor`] keeps the webhook
//! registration pointed at this process.

pub mod adapter;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod monitor;
pub mod send;

pub use adapter::{ResolvedWebhook, TelegramAdapter};
pub use context::BotContext;
pub use dispatch::{BotSender, DispatchOutcome, NotificationDispatcher};
pub use error::TelegramError;
pub use monitor::RegistrationStatus;
