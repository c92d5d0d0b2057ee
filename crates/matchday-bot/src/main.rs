use std::net::SocketAddr;
use std::sync::Arc;

use teloxide::Bot;
use tracing::{error, info};
use url::Url;

use matchday_core::config::{DeliveryMode, MatchdayConfig, TelegramConfig};
use matchday_core::notice::ReminderNotice;
use matchday_fixtures::{FixtureCache, FixtureClient};
use matchday_registry::RecipientRegistry;
use matchday_scheduler::SchedulerEngine;
use matchday_telegram::dispatch::run_delivery;
use matchday_telegram::monitor::run_webhook_monitor;
use matchday_telegram::{
    BotContext, BotSender, NotificationDispatcher, RegistrationStatus, ResolvedWebhook,
    TelegramAdapter,
};

mod app;
mod resync;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "matchday=info,tower_http=debug".into()),
        )
        .init();

    // Load config: explicit MATCHDAY_CONFIG path > ~/.matchday/matchday.toml.
    // Missing credentials abort here, before any subsystem starts.
    let config_path = std::env::var("MATCHDAY_CONFIG").ok();
    let config = MatchdayConfig::load(config_path.as_deref())?;
    let tz = config.schedule.tz()?;

    ensure_parent_dir(&config.database.path);
    info!(path = %config.database.path, "opening SQLite database");
    let registry = RecipientRegistry::new(rusqlite::Connection::open(&config.database.path)?)?;

    // Fired-reminder channel: SchedulerEngine → delivery task.
    let (fired_tx, fired_rx) = tokio::sync::mpsc::channel::<ReminderNotice>(256);
    let engine = SchedulerEngine::new(fired_tx);
    let scheduler = engine.handle();
    let cache = FixtureCache::new();
    let bot = Bot::new(&config.telegram.bot_token);

    // Service context for the chat commands — constructed once, passed down.
    let ctx = Arc::new(BotContext {
        registry: registry.clone(),
        fixtures: cache.clone(),
        scheduler: scheduler.clone(),
        team_name: config.feed.team_name.clone(),
        tz,
    });

    let dispatcher = Arc::new(NotificationDispatcher::new(
        BotSender::new(bot.clone()),
        registry.clone(),
        config.feed.team_name.clone(),
        tz,
    ));
    tokio::spawn(run_delivery(dispatcher, fired_rx));

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(engine.run(shutdown_rx.clone()));

    // Resync at startup and then daily at the configured local boundary.
    let controller = resync::ResyncController::new(
        FixtureClient::new(&config.feed),
        scheduler.clone(),
        cache.clone(),
        &config.schedule,
        tz,
    );
    tokio::spawn(controller.run(shutdown_rx.clone()));

    // Webhook deployments get the registration health monitor; a broken
    // webhook config disables that subsystem and falls back to polling.
    let webhook = resolve_webhook(&config.telegram);
    let registration = webhook.as_ref().map(|webhook| {
        let status = RegistrationStatus::new();
        tokio::spawn(run_webhook_monitor(
            bot.clone(),
            webhook.url.clone(),
            status.clone(),
            config.telegram.monitor_interval_secs,
            shutdown_rx.clone(),
        ));
        status
    });

    let adapter = TelegramAdapter::new(bot, ctx);
    tokio::spawn(adapter.run(webhook));

    let state = Arc::new(app::AppState {
        scheduler,
        registry,
        registration,
    });
    let router = app::build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    info!(%addr, "matchday liveness server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    // Signal the periodic tasks to stop.
    let _ = shutdown_tx.send(true);
    Ok(())
}

/// Resolve and validate webhook settings. Returns `None` in polling mode, or
/// when webhook mode is requested but misconfigured — the subsystem disables
/// itself rather than crashing the process.
fn resolve_webhook(config: &TelegramConfig) -> Option<ResolvedWebhook> {
    if config.mode != DeliveryMode::Webhook {
        return None;
    }
    let Some(webhook) = &config.webhook else {
        error!("webhook mode requested but [telegram.webhook] is missing — falling back to long polling");
        return None;
    };
    let url = match Url::parse(&webhook.public_url) {
        Ok(url) => url,
        Err(e) => {
            error!(error = %e, "invalid telegram.webhook.public_url — falling back to long polling");
            return None;
        }
    };
    let addr: SocketAddr = match format!("{}:{}", webhook.bind, webhook.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(error = %e, "invalid telegram.webhook bind address — falling back to long polling");
            return None;
        }
    };
    Some(ResolvedWebhook { url, addr })
}

/// Ensure the parent directory for a file path exists.
fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}
