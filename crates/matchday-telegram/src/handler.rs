//! Chat command handler registered in the teloxide Dispatcher.

use std::sync::Arc;

use chrono::Utc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::warn;

use crate::context::BotContext;
use crate::send;

/// Fixtures shown by /start and /next.
const UPCOMING_LIMIT: usize = 5;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Match reminder commands:")]
pub enum Command {
    #[command(description = "subscribe this chat to match reminders")]
    Start,
    #[command(description = "unsubscribe this chat")]
    Stop,
    #[command(description = "list upcoming matches")]
    Next,
}

pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    ctx: Arc<BotContext>,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    let reply = match cmd {
        Command::Start => start_reply(&ctx, &chat_id.0.to_string()),
        Command::Stop => stop_reply(&ctx, &chat_id.0.to_string()),
        Command::Next => next_reply(&ctx),
    };
    if let Err(e) = send::send_text(&bot, chat_id, &reply).await {
        warn!(chat = chat_id.0, error = %e, "command reply failed");
    }
    Ok(())
}

fn start_reply(ctx: &BotContext, chat_id: &str) -> String {
    if let Err(e) = ctx.registry.add(chat_id) {
        warn!(%chat_id, error = %e, "/start registration failed");
        return "Registration failed — please try again later.".to_string();
    }
    format!(
        "{} reminder bot is running! This chat will get a reminder before every match.\n\n{}",
        ctx.team_name,
        upcoming_block(ctx)
    )
}

fn stop_reply(ctx: &BotContext, chat_id: &str) -> String {
    if let Err(e) = ctx.registry.remove(chat_id) {
        warn!(%chat_id, error = %e, "/stop unregistration failed");
        return "Unregistration failed — please try again later.".to_string();
    }
    "This chat will no longer receive match reminders.".to_string()
}

fn next_reply(ctx: &BotContext) -> String {
    upcoming_block(ctx)
}

fn upcoming_block(ctx: &BotContext) -> String {
    let fixtures = ctx.fixtures.upcoming(Utc::now(), UPCOMING_LIMIT);
    if fixtures.is_empty() {
        return "No upcoming matches are scheduled right now.".to_string();
    }

    let mut out = String::from("Upcoming matches:\n");
    for fixture in &fixtures {
        out.push_str(&send::format_fixture_line(fixture, ctx.tz));
        out.push('\n');
    }
    if let Some(at) = ctx.scheduler.next_fire_at() {
        out.push_str(&format!("\nNext reminder: {}", send::format_kickoff(at, ctx.tz)));
    }
    out
}
