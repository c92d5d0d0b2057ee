/// Errors produced by the Telegram channel.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("teloxide error: {0}")]
    Teloxide(#[from] teloxide::RequestError),

    /// Registry rows are opaque strings; a Telegram recipient must parse as a
    /// numeric chat id.
    #[error("invalid chat id: {0}")]
    InvalidChatId(String),
}
