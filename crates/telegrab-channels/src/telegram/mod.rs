//! Telegram Bot API client.
//!
//! Uses long polling via `getUpdates`; each update is handed to an
//! [`UpdateHandler`] on its own task.
//! Docs: <https://core.telegram.org/bots/api>

mod download;
pub mod keyboard;
mod polling;
pub(crate) mod send;
mod transport;
pub(crate) mod types;


use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use telegrab_core::{
    config::Config,
    error::TelegrabError,
    message::OutgoingContent,
    traits::{Messenger, UpdateHandler},
};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};
use transport::Transport;

/// Lifecycle of a [`Bot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotState {
    Uninitialized,
    /// Settings valid and download directory in place.
    Ready,
    /// Inside the poll loop.
    Polling,
    /// Waiting out the retry delay after a failed poll.
    Backoff,
    /// Left the poll loop after a shutdown request.
    Stopped,
    /// Initialization failed; `start` does nothing.
    FatalError,
}

/// Telegram bot: poll loop, dispatcher, and the [`Messenger`] surface.
pub struct Bot {
    config: Config,
    download_dir: PathBuf,
    handler: Arc<dyn UpdateHandler>,
    /// `None` until initialization succeeds.
    transport: Option<Transport>,
    state: Mutex<BotState>,
    /// Last processed update_id. Written only by the poll loop.
    last_update_id: AtomicI64,
    /// Number used for the next `file_<n>` download.
    next_file_id: AtomicU64,
    /// Spawned handler executions.
    tasks: Mutex<JoinSet<()>>,
    /// Caps concurrently running handlers when `polling.max_handlers > 0`.
    handler_slots: Option<Arc<Semaphore>>,
}

impl Bot {
    /// Create a bot and initialize it.
    ///
    /// Initialization failures are logged and leave the bot in
    /// [`BotState::FatalError`].
    pub fn new(config: Config, handler: impl UpdateHandler) -> Arc<Self> {
        let handler_slots = match config.polling.max_handlers {
            0 => None,
            n => Some(Arc::new(Semaphore::new(n))),
        };
        let mut bot = Self {
            download_dir: config.download_path(),
            config,
            handler: Arc::new(handler),
            transport: None,
            state: Mutex::new(BotState::Uninitialized),
            last_update_id: AtomicI64::new(0),
            next_file_id: AtomicU64::new(1),
            tasks: Mutex::new(JoinSet::new()),
            handler_slots,
        };

        match bot.initialize() {
            Ok(()) => {
                info!(
                    "bot ready, downloads go to {} (next file_{})",
                    bot.download_dir.display(),
                    bot.next_file_id.load(Ordering::Relaxed)
                );
                bot.set_state(BotState::Ready);
            }
            Err(e) => {
                error!("bot initialization failed: {e}");
                bot.set_state(BotState::FatalError);
            }
        }

        Arc::new(bot)
    }

    fn initialize(&mut self) -> Result<(), TelegrabError> {
        self.config.validate()?;
        ensure_download_dir(&self.download_dir)?;
        *self.next_file_id.get_mut() = download::scan_next_file_id(&self.download_dir)?;
        self.transport = Some(Transport::new(&self.config)?);
        Ok(())
    }

    pub fn state(&self) -> BotState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: BotState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    fn transport(&self) -> Result<&Transport, TelegrabError> {
        self.transport
            .as_ref()
            .ok_or_else(|| TelegrabError::Config("bot is not initialized".into()))
    }
}

/// Create the download directory if it is missing.
fn ensure_download_dir(dir: &Path) -> Result<(), TelegrabError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        TelegrabError::Config(format!("unable to create {}: {e}", dir.display()))
    })?;
    if !dir.is_dir() {
        return Err(TelegrabError::Config(format!(
            "{} is not a directory",
            dir.display()
        )));
    }
    Ok(())
}

#[async_trait]
impl Messenger for Bot {
    async fn send(&self, content: OutgoingContent, chat_id: i64, reply_to: Option<i64>) {
        Bot::send(self, content, chat_id, reply_to).await
    }

    async fn forward(&self, message_id: i64, from_chat_id: i64, to_chat_id: i64) {
        Bot::forward(self, message_id, from_chat_id, to_chat_id).await
    }

    async fn download(&self, reference: &str) -> Option<PathBuf> {
        Bot::download(self, reference).await
    }
}
