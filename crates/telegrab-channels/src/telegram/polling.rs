//! Long-polling update loop and handler dispatch.

use super::types::{TgEntity, TgMessage, TgPhotoSize, TgUpdate};
use super::{Bot, BotState};
use std::future::Future;
use std::sync::atomic::Ordering;
use std::sync::{Arc, PoisonError};
use std::time::Duration;
use telegrab_core::{error::TelegrabError, message::Update, traits::Messenger};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

/// Photo sizes above this are not picked for automatic download.
const PHOTO_SIZE_CEILING: u64 = 20_900_000;

impl Bot {
    /// Last processed update_id; 0 before the first non-empty batch.
    pub fn last_update_id(&self) -> i64 {
        self.last_update_id.load(Ordering::Acquire)
    }

    /// Fetch one batch of updates and advance the cursor. No dispatch.
    ///
    /// The cursor follows the batch element by element, so it ends on the
    /// last update in the batch. On error it is left untouched.
    pub async fn fetch_updates(&self) -> Result<Vec<Update>, TelegrabError> {
        let polling = &self.config.polling;
        let mut fields = vec![("limit", polling.limit.to_string())];
        if polling.timeout > 0 {
            fields.push(("timeout", polling.timeout.to_string()));
        }
        let cursor = self.last_update_id();
        if cursor != 0 {
            fields.push(("offset", (cursor + 1).to_string()));
        }

        let batch: Vec<TgUpdate> = self
            .transport()?
            .post_form("getUpdates", &fields, Some(polling.request_timeout()))
            .await?;

        let mut updates = Vec::with_capacity(batch.len());
        for element in batch {
            self.last_update_id
                .store(element.update_id, Ordering::Release);
            match extract_update(element) {
                Some(update) => {
                    info!(
                        "new message from {} ({})",
                        update.sender_name.as_deref().unwrap_or("unknown"),
                        update.chat_id
                    );
                    updates.push(update);
                }
                None => debug!("skipping update without a message"),
            }
        }

        Ok(updates)
    }

    /// Fetch one batch and launch a handler task per update.
    ///
    /// Returns once every task is spawned; handlers run on their own.
    pub async fn poll(self: &Arc<Self>) -> Result<usize, TelegrabError> {
        let updates = self.fetch_updates().await?;
        let count = updates.len();
        for update in updates {
            self.dispatch(update);
        }
        self.reap_handlers();
        Ok(count)
    }

    fn dispatch(self: &Arc<Self>, update: Update) {
        let handler = self.handler.clone();
        let messenger: Arc<dyn Messenger> = self.clone();
        let slots = self.handler_slots.clone();

        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.spawn(async move {
            let _permit = match slots {
                Some(slots) => match slots.acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(_) => return,
                },
                None => None,
            };
            handler.handle(messenger, update).await;
        });
    }

    /// Collect finished handler tasks, logging panics.
    fn reap_handlers(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        while let Some(result) = tasks.try_join_next() {
            log_handler_exit(result);
        }
    }

    /// Number of handler tasks not yet reaped.
    pub fn pending_handlers(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Poll until Ctrl-C.
    pub async fn start(self: &Arc<Self>) {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("failed to listen for shutdown signal: {e}");
                std::future::pending::<()>().await;
            }
            info!("received shutdown signal");
        })
        .await;
    }

    /// Poll until `shutdown` resolves, then wait for in-flight handlers.
    ///
    /// Does nothing when the bot failed to initialize.
    pub async fn run_until<F>(self: &Arc<Self>, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        if self.state() == BotState::FatalError {
            error!("bot is in a fatal state, not polling");
            return;
        }
        tokio::pin!(shutdown);

        let polling = self.config.polling.clone();
        info!("checking for updates...");

        loop {
            self.set_state(BotState::Polling);

            let delay = tokio::select! {
                _ = &mut shutdown => break,
                result = self.poll() => match result {
                    Ok(count) => {
                        if count > 0 {
                            debug!("dispatched {count} updates");
                        }
                        polling.interval()
                    }
                    Err(e) => {
                        self.set_state(BotState::Backoff);
                        error!(
                            "failed to get updates, reconnecting in {}s: {e}",
                            polling.retry_timeout
                        );
                        polling.retry_delay()
                    }
                },
            };

            if !delay.is_zero() {
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        self.set_state(BotState::Stopped);
        self.drain_handlers(polling.shutdown_grace()).await;
    }

    /// Wait up to `grace` for running handlers, then abort the rest.
    pub(super) async fn drain_handlers(&self, grace: Duration) {
        let mut tasks = std::mem::take(
            &mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner),
        );
        if tasks.is_empty() {
            return;
        }

        info!("waiting for {} running handlers", tasks.len());
        if tokio::time::timeout(grace, join_all(&mut tasks)).await.is_err() {
            warn!("aborting {} handlers still running after {grace:?}", tasks.len());
            tasks.abort_all();
            while tasks.join_next().await.is_some() {}
        }
    }
}

async fn join_all(tasks: &mut JoinSet<()>) {
    while let Some(result) = tasks.join_next().await {
        log_handler_exit(result);
    }
}

fn log_handler_exit(result: Result<(), JoinError>) {
    if let Err(e) = result {
        if e.is_panic() {
            error!("update handler panicked: {e}");
        }
    }
}

/// Build an [`Update`] from a raw update. An edited message wins over the original.
pub(crate) fn extract_update(element: TgUpdate) -> Option<Update> {
    let edited = element.edited_message.is_some();
    let msg: TgMessage = element.edited_message.or(element.message)?;

    let text = msg.text.unwrap_or_default();
    let entities = entity_texts(&text, &msg.entities);

    Some(Update {
        update_id: element.update_id,
        chat_id: msg.chat.id,
        message_id: msg.message_id,
        sender_name: msg.from.map(|u| u.first_name),
        edited,
        caption: msg.caption.unwrap_or_default(),
        photo: msg.photo.as_deref().and_then(pick_photo),
        video: msg.video.map(|f| f.file_id),
        document: msg.document.map(|f| f.file_id),
        audio: msg.audio.map(|f| f.file_id),
        sticker: msg.sticker.map(|f| f.file_id),
        voice: msg.voice.map(|f| f.file_id),
        entities,
        text,
    })
}

/// Walk sizes in ascending order; keep the last one before the ceiling.
fn pick_photo(sizes: &[TgPhotoSize]) -> Option<String> {
    let mut picked = None;
    for size in sizes {
        if size.file_size.is_some_and(|s| s > PHOTO_SIZE_CEILING) {
            break;
        }
        picked = Some(size.file_id.clone());
    }
    picked
}

/// Slice `[offset, offset + length)` out of the text for every entity.
///
/// Offsets index the UTF-8 bytes of the text, so a span that cuts through a
/// multi-byte character yields replacement characters. Spans past the end
/// are clamped.
fn entity_texts(text: &str, entities: &[TgEntity]) -> Vec<String> {
    let bytes = text.as_bytes();
    entities
        .iter()
        .map(|entity| {
            let start = entity.offset.min(bytes.len());
            let end = entity.offset.saturating_add(entity.length).min(bytes.len());
            String::from_utf8_lossy(&bytes[start..end]).into_owned()
        })
        .collect()
}
