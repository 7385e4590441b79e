use crate::message::{OutgoingContent, Update};
use async_trait::async_trait;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

/// What business logic may do in response to an update.
///
/// Failures are logged by the implementation and never surface here:
/// `send`/`forward` return nothing, `download` returns `None`.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Deliver text, attachments, and keyboard directives to a chat.
    async fn send(&self, content: OutgoingContent, chat_id: i64, reply_to: Option<i64>);

    /// Forward an existing message between chats.
    async fn forward(&self, message_id: i64, from_chat_id: i64, to_chat_id: i64);

    /// Fetch a file id or direct URL into the download directory.
    async fn download(&self, reference: &str) -> Option<PathBuf>;
}

/// The business logic run once per update.
///
/// Each call runs on its own task; calls are not ordered relative to
/// each other.
#[async_trait]
pub trait UpdateHandler: Send + Sync + 'static {
    async fn handle(&self, messenger: Arc<dyn Messenger>, update: Update);
}

#[async_trait]
impl<F, Fut> UpdateHandler for F
where
    F: Fn(Arc<dyn Messenger>, Update) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn handle(&self, messenger: Arc<dyn Messenger>, update: Update) {
        (self)(messenger, update).await
    }
}
