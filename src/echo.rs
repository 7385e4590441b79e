//! Demo handler wired up by `telegrab start`.

use async_trait::async_trait;
use std::sync::Arc;
use telegrab_core::message::{KeyboardButton, OutgoingContent, ReplyKeyboardMarkup, Update};
use telegrab_core::traits::{Messenger, UpdateHandler};
use tracing::info;

/// Echoes text back, toggles a demo keyboard, and saves incoming media.
pub struct EchoHandler;

impl EchoHandler {
    fn demo_keyboard() -> ReplyKeyboardMarkup {
        ReplyKeyboardMarkup::new(vec![vec![
            KeyboardButton::contact("Share contact"),
            KeyboardButton::location("Share location"),
        ]])
        .resize()
        .one_time()
    }
}

/// Leading `/command` of a message, without any `@botname` suffix.
fn command(text: &str) -> Option<&str> {
    let word = text.split_whitespace().next()?;
    if !word.starts_with('/') {
        return None;
    }
    Some(word.split('@').next().unwrap_or(word))
}

#[async_trait]
impl UpdateHandler for EchoHandler {
    async fn handle(&self, messenger: Arc<dyn Messenger>, update: Update) {
        let reply_to = Some(update.message_id);

        let reply = match command(&update.text) {
            Some("/keyboard") => Some(
                OutgoingContent::text("Pick one of the buttons below.")
                    .with_keyboard(Self::demo_keyboard()),
            ),
            Some("/hide") => {
                Some(OutgoingContent::text("Keyboard removed.").with_hide_keyboard(false))
            }
            _ if !update.text.is_empty() => Some(OutgoingContent::text(update.text.clone())),
            _ => None,
        };
        if let Some(content) = reply {
            messenger.send(content, update.chat_id, reply_to).await;
        }

        for reference in update.media() {
            let note = match messenger.download(reference).await {
                Some(path) => {
                    info!("saved media from {} to {}", update.chat_id, path.display());
                    format!("Saved to {}", path.display())
                }
                None => "Could not download that file.".to_string(),
            };
            messenger
                .send(OutgoingContent::text(note), update.chat_id, reply_to)
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<(OutgoingContent, i64, Option<i64>)>>,
        downloads: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Messenger for Recorder {
        async fn send(&self, content: OutgoingContent, chat_id: i64, reply_to: Option<i64>) {
            self.sent.lock().unwrap().push((content, chat_id, reply_to));
        }

        async fn forward(&self, _message_id: i64, _from_chat_id: i64, _to_chat_id: i64) {}

        async fn download(&self, reference: &str) -> Option<PathBuf> {
            self.downloads.lock().unwrap().push(reference.to_string());
            (reference != "broken").then(|| PathBuf::from("downloads").join(reference))
        }
    }

    fn update(text: &str) -> Update {
        Update {
            update_id: 1,
            chat_id: 42,
            message_id: 7,
            text: text.to_string(),
            ..Default::default()
        }
    }

    async fn run(update: Update) -> Arc<Recorder> {
        let recorder = Arc::new(Recorder::default());
        EchoHandler.handle(recorder.clone(), update).await;
        recorder
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(command("/keyboard"), Some("/keyboard"));
        assert_eq!(command("/hide@telegrab_bot now"), Some("/hide"));
        assert_eq!(command("hello /hide"), None);
        assert_eq!(command(""), None);
    }

    #[tokio::test]
    async fn test_echoes_text_as_reply() {
        let recorder = run(update("hello there")).await;
        let sent = recorder.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, OutgoingContent::text("hello there"));
        assert_eq!((sent[0].1, sent[0].2), (42, Some(7)));
    }

    #[tokio::test]
    async fn test_keyboard_command_attaches_keyboard() {
        let recorder = run(update("/keyboard")).await;
        let sent = recorder.sent.lock().unwrap();
        let keyboard = sent[0].0.reply_keyboard.as_ref().unwrap();
        assert_eq!(keyboard.keyboard[0].len(), 2);
        assert!(keyboard.keyboard[0][0].request_contact);
        assert!(keyboard.keyboard[0][1].request_location);
    }

    #[tokio::test]
    async fn test_hide_command_removes_keyboard() {
        let recorder = run(update("/hide")).await;
        let sent = recorder.sent.lock().unwrap();
        assert!(sent[0].0.hide_keyboard.is_some());
        assert!(sent[0].0.reply_keyboard.is_none());
    }

    #[tokio::test]
    async fn test_media_is_downloaded_and_reported() {
        let mut u = update("");
        u.photo = Some("AgAD".to_string());
        u.voice = Some("broken".to_string());
        let recorder = run(u).await;

        assert_eq!(*recorder.downloads.lock().unwrap(), vec!["AgAD", "broken"]);
        let sent = recorder.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].0.text.contains("AgAD"));
        assert_eq!(sent[1].0.text, "Could not download that file.");
    }
}
