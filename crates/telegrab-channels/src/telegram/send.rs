//! Outbound delivery: text, attachments, keyboards, and forwarding.

use super::keyboard;
use super::Bot;
use reqwest::multipart::{Form, Part};
use std::path::Path;
use telegrab_core::{
    error::TelegrabError,
    message::{AttachmentKind, InputFile, OutgoingContent},
};
use tracing::{error, info};

/// Fields the Bot API accepts only once per logical message.
///
/// A message with several attachments becomes several requests; the caption
/// and the keyboard directive go on the first request that can carry them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DeliveryState {
    pub caption_used: bool,
    pub keyboard_used: bool,
}

/// Fields shared by every attachment request, besides the file itself.
pub(crate) fn attachment_fields(
    content: &OutgoingContent,
    kind: AttachmentKind,
    chat_id: i64,
    reply_to: Option<i64>,
    state: &mut DeliveryState,
) -> Result<Vec<(&'static str, String)>, TelegrabError> {
    let mut fields = vec![("chat_id", chat_id.to_string())];

    if !content.text.is_empty() && !state.caption_used && kind.accepts_caption() {
        fields.push(("caption", content.text.clone()));
        state.caption_used = true;
    }
    push_reply_fields(&mut fields, content, reply_to, state)?;

    Ok(fields)
}

/// Fields of the trailing `sendMessage` request.
pub(crate) fn text_fields(
    content: &OutgoingContent,
    chat_id: i64,
    reply_to: Option<i64>,
    state: &mut DeliveryState,
) -> Result<Vec<(&'static str, String)>, TelegrabError> {
    let mut fields = vec![
        ("chat_id", chat_id.to_string()),
        ("text", content.text.clone()),
    ];
    push_reply_fields(&mut fields, content, reply_to, state)?;
    Ok(fields)
}

fn push_reply_fields(
    fields: &mut Vec<(&'static str, String)>,
    content: &OutgoingContent,
    reply_to: Option<i64>,
    state: &mut DeliveryState,
) -> Result<(), TelegrabError> {
    if let Some(id) = reply_to.filter(|id| *id != 0) {
        fields.push(("reply_to_message_id", id.to_string()));
    }
    if !state.keyboard_used {
        if let Some(markup) = content.reply_markup() {
            fields.push(("reply_markup", keyboard::encode(markup)?));
            state.keyboard_used = true;
        }
    }
    Ok(())
}

impl Bot {
    /// Deliver `content` to `chat_id`. Failures are logged, not returned.
    ///
    /// Every non-empty attachment is sent, in priority order, as its own
    /// request. The text rides along as the first caption; if no request
    /// could carry it, it is sent as a separate text message.
    pub async fn send(&self, content: OutgoingContent, chat_id: i64, reply_to: Option<i64>) {
        let mut state = DeliveryState::default();

        for attachment in content.ordered_attachments() {
            info!("sending {} to {chat_id}", attachment.kind.field());
            if let Err(e) = self
                .send_file(&content, attachment.kind, &attachment.file, chat_id, reply_to, &mut state)
                .await
            {
                error!("can't send {} to {chat_id}: {e}", attachment.kind.field());
            }
        }

        if !content.text.is_empty() && !state.caption_used {
            info!("sending a message to {chat_id}");
            if let Err(e) = self.send_text(&content, chat_id, reply_to, &mut state).await {
                error!("can't send a text message to {chat_id}: {e}");
            }
        }
    }

    /// Forward `message_id` from one chat to another. Failures are logged.
    pub async fn forward(&self, message_id: i64, from_chat_id: i64, to_chat_id: i64) {
        info!("forwarding message {message_id} to {to_chat_id}");
        if let Err(e) = self.try_forward(message_id, from_chat_id, to_chat_id).await {
            error!("can't forward message {message_id} to {to_chat_id}: {e}");
        }
    }

    pub async fn try_forward(
        &self,
        message_id: i64,
        from_chat_id: i64,
        to_chat_id: i64,
    ) -> Result<(), TelegrabError> {
        let fields = [
            ("chat_id", to_chat_id.to_string()),
            ("from_chat_id", from_chat_id.to_string()),
            ("message_id", message_id.to_string()),
        ];
        self.transport()?
            .post_form::<serde_json::Value>("forwardMessage", &fields, None)
            .await?;
        Ok(())
    }

    async fn send_text(
        &self,
        content: &OutgoingContent,
        chat_id: i64,
        reply_to: Option<i64>,
        state: &mut DeliveryState,
    ) -> Result<(), TelegrabError> {
        let fields = text_fields(content, chat_id, reply_to, state)?;
        self.transport()?
            .post_form::<serde_json::Value>("sendMessage", &fields, None)
            .await?;
        Ok(())
    }

    /// Send one attachment: multipart upload for a local file, URL-encoded
    /// form for a file id or URL. Never both.
    async fn send_file(
        &self,
        content: &OutgoingContent,
        kind: AttachmentKind,
        file: &InputFile,
        chat_id: i64,
        reply_to: Option<i64>,
        state: &mut DeliveryState,
    ) -> Result<(), TelegrabError> {
        let transport = self.transport()?;

        match file {
            InputFile::Local(path) => {
                let part = file_part(path).await?;
                let fields = attachment_fields(content, kind, chat_id, reply_to, state)?;
                let form = fields
                    .into_iter()
                    .fold(Form::new().part(kind.field(), part), |form, (name, value)| {
                        form.text(name, value)
                    });
                transport
                    .post_multipart::<serde_json::Value>(kind.method(), form)
                    .await?;
            }
            InputFile::Remote(reference) => {
                let mut fields = vec![(kind.field(), reference.clone())];
                fields.extend(attachment_fields(content, kind, chat_id, reply_to, state)?);
                transport
                    .post_form::<serde_json::Value>(kind.method(), &fields, None)
                    .await?;
            }
        }

        info!("sent {} to {chat_id}", kind.field());
        Ok(())
    }
}

/// Multipart part streaming a local file.
async fn file_part(path: &Path) -> Result<Part, TelegrabError> {
    let file = tokio::fs::File::open(path).await?;
    let len = file.metadata().await?.len();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    Ok(Part::stream_with_length(reqwest::Body::from(file), len).file_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use telegrab_core::message::{KeyboardButton, ReplyKeyboardMarkup};

    fn names<'a>(fields: &'a [(&'a str, String)]) -> Vec<&'a str> {
        fields.iter().map(|(n, _)| *n).collect()
    }

    #[test]
    fn test_caption_used_once_across_attachments() {
        let content = OutgoingContent::text("look").with_photo("p").with_video("v");
        let mut state = DeliveryState::default();

        let first = attachment_fields(&content, AttachmentKind::Photo, 1, None, &mut state).unwrap();
        let second = attachment_fields(&content, AttachmentKind::Video, 1, None, &mut state).unwrap();

        assert_eq!(names(&first), vec!["chat_id", "caption"]);
        assert_eq!(names(&second), vec!["chat_id"]);
        assert!(state.caption_used);
    }

    #[test]
    fn test_sticker_never_takes_caption() {
        let content = OutgoingContent::text("hello").with_sticker("stk");
        let mut state = DeliveryState::default();
        let fields =
            attachment_fields(&content, AttachmentKind::Sticker, 1, None, &mut state).unwrap();
        assert!(!names(&fields).contains(&"caption"));
        assert!(!state.caption_used);
    }

    #[test]
    fn test_keyboard_attached_once() {
        let kb = ReplyKeyboardMarkup::new(vec![vec![KeyboardButton::text("ok")]]);
        let content = OutgoingContent::default()
            .with_document("d")
            .with_audio("a")
            .with_keyboard(kb);
        let mut state = DeliveryState::default();

        let first =
            attachment_fields(&content, AttachmentKind::Document, 1, None, &mut state).unwrap();
        let second = attachment_fields(&content, AttachmentKind::Audio, 1, None, &mut state).unwrap();

        assert!(names(&first).contains(&"reply_markup"));
        assert!(!names(&second).contains(&"reply_markup"));
    }

    #[test]
    fn test_reply_to_on_every_request() {
        let content = OutgoingContent::text("t");
        let mut state = DeliveryState::default();
        let a = attachment_fields(&content, AttachmentKind::Photo, 1, Some(9), &mut state).unwrap();
        let b = text_fields(&content, 1, Some(9), &mut state).unwrap();
        assert!(a.contains(&("reply_to_message_id", "9".to_string())));
        assert!(b.contains(&("reply_to_message_id", "9".to_string())));
    }

    #[test]
    fn test_zero_reply_to_is_omitted() {
        let content = OutgoingContent::text("t");
        let mut state = DeliveryState::default();
        let fields = text_fields(&content, 42, Some(0), &mut state).unwrap();
        assert_eq!(
            fields,
            vec![("chat_id", "42".to_string()), ("text", "t".to_string())]
        );
    }

    #[test]
    fn test_hide_directive_serialized() {
        let content = OutgoingContent::text("bye").with_hide_keyboard(false);
        let mut state = DeliveryState::default();
        let fields = text_fields(&content, 1, None, &mut state).unwrap();
        assert!(fields.contains(&("reply_markup", r#"{"hide_keyboard":true}"#.to_string())));
        assert!(state.keyboard_used);
    }
}
