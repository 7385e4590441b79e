use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One inbound message (or edited message) received by polling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub chat_id: i64,
    pub message_id: i64,
    /// First name of the sender, when the platform reports one.
    pub sender_name: Option<String>,
    /// True when this came from an `edited_message`.
    pub edited: bool,
    pub text: String,
    pub caption: String,
    /// File id of the largest photo size under the automatic download ceiling.
    pub photo: Option<String>,
    pub video: Option<String>,
    pub document: Option<String>,
    pub audio: Option<String>,
    pub sticker: Option<String>,
    pub voice: Option<String>,
    /// Substrings of `text` covered by message entities, in entity order.
    pub entities: Vec<String>,
}

impl Update {
    /// Populated media references, in field order.
    pub fn media(&self) -> impl Iterator<Item = &str> {
        [
            &self.photo,
            &self.video,
            &self.document,
            &self.audio,
            &self.sticker,
            &self.voice,
        ]
        .into_iter()
        .filter_map(|r| r.as_deref())
    }
}

/// Kind of outbound attachment. Declaration order is the send priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Photo,
    Video,
    Document,
    Audio,
    Sticker,
}

impl AttachmentKind {
    /// Form field carrying the file.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Video => "video",
            Self::Document => "document",
            Self::Audio => "audio",
            Self::Sticker => "sticker",
        }
    }

    /// Bot API method used to send this kind.
    pub fn method(&self) -> &'static str {
        match self {
            Self::Photo => "sendPhoto",
            Self::Video => "sendVideo",
            Self::Document => "sendDocument",
            Self::Audio => "sendAudio",
            Self::Sticker => "sendSticker",
        }
    }

    /// Stickers never carry captions.
    pub fn accepts_caption(&self) -> bool {
        !matches!(self, Self::Sticker)
    }
}

/// Where the bytes of an outbound attachment come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputFile {
    /// A file on local disk, uploaded as multipart content.
    Local(PathBuf),
    /// A file id or URL the Bot API fetches itself.
    Remote(String),
}

impl InputFile {
    /// Classify a bare string: an existing regular file is local, anything else remote.
    pub fn infer(value: &str) -> Self {
        if Path::new(value).is_file() {
            Self::Local(PathBuf::from(value))
        } else {
            Self::Remote(value.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Local(path) => path.as_os_str().is_empty(),
            Self::Remote(reference) => reference.is_empty(),
        }
    }
}

impl From<&str> for InputFile {
    fn from(value: &str) -> Self {
        Self::infer(value)
    }
}

impl From<String> for InputFile {
    fn from(value: String) -> Self {
        Self::infer(&value)
    }
}

impl From<PathBuf> for InputFile {
    fn from(value: PathBuf) -> Self {
        Self::Local(value)
    }
}

/// A file to fetch from the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileReference {
    /// Opaque id, resolved through `getFile`.
    FileId(String),
    /// Direct link, fetched as is.
    DirectUrl(String),
}

impl FileReference {
    /// File ids never contain a dot; URLs and file names do.
    pub fn infer(value: &str) -> Self {
        if value.contains('.') {
            Self::DirectUrl(value.to_string())
        } else {
            Self::FileId(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::FileId(s) | Self::DirectUrl(s) => s,
        }
    }
}

impl From<&str> for FileReference {
    fn from(value: &str) -> Self {
        Self::infer(value)
    }
}

/// One outbound attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub file: InputFile,
}

/// A reply-keyboard button.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardButton {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub request_contact: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub request_location: bool,
}

impl KeyboardButton {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Button that shares the user's phone number.
    pub fn contact(text: impl Into<String>) -> Self {
        Self {
            request_contact: true,
            ..Self::text(text)
        }
    }

    /// Button that shares the user's location.
    pub fn location(text: impl Into<String>) -> Self {
        Self {
            request_location: true,
            ..Self::text(text)
        }
    }
}

/// A custom reply keyboard. Row order and button order are the on-screen layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub resize_keyboard: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub one_time_keyboard: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub selective: bool,
}

impl ReplyKeyboardMarkup {
    pub fn new(keyboard: Vec<Vec<KeyboardButton>>) -> Self {
        Self {
            keyboard,
            ..Default::default()
        }
    }

    pub fn resize(mut self) -> Self {
        self.resize_keyboard = true;
        self
    }

    pub fn one_time(mut self) -> Self {
        self.one_time_keyboard = true;
        self
    }

    pub fn selective(mut self) -> Self {
        self.selective = true;
        self
    }
}

/// Directive removing a previously shown reply keyboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyKeyboardHide {
    #[serde(rename = "hide_keyboard")]
    pub hide: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub selective: bool,
}

/// The reply-markup actually attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyMarkup<'a> {
    Keyboard(&'a ReplyKeyboardMarkup),
    Hide(&'a ReplyKeyboardHide),
}

/// A logical outgoing message: text, attachments, and an optional keyboard directive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingContent {
    pub text: String,
    pub attachments: Vec<Attachment>,
    pub reply_keyboard: Option<ReplyKeyboardMarkup>,
    pub hide_keyboard: Option<ReplyKeyboardHide>,
}

impl OutgoingContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Set the attachment of `kind`, replacing any previous one of the same kind.
    pub fn with_attachment(mut self, kind: AttachmentKind, file: impl Into<InputFile>) -> Self {
        let file = file.into();
        self.attachments.retain(|a| a.kind != kind);
        self.attachments.push(Attachment { kind, file });
        self
    }

    pub fn with_photo(self, file: impl Into<InputFile>) -> Self {
        self.with_attachment(AttachmentKind::Photo, file)
    }

    pub fn with_video(self, file: impl Into<InputFile>) -> Self {
        self.with_attachment(AttachmentKind::Video, file)
    }

    pub fn with_document(self, file: impl Into<InputFile>) -> Self {
        self.with_attachment(AttachmentKind::Document, file)
    }

    pub fn with_audio(self, file: impl Into<InputFile>) -> Self {
        self.with_attachment(AttachmentKind::Audio, file)
    }

    pub fn with_sticker(self, file: impl Into<InputFile>) -> Self {
        self.with_attachment(AttachmentKind::Sticker, file)
    }

    pub fn with_keyboard(mut self, keyboard: ReplyKeyboardMarkup) -> Self {
        self.reply_keyboard = Some(keyboard);
        self
    }

    pub fn with_hide_keyboard(mut self, selective: bool) -> Self {
        self.hide_keyboard = Some(ReplyKeyboardHide {
            hide: true,
            selective,
        });
        self
    }

    /// Non-empty attachments in send priority order.
    pub fn ordered_attachments(&self) -> Vec<&Attachment> {
        let mut ordered: Vec<&Attachment> = self
            .attachments
            .iter()
            .filter(|a| !a.file.is_empty())
            .collect();
        ordered.sort_by_key(|a| a.kind);
        ordered
    }

    /// Effective keyboard directive. A keyboard with rows wins over a hide directive.
    pub fn reply_markup(&self) -> Option<ReplyMarkup<'_>> {
        if let Some(keyboard) = self.reply_keyboard.as_ref() {
            if !keyboard.keyboard.is_empty() {
                return Some(ReplyMarkup::Keyboard(keyboard));
            }
        }
        self.hide_keyboard
            .as_ref()
            .filter(|h| h.hide)
            .map(ReplyMarkup::Hide)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
