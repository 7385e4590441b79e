//! Telegram Bot API deserialization types.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct TgResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgUpdate {
    pub update_id: i64,
    pub message: Option<TgMessage>,
    pub edited_message: Option<TgMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgMessage {
    pub message_id: i64,
    pub from: Option<TgUser>,
    pub chat: TgChat,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub photo: Option<Vec<TgPhotoSize>>,
    pub video: Option<TgFileRef>,
    pub document: Option<TgFileRef>,
    pub audio: Option<TgFileRef>,
    pub sticker: Option<TgFileRef>,
    pub voice: Option<TgFileRef>,
    #[serde(default)]
    pub entities: Vec<TgEntity>,
}

/// Any media object; only its `file_id` matters here.
#[derive(Debug, Deserialize)]
pub(crate) struct TgFileRef {
    pub file_id: String,
}

/// One size of a photo; sizes arrive smallest first.
#[derive(Debug, Deserialize)]
pub(crate) struct TgPhotoSize {
    pub file_id: String,
    pub file_size: Option<u64>,
}

/// A `[offset, offset + length)` span of the message text.
#[derive(Debug, Deserialize)]
pub(crate) struct TgEntity {
    pub offset: usize,
    pub length: usize,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgUser {
    pub first_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgChat {
    pub id: i64,
}

/// Result of `getFile`. `file_path` is missing once the link has expired.
#[derive(Debug, Deserialize)]
pub(crate) struct TgFile {
    pub file_path: Option<String>,
}
