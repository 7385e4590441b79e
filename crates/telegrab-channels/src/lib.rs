//! # telegrab-channels
//!
//! Telegram Bot API client: long polling, delivery, and file transfer.

pub mod telegram;
