//! # telegrab-core
//!
//! Core types, traits, configuration, and error handling for Telegrab bots.

pub mod config;
pub mod error;
pub mod message;
pub mod traits;
