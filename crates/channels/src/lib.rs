//! Channel plugin for the activity counter.
//!
//! A chat transport (WeChat, Telegram, ...) feeds [`InboundMessage`]s to the
//! [`ActivityPlugin`] and implements [`ChannelOutbound`] so rankings can be
//! posted back to the group that asked for them.
//!
//! [`InboundMessage`]: chatrank_common::InboundMessage

pub mod error;
pub mod plugin;

pub use {
    error::{Error, Result},
    plugin::{ActivityPlugin, ChannelOutbound},
};
