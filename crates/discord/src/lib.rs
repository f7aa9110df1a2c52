//! Discord adapter built on serenity.
//!
//! Converts gateway events into platform-neutral events for
//! [`ely_channels::Dispatcher`], answers through the Discord HTTP API, and
//! manages the `/ely` and `/elyall` slash commands.

pub mod bot;
pub mod commands;
pub mod error;
pub mod handler;
pub mod outbound;

pub use {
    bot::{DiscordBot, register_all_commands, remove_all_commands, start_bot},
    commands::{CommandScope, build_commands, register_commands, remove_commands},
    error::{Error, Result},
    handler::ElyHandler,
    outbound::{DiscordOutbound, InteractionHandle},
};
