//! Registration and removal of the `/ely` and `/elyall` slash commands.

use std::sync::Arc;

use {
    ely_channels::normalize::{PROMPT_OPTION, SERVER_COMMAND, USER_COMMAND},
    ely_common::{Localizer, MessageKey},
    serenity::{
        all::{Command, CommandOptionType, CreateCommand, CreateCommandOption, GuildId},
        http::Http,
    },
    tracing::{info, warn},
};

use crate::error::{Error, Result, parse_snowflake};

/// Where slash commands live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandScope {
    /// Every guild the bot is in. Propagation can take up to an hour.
    Global,
    /// One guild only, available immediately. Meant for development.
    Guild(GuildId),
}

impl CommandScope {
    pub fn from_guild(guild_id: Option<&str>) -> Result<Self> {
        match guild_id {
            Some(raw) => parse_snowflake("guild", raw).map(|id| Self::Guild(GuildId::new(id))),
            None => Ok(Self::Global),
        }
    }
}

/// Both command definitions with localized descriptions.
pub fn build_commands(messages: &Localizer) -> Vec<CreateCommand> {
    [
        (USER_COMMAND, MessageKey::SlashElyDescription),
        (SERVER_COMMAND, MessageKey::SlashElyAllDescription),
    ]
    .into_iter()
    .map(|(name, description)| {
        CreateCommand::new(name)
            .description(messages.text(description))
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    PROMPT_OPTION,
                    messages.text(MessageKey::SlashPromptDescription),
                )
                .required(true),
            )
    })
    .collect()
}

/// Register both commands. Individual failures are logged and skipped.
/// Returns how many were registered.
pub async fn register_commands(http: &Arc<Http>, scope: CommandScope, messages: &Localizer) -> usize {
    info!(?scope, "{}", messages.text(MessageKey::CommandsRegistering));
    let mut registered = 0;
    let names = [USER_COMMAND, SERVER_COMMAND];
    for (name, builder) in names.into_iter().zip(build_commands(messages)) {
        let created = match scope {
            CommandScope::Global => Command::create_global_command(http, builder).await,
            CommandScope::Guild(guild) => guild.create_command(http, builder).await,
        };
        match created {
            Ok(command) => {
                registered += 1;
                info!(
                    command = %command.name,
                    "{}",
                    messages.format(MessageKey::CommandRegistered, &[&command.name])
                );
            },
            Err(e) => warn!(
                command = name,
                error = %e,
                "{}",
                messages.format(MessageKey::CommandRegisterFailed, &[&name, &e])
            ),
        }
    }
    info!(registered, "{}", messages.text(MessageKey::CommandsComplete));
    registered
}

/// Delete every command registered in `scope`. Any failure aborts.
pub async fn remove_commands(http: &Arc<Http>, scope: CommandScope, messages: &Localizer) -> Result<usize> {
    info!(?scope, "{}", messages.text(MessageKey::CommandsRemoving));
    let existing = match scope {
        CommandScope::Global => Command::get_global_commands(http).await,
        CommandScope::Guild(guild) => guild.get_commands(http).await,
    }
    .map_err(|e| Error::serenity("list commands", e))?;

    for command in &existing {
        match scope {
            CommandScope::Global => Command::delete_global_command(http, command.id).await,
            CommandScope::Guild(guild) => guild.delete_command(http, command.id).await,
        }
        .map_err(|e| Error::serenity(format!("delete command {}", command.name), e))?;
        info!(
            command = %command.name,
            "{}",
            messages.format(MessageKey::CommandRemoved, &[&command.name])
        );
    }
    info!(removed = existing.len(), "{}", messages.text(MessageKey::CommandsComplete));
    Ok(existing.len())
}
