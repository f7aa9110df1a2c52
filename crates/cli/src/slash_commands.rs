use {
    anyhow::{Context, Result},
    clap::Subcommand,
    ely_common::{Localizer, MessageKey},
    ely_discord::CommandScope,
    secrecy::ExposeSecret,
    tracing::info,
};

use crate::settings::Settings;

#[derive(Subcommand)]
pub enum CommandsAction {
    /// Register `/ely` and `/elyall` (on `--guild` if given, else globally).
    Register,
    /// Delete every registered slash command in the same scope.
    Remove,
}

pub async fn handle_commands(action: CommandsAction, settings: Settings, messages: Localizer) -> Result<()> {
    let token = settings
        .config
        .discord
        .token
        .clone()
        .filter(|t| !t.expose_secret().trim().is_empty())
        .context("Discord bot token is missing (set DISCORD_BOT_TOKEN)")?;
    let scope = CommandScope::from_guild(settings.config.discord.guild_id.as_deref())?;

    let count = match action {
        CommandsAction::Register => {
            ely_discord::register_all_commands(&token, scope, &messages).await?
        },
        CommandsAction::Remove => ely_discord::remove_all_commands(&token, scope, &messages).await?,
    };
    info!(count, "{}", messages.text(MessageKey::CommandsComplete));
    Ok(())
}
