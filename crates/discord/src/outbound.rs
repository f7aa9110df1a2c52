use std::sync::Arc;

use {
    async_trait::async_trait,
    ely_channels::{ChannelOutbound, Error as ChannelError, InteractionOutbound, Result},
    serenity::{
        all::{
            ChannelId, CreateInteractionResponse, CreateInteractionResponseFollowup,
            CreateInteractionResponseMessage, EditInteractionResponse, InteractionId,
        },
        http::Http,
    },
};

use crate::error::parse_snowflake;

/// What the interaction endpoints need to address one slash command.
#[derive(Debug, Clone)]
pub struct InteractionHandle {
    pub id: InteractionId,
    pub token: String,
}

/// Outbound primitives over serenity's HTTP client.
#[derive(Clone)]
pub struct DiscordOutbound {
    http: Arc<Http>,
}

impl DiscordOutbound {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    fn channel(channel_id: &str) -> Result<ChannelId> {
        parse_snowflake("channel", channel_id)
            .map(ChannelId::new)
            .map_err(ChannelError::invalid_input)
    }
}

#[async_trait]
impl ChannelOutbound for DiscordOutbound {
    async fn send_text(&self, channel_id: &str, text: &str) -> Result<()> {
        Self::channel(channel_id)?
            .say(&self.http, text)
            .await
            .map_err(|e| ChannelError::external("send message", e))?;
        Ok(())
    }

    async fn send_typing(&self, channel_id: &str) -> Result<()> {
        let channel = Self::channel(channel_id)?;
        self.http
            .broadcast_typing(channel)
            .await
            .map_err(|e| ChannelError::external("send typing", e))
    }
}

#[async_trait]
impl InteractionOutbound for DiscordOutbound {
    type Handle = InteractionHandle;

    async fn respond(&self, handle: &InteractionHandle, text: &str) -> Result<()> {
        let response =
            CreateInteractionResponse::Message(CreateInteractionResponseMessage::new().content(text));
        self.http
            .create_interaction_response(handle.id, &handle.token, &response, Vec::new())
            .await
            .map_err(|e| ChannelError::external("respond to interaction", e))
    }

    async fn defer(&self, handle: &InteractionHandle) -> Result<()> {
        let response = CreateInteractionResponse::Defer(CreateInteractionResponseMessage::new());
        self.http
            .create_interaction_response(handle.id, &handle.token, &response, Vec::new())
            .await
            .map_err(|e| ChannelError::external("defer interaction", e))
    }

    async fn edit_response(&self, handle: &InteractionHandle, text: &str) -> Result<()> {
        let edit = EditInteractionResponse::new().content(text);
        self.http
            .edit_original_interaction_response(&handle.token, &edit, Vec::new())
            .await
            .map_err(|e| ChannelError::external("edit interaction response", e))?;
        Ok(())
    }

    async fn followup(&self, handle: &InteractionHandle, text: &str, ephemeral: bool) -> Result<()> {
        let followup = CreateInteractionResponseFollowup::new()
            .content(text)
            .ephemeral(ephemeral);
        self.http
            .create_followup_message(&handle.token, &followup, Vec::new())
            .await
            .map_err(|e| ChannelError::external("send interaction followup", e))?;
        Ok(())
    }
}
