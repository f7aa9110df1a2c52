use async_trait::async_trait;

use crate::Result;

/// Send messages to a channel.
#[async_trait]
pub trait ChannelOutbound: Send + Sync {
    async fn send_text(&self, channel_id: &str, text: &str) -> Result<()>;
    /// Send a "typing" indicator. No-op by default.
    async fn send_typing(&self, _channel_id: &str) -> Result<()> {
        Ok(())
    }
}

/// Answer slash command interactions.
#[async_trait]
pub trait InteractionOutbound: Send + Sync {
    /// Whatever the platform needs to address one interaction.
    type Handle: Send + Sync;

    /// Answer immediately with a visible message. Used for rejections, never
    /// after `defer`.
    async fn respond(&self, handle: &Self::Handle, text: &str) -> Result<()>;
    /// Acknowledge with a deferred "thinking" placeholder.
    async fn defer(&self, handle: &Self::Handle) -> Result<()>;
    /// Replace the deferred placeholder.
    async fn edit_response(&self, handle: &Self::Handle, text: &str) -> Result<()>;
    async fn followup(&self, handle: &Self::Handle, text: &str, ephemeral: bool) -> Result<()>;
}
