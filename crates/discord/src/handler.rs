//! Discord event handler for serenity.
//!
//! Converts gateway events into platform-neutral events and runs each one on
//! its own tracked task, so shutdown can wait for in-flight requests.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use {
    ely_channels::{CommandOption, Dispatcher, Disposition, InteractionEvent, MessageEvent},
    serenity::{
        all::{
            CommandDataOptionValue, CommandInteraction, Context, EventHandler, GatewayIntents,
            Interaction, Message, Ready,
        },
        async_trait,
    },
    tokio_util::task::TaskTracker,
    tracing::{debug, info},
};

use crate::{
    commands::{CommandScope, register_commands},
    outbound::{DiscordOutbound, InteractionHandle},
};

/// Handler for Discord gateway events.
pub struct ElyHandler {
    dispatcher: Dispatcher,
    tracker: TaskTracker,
    scope: CommandScope,
    commands_registered: AtomicBool,
}

impl ElyHandler {
    pub fn new(dispatcher: Dispatcher, tracker: TaskTracker, scope: CommandScope) -> Self {
        Self {
            dispatcher,
            tracker,
            scope,
            commands_registered: AtomicBool::new(false),
        }
    }

    /// Required gateway intents for the bot.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
    }
}

#[async_trait]
impl EventHandler for ElyHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        let messages = self.dispatcher.messages();
        info!(
            bot_name = %ready.user.name,
            guilds = ready.guilds.len(),
            "discord bot ready"
        );

        // Ready fires again after every reconnect.
        if self.commands_registered.swap(true, Ordering::SeqCst) {
            return;
        }
        register_commands(&ctx.http, self.scope, messages).await;
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let event = message_event(&msg);
        let dispatcher = self.dispatcher.clone();
        let outbound = DiscordOutbound::new(Arc::clone(&ctx.http));
        self.tracker.spawn(async move {
            let disposition = dispatcher.handle_message(&outbound, event).await;
            log_disposition("message", &disposition);
        });
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };
        let event = interaction_event(command);
        let dispatcher = self.dispatcher.clone();
        let outbound = DiscordOutbound::new(Arc::clone(&ctx.http));
        self.tracker.spawn(async move {
            let disposition = dispatcher.handle_interaction(&outbound, event).await;
            log_disposition("interaction", &disposition);
        });
    }
}

fn log_disposition(surface: &'static str, disposition: &Disposition) {
    match disposition {
        Disposition::Ignored => {},
        Disposition::Rejected(rejection) => debug!(surface, ?rejection, "command rejected locally"),
        Disposition::Direct(report) => debug!(
            surface,
            succeeded = report.succeeded,
            truncated = report.truncated,
            delivered = report.delivered,
            failed = report.failed,
            "text command answered"
        ),
        Disposition::Deferred(report) => debug!(
            surface,
            final_stage = ?report.final_stage(),
            ack = ?report.ack,
            succeeded = ?report.succeeded,
            "slash command answered"
        ),
    }
}

fn message_event(msg: &Message) -> MessageEvent {
    MessageEvent {
        content: msg.content.clone(),
        author_id: msg.author.id.to_string(),
        author_is_bot: msg.author.bot,
        channel_id: msg.channel_id.to_string(),
        server_id: msg.guild_id.map(|g| g.to_string()),
    }
}

fn interaction_event(command: CommandInteraction) -> InteractionEvent<InteractionHandle> {
    let options = command
        .data
        .options
        .iter()
        .map(|option| CommandOption {
            name: option.name.clone(),
            value: match &option.value {
                CommandDataOptionValue::String(s) => Some(s.clone()),
                _ => None,
            },
        })
        .collect();

    InteractionEvent {
        name: command.data.name.clone(),
        options,
        server_id: command.guild_id.map(|g| g.to_string()),
        // Discord only sends `user` outside guilds; serenity backfills it.
        user_id: command
            .guild_id
            .is_none()
            .then(|| command.user.id.to_string()),
        member_user_id: command.member.as_ref().map(|m| m.user.id.to_string()),
        handle: InteractionHandle {
            id: command.id,
            token: command.token,
        },
    }
}
