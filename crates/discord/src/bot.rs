//! Gateway client lifecycle.

use std::sync::Arc;

use {
    ely_channels::Dispatcher,
    ely_common::Localizer,
    secrecy::{ExposeSecret, Secret},
    serenity::{Client, all::ShardManager, http::Http},
    tokio::task::JoinHandle,
    tokio_util::task::TaskTracker,
    tracing::{error, info},
};

use crate::{
    commands::{CommandScope, register_commands, remove_commands},
    error::{Error, Result},
    handler::ElyHandler,
};

/// A running gateway connection.
pub struct DiscordBot {
    shard_manager: Arc<ShardManager>,
    client_task: JoinHandle<Result<()>>,
}

/// Connect to the gateway. Per-event tasks are spawned on `tracker`.
pub async fn start_bot(
    token: &Secret<String>,
    dispatcher: Dispatcher,
    scope: CommandScope,
    tracker: TaskTracker,
) -> Result<DiscordBot> {
    let handler = ElyHandler::new(dispatcher, tracker, scope);
    let mut client = Client::builder(token.expose_secret(), ElyHandler::intents())
        .event_handler(handler)
        .await
        .map_err(|e| Error::serenity("build client", e))?;

    let shard_manager = Arc::clone(&client.shard_manager);
    let client_task = tokio::spawn(async move {
        client
            .start()
            .await
            .map_err(|e| Error::serenity("gateway connection", e))
    });
    Ok(DiscordBot {
        shard_manager,
        client_task,
    })
}

impl DiscordBot {
    /// Resolves when the gateway client stops on its own (bad token,
    /// unrecoverable disconnect).
    pub async fn closed(&mut self) -> Result<()> {
        match (&mut self.client_task).await {
            Ok(result) => result,
            Err(e) => Err(Error::TaskAborted(e.to_string())),
        }
    }

    /// Disconnect every shard so no new events arrive.
    pub async fn shutdown(self) {
        if self.client_task.is_finished() {
            return;
        }
        self.shard_manager.shutdown_all().await;
        if let Err(e) = self.client_task.await {
            error!(error = %e, "gateway task failed during shutdown");
        }
        info!("discord gateway disconnected");
    }
}

/// REST-only client with the application id resolved, for command
/// management without a gateway connection.
async fn rest_client(token: &Secret<String>) -> Result<Arc<Http>> {
    let http = Arc::new(Http::new(token.expose_secret()));
    let app = http
        .get_current_application_info()
        .await
        .map_err(|e| Error::serenity("fetch application info", e))?;
    http.set_application_id(app.id);
    info!(application_id = %app.id, "resolved application");
    Ok(http)
}

/// Register both slash commands in `scope` and exit.
pub async fn register_all_commands(
    token: &Secret<String>,
    scope: CommandScope,
    messages: &Localizer,
) -> Result<usize> {
    let http = rest_client(token).await?;
    Ok(register_commands(&http, scope, messages).await)
}

/// Delete all slash commands in `scope` without connecting to the gateway.
pub async fn remove_all_commands(
    token: &Secret<String>,
    scope: CommandScope,
    messages: &Localizer,
) -> Result<usize> {
    let http = rest_client(token).await?;
    remove_commands(&http, scope, messages).await
}
