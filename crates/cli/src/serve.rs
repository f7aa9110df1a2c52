//! `ely serve`: the Discord bot and the health endpoint, with a bounded drain
//! of in-flight requests on shutdown.

use std::{sync::Arc, time::Duration};

use {
    anyhow::{Context, Result},
    ely_bridge::{BridgeClient, EngineAbi},
    ely_channels::Dispatcher,
    ely_common::{Localizer, MessageKey},
    ely_discord::CommandScope,
    tokio::signal,
    tokio_util::task::TaskTracker,
    tracing::{error, info, warn},
};

use crate::settings::Settings;

pub async fn run(settings: Settings, messages: Localizer) -> Result<()> {
    let config = &settings.config;
    let token = config
        .discord
        .token
        .clone()
        .context("Discord bot token is missing")?;
    let api_key = config
        .engine
        .api_key
        .clone()
        .context("engine API key is missing")?;
    let scope = CommandScope::from_guild(config.discord.guild_id.as_deref())?;

    let bridge = Arc::new(BridgeClient::new(engine()?, messages.clone()));
    let dispatcher = Dispatcher::new(bridge, api_key, messages.clone());

    let health =
        ely_gateway::start_health_server(&config.server.bind, config.server.port, messages.clone())
            .await?;
    let tracker = TaskTracker::new();
    let mut bot = ely_discord::start_bot(&token, dispatcher, scope, tracker.clone()).await?;

    let language = messages.language();
    let verbose = config.engine.verbose;
    info!(
        %language,
        verbose,
        "{}",
        messages.format(MessageKey::BotRunning, &[&language, &verbose])
    );

    let closed = tokio::select! {
        () = shutdown_signal() => Ok(()),
        result = bot.closed() => result,
    };
    if let Err(e) = &closed {
        error!(error = %e, "discord connection closed");
    }

    info!("{}", messages.text(MessageKey::BotShutdown));
    bot.shutdown().await;
    drain(
        &tracker,
        Duration::from_secs(config.shutdown_grace_secs),
        &messages,
    )
    .await;
    health.shutdown().await;

    closed?;
    Ok(())
}

#[cfg(feature = "native-engine")]
fn engine() -> Result<Arc<dyn EngineAbi>> {
    Ok(Arc::new(ely_bridge::NativeEngine))
}

#[cfg(not(feature = "native-engine"))]
fn engine() -> Result<Arc<dyn EngineAbi>> {
    anyhow::bail!(
        "this binary was built without the engine library; rebuild with `--features native-engine`"
    )
}

/// Stop accepting tasks and wait up to `grace` for the running ones.
pub(crate) async fn drain(tracker: &TaskTracker, grace: Duration, messages: &Localizer) {
    tracker.close();
    let in_flight = tracker.len();
    let grace_secs = grace.as_secs();
    info!(
        in_flight,
        grace_secs,
        "{}",
        messages.format(MessageKey::ShutdownDrain, &[&grace_secs, &in_flight])
    );

    if tokio::time::timeout(grace, tracker.wait()).await.is_err() {
        let remaining = tracker.len();
        warn!(
            remaining,
            "{}",
            messages.format(MessageKey::ShutdownDrainTimeout, &[&remaining])
        );
    }
}

/// Resolves on CTRL-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for CTRL-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received CTRL-C"),
        () = terminate => info!("received SIGTERM"),
    }
}
