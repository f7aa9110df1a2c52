use std::{ffi::CString, sync::Arc};

use {
    async_trait::async_trait,
    ely_common::{Localizer, MessageKey},
    secrecy::ExposeSecret,
    tracing::{debug, error, info, warn},
};

use crate::{
    abi::{EngineAbi, OwnedReply},
    error::{BridgeError, CommandResult},
    request::CommandRequest,
};

/// Leading markers the engine uses to flag an application-level failure.
const ERROR_MARKERS: [&str; 2] = ["Error:", "Critical Error:"];

/// Anything that can turn a [`CommandRequest`] into a [`CommandResult`].
///
/// Implementations must invoke the engine at most once per call.
#[async_trait]
pub trait CommandBridge: Send + Sync {
    async fn invoke(&self, request: CommandRequest) -> CommandResult;
}

/// Synchronous client for the engine's C ABI.
///
/// Cheap to clone; clones share the engine handle. The engine must tolerate
/// concurrent calls, no serialization happens here.
#[derive(Clone)]
pub struct BridgeClient {
    engine: Arc<dyn EngineAbi>,
    messages: Localizer,
}

impl BridgeClient {
    pub fn new(engine: Arc<dyn EngineAbi>, messages: Localizer) -> Self {
        Self { engine, messages }
    }

    /// Perform one blocking engine call.
    ///
    /// Blocks the calling thread for the whole engine computation. No
    /// timeout, no retry.
    pub fn invoke_blocking(&self, request: &CommandRequest) -> CommandResult {
        let kind = c_arg("kind", request.kind().as_str())?;
        let prompt = c_arg("prompt", request.prompt())?;
        let subject_id = c_arg("subject_id", request.subject_id())?;
        let api_key = c_arg("api_key", request.api_key().expose_secret())?;

        let prompt_len = request.prompt().chars().count();
        info!(
            kind = %request.kind(),
            subject_id = request.subject_id(),
            prompt_len,
            "{}",
            self.messages.format(
                MessageKey::BridgeCall,
                &[&request.kind(), &request.subject_id(), &prompt_len],
            )
        );

        let raw = self.engine.process(&kind, &prompt, &subject_id, &api_key);
        let Some(reply) = OwnedReply::take(self.engine.as_ref(), raw) else {
            error!(
                kind = %request.kind(),
                subject_id = request.subject_id(),
                "{}",
                self.messages.text(MessageKey::BridgeNull)
            );
            return Err(BridgeError::Null);
        };

        // The reply stays owned until classification is over, so a panic in
        // between still releases it during unwinding.
        let text = reply.text().into_owned();
        let response_len = text.chars().count();
        info!(
            response_len,
            "{}",
            self.messages
                .format(MessageKey::BridgeResponse, &[&response_len])
        );
        let result = classify(text);
        drop(reply);

        if let Err(e) = &result {
            warn!(
                kind = %request.kind(),
                subject_id = request.subject_id(),
                "{}",
                self.messages.format(MessageKey::BridgeError, &[e])
            );
        }
        result
    }
}

#[async_trait]
impl CommandBridge for BridgeClient {
    /// Run the blocking call on the blocking pool and wait for it.
    async fn invoke(&self, request: CommandRequest) -> CommandResult {
        let client = self.clone();
        match tokio::task::spawn_blocking(move || client.invoke_blocking(&request)).await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "engine call task did not complete");
                Err(BridgeError::Aborted {
                    reason: e.to_string(),
                })
            },
        }
    }
}

/// Classify an engine reply by its leading marker.
///
/// `Error:` / `Critical Error:` prefixed text is an application error carrying
/// the whole text; anything else is returned verbatim.
pub fn classify(text: String) -> CommandResult {
    if ERROR_MARKERS.iter().any(|marker| text.starts_with(marker)) {
        Err(BridgeError::Application(text))
    } else {
        debug!(len = text.len(), "engine reply classified as success");
        Ok(text)
    }
}

fn c_arg(field: &'static str, value: &str) -> Result<CString, BridgeError> {
    CString::new(value).map_err(|_| BridgeError::InvalidArgument { field })
}
