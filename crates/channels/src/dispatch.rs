//! Per-event entry point: normalize, then run the protocol for the surface
//! the event arrived on.

use std::sync::Arc;

use {
    ely_bridge::{CommandBridge, CommandRequest},
    ely_common::{Localizer, MessageKey},
    secrecy::Secret,
    tracing::{debug, info},
};

use crate::{
    deferred::{DeferredReport, deliver_deferred},
    delivery::{DeliveryStep, log_delivery_failure},
    direct::{DirectReport, deliver_direct},
    event::{InteractionEvent, MessageEvent},
    normalize::{Normalized, Normalizer, Rejection},
    outbound::{ChannelOutbound, InteractionOutbound},
};

/// How one event was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Ignored,
    Rejected(Rejection),
    Direct(DirectReport),
    Deferred(DeferredReport),
}

/// Shared, read-only pipeline state. Clone it into each spawned event task.
#[derive(Clone)]
pub struct Dispatcher {
    bridge: Arc<dyn CommandBridge>,
    normalizer: Normalizer,
    messages: Localizer,
}

impl Dispatcher {
    pub fn new(bridge: Arc<dyn CommandBridge>, api_key: Secret<String>, messages: Localizer) -> Self {
        Self {
            bridge,
            normalizer: Normalizer::new(api_key),
            messages,
        }
    }

    pub fn messages(&self) -> &Localizer {
        &self.messages
    }

    pub async fn handle_message<O>(&self, outbound: &O, event: MessageEvent) -> Disposition
    where
        O: ChannelOutbound + ?Sized,
    {
        if event.author_is_bot {
            return Disposition::Ignored;
        }
        match self.normalizer.normalize_message(&event) {
            Normalized::Ignored => Disposition::Ignored,
            Normalized::Rejected(rejection) => {
                debug!(channel_id = %event.channel_id, ?rejection, "text command rejected");
                let notice = self.messages.text(rejection.text_notice());
                if let Err(e) = outbound.send_text(&event.channel_id, &notice).await {
                    log_delivery_failure(&self.messages, DeliveryStep::Send, &e);
                }
                Disposition::Rejected(rejection)
            },
            Normalized::Request(request) => {
                self.log_parsed(&request);
                let report = deliver_direct(
                    outbound,
                    self.bridge.as_ref(),
                    &self.messages,
                    &event.channel_id,
                    request,
                )
                .await;
                Disposition::Direct(report)
            },
        }
    }

    pub async fn handle_interaction<O>(
        &self,
        outbound: &O,
        event: InteractionEvent<O::Handle>,
    ) -> Disposition
    where
        O: InteractionOutbound + ?Sized,
    {
        match self.normalizer.normalize_interaction(&event) {
            Normalized::Ignored => {
                debug!(name = %event.name, "ignoring unknown interaction");
                Disposition::Ignored
            },
            Normalized::Rejected(rejection) => {
                debug!(name = %event.name, ?rejection, "slash command rejected");
                let notice = self.messages.text(rejection.slash_notice());
                if let Err(e) = outbound.respond(&event.handle, &notice).await {
                    log_delivery_failure(&self.messages, DeliveryStep::Respond, &e);
                }
                Disposition::Rejected(rejection)
            },
            Normalized::Request(request) => {
                self.log_parsed(&request);
                let report = deliver_deferred(
                    outbound,
                    self.bridge.as_ref(),
                    &self.messages,
                    &event.handle,
                    request,
                )
                .await;
                Disposition::Deferred(report)
            },
        }
    }

    fn log_parsed(&self, request: &CommandRequest) {
        info!(
            kind = %request.kind(),
            subject_id = request.subject_id(),
            "{}",
            self.messages.format(
                MessageKey::CommandParsed,
                &[&request.kind(), &request.subject_id()]
            )
        );
    }
}
