//! Direct channel protocol for text commands.

use {
    ely_bridge::{CommandBridge, CommandRequest},
    ely_common::{Localizer, MessageKey},
};

use crate::{
    delivery::{DeliveryPlan, DeliveryStep, log_delivery_failure, render_reply},
    outbound::ChannelOutbound,
};

/// What happened while answering one text command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectReport {
    pub succeeded: bool,
    pub truncated: bool,
    /// Messages the platform accepted (the typing indicator is not counted).
    pub delivered: usize,
    pub failed: usize,
}

/// Typing indicator, one engine call, then the reply and (when cut) a
/// separate truncation notice. Every send is independent and best effort.
pub async fn deliver_direct<O, B>(
    outbound: &O,
    bridge: &B,
    messages: &Localizer,
    channel_id: &str,
    request: CommandRequest,
) -> DirectReport
where
    O: ChannelOutbound + ?Sized,
    B: CommandBridge + ?Sized,
{
    let mut report = DirectReport::default();

    if let Err(e) = outbound.send_typing(channel_id).await {
        log_delivery_failure(messages, DeliveryStep::Typing, &e);
    }

    let result = bridge.invoke(request).await;
    report.succeeded = result.is_ok();

    let plan = DeliveryPlan::separate(
        render_reply(&result, messages),
        &messages.text(MessageKey::TruncationNotice),
    );
    report.truncated = plan.truncated;

    let sends = std::iter::once((DeliveryStep::Send, plan.primary))
        .chain(plan.pending_notice.map(|n| (DeliveryStep::Notice, n)));
    for (step, text) in sends {
        match outbound.send_text(channel_id, &text).await {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                report.failed += 1;
                log_delivery_failure(messages, step, &e);
            },
        }
    }
    report
}
