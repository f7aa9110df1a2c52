//! Deferred interaction protocol: acknowledge, call the engine, edit the
//! placeholder, fall back to a followup.

use {
    ely_bridge::{CommandBridge, CommandRequest},
    ely_common::{Localizer, MessageKey},
    tracing::debug,
};

use crate::{
    delivery::{DeliveryPlan, DeliveryStep, log_delivery_failure, render_reply},
    event::AckState,
    outbound::InteractionOutbound,
};

/// States of one deferred interaction. A run only ever moves to one of
/// [`Stage::successors`], so no stage is entered twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    AckPending,
    AckFailed,
    AckOk,
    BridgePending,
    BridgeDone,
    EditPending,
    EditOk,
    EditFailed,
    FollowupPending,
    FollowupOk,
    FollowupFailed,
    NoticeFollowup,
}

impl Stage {
    pub fn successors(self) -> &'static [Stage] {
        match self {
            Self::Received => &[Self::AckPending],
            Self::AckPending => &[Self::AckFailed, Self::AckOk],
            Self::AckOk => &[Self::BridgePending],
            Self::BridgePending => &[Self::BridgeDone],
            Self::BridgeDone => &[Self::EditPending],
            Self::EditPending => &[Self::EditOk, Self::EditFailed],
            Self::EditFailed => &[Self::FollowupPending],
            Self::FollowupPending => &[Self::FollowupOk, Self::FollowupFailed],
            Self::EditOk | Self::FollowupOk => &[Self::NoticeFollowup],
            Self::AckFailed | Self::FollowupFailed | Self::NoticeFollowup => &[],
        }
    }

    pub fn can_advance_to(self, next: Stage) -> bool {
        self.successors().contains(&next)
    }
}

/// Path taken by one interaction, for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredReport {
    pub trace: Vec<Stage>,
    pub ack: AckState,
    /// `None` when the engine was never reached.
    pub succeeded: Option<bool>,
}

impl DeferredReport {
    pub fn final_stage(&self) -> Stage {
        self.trace.last().copied().unwrap_or(Stage::Received)
    }

    pub fn bridge_invoked(&self) -> bool {
        self.trace.contains(&Stage::BridgePending)
    }
}

struct Run {
    stage: Stage,
    report: DeferredReport,
}

impl Run {
    fn new() -> Self {
        Self {
            stage: Stage::Received,
            report: DeferredReport {
                trace: vec![Stage::Received],
                ack: AckState::NotAcked,
                succeeded: None,
            },
        }
    }

    fn advance(&mut self, next: Stage) {
        debug_assert!(
            self.stage.can_advance_to(next),
            "illegal interaction transition {:?} -> {next:?}",
            self.stage
        );
        debug!(from = ?self.stage, to = ?next, "interaction stage");
        self.stage = next;
        self.report.trace.push(next);
    }

    fn ack(&mut self, state: AckState) {
        self.report.ack = self.report.ack.advance(state);
    }

    fn finish(self) -> DeferredReport {
        self.report
    }
}

/// Answer an interaction that passed normalization.
///
/// The engine is called only after the deferred acknowledgment succeeded,
/// and at most once. All followups are ephemeral.
pub async fn deliver_deferred<O, B>(
    outbound: &O,
    bridge: &B,
    messages: &Localizer,
    handle: &O::Handle,
    request: CommandRequest,
) -> DeferredReport
where
    O: InteractionOutbound + ?Sized,
    B: CommandBridge + ?Sized,
{
    let mut run = Run::new();

    run.advance(Stage::AckPending);
    if let Err(e) = outbound.defer(handle).await {
        log_delivery_failure(messages, DeliveryStep::Defer, &e);
        run.advance(Stage::AckFailed);
        let notice = messages.text(MessageKey::SlashAckFailed);
        if let Err(e) = outbound.followup(handle, &notice, true).await {
            log_delivery_failure(messages, DeliveryStep::AckFollowup, &e);
        }
        return run.finish();
    }
    run.advance(Stage::AckOk);
    run.ack(AckState::Deferred);

    run.advance(Stage::BridgePending);
    let result = bridge.invoke(request).await;
    run.report.succeeded = Some(result.is_ok());
    run.advance(Stage::BridgeDone);

    let plan = DeliveryPlan::inline(
        render_reply(&result, messages),
        &messages.text(MessageKey::TruncationNotice),
    );

    run.advance(Stage::EditPending);
    match outbound.edit_response(handle, &plan.primary).await {
        Ok(()) => {
            run.advance(Stage::EditOk);
            run.ack(AckState::Resolved);
        },
        Err(e) => {
            log_delivery_failure(messages, DeliveryStep::Edit, &e);
            run.advance(Stage::EditFailed);
            run.advance(Stage::FollowupPending);
            if let Err(e) = outbound.followup(handle, &plan.primary, true).await {
                log_delivery_failure(messages, DeliveryStep::Followup, &e);
                run.advance(Stage::FollowupFailed);
                return run.finish();
            }
            run.advance(Stage::FollowupOk);
            run.ack(AckState::Resolved);
        },
    }

    if let Some(notice) = plan.pending_notice {
        run.advance(Stage::NoticeFollowup);
        if let Err(e) = outbound.followup(handle, &notice, true).await {
            log_delivery_failure(messages, DeliveryStep::NoticeFollowup, &e);
        }
    }
    run.finish()
}
