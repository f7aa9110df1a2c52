//! Rendering a [`CommandResult`] into outgoing text and splitting it to fit
//! the platform's message limit.

use {
    ely_bridge::{BridgeError, CommandResult},
    ely_common::{Localizer, MessageKey},
    tracing::warn,
};

use crate::Error;

/// Hard per-message limit, in characters.
pub const MESSAGE_LIMIT: usize = 2000;
/// Length of the primary chunk when a message has to be cut.
pub const PRIMARY_LIMIT: usize = 1990;
/// Limit for a rendered error reply, before the general limit applies.
pub const ERROR_REPLY_LIMIT: usize = 1900;
/// Appended wherever text was cut.
pub const ELLIPSIS: &str = "...";

/// The longest prefix of `text` with at most `max` characters.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// User-facing text for a bridge outcome.
///
/// Success text passes through untouched. Errors get the localized hiccup
/// prefix and are capped at [`ERROR_REPLY_LIMIT`] plus an ellipsis. A null
/// engine reply never shows the raw diagnostic, only the fixed message.
pub fn render_reply(result: &CommandResult, messages: &Localizer) -> String {
    let diagnostic = match result {
        Ok(text) => return text.clone(),
        Err(BridgeError::Null) => messages.text(MessageKey::BridgeNullDiagnostic),
        Err(e) => e.to_string(),
    };
    let reply = messages.format(MessageKey::BridgeErrorReply, &[&diagnostic]);
    if char_len(&reply) > ERROR_REPLY_LIMIT {
        format!("{}{ELLIPSIS}", truncate_chars(&reply, ERROR_REPLY_LIMIT))
    } else {
        reply
    }
}

/// How one outgoing text is split into platform messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryPlan {
    /// First (or only) message. Never longer than [`MESSAGE_LIMIT`].
    pub primary: String,
    /// Truncation notice that still has to go out as its own message.
    pub pending_notice: Option<String>,
    pub truncated: bool,
}

impl DeliveryPlan {
    fn whole(text: String) -> Self {
        Self {
            primary: text,
            pending_notice: None,
            truncated: false,
        }
    }

    /// Plan for the direct channel protocol: an over-long text becomes a
    /// 1990-character primary plus ellipsis, and the notice is always sent
    /// separately.
    pub fn separate(text: String, notice: &str) -> Self {
        if char_len(&text) <= MESSAGE_LIMIT {
            return Self::whole(text);
        }
        Self {
            primary: format!("{}{ELLIPSIS}", truncate_chars(&text, PRIMARY_LIMIT)),
            pending_notice: Some(notice.to_string()),
            truncated: true,
        }
    }

    /// Plan for an interaction edit: the notice goes inline, after the
    /// ellipsis on its own line, with the primary shortened so the edit stays
    /// within the limit. A notice too long to fit stays pending.
    pub fn inline(text: String, notice: &str) -> Self {
        if char_len(&text) <= MESSAGE_LIMIT {
            return Self::whole(text);
        }
        let overhead = char_len(ELLIPSIS) + 1 + char_len(notice);
        match MESSAGE_LIMIT.checked_sub(overhead).filter(|budget| *budget > 0) {
            Some(budget) => Self {
                primary: format!(
                    "{}{ELLIPSIS}\n{notice}",
                    truncate_chars(&text, budget.min(PRIMARY_LIMIT))
                ),
                pending_notice: None,
                truncated: true,
            },
            None => Self::separate(text, notice),
        }
    }
}

/// Every outbound call the delivery protocols make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStep {
    Typing,
    Send,
    Notice,
    Respond,
    Defer,
    AckFollowup,
    Edit,
    Followup,
    NoticeFollowup,
}

impl DeliveryStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Typing => "typing",
            Self::Send => "send",
            Self::Notice => "notice",
            Self::Respond => "respond",
            Self::Defer => "defer",
            Self::AckFollowup => "ack_followup",
            Self::Edit => "edit",
            Self::Followup => "followup",
            Self::NoticeFollowup => "notice_followup",
        }
    }
}

/// Log a failed outbound call and move on. Delivery failures are never
/// retried or propagated.
pub fn log_delivery_failure(messages: &Localizer, step: DeliveryStep, error: &Error) {
    warn!(
        step = step.as_str(),
        error = %error,
        "{}",
        messages.format(MessageKey::DeliveryFailed, &[&step.as_str(), error])
    );
}
