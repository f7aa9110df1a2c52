//! Recording fakes shared by the unit tests.

use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use {
    async_trait::async_trait,
    ely_bridge::{CommandBridge, CommandRequest, CommandResult},
};

use crate::{
    Error, Result,
    outbound::{ChannelOutbound, InteractionOutbound},
};

/// One outbound call as seen by the fake platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Sent {
    Text { channel: String, text: String },
    Typing { channel: String },
    Respond { text: String },
    Defer,
    Edit { text: String },
    Followup { text: String, ephemeral: bool },
}

/// Records every call; individual call kinds can be made to fail.
#[derive(Default)]
pub(crate) struct RecordingOutbound {
    pub sent: Mutex<Vec<Sent>>,
    pub fail_typing: bool,
    pub fail_send: bool,
    pub fail_defer: bool,
    pub fail_edit: bool,
    /// Followups with a zero-based index in this list fail.
    pub fail_followups: Vec<usize>,
    pub followups: AtomicUsize,
}

impl RecordingOutbound {
    pub(crate) fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, call: Sent, fail: bool) -> Result<()> {
        self.sent.lock().unwrap().push(call);
        if fail {
            Err(Error::external("scripted", std::io::Error::other("refused")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChannelOutbound for RecordingOutbound {
    async fn send_text(&self, channel_id: &str, text: &str) -> Result<()> {
        self.record(
            Sent::Text {
                channel: channel_id.into(),
                text: text.into(),
            },
            self.fail_send,
        )
    }

    async fn send_typing(&self, channel_id: &str) -> Result<()> {
        self.record(
            Sent::Typing {
                channel: channel_id.into(),
            },
            self.fail_typing,
        )
    }
}

#[async_trait]
impl InteractionOutbound for RecordingOutbound {
    type Handle = ();

    async fn respond(&self, _handle: &(), text: &str) -> Result<()> {
        self.record(Sent::Respond { text: text.into() }, false)
    }

    async fn defer(&self, _handle: &()) -> Result<()> {
        self.record(Sent::Defer, self.fail_defer)
    }

    async fn edit_response(&self, _handle: &(), text: &str) -> Result<()> {
        self.record(Sent::Edit { text: text.into() }, self.fail_edit)
    }

    async fn followup(&self, _handle: &(), text: &str, ephemeral: bool) -> Result<()> {
        let index = self.followups.fetch_add(1, Ordering::SeqCst);
        self.record(
            Sent::Followup {
                text: text.into(),
                ephemeral,
            },
            self.fail_followups.contains(&index),
        )
    }
}

/// Bridge returning a canned result and counting calls.
pub(crate) struct StubBridge {
    result: CommandResult,
    pub requests: Mutex<Vec<CommandRequest>>,
}

impl StubBridge {
    pub(crate) fn new(result: CommandResult) -> Self {
        Self {
            result,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn replying(text: impl Into<String>) -> Self {
        Self::new(Ok(text.into()))
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CommandBridge for StubBridge {
    async fn invoke(&self, request: CommandRequest) -> CommandResult {
        self.requests.lock().unwrap().push(request);
        self.result.clone()
    }
}
