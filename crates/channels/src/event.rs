//! Inbound event shapes, independent of any platform SDK.

/// A plain-text message seen on a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub content: String,
    pub author_id: String,
    /// Set for messages written by any bot account, including this one.
    pub author_is_bot: bool,
    pub channel_id: String,
    /// Absent for direct messages.
    pub server_id: Option<String>,
}

/// One named option of a slash command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOption {
    pub name: String,
    /// `None` when the option was sent with a non-string value.
    pub value: Option<String>,
}

impl CommandOption {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

/// A slash command invocation, carrying the opaque handle the platform needs
/// to answer it.
#[derive(Debug, Clone)]
pub struct InteractionEvent<H> {
    pub name: String,
    pub options: Vec<CommandOption>,
    pub server_id: Option<String>,
    /// Present for invocations outside a server.
    pub user_id: Option<String>,
    /// Present for invocations inside a server.
    pub member_user_id: Option<String>,
    pub handle: H,
}

impl<H> InteractionEvent<H> {
    /// String value of the option called `name`, if any.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .and_then(|o| o.value.as_deref())
    }

    /// The invoking user: direct identity first, then the member identity.
    pub fn invoker_id(&self) -> Option<&str> {
        self.user_id
            .as_deref()
            .or(self.member_user_id.as_deref())
    }
}

/// Acknowledgment state of an interaction. Only moves forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum AckState {
    #[default]
    NotAcked,
    /// A deferred placeholder is showing.
    Deferred,
    /// The placeholder was replaced or a followup carried the answer.
    Resolved,
}

impl AckState {
    /// Move to `next` unless that would go backwards.
    #[must_use]
    pub fn advance(self, next: Self) -> Self {
        self.max(next)
    }
}
