use std::fmt;

use secrecy::Secret;

/// Whose memory a command applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Personal memory, keyed by the author's user id.
    User,
    /// Shared memory, keyed by the server (guild) id.
    Server,
}

impl CommandKind {
    /// Literal token passed across the engine boundary.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Server => "server",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical request built from either input surface.
///
/// The prompt is always trimmed and non-empty.
#[derive(Debug, Clone)]
pub struct CommandRequest {
    kind: CommandKind,
    prompt: String,
    subject_id: String,
    api_key: Secret<String>,
}

impl CommandRequest {
    /// Returns `None` when `prompt` is empty after trimming.
    pub fn new(
        kind: CommandKind,
        prompt: &str,
        subject_id: impl Into<String>,
        api_key: Secret<String>,
    ) -> Option<Self> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return None;
        }
        Some(Self {
            kind,
            prompt: prompt.to_string(),
            subject_id: subject_id.into(),
            api_key,
        })
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn api_key(&self) -> &Secret<String> {
        &self.api_key
    }
}
