/// Crate-wide result type for the Discord adapter.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A Discord API or gateway call failed.
    #[error("discord API error: {context}: {source}")]
    Serenity {
        context: String,
        #[source]
        source: serenity::Error,
    },

    /// The gateway task panicked or was cancelled.
    #[error("gateway task aborted: {0}")]
    TaskAborted(String),

    /// A snowflake id did not parse or was zero.
    #[error("invalid {kind} id: '{value}'")]
    InvalidId { kind: &'static str, value: String },
}

impl Error {
    #[must_use]
    pub fn serenity(context: impl Into<String>, source: serenity::Error) -> Self {
        Self::Serenity {
            context: context.into(),
            source,
        }
    }
}

/// Parse a snowflake. Zero is not a valid id.
pub(crate) fn parse_snowflake(kind: &'static str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .ok_or_else(|| Error::InvalidId {
            kind,
            value: value.to_string(),
        })
}
