//! Turns either input surface into one [`CommandRequest`] or a local
//! rejection.

use {
    ely_bridge::{CommandKind, CommandRequest},
    ely_common::MessageKey,
    secrecy::Secret,
};

use crate::event::{InteractionEvent, MessageEvent};

/// Text prefix for personal-memory commands.
pub const USER_PREFIX: &str = "!ely";
/// Text prefix for server-memory commands.
pub const SERVER_PREFIX: &str = "!elyall";
/// Slash command for personal memory.
pub const USER_COMMAND: &str = "ely";
/// Slash command for server memory.
pub const SERVER_COMMAND: &str = "elyall";
/// The single required option of both slash commands.
pub const PROMPT_OPTION: &str = "prompt";

/// Why a recognized command was answered locally instead of reaching the
/// engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    ServerOnly,
    PromptMissing,
    IdentifyFailed,
}

impl Rejection {
    /// Notice shown for a rejected text command.
    pub fn text_notice(self) -> MessageKey {
        match self {
            Self::ServerOnly => MessageKey::TextServerOnly,
            Self::PromptMissing => MessageKey::TextPromptMissing,
            Self::IdentifyFailed => MessageKey::SlashIdentifyFailed,
        }
    }

    /// Notice shown for a rejected slash command.
    pub fn slash_notice(self) -> MessageKey {
        match self {
            Self::ServerOnly => MessageKey::SlashServerOnly,
            Self::PromptMissing => MessageKey::SlashPromptMissing,
            Self::IdentifyFailed => MessageKey::SlashIdentifyFailed,
        }
    }
}

/// Result of normalizing one event.
#[derive(Debug, Clone)]
pub enum Normalized {
    /// Not addressed to the bot. Nothing is sent.
    Ignored,
    /// Recognized but unusable; the caller notifies the user.
    Rejected(Rejection),
    Request(CommandRequest),
}

impl Normalized {
    fn from_prompt(kind: CommandKind, prompt: &str, subject_id: &str, api_key: &Secret<String>) -> Self {
        CommandRequest::new(kind, prompt, subject_id, api_key.clone())
            .map_or(Self::Rejected(Rejection::PromptMissing), Self::Request)
    }
}

/// Stateless apart from the engine API key stamped onto every request.
#[derive(Debug, Clone)]
pub struct Normalizer {
    api_key: Secret<String>,
}

impl Normalizer {
    pub fn new(api_key: Secret<String>) -> Self {
        Self { api_key }
    }

    pub fn normalize_message(&self, event: &MessageEvent) -> Normalized {
        let content = event.content.trim();
        let (head, rest) = content
            .split_once(char::is_whitespace)
            .unwrap_or((content, ""));

        match head {
            USER_PREFIX => {
                Normalized::from_prompt(CommandKind::User, rest, &event.author_id, &self.api_key)
            },
            SERVER_PREFIX => match &event.server_id {
                Some(server_id) => {
                    Normalized::from_prompt(CommandKind::Server, rest, server_id, &self.api_key)
                },
                None => Normalized::Rejected(Rejection::ServerOnly),
            },
            _ => Normalized::Ignored,
        }
    }

    pub fn normalize_interaction<H>(&self, event: &InteractionEvent<H>) -> Normalized {
        let kind = match event.name.as_str() {
            USER_COMMAND => CommandKind::User,
            SERVER_COMMAND => CommandKind::Server,
            _ => return Normalized::Ignored,
        };

        let prompt = event.option(PROMPT_OPTION).unwrap_or_default();
        if prompt.trim().is_empty() {
            return Normalized::Rejected(Rejection::PromptMissing);
        }

        let subject_id = match kind {
            CommandKind::User => event.invoker_id().ok_or(Rejection::IdentifyFailed),
            CommandKind::Server => event.server_id.as_deref().ok_or(Rejection::ServerOnly),
        };
        match subject_id {
            Ok(id) => Normalized::from_prompt(kind, prompt, id, &self.api_key),
            Err(rejection) => Normalized::Rejected(rejection),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::event::CommandOption,
        rstest::rstest,
        secrecy::ExposeSecret,
    };

    fn normalizer() -> Normalizer {
        Normalizer::new(Secret::new("key".into()))
    }

    fn message(content: &str, server_id: Option<&str>) -> MessageEvent {
        MessageEvent {
            content: content.into(),
            author_id: "author-1".into(),
            author_is_bot: false,
            channel_id: "chan-1".into(),
            server_id: server_id.map(String::from),
        }
    }

    fn interaction(
        name: &str,
        prompt: Option<&str>,
        server_id: Option<&str>,
        user_id: Option<&str>,
        member_user_id: Option<&str>,
    ) -> InteractionEvent<()> {
        InteractionEvent {
            name: name.into(),
            options: prompt
                .map(|p| vec![CommandOption::new(PROMPT_OPTION, p)])
                .unwrap_or_default(),
            server_id: server_id.map(String::from),
            user_id: user_id.map(String::from),
            member_user_id: member_user_id.map(String::from),
            handle: (),
        }
    }

    fn request(normalized: Normalized) -> CommandRequest {
        match normalized {
            Normalized::Request(req) => req,
            other => panic!("expected a request, got {other:?}"),
        }
    }

    fn rejection(normalized: Normalized) -> Rejection {
        match normalized {
            Normalized::Rejected(r) => r,
            other => panic!("expected a rejection, got {other:?}"),
        }
    }

    // ── Text messages ───────────────────────────────────────────────────────

    #[rstest]
    #[case("!ely hello", "hello")]
    #[case("  !ely   what is up?  ", "what is up?")]
    #[case("!ely\tmulti\nline", "multi\nline")]
    fn user_prefix_trims_prompt(#[case] content: &str, #[case] prompt: &str) {
        let req = request(normalizer().normalize_message(&message(content, None)));
        assert_eq!(req.kind(), CommandKind::User);
        assert_eq!(req.prompt(), prompt);
        assert_eq!(req.subject_id(), "author-1");
        assert_eq!(req.api_key().expose_secret(), "key");
    }

    #[test]
    fn server_prefix_uses_server_id() {
        let req = request(normalizer().normalize_message(&message("!elyall team notes", Some("g-7"))));
        assert_eq!(req.kind(), CommandKind::Server);
        assert_eq!(req.prompt(), "team notes");
        assert_eq!(req.subject_id(), "g-7");
    }

    #[rstest]
    #[case("!ely")]
    #[case("!ely   ")]
    #[case("   !ely \n\t ")]
    fn blank_user_prompt_is_rejected(#[case] content: &str) {
        let r = rejection(normalizer().normalize_message(&message(content, Some("g"))));
        assert_eq!(r, Rejection::PromptMissing);
    }

    #[test]
    fn server_context_is_checked_before_prompt() {
        let n = normalizer();
        assert_eq!(
            rejection(n.normalize_message(&message("!elyall hi", None))),
            Rejection::ServerOnly
        );
        assert_eq!(
            rejection(n.normalize_message(&message("!elyall", None))),
            Rejection::ServerOnly
        );
        assert_eq!(
            rejection(n.normalize_message(&message("!elyall  ", Some("g")))),
            Rejection::PromptMissing
        );
    }

    #[rstest]
    #[case("hello there")]
    #[case("")]
    #[case("!elyx hi")]
    #[case("!elyallhi")]
    #[case("!ELY hi")]
    #[case("say !ely hi")]
    fn unrelated_messages_are_ignored(#[case] content: &str) {
        assert!(matches!(
            normalizer().normalize_message(&message(content, Some("g"))),
            Normalized::Ignored
        ));
    }

    // ── Interactions ────────────────────────────────────────────────────────

    #[test]
    fn ely_prefers_direct_user_identity() {
        let n = normalizer();
        let req = request(n.normalize_interaction(&interaction(
            "ely",
            Some(" hi "),
            Some("g"),
            Some("u-1"),
            Some("m-1"),
        )));
        assert_eq!(req.kind(), CommandKind::User);
        assert_eq!(req.prompt(), "hi");
        assert_eq!(req.subject_id(), "u-1");

        let req = request(n.normalize_interaction(&interaction("ely", Some("hi"), Some("g"), None, Some("m-1"))));
        assert_eq!(req.subject_id(), "m-1");
    }

    #[test]
    fn ely_without_identity_is_rejected() {
        let r = rejection(normalizer().normalize_interaction(&interaction("ely", Some("hi"), None, None, None)));
        assert_eq!(r, Rejection::IdentifyFailed);
    }

    #[test]
    fn elyall_requires_server() {
        let n = normalizer();
        let r = rejection(n.normalize_interaction(&interaction("elyall", Some("hi"), None, Some("u"), None)));
        assert_eq!(r, Rejection::ServerOnly);

        let req = request(n.normalize_interaction(&interaction("elyall", Some("hi"), Some("g-2"), None, Some("m"))));
        assert_eq!(req.kind(), CommandKind::Server);
        assert_eq!(req.subject_id(), "g-2");
    }

    #[rstest]
    #[case("ely", None)]
    #[case("ely", Some(""))]
    #[case("elyall", Some("   "))]
    fn missing_prompt_wins_over_context_checks(#[case] name: &str, #[case] prompt: Option<&str>) {
        let r = rejection(normalizer().normalize_interaction(&interaction(name, prompt, None, None, None)));
        assert_eq!(r, Rejection::PromptMissing);
    }

    #[test]
    fn unknown_command_is_ignored() {
        assert!(matches!(
            normalizer().normalize_interaction(&interaction("ping", None, None, None, None)),
            Normalized::Ignored
        ));
    }

    #[test]
    fn notices_per_surface() {
        assert_eq!(Rejection::ServerOnly.text_notice(), MessageKey::TextServerOnly);
        assert_eq!(Rejection::ServerOnly.slash_notice(), MessageKey::SlashServerOnly);
        assert_eq!(Rejection::PromptMissing.text_notice(), MessageKey::TextPromptMissing);
        assert_eq!(Rejection::PromptMissing.slash_notice(), MessageKey::SlashPromptMissing);
        assert_eq!(Rejection::IdentifyFailed.slash_notice(), MessageKey::SlashIdentifyFailed);
    }
}
