//! Localized message catalog.
//!
//! The catalog is an immutable table built once at startup and shared behind
//! an `Arc`. Lookups walk a fixed fallback chain: requested language, then
//! [`Language::DEFAULT`], then a visible `!!MISSING MESSAGE KEY: ..!!`
//! sentinel. Resolution never fails.
//!
//! Templates use positional placeholders (`{0}`, `{1}`, ...). A placeholder
//! without a matching argument is left in the output as-is.

use std::{
    collections::HashMap,
    fmt::{self, Write as _},
    str::FromStr,
    sync::Arc,
};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Languages with a built-in message table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "zh-cn")]
    ZhCn,
}

impl Language {
    pub const DEFAULT: Self = Self::En;

    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::ZhCn => "zh-cn",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "zh-cn" | "zh_cn" => Ok(Self::ZhCn),
            other => Err(Error::message(format!("unsupported language code '{other}'"))),
        }
    }
}

/// Every message the bot can emit, user-facing or operator-facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    // user-facing
    TextServerOnly,
    TextPromptMissing,
    SlashServerOnly,
    SlashPromptMissing,
    SlashIdentifyFailed,
    SlashAckFailed,
    BridgeErrorReply,
    BridgeNullDiagnostic,
    TruncationNotice,
    HealthResponse,
    SlashElyDescription,
    SlashElyAllDescription,
    SlashPromptDescription,
    // operator-facing
    EnvLoaded,
    EnvFileMissing,
    InvalidLanguage,
    EngineLogLevel,
    HttpServerStart,
    BotRunning,
    BotShutdown,
    ShutdownDrain,
    ShutdownDrainTimeout,
    CommandParsed,
    BridgeCall,
    BridgeResponse,
    BridgeNull,
    BridgeError,
    DeliveryFailed,
    CommandsRegistering,
    CommandRegistered,
    CommandRegisterFailed,
    CommandsRemoving,
    CommandRemoved,
    CommandsComplete,
}

impl MessageKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TextServerOnly => "text_server_only",
            Self::TextPromptMissing => "text_prompt_missing",
            Self::SlashServerOnly => "slash_server_only",
            Self::SlashPromptMissing => "slash_prompt_missing",
            Self::SlashIdentifyFailed => "slash_identify_failed",
            Self::SlashAckFailed => "slash_ack_failed",
            Self::BridgeErrorReply => "bridge_error_reply",
            Self::BridgeNullDiagnostic => "bridge_null_diagnostic",
            Self::TruncationNotice => "truncation_notice",
            Self::HealthResponse => "health_response",
            Self::SlashElyDescription => "slash_ely_description",
            Self::SlashElyAllDescription => "slash_elyall_description",
            Self::SlashPromptDescription => "slash_prompt_description",
            Self::EnvLoaded => "env_loaded",
            Self::EnvFileMissing => "env_file_missing",
            Self::InvalidLanguage => "invalid_language",
            Self::EngineLogLevel => "engine_log_level",
            Self::HttpServerStart => "http_server_start",
            Self::BotRunning => "bot_running",
            Self::BotShutdown => "bot_shutdown",
            Self::ShutdownDrain => "shutdown_drain",
            Self::ShutdownDrainTimeout => "shutdown_drain_timeout",
            Self::CommandParsed => "command_parsed",
            Self::BridgeCall => "bridge_call",
            Self::BridgeResponse => "bridge_response",
            Self::BridgeNull => "bridge_null",
            Self::BridgeError => "bridge_error",
            Self::DeliveryFailed => "delivery_failed",
            Self::CommandsRegistering => "commands_registering",
            Self::CommandRegistered => "command_registered",
            Self::CommandRegisterFailed => "command_register_failed",
            Self::CommandsRemoving => "commands_removing",
            Self::CommandRemoved => "command_removed",
            Self::CommandsComplete => "commands_complete",
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const EN: &[(MessageKey, &str)] = &[
    (
        MessageKey::TextServerOnly,
        "The `!elyall` command can only be used in a server channel.",
    ),
    (
        MessageKey::TextPromptMissing,
        "Please provide a prompt after the command. Example: `!ely What's happening?`",
    ),
    (
        MessageKey::SlashServerOnly,
        "The /elyall command can only be used in a server.",
    ),
    (MessageKey::SlashPromptMissing, "Error: Prompt is missing."),
    (MessageKey::SlashIdentifyFailed, "Error: Could not identify user."),
    (
        MessageKey::SlashAckFailed,
        "Error: Failed to properly acknowledge command.",
    ),
    (MessageKey::BridgeErrorReply, "Ely encountered a hiccup: {0}"),
    (
        MessageKey::BridgeNullDiagnostic,
        "Critical Error: the processing engine returned no response.",
    ),
    (
        MessageKey::TruncationNotice,
        "(Message truncated due to length)",
    ),
    (MessageKey::HealthResponse, "Ely bot is healthy and running!"),
    (
        MessageKey::SlashElyDescription,
        "Send a prompt to Ely using your personal memory.",
    ),
    (
        MessageKey::SlashElyAllDescription,
        "Send a prompt to Ely using the server's shared memory.",
    ),
    (
        MessageKey::SlashPromptDescription,
        "The prompt or message for Ely.",
    ),
    (MessageKey::EnvLoaded, "Environment variables loaded from {0}."),
    (
        MessageKey::EnvFileMissing,
        "No .env file found (checked {0}), relying on process environment.",
    ),
    (
        MessageKey::InvalidLanguage,
        "Invalid language code '{0}' provided. Defaulting to 'en'.",
    ),
    (
        MessageKey::EngineLogLevel,
        "Setting engine log level via ELYBOT_LOG_LEVEL={0}",
    ),
    (MessageKey::HttpServerStart, "HTTP health server listening on {0}"),
    (
        MessageKey::BotRunning,
        "Ely bot is now running (lang: {0}, verbose: {1}). Press CTRL-C to exit.",
    ),
    (MessageKey::BotShutdown, "Ely bot shutting down."),
    (
        MessageKey::ShutdownDrain,
        "Waiting up to {0}s for {1} in-flight request(s) to finish.",
    ),
    (
        MessageKey::ShutdownDrainTimeout,
        "Shutdown grace period elapsed with {0} request(s) still in flight.",
    ),
    (MessageKey::CommandParsed, "Parsed command: type={0}, id={1}"),
    (
        MessageKey::BridgeCall,
        "Calling engine: type={0}, id={1}, prompt_len={2}",
    ),
    (
        MessageKey::BridgeResponse,
        "Received from engine: response_len={0}",
    ),
    (
        MessageKey::BridgeNull,
        "Engine call returned a NULL pointer. This indicates a severe error in the engine library.",
    ),
    (
        MessageKey::BridgeError,
        "Error processing command via engine: {0}",
    ),
    (MessageKey::DeliveryFailed, "Delivery step '{0}' failed: {1}"),
    (MessageKey::CommandsRegistering, "Registering slash commands..."),
    (
        MessageKey::CommandRegistered,
        "Successfully registered command: {0}",
    ),
    (
        MessageKey::CommandRegisterFailed,
        "Failed to register command {0}: {1}",
    ),
    (
        MessageKey::CommandsRemoving,
        "Removing all registered commands...",
    ),
    (MessageKey::CommandRemoved, "Successfully removed command: {0}"),
    (
        MessageKey::CommandsComplete,
        "Command registration/removal complete.",
    ),
];

const ZH_CN: &[(MessageKey, &str)] = &[
    (
        MessageKey::TextServerOnly,
        "`!elyall` 命令只能在服务器频道中使用。",
    ),
    (
        MessageKey::TextPromptMissing,
        "请在命令后提供提示内容。例如：`!ely 发生了什么？`",
    ),
    (MessageKey::SlashServerOnly, "/elyall 命令只能在服务器中使用。"),
    (MessageKey::SlashPromptMissing, "错误：缺少提示内容。"),
    (MessageKey::SlashIdentifyFailed, "错误：无法识别用户。"),
    (MessageKey::SlashAckFailed, "错误：未能正确确认命令。"),
    (MessageKey::BridgeErrorReply, "Ely 遇到了一点小问题：{0}"),
    (
        MessageKey::BridgeNullDiagnostic,
        "严重错误：处理引擎没有返回任何响应。",
    ),
    (MessageKey::TruncationNotice, "(消息过长，已被截断)"),
    (MessageKey::HealthResponse, "Ely 机器人健康运行中！"),
    (
        MessageKey::SlashElyDescription,
        "使用您的个人记忆向 Ely 发送提示。",
    ),
    (
        MessageKey::SlashElyAllDescription,
        "使用服务器的共享记忆向 Ely 发送提示。",
    ),
    (MessageKey::SlashPromptDescription, "给 Ely 的提示或消息。"),
    (MessageKey::EnvLoaded, "已从 {0} 加载环境变量。"),
    (
        MessageKey::EnvFileMissing,
        "未找到 .env 文件（已检查 {0}），将依赖进程环境变量。",
    ),
    (
        MessageKey::InvalidLanguage,
        "提供了无效的语言代码 '{0}'。将使用默认语言 'en'。",
    ),
    (
        MessageKey::EngineLogLevel,
        "通过 ELYBOT_LOG_LEVEL={0} 设置引擎日志级别",
    ),
    (MessageKey::HttpServerStart, "HTTP 健康检查服务器正在监听 {0}"),
    (
        MessageKey::BotRunning,
        "Ely 机器人正在运行 (语言: {0}, 详细日志: {1})。按 CTRL-C 退出。",
    ),
    (MessageKey::BotShutdown, "Ely 机器人正在关闭。"),
    (
        MessageKey::ShutdownDrain,
        "最多等待 {0} 秒，让 {1} 个进行中的请求完成。",
    ),
    (
        MessageKey::ShutdownDrainTimeout,
        "关闭宽限期已过，仍有 {0} 个请求未完成。",
    ),
    (MessageKey::CommandParsed, "解析命令：类型={0}，ID={1}"),
    (
        MessageKey::BridgeCall,
        "调用引擎：类型={0}，ID={1}，提示长度={2}",
    ),
    (MessageKey::BridgeResponse, "从引擎接收：响应长度={0}"),
    (
        MessageKey::BridgeNull,
        "引擎调用返回了 NULL 指针。这表明引擎库中存在严重错误。",
    ),
    (MessageKey::BridgeError, "通过引擎处理命令时出错：{0}"),
    (MessageKey::DeliveryFailed, "投递步骤 '{0}' 失败：{1}"),
    (MessageKey::CommandsRegistering, "正在注册斜杠命令..."),
    (MessageKey::CommandRegistered, "成功注册命令: {0}"),
    (MessageKey::CommandRegisterFailed, "注册命令 {0} 失败: {1}"),
    (MessageKey::CommandsRemoving, "正在移除所有已注册的命令..."),
    (MessageKey::CommandRemoved, "成功移除命令: {0}"),
    (MessageKey::CommandsComplete, "命令注册/移除完成。"),
];

/// Immutable language → key → template table.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: HashMap<Language, HashMap<MessageKey, String>>,
}

impl Catalog {
    /// The built-in English and Simplified Chinese tables.
    pub fn builtin() -> Self {
        Self::from_tables([(Language::En, EN), (Language::ZhCn, ZH_CN)])
    }

    pub fn from_tables<'a, I, T>(tables: I) -> Self
    where
        I: IntoIterator<Item = (Language, T)>,
        T: IntoIterator<Item = &'a (MessageKey, &'a str)>,
    {
        let tables = tables
            .into_iter()
            .map(|(language, entries)| {
                let table = entries
                    .into_iter()
                    .map(|(key, template)| (*key, (*template).to_string()))
                    .collect();
                (language, table)
            })
            .collect();
        Self { tables }
    }

    pub fn has_language(&self, language: Language) -> bool {
        self.tables.contains_key(&language)
    }

    fn template(&self, key: MessageKey, language: Language) -> Option<&str> {
        [language, Language::DEFAULT]
            .iter()
            .filter_map(|lang| self.tables.get(lang))
            .find_map(|table| table.get(&key))
            .map(String::as_str)
    }

    /// Resolve `key` in `language`, substituting positional `args`.
    pub fn resolve(&self, key: MessageKey, language: Language, args: &[&dyn fmt::Display]) -> String {
        match self.template(key, language) {
            Some(template) => render(template, args),
            None => format!("!!MISSING MESSAGE KEY: {key}!!"),
        }
    }
}

fn render(template: &str, args: &[&dyn fmt::Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let placeholder = after.find('}').and_then(|close| {
            let index = after[..close].parse::<usize>().ok()?;
            args.get(index).map(|arg| (close, arg))
        });
        match placeholder {
            Some((close, arg)) => {
                let _ = write!(out, "{arg}");
                rest = &after[close + 1..];
            },
            None => {
                out.push('{');
                rest = after;
            },
        }
    }
    out.push_str(rest);
    out
}

/// A catalog bound to the process-wide selected language.
#[derive(Debug, Clone)]
pub struct Localizer {
    catalog: Arc<Catalog>,
    language: Language,
}

impl Localizer {
    pub fn new(catalog: Arc<Catalog>, language: Language) -> Self {
        Self { catalog, language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn text(&self, key: MessageKey) -> String {
        self.catalog.resolve(key, self.language, &[])
    }

    pub fn format(&self, key: MessageKey, args: &[&dyn fmt::Display]) -> String {
        self.catalog.resolve(key, self.language, args)
    }
}

impl Default for Localizer {
    fn default() -> Self {
        Self::new(Arc::new(Catalog::builtin()), Language::DEFAULT)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("en", Language::En)]
    #[case("EN", Language::En)]
    #[case("zh-cn", Language::ZhCn)]
    #[case(" zh_CN ", Language::ZhCn)]
    fn parses_language_codes(#[case] code: &str, #[case] expected: Language) {
        assert_eq!(code.parse::<Language>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_language_code() {
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn builtin_tables_cover_every_english_key() {
        let catalog = Catalog::builtin();
        for (key, _) in EN {
            let en = catalog.resolve(*key, Language::En, &[]);
            let zh = catalog.resolve(*key, Language::ZhCn, &[]);
            assert!(!en.starts_with("!!MISSING"), "{key} missing in en");
            assert!(!zh.starts_with("!!MISSING"), "{key} missing in zh-cn");
        }
        assert_eq!(EN.len(), ZH_CN.len());
    }

    #[test]
    fn substitutes_positional_arguments() {
        let catalog = Catalog::builtin();
        let text = catalog.resolve(MessageKey::BridgeCall, Language::En, &[&"user", &"42", &7]);
        assert_eq!(text, "Calling engine: type=user, id=42, prompt_len=7");
    }

    #[test]
    fn missing_arguments_leave_placeholder_visible() {
        assert_eq!(render("a {0} b {1}", &[&"x"]), "a x b {1}");
        assert_eq!(render("literal {braces}", &[&"x"]), "literal {braces}");
        assert_eq!(render("{", &[]), "{");
    }

    #[test]
    fn falls_back_to_default_language_for_missing_key() {
        let en = [(MessageKey::HealthResponse, "healthy")];
        let zh: [(MessageKey, &str); 0] = [];
        let catalog = Catalog::from_tables([(Language::En, &en[..]), (Language::ZhCn, &zh[..])]);
        assert_eq!(
            catalog.resolve(MessageKey::HealthResponse, Language::ZhCn, &[]),
            "healthy"
        );
    }

    #[test]
    fn falls_back_to_default_language_for_unknown_language() {
        let en = [(MessageKey::HealthResponse, "healthy")];
        let catalog = Catalog::from_tables([(Language::En, &en[..])]);
        assert!(!catalog.has_language(Language::ZhCn));
        assert_eq!(
            catalog.resolve(MessageKey::HealthResponse, Language::ZhCn, &[]),
            "healthy"
        );
    }

    #[test]
    fn missing_everywhere_returns_sentinel() {
        let catalog = Catalog::default();
        assert_eq!(
            catalog.resolve(MessageKey::TruncationNotice, Language::ZhCn, &[]),
            "!!MISSING MESSAGE KEY: truncation_notice!!"
        );
    }

    #[test]
    fn localizer_uses_selected_language() {
        let localizer = Localizer::new(Arc::new(Catalog::builtin()), Language::ZhCn);
        assert_eq!(
            localizer.text(MessageKey::TruncationNotice),
            "(消息过长，已被截断)"
        );
        assert_eq!(
            Localizer::default().format(MessageKey::BridgeErrorReply, &[&"Error: x"]),
            "Ely encountered a hiccup: Error: x"
        );
    }
}
