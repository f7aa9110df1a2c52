//! Config schema.

use {
    ely_common::Language,
    secrecy::Secret,
    serde::Deserialize,
};

/// Root of `ely.toml`. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ElyConfig {
    pub discord: DiscordConfig,
    pub engine: EngineConfig,
    pub server: ServerConfig,
    /// Language code for user-facing notices and logs ("en", "zh-cn").
    pub language: String,
    /// How long shutdown waits for in-flight requests.
    pub shutdown_grace_secs: u64,
}

impl Default for ElyConfig {
    fn default() -> Self {
        Self {
            discord: DiscordConfig::default(),
            engine: EngineConfig::default(),
            server: ServerConfig::default(),
            language: Language::DEFAULT.code().into(),
            shutdown_grace_secs: 30,
        }
    }
}

impl ElyConfig {
    /// Parsed `language`, or `None` when the code is unknown.
    pub fn parsed_language(&self) -> Option<Language> {
        self.language.parse().ok()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Bot token. Usually supplied through `DISCORD_BOT_TOKEN`.
    pub token: Option<Secret<String>>,
    /// Register slash commands on this guild only (instant propagation,
    /// for development) instead of globally.
    pub guild_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Model API key handed to the engine with every request. Usually
    /// supplied through `GOOGLE_API_KEY`.
    pub api_key: Option<Secret<String>>,
    /// Run the engine at debug log level.
    pub verbose: bool,
}

/// Health endpoint listener.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 8080,
        }
    }
}
