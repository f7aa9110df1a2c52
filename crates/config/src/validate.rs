//! Startup validation.
//!
//! Checks a fully merged [`ElyConfig`] (file, environment and CLI applied)
//! and, when a file was read, flags keys the schema does not know. Unknown
//! language codes are not an error here; the binary falls back to `en`.

use std::{fmt, path::PathBuf};

use {
    secrecy::{ExposeSecret, Secret},
    tracing::warn,
};

use crate::{
    error::{Error, Result},
    schema::ElyConfig,
};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "discord.token"
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn error(path: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            path: path.into(),
            message: message.into(),
        }
    }

    fn warning(path: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.severity, self.path, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Log warnings and turn errors into one startup error.
    pub fn into_result(self) -> Result<()> {
        let mut errors = Vec::new();
        for d in self.diagnostics {
            match d.severity {
                Severity::Warning => warn!(path = %d.path, "{}", d.message),
                Severity::Error => errors.push(d.to_string()),
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::config(errors.join("; ")))
        }
    }
}

// ── Schema keys for unknown-field detection ─────────────────────────────────

const ROOT_KEYS: &[&str] = &[
    "discord",
    "engine",
    "server",
    "language",
    "shutdown_grace_secs",
];

fn section_keys(section: &str) -> Option<&'static [&'static str]> {
    match section {
        "discord" => Some(&["token", "guild_id"]),
        "engine" => Some(&["api_key", "verbose"]),
        "server" => Some(&["bind", "port"]),
        _ => None,
    }
}

/// Validate merged settings. `raw` is the config file text, if one was read.
pub fn validate(config: &ElyConfig, raw: Option<&str>, config_path: Option<PathBuf>) -> ValidationResult {
    let mut diagnostics = Vec::new();

    if is_blank(config.discord.token.as_ref()) {
        diagnostics.push(Diagnostic::error(
            "discord.token",
            "Discord bot token is missing (set DISCORD_BOT_TOKEN)",
        ));
    }
    if is_blank(config.engine.api_key.as_ref()) {
        diagnostics.push(Diagnostic::error(
            "engine.api_key",
            "engine API key is missing (set GOOGLE_API_KEY)",
        ));
    }
    if let Some(guild) = config
        .discord
        .guild_id
        .as_ref()
        .filter(|g| g.parse::<u64>().is_err())
    {
        diagnostics.push(Diagnostic::error(
            "discord.guild_id",
            format!("guild id must be a numeric snowflake, got '{guild}'"),
        ));
    }
    if config.shutdown_grace_secs == 0 {
        diagnostics.push(Diagnostic::warning(
            "shutdown_grace_secs",
            "0 abandons in-flight requests immediately on shutdown",
        ));
    }
    if let Some(raw) = raw {
        check_unknown_keys(raw, &mut diagnostics);
    }

    ValidationResult {
        diagnostics,
        config_path,
    }
}

fn is_blank(secret: Option<&Secret<String>>) -> bool {
    secret.is_none_or(|s| s.expose_secret().trim().is_empty())
}

fn check_unknown_keys(raw: &str, diagnostics: &mut Vec<Diagnostic>) {
    // Syntax errors are reported by the loader.
    let Ok(toml::Value::Table(root)) = raw.parse::<toml::Value>() else {
        return;
    };
    for (key, value) in &root {
        if !ROOT_KEYS.contains(&key.as_str()) {
            diagnostics.push(Diagnostic::warning(key, "unknown field"));
            continue;
        }
        let (Some(known), toml::Value::Table(table)) = (section_keys(key), value) else {
            continue;
        };
        for field in table.keys() {
            if !known.contains(&field.as_str()) {
                diagnostics.push(Diagnostic::warning(&format!("{key}.{field}"), "unknown field"));
            }
        }
    }
}
