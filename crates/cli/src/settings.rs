//! Merges the config file, the environment and command-line flags.
//!
//! Precedence, lowest first: built-in defaults, `ely.toml`, environment
//! variables (including `.env`), CLI flags.

use std::{env, path::PathBuf, sync::Arc};

use {
    anyhow::Result,
    ely_common::{Catalog, Language, Localizer, MessageKey},
    ely_config::{ConfigSource, ElyConfig, ValidationResult},
    tracing::warn,
};

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub guild: Option<String>,
    pub port: Option<u16>,
    pub lang: Option<String>,
    pub verbose: bool,
}

/// Fully merged settings plus what validation needs to know about the file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: ElyConfig,
    raw: Option<String>,
    path: Option<PathBuf>,
}

impl Settings {
    /// Load `--config` (or the discovered file), then apply the process
    /// environment and `overrides`.
    pub fn resolve(overrides: &Overrides) -> Result<Self> {
        let source = match &overrides.config {
            Some(path) => Some(ely_config::load_source(path)?),
            None => ely_config::discover_source()?,
        };
        Self::merge(source, overrides, |key| env::var(key).ok())
    }

    fn merge<F>(source: Option<ConfigSource>, overrides: &Overrides, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (mut config, raw, path) = match source {
            Some(source) => (source.config, Some(source.raw), Some(source.path)),
            None => (ElyConfig::default(), None, None),
        };
        ely_config::apply_overrides_from(&mut config, lookup)?;

        if let Some(guild) = &overrides.guild {
            config.discord.guild_id = Some(guild.trim().to_string());
        }
        if let Some(port) = overrides.port {
            config.server.port = port;
        }
        if let Some(lang) = &overrides.lang {
            config.language = lang.trim().to_string();
        }
        if overrides.verbose {
            config.engine.verbose = true;
        }

        Ok(Self { config, raw, path })
    }

    pub fn validate(&self) -> ValidationResult {
        ely_config::validate(&self.config, self.raw.as_deref(), self.path.clone())
    }

    /// The configured language. An unknown code is logged and replaced by
    /// the default.
    pub fn language(&self) -> Language {
        if let Some(language) = self.config.parsed_language() {
            return language;
        }
        let code = &self.config.language;
        warn!(
            language = %code,
            "{}",
            Localizer::default().format(MessageKey::InvalidLanguage, &[code])
        );
        Language::DEFAULT
    }

    /// Process-wide message lookup for the configured language.
    pub fn localizer(&self) -> Localizer {
        Localizer::new(Arc::new(Catalog::builtin()), self.language())
    }

    /// Level the engine library reads from `ELYBOT_LOG_LEVEL`.
    pub fn engine_log_level(&self) -> &'static str {
        if self.config.engine.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest, secrecy::ExposeSecret, std::fs};

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn source(raw: &str) -> (tempfile::TempDir, ConfigSource) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(ely_config::CONFIG_FILENAME);
        fs::write(&path, raw).unwrap();
        let source = ely_config::load_source(&path).unwrap();
        (dir, source)
    }

    #[test]
    fn flags_beat_environment_beat_file() {
        let (_dir, source) = source("language = \"en\"\n[server]\nport = 1000\n");
        let env = |key: &str| match key {
            "ELY_PORT" => Some("2000".to_string()),
            "ELY_LANG" => Some("zh-cn".to_string()),
            "DISCORD_BOT_TOKEN" => Some("env-token".to_string()),
            _ => None,
        };
        let overrides = Overrides {
            port: Some(3000),
            guild: Some(" 123 ".into()),
            ..Overrides::default()
        };

        let settings = Settings::merge(Some(source), &overrides, env).unwrap();
        assert_eq!(settings.config.server.port, 3000);
        assert_eq!(settings.config.language, "zh-cn");
        assert_eq!(settings.config.discord.guild_id.as_deref(), Some("123"));
        assert_eq!(
            settings.config.discord.token.as_ref().unwrap().expose_secret(),
            "env-token"
        );
    }

    #[test]
    fn no_file_means_defaults() {
        let settings = Settings::merge(None, &Overrides::default(), no_env).unwrap();
        assert_eq!(settings.config.server.port, 8080);
        assert_eq!(settings.language(), Language::En);
        assert_eq!(settings.engine_log_level(), "info");
    }

    #[test]
    fn missing_secrets_fail_validation() {
        let settings = Settings::merge(None, &Overrides::default(), no_env).unwrap();
        let result = settings.validate();
        assert!(result.has_errors());
        assert!(result.into_result().is_err());
    }

    #[test]
    fn unknown_file_keys_are_reported_with_the_path() {
        let (_dir, source) = source("colour = \"blue\"\n");
        let path = source.path.clone();
        let settings = Settings::merge(Some(source), &Overrides::default(), no_env).unwrap();
        let result = settings.validate();
        assert_eq!(result.config_path, Some(path));
        assert!(result.diagnostics.iter().any(|d| d.path == "colour"));
    }

    #[rstest]
    #[case("zh-cn", Language::ZhCn)]
    #[case("en", Language::En)]
    #[case("klingon", Language::En)]
    fn language_falls_back_to_default(#[case] code: &str, #[case] expected: Language) {
        let overrides = Overrides {
            lang: Some(code.into()),
            ..Overrides::default()
        };
        let settings = Settings::merge(None, &overrides, no_env).unwrap();
        assert_eq!(settings.language(), expected);
        assert_eq!(settings.localizer().language(), expected);
    }

    #[test]
    fn verbose_flag_raises_engine_level() {
        let overrides = Overrides {
            verbose: true,
            ..Overrides::default()
        };
        let settings = Settings::merge(None, &overrides, no_env).unwrap();
        assert_eq!(settings.engine_log_level(), "debug");
    }
}
