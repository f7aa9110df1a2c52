use std::{
    env,
    path::{Path, PathBuf},
};

use {
    secrecy::Secret,
    tracing::debug,
};

use crate::{
    error::{Context, Error, Result},
    schema::ElyConfig,
};

/// Config file name, checked in every search location.
pub const CONFIG_FILENAME: &str = "ely.toml";

/// A parsed config file together with the text it was parsed from.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub path: PathBuf,
    pub raw: String,
    pub config: ElyConfig,
}

/// Load and parse one config file.
pub fn load_config(path: &Path) -> Result<ElyConfig> {
    load_source(path).map(|source| source.config)
}

/// Load one config file, keeping its text for unknown-key validation.
pub fn load_source(path: &Path) -> Result<ConfigSource> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config =
        toml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(ConfigSource {
        path: path.to_path_buf(),
        raw,
        config,
    })
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./ely.toml`
/// 2. `ely.toml` next to the running executable
/// 3. the user config directory (`~/.config/ely/ely.toml` on Linux)
///
/// `Ok(None)` when no file exists. A file that exists but cannot be read or
/// parsed is an error.
pub fn discover_source() -> Result<Option<ConfigSource>> {
    match find_config_file() {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_source(&path).map(Some)
        },
        None => {
            debug!("no config file found, using defaults");
            Ok(None)
        },
    }
}

/// First existing config file in the standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    search_dirs()
        .into_iter()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|p| p.exists())
}

fn search_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from(".")];
    dirs.extend(exe_dir());
    if let Some(project) = directories::ProjectDirs::from("", "", "ely") {
        dirs.push(project.config_dir().to_path_buf());
    }
    dirs
}

fn exe_dir() -> Option<PathBuf> {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

// ── Environment ─────────────────────────────────────────────────────────────

/// A `.env` file that exists but could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotenvFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Which `.env` file, if any, was loaded.
///
/// Returned instead of logged: `.env` is read before the subscriber is
/// installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DotenvOutcome {
    Loaded {
        path: PathBuf,
        /// Earlier candidates that existed but failed to load.
        failures: Vec<DotenvFailure>,
    },
    /// No usable file.
    Missing {
        checked: Vec<PathBuf>,
        failures: Vec<DotenvFailure>,
    },
}

impl DotenvOutcome {
    pub fn failures(&self) -> &[DotenvFailure] {
        match self {
            Self::Loaded { failures, .. } | Self::Missing { failures, .. } => failures,
        }
    }
}

/// Load `.env` from next to the executable, falling back to the working
/// directory. Variables already set in the process win.
pub fn load_dotenv() -> DotenvOutcome {
    let candidates: Vec<PathBuf> = exe_dir()
        .into_iter()
        .chain(env::current_dir().ok())
        .map(|dir| dir.join(".env"))
        .collect();
    load_dotenv_from(&candidates)
}

fn load_dotenv_from(candidates: &[PathBuf]) -> DotenvOutcome {
    let mut failures = Vec::new();
    for path in candidates {
        if !path.is_file() {
            continue;
        }
        match dotenvy::from_path(path) {
            Ok(()) => {
                return DotenvOutcome::Loaded {
                    path: path.clone(),
                    failures,
                };
            },
            Err(e) => failures.push(DotenvFailure {
                path: path.clone(),
                error: e.to_string(),
            }),
        }
    }
    DotenvOutcome::Missing {
        checked: candidates.to_vec(),
        failures,
    }
}

/// Apply `DISCORD_BOT_TOKEN`, `GOOGLE_API_KEY`, `ELY_GUILD_ID`, `ELY_PORT`
/// and `ELY_LANG` as returned by `lookup` (the process environment in the
/// binary). Empty values are treated as unset.
pub fn apply_overrides_from<F>(config: &mut ElyConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(token) = get("DISCORD_BOT_TOKEN") {
        config.discord.token = Some(Secret::new(token));
    }
    if let Some(api_key) = get("GOOGLE_API_KEY") {
        config.engine.api_key = Some(Secret::new(api_key));
    }
    if let Some(guild_id) = get("ELY_GUILD_ID") {
        config.discord.guild_id = Some(guild_id.trim().to_string());
    }
    if let Some(port) = get("ELY_PORT") {
        config.server.port = port
            .trim()
            .parse()
            .map_err(|_| Error::config(format!("ELY_PORT is not a valid port: {port}")))?;
    }
    if let Some(lang) = get("ELY_LANG") {
        config.language = lang.trim().to_string();
    }
    Ok(())
}
