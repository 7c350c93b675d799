//! Credential loading.
//!
//! The API key and hostname come from an INI file with a `[Main]` section.
//! Values may be bare or quoted and are trimmed either way:
//!
//! ```ini
//! [Main]
//! api_key = 0123456789abcdef
//! hostname = search.example.com
//! ```
//!
//! `SUBSEARCH_API_KEY` and `SUBSEARCH_HOSTNAME` override the file. When both
//! are set the file is not read at all.

use anyhow::{Context, Result};
use ini::Ini;
use log::debug;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "api.cfg";
pub const API_KEY_ENV: &str = "SUBSEARCH_API_KEY";
pub const HOSTNAME_ENV: &str = "SUBSEARCH_HOSTNAME";

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// No config file was found in any searched location.
    NotFound(Vec<PathBuf>),
    /// The file is not valid INI.
    Parse { path: PathBuf, message: String },
    /// A required key is absent from both file and environment.
    Missing(&'static str),
    /// A key is present but blank.
    Empty(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotFound(searched) => {
                let searched: Vec<String> =
                    searched.iter().map(|p| p.display().to_string()).collect();
                write!(
                    f,
                    "No config file found (looked in: {}). Set {} and {} or pass --config.",
                    searched.join(", "),
                    API_KEY_ENV,
                    HOSTNAME_ENV
                )
            }
            ConfigError::Parse { path, message } => {
                write!(f, "Invalid config file {}: {}", path.display(), message)
            }
            ConfigError::Missing(key) => write!(f, "Missing config value: {}", key),
            ConfigError::Empty(key) => write!(f, "Config value is empty: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// API credential, fixed for the whole run.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub api_key: String,
    pub hostname: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("api_key", &"***")
            .field("hostname", &self.hostname)
            .finish()
    }
}

/// Section holding the credential.
const MAIN_SECTION: &str = "Main";

/// Raw `[Main]` values, untrimmed.
#[derive(Debug, Default)]
struct MainSection {
    api_key: Option<String>,
    hostname: Option<String>,
}

impl MainSection {
    fn from_ini(ini: &Ini) -> Self {
        match ini.section(Some(MAIN_SECTION)) {
            Some(section) => Self {
                api_key: section.get("api_key").map(str::to_string),
                hostname: section.get("hostname").map(str::to_string),
            },
            None => Self::default(),
        }
    }
}

impl Credential {
    /// Trims both values and rejects blank ones.
    pub fn new(api_key: &str, hostname: &str) -> Result<Self, ConfigError> {
        let api_key = api_key.trim();
        let hostname = hostname.trim();
        if api_key.is_empty() {
            return Err(ConfigError::Empty("api_key"));
        }
        if hostname.is_empty() {
            return Err(ConfigError::Empty("hostname"));
        }
        Ok(Self {
            api_key: api_key.to_string(),
            hostname: hostname.to_string(),
        })
    }

    /// `https://{hostname}`
    pub fn base_url(&self) -> String {
        format!("https://{}", self.hostname)
    }

    /// Loads the credential from the environment and, if needed, the config
    /// file at `path` (or the default locations when `path` is `None`).
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: Option<&Path>) -> Result<Self> {
        let env_key = runtime.env_var(API_KEY_ENV).ok();
        let env_host = runtime.env_var(HOSTNAME_ENV).ok();

        let file = match (&env_key, &env_host) {
            (Some(_), Some(_)) if path.is_none() => {
                debug!("Using credential from {} and {}", API_KEY_ENV, HOSTNAME_ENV);
                MainSection::default()
            }
            _ => {
                let path = resolve_path(runtime, path)?;
                read_config_file(runtime, &path)?
            }
        };

        let api_key = env_key
            .or(file.api_key)
            .ok_or(ConfigError::Missing("api_key"))?;
        let hostname = env_host
            .or(file.hostname)
            .ok_or(ConfigError::Missing("hostname"))?;

        Ok(Credential::new(&api_key, &hostname)?)
    }
}

/// Explicit path first, then `./api.cfg`, then `<config dir>/subsearch/api.cfg`.
fn resolve_path<R: Runtime>(runtime: &R, explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let mut candidates = vec![PathBuf::from(DEFAULT_CONFIG_FILE)];
    if let Some(dir) = runtime.config_dir() {
        candidates.push(dir.join("subsearch").join(DEFAULT_CONFIG_FILE));
    }

    match candidates.iter().find(|p| runtime.exists(p)) {
        Some(path) => Ok(path.clone()),
        None => Err(ConfigError::NotFound(candidates).into()),
    }
}

fn read_config_file<R: Runtime>(runtime: &R, path: &Path) -> Result<MainSection> {
    debug!("Reading config from {}", path.display());
    let contents = runtime
        .read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let ini = Ini::load_from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(MainSection::from_ini(&ini))
}
