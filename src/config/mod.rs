// src/config/mod.rs

use ::config::{Config, File, FileFormat};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::{
    env, fmt,
    path::{Path, PathBuf},
};
use tracing::debug;
use url::Url;

use crate::error::{FetchError, Result};

/// Public Enigma API root. Overridable with `base_url` in the `[enigma]` section.
pub const ENIGMA_BASE_URL: &str = "https://public.enigma.com/api/";

/// File name looked up under the user's home directory by [`EnigmaConfig::load`].
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Credentials and endpoint for the Enigma API.
///
/// Built once and handed to [`crate::EnigmaClient::new`]; nothing reads it
/// again after the client has been constructed.
#[derive(Clone)]
pub struct EnigmaConfig {
    api_key: String,
    base_url: Url,
}

impl fmt::Debug for EnigmaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnigmaConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl EnigmaConfig {
    /// Config for the public API with the given key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, ENIGMA_BASE_URL)
    }

    /// Config pointing at a non-default API root (a proxy, or a local stub in tests).
    pub fn with_base_url(api_key: impl Into<String>, base_url: &str) -> Result<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(FetchError::Configuration(
                "`enigma.key` must not be empty".into(),
            ));
        }
        Ok(Self {
            api_key,
            base_url: normalise_base_url(base_url)?,
        })
    }

    /// Read `~/config.ini`.
    pub fn load() -> Result<Self> {
        Self::from_file(default_path()?)
    }

    /// Read an INI file with an `[enigma]` section holding `key` and,
    /// optionally, `base_url`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading Enigma config");

        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Ini).required(true))
            .build()
            .map_err(|e| {
                FetchError::Configuration(format!("Failed to read {}: {}", path.display(), e))
            })?;

        let api_key = settings.get_string("enigma.key").map_err(|e| {
            FetchError::Configuration(format!(
                "{} has no usable `[enigma] key`: {}",
                path.display(),
                e
            ))
        })?;
        let base_url = settings
            .get_string("enigma.base_url")
            .unwrap_or_else(|_| ENIGMA_BASE_URL.to_string());

        Self::with_base_url(api_key, &base_url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// `authorization: Bearer {key}`, the header set sent with every request.
    pub fn default_headers(&self) -> Result<HeaderMap> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.api_key)).map_err(|_| {
            FetchError::Configuration("API key contains characters not allowed in a header".into())
        })?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}

/// `$HOME/config.ini` (`%USERPROFILE%` on Windows).
pub fn default_path() -> Result<PathBuf> {
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(CONFIG_FILE_NAME))
        .ok_or_else(|| FetchError::Configuration("cannot locate the home directory".into()))
}

// Url::join drops the last path segment unless the base ends in '/'.
fn normalise_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };
    let url = Url::parse(&with_slash)
        .map_err(|e| FetchError::Configuration(format!("invalid base_url `{}`: {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(FetchError::Configuration(format!(
            "base_url `{}` cannot be used as a base",
            raw
        )));
    }
    Ok(url)
}
