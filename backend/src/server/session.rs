//! Session cookie settings validated against the build mode.
//!
//! Debug builds warn and fall back to permissive defaults; release builds
//! insist on explicit, safe values.

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use tracing::warn;
use zeroize::Zeroize;

use super::config::{AppConfig, ConfigError};

const SESSION_KEY_MIN_LEN: usize = 64;
const COOKIE_SECURE_SETTING: &str = "CARSHARE_SESSION_COOKIE_SECURE";
const SAME_SITE_SETTING: &str = "CARSHARE_SESSION_SAME_SITE";
const ALLOW_EPHEMERAL_SETTING: &str = "CARSHARE_SESSION_ALLOW_EPHEMERAL";
const SAME_SITE_EXPECTED: &str = "Strict|Lax|None";

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings for missing toggles.
    Debug,
    /// Release builds require explicit, valid session toggles.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Session settings derived from configuration.
pub struct SessionSettings {
    /// Signing and encryption key for cookie sessions.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy for session cookies.
    pub same_site: SameSite,
}

/// Validate the session portion of `config` for `mode`.
pub fn session_settings(
    config: &AppConfig,
    mode: BuildMode,
) -> Result<SessionSettings, ConfigError> {
    let cookie_secure = cookie_secure(config, mode)?;
    let same_site = same_site(config, mode, cookie_secure)?;
    let allow_ephemeral = allow_ephemeral(config, mode)?;
    let key = session_key(config.session_key_file(), mode, allow_ephemeral)?;

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

fn cookie_secure(config: &AppConfig, mode: BuildMode) -> Result<bool, ConfigError> {
    match config.session_cookie_secure {
        Some(flag) => Ok(flag),
        None if mode.is_debug() => {
            warn!("{COOKIE_SECURE_SETTING} not set; defaulting to secure");
            Ok(true)
        }
        None => Err(ConfigError::Missing {
            name: COOKIE_SECURE_SETTING,
        }),
    }
}

fn same_site(
    config: &AppConfig,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, ConfigError> {
    let default_same_site = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };

    let Some(value) = config.session_same_site.clone() else {
        if mode.is_debug() {
            warn!("{SAME_SITE_SETTING} not set; using default");
            return Ok(default_same_site);
        }
        return Err(ConfigError::Missing {
            name: SAME_SITE_SETTING,
        });
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" if mode.is_debug() => {
            warn!("SameSite=None without a secure cookie; browsers may reject it");
            Ok(SameSite::None)
        }
        "none" => Err(ConfigError::InsecureSameSiteNone),
        _ if mode.is_debug() => {
            warn!(value = %value, "invalid {SAME_SITE_SETTING}, using default");
            Ok(default_same_site)
        }
        _ => Err(ConfigError::Invalid {
            name: SAME_SITE_SETTING,
            value,
            expected: SAME_SITE_EXPECTED,
        }),
    }
}

fn allow_ephemeral(config: &AppConfig, mode: BuildMode) -> Result<bool, ConfigError> {
    match (config.session_allow_ephemeral, mode) {
        (Some(true), BuildMode::Release) => Err(ConfigError::EphemeralNotAllowed),
        (Some(flag), _) => Ok(flag),
        (None, BuildMode::Debug) => Ok(false),
        (None, BuildMode::Release) => Err(ConfigError::Missing {
            name: ALLOW_EPHEMERAL_SETTING,
        }),
    }
}

fn session_key(path: PathBuf, mode: BuildMode, allow_ephemeral: bool) -> Result<Key, ConfigError> {
    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if mode == BuildMode::Release && length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(ConfigError::KeyTooShort {
                    path,
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary session key (dev only)"
            );
            Ok(Key::generate())
        }
        Err(source) => Err(ConfigError::KeyRead { path, source }),
    }
}
