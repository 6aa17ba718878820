//! Application settings loaded via OrthoConfig and the server configuration
//! assembled from them.

use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;

use backend::outbound::notifications::SmtpSettings;
use backend::outbound::persistence::DbPool;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_MAIL_FROM: &str = "CarShare <noreply@carshare.local>";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";

/// Errors raised while turning settings into a runnable server.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The bind address is not a `host:port` socket address.
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    /// A release build requires the named setting.
    #[error("missing required setting: {name}")]
    Missing { name: &'static str },
    /// A setting is present but holds an unusable value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the session key file failed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The session key file is too short for release builds.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// `SameSite=None` requires a secure cookie in release builds.
    #[error("CARSHARE_SESSION_SAME_SITE=None requires CARSHARE_SESSION_COOKIE_SECURE=true")]
    InsecureSameSiteNone,
    /// Release builds must not fall back to a generated session key.
    #[error("CARSHARE_SESSION_ALLOW_EPHEMERAL must be false in release builds")]
    EphemeralNotAllowed,
}

/// Settings for the CarShare backend, read from CLI flags, `CARSHARE_*`
/// environment variables and configuration files.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CARSHARE")]
pub struct AppConfig {
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string. In-memory adapters are used when unset.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// File holding the session signing key material.
    pub session_key_file: Option<PathBuf>,
    /// Mark session cookies `Secure`.
    pub session_cookie_secure: Option<bool>,
    /// `SameSite` policy: `Strict`, `Lax` or `None`.
    pub session_same_site: Option<String>,
    /// Permit a generated session key when the key file is unreadable.
    pub session_allow_ephemeral: Option<bool>,
    /// SMTP relay host. Emails are logged to the console when unset.
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    /// `From` mailbox for outgoing email.
    pub mail_from: Option<String>,
    /// Base URL of the web client, used for links in emails.
    pub frontend_url: Option<String>,
}

impl AppConfig {
    /// Return the parsed bind address, falling back to the default.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| ConfigError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Return the database pool size, falling back to the default.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// Return the session key path, falling back to the mounted secret.
    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Return the web client base URL without a trailing slash.
    pub fn frontend_url(&self) -> String {
        self.frontend_url
            .as_deref()
            .unwrap_or(DEFAULT_FRONTEND_URL)
            .trim_end_matches('/')
            .to_owned()
    }

    /// Return relay settings when an SMTP host is configured.
    pub fn mail_settings(&self) -> Option<SmtpSettings> {
        let host = self.smtp_host.as_deref().map(str::trim)?;
        if host.is_empty() {
            return None;
        }
        Some(SmtpSettings {
            host: host.to_owned(),
            port: self.smtp_port.unwrap_or(DEFAULT_SMTP_PORT),
            username: self.smtp_username.clone(),
            password: self.smtp_password.clone(),
            from: self
                .mail_from
                .clone()
                .unwrap_or_else(|| DEFAULT_MAIL_FROM.to_owned()),
            frontend_url: self.frontend_url(),
        })
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) mail: Option<SmtpSettings>,
    pub(crate) frontend_url: String,
}

impl ServerConfig {
    /// Construct a server configuration using validated session settings.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            mail: None,
            frontend_url: DEFAULT_FRONTEND_URL.to_owned(),
        }
    }

    /// Attach a database connection pool for the persistence adapters.
    ///
    /// Without one the server keeps all marketplace data in memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Deliver notifications through an SMTP relay instead of the console.
    #[must_use]
    pub fn with_mail(mut self, mail: Option<SmtpSettings>) -> Self {
        self.mail = mail;
        self
    }

    /// Base URL used when rendering links for console-delivered email.
    #[must_use]
    pub fn with_frontend_url(mut self, frontend_url: String) -> Self {
        self.frontend_url = frontend_url;
        self
    }
}
