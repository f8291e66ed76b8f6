//! Service configuration
//!
//! The credential comes from a local, non-versioned override file first and
//! the process environment second. Everything else is read from the
//! environment with defaults. Configuration is loaded once at startup and
//! handed to the router; handlers never read the environment themselves.

use llm_bridge::groq::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_VISION_MODEL};
use llm_bridge::GroqConfig;
use secrecy::SecretString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_LOCAL_CONFIG: &str = "config_local.env";
/// Camera photos grow by a third once base64 encoded
pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Which of the two services is being configured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    /// Page plus `POST /api/analyze-image`
    Analysis,
    /// Static page routes only
    Page,
}

impl ServiceKind {
    /// Environment variable (and override-file key) holding the credential
    pub fn credential_var(self) -> &'static str {
        match self {
            Self::Analysis => "GROQ_API_KEY",
            Self::Page => "API_KEY",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Analysis => write!(f, "analysis"),
            Self::Page => write!(f, "page"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No API key found. Set {var} in {file} or as environment variable {var}.")]
    MissingCredential { var: String, file: String },

    #[error("Failed to read local config {path}: {source}")]
    LocalFile {
        path: String,
        #[source]
        source: dotenvy::Error,
    },

    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: String, value: String },

    #[error("Failed to load page {path}: {reason}")]
    Page { path: String, reason: String },
}

/// Where the credential was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    LocalFile(PathBuf),
    Environment(String),
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalFile(path) => write!(f, "local file {}", path.display()),
            Self::Environment(var) => write!(f, "environment variable {}", var),
        }
    }
}

/// The provider credential and its origin
#[derive(Debug, Clone)]
pub struct Credential {
    pub secret: SecretString,
    pub source: CredentialSource,
}

/// Load the credential named `var`, local override file first.
///
/// `lookup` reads the environment; tests pass a closure instead.
pub fn load_credential<F>(local_file: &Path, var: &str, lookup: F) -> Result<Credential, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if local_file.exists() {
        let local_error = |source| ConfigError::LocalFile {
            path: local_file.display().to_string(),
            source,
        };

        for item in dotenvy::from_path_iter(local_file).map_err(local_error)? {
            let (key, value) = item.map_err(local_error)?;
            if key == var && !value.is_empty() {
                return Ok(Credential {
                    secret: SecretString::new(value),
                    source: CredentialSource::LocalFile(local_file.to_path_buf()),
                });
            }
        }
    }

    match lookup(var) {
        Some(value) if !value.is_empty() => Ok(Credential {
            secret: SecretString::new(value),
            source: CredentialSource::Environment(var.to_string()),
        }),
        _ => Err(ConfigError::MissingCredential {
            var: var.to_string(),
            file: local_file.display().to_string(),
        }),
    }
}

/// Full configuration for one service process
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub kind: ServiceKind,
    pub host: String,
    pub port: u16,
    pub credential: Credential,
    pub groq_base_url: String,
    pub groq_model: String,
    pub groq_timeout_secs: u64,
    /// HTML file replacing the embedded page
    pub page_path: Option<PathBuf>,
    /// Clamp model output before returning it
    pub sanitize: bool,
    pub max_body_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from the process environment
    pub fn from_env(kind: ServiceKind) -> Result<Self, ConfigError> {
        Self::load(kind, |var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn load<F>(kind: ServiceKind, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let local_file = lookup("WALKSAFE_LOCAL_CONFIG")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_LOCAL_CONFIG.to_string());
        let credential = load_credential(Path::new(&local_file), kind.credential_var(), &lookup)?;

        Ok(Self {
            kind,
            host: string_var(&lookup, "HOST", DEFAULT_HOST),
            port: parse_var(&lookup, "PORT", DEFAULT_PORT)?,
            credential,
            groq_base_url: string_var(&lookup, "GROQ_BASE_URL", DEFAULT_BASE_URL),
            groq_model: string_var(&lookup, "GROQ_VISION_MODEL", DEFAULT_VISION_MODEL),
            groq_timeout_secs: parse_var(&lookup, "GROQ_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            page_path: lookup("WALKSAFE_PAGE")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            sanitize: bool_var(&lookup, "WALKSAFE_SANITIZE")?,
            max_body_bytes: parse_var(&lookup, "WALKSAFE_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
        })
    }

    /// Groq client settings carrying the credential
    pub fn groq_config(&self) -> GroqConfig {
        GroqConfig {
            api_key: self.credential.secret.clone(),
            base_url: self.groq_base_url.clone(),
            model: self.groq_model.clone(),
            timeout_secs: self.groq_timeout_secs,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn string_var<F>(lookup: &F, var: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_var<F, T>(lookup: &F, var: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            var: var.to_string(),
            value,
        }),
    }
}

fn bool_var<F>(lookup: &F, var: &str) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(var).filter(|v| !v.is_empty()) else {
        return Ok(false);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var: var.to_string(),
            value,
        }),
    }
}
