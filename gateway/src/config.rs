use dispatch::DispatchConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Workbook id cannot be empty")]
    EmptyWorkbookId,

    #[error("Drive id cannot be empty")]
    EmptyDriveId,

    #[error("Backend timeouts cannot be 0")]
    InvalidTimeout,
}

/// Gateway configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Listener for incoming API requests
    #[serde(default)]
    pub listener: Listener,
    /// Backend routing flags and per-attempt timeouts
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// Primary backend endpoints
    pub primary: PrimaryConfig,
    /// Legacy bridge endpoint
    pub legacy: LegacyConfig,
    /// Credential validation endpoint
    pub auth: AuthConfig,
    /// Carry backend failure causes in API error envelopes. Meant for
    /// development setups only; production responses stay generic.
    #[serde(default)]
    pub expose_error_detail: bool,
}

impl Config {
    /// Validates the gateway configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.listener.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if self.primary.workbook_id.is_empty() {
            return Err(ValidationError::EmptyWorkbookId);
        }
        if self.primary.drive_id.is_empty() {
            return Err(ValidationError::EmptyDriveId);
        }
        if self.dispatch.primary_timeout_secs == 0 || self.dispatch.legacy_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Endpoints of the fast data path
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PrimaryConfig {
    /// Workbook service base URL
    ///
    /// Note: Uses the `url::Url` type for compile-time URL validation.
    /// Invalid URLs will be rejected during config deserialization.
    pub workbook_url: Url,
    /// Identifier of the workbook holding the entity sheets
    pub workbook_id: String,
    /// Drive service base URL
    pub drive_url: Url,
    /// Identifier of the drive holding project attachments
    pub drive_id: String,
}

/// Legacy execution environment
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LegacyConfig {
    /// URL the bridge accepts action envelopes on
    pub exec_url: Url,
}

/// Credential validation endpoint
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AuthConfig {
    /// Tokeninfo URL bearer credentials are checked against
    pub tokeninfo_url: Url,
}
