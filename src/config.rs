//! Configuration file support
//!
//! All settings have defaults, so the file is optional and every key in it is
//! optional too. Unknown keys are rejected to catch typos.
//!
//! ```toml
//! [masking]
//! marker = "_ID_"
//! numbered = false
//! conversions = ["s", "d", "e", "c"]
//!
//! [provider]
//! endpoint = "https://translation.googleapis.com/language/translate/v2"
//! timeout_secs = 30
//! token_command = ["gcloud", "auth", "application-default", "print-access-token"]
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::mt::credentials::{CommandTokenProvider, CredentialProvider, StaticTokenProvider};
use crate::mt::error::{MtError, MtResult};
use crate::mt::google_translate::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, GoogleTranslateProvider};
use crate::mt::islands::{DEFAULT_CONVERSIONS, IslandDetector};
use crate::mt::masking::{DEFAULT_MARKER, MarkerStrategy};
use crate::mt::pipeline::Pipeline;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub masking: MaskingConfig,
    pub provider: ProviderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaskingConfig {
    /// Shared marker token
    pub marker: String,
    /// Use numbered markers instead of the shared one
    pub numbered: bool,
    /// Characters that end a `%` format specifier, one per entry
    pub conversions: Vec<String>,
}

impl Default for MaskingConfig {
    fn default() -> Self {
        MaskingConfig {
            marker: DEFAULT_MARKER.to_string(),
            numbered: false,
            conversions: DEFAULT_CONVERSIONS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    /// Program and arguments printing an access token on stdout
    pub token_command: Vec<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            token_command: ["gcloud", "auth", "application-default", "print-access-token"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Load from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> MtResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            MtError::ConfigError(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| MtError::ConfigError(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> MtResult<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| MtError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults when `path` is `None`
    pub fn load(path: Option<&Path>) -> MtResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> MtResult<()> {
        if self.masking.marker.trim().is_empty() {
            return Err(MtError::ConfigError("masking.marker cannot be empty".to_string()));
        }
        if self.masking.marker.contains(['\'', '\\']) {
            return Err(MtError::ConfigError(
                "masking.marker cannot contain a single quote or a backslash".to_string(),
            ));
        }
        self.conversion_chars()?;
        if self.provider.token_command.is_empty() {
            return Err(MtError::ConfigError(
                "provider.token_command cannot be empty".to_string(),
            ));
        }
        if self.provider.timeout_secs == 0 {
            return Err(MtError::ConfigError(
                "provider.timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// `masking.conversions` as characters
    pub fn conversion_chars(&self) -> MtResult<Vec<char>> {
        self.masking
            .conversions
            .iter()
            .map(|entry| {
                let mut chars = entry.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(MtError::ConfigError(format!(
                        "masking.conversions entries must be single characters, got {:?}",
                        entry
                    ))),
                }
            })
            .collect()
    }

    pub fn marker_strategy(&self) -> MarkerStrategy {
        if self.masking.numbered {
            MarkerStrategy::Numbered
        } else {
            MarkerStrategy::Shared(self.masking.marker.clone())
        }
    }

    pub fn pipeline(&self) -> MtResult<Pipeline> {
        let detector = IslandDetector::new(self.conversion_chars()?)?;
        Ok(Pipeline::new(detector, self.marker_strategy()))
    }

    /// `GTRANS_ACCESS_TOKEN` if set, the token command otherwise
    pub fn credentials(&self) -> MtResult<Arc<dyn CredentialProvider>> {
        if let Some(provider) = StaticTokenProvider::from_env() {
            debug!("using access token from environment");
            return Ok(Arc::new(provider));
        }
        Ok(Arc::new(CommandTokenProvider::new(
            &self.provider.token_command,
        )?))
    }

    pub fn google_provider(&self) -> MtResult<GoogleTranslateProvider> {
        GoogleTranslateProvider::with_options(
            self.credentials()?,
            &self.provider.endpoint,
            Duration::from_secs(self.provider.timeout_secs),
        )
    }
}
