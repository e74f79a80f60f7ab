//! Bearer token acquisition
//!
//! The Google provider does not know where its token comes from; it asks a
//! [`CredentialProvider`]. The default one shells out to
//! `gcloud auth application-default print-access-token`, which reads the
//! service account file named by `GOOGLE_APPLICATION_CREDENTIALS`. Token
//! lifetime and refresh are the external command's business.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::mt::error::{MtError, MtResult};

/// Environment variable holding a ready-made access token
pub const ACCESS_TOKEN_ENV: &str = "GTRANS_ACCESS_TOKEN";

/// Environment variable the token command reads its credential file from
pub const CREDENTIALS_FILE_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Supplies the bearer token for a request
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Get a token; failures are `MtError::AuthError`
    async fn bearer_token(&self) -> MtResult<String>;
}

/// Runs an external command and uses its trimmed stdout as the token
#[derive(Debug, Clone)]
pub struct CommandTokenProvider {
    program: String,
    args: Vec<String>,
}

impl CommandTokenProvider {
    /// Build from a command line split into program and arguments
    pub fn new(command: &[String]) -> MtResult<Self> {
        let Some((program, args)) = command.split_first() else {
            return Err(MtError::ConfigError("Token command is empty".to_string()));
        };
        if program.trim().is_empty() {
            return Err(MtError::ConfigError(
                "Token command program is empty".to_string(),
            ));
        }
        Ok(CommandTokenProvider {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// `gcloud auth application-default print-access-token`
    pub fn gcloud() -> Self {
        CommandTokenProvider {
            program: "gcloud".to_string(),
            args: ["auth", "application-default", "print-access-token"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl CredentialProvider for CommandTokenProvider {
    async fn bearer_token(&self) -> MtResult<String> {
        debug!(
            command = %self.command_line(),
            credentials_file = std::env::var(CREDENTIALS_FILE_ENV).is_ok(),
            "requesting access token"
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| {
                MtError::AuthError(format!("Failed to run `{}`: {}", self.command_line(), e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MtError::AuthError(format!(
                "`{}` exited with {}: {}",
                self.command_line(),
                output.status,
                stderr.trim()
            )));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(MtError::AuthError(format!(
                "`{}` printed an empty token",
                self.command_line()
            )));
        }

        Ok(token)
    }
}

/// A fixed token
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: String) -> MtResult<Self> {
        let token = token.trim().to_string();
        if token.is_empty() {
            return Err(MtError::AuthError("Access token is empty".to_string()));
        }
        Ok(StaticTokenProvider { token })
    }

    /// Read the token from `GTRANS_ACCESS_TOKEN`; `None` if unset or blank
    pub fn from_env() -> Option<Self> {
        std::env::var(ACCESS_TOKEN_ENV)
            .ok()
            .and_then(|token| Self::new(token).ok())
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("token", &"***")
            .finish()
    }
}

#[async_trait]
impl CredentialProvider for StaticTokenProvider {
    async fn bearer_token(&self) -> MtResult<String> {
        Ok(self.token.clone())
    }
}
