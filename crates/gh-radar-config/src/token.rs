//! GitHub token resolution
//!
//! The upstream token is provisioned through the environment. Resolution is
//! done once at startup so a missing token fails the process before it binds,
//! never at request time.

use thiserror::Error;

/// Environment variables consulted for the token, in order.
const TOKEN_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no GitHub token found: set GITHUB_TOKEN or GH_TOKEN")]
    MissingToken,
}

/// Resolve the GitHub token from `GITHUB_TOKEN`, then `GH_TOKEN`.
pub fn resolve_token() -> Result<String, ConfigError> {
    for key in TOKEN_VARS {
        if let Ok(token) = std::env::var(key) {
            if !token.trim().is_empty() {
                log::debug!("using GitHub token from {}", key);
                return Ok(token);
            }
        }
    }

    Err(ConfigError::MissingToken)
}
