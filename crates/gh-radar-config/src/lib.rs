//! Configuration loading for gh-pr-radar
//!
//! This crate provides:
//! - Application configuration loaded from `gh-radar.toml` (AppConfig)
//! - GitHub token resolution from the environment

pub mod app_config;
pub mod token;

pub use app_config::AppConfig;
pub use token::{resolve_token, ConfigError};
