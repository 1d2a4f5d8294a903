//! GitHub API client with retry support
//!
//! This crate provides a trait-based GitHub API client for the radar service.
//! The design follows the decorator pattern: the direct octocrab-backed
//! client can be wrapped to add retry behavior without callers knowing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              GitHubClient trait                  │
//! │  - list_personal_repos() / list_org_repos()      │
//! │  - list_open_pulls()                             │
//! │  - fetch_pull_request() / list_pull_files()      │
//! │  - fetch_file_content() / post_issue_comment()   │
//! └─────────────────────────────────────────────────┘
//!                        │
//!        ┌───────────────┴───────────────┐
//!        ▼                               ▼
//! ┌─────────────────┐         ┌─────────────────────┐
//! │ OctocrabClient  │         │ RetryingClient      │
//! │ (direct API)    │◄────────│ (decorator)         │
//! └─────────────────┘         └─────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use gh_radar_client::{GitHubClient, OctocrabClient, RetryingClient, RetryPolicy};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let octocrab = octocrab::Octocrab::builder()
//!     .personal_token("token".to_string())
//!     .build()?;
//!
//! let client = RetryingClient::new(
//!     OctocrabClient::new(Arc::new(octocrab)),
//!     RetryPolicy::default(),
//! );
//!
//! let repos = client.list_personal_repos().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod octocrab_client;
pub mod retry;
pub mod types;

pub use client::GitHubClient;
pub use error::ClientError;
pub use octocrab_client::OctocrabClient;
pub use retry::{RetryPolicy, RetryingClient};
pub use types::{
    ChangedFile, PostedComment, PullRequestDetail, PullRequestFile, PullRequestItem,
    PullRequestSummary, RepositoryRef, TestPresence,
};

// Re-export octocrab so the binary doesn't need to depend on it directly
pub use octocrab;
