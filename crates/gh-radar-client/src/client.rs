//! GitHub client trait
//!
//! Defines the interface the aggregation layers program against.
//! Implementations can be direct (hitting the API) or decorated with retry
//! logic; see [`crate::RetryingClient`].

use crate::error::ClientError;
use crate::types::{
    PostedComment, PullRequestDetail, PullRequestFile, PullRequestItem, RepositoryRef,
};
use async_trait::async_trait;

/// GitHub API client.
///
/// Implementations must be `Send + Sync` so they can be shared across the
/// fan-out tasks spawned by discovery and aggregation.
#[async_trait]
pub trait GitHubClient: Send + Sync {
    /// List the authenticated user's personal repositories.
    ///
    /// Paginated upstream; implementations return the full list.
    async fn list_personal_repos(&self) -> Result<Vec<RepositoryRef>, ClientError>;

    /// List the logins of organizations the authenticated user belongs to.
    async fn list_organizations(&self) -> Result<Vec<String>, ClientError>;

    /// List one organization's repositories, in upstream order.
    async fn list_org_repos(&self, org: &str) -> Result<Vec<RepositoryRef>, ClientError>;

    /// List a repository's open pull requests, in upstream order.
    async fn list_open_pulls(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<PullRequestItem>, ClientError>;

    /// Fetch full metadata for a single pull request.
    async fn fetch_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequestDetail, ClientError>;

    /// List the files changed by a pull request.
    async fn list_pull_files(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<PullRequestFile>, ClientError>;

    /// Fetch one file's content at a given revision, decoded to UTF-8 text.
    async fn fetch_file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        ref_sha: &str,
    ) -> Result<String, ClientError>;

    /// Create a comment on a pull request (issue comment endpoint).
    ///
    /// GitHub answers 201 with the created comment on success; any other
    /// status surfaces as [`ClientError::Upstream`] carrying the upstream
    /// status and message.
    async fn post_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<PostedComment, ClientError>;
}
