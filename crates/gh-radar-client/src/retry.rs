//! Retrying GitHub API client (decorator pattern)
//!
//! Wraps any `GitHubClient` implementation and re-issues calls that failed
//! with a transient error (HTTP 5xx, 429, transport failure, timeout) after
//! an exponentially growing backoff. Client errors (4xx) and decode failures
//! surface immediately, since retrying those cannot succeed.

use crate::client::GitHubClient;
use crate::error::ClientError;
use crate::types::{
    PostedComment, PullRequestDetail, PullRequestFile, PullRequestItem, RepositoryRef,
};
use async_trait::async_trait;
use log::warn;
use std::future::Future;
use std::time::Duration;

/// Bounds for the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,

    /// Backoff before the first retry; doubles per attempt.
    pub initial_backoff: Duration,

    /// Backoff ceiling.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
        }
    }
}

/// Retrying client decorating an inner `GitHubClient`.
#[derive(Debug, Clone)]
pub struct RetryingClient<C> {
    inner: C,
    policy: RetryPolicy,
}

impl<C: GitHubClient> RetryingClient<C> {
    /// Wrap `inner` with the given retry policy.
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// Get a reference to the inner client.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Run `call` until it succeeds, the error is non-retryable, or the
    /// attempt budget is spent.
    async fn run<T, F, Fut>(&self, call: F) -> Result<T, ClientError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let mut attempt = 1;
        let mut backoff = self.policy.initial_backoff;

        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.policy.max_attempts => {
                    warn!(
                        "transient failure (attempt {}/{}), retrying in {:?}: {}",
                        attempt, self.policy.max_attempts, backoff, e
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(self.policy.max_backoff);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl<C: GitHubClient> GitHubClient for RetryingClient<C> {
    async fn list_personal_repos(&self) -> Result<Vec<RepositoryRef>, ClientError> {
        self.run(|| self.inner.list_personal_repos()).await
    }

    async fn list_organizations(&self) -> Result<Vec<String>, ClientError> {
        self.run(|| self.inner.list_organizations()).await
    }

    async fn list_org_repos(&self, org: &str) -> Result<Vec<RepositoryRef>, ClientError> {
        self.run(|| self.inner.list_org_repos(org)).await
    }

    async fn list_open_pulls(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<PullRequestItem>, ClientError> {
        self.run(|| self.inner.list_open_pulls(owner, repo)).await
    }

    async fn fetch_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequestDetail, ClientError> {
        self.run(|| self.inner.fetch_pull_request(owner, repo, number))
            .await
    }

    async fn list_pull_files(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<PullRequestFile>, ClientError> {
        self.run(|| self.inner.list_pull_files(owner, repo, number))
            .await
    }

    async fn fetch_file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        ref_sha: &str,
    ) -> Result<String, ClientError> {
        self.run(|| self.inner.fetch_file_content(owner, repo, path, ref_sha))
            .await
    }

    async fn post_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<PostedComment, ClientError> {
        self.run(|| self.inner.post_issue_comment(owner, repo, number, body))
            .await
    }
}
