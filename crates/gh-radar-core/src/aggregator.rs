//! Pull request aggregation
//!
//! Fans out one "list open pull requests" call per discovered repository and
//! merges the results into a single ordered listing. One broken repository
//! never aborts the pass: its outcome is tagged as a failure, logged, and the
//! aggregate carries on with what the other repositories returned.

use crate::discovery::RepoDiscovery;
use crate::FanoutLimits;
use gh_radar_client::{ClientError, GitHubClient, PullRequestSummary, TestPresence};
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// A repository whose pull request listing failed during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoFailure {
    pub repository: String,
    pub reason: String,
}

/// Outcome of one aggregation pass.
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// Merged open pull requests, in repository iteration order.
    pub pull_requests: Vec<PullRequestSummary>,

    /// Repositories that contributed nothing, with the reason why.
    pub failures: Vec<RepoFailure>,
}

/// Aggregates open pull requests across every discovered repository.
pub struct PullRequestAggregator {
    client: Arc<dyn GitHubClient>,
    discovery: Arc<RepoDiscovery>,
    limits: FanoutLimits,
}

impl PullRequestAggregator {
    pub fn new(
        client: Arc<dyn GitHubClient>,
        discovery: Arc<RepoDiscovery>,
        limits: FanoutLimits,
    ) -> Self {
        Self {
            client,
            discovery,
            limits,
        }
    }

    /// List open pull requests across all repositories.
    ///
    /// Output order is deterministic: repositories in discovery order, each
    /// repository's pull requests in upstream order. `has_tests` stays
    /// [`TestPresence::Unknown`]: file inspection is deferred to the content
    /// fetcher so this pass costs one call per repository, not per pull
    /// request.
    pub async fn list_open_pull_requests(&self) -> Result<Aggregation, ClientError> {
        let repos = self.discovery.list_all_repositories().await?;

        let semaphore = Arc::new(Semaphore::new(self.limits.concurrency));
        let timeout = self.limits.request_timeout;

        let handles: Vec<_> = repos
            .iter()
            .map(|repo| {
                let client = Arc::clone(&self.client);
                let semaphore = Arc::clone(&semaphore);
                let repo = repo.clone();
                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
                    let owner = repo.owner().to_string();
                    tokio::time::timeout(timeout, client.list_open_pulls(&owner, &repo.name))
                        .await
                        .map_err(|_| ClientError::Timeout {
                            operation: format!("list open pull requests for {}", repo.full_name),
                        })
                        .and_then(|result| result)
                })
            })
            .collect();

        let mut pull_requests = Vec::new();
        let mut failures = Vec::new();

        // Submission order, not completion order.
        for (repo, handle) in repos.iter().zip(handles) {
            let outcome = match handle.await {
                Ok(result) => result,
                Err(e) => Err(ClientError::Network {
                    operation: format!("list open pull requests for {}", repo.full_name),
                    message: format!("task failed: {e}"),
                }),
            };

            match outcome {
                Ok(items) => {
                    pull_requests.extend(items.into_iter().map(|item| PullRequestSummary {
                        id: item.id,
                        number: item.number,
                        title: item.title,
                        html_url: item.html_url,
                        author: item.author,
                        repository: repo.clone(),
                        has_tests: TestPresence::Unknown,
                    }));
                }
                Err(e) => {
                    warn!("skipping {}: {}", repo.full_name, e);
                    failures.push(RepoFailure {
                        repository: repo.full_name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            "aggregated {} open pull requests across {} repositories ({} failed)",
            pull_requests.len(),
            repos.len(),
            failures.len()
        );

        Ok(Aggregation {
            pull_requests,
            failures,
        })
    }
}
