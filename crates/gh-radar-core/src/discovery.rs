//! Repository discovery
//!
//! Builds the full list of repositories visible to the authenticated user:
//! personal repositories first, then every organization's repositories in
//! membership order. The merged list is cached under a single key with a
//! short TTL, so back-to-back aggregation passes reuse one upstream sweep.

use crate::FanoutLimits;
use gh_radar_cache::TtlCache;
use gh_radar_client::{ClientError, GitHubClient, RepositoryRef};
use log::{debug, warn};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// Cache key for the merged repository list.
pub const ALL_REPOS_KEY: &str = "all_repos";

/// Discovers the repositories visible to the authenticated user.
pub struct RepoDiscovery {
    client: Arc<dyn GitHubClient>,
    cache: Arc<Mutex<TtlCache>>,
    /// Serializes cache population so concurrent callers trigger at most one
    /// upstream sweep per expiry (single-flight).
    refresh_lock: tokio::sync::Mutex<()>,
    limits: FanoutLimits,
}

impl RepoDiscovery {
    pub fn new(
        client: Arc<dyn GitHubClient>,
        cache: Arc<Mutex<TtlCache>>,
        limits: FanoutLimits,
    ) -> Self {
        Self {
            client,
            cache,
            refresh_lock: tokio::sync::Mutex::new(()),
            limits,
        }
    }

    /// All repositories visible to the user, cache-aware.
    ///
    /// Order: personal repositories first, then each organization's
    /// repositories in the order the org list returned them, each block in
    /// upstream order.
    ///
    /// A failure listing personal repositories or the organization
    /// memberships is fatal; a failure listing one organization's
    /// repositories only costs that organization's block.
    pub async fn list_all_repositories(&self) -> Result<Vec<RepositoryRef>, ClientError> {
        if let Some(repos) = self.cached() {
            return Ok(repos);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have repopulated while we waited for the lock.
        if let Some(repos) = self.cached() {
            return Ok(repos);
        }

        let repos = self.fetch_all().await?;

        match serde_json::to_string(&repos) {
            Ok(json) => self.cache.lock().unwrap().set(ALL_REPOS_KEY, json),
            Err(e) => debug!("not caching repository list: {}", e),
        }

        Ok(repos)
    }

    fn cached(&self) -> Option<Vec<RepositoryRef>> {
        let json = self.cache.lock().unwrap().get(ALL_REPOS_KEY)?;
        match serde_json::from_str(&json) {
            Ok(repos) => {
                debug!("cache HIT for {}", ALL_REPOS_KEY);
                Some(repos)
            }
            Err(e) => {
                // Unparseable entry: fall through to a fresh fetch.
                debug!("failed to parse cached repository list: {}", e);
                None
            }
        }
    }

    async fn fetch_all(&self) -> Result<Vec<RepositoryRef>, ClientError> {
        let mut repos = self.client.list_personal_repos().await?;
        let orgs = self.client.list_organizations().await?;
        debug!(
            "discovered {} personal repositories and {} organizations",
            repos.len(),
            orgs.len()
        );

        let semaphore = Arc::new(Semaphore::new(self.limits.concurrency));
        let timeout = self.limits.request_timeout;

        let handles: Vec<_> = orgs
            .iter()
            .map(|org| {
                let client = Arc::clone(&self.client);
                let semaphore = Arc::clone(&semaphore);
                let org = org.clone();
                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
                    tokio::time::timeout(timeout, client.list_org_repos(&org))
                        .await
                        .map_err(|_| ClientError::Timeout {
                            operation: format!("list repositories of organization {org}"),
                        })
                        .and_then(|result| result)
                })
            })
            .collect();

        // Awaiting in submission order keeps the merged list deterministic.
        for (org, handle) in orgs.iter().zip(handles) {
            match handle.await {
                Ok(Ok(org_repos)) => repos.extend(org_repos),
                Ok(Err(e)) => warn!("skipping organization {}: {}", org, e),
                Err(e) => warn!("skipping organization {}: task failed: {}", org, e),
            }
        }

        Ok(repos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{org_repo, personal_repo, MockClient};
    use std::collections::{HashMap, HashSet};
    use std::time::Duration;

    fn discovery_over(mock: MockClient, ttl: Duration) -> (Arc<MockClient>, RepoDiscovery) {
        let client = Arc::new(mock);
        let cache = Arc::new(Mutex::new(TtlCache::new(ttl)));
        let discovery = RepoDiscovery::new(
            Arc::clone(&client) as Arc<dyn GitHubClient>,
            cache,
            FanoutLimits::default(),
        );
        (client, discovery)
    }

    fn two_org_mock() -> MockClient {
        MockClient {
            personal: vec![personal_repo("me", "a")],
            orgs: vec!["acme".to_string(), "zorg".to_string()],
            org_repos: HashMap::from([
                (
                    "acme".to_string(),
                    vec![org_repo("acme", "x"), org_repo("acme", "y")],
                ),
                ("zorg".to_string(), vec![org_repo("zorg", "z")]),
            ]),
            ..MockClient::default()
        }
    }

    #[tokio::test]
    async fn test_merges_personal_first_then_orgs_in_membership_order() {
        let (_client, discovery) = discovery_over(two_org_mock(), Duration::from_secs(60));

        let repos = discovery.list_all_repositories().await.unwrap();

        let names: Vec<_> = repos.iter().map(|r| r.full_name.as_str()).collect();
        assert_eq!(names, ["me/a", "acme/x", "acme/y", "zorg/z"]);
        assert_eq!(repos[0].organization_url, None);
        assert_eq!(
            repos[1].organization_url.as_deref(),
            Some("https://api.github.com/orgs/acme")
        );
    }

    #[tokio::test]
    async fn test_second_call_within_ttl_hits_cache() {
        let (client, discovery) = discovery_over(two_org_mock(), Duration::from_secs(60));

        let first = discovery.list_all_repositories().await.unwrap();
        let second = discovery.list_all_repositories().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(client.personal_calls(), 1);
        assert_eq!(client.org_list_calls(), 1);
    }

    #[tokio::test]
    async fn test_call_after_ttl_expiry_fetches_again() {
        let (client, discovery) = discovery_over(two_org_mock(), Duration::from_millis(30));

        discovery.list_all_repositories().await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        discovery.list_all_repositories().await.unwrap();

        assert_eq!(client.personal_calls(), 2);
    }

    #[tokio::test]
    async fn test_one_broken_org_does_not_abort_discovery() {
        let mock = MockClient {
            failing_orgs: HashSet::from(["acme".to_string()]),
            ..two_org_mock()
        };
        let (_client, discovery) = discovery_over(mock, Duration::from_secs(60));

        let repos = discovery.list_all_repositories().await.unwrap();

        let names: Vec<_> = repos.iter().map(|r| r.full_name.as_str()).collect();
        assert_eq!(names, ["me/a", "zorg/z"]);
    }

    #[tokio::test]
    async fn test_personal_listing_failure_is_fatal() {
        let mock = MockClient {
            fail_personal: true,
            ..two_org_mock()
        };
        let (_client, discovery) = discovery_over(mock, Duration::from_secs(60));

        assert!(discovery.list_all_repositories().await.is_err());
    }

    #[tokio::test]
    async fn test_org_list_failure_is_fatal() {
        let mock = MockClient {
            fail_org_list: true,
            ..two_org_mock()
        };
        let (_client, discovery) = discovery_over(mock, Duration::from_secs(60));

        assert!(discovery.list_all_repositories().await.is_err());
    }

    #[tokio::test]
    async fn test_failed_discovery_populates_nothing() {
        let mock = MockClient {
            fail_personal: true,
            ..two_org_mock()
        };
        let (client, discovery) = discovery_over(mock, Duration::from_secs(60));

        assert!(discovery.list_all_repositories().await.is_err());
        assert!(discovery.list_all_repositories().await.is_err());

        // No cached failure: both calls went upstream.
        assert_eq!(client.personal_calls(), 2);
    }
}
