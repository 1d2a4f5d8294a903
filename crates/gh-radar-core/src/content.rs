//! Pull request content fetching
//!
//! Resolves one pull request into its metadata plus the decoded contents of
//! its changed files. This is also the lazy enrichment point: the test-file
//! flag deferred during aggregation is computed here from the file listing.

use crate::FanoutLimits;
use gh_radar_client::{
    ChangedFile, ClientError, GitHubClient, PullRequestDetail, PullRequestFile, TestPresence,
};
use log::debug;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// A pull request with its reviewable file contents.
#[derive(Debug, Clone)]
pub struct PrFiles {
    /// Decoded changed files, in listing order. Removed files and files whose
    /// content could not be fetched or decoded are absent.
    pub files: Vec<ChangedFile>,

    pub pr: PullRequestDetail,

    /// Computed from the changed-file names; always `Known` here.
    pub has_tests: TestPresence,
}

/// Fetches a pull request's metadata and changed-file contents.
pub struct ContentFetcher {
    client: Arc<dyn GitHubClient>,
    limits: FanoutLimits,
}

impl ContentFetcher {
    pub fn new(client: Arc<dyn GitHubClient>, limits: FanoutLimits) -> Self {
        Self { client, limits }
    }

    /// Fetch metadata and decoded file contents for one pull request.
    ///
    /// The metadata and file-listing calls are required and fail the
    /// operation. Individual content fetches are not: a file whose content
    /// cannot be fetched or decoded is skipped, so callers can see a partial
    /// (or empty) file set. Contents are fetched concurrently but appear in
    /// listing order.
    pub async fn fetch_pr_files(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PrFiles, ClientError> {
        let pr = self.client.fetch_pull_request(owner, repo, number).await?;
        let listed = self.client.list_pull_files(owner, repo, number).await?;

        let has_tests = TestPresence::Known(
            listed
                .iter()
                .any(|file| filename_suggests_tests(&file.filename)),
        );

        let reviewable: Vec<PullRequestFile> = listed
            .into_iter()
            .filter(|file| !file.is_removed())
            .collect();

        let semaphore = Arc::new(Semaphore::new(self.limits.concurrency));
        let timeout = self.limits.request_timeout;

        let handles: Vec<_> = reviewable
            .iter()
            .map(|file| {
                let client = Arc::clone(&self.client);
                let semaphore = Arc::clone(&semaphore);
                let owner = owner.to_string();
                let repo = repo.to_string();
                let path = file.filename.clone();
                let ref_sha = pr.head_sha.clone();
                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
                    tokio::time::timeout(
                        timeout,
                        client.fetch_file_content(&owner, &repo, &path, &ref_sha),
                    )
                    .await
                    .map_err(|_| ClientError::Timeout {
                        operation: format!("fetch content of {path}"),
                    })
                    .and_then(|result| result)
                })
            })
            .collect();

        let mut files = Vec::with_capacity(reviewable.len());
        for (file, handle) in reviewable.iter().zip(handles) {
            match handle.await {
                Ok(Ok(content)) => files.push(ChangedFile {
                    filename: file.filename.clone(),
                    content,
                }),
                Ok(Err(e)) => debug!("skipping {}: {}", file.filename, e),
                Err(e) => debug!("skipping {}: task failed: {}", file.filename, e),
            }
        }

        debug!(
            "fetched {} of {} reviewable files for {}/{}#{}",
            files.len(),
            reviewable.len(),
            owner,
            repo,
            number
        );

        Ok(PrFiles {
            files,
            pr,
            has_tests,
        })
    }
}

/// The test-file heuristic: name contains "test" or "spec", case-insensitive.
fn filename_suggests_tests(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    lower.contains("test") || lower.contains("spec")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{changed_file, MockClient};
    use std::collections::HashMap;

    fn fetcher_over(mock: MockClient) -> ContentFetcher {
        ContentFetcher::new(Arc::new(mock), FanoutLimits::default())
    }

    fn mock_with_files(files: Vec<PullRequestFile>, contents: HashMap<String, String>) -> MockClient {
        MockClient {
            detail: Some(MockClient::detail_for(42, "octocat")),
            files,
            contents,
            ..MockClient::default()
        }
    }

    #[tokio::test]
    async fn test_removed_files_are_excluded() {
        let mock = mock_with_files(
            vec![
                changed_file("src/lib.rs", "modified"),
                changed_file("src/old.rs", "removed"),
                changed_file("src/new.rs", "added"),
            ],
            HashMap::from([
                ("src/lib.rs".to_string(), "pub mod new;".to_string()),
                ("src/new.rs".to_string(), "pub fn radar() {}".to_string()),
            ]),
        );
        let fetcher = fetcher_over(mock);

        let pr_files = fetcher.fetch_pr_files("me", "a", 42).await.unwrap();

        assert_eq!(pr_files.files.len(), 2);
        assert_eq!(pr_files.files[0].filename, "src/lib.rs");
        assert_eq!(pr_files.files[1].filename, "src/new.rs");
    }

    #[tokio::test]
    async fn test_unfetchable_file_is_skipped_and_order_preserved() {
        let mock = mock_with_files(
            vec![
                changed_file("a.rs", "modified"),
                changed_file("gone.rs", "modified"),
                changed_file("b.rs", "modified"),
            ],
            HashMap::from([
                ("a.rs".to_string(), "a".to_string()),
                ("b.rs".to_string(), "b".to_string()),
            ]),
        );
        let fetcher = fetcher_over(mock);

        let pr_files = fetcher.fetch_pr_files("me", "a", 42).await.unwrap();

        let names: Vec<_> = pr_files.files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, ["a.rs", "b.rs"]);
    }

    #[tokio::test]
    async fn test_all_files_removed_yields_empty_set() {
        let mock = mock_with_files(
            vec![
                changed_file("a.rs", "removed"),
                changed_file("b.rs", "removed"),
            ],
            HashMap::new(),
        );
        let fetcher = fetcher_over(mock);

        let pr_files = fetcher.fetch_pr_files("me", "a", 42).await.unwrap();

        assert!(pr_files.files.is_empty());
        assert_eq!(pr_files.pr.number, 42);
    }

    #[tokio::test]
    async fn test_has_tests_reflects_filenames() {
        let mock = mock_with_files(
            vec![
                changed_file("src/lib.rs", "modified"),
                changed_file("tests/radar_test.rs", "added"),
            ],
            HashMap::from([
                ("src/lib.rs".to_string(), "x".to_string()),
                ("tests/radar_test.rs".to_string(), "y".to_string()),
            ]),
        );
        let fetcher = fetcher_over(mock);

        let pr_files = fetcher.fetch_pr_files("me", "a", 42).await.unwrap();
        assert_eq!(pr_files.has_tests, TestPresence::Known(true));
    }

    #[tokio::test]
    async fn test_has_tests_false_without_test_files() {
        let mock = mock_with_files(
            vec![changed_file("src/lib.rs", "modified")],
            HashMap::from([("src/lib.rs".to_string(), "x".to_string())]),
        );
        let fetcher = fetcher_over(mock);

        let pr_files = fetcher.fetch_pr_files("me", "a", 42).await.unwrap();
        assert_eq!(pr_files.has_tests, TestPresence::Known(false));
    }

    #[tokio::test]
    async fn test_missing_pull_request_is_fatal() {
        let mock = MockClient::default(); // no detail configured -> 404
        let fetcher = fetcher_over(mock);

        assert!(fetcher.fetch_pr_files("me", "a", 42).await.is_err());
    }

    #[test]
    fn test_filename_heuristic() {
        assert!(filename_suggests_tests("tests/api.rs"));
        assert!(filename_suggests_tests("src/Spec.scala"));
        assert!(filename_suggests_tests("IntegrationTest.java"));
        assert!(!filename_suggests_tests("src/main.rs"));
    }
}
