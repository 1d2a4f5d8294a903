//! Shared mock client for the core test suites.

use async_trait::async_trait;
use gh_radar_client::{
    ClientError, GitHubClient, PostedComment, PullRequestDetail, PullRequestFile, PullRequestItem,
    RepositoryRef,
};
use http::StatusCode;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub(crate) fn personal_repo(owner: &str, name: &str) -> RepositoryRef {
    RepositoryRef {
        name: name.to_string(),
        full_name: format!("{owner}/{name}"),
        organization_url: None,
    }
}

pub(crate) fn org_repo(org: &str, name: &str) -> RepositoryRef {
    RepositoryRef {
        name: name.to_string(),
        full_name: format!("{org}/{name}"),
        organization_url: Some(format!("https://api.github.com/orgs/{org}")),
    }
}

pub(crate) fn pull(id: u64, number: u64, title: &str) -> PullRequestItem {
    PullRequestItem {
        id,
        number,
        title: title.to_string(),
        html_url: format!("https://github.com/x/y/pull/{number}"),
        author: "octocat".to_string(),
    }
}

pub(crate) fn changed_file(filename: &str, status: &str) -> PullRequestFile {
    PullRequestFile {
        filename: filename.to_string(),
        status: status.to_string(),
    }
}

pub(crate) fn upstream_error(operation: &str, status: StatusCode) -> ClientError {
    ClientError::Upstream {
        operation: operation.to_string(),
        status,
        message: "Not Found".to_string(),
    }
}

/// Scriptable `GitHubClient` with per-operation call counters.
#[derive(Default)]
pub(crate) struct MockClient {
    pub personal: Vec<RepositoryRef>,
    pub orgs: Vec<String>,
    pub org_repos: HashMap<String, Vec<RepositoryRef>>,

    /// Open pulls keyed by "owner/name".
    pub pulls: HashMap<String, Vec<PullRequestItem>>,
    /// Artificial latency per "owner/name", to scramble completion order.
    pub pull_delays: HashMap<String, Duration>,
    pub failing_pulls: HashSet<String>,

    pub fail_personal: bool,
    pub fail_org_list: bool,
    pub failing_orgs: HashSet<String>,

    pub detail: Option<PullRequestDetail>,
    pub files: Vec<PullRequestFile>,
    /// Fetchable contents keyed by path; anything else 404s.
    pub contents: HashMap<String, String>,

    /// When set, comment creation fails with this status.
    pub post_failure: Option<StatusCode>,

    pub personal_calls: AtomicUsize,
    pub org_list_calls: AtomicUsize,
    pub pull_list_calls: AtomicUsize,
    pub posted: Mutex<Vec<(String, u64, String)>>,
}

impl MockClient {
    pub(crate) fn personal_calls(&self) -> usize {
        self.personal_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn org_list_calls(&self) -> usize {
        self.org_list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn pull_list_calls(&self) -> usize {
        self.pull_list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn detail_for(number: u64, author: &str) -> PullRequestDetail {
        PullRequestDetail {
            number,
            html_url: format!("https://github.com/x/y/pull/{number}"),
            title: "a change".to_string(),
            body: Some("please review".to_string()),
            author: author.to_string(),
            head_sha: "abc123".to_string(),
        }
    }
}

#[async_trait]
impl GitHubClient for MockClient {
    async fn list_personal_repos(&self) -> Result<Vec<RepositoryRef>, ClientError> {
        self.personal_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_personal {
            return Err(upstream_error(
                "list personal repositories",
                StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }
        Ok(self.personal.clone())
    }

    async fn list_organizations(&self) -> Result<Vec<String>, ClientError> {
        self.org_list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_org_list {
            return Err(upstream_error(
                "list organizations",
                StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }
        Ok(self.orgs.clone())
    }

    async fn list_org_repos(&self, org: &str) -> Result<Vec<RepositoryRef>, ClientError> {
        if self.failing_orgs.contains(org) {
            return Err(upstream_error(
                "list organization repositories",
                StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }
        Ok(self.org_repos.get(org).cloned().unwrap_or_default())
    }

    async fn list_open_pulls(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<PullRequestItem>, ClientError> {
        self.pull_list_calls.fetch_add(1, Ordering::SeqCst);
        let key = format!("{owner}/{repo}");

        if let Some(delay) = self.pull_delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_pulls.contains(&key) {
            return Err(upstream_error(
                "list open pull requests",
                StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }
        Ok(self.pulls.get(&key).cloned().unwrap_or_default())
    }

    async fn fetch_pull_request(
        &self,
        _owner: &str,
        _repo: &str,
        _number: u64,
    ) -> Result<PullRequestDetail, ClientError> {
        self.detail
            .clone()
            .ok_or_else(|| upstream_error("fetch pull request", StatusCode::NOT_FOUND))
    }

    async fn list_pull_files(
        &self,
        _owner: &str,
        _repo: &str,
        _number: u64,
    ) -> Result<Vec<PullRequestFile>, ClientError> {
        Ok(self.files.clone())
    }

    async fn fetch_file_content(
        &self,
        _owner: &str,
        _repo: &str,
        path: &str,
        _ref_sha: &str,
    ) -> Result<String, ClientError> {
        self.contents
            .get(path)
            .cloned()
            .ok_or_else(|| upstream_error("fetch file content", StatusCode::NOT_FOUND))
    }

    async fn post_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<PostedComment, ClientError> {
        if let Some(status) = self.post_failure {
            return Err(upstream_error("post comment", status));
        }
        self.posted
            .lock()
            .unwrap()
            .push((format!("{owner}/{repo}"), number, body.to_string()));
        Ok(PostedComment {
            html_url: format!("https://github.com/{owner}/{repo}/pull/{number}#issuecomment-1"),
        })
    }
}
