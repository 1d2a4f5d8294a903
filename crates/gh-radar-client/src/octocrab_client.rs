//! Octocrab-based GitHub API client
//!
//! Direct implementation of the `GitHubClient` trait using the octocrab
//! library. Endpoints octocrab has a builder for (pull request listing and
//! lookup) go through it; the rest use raw routes against the same
//! authenticated session.

use crate::client::GitHubClient;
use crate::error::{map_octocrab_error, ClientError};
use crate::types::{
    PostedComment, PullRequestDetail, PullRequestFile, PullRequestItem, RepositoryRef,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use log::debug;
use octocrab::Octocrab;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

/// Page size for every paginated listing.
const PER_PAGE: usize = 100;

/// Direct GitHub API client using octocrab.
///
/// This is the base implementation that makes actual API calls. It can be
/// wrapped by `RetryingClient` to add retry behavior.
#[derive(Debug, Clone)]
pub struct OctocrabClient {
    octocrab: Arc<Octocrab>,
}

/// Repository entry as GitHub returns it.
#[derive(Debug, Deserialize)]
struct RepoWire {
    name: String,
    full_name: String,
}

/// Organization membership entry.
#[derive(Debug, Deserialize)]
struct OrgWire {
    login: String,
}

/// Contents-API answer for a single file.
#[derive(Debug, Deserialize)]
struct ContentWire {
    content: Option<String>,
    encoding: Option<String>,
}

/// Created-comment answer.
#[derive(Debug, Deserialize)]
struct CommentWire {
    html_url: String,
}

impl OctocrabClient {
    /// Create a new client over the given octocrab session.
    pub fn new(octocrab: Arc<Octocrab>) -> Self {
        Self { octocrab }
    }

    /// Get a reference to the underlying octocrab instance.
    pub fn octocrab(&self) -> &Octocrab {
        &self.octocrab
    }

    /// Fetch every page of a list endpoint.
    ///
    /// Paging parameters are appended to `extra`. Stops on the first short
    /// page.
    async fn get_paged<T: DeserializeOwned>(
        &self,
        operation: &str,
        route: &str,
        extra: &[(&str, &str)],
    ) -> Result<Vec<T>, ClientError> {
        let per_page = PER_PAGE.to_string();
        let mut out = Vec::new();
        let mut page = 1u32;

        loop {
            let page_str = page.to_string();
            let mut query: Vec<(&str, &str)> = extra.to_vec();
            query.push(("per_page", per_page.as_str()));
            query.push(("page", page_str.as_str()));

            let items: Vec<T> = self
                .octocrab
                .get(route, Some(&query))
                .await
                .map_err(|e| map_octocrab_error(operation, &e))?;

            let fetched = items.len();
            out.extend(items);

            if fetched < PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(out)
    }
}

#[async_trait]
impl GitHubClient for OctocrabClient {
    async fn list_personal_repos(&self) -> Result<Vec<RepositoryRef>, ClientError> {
        let repos: Vec<RepoWire> = self
            .get_paged(
                "list personal repositories",
                "/user/repos",
                &[("affiliation", "owner")],
            )
            .await?;

        debug!("fetched {} personal repositories", repos.len());
        Ok(repos
            .into_iter()
            .map(|repo| RepositoryRef {
                name: repo.name,
                full_name: repo.full_name,
                organization_url: None,
            })
            .collect())
    }

    async fn list_organizations(&self) -> Result<Vec<String>, ClientError> {
        let orgs: Vec<OrgWire> = self
            .get_paged("list organizations", "/user/orgs", &[])
            .await?;

        debug!("fetched {} organization memberships", orgs.len());
        Ok(orgs.into_iter().map(|org| org.login).collect())
    }

    async fn list_org_repos(&self, org: &str) -> Result<Vec<RepositoryRef>, ClientError> {
        let operation = format!("list repositories of organization {org}");
        let route = format!("/orgs/{org}/repos");
        let repos: Vec<RepoWire> = self.get_paged(&operation, &route, &[]).await?;

        debug!("fetched {} repositories for organization {}", repos.len(), org);
        let organization_url = format!("https://api.github.com/orgs/{org}");
        Ok(repos
            .into_iter()
            .map(|repo| RepositoryRef {
                name: repo.name,
                full_name: repo.full_name,
                organization_url: Some(organization_url.clone()),
            })
            .collect())
    }

    async fn list_open_pulls(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<PullRequestItem>, ClientError> {
        let operation = format!("list open pull requests for {owner}/{repo}");
        let mut pulls = Vec::new();
        let mut page_num = 1u32;

        // Upstream order is part of the contract, so pages are appended
        // as-is and never re-sorted.
        loop {
            let page = self
                .octocrab
                .pulls(owner, repo)
                .list()
                .state(octocrab::params::State::Open)
                .per_page(PER_PAGE as u8)
                .page(page_num)
                .send()
                .await
                .map_err(|e| map_octocrab_error(&operation, &e))?;

            let fetched = page.items.len();
            pulls.extend(page.items.iter().map(convert_pull_item));

            if fetched < PER_PAGE {
                break;
            }
            page_num += 1;
        }

        debug!("fetched {} open pull requests for {}/{}", pulls.len(), owner, repo);
        Ok(pulls)
    }

    async fn fetch_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequestDetail, ClientError> {
        let operation = format!("fetch pull request {owner}/{repo}#{number}");
        let pr = self
            .octocrab
            .pulls(owner, repo)
            .get(number)
            .await
            .map_err(|e| map_octocrab_error(&operation, &e))?;

        Ok(PullRequestDetail {
            number: pr.number,
            html_url: pr
                .html_url
                .as_ref()
                .map(|u| u.to_string())
                .unwrap_or_default(),
            title: pr.title.clone().unwrap_or_default(),
            body: pr.body.clone(),
            author: pr
                .user
                .as_ref()
                .map(|u| u.login.clone())
                .unwrap_or_else(|| "unknown".to_string()),
            head_sha: pr.head.sha.clone(),
        })
    }

    async fn list_pull_files(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<PullRequestFile>, ClientError> {
        let operation = format!("list files of pull request {owner}/{repo}#{number}");
        let route = format!("/repos/{owner}/{repo}/pulls/{number}/files");
        self.get_paged(&operation, &route, &[]).await
    }

    async fn fetch_file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        ref_sha: &str,
    ) -> Result<String, ClientError> {
        let operation = format!("fetch content of {path} in {owner}/{repo}");
        let route = format!("/repos/{owner}/{repo}/contents/{path}");
        let content: ContentWire = self
            .octocrab
            .get(route, Some(&[("ref", ref_sha)]))
            .await
            .map_err(|e| map_octocrab_error(&operation, &e))?;

        // Contents over ~1 MiB come back with encoding "none" and an empty
        // body; anything that is not inline base64 is undecodable here.
        if content.encoding.as_deref() != Some("base64") {
            return Err(ClientError::Decode {
                filename: path.to_string(),
                reason: format!(
                    "unsupported content encoding {:?}",
                    content.encoding.as_deref().unwrap_or("missing")
                ),
            });
        }

        let raw = content.content.ok_or_else(|| ClientError::Decode {
            filename: path.to_string(),
            reason: "response carried no content field".to_string(),
        })?;

        decode_content(path, &raw)
    }

    async fn post_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<PostedComment, ClientError> {
        let operation = format!("post comment on {owner}/{repo}#{number}");
        let route = format!("/repos/{owner}/{repo}/issues/{number}/comments");
        let payload = serde_json::json!({ "body": body });

        let comment: CommentWire = self
            .octocrab
            .post(route, Some(&payload))
            .await
            .map_err(|e| map_octocrab_error(&operation, &e))?;

        Ok(PostedComment {
            html_url: comment.html_url,
        })
    }
}

/// Convert octocrab's pull request model to our listing item.
fn convert_pull_item(pr: &octocrab::models::pulls::PullRequest) -> PullRequestItem {
    PullRequestItem {
        id: pr.id.0,
        number: pr.number,
        title: pr.title.clone().unwrap_or_default(),
        html_url: pr
            .html_url
            .as_ref()
            .map(|u| u.to_string())
            .unwrap_or_default(),
        author: pr
            .user
            .as_ref()
            .map(|u| u.login.clone())
            .unwrap_or_else(|| "unknown".to_string()),
    }
}

/// Decode a base64 contents payload into UTF-8 text.
///
/// GitHub wraps base64 bodies across lines; whitespace is stripped before
/// decoding.
fn decode_content(filename: &str, raw: &str) -> Result<String, ClientError> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    let bytes = BASE64
        .decode(compact.as_bytes())
        .map_err(|e| ClientError::Decode {
            filename: filename.to_string(),
            reason: format!("invalid base64: {e}"),
        })?;

    String::from_utf8(bytes).map_err(|e| ClientError::Decode {
        filename: filename.to_string(),
        reason: format!("invalid UTF-8: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_content_plain() {
        // "fn main() {}" in base64
        let decoded = decode_content("main.rs", "Zm4gbWFpbigpIHt9").unwrap();
        assert_eq!(decoded, "fn main() {}");
    }

    #[test]
    fn test_decode_content_with_line_wrapping() {
        // GitHub inserts newlines every 60 characters
        let decoded = decode_content("main.rs", "Zm4gbWFp\nbigpIHt9\n").unwrap();
        assert_eq!(decoded, "fn main() {}");
    }

    #[test]
    fn test_decode_content_rejects_invalid_base64() {
        let err = decode_content("main.rs", "!!! not base64 !!!").unwrap_err();
        match err {
            ClientError::Decode { filename, reason } => {
                assert_eq!(filename, "main.rs");
                assert!(reason.contains("base64"));
            }
            other => panic!("expected Decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_content_rejects_invalid_utf8() {
        // 0xFF 0xFE is not valid UTF-8
        let raw = BASE64.encode([0xFFu8, 0xFE]);
        let err = decode_content("blob.bin", &raw).unwrap_err();
        match err {
            ClientError::Decode { reason, .. } => assert!(reason.contains("UTF-8")),
            other => panic!("expected Decode error, got {other:?}"),
        }
    }
}
