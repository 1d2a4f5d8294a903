//! HTTP surface
//!
//! Three JSON endpoints consumed by the frontend, plus a liveness probe.
//! Errors cross the boundary as `{"detail": message}` with the appropriate
//! status; per-repository failures never reach here (the aggregator absorbs
//! them), so a 500 on the listing endpoint means discovery itself failed.

use crate::review::format_comment;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use gh_radar_client::PullRequestSummary;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/pull-requests", get(list_pull_requests))
        .route("/api/request-tests", post(request_tests))
        .route("/api/post-comment", post(post_comment))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// An error response: status plus a human-readable detail string.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    service: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        service: "gh-pr-radar".to_string(),
    })
}

async fn list_pull_requests(
    State(state): State<AppState>,
) -> Result<Json<Vec<PullRequestSummary>>, ApiError> {
    let aggregation = state.aggregator.list_open_pull_requests().await.map_err(|e| {
        log::error!("failed to aggregate pull requests: {}", e);
        ApiError::internal(e.to_string())
    })?;

    Ok(Json(aggregation.pull_requests))
}

/// Body of both POST endpoints; `comment` only matters when posting.
#[derive(Debug, Deserialize)]
pub struct RequestTestsPayload {
    owner: String,
    repo: String,
    #[serde(rename = "prNumber")]
    pr_number: u64,
    #[serde(default)]
    comment: Option<String>,
}

async fn request_tests(
    State(state): State<AppState>,
    Json(payload): Json<RequestTestsPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let pr_data = state
        .fetcher
        .fetch_pr_files(&payload.owner, &payload.repo, payload.pr_number)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to fetch pull request files: {e}")))?;

    if pr_data.files.is_empty() {
        return Err(ApiError::bad_request("No files found in the pull request"));
    }

    let review = state
        .reviewer
        .generate_review(&pr_data.files)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to generate code review: {e}")))?;

    if review.is_empty() {
        return Err(ApiError::internal(
            "Failed to generate code review: Empty response",
        ));
    }

    let comment = format_comment(&pr_data.pr.author, &review)
        .map_err(|e| ApiError::internal(format!("Failed to format comment: {e}")))?;

    Ok(Json(json!({ "success": true, "comment": comment })))
}

async fn post_comment(
    State(state): State<AppState>,
    Json(payload): Json<RequestTestsPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let comment = match payload.comment.as_deref() {
        Some(text) if !text.trim().is_empty() => text,
        _ => return Err(ApiError::bad_request("Comment text is required")),
    };

    let posted = state
        .poster
        .post_comment(&payload.owner, &payload.repo, payload.pr_number, comment)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to post comment: {e}")))?;

    Ok(Json(json!({ "success": true, "comment_url": posted.html_url })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::{CannedReviewGenerator, ReviewGenerator};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request};
    use gh_radar_cache::TtlCache;
    use gh_radar_client::{
        ChangedFile, ClientError, GitHubClient, PostedComment, PullRequestDetail, PullRequestFile,
        PullRequestItem, RepositoryRef,
    };
    use gh_radar_core::{
        CommentPoster, ContentFetcher, FanoutLimits, PullRequestAggregator, RepoDiscovery,
    };
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tower::ServiceExt;

    /// Scriptable client covering the slices each endpoint touches.
    #[derive(Default)]
    struct StubClient {
        repos: Vec<RepositoryRef>,
        pulls: Vec<PullRequestItem>,
        detail: Option<PullRequestDetail>,
        files: Vec<PullRequestFile>,
        contents: HashMap<String, String>,
        fail_discovery: bool,
        post_failure: Option<StatusCode>,
    }

    fn upstream(operation: &str, status: StatusCode) -> ClientError {
        ClientError::Upstream {
            operation: operation.to_string(),
            status,
            message: "Not Found".to_string(),
        }
    }

    #[async_trait]
    impl GitHubClient for StubClient {
        async fn list_personal_repos(&self) -> Result<Vec<RepositoryRef>, ClientError> {
            if self.fail_discovery {
                return Err(upstream(
                    "list personal repositories",
                    StatusCode::INTERNAL_SERVER_ERROR,
                ));
            }
            Ok(self.repos.clone())
        }

        async fn list_organizations(&self) -> Result<Vec<String>, ClientError> {
            Ok(vec![])
        }

        async fn list_org_repos(&self, _org: &str) -> Result<Vec<RepositoryRef>, ClientError> {
            Ok(vec![])
        }

        async fn list_open_pulls(
            &self,
            _owner: &str,
            _repo: &str,
        ) -> Result<Vec<PullRequestItem>, ClientError> {
            Ok(self.pulls.clone())
        }

        async fn fetch_pull_request(
            &self,
            _owner: &str,
            _repo: &str,
            _number: u64,
        ) -> Result<PullRequestDetail, ClientError> {
            self.detail
                .clone()
                .ok_or_else(|| upstream("fetch pull request", StatusCode::NOT_FOUND))
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
                .ok_or_else(|| upstream("fetch file content", StatusCode::NOT_FOUND))
        }

        async fn post_issue_comment(
            &self,
            owner: &str,
            repo: &str,
            number: u64,
            _body: &str,
        ) -> Result<PostedComment, ClientError> {
            if let Some(status) = self.post_failure {
                return Err(upstream("post comment", status));
            }
            Ok(PostedComment {
                html_url: format!(
                    "https://github.com/{owner}/{repo}/pull/{number}#issuecomment-1"
                ),
            })
        }
    }

    struct FailingReviewer;

    #[async_trait]
    impl ReviewGenerator for FailingReviewer {
        async fn generate_review(&self, _files: &[ChangedFile]) -> anyhow::Result<String> {
            anyhow::bail!("model unavailable")
        }
    }

    fn state_with(stub: StubClient, reviewer: Arc<dyn ReviewGenerator>) -> AppState {
        let client: Arc<dyn GitHubClient> = Arc::new(stub);
        let cache = Arc::new(Mutex::new(TtlCache::new(Duration::from_secs(60))));
        let limits = FanoutLimits::default();
        let discovery = Arc::new(RepoDiscovery::new(Arc::clone(&client), cache, limits));
        AppState {
            aggregator: Arc::new(PullRequestAggregator::new(
                Arc::clone(&client),
                discovery,
                limits,
            )),
            fetcher: Arc::new(ContentFetcher::new(Arc::clone(&client), limits)),
            poster: Arc::new(CommentPoster::new(client)),
            reviewer,
        }
    }

    fn reviewable_stub() -> StubClient {
        StubClient {
            detail: Some(PullRequestDetail {
                number: 42,
                html_url: "https://github.com/me/a/pull/42".to_string(),
                title: "a change".to_string(),
                body: None,
                author: "octocat".to_string(),
                head_sha: "abc123".to_string(),
            }),
            files: vec![PullRequestFile {
                filename: "src/lib.rs".to_string(),
                status: "modified".to_string(),
            }],
            contents: HashMap::from([("src/lib.rs".to_string(), "pub fn radar() {}".to_string())]),
            ..StubClient::default()
        }
    }

    async fn send_json(
        state: AppState,
        method: &str,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    async fn get_json(state: AppState, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let state = state_with(StubClient::default(), Arc::new(CannedReviewGenerator));
        let (status, json) = get_json(state, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "gh-pr-radar");
    }

    #[tokio::test]
    async fn test_list_pull_requests() {
        let stub = StubClient {
            repos: vec![RepositoryRef {
                name: "a".to_string(),
                full_name: "me/a".to_string(),
                organization_url: None,
            }],
            pulls: vec![PullRequestItem {
                id: 1,
                number: 10,
                title: "one".to_string(),
                html_url: "https://github.com/me/a/pull/10".to_string(),
                author: "octocat".to_string(),
            }],
            ..StubClient::default()
        };
        let state = state_with(stub, Arc::new(CannedReviewGenerator));

        let (status, json) = get_json(state, "/api/pull-requests").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["author_login"], "octocat");
        assert_eq!(json[0]["has_tests"], serde_json::Value::Null);
        assert_eq!(json[0]["repository"]["full_name"], "me/a");
    }

    #[tokio::test]
    async fn test_list_pull_requests_discovery_failure_is_500() {
        let stub = StubClient {
            fail_discovery: true,
            ..StubClient::default()
        };
        let state = state_with(stub, Arc::new(CannedReviewGenerator));

        let (status, json) = get_json(state, "/api/pull-requests").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["detail"].as_str().unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_request_tests_returns_formatted_comment() {
        let state = state_with(reviewable_stub(), Arc::new(CannedReviewGenerator));

        let (status, json) = send_json(
            state,
            "POST",
            "/api/request-tests",
            json!({ "owner": "me", "repo": "a", "prNumber": 42 }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert!(json["comment"].as_str().unwrap().contains("@octocat"));
    }

    #[tokio::test]
    async fn test_request_tests_with_no_files_is_400() {
        let mut stub = reviewable_stub();
        stub.files = vec![PullRequestFile {
            filename: "gone.rs".to_string(),
            status: "removed".to_string(),
        }];
        let state = state_with(stub, Arc::new(CannedReviewGenerator));

        let (status, json) = send_json(
            state,
            "POST",
            "/api/request-tests",
            json!({ "owner": "me", "repo": "a", "prNumber": 42 }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "No files found in the pull request");
    }

    #[tokio::test]
    async fn test_request_tests_review_failure_is_500() {
        let state = state_with(reviewable_stub(), Arc::new(FailingReviewer));

        let (status, json) = send_json(
            state,
            "POST",
            "/api/request-tests",
            json!({ "owner": "me", "repo": "a", "prNumber": 42 }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let detail = json["detail"].as_str().unwrap();
        assert!(detail.contains("Failed to generate code review"));
        assert!(detail.contains("model unavailable"));
    }

    #[tokio::test]
    async fn test_post_comment_requires_comment_text() {
        let state = state_with(StubClient::default(), Arc::new(CannedReviewGenerator));

        let (status, json) = send_json(
            state,
            "POST",
            "/api/post-comment",
            json!({ "owner": "me", "repo": "a", "prNumber": 42 }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "Comment text is required");
    }

    #[tokio::test]
    async fn test_post_comment_success() {
        let state = state_with(StubClient::default(), Arc::new(CannedReviewGenerator));

        let (status, json) = send_json(
            state,
            "POST",
            "/api/post-comment",
            json!({ "owner": "me", "repo": "a", "prNumber": 42, "comment": "LGTM" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(
            json["comment_url"],
            "https://github.com/me/a/pull/42#issuecomment-1"
        );
    }

    #[tokio::test]
    async fn test_post_comment_upstream_failure_carries_message() {
        let stub = StubClient {
            post_failure: Some(StatusCode::NOT_FOUND),
            ..StubClient::default()
        };
        let state = state_with(stub, Arc::new(CannedReviewGenerator));

        let (status, json) = send_json(
            state,
            "POST",
            "/api/post-comment",
            json!({ "owner": "me", "repo": "a", "prNumber": 42, "comment": "LGTM" }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let detail = json["detail"].as_str().unwrap();
        assert!(detail.contains("Failed to post comment"));
        assert!(detail.contains("Not Found"));
    }
}
