//! Comment posting

use gh_radar_client::{ClientError, GitHubClient, PostedComment};
use log::info;
use std::sync::Arc;

/// Posts review comments to pull requests.
pub struct CommentPoster {
    client: Arc<dyn GitHubClient>,
}

impl CommentPoster {
    pub fn new(client: Arc<dyn GitHubClient>) -> Self {
        Self { client }
    }

    /// Create one comment on the given pull request.
    ///
    /// No absorption here: an upstream failure propagates with its status and
    /// message so the caller can surface it.
    pub async fn post_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<PostedComment, ClientError> {
        let posted = self
            .client
            .post_issue_comment(owner, repo, number, body)
            .await?;

        info!("posted comment on {}/{}#{}: {}", owner, repo, number, posted.html_url);
        Ok(posted)
    }
}
