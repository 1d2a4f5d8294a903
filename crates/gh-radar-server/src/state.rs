//! Shared handler state

use crate::review::ReviewGenerator;
use gh_radar_core::{CommentPoster, ContentFetcher, PullRequestAggregator};
use std::sync::Arc;

/// Everything the handlers need, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<PullRequestAggregator>,
    pub fetcher: Arc<ContentFetcher>,
    pub poster: Arc<CommentPoster>,
    pub reviewer: Arc<dyn ReviewGenerator>,
}
