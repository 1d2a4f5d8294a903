//! gh-pr-radar server
//!
//! Wires the aggregation core to its HTTP surface: resolves the GitHub token
//! (failing fast before binding), builds one shared octocrab session wrapped
//! in the retry decorator, and serves the API.

mod api;
mod review;
mod state;

use anyhow::Context;
use gh_radar_cache::TtlCache;
use gh_radar_client::{octocrab, GitHubClient, OctocrabClient, RetryPolicy, RetryingClient};
use gh_radar_config::AppConfig;
use gh_radar_core::{
    CommentPoster, ContentFetcher, FanoutLimits, PullRequestAggregator, RepoDiscovery,
};
use review::CannedReviewGenerator;
use state::AppState;
use std::sync::{Arc, Mutex};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = AppConfig::load();
    let token = gh_radar_config::resolve_token()?;

    let octocrab = octocrab::Octocrab::builder()
        .personal_token(token)
        .build()
        .context("failed to build GitHub client")?;

    let policy = RetryPolicy {
        max_attempts: config.retry_max_attempts,
        initial_backoff: config.retry_initial_backoff(),
        ..RetryPolicy::default()
    };
    let client: Arc<dyn GitHubClient> = Arc::new(RetryingClient::new(
        OctocrabClient::new(Arc::new(octocrab)),
        policy,
    ));

    let cache = Arc::new(Mutex::new(TtlCache::new(config.cache_ttl())));
    let limits = FanoutLimits {
        concurrency: config.fanout_limit,
        request_timeout: config.request_timeout(),
    };

    let discovery = Arc::new(RepoDiscovery::new(Arc::clone(&client), cache, limits));
    let app_state = AppState {
        aggregator: Arc::new(PullRequestAggregator::new(
            Arc::clone(&client),
            discovery,
            limits,
        )),
        fetcher: Arc::new(ContentFetcher::new(Arc::clone(&client), limits)),
        poster: Arc::new(CommentPoster::new(client)),
        reviewer: Arc::new(CannedReviewGenerator),
    };

    let app = api::router(app_state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    log::info!("gh-pr-radar listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
