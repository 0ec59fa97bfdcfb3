use axum::extract::FromRef;
use reviewcrab_github::{GithubApiClient, WebhookSecret};
use sqlx::{Any, Pool};
use std::sync::Arc;

/// Application state for Axum dependency injection
///
/// The DI root holding the shared resources handlers need: the database
/// pool, the GitHub API client and the webhook secret for HMAC
/// verification.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db_pool: Pool<Any>,

    /// GitHub API client for fetching PR snapshots and posting comments
    pub github_client: Arc<GithubApiClient>,

    /// Webhook secret for HMAC verification
    pub webhook_secret: WebhookSecret,
}

impl AppState {
    pub fn new(
        db_pool: Pool<Any>,
        github_client: GithubApiClient,
        webhook_secret: WebhookSecret,
    ) -> Self {
        Self {
            db_pool,
            github_client: Arc::new(github_client),
            webhook_secret,
        }
    }
}

/// Allow the VerifiedWebhook extractor to pull the secret out of AppState
impl FromRef<AppState> for WebhookSecret {
    fn from_ref(state: &AppState) -> Self {
        state.webhook_secret.clone()
    }
}
