pub mod api;
pub mod error;
pub mod types;
pub mod webhook;

// Re-export commonly used types
pub use api::{GithubApiClient, MergeOutcome, PrStatus};
pub use error::{GithubError, GithubResult};
pub use types::{GitRef, PullRequest, PullRequestEvent, Repository, User};
pub use webhook::{VerifiedWebhook, WebhookSecret};
