pub mod error;
pub mod health;
pub mod review_handlers;
pub mod state;
pub mod webhook_handler;

// Re-export commonly used types
pub use error::{ApiError, ApiResult};
pub use health::{health, root};
pub use review_handlers::{decide_review, get_review, list_branch_rules, list_reviews, stats};
pub use state::AppState;
pub use webhook_handler::handle_webhook;
