pub mod branch_rules;
pub mod error;
pub mod models;
pub mod pool;
pub mod reviews;

// Re-export commonly used types
pub use error::{DbError, DbResult};
pub use models::{BranchRuleRow, NewReview, PrReview, ReviewStats};
pub use pool::{create_pool, run_migrations};
