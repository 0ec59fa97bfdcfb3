pub mod analyzer;
pub mod error;
pub mod review;
pub mod rules;
pub mod summary;

// Re-export commonly used types
pub use analyzer::{
    Category, ChangedFile, FeedbackItem, PullRequestSnapshot, ReviewResult, Severity, analyze,
};
pub use error::{CoreError, CoreResult};
pub use review::{Decision, ReviewStatus, apply_decision};
pub use rules::{
    BranchRule, ExpectationSet, Expectations, branch_type_for, default_rules,
    resolve_expectations,
};
pub use summary::compile_summary;
