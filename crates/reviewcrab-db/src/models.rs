use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Persisted PR review record
///
/// `review_feedback` and `expectations_applied` hold the JSON produced by
/// the analyzer; callers deserialize them when a structured view is needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrReview {
    pub id: i64,
    pub pr_number: i64,
    pub repo_full_name: String,
    pub branch_name: String,
    pub branch_type: String,
    pub pr_title: String,
    pub pr_author: String,
    pub review_feedback: String,
    pub review_summary: String,
    pub expectations_applied: String,
    pub status: String,
    pub instructor_notes: Option<String>,
    pub pr_url: String,
    pub commit_sha: String,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub posted_at: Option<DateTime<Utc>>,
}

/// Raw review model from database (with string timestamps)
#[derive(Debug, Clone, FromRow)]
pub(crate) struct PrReviewRaw {
    pub id: i64,
    pub pr_number: i64,
    pub repo_full_name: String,
    pub branch_name: String,
    pub branch_type: String,
    pub pr_title: String,
    pub pr_author: String,
    pub review_feedback: String,
    pub review_summary: String,
    pub expectations_applied: String,
    pub status: String,
    pub instructor_notes: Option<String>,
    pub pr_url: String,
    pub commit_sha: String,
    pub created_at: String,
    pub reviewed_at: Option<String>,
    pub posted_at: Option<String>,
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .unwrap()
        .with_timezone(&Utc)
}

impl From<PrReviewRaw> for PrReview {
    fn from(raw: PrReviewRaw) -> Self {
        Self {
            id: raw.id,
            pr_number: raw.pr_number,
            repo_full_name: raw.repo_full_name,
            branch_name: raw.branch_name,
            branch_type: raw.branch_type,
            pr_title: raw.pr_title,
            pr_author: raw.pr_author,
            review_feedback: raw.review_feedback,
            review_summary: raw.review_summary,
            expectations_applied: raw.expectations_applied,
            status: raw.status,
            instructor_notes: raw.instructor_notes,
            pr_url: raw.pr_url,
            commit_sha: raw.commit_sha,
            created_at: parse_timestamp(&raw.created_at),
            reviewed_at: raw.reviewed_at.as_deref().map(parse_timestamp),
            posted_at: raw.posted_at.as_deref().map(parse_timestamp),
        }
    }
}

/// Fields for a new (or re-analyzed) review record
#[derive(Debug, Clone)]
pub struct NewReview {
    pub pr_number: i64,
    pub repo_full_name: String,
    pub branch_name: String,
    pub branch_type: String,
    pub pr_title: String,
    pub pr_author: String,
    pub review_feedback: String,
    pub review_summary: String,
    pub expectations_applied: String,
    pub pr_url: String,
    pub commit_sha: String,
}

/// Branch rule database model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchRuleRow {
    pub id: i64,
    pub branch_pattern: String,
    pub description: String,
    pub expectations: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Raw branch rule model from database (with string timestamps)
#[derive(Debug, Clone, FromRow)]
pub(crate) struct BranchRuleRowRaw {
    pub id: i64,
    pub branch_pattern: String,
    pub description: String,
    pub expectations: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<BranchRuleRowRaw> for BranchRuleRow {
    fn from(raw: BranchRuleRowRaw) -> Self {
        Self {
            id: raw.id,
            branch_pattern: raw.branch_pattern,
            description: raw.description,
            expectations: raw.expectations,
            created_at: parse_timestamp(&raw.created_at),
            updated_at: raw.updated_at.as_deref().map(parse_timestamp),
        }
    }
}

/// Aggregated review counts for the stats endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewStats {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}
