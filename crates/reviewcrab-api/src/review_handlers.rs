use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use reviewcrab_core::{Decision, ReviewStatus, apply_decision, review::comment_body};
use reviewcrab_db::{
    PrReview, ReviewStats,
    branch_rules::list_rule_rows,
    reviews::{self, record_decision, review_stats},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

/// Review listing query parameters
#[derive(Debug, Deserialize)]
pub struct ReviewsQuery {
    #[serde(default)]
    status: Option<String>,
}

/// Instructor decision request
#[derive(Debug, Deserialize)]
pub struct DecideRequest {
    pub decision: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Review response with feedback and expectations as structured JSON
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: i64,
    pub pr_number: i64,
    pub repo_full_name: String,
    pub branch_name: String,
    pub branch_type: String,
    pub pr_title: String,
    pub pr_author: String,
    pub review_feedback: Value,
    pub review_summary: String,
    pub expectations_applied: Value,
    pub status: String,
    pub instructor_notes: Option<String>,
    pub pr_url: String,
    pub commit_sha: String,
    pub created_at: String,
    pub reviewed_at: Option<String>,
    pub posted_at: Option<String>,
}

impl ReviewResponse {
    fn from_review(review: PrReview) -> ApiResult<Self> {
        let review_feedback: Value = serde_json::from_str(&review.review_feedback)
            .map_err(|e| ApiError::Internal(format!("Corrupt review feedback: {}", e)))?;
        let expectations_applied: Value = serde_json::from_str(&review.expectations_applied)
            .map_err(|e| ApiError::Internal(format!("Corrupt expectations: {}", e)))?;

        Ok(Self {
            id: review.id,
            pr_number: review.pr_number,
            repo_full_name: review.repo_full_name,
            branch_name: review.branch_name,
            branch_type: review.branch_type,
            pr_title: review.pr_title,
            pr_author: review.pr_author,
            review_feedback,
            review_summary: review.review_summary,
            expectations_applied,
            status: review.status,
            instructor_notes: review.instructor_notes,
            pr_url: review.pr_url,
            commit_sha: review.commit_sha,
            created_at: review.created_at.to_rfc3339(),
            reviewed_at: review.reviewed_at.map(|t| t.to_rfc3339()),
            posted_at: review.posted_at.map(|t| t.to_rfc3339()),
        })
    }
}

/// Branch rule response
#[derive(Debug, Serialize)]
pub struct RuleResponse {
    pub id: i64,
    pub branch_pattern: String,
    pub description: String,
    pub expectations: Value,
    pub created_at: String,
}

/// GET /api/reviews
/// List reviews, newest first, optionally filtered by status
pub async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewsQuery>,
) -> ApiResult<Json<Vec<ReviewResponse>>> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(
            ReviewStatus::parse(raw)
                .map_err(|_| ApiError::InvalidPayload(format!("Invalid status: {}", raw)))?,
        ),
        None => None,
    };

    let reviews = reviews::list_reviews(&state.db_pool, status.map(|s| s.as_str())).await?;

    reviews
        .into_iter()
        .map(ReviewResponse::from_review)
        .collect::<ApiResult<Vec<_>>>()
        .map(Json)
}

/// GET /api/reviews/{id}
pub async fn get_review(
    State(state): State<AppState>,
    Path(review_id): Path<i64>,
) -> ApiResult<Json<ReviewResponse>> {
    let review = reviews::get_review(&state.db_pool, review_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Review not found: {}", review_id)))?;

    ReviewResponse::from_review(review).map(Json)
}

/// POST /api/reviews/{id}/decide
/// Instructor approves or rejects a pending review
///
/// Approval posts the stored summary (plus optional notes) to the PR and
/// only then transitions the review to posted; a failed post leaves the
/// review pending. Rejection makes no external call.
pub async fn decide_review(
    State(state): State<AppState>,
    Path(review_id): Path<i64>,
    Json(request): Json<DecideRequest>,
) -> ApiResult<Json<ReviewResponse>> {
    let review = reviews::get_review(&state.db_pool, review_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Review not found: {}", review_id)))?;

    let status = ReviewStatus::parse(&review.status)
        .map_err(|e| ApiError::Internal(format!("Corrupt review status: {}", e)))?;

    if !status.is_pending() {
        return Err(ApiError::InvalidState {
            review_id,
            status: review.status,
        });
    }

    let decision = Decision::parse(&request.decision)
        .map_err(|_| ApiError::InvalidDecision(request.decision.clone()))?;

    let next = apply_decision(status, decision).map_err(|_| ApiError::InvalidState {
        review_id,
        status: review.status.clone(),
    })?;

    let now = Utc::now();
    let notes = request.notes.as_deref();

    let updated = match decision {
        Decision::Approve => {
            let body = comment_body(&review.review_summary, notes);

            state
                .github_client
                .post_review_comment(
                    &review.repo_full_name,
                    review.pr_number as u64,
                    &body,
                )
                .await
                .map_err(|e| {
                    warn!(
                        "Posting review {} to {} PR #{} failed: {}",
                        review_id, review.repo_full_name, review.pr_number, e
                    );
                    ApiError::PostFailed(e.to_string())
                })?;

            record_decision(&state.db_pool, review_id, next, notes, now, Some(now)).await?
        }
        Decision::Reject => {
            record_decision(&state.db_pool, review_id, next, notes, now, None).await?
        }
    };

    info!(
        "Review {} decided: {} -> {}",
        review_id, request.decision, updated.status
    );

    ReviewResponse::from_review(updated).map(Json)
}

/// GET /api/reviews/stats/summary
pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<ReviewStats>> {
    let stats = review_stats(&state.db_pool).await?;
    Ok(Json(stats))
}

/// GET /api/rules
/// List stored branch rules in insertion order
pub async fn list_branch_rules(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RuleResponse>>> {
    let rows = list_rule_rows(&state.db_pool).await?;

    let mut rules = Vec::with_capacity(rows.len());
    for row in rows {
        let expectations: Value = serde_json::from_str(&row.expectations)
            .map_err(|e| ApiError::Internal(format!("Corrupt rule expectations: {}", e)))?;
        rules.push(RuleResponse {
            id: row.id,
            branch_pattern: row.branch_pattern,
            description: row.description,
            expectations,
            created_at: row.created_at.to_rfc3339(),
        });
    }

    Ok(Json(rules))
}
