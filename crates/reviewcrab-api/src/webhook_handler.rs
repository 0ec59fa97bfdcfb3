use crate::{
    error::ApiResult,
    state::AppState,
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use reviewcrab_core::{analyze, resolve_expectations};
use reviewcrab_db::{NewReview, branch_rules::list_rules, reviews::upsert_review};
use reviewcrab_github::{PullRequestEvent, VerifiedWebhook};
use serde_json::Value;
use tracing::info;

/// Webhook handler for GitHub events
///
/// 1. HMAC signature is verified by the VerifiedWebhook extractor.
/// 2. Non-PR events and actions other than opened/synchronize are
///    acknowledged and ignored.
/// 3. For review-triggering events: resolve branch expectations, fetch the
///    PR snapshot, analyze, and store a pending review for the instructor.
pub async fn handle_webhook(
    State(state): State<AppState>,
    VerifiedWebhook(body): VerifiedWebhook,
) -> ApiResult<impl IntoResponse> {
    let payload: Value = serde_json::from_slice(&body)?;

    if payload.get("pull_request").is_none() {
        info!("Received non-PR webhook event, ignoring");
        return Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Event ignored" })),
        ));
    }

    let event: PullRequestEvent = serde_json::from_slice(&body)?;

    if !event.triggers_review() {
        info!(action = %event.action, "PR action does not trigger a review, ignoring");
        return Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Action ignored" })),
        ));
    }

    let branch_type = process_pull_request(&state, &event).await?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "PR review created and pending instructor approval",
            "pr_number": event.pull_request.number,
            "branch_type": branch_type,
        })),
    ))
}

/// Run the review pipeline for an opened/synchronized PR
///
/// Returns the branch type the PR resolved to.
async fn process_pull_request(state: &AppState, event: &PullRequestEvent) -> ApiResult<String> {
    let pr = &event.pull_request;
    let repo_full_name = &event.repository.full_name;
    let branch_name = &pr.head.ref_name;

    info!(
        "Processing PR #{} ({}) on branch {} in {}",
        pr.number, event.action, branch_name, repo_full_name
    );

    // Resolve which expectations apply to this branch
    let rules = list_rules(&state.db_pool).await?;
    let expectations = resolve_expectations(&rules, branch_name);
    let branch_type = expectations.branch_type.clone();

    // Fetch the PR snapshot and run the analysis
    let snapshot = state
        .github_client
        .fetch_pr_snapshot(repo_full_name, pr.number as u64)
        .await?;
    let result = analyze(&snapshot, &expectations);

    info!(
        "Analyzed PR #{}: {} errors, {} warnings, {} feedback items",
        pr.number,
        result.error_count,
        result.warning_count,
        result.feedback.len()
    );

    let new = NewReview {
        pr_number: pr.number,
        repo_full_name: repo_full_name.clone(),
        branch_name: branch_name.clone(),
        branch_type: branch_type.clone(),
        pr_title: pr.title.clone(),
        pr_author: pr.user.login.clone(),
        review_feedback: serde_json::to_string(&result.feedback)?,
        review_summary: result.summary,
        expectations_applied: serde_json::to_string(&expectations)?,
        pr_url: pr.html_url.clone(),
        commit_sha: pr.head.sha.clone(),
    };

    let review = upsert_review(&state.db_pool, &new).await?;

    info!(
        "Stored pending review {} for PR #{} at {}",
        review.id, review.pr_number, review.commit_sha
    );

    Ok(branch_type)
}
