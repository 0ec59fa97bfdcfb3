use crate::error::{DbError, DbResult};
use crate::models::{NewReview, PrReview, PrReviewRaw, ReviewStats};
use chrono::{DateTime, Utc};
use reviewcrab_core::ReviewStatus;
use sqlx::{Any, Pool};

const REVIEW_COLUMNS: &str = "id, pr_number, repo_full_name, branch_name, branch_type, pr_title, \
     pr_author, review_feedback, review_summary, expectations_applied, status, instructor_notes, \
     pr_url, commit_sha, created_at, reviewed_at, posted_at";

/// Find a review by its natural key (repo, PR number, commit SHA)
pub async fn find_review_by_key(
    pool: &Pool<Any>,
    repo_full_name: &str,
    pr_number: i64,
    commit_sha: &str,
) -> DbResult<Option<PrReview>> {
    let review = sqlx::query_as::<_, PrReviewRaw>(&format!(
        "SELECT {} FROM pr_reviews WHERE repo_full_name = ? AND pr_number = ? AND commit_sha = ?",
        REVIEW_COLUMNS
    ))
    .bind(repo_full_name)
    .bind(pr_number)
    .bind(commit_sha)
    .fetch_optional(pool)
    .await?
    .map(|raw| raw.into());

    Ok(review)
}

/// Get a review by id
pub async fn get_review(pool: &Pool<Any>, id: i64) -> DbResult<Option<PrReview>> {
    let review = sqlx::query_as::<_, PrReviewRaw>(&format!(
        "SELECT {} FROM pr_reviews WHERE id = ?",
        REVIEW_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .map(|raw| raw.into());

    Ok(review)
}

/// Insert or refresh the review for a (repo, PR, commit) key
///
/// A webhook redelivery for a commit that already has a record overwrites
/// the feedback, summary and applied expectations and resets the status to
/// pending. The existence check followed by insert leaves a narrow race
/// window under concurrent deliveries; the UNIQUE key keeps duplicates out
/// and the loser of the race surfaces a constraint error.
pub async fn upsert_review(pool: &Pool<Any>, new: &NewReview) -> DbResult<PrReview> {
    let now_str = Utc::now().to_rfc3339();

    let existing =
        find_review_by_key(pool, &new.repo_full_name, new.pr_number, &new.commit_sha).await?;

    if let Some(existing) = existing {
        sqlx::query(
            "UPDATE pr_reviews
             SET review_feedback = ?, review_summary = ?, expectations_applied = ?, status = ?
             WHERE id = ?",
        )
        .bind(&new.review_feedback)
        .bind(&new.review_summary)
        .bind(&new.expectations_applied)
        .bind(ReviewStatus::Pending.as_str())
        .bind(existing.id)
        .execute(pool)
        .await?;

        return get_review(pool, existing.id)
            .await?
            .ok_or(DbError::ReviewNotFound(existing.id));
    }

    sqlx::query(
        "INSERT INTO pr_reviews (pr_number, repo_full_name, branch_name, branch_type, pr_title, \
         pr_author, review_feedback, review_summary, expectations_applied, status, pr_url, \
         commit_sha, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(new.pr_number)
    .bind(&new.repo_full_name)
    .bind(&new.branch_name)
    .bind(&new.branch_type)
    .bind(&new.pr_title)
    .bind(&new.pr_author)
    .bind(&new.review_feedback)
    .bind(&new.review_summary)
    .bind(&new.expectations_applied)
    .bind(ReviewStatus::Pending.as_str())
    .bind(&new.pr_url)
    .bind(&new.commit_sha)
    .bind(&now_str)
    .execute(pool)
    .await?;

    find_review_by_key(pool, &new.repo_full_name, new.pr_number, &new.commit_sha)
        .await?
        .ok_or(DbError::SqlxError(sqlx::Error::RowNotFound))
}

/// List reviews, newest first, optionally filtered by status
pub async fn list_reviews(pool: &Pool<Any>, status: Option<&str>) -> DbResult<Vec<PrReview>> {
    let rows = match status {
        Some(status) => {
            sqlx::query_as::<_, PrReviewRaw>(&format!(
                "SELECT {} FROM pr_reviews WHERE status = ? ORDER BY created_at DESC, id DESC",
                REVIEW_COLUMNS
            ))
            .bind(status)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, PrReviewRaw>(&format!(
                "SELECT {} FROM pr_reviews ORDER BY created_at DESC, id DESC",
                REVIEW_COLUMNS
            ))
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows.into_iter().map(|raw| raw.into()).collect())
}

/// Record an instructor decision on a review
///
/// Sets the new status, notes and decision timestamps. `posted_at` is set
/// only for approvals that were actually posted.
pub async fn record_decision(
    pool: &Pool<Any>,
    id: i64,
    status: ReviewStatus,
    notes: Option<&str>,
    reviewed_at: DateTime<Utc>,
    posted_at: Option<DateTime<Utc>>,
) -> DbResult<PrReview> {
    let result = sqlx::query(
        "UPDATE pr_reviews SET status = ?, instructor_notes = ?, reviewed_at = ?, posted_at = ?
         WHERE id = ?",
    )
    .bind(status.as_str())
    .bind(notes)
    .bind(reviewed_at.to_rfc3339())
    .bind(posted_at.map(|t| t.to_rfc3339()))
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::ReviewNotFound(id));
    }

    get_review(pool, id).await?.ok_or(DbError::ReviewNotFound(id))
}

/// Aggregate review counts by status
pub async fn review_stats(pool: &Pool<Any>) -> DbResult<ReviewStats> {
    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pr_reviews")
        .fetch_one(pool)
        .await?;

    Ok(ReviewStats {
        total: total.0,
        pending: count_by_status(pool, ReviewStatus::Pending).await?,
        approved: count_by_status(pool, ReviewStatus::Posted).await?,
        rejected: count_by_status(pool, ReviewStatus::Rejected).await?,
    })
}

async fn count_by_status(pool: &Pool<Any>, status: ReviewStatus) -> DbResult<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pr_reviews WHERE status = ?")
        .bind(status.as_str())
        .fetch_one(pool)
        .await?;

    Ok(count.0)
}
