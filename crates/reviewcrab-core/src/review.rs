use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Lifecycle status of a persisted PR review
///
/// `Pending` reviews await an instructor decision. `Posted` and `Rejected`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Awaiting instructor decision
    Pending,
    /// Approved and posted to the platform
    Posted,
    /// Rejected by the instructor, nothing posted
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Posted => "posted",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> CoreResult<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "posted" => Ok(Self::Posted),
            "rejected" => Ok(Self::Rejected),
            other => Err(CoreError::InvalidStatus(other.to_string())),
        }
    }

    /// Check whether an instructor decision can still be applied
    pub fn is_pending(&self) -> bool {
        *self == Self::Pending
    }
}

/// An instructor decision on a pending review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn parse(s: &str) -> CoreResult<Self> {
        match s {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            other => Err(CoreError::InvalidDecision(other.to_string())),
        }
    }
}

/// Compute the status a decision transitions a review into
///
/// Only `pending` reviews accept decisions; anything else is an invalid
/// state and leaves the record unchanged. The caller is responsible for
/// performing the external comment post before committing an `Approve`
/// transition: a failed post means the review stays `pending`.
pub fn apply_decision(current: ReviewStatus, decision: Decision) -> CoreResult<ReviewStatus> {
    if !current.is_pending() {
        return Err(CoreError::NotPending(current.as_str().to_string()));
    }

    Ok(match decision {
        Decision::Approve => ReviewStatus::Posted,
        Decision::Reject => ReviewStatus::Rejected,
    })
}

/// Build the comment body posted on approval
///
/// The stored summary goes out verbatim; instructor notes, when present,
/// are appended after a separator.
pub fn comment_body(summary: &str, notes: Option<&str>) -> String {
    match notes {
        Some(notes) if !notes.is_empty() => {
            format!("{}\n\n---\n**Instructor Notes:**\n{}", summary, notes)
        }
        _ => summary.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            ReviewStatus::Pending,
            ReviewStatus::Posted,
            ReviewStatus::Rejected,
        ] {
            assert_eq!(ReviewStatus::parse(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_parse_unknown_status() {
        let err = ReviewStatus::parse("approved").unwrap_err();
        assert_eq!(err, CoreError::InvalidStatus("approved".to_string()));
    }

    #[test]
    fn test_parse_decision() {
        assert_eq!(Decision::parse("approve").unwrap(), Decision::Approve);
        assert_eq!(Decision::parse("reject").unwrap(), Decision::Reject);

        let err = Decision::parse("maybe").unwrap_err();
        assert_eq!(err, CoreError::InvalidDecision("maybe".to_string()));
    }

    #[test]
    fn test_approve_pending() {
        assert_eq!(
            apply_decision(ReviewStatus::Pending, Decision::Approve).unwrap(),
            ReviewStatus::Posted
        );
    }

    #[test]
    fn test_reject_pending() {
        assert_eq!(
            apply_decision(ReviewStatus::Pending, Decision::Reject).unwrap(),
            ReviewStatus::Rejected
        );
    }

    #[test]
    fn test_decisions_rejected_on_terminal_states() {
        for status in [ReviewStatus::Posted, ReviewStatus::Rejected] {
            for decision in [Decision::Approve, Decision::Reject] {
                let err = apply_decision(status, decision).unwrap_err();
                assert_eq!(err, CoreError::NotPending(status.as_str().to_string()));
            }
        }
    }

    #[test]
    fn test_comment_body_without_notes() {
        assert_eq!(comment_body("summary text", None), "summary text");
        assert_eq!(comment_body("summary text", Some("")), "summary text");
    }

    #[test]
    fn test_comment_body_appends_notes_after_separator() {
        let body = comment_body("summary text", Some("Nice work overall."));
        assert_eq!(
            body,
            "summary text\n\n---\n**Instructor Notes:**\nNice work overall."
        );
    }
}
