use serde::{Deserialize, Serialize};

/// GitHub user information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub login: String,
}

/// GitHub repository information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub owner: User,
}

/// Head or base ref of a pull request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub sha: String,
}

/// Pull request information from a webhook payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: i64,
    pub title: String,
    pub body: Option<String>,
    pub user: User,
    pub head: GitRef,
    pub html_url: String,
}

/// Pull request webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestEvent {
    pub action: String,
    pub number: i64,
    pub pull_request: PullRequest,
    pub repository: Repository,
    pub sender: User,
}

impl PullRequestEvent {
    /// Check whether this action triggers a review
    ///
    /// Only `opened` and `synchronize` (new commits pushed) do; everything
    /// else is acknowledged and ignored.
    pub fn triggers_review(&self) -> bool {
        matches!(self.action.as_str(), "opened" | "synchronize")
    }
}
