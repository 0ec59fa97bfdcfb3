use crate::error::{GithubError, GithubResult};
use octocrab::Octocrab;
use octocrab::models::CommentId;
use octocrab::params::pulls::MergeMethod;
use reviewcrab_core::{ChangedFile, PullRequestSnapshot};

/// GitHub API client for pull request operations
pub struct GithubApiClient {
    client: Octocrab,
}

/// Mergeability report for a pull request
///
/// Extension point for approval-with-merge flows; the decision endpoint
/// does not consult it.
#[derive(Debug, Clone)]
pub struct PrStatus {
    pub mergeable: bool,
    pub merged: bool,
    pub state: String,
    pub mergeable_state: String,
}

/// Outcome of a merge attempt
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub merged: bool,
    pub sha: Option<String>,
}

impl GithubApiClient {
    /// Create new GitHub API client with authentication token
    pub fn new(token: String) -> GithubResult<Self> {
        let client = Octocrab::builder()
            .personal_token(token)
            .build()
            .map_err(|e| {
                GithubError::ApiError(format!("Failed to create octocrab client: {}", e))
            })?;

        Ok(Self { client })
    }

    /// Create client from existing octocrab instance
    pub fn from_octocrab(client: Octocrab) -> Self {
        Self { client }
    }

    /// Fetch the read-only snapshot of a PR the analyzer works from
    ///
    /// Combines the PR metadata with its changed-file list. Counter fields
    /// missing from the API response degrade to zero / the file-list
    /// length rather than failing the fetch.
    pub async fn fetch_pr_snapshot(
        &self,
        repo_full_name: &str,
        pr_number: u64,
    ) -> GithubResult<PullRequestSnapshot> {
        let (owner, repo) = split_repo(repo_full_name)?;

        let pr = self
            .client
            .pulls(owner, repo)
            .get(pr_number)
            .await
            .map_err(|e| {
                GithubError::ApiError(format!("Failed to fetch PR #{}: {}", pr_number, e))
            })?;

        let files = self
            .client
            .pulls(owner, repo)
            .list_files(pr_number)
            .await
            .map_err(|e| {
                GithubError::ApiError(format!(
                    "Failed to list files for PR #{}: {}",
                    pr_number, e
                ))
            })?;

        let files: Vec<ChangedFile> = files
            .items
            .into_iter()
            .map(|file| ChangedFile {
                filename: file.filename,
                patch: file.patch,
            })
            .collect();

        Ok(PullRequestSnapshot {
            title: pr.title.unwrap_or_default(),
            body: pr.body,
            changed_files: pr
                .changed_files
                .map(|n| n as usize)
                .unwrap_or(files.len()),
            additions: pr.additions.unwrap_or(0),
            deletions: pr.deletions.unwrap_or(0),
            files,
        })
    }

    /// Post a review comment on a PR
    ///
    /// Posted as an issue comment, which is what PR conversation comments
    /// are in the GitHub API.
    pub async fn post_review_comment(
        &self,
        repo_full_name: &str,
        pr_number: u64,
        body: &str,
    ) -> GithubResult<CommentId> {
        let (owner, repo) = split_repo(repo_full_name)?;

        let comment = self
            .client
            .issues(owner, repo)
            .create_comment(pr_number, body)
            .await
            .map_err(|e| {
                GithubError::ApiError(format!(
                    "Failed to post review comment on #{}: {}",
                    pr_number, e
                ))
            })?;

        Ok(comment.id)
    }

    /// Check PR state and mergeability
    pub async fn check_pr_status(
        &self,
        repo_full_name: &str,
        pr_number: u64,
    ) -> GithubResult<PrStatus> {
        let (owner, repo) = split_repo(repo_full_name)?;

        let pr = self
            .client
            .pulls(owner, repo)
            .get(pr_number)
            .await
            .map_err(|e| {
                GithubError::ApiError(format!(
                    "Failed to check status of PR #{}: {}",
                    pr_number, e
                ))
            })?;

        Ok(PrStatus {
            mergeable: pr.mergeable.unwrap_or(false),
            merged: pr.merged_at.is_some(),
            state: pr
                .state
                .map(|s| format!("{:?}", s).to_lowercase())
                .unwrap_or_else(|| "unknown".to_string()),
            mergeable_state: pr
                .mergeable_state
                .map(|s| format!("{:?}", s).to_lowercase())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    /// Merge a pull request
    pub async fn merge_pull_request(
        &self,
        repo_full_name: &str,
        pr_number: u64,
        commit_message: Option<&str>,
        method: MergeMethod,
    ) -> GithubResult<MergeOutcome> {
        let (owner, repo) = split_repo(repo_full_name)?;

        let pulls = self.client.pulls(owner, repo);
        let mut builder = pulls.merge(pr_number).method(method);
        if let Some(message) = commit_message {
            builder = builder.message(message);
        }

        let result = builder.send().await.map_err(|e| {
            GithubError::ApiError(format!("Failed to merge PR #{}: {}", pr_number, e))
        })?;

        Ok(MergeOutcome {
            merged: result.merged,
            sha: result.sha,
        })
    }
}

/// Split an `owner/repo` full name into its parts
fn split_repo(full_name: &str) -> GithubResult<(&str, &str)> {
    match full_name.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => Ok((owner, repo)),
        _ => Err(GithubError::InvalidRepoName(full_name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_api_client() {
        // Initialize rustls crypto provider for tests
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

        let result = GithubApiClient::new("test-token".to_string());
        assert!(result.is_ok());
    }

    #[test]
    fn test_split_repo() {
        assert_eq!(split_repo("octocat/hello").unwrap(), ("octocat", "hello"));
    }

    #[test]
    fn test_split_repo_invalid() {
        for name in ["octocat", "", "/hello", "octocat/"] {
            assert!(matches!(
                split_repo(name),
                Err(GithubError::InvalidRepoName(_))
            ));
        }
    }
}
