use serde::{Deserialize, Serialize};

use crate::rules::ExpectationSet;
use crate::summary::compile_summary;

/// Severity of a single feedback item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Category of a single feedback item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Description,
    Scope,
    Testing,
    Documentation,
    CodeQuality,
    ErrorHandling,
    BestPractices,
}

/// One discrete, severity-tagged observation about a PR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackItem {
    pub category: Category,
    pub severity: Severity,
    pub message: String,
    pub file_path: Option<String>,
}

impl FeedbackItem {
    fn new(category: Category, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            category,
            severity,
            message: message.into(),
            file_path: None,
        }
    }

    fn with_file(
        category: Category,
        severity: Severity,
        message: impl Into<String>,
        filename: &str,
    ) -> Self {
        Self {
            category,
            severity,
            message: message.into(),
            file_path: Some(filename.to_string()),
        }
    }
}

/// One changed file in a PR, with its unified-diff patch text when available
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    pub patch: Option<String>,
}

/// Read-only snapshot of a pull request, as provided by the platform client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestSnapshot {
    pub title: String,
    pub body: Option<String>,
    pub changed_files: usize,
    pub additions: u64,
    pub deletions: u64,
    pub files: Vec<ChangedFile>,
}

/// Outcome of analyzing a PR against an expectation set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewResult {
    pub feedback: Vec<FeedbackItem>,
    pub summary: String,
    pub error_count: usize,
    pub warning_count: usize,
}

/// Analyze a PR snapshot against branch expectations
///
/// Pure and deterministic: identical inputs produce identical feedback and
/// an identical summary string. Missing optional fields (no body, no patch
/// text) degrade to empty input and never fail the analysis.
pub fn analyze(snapshot: &PullRequestSnapshot, expectations: &ExpectationSet) -> ReviewResult {
    let feedback = collect_feedback(snapshot, expectations);

    let error_count = feedback
        .iter()
        .filter(|item| item.severity == Severity::Error)
        .count();
    let warning_count = feedback
        .iter()
        .filter(|item| item.severity == Severity::Warning)
        .count();

    let summary = compile_summary(snapshot, expectations, &feedback, error_count, warning_count);

    ReviewResult {
        feedback,
        summary,
        error_count,
        warning_count,
    }
}

/// Run the deterministic checks in their fixed order
///
/// The order determines summary grouping and is part of the output
/// contract: description, scope, per-file patch scan, testing requirement,
/// documentation requirement, checklist echo.
fn collect_feedback(
    snapshot: &PullRequestSnapshot,
    expectations: &ExpectationSet,
) -> Vec<FeedbackItem> {
    let mut feedback = Vec::new();
    let rules = &expectations.expectations;

    // 1. Description length, in characters
    let description_length = snapshot.body.as_deref().unwrap_or("").chars().count();
    if description_length < rules.min_description_length {
        feedback.push(FeedbackItem::new(
            Category::Description,
            Severity::Warning,
            format!(
                "PR description is too short ({} chars). Expected at least {} characters.",
                description_length, rules.min_description_length
            ),
        ));
    } else {
        feedback.push(FeedbackItem::new(
            Category::Description,
            Severity::Info,
            "PR description meets length requirements.",
        ));
    }

    // 2. Scope
    if snapshot.changed_files > rules.max_files_changed {
        feedback.push(FeedbackItem::new(
            Category::Scope,
            Severity::Warning,
            format!(
                "Too many files changed ({}). Consider breaking into smaller PRs. Maximum recommended: {}",
                snapshot.changed_files, rules.max_files_changed
            ),
        ));
    }

    // 3. Per-file scan, in listing order
    let mut test_files_found = false;
    let mut doc_files_found = false;

    for file in &snapshot.files {
        let filename_lower = file.filename.to_lowercase();

        if filename_lower.contains("test") || filename_lower.contains("spec") {
            test_files_found = true;
        }

        if filename_lower.ends_with(".md") || filename_lower.contains("readme") {
            doc_files_found = true;
        }

        let Some(patch) = file.patch.as_deref() else {
            continue;
        };

        if patch.contains("console.log") {
            feedback.push(FeedbackItem::with_file(
                Category::CodeQuality,
                Severity::Warning,
                "Found console.log statement. Remove debug code before merging.",
                &file.filename,
            ));
        }

        if patch.contains("TODO") || patch.contains("FIXME") {
            feedback.push(FeedbackItem::with_file(
                Category::CodeQuality,
                Severity::Info,
                "Found TODO/FIXME comment. Consider addressing before merge.",
                &file.filename,
            ));
        }

        let patch_lower = patch.to_lowercase();
        if patch_lower.contains("try")
            && !patch_lower.contains("except")
            && !patch_lower.contains("catch")
        {
            feedback.push(FeedbackItem::with_file(
                Category::ErrorHandling,
                Severity::Error,
                "Try block without proper error handling.",
                &file.filename,
            ));
        }
    }

    // 4. Testing requirement
    if rules.require_tests {
        if test_files_found {
            feedback.push(FeedbackItem::new(
                Category::Testing,
                Severity::Info,
                "Test files included ✓",
            ));
        } else {
            feedback.push(FeedbackItem::new(
                Category::Testing,
                Severity::Error,
                "No test files found. Tests are required for this branch type.",
            ));
        }
    }

    // 5. Documentation requirement (no positive confirmation, unlike tests)
    if rules.require_documentation && !doc_files_found {
        feedback.push(FeedbackItem::new(
            Category::Documentation,
            Severity::Warning,
            "No documentation updates found. Consider updating relevant docs.",
        ));
    }

    // 6. Checklist echo
    for check in &rules.checks {
        feedback.push(FeedbackItem::new(
            Category::BestPractices,
            Severity::Info,
            format!("Verify: {}", check),
        ));
    }

    feedback
}
