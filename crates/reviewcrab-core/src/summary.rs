use crate::analyzer::{FeedbackItem, PullRequestSnapshot, Severity};
use crate::rules::ExpectationSet;

/// Compile feedback items into the human-readable review summary
///
/// Pure and deterministic: identical inputs always produce the identical
/// string. This is what gets persisted as the review summary and, on
/// instructor approval, posted verbatim to the PR. Section order is fixed:
/// header, results tally, critical issues (only if any), warnings (only if
/// any), branch requirements, verdict.
pub fn compile_summary(
    snapshot: &PullRequestSnapshot,
    expectations: &ExpectationSet,
    feedback: &[FeedbackItem],
    error_count: usize,
    warning_count: usize,
) -> String {
    let info_count = feedback.len() - error_count - warning_count;

    let mut parts = vec![
        "## Automated PR Review Summary\n".to_string(),
        format!("**PR:** {}", snapshot.title),
        format!("**Branch Type:** {}", expectations.branch_type),
        format!("**Files Changed:** {}", snapshot.changed_files),
        format!(
            "**Lines Added:** +{} / **Lines Removed:** -{}\n",
            snapshot.additions, snapshot.deletions
        ),
        "### Review Results".to_string(),
        format!("- ❌ **Errors:** {}", error_count),
        format!("- ⚠️  **Warnings:** {}", warning_count),
        format!("- ℹ️  **Info:** {}\n", info_count),
    ];

    if error_count > 0 {
        parts.push("### 🔴 Critical Issues".to_string());
        push_items(&mut parts, feedback, Severity::Error);
        parts.push(String::new());
    }

    if warning_count > 0 {
        parts.push("### ⚠️ Warnings".to_string());
        push_items(&mut parts, feedback, Severity::Warning);
        parts.push(String::new());
    }

    parts.push("### 📋 Branch-Specific Requirements".to_string());
    parts.push(format!("_{}_\n", expectations.description));

    if error_count == 0 {
        parts.push("✅ **This PR is ready for instructor review!**".to_string());
    } else {
        parts.push("⏸️ **Please address the errors before instructor review.**".to_string());
    }

    parts.join("\n")
}

fn push_items(parts: &mut Vec<String>, feedback: &[FeedbackItem], severity: Severity) {
    for item in feedback.iter().filter(|i| i.severity == severity) {
        let file_info = item
            .file_path
            .as_deref()
            .map(|path| format!(" ({})", path))
            .unwrap_or_default();
        parts.push(format!("- {}{}", item.message, file_info));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;
    use crate::rules::{default_rules, resolve_expectations};

    fn snapshot(body: &str, files: Vec<(&str, Option<&str>)>) -> PullRequestSnapshot {
        PullRequestSnapshot {
            title: "Fix login redirect".to_string(),
            body: Some(body.to_string()),
            changed_files: files.len(),
            additions: 42,
            deletions: 7,
            files: files
                .into_iter()
                .map(|(name, patch)| crate::analyzer::ChangedFile {
                    filename: name.to_string(),
                    patch: patch.map(|s| s.to_string()),
                })
                .collect(),
        }
    }

    #[test]
    fn test_header_block() {
        let expectations = resolve_expectations(&default_rules(), "bugfix/login");
        let result = analyze(&snapshot("a body long enough for bugfixes", vec![]), &expectations);

        assert!(result.summary.starts_with("## Automated PR Review Summary\n"));
        assert!(result.summary.contains("**PR:** Fix login redirect"));
        assert!(result.summary.contains("**Branch Type:** bugfix/*"));
        assert!(result.summary.contains("**Files Changed:** 0"));
        assert!(result.summary.contains("**Lines Added:** +42 / **Lines Removed:** -7"));
    }

    #[test]
    fn test_sections_omitted_when_clean() {
        // docs/* requires nothing, so a conforming PR has no errors/warnings
        let expectations = resolve_expectations(&default_rules(), "docs/guide");
        let result = analyze(
            &snapshot("documentation update body", vec![("guide.md", None)]),
            &expectations,
        );

        assert_eq!(result.error_count, 0);
        assert_eq!(result.warning_count, 0);
        assert!(!result.summary.contains("Critical Issues"));
        assert!(!result.summary.contains("### ⚠️ Warnings"));
        assert!(result.summary.contains("ready for instructor review"));
    }

    #[test]
    fn test_error_section_lists_messages_with_file() {
        let expectations = resolve_expectations(&default_rules(), "feature/x");
        let result = analyze(
            &snapshot("short", vec![("utils.py", Some("+try:\n+    risky()\n"))]),
            &expectations,
        );

        assert!(result.summary.contains("### 🔴 Critical Issues"));
        assert!(
            result
                .summary
                .contains("- Try block without proper error handling. (utils.py)")
        );
        assert!(result.summary.contains("address the errors before instructor review"));
    }

    #[test]
    fn test_warning_section_lists_messages() {
        let expectations = resolve_expectations(&default_rules(), "docs/guide");
        let result = analyze(&snapshot("x", vec![("guide.md", None)]), &expectations);

        assert_eq!(result.warning_count, 1);
        assert!(result.summary.contains("### ⚠️ Warnings"));
        assert!(result.summary.contains("- PR description is too short"));
    }

    #[test]
    fn test_requirements_section_echoes_description() {
        let expectations = resolve_expectations(&default_rules(), "hotfix/crash");
        let result = analyze(&snapshot("body", vec![]), &expectations);

        assert!(result.summary.contains("### 📋 Branch-Specific Requirements"));
        assert!(result.summary.contains("_Critical production fixes_"));
    }

    #[test]
    fn test_compile_is_byte_deterministic() {
        let expectations = resolve_expectations(&default_rules(), "feature/x");
        let snap = snapshot("short", vec![("a.js", Some("+console.log('x')"))]);
        let result = analyze(&snap, &expectations);

        let first = compile_summary(
            &snap,
            &expectations,
            &result.feedback,
            result.error_count,
            result.warning_count,
        );
        let second = compile_summary(
            &snap,
            &expectations,
            &result.feedback,
            result.error_count,
            result.warning_count,
        );
        assert_eq!(first, second);
        assert_eq!(first, result.summary);
    }

    #[test]
    fn test_info_count_is_derived() {
        let expectations = resolve_expectations(&default_rules(), "feature/x");
        let result = analyze(&snapshot("short", vec![]), &expectations);

        let info = result.feedback.len() - result.error_count - result.warning_count;
        assert!(result.summary.contains(&format!("- ℹ️  **Info:** {}\n", info)));
    }
}
