use regex::Regex;
use serde::{Deserialize, Serialize};

/// Pattern name of the ultimate fallback rule
pub const DEFAULT_PATTERN: &str = "default";

/// Thresholds and checklist applied to a PR, as stored per branch rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expectations {
    /// Minimum PR description length in characters
    pub min_description_length: usize,

    /// Whether the PR must touch at least one test file
    pub require_tests: bool,

    /// Maximum recommended number of changed files
    pub max_files_changed: usize,

    /// Whether the PR must touch documentation
    pub require_documentation: bool,

    /// Quality bar for this branch category (0.0 to 1.0)
    pub code_quality_threshold: f64,

    /// Manual verification prompts echoed into every review
    pub checks: Vec<String>,
}

/// Expectations resolved for a concrete branch name
///
/// This is the stored [`Expectations`] bundle tagged with the branch
/// category it resolved to. Serializes flat, so the persisted
/// `expectations_applied` JSON carries all fields at the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectationSet {
    /// Branch category (the pattern of the matched rule)
    pub branch_type: String,

    /// Human-readable description of the branch category
    pub description: String,

    #[serde(flatten)]
    pub expectations: Expectations,
}

/// A mapping from a branch pattern to review expectations
///
/// The pattern is either a literal branch name (exact match) or a glob
/// using `*` to match any substring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchRule {
    pub pattern: String,
    pub description: String,
    pub expectations: Expectations,
}

impl BranchRule {
    fn to_expectation_set(&self) -> ExpectationSet {
        ExpectationSet {
            branch_type: self.pattern.clone(),
            description: self.description.clone(),
            expectations: self.expectations.clone(),
        }
    }
}

/// Resolve the expectations for a branch name against an ordered rule list
///
/// Total function: always returns a set, never fails. Matching happens in
/// two phases so that a literal rule always beats a wildcard rule, no
/// matter where either sits in the list:
///
/// 1. Exact pass: a rule whose pattern equals the branch name literally.
/// 2. Wildcard pass: rules containing `*`, in list order; the first whose
///    compiled pattern matches the full branch name wins.
/// 3. Fallback: the rule named `default` if present, else a built-in set.
///
/// # Examples
///
/// ```
/// use reviewcrab_core::rules::{default_rules, resolve_expectations};
///
/// let rules = default_rules();
/// assert_eq!(resolve_expectations(&rules, "feature/login").branch_type, "feature/*");
/// assert_eq!(resolve_expectations(&rules, "main").branch_type, "main");
/// assert_eq!(resolve_expectations(&rules, "wip").branch_type, "default");
/// ```
pub fn resolve_expectations(rules: &[BranchRule], branch_name: &str) -> ExpectationSet {
    if let Some(rule) = rules.iter().find(|r| r.pattern == branch_name) {
        return rule.to_expectation_set();
    }

    for rule in rules.iter().filter(|r| r.pattern.contains('*')) {
        if wildcard_matches(&rule.pattern, branch_name) {
            return rule.to_expectation_set();
        }
    }

    rules
        .iter()
        .find(|r| r.pattern == DEFAULT_PATTERN)
        .map(BranchRule::to_expectation_set)
        .unwrap_or_else(builtin_default)
}

/// The branch category a branch name resolves to
pub fn branch_type_for(rules: &[BranchRule], branch_name: &str) -> String {
    resolve_expectations(rules, branch_name).branch_type
}

/// Match a `*`-glob pattern against a full branch name
///
/// Every non-`*` character is escaped before the pattern is compiled, so
/// branch names and patterns containing regex metacharacters are matched
/// literally. The pattern is anchored at both ends: `feature/*` matches
/// `feature/login` and `feature/` but not `feature` or `my-feature/x`.
fn wildcard_matches(pattern: &str, branch_name: &str) -> bool {
    let escaped = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    match Regex::new(&format!("^{}$", escaped)) {
        Ok(re) => re.is_match(branch_name),
        // Unreachable after escaping, but resolution must never fail
        Err(_) => false,
    }
}

/// Built-in expectations of last resort, used when the rule store has no
/// `default` rule
fn builtin_default() -> ExpectationSet {
    ExpectationSet {
        branch_type: DEFAULT_PATTERN.to_string(),
        description: "Default branch rules".to_string(),
        expectations: default_expectations(),
    }
}

fn default_expectations() -> Expectations {
    Expectations {
        min_description_length: 30,
        require_tests: false,
        max_files_changed: 30,
        require_documentation: false,
        code_quality_threshold: 0.6,
        checks: vec![
            "Code is readable".to_string(),
            "No obvious errors".to_string(),
        ],
    }
}

/// The fixed catalog of built-in branch rules
///
/// Seeded into the rule store at startup if absent. Order matters: the
/// wildcard pass walks rules in insertion order.
pub fn default_rules() -> Vec<BranchRule> {
    let checks = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    vec![
        BranchRule {
            pattern: "main".to_string(),
            description: "Protected production branch".to_string(),
            expectations: Expectations {
                min_description_length: 50,
                require_tests: true,
                max_files_changed: 30,
                require_documentation: true,
                code_quality_threshold: 0.9,
                checks: checks(&[
                    "All CI checks pass",
                    "Reviewed by a maintainer",
                    "No debug statements",
                ]),
            },
        },
        BranchRule {
            pattern: "develop".to_string(),
            description: "Integration branch for ongoing development".to_string(),
            expectations: Expectations {
                min_description_length: 30,
                require_tests: true,
                max_files_changed: 30,
                require_documentation: false,
                code_quality_threshold: 0.7,
                checks: checks(&["Code is readable", "Includes unit tests"]),
            },
        },
        BranchRule {
            pattern: "feature/*".to_string(),
            description: "Feature branches for new functionality".to_string(),
            expectations: Expectations {
                min_description_length: 50,
                require_tests: true,
                max_files_changed: 20,
                require_documentation: true,
                code_quality_threshold: 0.7,
                checks: checks(&[
                    "Code follows naming conventions",
                    "Includes unit tests",
                    "Documentation updated",
                    "No console.log or debug statements",
                    "Error handling implemented",
                ]),
            },
        },
        BranchRule {
            pattern: "bugfix/*".to_string(),
            description: "Bug fix branches".to_string(),
            expectations: Expectations {
                min_description_length: 30,
                require_tests: true,
                max_files_changed: 10,
                require_documentation: false,
                code_quality_threshold: 0.8,
                checks: checks(&[
                    "Bug description is clear",
                    "Includes regression test",
                    "Root cause identified",
                    "No unrelated changes",
                ]),
            },
        },
        BranchRule {
            pattern: "hotfix/*".to_string(),
            description: "Critical production fixes".to_string(),
            expectations: Expectations {
                min_description_length: 40,
                require_tests: true,
                max_files_changed: 5,
                require_documentation: true,
                code_quality_threshold: 0.9,
                checks: checks(&[
                    "Critical issue documented",
                    "Minimal code changes",
                    "Tested in production-like environment",
                    "Rollback plan documented",
                ]),
            },
        },
        BranchRule {
            pattern: "release/*".to_string(),
            description: "Release preparation branches".to_string(),
            expectations: Expectations {
                min_description_length: 40,
                require_tests: true,
                max_files_changed: 25,
                require_documentation: true,
                code_quality_threshold: 0.9,
                checks: checks(&[
                    "Changelog updated",
                    "Version numbers bumped",
                    "No new features",
                ]),
            },
        },
        BranchRule {
            pattern: "docs/*".to_string(),
            description: "Documentation updates".to_string(),
            expectations: Expectations {
                min_description_length: 20,
                require_tests: false,
                max_files_changed: 15,
                require_documentation: false,
                code_quality_threshold: 0.5,
                checks: checks(&[
                    "Documentation is clear",
                    "No broken links",
                    "Proper formatting",
                ]),
            },
        },
        BranchRule {
            pattern: DEFAULT_PATTERN.to_string(),
            description: "Default branch rules".to_string(),
            expectations: default_expectations(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(pattern: &str) -> BranchRule {
        BranchRule {
            pattern: pattern.to_string(),
            description: format!("{} rules", pattern),
            expectations: default_expectations(),
        }
    }

    #[test]
    fn test_exact_match_wins() {
        let rules = default_rules();

        let set = resolve_expectations(&rules, "main");
        assert_eq!(set.branch_type, "main");
        assert_eq!(set.expectations.code_quality_threshold, 0.9);
    }

    #[test]
    fn test_exact_beats_wildcard_regardless_of_order() {
        // Wildcard defined first, literal second
        let rules = vec![rule("m*"), rule("main")];

        let set = resolve_expectations(&rules, "main");
        assert_eq!(set.branch_type, "main");
    }

    #[test]
    fn test_wildcard_match() {
        let rules = default_rules();

        assert_eq!(
            resolve_expectations(&rules, "feature/login").branch_type,
            "feature/*"
        );
        assert_eq!(
            resolve_expectations(&rules, "bugfix/issue-42").branch_type,
            "bugfix/*"
        );
    }

    #[test]
    fn test_wildcard_is_anchored() {
        let rules = vec![rule("feature/*")];

        assert_eq!(
            resolve_expectations(&rules, "feature/").branch_type,
            "feature/*"
        );
        // "feature" alone does not match "feature/*"
        assert_eq!(
            resolve_expectations(&rules, "feature").branch_type,
            "default"
        );
        // Prefixes before the pattern don't match either
        assert_eq!(
            resolve_expectations(&rules, "my-feature/x").branch_type,
            "default"
        );
    }

    #[test]
    fn test_first_wildcard_in_order_wins() {
        let rules = vec![rule("feature/*"), rule("feature/api/*")];

        // Both match, the earlier rule wins
        assert_eq!(
            resolve_expectations(&rules, "feature/api/v2").branch_type,
            "feature/*"
        );
    }

    #[test]
    fn test_fallback_to_default_rule() {
        let rules = default_rules();

        let set = resolve_expectations(&rules, "some-random-branch");
        assert_eq!(set.branch_type, "default");
        assert_eq!(set.description, "Default branch rules");
    }

    #[test]
    fn test_fallback_to_builtin_when_store_empty() {
        let set = resolve_expectations(&[], "anything");
        assert_eq!(set.branch_type, "default");
        assert_eq!(set.expectations.min_description_length, 30);
        assert!(!set.expectations.require_tests);
    }

    #[test]
    fn test_totality_on_hostile_branch_names() {
        let rules = default_rules();

        for name in ["", "a.b+c(d)", "feature/[x]", "^$", "\\", "feature/*"] {
            // Must resolve without panicking for any input
            let set = resolve_expectations(&rules, name);
            assert!(!set.branch_type.is_empty());
        }
    }

    #[test]
    fn test_regex_metacharacters_matched_literally() {
        let rules = vec![rule("release/v1.*")];

        // The '.' is literal: "release/v1X0" must not match
        assert_eq!(
            resolve_expectations(&rules, "release/v1.0").branch_type,
            "release/v1.*"
        );
        assert_eq!(
            resolve_expectations(&rules, "release/v1X0").branch_type,
            "default"
        );
    }

    #[test]
    fn test_branch_type_for() {
        let rules = default_rules();

        assert_eq!(branch_type_for(&rules, "hotfix/crash"), "hotfix/*");
        assert_eq!(branch_type_for(&rules, "unknown"), "default");
    }

    #[test]
    fn test_default_catalog_has_default_rule() {
        let rules = default_rules();

        assert!(rules.iter().any(|r| r.pattern == DEFAULT_PATTERN));
        // Patterns are unique
        let mut patterns: Vec<_> = rules.iter().map(|r| r.pattern.as_str()).collect();
        patterns.sort_unstable();
        patterns.dedup();
        assert_eq!(patterns.len(), rules.len());
    }

    #[test]
    fn test_expectation_set_serializes_flat() {
        let set = resolve_expectations(&default_rules(), "docs/typos");
        let json = serde_json::to_value(&set).unwrap();

        // Flattened: thresholds live at the top level next to branch_type
        assert_eq!(json["branch_type"], "docs/*");
        assert_eq!(json["min_description_length"], 20);
        assert_eq!(json["require_tests"], false);
    }
}
