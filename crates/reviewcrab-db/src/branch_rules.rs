use crate::error::DbResult;
use crate::models::{BranchRuleRow, BranchRuleRowRaw};
use chrono::Utc;
use reviewcrab_core::rules::{BranchRule, Expectations, default_rules};
use sqlx::{Any, Pool};

/// List all branch rule rows in insertion order
///
/// Insertion order is the wildcard-match order, so this must stay ordered
/// by id.
pub async fn list_rule_rows(pool: &Pool<Any>) -> DbResult<Vec<BranchRuleRow>> {
    let rows = sqlx::query_as::<_, BranchRuleRowRaw>(
        "SELECT id, branch_pattern, description, expectations, created_at, updated_at
         FROM branch_rules
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|raw| raw.into())
    .collect();

    Ok(rows)
}

/// List all branch rules as resolver inputs, in insertion order
pub async fn list_rules(pool: &Pool<Any>) -> DbResult<Vec<BranchRule>> {
    let rows = list_rule_rows(pool).await?;

    let mut rules = Vec::with_capacity(rows.len());
    for row in rows {
        let expectations: Expectations = serde_json::from_str(&row.expectations)?;
        rules.push(BranchRule {
            pattern: row.branch_pattern,
            description: row.description,
            expectations,
        });
    }

    Ok(rules)
}

/// Find a rule by its exact pattern string
pub async fn find_rule_by_pattern(
    pool: &Pool<Any>,
    pattern: &str,
) -> DbResult<Option<BranchRuleRow>> {
    let rule = sqlx::query_as::<_, BranchRuleRowRaw>(
        "SELECT id, branch_pattern, description, expectations, created_at, updated_at
         FROM branch_rules
         WHERE branch_pattern = ?",
    )
    .bind(pattern)
    .fetch_optional(pool)
    .await?
    .map(|raw| raw.into());

    Ok(rule)
}

/// Insert a rule unless its pattern already exists
///
/// Additive only: an existing pattern's content is never overwritten.
/// Returns true if a row was inserted.
pub async fn insert_rule_if_absent(pool: &Pool<Any>, rule: &BranchRule) -> DbResult<bool> {
    if find_rule_by_pattern(pool, &rule.pattern).await?.is_some() {
        return Ok(false);
    }

    let expectations_json = serde_json::to_string(&rule.expectations)?;
    let now_str = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO branch_rules (branch_pattern, description, expectations, created_at)
         VALUES (?, ?, ?, ?)",
    )
    .bind(&rule.pattern)
    .bind(&rule.description)
    .bind(&expectations_json)
    .bind(&now_str)
    .execute(pool)
    .await?;

    Ok(true)
}

/// Seed the built-in rule catalog, skipping patterns that already exist
///
/// Invoked once at process start. Idempotent. Returns the number of rules
/// inserted.
pub async fn seed_default_rules(pool: &Pool<Any>) -> DbResult<usize> {
    let mut inserted = 0;
    for rule in default_rules() {
        if insert_rule_if_absent(pool, &rule).await? {
            inserted += 1;
        }
    }

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{create_pool, run_migrations};
    use reviewcrab_core::rules::resolve_expectations;

    async fn setup_test_db() -> Pool<Any> {
        sqlx::any::install_default_drivers();

        let pool = create_pool("sqlite::memory:", 1)
            .await
            .expect("Failed to create test database pool");

        run_migrations(&pool).await.expect("Failed to run migrations");

        pool
    }

    fn custom_rule(pattern: &str) -> BranchRule {
        BranchRule {
            pattern: pattern.to_string(),
            description: "Custom rules".to_string(),
            expectations: Expectations {
                min_description_length: 10,
                require_tests: false,
                max_files_changed: 99,
                require_documentation: false,
                code_quality_threshold: 0.5,
                checks: vec!["Custom check".to_string()],
            },
        }
    }

    #[tokio::test]
    async fn test_seed_inserts_full_catalog() {
        let pool = setup_test_db().await;

        let inserted = seed_default_rules(&pool).await.expect("Failed to seed");
        assert_eq!(inserted, default_rules().len());

        let rules = list_rules(&pool).await.expect("Failed to list rules");
        assert_eq!(rules.len(), default_rules().len());
        assert!(rules.iter().any(|r| r.pattern == "default"));
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let pool = setup_test_db().await;

        seed_default_rules(&pool).await.expect("First seed failed");
        let inserted = seed_default_rules(&pool).await.expect("Second seed failed");

        assert_eq!(inserted, 0);
        let rules = list_rules(&pool).await.expect("Failed to list rules");
        assert_eq!(rules.len(), default_rules().len());
    }

    #[tokio::test]
    async fn test_seed_never_overwrites_existing_pattern() {
        let pool = setup_test_db().await;

        // Pre-insert a customized feature rule
        insert_rule_if_absent(&pool, &custom_rule("feature/*"))
            .await
            .expect("Failed to insert custom rule");

        seed_default_rules(&pool).await.expect("Failed to seed");

        let row = find_rule_by_pattern(&pool, "feature/*")
            .await
            .expect("Failed to find rule")
            .expect("Rule missing");
        assert_eq!(row.description, "Custom rules");
    }

    #[tokio::test]
    async fn test_list_rules_preserves_insertion_order() {
        let pool = setup_test_db().await;

        insert_rule_if_absent(&pool, &custom_rule("b/*"))
            .await
            .expect("insert failed");
        insert_rule_if_absent(&pool, &custom_rule("a/*"))
            .await
            .expect("insert failed");

        let rules = list_rules(&pool).await.expect("Failed to list rules");
        let patterns: Vec<_> = rules.iter().map(|r| r.pattern.as_str()).collect();
        assert_eq!(patterns, vec!["b/*", "a/*"]);
    }

    #[tokio::test]
    async fn test_stored_rules_drive_resolution() {
        let pool = setup_test_db().await;
        seed_default_rules(&pool).await.expect("Failed to seed");

        let rules = list_rules(&pool).await.expect("Failed to list rules");
        let set = resolve_expectations(&rules, "feature/login");

        assert_eq!(set.branch_type, "feature/*");
        assert_eq!(set.expectations.min_description_length, 50);
        assert!(set.expectations.require_tests);
    }

    #[tokio::test]
    async fn test_find_rule_by_pattern_missing() {
        let pool = setup_test_db().await;

        let rule = find_rule_by_pattern(&pool, "nope/*")
            .await
            .expect("Query failed");
        assert!(rule.is_none());
    }
}
