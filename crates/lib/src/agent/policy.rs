//! The interception point between the agent and the database.
//!
//! Read-only behaviour is requested in the agent's prompt. `StatementPolicy`
//! decides whether anything is checked on top of that before a statement reaches
//! `Storage::execute_query`.

use crate::errors::PromptError;
use regex::Regex;
use serde::Deserialize;

/// Keywords that mark a statement as writing to or reconfiguring the database.
const FORBIDDEN_KEYWORDS: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "DROP", "ALTER", "CREATE", "TRUNCATE", "ATTACH", "DETACH",
    "PRAGMA", "VACUUM", "REINDEX", "GRANT", "REVOKE", "MERGE", "UPSERT",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementPolicy {
    /// Statements reach the database unchecked; the prompt is the only guard.
    #[default]
    PromptOnly,
    /// Only a single `SELECT` (or `WITH ... SELECT`) statement is allowed.
    ReadOnly,
}

impl StatementPolicy {
    pub fn from_enforce_read_only(enforce: bool) -> Self {
        if enforce {
            Self::ReadOnly
        } else {
            Self::PromptOnly
        }
    }

    pub fn check(&self, sql: &str) -> Result<(), PromptError> {
        match self {
            Self::PromptOnly => Ok(()),
            Self::ReadOnly => check_read_only(sql),
        }
    }
}

fn check_read_only(sql: &str) -> Result<(), PromptError> {
    // String literals, quoted identifiers and comments can hold keywords harmlessly.
    let masking = Regex::new(
        r#"(?s)'(?:[^']|'')*'|"(?:[^"]|"")*"|`(?:[^`]|``)*`|\[[^\]]*\]|--[^\n]*|/\*.*?\*/"#,
    )?;
    let masked = masking.replace_all(sql, " ");

    let statements: Vec<&str> = masked
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let statement = match statements.as_slice() {
        [single] => *single,
        [] => {
            return Err(PromptError::ForbiddenStatement(
                "empty statement".to_string(),
            ))
        }
        _ => {
            return Err(PromptError::ForbiddenStatement(
                "multiple statements are not allowed".to_string(),
            ))
        }
    };

    let word = Regex::new(r"[A-Za-z_][A-Za-z0-9_]*")?;
    let keywords: Vec<String> = word
        .find_iter(statement)
        .map(|m| m.as_str().to_uppercase())
        .collect();

    match keywords.first().map(String::as_str) {
        Some("SELECT") | Some("WITH") => {}
        Some(other) => {
            return Err(PromptError::ForbiddenStatement(format!(
                "{other} statements are not allowed"
            )))
        }
        None => {
            return Err(PromptError::ForbiddenStatement(
                "statement has no keyword".to_string(),
            ))
        }
    }

    if let Some(found) = keywords
        .iter()
        .find(|k| FORBIDDEN_KEYWORDS.contains(&k.as_str()))
    {
        return Err(PromptError::ForbiddenStatement(format!(
            "{found} is not allowed in a read-only query"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_only_lets_everything_through() {
        assert!(StatementPolicy::PromptOnly
            .check("DELETE FROM employees")
            .is_ok());
    }

    #[test]
    fn read_only_accepts_selects_and_ctes() {
        let policy = StatementPolicy::ReadOnly;
        assert!(policy.check("SELECT COUNT(*) FROM employees;").is_ok());
        assert!(policy
            .check("  -- count\nWITH t AS (SELECT id FROM orders) SELECT COUNT(id) FROM t")
            .is_ok());
        assert!(policy
            .check("SELECT name FROM employees WHERE note = 'please delete me' LIMIT 5")
            .is_ok());
        assert!(policy
            .check("SELECT replace(name, 'a', 'b') AS name FROM employees LIMIT 5")
            .is_ok());
    }

    #[test]
    fn read_only_keeps_identifiers_whole() {
        let policy = StatementPolicy::ReadOnly;
        assert!(policy
            .check("SELECT col2update, v1delete FROM audit LIMIT 5")
            .is_ok());
        assert!(policy
            .check("SELECT `update`, [delete] FROM `orders` LIMIT 5")
            .is_ok());
        assert!(policy
            .check("SELECT [order id] FROM [drop table] LIMIT 5")
            .is_ok());
    }

    #[test]
    fn read_only_rejects_mutations() {
        let policy = StatementPolicy::ReadOnly;
        for sql in [
            "DELETE FROM employees WHERE id = 1",
            "update employees set salary = 0",
            "INSERT INTO orders (id) VALUES (1)",
            "DROP TABLE orders",
            "ALTER TABLE orders ADD COLUMN x INTEGER",
            "REPLACE INTO orders (id) VALUES (1)",
            "WITH doomed AS (SELECT id FROM orders) DELETE FROM orders WHERE id IN doomed",
            "PRAGMA writable_schema = 1",
        ] {
            let err = policy.check(sql).unwrap_err();
            assert!(
                matches!(err, PromptError::ForbiddenStatement(_)),
                "expected rejection for {sql}"
            );
        }
    }

    #[test]
    fn read_only_rejects_stacked_statements() {
        let err = StatementPolicy::ReadOnly
            .check("SELECT 1; DROP TABLE employees")
            .unwrap_err();
        assert!(err.to_string().contains("multiple statements"));
    }

    #[test]
    fn flag_maps_to_policy() {
        assert_eq!(
            StatementPolicy::from_enforce_read_only(true),
            StatementPolicy::ReadOnly
        );
        assert_eq!(
            StatementPolicy::from_enforce_read_only(false),
            StatementPolicy::PromptOnly
        );
    }
}
