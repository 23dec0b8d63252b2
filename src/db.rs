//! Database module
//!
//! Database connection and schema utilities for the PostgreSQL backend.

use sqlx::PgPool;

/// Schema shipped with the crate
const SCHEMA_SQL: &str = include_str!("../migrations/0001_init.sql");

/// Tables the PostgreSQL store expects
const REQUIRED_TABLES: &[&str] = &["users", "accounts", "transactions"];

/// Simple connectivity check
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Create any missing tables and indexes. Statements are idempotent.
pub async fn apply_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in schema_statements() {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!("Database schema applied");
    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    for table in REQUIRED_TABLES {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    Ok(true)
}

fn schema_statements() -> impl Iterator<Item = &'static str> {
    SCHEMA_SQL
        .split(';')
        .map(str::trim)
        .filter(|s| s.lines().any(|line| !line.trim().is_empty() && !line.trim_start().starts_with("--")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_cover_required_tables() {
        let statements: Vec<&str> = schema_statements().collect();
        for table in REQUIRED_TABLES {
            let create = format!("CREATE TABLE IF NOT EXISTS {}", table);
            assert!(
                statements.iter().any(|s| s.contains(&create)),
                "missing table {}",
                table
            );
        }
    }

    #[test]
    fn test_schema_statements_skip_comment_only_chunks() {
        assert!(schema_statements().all(|s| !s.is_empty()));
    }
}
