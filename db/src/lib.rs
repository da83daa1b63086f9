use color_eyre::{eyre::Context, Result};
use sqlx::postgres::PgPoolOptions;

pub mod bugs;
pub mod cooking;
pub mod family_members;

pub use sqlx;
pub use sqlx::PgPool;

const MIGRATION_LOCK_ID: i64 = 0xDB_DB_DB_DB_DB_DB_DB;

#[tracing::instrument(err)]
pub async fn setup_db_pool() -> Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL").wrap_err("DATABASE_URL must be set")?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .wrap_err("Failed to connect to Postgres")?;

    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(MIGRATION_LOCK_ID)
        .execute(&pool)
        .await?;

    sqlx::migrate!().run(&pool).await?;

    let unlocked: bool = sqlx::query_scalar("SELECT pg_advisory_unlock($1)")
        .bind(MIGRATION_LOCK_ID)
        .fetch_one(&pool)
        .await?;

    if unlocked {
        tracing::info!("Migration lock unlocked");
    } else {
        tracing::warn!("Failed to unlock migration lock");
    }

    Ok(pool)
}

/// Parses every stored text value into its enum, failing on the first unknown one.
pub(crate) fn parse_all<T>(values: Vec<String>) -> Result<Vec<T>>
where
    T: std::str::FromStr<Err = String>,
{
    values
        .into_iter()
        .map(|v| v.parse::<T>().map_err(|e| color_eyre::eyre::eyre!(e)))
        .collect()
}

pub(crate) fn to_text<T: std::fmt::Display>(values: &[T]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

/// `ILIKE` pattern matching `search` anywhere, with LIKE wildcards escaped.
pub(crate) fn contains_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");

    format!("%{escaped}%")
}
