use std::env;
use std::time::Duration;

use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../migrations");

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

const DEFAULT_POOL_SIZE: u32 = 10;
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Parse `DATABASE_POOL_SIZE`; unset, unparsable, or zero falls back to the
/// default.
fn pool_size(raw: Option<&str>) -> u32 {
    raw.and_then(|v| v.parse().ok())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_POOL_SIZE)
}

/// Build the connection pool and run pending migrations. Panics on failure;
/// there is nothing to serve without a database.
pub fn create_pool(database_url: &str) -> DbPool {
    let max_size = pool_size(env::var("DATABASE_POOL_SIZE").ok().as_deref());

    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .max_size(max_size)
        .connection_timeout(CONNECTION_TIMEOUT)
        .build(manager)
        .expect("Failed to create database pool");

    let mut conn = pool
        .get()
        .expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");

    tracing::info!("Database pool ready (max_size = {})", max_size);

    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_size_defaults_when_unset() {
        assert_eq!(pool_size(None), DEFAULT_POOL_SIZE);
    }

    #[test]
    fn pool_size_parses_valid_values() {
        assert_eq!(pool_size(Some("3")), 3);
    }

    #[test]
    fn pool_size_rejects_garbage_and_zero() {
        assert_eq!(pool_size(Some("lots")), DEFAULT_POOL_SIZE);
        assert_eq!(pool_size(Some("0")), DEFAULT_POOL_SIZE);
        assert_eq!(pool_size(Some("-2")), DEFAULT_POOL_SIZE);
    }
}
