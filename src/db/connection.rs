use sqlx::{sqlite::SqlitePoolOptions, Error, Pool, Sqlite};
use tracing::warn;

/// Create a SQLite connection pool
///
/// # Parameters
/// - `database_url`: SQLite connection string, e.g. `sqlite::memory:` or
///   `sqlite://jobs.db?mode=rwc`
/// - `max_connections`: upper bound on pooled connections
///
/// An in-memory database lives inside a single connection, so for those
/// URLs the pool is pinned to one connection that is never recycled.
pub async fn get_connection(database_url: &str, max_connections: u32) -> Result<Pool<Sqlite>, Error> {
    if is_in_memory(database_url) {
        if max_connections != 1 {
            warn!(
                "In-memory database requested, using 1 connection instead of {}",
                max_connections
            );
        }

        return SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(database_url)
            .await;
    }

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_in_memory_urls() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file:jobs?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://jobs.db?mode=rwc"));
    }

    #[actix_web::test]
    async fn in_memory_pool_keeps_one_connection() {
        let pool = get_connection("sqlite::memory:", 5).await.unwrap();

        sqlx::query("CREATE TABLE probe (id INTEGER)").execute(&pool).await.unwrap();
        sqlx::query("INSERT INTO probe (id) VALUES (1)").execute(&pool).await.unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM probe")
            .fetch_one(&pool)
            .await
            .unwrap();

        assert_eq!(count, 1);
        assert_eq!(pool.options().get_max_connections(), 1);
    }
}
