//! Schema migrations for the cache tables.
//!
//! Each migration is a SQL template; `{cache_table}` and `{requests_table}`
//! are replaced with the configured table names before it runs. Versions are
//! tracked per table pair so a renamed table gets its own schema.

use super::Error;
use super::connection::Tables;
use tokio_rusqlite::{Connection, params};

/// (version, SQL template), in ascending version order.
const MIGRATIONS: &[(i64, &str)] = &[
    (1, include_str!("../../migrations/001_search_cache.sql")),
    (2, include_str!("../../migrations/002_api_requests.sql")),
];

fn render(sql: &str, tables: &Tables) -> String {
    sql.replace("{cache_table}", &tables.results)
        .replace("{requests_table}", &tables.ledger)
}

/// Apply every migration newer than what `_migrations` records for this table pair.
pub async fn run(conn: &Connection, tables: &Tables) -> Result<(), Error> {
    let scope = format!("{}+{}", tables.results, tables.ledger);
    let pending: Vec<(i64, String)> = MIGRATIONS.iter().map(|(v, sql)| (*v, render(sql, tables))).collect();

    conn.call(move |conn| -> Result<(), Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER NOT NULL,
                scope TEXT NOT NULL,
                applied_at TEXT NOT NULL,
                PRIMARY KEY (version, scope)
            )",
            [],
        )
        .map_err(Error::from)?;

        let applied: i64 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM _migrations WHERE scope = ?1",
                params![scope],
                |row| row.get(0),
            )
            .map_err(Error::from)?;

        for (version, sql) in pending.iter().filter(|(v, _)| *v > applied) {
            conn.execute_batch(sql)
                .map_err(|e| Error::MigrationFailed(format!("version {version}: {e}")))?;
            conn.execute(
                "INSERT INTO _migrations (version, scope, applied_at) VALUES (?1, ?2, ?3)",
                params![version, scope, chrono::Utc::now().to_rfc3339()],
            )
            .map_err(Error::from)?;
            tracing::debug!(version, scope = %scope, "applied migration");
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}
