use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;

use crate::error::AppResult;

pub async fn connect_and_migrate(database_url: &str) -> AppResult<DatabaseConnection> {
    connect_with(ConnectOptions::new(database_url.to_string())).await
}

pub async fn connect_with(mut options: ConnectOptions) -> AppResult<DatabaseConnection> {
    options.sqlx_logging(false);
    let db = Database::connect(options).await?;

    for pragma in ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL"] {
        db.execute(Statement::from_string(db.get_database_backend(), pragma.to_string())).await?;
    }

    migration::Migrator::up(&db, None).await?;
    tracing::debug!("database migrations applied");
    Ok(db)
}

/// Fresh in-memory database. A single pooled connection keeps every query on the same
/// SQLite instance.
#[cfg(test)]
pub async fn memory() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1).min_connections(1);
    connect_with(options).await.expect("in-memory database")
}

/// File-backed database in a temporary directory with a pool of several connections.
/// Keep the returned directory alive for as long as the connection is used.
#[cfg(test)]
pub async fn temp_file() -> (tempfile::TempDir, DatabaseConnection) {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("watchlist.db").display());
    let mut options = ConnectOptions::new(url);
    options.max_connections(8);
    let db = connect_with(options).await.expect("file database");
    (dir, db)
}
