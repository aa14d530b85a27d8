//! Global database pool.

use once_cell::sync::OnceCell;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

static DB_POOL: OnceCell<DatabaseConnection> = OnceCell::new();

/// Connect the global pool. Should be called once during startup, before any
/// request handler runs.
pub async fn init_db(database_url: String) {
    let mut options = ConnectOptions::new(database_url);
    options.sqlx_logging(false);

    let pool = Database::connect(options)
        .await
        .expect("Failed to create database connection pool.");

    if DB_POOL.set(pool).is_err() {
        log::warn!("init_db called more than once; keeping the existing pool");
    }
}

/// Get the global database pool.
///
/// Panics if [`init_db`] has not run yet.
pub fn get_db_pool() -> &'static DatabaseConnection {
    DB_POOL
        .get()
        .expect("Database pool accessed before init_db().")
}
