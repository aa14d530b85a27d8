//! Test database setup and management
#![allow(dead_code)]

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, EntityTrait};

/// Setup a private test database - fresh, in-memory, fully migrated
///
/// Each call returns its own database, so tests using this can run in
/// parallel. The pool is pinned to a single connection because every new
/// connection to `sqlite::memory:` opens its own empty database.
pub async fn setup_test_database() -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    options.max_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// Connect and migrate the process-wide pool (DB_POOL)
///
/// Request handlers read from the global pool, so HTTP tests must go through
/// here instead of [`setup_test_database`]. Backed by a throwaway file under
/// the OS temp directory; in-memory SQLite will not do because the global
/// pool holds more than one connection. The pool is shared across tests, so
/// callers must hold `#[serial]` and wipe with [`cleanup_test_data`].
pub async fn setup_shared_database() -> Result<&'static DatabaseConnection, DbErr> {
    // init_db keeps the first pool on repeat calls, so this is safe to run
    // from every test in the binary
    let path = std::env::temp_dir().join(format!("lectern-test-{}.sqlite", std::process::id()));
    lectern::db::init_db(format!("sqlite://{}?mode=rwc", path.display())).await;

    let db = lectern::db::get_db_pool();
    Migrator::up(db, None).await?;
    Ok(db)
}

/// Cleanup function to remove test data
///
/// Deletes all rows in dependency order: child tables (with foreign keys)
/// must be listed before parent tables.
pub async fn cleanup_test_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    use lectern::orm::{
        contents, courses, enrollments, files, images, modules, subjects, texts, users, videos,
    };

    contents::Entity::delete_many().exec(db).await?;
    enrollments::Entity::delete_many().exec(db).await?;
    modules::Entity::delete_many().exec(db).await?;
    texts::Entity::delete_many().exec(db).await?;
    videos::Entity::delete_many().exec(db).await?;
    images::Entity::delete_many().exec(db).await?;
    files::Entity::delete_many().exec(db).await?;
    courses::Entity::delete_many().exec(db).await?;
    subjects::Entity::delete_many().exec(db).await?;
    users::Entity::delete_many().exec(db).await?;
    Ok(())
}
