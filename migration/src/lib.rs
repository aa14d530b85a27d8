pub use sea_orm_migration::prelude::*;

mod m20250412_000001_create_users;
mod m20250412_000002_create_catalog;
mod m20250412_000003_create_content_items;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250412_000001_create_users::Migration),
            Box::new(m20250412_000002_create_catalog::Migration),
            Box::new(m20250412_000003_create_content_items::Migration),
        ]
    }
}
