use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Common shape shared by all four item tables. The caller appends the
/// payload column before running the statement.
fn item_table(name: &str) -> TableCreateStatement {
    Table::create()
        .table(Alias::new(name))
        .if_not_exists()
        .col(
            ColumnDef::new(Alias::new("id"))
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Alias::new("owner_id")).integer().not_null())
        .col(ColumnDef::new(Alias::new("title")).string_len(250).not_null())
        .col(
            ColumnDef::new(Alias::new("created_at"))
                .timestamp()
                .not_null()
                .default(Expr::cust("CURRENT_TIMESTAMP")),
        )
        .col(
            ColumnDef::new(Alias::new("updated_at"))
                .timestamp()
                .not_null()
                .default(Expr::cust("CURRENT_TIMESTAMP")),
        )
        .foreign_key(
            ForeignKey::create()
                .from(Alias::new(name), Alias::new("owner_id"))
                .to(Alias::new("users"), Alias::new("id"))
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut texts = item_table("texts");
        texts.col(ColumnDef::new(Alias::new("body")).text().not_null());
        manager.create_table(texts).await?;

        let mut videos = item_table("videos");
        videos.col(ColumnDef::new(Alias::new("url")).string_len(2000).not_null());
        manager.create_table(videos).await?;

        let mut images = item_table("images");
        images.col(
            ColumnDef::new(Alias::new("filename"))
                .string_len(255)
                .not_null(),
        );
        manager.create_table(images).await?;

        let mut files = item_table("files");
        files.col(
            ColumnDef::new(Alias::new("filename"))
                .string_len(255)
                .not_null(),
        );
        manager.create_table(files).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("files")).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("images")).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("videos")).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("texts")).to_owned())
            .await
    }
}
