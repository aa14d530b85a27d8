//! SeaORM Entity for contents table
//!
//! A content row is a slot inside a module: it fixes the slot's position and
//! points at exactly one item row in the table named by [`ContentKind`]. The
//! kind tag is a closed set; anything else is rejected before it reaches the
//! database.

use crate::ordering;
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "contents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub module_id: i32,
    pub kind: ContentKind,
    pub item_id: i32,
    pub position: i32,
}

/// Discriminant for the four item tables a content slot may reference.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    #[sea_orm(string_value = "text")]
    Text,
    #[sea_orm(string_value = "video")]
    Video,
    #[sea_orm(string_value = "image")]
    Image,
    #[sea_orm(string_value = "file")]
    File,
}

impl ContentKind {
    /// Parses a route segment or form value into a kind tag.
    pub fn parse(value: &str) -> Option<Self> {
        Self::try_from_value(&value.to_owned()).ok()
    }

    /// The tag as it appears in URLs and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Video => "video",
            ContentKind::Image => "image",
            ContentKind::File => "file",
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::modules::Entity",
        from = "Column::ModuleId",
        to = "super::modules::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Module,
}

impl Related<super::modules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Module.def()
    }
}

impl ordering::Positioned for Entity {
    fn position_column() -> Self::Column {
        Column::Position
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    /// Assigns the next free position within the module when none was given.
    async fn before_save<C>(mut self, db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert && self.position.is_not_set() {
            let module_id = ordering::scope_value(&self.module_id, "module_id")?;
            let next =
                ordering::next_position::<Entity, _>(db, Column::ModuleId.eq(module_id)).await?;
            self.position = Set(next);
        }
        Ok(self)
    }
}
