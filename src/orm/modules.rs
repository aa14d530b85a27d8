//! SeaORM Entity for modules table

use crate::ordering;
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, Set};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "modules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub course_id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Course,
    #[sea_orm(has_many = "super::contents::Entity")]
    Contents,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::contents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contents.def()
    }
}

impl ordering::Positioned for Entity {
    fn position_column() -> Self::Column {
        Column::Position
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    /// Assigns the next free position within the course when none was given.
    async fn before_save<C>(mut self, db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert && self.position.is_not_set() {
            let course_id = ordering::scope_value(&self.course_id, "course_id")?;
            let next =
                ordering::next_position::<Entity, _>(db, Column::CourseId.eq(course_id)).await?;
            self.position = Set(next);
        }
        Ok(self)
    }
}
