//! Course management for instructors.
//!
//! Every lookup here is scoped to the calling owner; a course that exists but
//! belongs to someone else is indistinguishable from one that never existed.

use crate::error::Error;
use crate::orm::{courses, modules, subjects};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, DatabaseConnection, TransactionTrait};

/// Validated input for creating or updating a course.
#[derive(Clone, Debug)]
pub struct CourseInput {
    pub subject_id: i32,
    pub title: String,
    pub slug: String,
    pub overview: String,
}

/// One row of a module edit batch. `id` is `None` for new modules; rows
/// flagged `delete` are removed along with their contents.
#[derive(Clone, Debug)]
pub struct ModuleRow {
    pub id: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub delete: bool,
}

/// Find a course owned by `owner_id`.
pub async fn find_owned_course(
    db: &DatabaseConnection,
    owner_id: i32,
    course_id: i32,
) -> Result<courses::Model, Error> {
    courses::Entity::find_by_id(course_id)
        .filter(courses::Column::OwnerId.eq(owner_id))
        .one(db)
        .await?
        .ok_or(Error::NotFound("course"))
}

/// Find a module belonging to a course owned by `owner_id`.
pub async fn find_owned_module(
    db: &DatabaseConnection,
    owner_id: i32,
    module_id: i32,
) -> Result<modules::Model, Error> {
    modules::Entity::find_by_id(module_id)
        .inner_join(courses::Entity)
        .filter(courses::Column::OwnerId.eq(owner_id))
        .one(db)
        .await?
        .ok_or(Error::NotFound("module"))
}

/// Courses owned by `owner_id`, newest first.
pub async fn list_owned_courses(
    db: &DatabaseConnection,
    owner_id: i32,
) -> Result<Vec<courses::Model>, Error> {
    Ok(courses::Entity::find()
        .filter(courses::Column::OwnerId.eq(owner_id))
        .order_by_desc(courses::Column::CreatedAt)
        .order_by_desc(courses::Column::Id)
        .all(db)
        .await?)
}

/// Modules of a course in display order.
pub async fn list_modules(
    db: &DatabaseConnection,
    course_id: i32,
) -> Result<Vec<modules::Model>, Error> {
    Ok(modules::Entity::find()
        .filter(modules::Column::CourseId.eq(course_id))
        .order_by_asc(modules::Column::Position)
        .order_by_asc(modules::Column::Id)
        .all(db)
        .await?)
}

async fn check_subject_exists(db: &DatabaseConnection, subject_id: i32) -> Result<(), Error> {
    subjects::Entity::find_by_id(subject_id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| Error::validation("subject_id", "unknown subject"))
}

async fn check_slug_free(
    db: &DatabaseConnection,
    slug: &str,
    exclude_id: Option<i32>,
) -> Result<(), Error> {
    let mut query = courses::Entity::find().filter(courses::Column::Slug.eq(slug));
    if let Some(id) = exclude_id {
        query = query.filter(courses::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(Error::validation("slug", "a course with this slug already exists"));
    }
    Ok(())
}

/// Create a course owned by `owner_id`.
pub async fn create_course(
    db: &DatabaseConnection,
    owner_id: i32,
    input: CourseInput,
) -> Result<courses::Model, Error> {
    check_subject_exists(db, input.subject_id).await?;
    check_slug_free(db, &input.slug, None).await?;

    let course = courses::ActiveModel {
        owner_id: Set(owner_id),
        subject_id: Set(input.subject_id),
        title: Set(input.title),
        slug: Set(input.slug),
        overview: Set(input.overview),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    log::info!("User {} created course {} ({})", owner_id, course.id, course.slug);
    crate::cache::invalidate_catalog();
    Ok(course)
}

/// Update a course owned by `owner_id`.
pub async fn update_course(
    db: &DatabaseConnection,
    owner_id: i32,
    course_id: i32,
    input: CourseInput,
) -> Result<courses::Model, Error> {
    let course = find_owned_course(db, owner_id, course_id).await?;
    check_subject_exists(db, input.subject_id).await?;
    check_slug_free(db, &input.slug, Some(course.id)).await?;

    let mut am: courses::ActiveModel = course.into();
    am.subject_id = Set(input.subject_id);
    am.title = Set(input.title);
    am.slug = Set(input.slug);
    am.overview = Set(input.overview);
    let course = am.update(db).await?;

    crate::cache::invalidate_catalog();
    Ok(course)
}

/// Delete a course owned by `owner_id`. Modules, content slots and
/// enrollments go with it through the schema's cascades.
pub async fn delete_course(
    db: &DatabaseConnection,
    owner_id: i32,
    course_id: i32,
) -> Result<(), Error> {
    let course = find_owned_course(db, owner_id, course_id).await?;
    courses::Entity::delete_by_id(course.id).exec(db).await?;

    log::info!("User {} deleted course {}", owner_id, course.id);
    crate::cache::invalidate_catalog();
    Ok(())
}

/// Apply a batch of module edits to a course: create rows without an id,
/// update rows with one, and drop rows flagged for deletion. New modules are
/// appended to the course's order.
pub async fn sync_modules(
    db: &DatabaseConnection,
    owner_id: i32,
    course_id: i32,
    rows: Vec<ModuleRow>,
) -> Result<Vec<modules::Model>, Error> {
    let course = find_owned_course(db, owner_id, course_id).await?;

    for row in rows {
        match row.id {
            Some(module_id) => {
                let module = modules::Entity::find_by_id(module_id)
                    .filter(modules::Column::CourseId.eq(course.id))
                    .one(db)
                    .await?
                    .ok_or(Error::NotFound("module"))?;

                if row.delete {
                    modules::Entity::delete_by_id(module.id).exec(db).await?;
                    log::info!("User {} deleted module {}", owner_id, module.id);
                } else {
                    let mut am: modules::ActiveModel = module.into();
                    am.title = Set(row.title);
                    am.description = Set(row.description);
                    am.update(db).await?;
                }
            }
            None if row.delete => continue,
            None => {
                modules::ActiveModel {
                    course_id: Set(course.id),
                    title: Set(row.title),
                    description: Set(row.description),
                    ..Default::default()
                }
                .insert(db)
                .await?;
            }
        }
    }

    list_modules(db, course.id).await
}

/// Apply explicit module positions. Each `(module id, position)` pair only
/// lands when the module's course belongs to `owner_id`; foreign ids are
/// skipped without error. The whole batch commits atomically.
pub async fn reorder_modules(
    db: &DatabaseConnection,
    owner_id: i32,
    order: &[(i32, i32)],
) -> Result<(), Error> {
    let owned: Vec<i32> = courses::Entity::find()
        .select_only()
        .column(courses::Column::Id)
        .filter(courses::Column::OwnerId.eq(owner_id))
        .into_tuple()
        .all(db)
        .await?;

    let txn = db.begin().await?;
    for (module_id, position) in order {
        modules::Entity::update_many()
            .col_expr(modules::Column::Position, Expr::value(*position))
            .filter(modules::Column::Id.eq(*module_id))
            .filter(modules::Column::CourseId.is_in(owned.clone()))
            .exec(&txn)
            .await?;
    }
    txn.commit().await?;

    log::debug!("User {} reordered {} modules", owner_id, order.len());
    Ok(())
}

/// Apply explicit content positions, with the same ownership scoping and
/// atomicity as [`reorder_modules`].
pub async fn reorder_contents(
    db: &DatabaseConnection,
    owner_id: i32,
    order: &[(i32, i32)],
) -> Result<(), Error> {
    use crate::orm::contents;

    let owned: Vec<i32> = modules::Entity::find()
        .select_only()
        .column(modules::Column::Id)
        .inner_join(courses::Entity)
        .filter(courses::Column::OwnerId.eq(owner_id))
        .into_tuple()
        .all(db)
        .await?;

    let txn = db.begin().await?;
    for (content_id, position) in order {
        contents::Entity::update_many()
            .col_expr(contents::Column::Position, Expr::value(*position))
            .filter(contents::Column::Id.eq(*content_id))
            .filter(contents::Column::ModuleId.is_in(owned.clone()))
            .exec(&txn)
            .await?;
    }
    txn.commit().await?;

    log::debug!("User {} reordered {} contents", owner_id, order.len());
    Ok(())
}
