//! Test fixtures for creating test data
#![allow(dead_code)]

use chrono::Utc;
use sea_orm::{entity::*, ActiveValue::Set, DatabaseConnection, DbErr};

/// Create a user holding instructor rights
pub async fn create_instructor(
    db: &DatabaseConnection,
    username: &str,
) -> Result<lectern::orm::users::Model, DbErr> {
    create_user(db, username, true).await
}

/// Create a plain student account
pub async fn create_student(
    db: &DatabaseConnection,
    username: &str,
) -> Result<lectern::orm::users::Model, DbErr> {
    create_user(db, username, false).await
}

async fn create_user(
    db: &DatabaseConnection,
    username: &str,
    is_instructor: bool,
) -> Result<lectern::orm::users::Model, DbErr> {
    use lectern::orm::users;

    users::ActiveModel {
        username: Set(username.to_string()),
        email: Set(Some(format!("{}@test.com", username))),
        display_name: Set(None),
        is_instructor: Set(is_instructor),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Create a subject for courses to hang off
pub async fn create_subject(
    db: &DatabaseConnection,
    title: &str,
    slug: &str,
) -> Result<lectern::orm::subjects::Model, DbErr> {
    use lectern::orm::subjects;

    subjects::ActiveModel {
        title: Set(title.to_string()),
        slug: Set(slug.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Create a course owned by `owner_id`
pub async fn create_course(
    db: &DatabaseConnection,
    owner_id: i32,
    subject_id: i32,
    title: &str,
    slug: &str,
) -> Result<lectern::orm::courses::Model, DbErr> {
    use lectern::orm::courses;

    courses::ActiveModel {
        owner_id: Set(owner_id),
        subject_id: Set(subject_id),
        title: Set(title.to_string()),
        slug: Set(slug.to_string()),
        overview: Set(format!("All about {}", title)),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Create a module appended to the course's order
pub async fn create_module(
    db: &DatabaseConnection,
    course_id: i32,
    title: &str,
) -> Result<lectern::orm::modules::Model, DbErr> {
    use lectern::orm::modules;

    modules::ActiveModel {
        course_id: Set(course_id),
        title: Set(title.to_string()),
        description: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Create a text item and the content slot pointing at it
pub async fn create_text_content(
    db: &DatabaseConnection,
    owner_id: i32,
    module_id: i32,
    title: &str,
    body: &str,
) -> Result<(lectern::orm::contents::Model, lectern::orm::texts::Model), DbErr> {
    use lectern::orm::contents::{self, ContentKind};
    use lectern::orm::texts;

    let item = texts::ActiveModel {
        owner_id: Set(owner_id),
        title: Set(title.to_string()),
        body: Set(body.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let slot = contents::ActiveModel {
        module_id: Set(module_id),
        kind: Set(ContentKind::Text),
        item_id: Set(item.id),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok((slot, item))
}

/// Enroll a user directly, bypassing the service layer
pub async fn create_enrollment(
    db: &DatabaseConnection,
    user_id: i32,
    course_id: i32,
) -> Result<lectern::orm::enrollments::Model, DbErr> {
    use lectern::orm::enrollments;

    enrollments::ActiveModel {
        course_id: Set(course_id),
        user_id: Set(user_id),
        enrolled_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await
}
