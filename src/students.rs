//! Enrollment and course playback for students.

use crate::content::{self, ContentItem};
use crate::error::Error;
use crate::orm::{contents, courses, enrollments, modules};
use chrono::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection};

/// A course opened for playback: the full module list plus the contents of
/// the module being viewed.
#[derive(Clone, Debug)]
pub struct CoursePlayer {
    pub course: courses::Model,
    pub modules: Vec<modules::Model>,
    pub current: modules::Model,
    pub contents: Vec<(contents::Model, ContentItem)>,
}

/// Check if a user is enrolled in a course.
pub async fn is_enrolled(
    db: &DatabaseConnection,
    user_id: i32,
    course_id: i32,
) -> Result<bool, Error> {
    let result = enrollments::Entity::find_by_id((course_id, user_id))
        .one(db)
        .await?;
    Ok(result.is_some())
}

/// Enroll a user in a course. Returns false when the user was already
/// enrolled.
pub async fn enroll(
    db: &DatabaseConnection,
    user_id: i32,
    course_id: i32,
) -> Result<bool, Error> {
    let course = courses::Entity::find_by_id(course_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound("course"))?;

    // Check if already enrolled
    if is_enrolled(db, user_id, course.id).await? {
        return Ok(false);
    }

    let enrollment = enrollments::ActiveModel {
        course_id: Set(course.id),
        user_id: Set(user_id),
        enrolled_at: Set(Utc::now().naive_utc()),
    };

    match enrollment.insert(db).await {
        Ok(_) => {
            log::info!("User {} enrolled in course {}", user_id, course.id);
            Ok(true)
        }
        Err(e) => {
            // Log the error but return false (assume duplicate key)
            log::debug!(
                "Could not enroll user {} in course {} (likely already enrolled): {}",
                user_id,
                course.id,
                e
            );
            Ok(false)
        }
    }
}

/// Courses the user is enrolled in, newest first.
pub async fn list_enrolled(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<courses::Model>, Error> {
    Ok(courses::Entity::find()
        .inner_join(enrollments::Entity)
        .filter(enrollments::Column::UserId.eq(user_id))
        .order_by_desc(courses::Column::CreatedAt)
        .order_by_desc(courses::Column::Id)
        .all(db)
        .await?)
}

/// Find a course the user is enrolled in. Courses the user has not joined
/// look the same as courses that do not exist.
pub async fn find_enrolled_course(
    db: &DatabaseConnection,
    user_id: i32,
    course_id: i32,
) -> Result<courses::Model, Error> {
    courses::Entity::find_by_id(course_id)
        .inner_join(enrollments::Entity)
        .filter(enrollments::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(Error::NotFound("course"))
}

/// Open a course for playback. Shows the requested module, or the first one
/// when none is given; a course without modules has nothing to play.
pub async fn open_course(
    db: &DatabaseConnection,
    user_id: i32,
    course_id: i32,
    module_id: Option<i32>,
) -> Result<CoursePlayer, Error> {
    let course = find_enrolled_course(db, user_id, course_id).await?;
    let modules = crate::courses::list_modules(db, course.id).await?;

    let current = match module_id {
        Some(id) => modules.iter().find(|m| m.id == id).cloned(),
        None => modules.first().cloned(),
    }
    .ok_or(Error::NotFound("module"))?;

    let contents = content::list_slots(db, current.id).await?;

    Ok(CoursePlayer {
        course,
        modules,
        current,
        contents,
    })
}
