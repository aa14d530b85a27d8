//! Public course catalog
//!
//! The catalog is the highest traffic surface and the only one backed by the
//! page cache. Pages are cached per subject filter and page number and
//! invalidated wholesale whenever an instructor changes a course.

use crate::cache;
use crate::db::get_db_pool;
use crate::error::Error;
use crate::middleware::ClientCtx;
use crate::orm::{courses, modules, subjects};
use actix_web::{get, web, HttpResponse};
use sea_orm::{entity::*, query::*, FromQueryResult};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_catalog).service(view_course_detail);
}

#[derive(Deserialize)]
pub struct CatalogQuery {
    pub subject: Option<String>,
    pub page: Option<u64>,
}

/// A subject with the number of courses filed under it.
#[derive(Debug, FromQueryResult, Serialize)]
struct SubjectSummary {
    id: i32,
    title: String,
    slug: String,
    total_courses: i64,
}

/// A catalog row: the course plus its module count.
#[derive(Debug, FromQueryResult, Serialize)]
struct CourseSummary {
    id: i32,
    subject_id: i32,
    title: String,
    slug: String,
    overview: String,
    created_at: chrono::NaiveDateTime,
    total_modules: i64,
}

async fn subject_rollup(db: &sea_orm::DatabaseConnection) -> Result<Vec<SubjectSummary>, Error> {
    Ok(subjects::Entity::find()
        .select_only()
        .column(subjects::Column::Id)
        .column(subjects::Column::Title)
        .column(subjects::Column::Slug)
        .column_as(courses::Column::Id.count(), "total_courses")
        .left_join(courses::Entity)
        .group_by(subjects::Column::Id)
        .order_by_asc(subjects::Column::Title)
        .into_model::<SubjectSummary>()
        .all(db)
        .await?)
}

#[get("/courses")]
async fn view_catalog(query: web::Query<CatalogQuery>) -> Result<HttpResponse, Error> {
    let db = get_db_pool();
    let page = query.page.unwrap_or(1).max(1);

    // Resolve the filter before consulting the cache so an unknown subject
    // slug is a 404 rather than a cached empty page.
    let subject = match &query.subject {
        Some(slug) => Some(
            subjects::Entity::find()
                .filter(subjects::Column::Slug.eq(slug.as_str()))
                .one(db)
                .await?
                .ok_or(Error::NotFound("subject"))?,
        ),
        None => None,
    };

    let key = cache::catalog_key(query.subject.as_deref(), page);
    if let Some(cached) = cache::get_catalog_page(&key) {
        return Ok(HttpResponse::Ok().json(cached));
    }

    let subjects = subject_rollup(db).await?;

    let mut course_query = courses::Entity::find()
        .select_only()
        .column(courses::Column::Id)
        .column(courses::Column::SubjectId)
        .column(courses::Column::Title)
        .column(courses::Column::Slug)
        .column(courses::Column::Overview)
        .column(courses::Column::CreatedAt)
        .column_as(modules::Column::Id.count(), "total_modules")
        .left_join(modules::Entity)
        .group_by(courses::Column::Id)
        .order_by_desc(courses::Column::CreatedAt)
        .order_by_desc(courses::Column::Id);
    if let Some(subject) = &subject {
        course_query = course_query.filter(courses::Column::SubjectId.eq(subject.id));
    }

    let per_page = crate::app_config::limits().courses_per_page as u64;
    let paginator = course_query
        .into_model::<CourseSummary>()
        .paginate(db, per_page);
    let totals = paginator.num_items_and_pages().await?;
    let page_courses = paginator.fetch_page(page - 1).await?;

    let body = json!({
        "subjects": subjects,
        "subject": subject,
        "courses": page_courses,
        "page": page,
        "pages": totals.number_of_pages,
        "total": totals.number_of_items,
    });
    cache::store_catalog_page(key, body.clone());
    Ok(HttpResponse::Ok().json(body))
}

/// Public course page: overview, subject and the module list in order.
#[get("/courses/{slug}")]
async fn view_course_detail(
    client: ClientCtx,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let db = get_db_pool();
    let slug = path.into_inner();

    let course = courses::Entity::find()
        .filter(courses::Column::Slug.eq(slug.as_str()))
        .one(db)
        .await?
        .ok_or(Error::NotFound("course"))?;

    let subject = subjects::Entity::find_by_id(course.subject_id).one(db).await?;
    let modules = crate::courses::list_modules(db, course.id).await?;

    let enrolled = match client.get_id() {
        Some(user_id) => crate::students::is_enrolled(db, user_id, course.id).await?,
        None => false,
    };

    Ok(HttpResponse::Ok().json(json!({
        "course": course,
        "subject": subject,
        "modules": modules,
        "enrolled": enrolled,
    })))
}
