//! Instructor course management endpoints
//!
//! Everything under `/manage` requires an instructor account. Ownership is
//! checked per row; a course some other instructor owns is reported as
//! missing, not forbidden.

use crate::courses::{CourseInput, ModuleRow};
use crate::db::get_db_pool;
use crate::error::Error;
use crate::middleware::ClientCtx;
use actix_web::{delete, get, patch, post, web, HttpResponse};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_courses)
        .service(create_course)
        .service(view_course)
        .service(update_course)
        .service(delete_course)
        .service(update_modules)
        .service(reorder_modules);
}

static SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap());

/// Payload for creating or updating a course.
#[derive(Deserialize, Validate)]
pub struct CourseForm {
    pub subject_id: i32,
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub title: String,
    #[validate(
        length(min = 1, max = 200, message = "must be between 1 and 200 characters"),
        regex(
            path = "SLUG_RE",
            message = "may only contain lowercase letters, digits and dashes"
        )
    )]
    pub slug: String,
    #[serde(default)]
    pub overview: String,
}

/// One row of the module batch editor. Rows without an id are created, rows
/// flagged `delete` are removed, everything else is updated in place.
#[derive(Deserialize, Validate)]
pub struct ModuleRowForm {
    pub id: Option<i32>,
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub delete: bool,
}

#[derive(Deserialize)]
pub struct ModulesForm {
    pub modules: Vec<ModuleRowForm>,
}

fn validate_course_form(form: CourseForm) -> Result<CourseInput, Error> {
    form.validate()?;
    let limits = crate::app_config::limits();
    if form.title.chars().count() > limits.max_title_length as usize {
        return Err(Error::validation("title", "title is too long"));
    }
    Ok(CourseInput {
        subject_id: form.subject_id,
        title: form.title,
        slug: form.slug,
        overview: form.overview,
    })
}

fn validate_module_rows(form: ModulesForm) -> Result<Vec<ModuleRow>, Error> {
    let mut rows = Vec::with_capacity(form.modules.len());
    for row in form.modules {
        // Rows on their way out are not validated.
        if !row.delete {
            row.validate()?;
        }
        rows.push(ModuleRow {
            id: row.id,
            title: row.title,
            description: row.description,
            delete: row.delete,
        });
    }
    Ok(rows)
}

/// Parse the id-to-position map the drag and drop frontend sends. Object keys
/// arrive as strings.
pub(super) fn parse_order(raw: HashMap<String, i32>) -> Result<Vec<(i32, i32)>, Error> {
    let mut order = Vec::with_capacity(raw.len());
    for (id, position) in raw {
        let id: i32 = id
            .parse()
            .map_err(|_| Error::validation("id", "ids must be numeric"))?;
        order.push((id, position));
    }
    Ok(order)
}

#[get("/manage/courses")]
async fn view_courses(client: ClientCtx) -> Result<HttpResponse, Error> {
    let owner_id = client.require_instructor()?;
    let courses = crate::courses::list_owned_courses(get_db_pool(), owner_id).await?;
    Ok(HttpResponse::Ok().json(courses))
}

#[post("/manage/courses")]
async fn create_course(
    client: ClientCtx,
    form: web::Json<CourseForm>,
) -> Result<HttpResponse, Error> {
    let owner_id = client.require_instructor()?;
    let input = validate_course_form(form.into_inner())?;
    let course = crate::courses::create_course(get_db_pool(), owner_id, input).await?;
    Ok(HttpResponse::Created().json(course))
}

#[get("/manage/courses/{course_id}")]
async fn view_course(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    let owner_id = client.require_instructor()?;
    let db = get_db_pool();

    let course = crate::courses::find_owned_course(db, owner_id, path.into_inner()).await?;
    let modules = crate::courses::list_modules(db, course.id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "course": course,
        "modules": modules,
    })))
}

#[patch("/manage/courses/{course_id}")]
async fn update_course(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<CourseForm>,
) -> Result<HttpResponse, Error> {
    let owner_id = client.require_instructor()?;
    let input = validate_course_form(form.into_inner())?;
    let course =
        crate::courses::update_course(get_db_pool(), owner_id, path.into_inner(), input).await?;
    Ok(HttpResponse::Ok().json(course))
}

#[delete("/manage/courses/{course_id}")]
async fn delete_course(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    let owner_id = client.require_instructor()?;
    crate::courses::delete_course(get_db_pool(), owner_id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Apply a batch of module edits and return the course's modules as they
/// stand afterwards.
#[post("/manage/courses/{course_id}/modules")]
async fn update_modules(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<ModulesForm>,
) -> Result<HttpResponse, Error> {
    let owner_id = client.require_instructor()?;
    let rows = validate_module_rows(form.into_inner())?;
    let modules =
        crate::courses::sync_modules(get_db_pool(), owner_id, path.into_inner(), rows).await?;
    Ok(HttpResponse::Ok().json(modules))
}

/// Persist the order the frontend's drag and drop sends, as a map of module
/// id to position.
#[post("/manage/modules/order")]
async fn reorder_modules(
    client: ClientCtx,
    body: web::Json<HashMap<String, i32>>,
) -> Result<HttpResponse, Error> {
    let owner_id = client.require_instructor()?;
    let order = parse_order(body.into_inner())?;
    crate::courses::reorder_modules(get_db_pool(), owner_id, &order).await?;
    Ok(HttpResponse::Ok().json(json!({ "saved": "OK" })))
}
