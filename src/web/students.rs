//! Student endpoints: enrollment and the course player.

use super::contents::ContentDetail;
use crate::db::get_db_pool;
use crate::error::Error;
use crate::middleware::ClientCtx;
use actix_web::{get, post, web, HttpResponse};
use serde_json::json;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(enroll)
        .service(view_my_courses)
        .service(view_player)
        .service(view_player_module);
}

/// Enroll the signed-in user. Enrolling twice is not an error; the response
/// says whether a new enrollment was created.
#[post("/courses/{course_id}/enroll")]
async fn enroll(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    let user_id = client.require_login()?;
    let enrolled = crate::students::enroll(get_db_pool(), user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "enrolled": enrolled })))
}

#[get("/my/courses")]
async fn view_my_courses(client: ClientCtx) -> Result<HttpResponse, Error> {
    let user_id = client.require_login()?;
    let courses = crate::students::list_enrolled(get_db_pool(), user_id).await?;
    Ok(HttpResponse::Ok().json(courses))
}

/// Course player opened at the first module.
#[get("/my/courses/{course_id}")]
async fn view_player(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    let user_id = client.require_login()?;
    player_response(user_id, path.into_inner(), None).await
}

/// Course player opened at a specific module.
#[get("/my/courses/{course_id}/modules/{module_id}")]
async fn view_player_module(
    client: ClientCtx,
    path: web::Path<(i32, i32)>,
) -> Result<HttpResponse, Error> {
    let user_id = client.require_login()?;
    let (course_id, module_id) = path.into_inner();
    player_response(user_id, course_id, Some(module_id)).await
}

async fn player_response(
    user_id: i32,
    course_id: i32,
    module_id: Option<i32>,
) -> Result<HttpResponse, Error> {
    let player =
        crate::students::open_course(get_db_pool(), user_id, course_id, module_id).await?;
    let contents: Vec<ContentDetail> = player
        .contents
        .iter()
        .map(|(slot, item)| ContentDetail::new(slot, item))
        .collect();
    Ok(HttpResponse::Ok().json(json!({
        "course": player.course,
        "modules": player.modules,
        "module": player.current,
        "contents": contents,
    })))
}
