//! HTTP rendering for service errors, plus the error-handler middleware hooks
//! that normalize stray plain-text error responses into the JSON shape.

use crate::error::Error;
use actix_web::dev::ServiceResponse;
use actix_web::http::{header, StatusCode};
use actix_web::middleware::ErrorHandlerResponse;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::Db(_) | Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Error::NotFound(what) => {
                HttpResponse::NotFound().json(json!({ "error": format!("{} not found", what) }))
            }
            Error::Validation(fields) => HttpResponse::BadRequest().json(json!({
                "error": "validation failed",
                "fields": fields,
            })),
            Error::Unauthenticated => {
                HttpResponse::Unauthorized().json(json!({ "error": "login required" }))
            }
            Error::Forbidden(msg) => HttpResponse::Forbidden().json(json!({ "error": msg })),
            Error::Db(e) => {
                log::error!("Database error while handling request: {}", e);
                HttpResponse::InternalServerError().json(json!({ "error": "internal error" }))
            }
            Error::Storage(e) => {
                log::error!("Storage error while handling request: {}", e);
                HttpResponse::InternalServerError().json(json!({ "error": "internal error" }))
            }
        }
    }
}

fn has_json_body<B>(res: &ServiceResponse<B>) -> bool {
    res.response()
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with(mime::APPLICATION_JSON.essence_str()))
        .unwrap_or(false)
}

fn replace_with_json<B>(
    res: ServiceResponse<B>,
    body: serde_json::Value,
) -> ErrorHandlerResponse<B> {
    let (req, res) = res.into_parts();
    let res = res.set_body(body.to_string()).map_into_boxed_body();
    let mut res = ServiceResponse::new(req, res).map_into_right_body();
    res.response_mut().headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    ErrorHandlerResponse::Response(res)
}

/// Bad requests raised by extractors (malformed JSON, bad path segments)
/// arrive as plain text. Responses that are already JSON carry field-level
/// validation detail and pass through untouched.
pub fn render_400<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    if has_json_body(&res) {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }
    let message = res
        .response()
        .error()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "bad request".to_string());
    Ok(replace_with_json(res, json!({ "error": message })))
}

pub fn render_404<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    if has_json_body(&res) {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }
    Ok(replace_with_json(res, json!({ "error": "not found" })))
}

pub fn render_500<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    if has_json_body(&res) {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }
    if let Some(err) = res.response().error() {
        log::error!("Unhandled error serving {}: {}", res.request().path(), err);
    }
    Ok(replace_with_json(res, json!({ "error": "internal error" })))
}
