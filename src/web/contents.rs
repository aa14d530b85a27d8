//! Module content endpoints
//!
//! Content is polymorphic: a module holds an ordered list of slots, each
//! pointing at a text, video, image or file item. Create and update take
//! `multipart/form-data` so the binary kinds can carry an upload; the text
//! kinds just use the form fields.

use crate::content::{ContentItem, ItemPayload, Render};
use crate::db::get_db_pool;
use crate::error::Error;
use crate::middleware::ClientCtx;
use crate::orm::contents::{self, ContentKind};
use crate::storage;
use actix_multipart::{Field, Multipart};
use actix_web::{delete, get, patch, post, web, HttpResponse};
use futures::TryStreamExt;
use sea_orm::{entity::*, query::*};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_contents)
        .service(create_content)
        .service(update_content)
        .service(delete_content)
        .service(reorder_contents);
}

/// Caps text form fields well below the upload limit.
const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

/// One content slot with its item resolved and rendered.
#[derive(Serialize)]
pub struct ContentDetail {
    pub id: i32,
    pub module_id: i32,
    pub kind: ContentKind,
    pub position: i32,
    pub title: String,
    pub html: String,
}

impl ContentDetail {
    pub(super) fn new(slot: &contents::Model, item: &ContentItem) -> Self {
        Self {
            id: slot.id,
            module_id: slot.module_id,
            kind: slot.kind,
            position: slot.position,
            title: item.title().to_owned(),
            html: item.render(),
        }
    }
}

#[derive(Default)]
struct RawItemForm {
    title: Option<String>,
    body: Option<String>,
    url: Option<String>,
    filename: Option<String>,
}

fn multipart_error(e: actix_multipart::MultipartError) -> Error {
    log::debug!("Malformed multipart payload: {}", e);
    Error::validation("body", "malformed multipart payload")
}

async fn read_text_field(name: &str, field: &mut Field) -> Result<String, Error> {
    let mut data = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
        if data.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
            return Err(Error::validation(name, "value is too long"));
        }
        data.extend_from_slice(&chunk);
    }
    String::from_utf8(data).map_err(|_| Error::validation(name, "value must be UTF-8 text"))
}

/// Buffer an upload, then hand it to the storage backend under a generated
/// name. Image uploads must carry a whitelisted image extension.
async fn store_upload(kind: ContentKind, field: &mut Field) -> Result<String, Error> {
    let original = field
        .content_disposition()
        .get_filename()
        .map(|name| name.to_owned())
        .ok_or_else(|| Error::validation("file", "upload is missing a filename"))?;

    if kind == ContentKind::Image {
        let recognized = storage::sanitize_extension(&original)
            .map(|ext| storage::is_image_extension(&ext))
            .unwrap_or(false);
        if !recognized {
            return Err(Error::validation("file", "not a recognized image format"));
        }
    }

    let max_bytes = crate::app_config::limits().max_upload_size_mb as usize * 1024 * 1024;
    let mut data = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
        if data.len() + chunk.len() > max_bytes {
            return Err(Error::validation("file", "upload exceeds the size limit"));
        }
        data.extend_from_slice(&chunk);
    }
    if data.is_empty() {
        return Err(Error::validation("file", "upload is empty"));
    }

    let filename = storage::generate_filename(&original);
    storage::backend().put_object(data, &filename).await?;
    Ok(filename)
}

async fn parse_item_form(kind: ContentKind, mut payload: Multipart) -> Result<ItemPayload, Error> {
    let mut raw = RawItemForm::default();
    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        let name = field.name().to_owned();
        match name.as_str() {
            "title" => raw.title = Some(read_text_field("title", &mut field).await?),
            "body" => raw.body = Some(read_text_field("body", &mut field).await?),
            "url" => raw.url = Some(read_text_field("url", &mut field).await?),
            "file" => raw.filename = Some(store_upload(kind, &mut field).await?),
            other => {
                log::debug!("Ignoring unexpected multipart field {:?}", other);
                while field.try_next().await.map_err(multipart_error)?.is_some() {}
            }
        }
    }
    build_payload(kind, raw)
}

/// Shape the raw form fields into the payload for `kind`. A missing upload is
/// allowed here so updates can keep the stored file; creates reject it when
/// the item is written.
fn build_payload(kind: ContentKind, raw: RawItemForm) -> Result<ItemPayload, Error> {
    let title = match raw.title {
        Some(t) if !t.trim().is_empty() => t,
        _ => return Err(Error::validation("title", "cannot be empty")),
    };
    let limits = crate::app_config::limits();
    if title.chars().count() > limits.max_title_length as usize {
        return Err(Error::validation("title", "title is too long"));
    }

    match kind {
        ContentKind::Text => {
            let body = raw
                .body
                .filter(|b| !b.trim().is_empty())
                .ok_or_else(|| Error::validation("body", "cannot be empty"))?;
            Ok(ItemPayload::Text { title, body })
        }
        ContentKind::Video => {
            let url = raw
                .url
                .ok_or_else(|| Error::validation("url", "cannot be empty"))?;
            if !validator::validate_url(url.as_str()) {
                return Err(Error::validation("url", "must be a valid URL"));
            }
            Ok(ItemPayload::Video { title, url })
        }
        ContentKind::Image => Ok(ItemPayload::Image {
            title,
            filename: raw.filename,
        }),
        ContentKind::File => Ok(ItemPayload::File {
            title,
            filename: raw.filename,
        }),
    }
}

#[get("/manage/modules/{module_id}/contents")]
async fn view_contents(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    let owner_id = client.require_instructor()?;
    let db = get_db_pool();

    let module = crate::courses::find_owned_module(db, owner_id, path.into_inner()).await?;
    let slots = crate::content::list_slots(db, module.id).await?;
    let details: Vec<ContentDetail> = slots
        .iter()
        .map(|(slot, item)| ContentDetail::new(slot, item))
        .collect();
    Ok(HttpResponse::Ok().json(json!({
        "module": module,
        "contents": details,
    })))
}

#[post("/manage/modules/{module_id}/contents/{kind}")]
async fn create_content(
    client: ClientCtx,
    path: web::Path<(i32, String)>,
    payload: Multipart,
) -> Result<HttpResponse, Error> {
    let owner_id = client.require_instructor()?;
    let (module_id, kind) = path.into_inner();
    let kind = ContentKind::parse(&kind).ok_or(Error::NotFound("content kind"))?;

    let item = parse_item_form(kind, payload).await?;
    let (slot, item) =
        crate::content::create_slot(get_db_pool(), owner_id, module_id, &item).await?;
    Ok(HttpResponse::Created().json(ContentDetail::new(&slot, &item)))
}

#[patch("/manage/modules/{module_id}/contents/{kind}/{item_id}")]
async fn update_content(
    client: ClientCtx,
    path: web::Path<(i32, String, i32)>,
    payload: Multipart,
) -> Result<HttpResponse, Error> {
    let owner_id = client.require_instructor()?;
    let (module_id, kind, item_id) = path.into_inner();
    let kind = ContentKind::parse(&kind).ok_or(Error::NotFound("content kind"))?;
    let db = get_db_pool();

    crate::courses::find_owned_module(db, owner_id, module_id).await?;

    // The slot anchors the item to this module; an item edited through a
    // module it does not sit in is treated as missing.
    let slot = contents::Entity::find()
        .filter(contents::Column::ModuleId.eq(module_id))
        .filter(contents::Column::Kind.eq(kind))
        .filter(contents::Column::ItemId.eq(item_id))
        .one(db)
        .await?
        .ok_or(Error::NotFound("content"))?;

    let payload = parse_item_form(kind, payload).await?;
    let item = crate::content::update_item(db, owner_id, kind, item_id, &payload).await?;
    Ok(HttpResponse::Ok().json(ContentDetail::new(&slot, &item)))
}

#[delete("/manage/contents/{content_id}")]
async fn delete_content(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    let owner_id = client.require_instructor()?;
    crate::content::delete_slot(get_db_pool(), owner_id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Persist the slot order inside a module, as a map of content id to
/// position.
#[post("/manage/contents/order")]
async fn reorder_contents(
    client: ClientCtx,
    body: web::Json<HashMap<String, i32>>,
) -> Result<HttpResponse, Error> {
    let owner_id = client.require_instructor()?;
    let order = super::courses::parse_order(body.into_inner())?;
    crate::courses::reorder_contents(get_db_pool(), owner_id, &order).await?;
    Ok(HttpResponse::Ok().json(json!({ "saved": "OK" })))
}
