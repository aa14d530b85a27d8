//! Polymorphic course content.
//!
//! A content slot stores a `(kind, item_id)` pair instead of a database-level
//! foreign key, so resolution goes through [`load_item`], which dispatches on
//! the closed [`ContentKind`] set. The slot owns the aggregation: deleting it
//! deletes the referenced item first and the slot row second.

use crate::error::Error;
use crate::orm::contents::ContentKind;
use crate::orm::{contents, files, images, texts, videos};
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};
use std::borrow::Cow;

/// One concrete item a content slot can point at.
#[derive(Clone, Debug)]
pub enum ContentItem {
    Text(texts::Model),
    Video(videos::Model),
    Image(images::Model),
    File(files::Model),
}

/// Validated input for creating or updating an item. The file variants carry
/// the stored filename of an already written upload, or `None` on updates
/// that keep the current file.
#[derive(Clone, Debug)]
pub enum ItemPayload {
    Text { title: String, body: String },
    Video { title: String, url: String },
    Image { title: String, filename: Option<String> },
    File { title: String, filename: Option<String> },
}

/// Items that can render themselves as an HTML fragment for the course player.
pub trait Render {
    fn render(&self) -> String;
}

const ESCAPED: &[char] = &['&', '<', '>', '"', '\''];

/// Minimal HTML escaping for text interpolated into rendered fragments.
pub fn escape_html(input: &str) -> Cow<'_, str> {
    if !input.contains(ESCAPED) {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Renders plain text as HTML: blank lines split paragraphs, single newlines
/// become line breaks.
fn linebreaks(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let mut out = String::with_capacity(text.len() + 16);
    for (i, paragraph) in text
        .split("\n\n")
        .filter(|p| !p.trim().is_empty())
        .enumerate()
    {
        if i > 0 {
            out.push('\n');
        }
        out.push_str("<p>");
        out.push_str(&escape_html(paragraph.trim()).replace('\n', "<br>"));
        out.push_str("</p>");
    }
    out
}

impl Render for texts::Model {
    fn render(&self) -> String {
        linebreaks(&self.body)
    }
}

impl Render for videos::Model {
    fn render(&self) -> String {
        format!(
            r#"<iframe src="{}" frameborder="0" allowfullscreen></iframe>"#,
            escape_html(&self.url)
        )
    }
}

impl Render for images::Model {
    fn render(&self) -> String {
        format!(
            r#"<img src="{}/{}" alt="{}">"#,
            crate::app_config::storage().media_url,
            crate::storage::url_path(&self.filename),
            escape_html(&self.title)
        )
    }
}

impl Render for files::Model {
    fn render(&self) -> String {
        format!(
            r#"<a href="{}/{}" download>{}</a>"#,
            crate::app_config::storage().media_url,
            crate::storage::url_path(&self.filename),
            escape_html(&self.title)
        )
    }
}

impl Render for ContentItem {
    fn render(&self) -> String {
        match self {
            ContentItem::Text(m) => m.render(),
            ContentItem::Video(m) => m.render(),
            ContentItem::Image(m) => m.render(),
            ContentItem::File(m) => m.render(),
        }
    }
}

impl ContentItem {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentItem::Text(_) => ContentKind::Text,
            ContentItem::Video(_) => ContentKind::Video,
            ContentItem::Image(_) => ContentKind::Image,
            ContentItem::File(_) => ContentKind::File,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ContentItem::Text(m) => &m.title,
            ContentItem::Video(m) => &m.title,
            ContentItem::Image(m) => &m.title,
            ContentItem::File(m) => &m.title,
        }
    }

    pub fn owner_id(&self) -> i32 {
        match self {
            ContentItem::Text(m) => m.owner_id,
            ContentItem::Video(m) => m.owner_id,
            ContentItem::Image(m) => m.owner_id,
            ContentItem::File(m) => m.owner_id,
        }
    }
}

impl ItemPayload {
    pub fn kind(&self) -> ContentKind {
        match self {
            ItemPayload::Text { .. } => ContentKind::Text,
            ItemPayload::Video { .. } => ContentKind::Video,
            ItemPayload::Image { .. } => ContentKind::Image,
            ItemPayload::File { .. } => ContentKind::File,
        }
    }
}

/// Load the item a slot points at. A missing row surfaces as `NotFound`, the
/// same as a slot that never existed.
pub async fn load_item(
    db: &DatabaseConnection,
    kind: ContentKind,
    item_id: i32,
) -> Result<ContentItem, Error> {
    let item = match kind {
        ContentKind::Text => texts::Entity::find_by_id(item_id)
            .one(db)
            .await?
            .map(ContentItem::Text),
        ContentKind::Video => videos::Entity::find_by_id(item_id)
            .one(db)
            .await?
            .map(ContentItem::Video),
        ContentKind::Image => images::Entity::find_by_id(item_id)
            .one(db)
            .await?
            .map(ContentItem::Image),
        ContentKind::File => files::Entity::find_by_id(item_id)
            .one(db)
            .await?
            .map(ContentItem::File),
    };
    item.ok_or(Error::NotFound("content item"))
}

/// Create a concrete item owned by `owner_id` and return its id.
async fn create_item(
    db: &DatabaseConnection,
    owner_id: i32,
    payload: &ItemPayload,
) -> Result<i32, Error> {
    match payload {
        ItemPayload::Text { title, body } => {
            let item = texts::ActiveModel {
                owner_id: Set(owner_id),
                title: Set(title.clone()),
                body: Set(body.clone()),
                ..Default::default()
            }
            .insert(db)
            .await?;
            Ok(item.id)
        }
        ItemPayload::Video { title, url } => {
            let item = videos::ActiveModel {
                owner_id: Set(owner_id),
                title: Set(title.clone()),
                url: Set(url.clone()),
                ..Default::default()
            }
            .insert(db)
            .await?;
            Ok(item.id)
        }
        ItemPayload::Image { title, filename } => {
            let filename = filename
                .as_ref()
                .ok_or_else(|| Error::validation("file", "an image upload is required"))?;
            let item = images::ActiveModel {
                owner_id: Set(owner_id),
                title: Set(title.clone()),
                filename: Set(filename.clone()),
                ..Default::default()
            }
            .insert(db)
            .await?;
            Ok(item.id)
        }
        ItemPayload::File { title, filename } => {
            let filename = filename
                .as_ref()
                .ok_or_else(|| Error::validation("file", "a file upload is required"))?;
            let item = files::ActiveModel {
                owner_id: Set(owner_id),
                title: Set(title.clone()),
                filename: Set(filename.clone()),
                ..Default::default()
            }
            .insert(db)
            .await?;
            Ok(item.id)
        }
    }
}

/// Apply a payload to an existing item. The payload kind must match the
/// item's table; ownership mismatches surface as `NotFound`.
pub async fn update_item(
    db: &DatabaseConnection,
    owner_id: i32,
    kind: ContentKind,
    item_id: i32,
    payload: &ItemPayload,
) -> Result<ContentItem, Error> {
    if payload.kind() != kind {
        return Err(Error::validation("kind", "payload does not match content kind"));
    }

    let current = load_item(db, kind, item_id).await?;
    if current.owner_id() != owner_id {
        return Err(Error::NotFound("content item"));
    }

    let updated = match (current, payload) {
        (ContentItem::Text(m), ItemPayload::Text { title, body }) => {
            let mut am: texts::ActiveModel = m.into();
            am.title = Set(title.clone());
            am.body = Set(body.clone());
            ContentItem::Text(am.update(db).await?)
        }
        (ContentItem::Video(m), ItemPayload::Video { title, url }) => {
            let mut am: videos::ActiveModel = m.into();
            am.title = Set(title.clone());
            am.url = Set(url.clone());
            ContentItem::Video(am.update(db).await?)
        }
        (ContentItem::Image(m), ItemPayload::Image { title, filename }) => {
            let mut am: images::ActiveModel = m.into();
            am.title = Set(title.clone());
            if let Some(filename) = filename {
                am.filename = Set(filename.clone());
            }
            ContentItem::Image(am.update(db).await?)
        }
        (ContentItem::File(m), ItemPayload::File { title, filename }) => {
            let mut am: files::ActiveModel = m.into();
            am.title = Set(title.clone());
            if let Some(filename) = filename {
                am.filename = Set(filename.clone());
            }
            ContentItem::File(am.update(db).await?)
        }
        // Kinds were checked above
        _ => return Err(Error::validation("kind", "payload does not match content kind")),
    };

    Ok(updated)
}

/// Delete the item a slot points at. A dangling reference is tolerated so a
/// broken slot can still be removed.
async fn delete_item(db: &DatabaseConnection, kind: ContentKind, item_id: i32) -> Result<(), Error> {
    let result = match kind {
        ContentKind::Text => texts::Entity::delete_by_id(item_id).exec(db).await?,
        ContentKind::Video => videos::Entity::delete_by_id(item_id).exec(db).await?,
        ContentKind::Image => images::Entity::delete_by_id(item_id).exec(db).await?,
        ContentKind::File => files::Entity::delete_by_id(item_id).exec(db).await?,
    };
    if result.rows_affected == 0 {
        log::warn!("content slot pointed at missing {} item {}", kind.as_str(), item_id);
    }
    Ok(())
}

/// Create an item and the slot pointing at it, appended to the module's
/// content order.
pub async fn create_slot(
    db: &DatabaseConnection,
    owner_id: i32,
    module_id: i32,
    payload: &ItemPayload,
) -> Result<(contents::Model, ContentItem), Error> {
    let module = crate::courses::find_owned_module(db, owner_id, module_id).await?;
    let item_id = create_item(db, owner_id, payload).await?;

    let slot = contents::ActiveModel {
        module_id: Set(module.id),
        kind: Set(payload.kind()),
        item_id: Set(item_id),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let item = load_item(db, slot.kind, slot.item_id).await?;
    log::info!(
        "Created {} content {} in module {}",
        slot.kind.as_str(),
        slot.id,
        module.id
    );
    Ok((slot, item))
}

/// Delete a slot and the item it points at. Item first, slot second.
pub async fn delete_slot(
    db: &DatabaseConnection,
    owner_id: i32,
    content_id: i32,
) -> Result<(), Error> {
    let slot = find_owned_slot(db, owner_id, content_id).await?;

    delete_item(db, slot.kind, slot.item_id).await?;
    contents::Entity::delete_by_id(slot.id).exec(db).await?;

    log::info!("Deleted {} content {}", slot.kind.as_str(), slot.id);
    Ok(())
}

/// Find a slot whose module belongs to a course owned by `owner_id`.
pub async fn find_owned_slot(
    db: &DatabaseConnection,
    owner_id: i32,
    content_id: i32,
) -> Result<contents::Model, Error> {
    let slot = contents::Entity::find_by_id(content_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound("content"))?;

    // Ownership is checked through the module's course
    crate::courses::find_owned_module(db, owner_id, slot.module_id).await?;
    Ok(slot)
}

/// Slots of a module in display order, with their items resolved.
pub async fn list_slots(
    db: &DatabaseConnection,
    module_id: i32,
) -> Result<Vec<(contents::Model, ContentItem)>, Error> {
    let slots = contents::Entity::find()
        .filter(contents::Column::ModuleId.eq(module_id))
        .order_by_asc(contents::Column::Position)
        .order_by_asc(contents::Column::Id)
        .all(db)
        .await?;

    let mut out = Vec::with_capacity(slots.len());
    for slot in slots {
        let item = load_item(db, slot.kind, slot.item_id).await?;
        out.push((slot, item));
    }
    Ok(out)
}
