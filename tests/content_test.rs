//! Integration tests for polymorphic module content

mod common;

use common::{database::*, fixtures::*};
use lectern::content::{self, ItemPayload};
use lectern::error::Error;
use lectern::orm::contents::ContentKind;
use sea_orm::EntityTrait;

#[actix_rt::test]
async fn test_create_slot_appends_mixed_kinds() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    let instructor = create_instructor(&db, "content_owner")
        .await
        .expect("Failed to create instructor");
    let subject = create_subject(&db, "Programming", "programming")
        .await
        .expect("Failed to create subject");
    let course = create_course(&db, instructor.id, subject.id, "Rust 101", "rust-101")
        .await
        .expect("Failed to create course");
    let module = create_module(&db, course.id, "Getting started")
        .await
        .expect("Failed to create module");

    let (text_slot, text_item) = content::create_slot(
        &db,
        instructor.id,
        module.id,
        &ItemPayload::Text {
            title: "Intro".to_string(),
            body: "Welcome aboard.".to_string(),
        },
    )
    .await
    .expect("Failed to create text content");

    let (video_slot, video_item) = content::create_slot(
        &db,
        instructor.id,
        module.id,
        &ItemPayload::Video {
            title: "Walkthrough".to_string(),
            url: "https://example.com/walkthrough.mp4".to_string(),
        },
    )
    .await
    .expect("Failed to create video content");

    assert_eq!(text_slot.position, 0);
    assert_eq!(text_slot.kind, ContentKind::Text);
    assert_eq!(text_item.title(), "Intro");

    assert_eq!(video_slot.position, 1);
    assert_eq!(video_slot.kind, ContentKind::Video);
    assert_eq!(video_item.title(), "Walkthrough");
}

#[actix_rt::test]
async fn test_create_slot_rejects_foreign_module() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    let owner = create_instructor(&db, "content_owner2")
        .await
        .expect("Failed to create instructor");
    let outsider = create_instructor(&db, "content_outsider")
        .await
        .expect("Failed to create instructor");
    let subject = create_subject(&db, "Programming", "programming")
        .await
        .expect("Failed to create subject");
    let course = create_course(&db, owner.id, subject.id, "Rust 101", "rust-101")
        .await
        .expect("Failed to create course");
    let module = create_module(&db, course.id, "Getting started")
        .await
        .expect("Failed to create module");

    let err = content::create_slot(
        &db,
        outsider.id,
        module.id,
        &ItemPayload::Text {
            title: "Intruder".to_string(),
            body: "Should not land.".to_string(),
        },
    )
    .await
    .expect_err("Foreign module should be rejected");

    assert!(matches!(err, Error::NotFound(_)));
}

#[actix_rt::test]
async fn test_image_requires_an_upload_on_create() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    let instructor = create_instructor(&db, "content_image")
        .await
        .expect("Failed to create instructor");
    let subject = create_subject(&db, "Art", "art")
        .await
        .expect("Failed to create subject");
    let course = create_course(&db, instructor.id, subject.id, "Sketching", "sketching")
        .await
        .expect("Failed to create course");
    let module = create_module(&db, course.id, "Materials")
        .await
        .expect("Failed to create module");

    // None is only valid on updates that keep the current file
    let err = content::create_slot(
        &db,
        instructor.id,
        module.id,
        &ItemPayload::Image {
            title: "Paper types".to_string(),
            filename: None,
        },
    )
    .await
    .expect_err("Image without a file should be rejected");

    assert!(matches!(err, Error::Validation(_)));
}

#[actix_rt::test]
async fn test_delete_slot_removes_item_and_slot() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    use lectern::orm::{contents, texts};

    let instructor = create_instructor(&db, "content_delete")
        .await
        .expect("Failed to create instructor");
    let subject = create_subject(&db, "Programming", "programming")
        .await
        .expect("Failed to create subject");
    let course = create_course(&db, instructor.id, subject.id, "Rust 101", "rust-101")
        .await
        .expect("Failed to create course");
    let module = create_module(&db, course.id, "Getting started")
        .await
        .expect("Failed to create module");

    let (slot, item) = content::create_slot(
        &db,
        instructor.id,
        module.id,
        &ItemPayload::Text {
            title: "Doomed".to_string(),
            body: "Gone soon.".to_string(),
        },
    )
    .await
    .expect("Failed to create content");

    let item_id = match item {
        content::ContentItem::Text(m) => m.id,
        other => panic!("Expected a text item, got {:?}", other),
    };

    content::delete_slot(&db, instructor.id, slot.id)
        .await
        .expect("Failed to delete content");

    let slot_row = contents::Entity::find_by_id(slot.id)
        .one(&db)
        .await
        .expect("Failed to query");
    assert!(slot_row.is_none(), "Slot should be deleted");

    let item_row = texts::Entity::find_by_id(item_id)
        .one(&db)
        .await
        .expect("Failed to query");
    assert!(item_row.is_none(), "Item should be deleted with its slot");
}

#[actix_rt::test]
async fn test_delete_slot_checks_ownership() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    let owner = create_instructor(&db, "content_delete_owner")
        .await
        .expect("Failed to create instructor");
    let outsider = create_instructor(&db, "content_delete_outsider")
        .await
        .expect("Failed to create instructor");
    let subject = create_subject(&db, "Programming", "programming")
        .await
        .expect("Failed to create subject");
    let course = create_course(&db, owner.id, subject.id, "Rust 101", "rust-101")
        .await
        .expect("Failed to create course");
    let module = create_module(&db, course.id, "Getting started")
        .await
        .expect("Failed to create module");
    let (slot, _) = create_text_content(&db, owner.id, module.id, "Private", "Hands off.")
        .await
        .expect("Failed to create content");

    let err = content::delete_slot(&db, outsider.id, slot.id)
        .await
        .expect_err("Foreign slot should be rejected");
    assert!(matches!(err, Error::NotFound(_)));
}

#[actix_rt::test]
async fn test_list_slots_resolves_items_in_order() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    let instructor = create_instructor(&db, "content_list")
        .await
        .expect("Failed to create instructor");
    let subject = create_subject(&db, "Programming", "programming")
        .await
        .expect("Failed to create subject");
    let course = create_course(&db, instructor.id, subject.id, "Rust 101", "rust-101")
        .await
        .expect("Failed to create course");
    let module = create_module(&db, course.id, "Getting started")
        .await
        .expect("Failed to create module");

    content::create_slot(
        &db,
        instructor.id,
        module.id,
        &ItemPayload::Text {
            title: "Read me".to_string(),
            body: "Start here.".to_string(),
        },
    )
    .await
    .expect("Failed to create text content");
    content::create_slot(
        &db,
        instructor.id,
        module.id,
        &ItemPayload::Video {
            title: "Watch me".to_string(),
            url: "https://example.com/intro.mp4".to_string(),
        },
    )
    .await
    .expect("Failed to create video content");

    let slots = content::list_slots(&db, module.id)
        .await
        .expect("Failed to list contents");

    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].0.kind, ContentKind::Text);
    assert_eq!(slots[0].1.title(), "Read me");
    assert_eq!(slots[1].0.kind, ContentKind::Video);
    assert_eq!(slots[1].1.title(), "Watch me");
}

#[actix_rt::test]
async fn test_dangling_item_surfaces_but_slot_stays_removable() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    use lectern::orm::{contents, texts};

    let instructor = create_instructor(&db, "content_dangling")
        .await
        .expect("Failed to create instructor");
    let subject = create_subject(&db, "Programming", "programming")
        .await
        .expect("Failed to create subject");
    let course = create_course(&db, instructor.id, subject.id, "Rust 101", "rust-101")
        .await
        .expect("Failed to create course");
    let module = create_module(&db, course.id, "Getting started")
        .await
        .expect("Failed to create module");
    let (slot, item) = create_text_content(&db, instructor.id, module.id, "Flaky", "Soon gone.")
        .await
        .expect("Failed to create content");

    // Break the reference behind the slot's back
    texts::Entity::delete_by_id(item.id)
        .exec(&db)
        .await
        .expect("Failed to delete item row");

    let err = content::list_slots(&db, module.id)
        .await
        .expect_err("Dangling reference should surface");
    assert!(matches!(err, Error::NotFound(_)));

    // The broken slot can still be cleaned up
    content::delete_slot(&db, instructor.id, slot.id)
        .await
        .expect("Broken slot should still be removable");

    let slot_row = contents::Entity::find_by_id(slot.id)
        .one(&db)
        .await
        .expect("Failed to query");
    assert!(slot_row.is_none());
}

#[actix_rt::test]
async fn test_update_item_applies_changes() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    let instructor = create_instructor(&db, "content_update")
        .await
        .expect("Failed to create instructor");
    let subject = create_subject(&db, "Programming", "programming")
        .await
        .expect("Failed to create subject");
    let course = create_course(&db, instructor.id, subject.id, "Rust 101", "rust-101")
        .await
        .expect("Failed to create course");
    let module = create_module(&db, course.id, "Getting started")
        .await
        .expect("Failed to create module");
    let (_, item) = create_text_content(&db, instructor.id, module.id, "Draft", "First pass.")
        .await
        .expect("Failed to create content");

    let updated = content::update_item(
        &db,
        instructor.id,
        ContentKind::Text,
        item.id,
        &ItemPayload::Text {
            title: "Final".to_string(),
            body: "Second pass.".to_string(),
        },
    )
    .await
    .expect("Failed to update item");

    assert_eq!(updated.title(), "Final");
    match updated {
        content::ContentItem::Text(m) => {
            assert_eq!(m.id, item.id);
            assert_eq!(m.body, "Second pass.");
        }
        other => panic!("Expected a text item, got {:?}", other),
    }
}

#[actix_rt::test]
async fn test_update_item_rejects_kind_mismatch_and_foreign_owner() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    let owner = create_instructor(&db, "content_update_owner")
        .await
        .expect("Failed to create instructor");
    let outsider = create_instructor(&db, "content_update_outsider")
        .await
        .expect("Failed to create instructor");
    let subject = create_subject(&db, "Programming", "programming")
        .await
        .expect("Failed to create subject");
    let course = create_course(&db, owner.id, subject.id, "Rust 101", "rust-101")
        .await
        .expect("Failed to create course");
    let module = create_module(&db, course.id, "Getting started")
        .await
        .expect("Failed to create module");
    let (_, item) = create_text_content(&db, owner.id, module.id, "Locked", "Mine.")
        .await
        .expect("Failed to create content");

    let video_payload = ItemPayload::Video {
        title: "Wrong shape".to_string(),
        url: "https://example.com/nope.mp4".to_string(),
    };
    let err = content::update_item(&db, owner.id, ContentKind::Text, item.id, &video_payload)
        .await
        .expect_err("Payload kind must match the item's table");
    assert!(matches!(err, Error::Validation(_)));

    let text_payload = ItemPayload::Text {
        title: "Takeover".to_string(),
        body: "Not yours.".to_string(),
    };
    let err = content::update_item(&db, outsider.id, ContentKind::Text, item.id, &text_payload)
        .await
        .expect_err("Foreign items should look missing");
    assert!(matches!(err, Error::NotFound(_)));
}
