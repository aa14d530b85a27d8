//! Integration tests for drag-and-drop reordering

mod common;

use common::{database::*, fixtures::*};
use sea_orm::EntityTrait;

#[actix_rt::test]
async fn test_reorder_modules_applies_batch() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    let instructor = create_instructor(&db, "reorder_owner")
        .await
        .expect("Failed to create instructor");
    let subject = create_subject(&db, "History", "history")
        .await
        .expect("Failed to create subject");
    let course = create_course(&db, instructor.id, subject.id, "Rome", "rome")
        .await
        .expect("Failed to create course");

    let kingdom = create_module(&db, course.id, "Kingdom")
        .await
        .expect("Failed to create module");
    let republic = create_module(&db, course.id, "Republic")
        .await
        .expect("Failed to create module");
    let empire = create_module(&db, course.id, "Empire")
        .await
        .expect("Failed to create module");

    // Reverse the order the frontend would send after a drag
    lectern::courses::reorder_modules(
        &db,
        instructor.id,
        &[(empire.id, 0), (republic.id, 1), (kingdom.id, 2)],
    )
    .await
    .expect("Failed to reorder modules");

    let listed = lectern::courses::list_modules(&db, course.id)
        .await
        .expect("Failed to list modules");
    let ids: Vec<i32> = listed.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![empire.id, republic.id, kingdom.id]);
}

#[actix_rt::test]
async fn test_reorder_modules_skips_foreign_rows() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    use lectern::orm::modules;

    let owner = create_instructor(&db, "reorder_scoped_owner")
        .await
        .expect("Failed to create instructor");
    let other = create_instructor(&db, "reorder_scoped_other")
        .await
        .expect("Failed to create instructor");
    let subject = create_subject(&db, "History", "history")
        .await
        .expect("Failed to create subject");

    let own_course = create_course(&db, owner.id, subject.id, "Rome", "rome")
        .await
        .expect("Failed to create course");
    let foreign_course = create_course(&db, other.id, subject.id, "Greece", "greece")
        .await
        .expect("Failed to create course");

    let own_module = create_module(&db, own_course.id, "Kingdom")
        .await
        .expect("Failed to create module");
    let foreign_module = create_module(&db, foreign_course.id, "Sparta")
        .await
        .expect("Failed to create module");

    // Both ids in one batch; only the owned one may move
    lectern::courses::reorder_modules(&db, owner.id, &[(own_module.id, 5), (foreign_module.id, 9)])
        .await
        .expect("Reorder should not fail on foreign ids");

    let own_row = modules::Entity::find_by_id(own_module.id)
        .one(&db)
        .await
        .expect("Failed to query")
        .expect("Module should exist");
    let foreign_row = modules::Entity::find_by_id(foreign_module.id)
        .one(&db)
        .await
        .expect("Failed to query")
        .expect("Module should exist");

    assert_eq!(own_row.position, 5);
    assert_eq!(foreign_row.position, 0, "Foreign rows stay untouched");
}

#[actix_rt::test]
async fn test_reorder_modules_with_unknown_ids_is_a_noop() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    let instructor = create_instructor(&db, "reorder_unknown")
        .await
        .expect("Failed to create instructor");

    lectern::courses::reorder_modules(&db, instructor.id, &[(9999, 0), (10000, 1)])
        .await
        .expect("Unknown ids should be skipped silently");
}

#[actix_rt::test]
async fn test_reorder_contents_applies_batch_within_owned_modules() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    use lectern::orm::contents;

    let owner = create_instructor(&db, "reorder_contents_owner")
        .await
        .expect("Failed to create instructor");
    let other = create_instructor(&db, "reorder_contents_other")
        .await
        .expect("Failed to create instructor");
    let subject = create_subject(&db, "History", "history")
        .await
        .expect("Failed to create subject");

    let own_course = create_course(&db, owner.id, subject.id, "Rome", "rome")
        .await
        .expect("Failed to create course");
    let foreign_course = create_course(&db, other.id, subject.id, "Greece", "greece")
        .await
        .expect("Failed to create course");
    let own_module = create_module(&db, own_course.id, "Kingdom")
        .await
        .expect("Failed to create module");
    let foreign_module = create_module(&db, foreign_course.id, "Sparta")
        .await
        .expect("Failed to create module");

    let (first, _) = create_text_content(&db, owner.id, own_module.id, "One", "First.")
        .await
        .expect("Failed to create content");
    let (second, _) = create_text_content(&db, owner.id, own_module.id, "Two", "Second.")
        .await
        .expect("Failed to create content");
    let (foreign, _) = create_text_content(&db, other.id, foreign_module.id, "Theirs", "Nope.")
        .await
        .expect("Failed to create content");

    lectern::courses::reorder_contents(
        &db,
        owner.id,
        &[(first.id, 1), (second.id, 0), (foreign.id, 7)],
    )
    .await
    .expect("Failed to reorder contents");

    let slots = lectern::content::list_slots(&db, own_module.id)
        .await
        .expect("Failed to list contents");
    let ids: Vec<i32> = slots.iter().map(|(slot, _)| slot.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    let foreign_row = contents::Entity::find_by_id(foreign.id)
        .one(&db)
        .await
        .expect("Failed to query")
        .expect("Slot should exist");
    assert_eq!(foreign_row.position, 0, "Foreign slots stay untouched");
}

#[actix_rt::test]
async fn test_reorder_is_idempotent() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    let instructor = create_instructor(&db, "reorder_repeat")
        .await
        .expect("Failed to create instructor");
    let subject = create_subject(&db, "History", "history")
        .await
        .expect("Failed to create subject");
    let course = create_course(&db, instructor.id, subject.id, "Rome", "rome")
        .await
        .expect("Failed to create course");
    let a = create_module(&db, course.id, "A")
        .await
        .expect("Failed to create module");
    let b = create_module(&db, course.id, "B")
        .await
        .expect("Failed to create module");

    let order = [(a.id, 1), (b.id, 0)];
    for _ in 0..2 {
        lectern::courses::reorder_modules(&db, instructor.id, &order)
            .await
            .expect("Failed to reorder modules");
    }

    let listed = lectern::courses::list_modules(&db, course.id)
        .await
        .expect("Failed to list modules");
    let ids: Vec<i32> = listed.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![b.id, a.id]);
}
