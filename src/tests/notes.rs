use std::time::Duration;

use axum::http::StatusCode;
use serde_json::Map;
use serde_json::Value;
use uuid::Uuid;

use crate::tests::helper;

#[tokio::test]
async fn test_create_and_fetch_note() {
    let mut app = helper::setup_test_app();
    let access_token = helper::register(&mut app, "sam").await;

    let note = helper::create_note(
        &mut app,
        &access_token,
        "Groceries",
        "Bread, eggs, milk",
        &[" Errands ", "FOOD"],
    )
    .await;

    assert_eq!("Groceries", note.title);
    assert_eq!("Bread, eggs, milk", note.content);
    assert_eq!(vec!["errands".to_string(), "food".to_string()], note.tags);
    assert!(!note.is_favorite);

    let (status_code, fetched, _) = helper::single_note(&mut app, &access_token, &note.id).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!(note, fetched.unwrap());
}

#[tokio::test]
async fn test_create_note_trims_title() {
    let mut app = helper::setup_test_app();
    let access_token = helper::register(&mut app, "sam").await;

    let note = helper::create_note(&mut app, &access_token, "  Padded  ", "content", &[]).await;

    assert_eq!("Padded", note.title);
}

#[tokio::test]
async fn test_create_note_without_title() {
    let mut app = helper::setup_test_app();
    let access_token = helper::register(&mut app, "sam").await;

    let mut payload = Map::new();
    payload.insert(
        "content".to_string(),
        Value::String("some content".to_string()),
    );

    let (status_code, _, error) =
        helper::maybe_create_note_with_payload(&mut app, &access_token, payload).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);

    let error = error.unwrap();
    assert_eq!("Validation failed", error.message);
    assert!(error.errors.contains(&helper::FieldError {
        field: "title".to_string(),
        message: "Title is required".to_string(),
    }));
}

#[tokio::test]
async fn test_create_note_with_blank_title() {
    let mut app = helper::setup_test_app();
    let access_token = helper::register(&mut app, "sam").await;

    let (status_code, _, error) =
        helper::maybe_create_note(&mut app, &access_token, "   ", "some content", &[]).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);

    let error = error.unwrap();
    assert!(error.errors.contains(&helper::FieldError {
        field: "title".to_string(),
        message: "Title is required".to_string(),
    }));
}

#[tokio::test]
async fn test_create_note_with_too_long_title() {
    let mut app = helper::setup_test_app();
    let access_token = helper::register(&mut app, "sam").await;

    let (status_code, _, error) =
        helper::maybe_create_note(&mut app, &access_token, &"x".repeat(201), "content", &[]).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);

    let error = error.unwrap();
    assert!(error.errors.contains(&helper::FieldError {
        field: "title".to_string(),
        message: "Title cannot be more than 200 characters".to_string(),
    }));

    // exactly at the limit is fine
    let note = helper::create_note(&mut app, &access_token, &"x".repeat(200), "content", &[]).await;
    assert_eq!(200, note.title.chars().count());
}

#[tokio::test]
async fn test_create_note_without_content() {
    let mut app = helper::setup_test_app();
    let access_token = helper::register(&mut app, "sam").await;

    let mut payload = Map::new();
    payload.insert("title".to_string(), Value::String("Title".to_string()));

    let (status_code, _, error) =
        helper::maybe_create_note_with_payload(&mut app, &access_token, payload).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);

    let error = error.unwrap();
    assert!(error.errors.contains(&helper::FieldError {
        field: "content".to_string(),
        message: "Content is required".to_string(),
    }));
}

#[tokio::test]
async fn test_create_note_reports_every_violation() {
    let mut app = helper::setup_test_app();
    let access_token = helper::register(&mut app, "sam").await;

    let (status_code, _, error) =
        helper::maybe_create_note_with_payload(&mut app, &access_token, Map::new()).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);

    let error = error.unwrap();
    assert_eq!(2, error.errors.len());
}

#[tokio::test]
async fn test_update_note() {
    let mut app = helper::setup_test_app();
    let access_token = helper::register(&mut app, "sam").await;

    let note = helper::create_note(&mut app, &access_token, "Draft", "v1", &["work"]).await;

    let mut payload = Map::new();
    payload.insert("title".to_string(), Value::String("Final".to_string()));
    payload.insert("content".to_string(), Value::String("v2".to_string()));

    let (status_code, updated, _) =
        helper::maybe_update_note(&mut app, &access_token, &note.id, payload).await;
    assert_eq!(StatusCode::OK, status_code);

    let updated = updated.unwrap();
    assert_eq!("Final", updated.title);
    assert_eq!("v2", updated.content);

    // untouched fields are kept
    assert_eq!(vec!["work".to_string()], updated.tags);
    assert!(!updated.is_favorite);
}

#[tokio::test]
async fn test_update_note_flips_favorite() {
    let mut app = helper::setup_test_app();
    let access_token = helper::register(&mut app, "sam").await;

    let note = helper::create_note(&mut app, &access_token, "Starred", "content", &[]).await;

    let mut payload = Map::new();
    payload.insert("isFavorite".to_string(), Value::Bool(true));

    let (status_code, updated, _) =
        helper::maybe_update_note(&mut app, &access_token, &note.id, payload).await;
    assert_eq!(StatusCode::OK, status_code);

    let updated = updated.unwrap();
    assert!(updated.is_favorite);
    assert_eq!("Starred", updated.title);
}

#[tokio::test]
async fn test_update_note_with_blank_title() {
    let mut app = helper::setup_test_app();
    let access_token = helper::register(&mut app, "sam").await;

    let note = helper::create_note(&mut app, &access_token, "Keep me", "content", &[]).await;

    let mut payload = Map::new();
    payload.insert("title".to_string(), Value::String("   ".to_string()));

    let (status_code, _, error) =
        helper::maybe_update_note(&mut app, &access_token, &note.id, payload).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);

    let error = error.unwrap();
    assert!(error.errors.contains(&helper::FieldError {
        field: "title".to_string(),
        message: "Title is required".to_string(),
    }));
}

#[tokio::test]
async fn test_update_note_normalizes_tags() {
    let mut app = helper::setup_test_app();
    let access_token = helper::register(&mut app, "sam").await;

    let note = helper::create_note(&mut app, &access_token, "Tagged", "content", &["old"]).await;

    let mut payload = Map::new();
    payload.insert(
        "tags".to_string(),
        Value::Array(vec![
            Value::String(" New ".to_string()),
            Value::String("TAGS".to_string()),
        ]),
    );

    let (_, updated, _) =
        helper::maybe_update_note(&mut app, &access_token, &note.id, payload).await;

    assert_eq!(
        vec!["new".to_string(), "tags".to_string()],
        updated.unwrap().tags
    );
}

#[tokio::test]
async fn test_update_note_of_another_user() {
    let mut app = helper::setup_test_app();
    let access_token = helper::register(&mut app, "sam").await;
    let other_token = helper::register(&mut app, "alex").await;

    let note = helper::create_note(&mut app, &access_token, "Private", "content", &[]).await;

    let mut payload = Map::new();
    payload.insert("title".to_string(), Value::String("Hijacked".to_string()));

    let (status_code, _, error) =
        helper::maybe_update_note(&mut app, &other_token, &note.id, payload).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!("Note not found", error.unwrap().message);

    // still untouched for the owner
    let (_, fetched, _) = helper::single_note(&mut app, &access_token, &note.id).await;
    assert_eq!("Private", fetched.unwrap().title);
}

#[tokio::test]
async fn test_delete_note() {
    let mut app = helper::setup_test_app();
    let access_token = helper::register(&mut app, "sam").await;

    let note = helper::create_note(&mut app, &access_token, "Temporary", "content", &[]).await;

    let (status_code, message) = helper::maybe_delete_note(&mut app, &access_token, &note.id).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!("Note deleted successfully", message.unwrap());

    let (status_code, _, message) = helper::single_note(&mut app, &access_token, &note.id).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!("Note not found", message.unwrap());

    // deleting again reports the same absence
    let (status_code, _) = helper::maybe_delete_note(&mut app, &access_token, &note.id).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
}

#[tokio::test]
async fn test_delete_note_of_another_user() {
    let mut app = helper::setup_test_app();
    let access_token = helper::register(&mut app, "sam").await;
    let other_token = helper::register(&mut app, "alex").await;

    let note = helper::create_note(&mut app, &access_token, "Private", "content", &[]).await;

    let (status_code, _) = helper::maybe_delete_note(&mut app, &other_token, &note.id).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);

    let (status_code, _, _) = helper::single_note(&mut app, &access_token, &note.id).await;
    assert_eq!(StatusCode::OK, status_code);
}

#[tokio::test]
async fn test_single_note_with_malformed_id() {
    let mut app = helper::setup_test_app();
    let access_token = helper::register(&mut app, "sam").await;

    let (status_code, _, message) =
        helper::single_note_with_str(&mut app, &access_token, "not-a-uuid").await;

    // malformed IDs are indistinguishable from absent records
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!("Not found", message.unwrap());
}

#[tokio::test]
async fn test_single_note_with_unknown_id() {
    let mut app = helper::setup_test_app();
    let access_token = helper::register(&mut app, "sam").await;

    let (status_code, _, message) =
        helper::single_note(&mut app, &access_token, &Uuid::new_v4()).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!("Note not found", message.unwrap());
}

#[tokio::test]
async fn test_list_notes_defaults() {
    let mut app = helper::setup_test_app();
    let access_token = helper::register(&mut app, "sam").await;

    for index in 0..3 {
        helper::create_note(
            &mut app,
            &access_token,
            &format!("Note {index}"),
            "content",
            &[],
        )
        .await;
    }

    let (status_code, notes, pagination) = helper::list_notes(&mut app, &access_token, "").await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!(3, notes.unwrap().len());
    assert_eq!(
        helper::Pagination {
            page: 1,
            limit: 10,
            total: 3,
            pages: 1,
        },
        pagination.unwrap()
    );
}

#[tokio::test]
async fn test_list_notes_empty() {
    let mut app = helper::setup_test_app();
    let access_token = helper::register(&mut app, "sam").await;

    let (status_code, notes, pagination) = helper::list_notes(&mut app, &access_token, "").await;
    assert_eq!(StatusCode::OK, status_code);
    assert!(notes.unwrap().is_empty());
    assert_eq!(
        helper::Pagination {
            page: 1,
            limit: 10,
            total: 0,
            pages: 0,
        },
        pagination.unwrap()
    );
}

#[tokio::test]
async fn test_list_notes_pagination() {
    let mut app = helper::setup_test_app();
    let access_token = helper::register(&mut app, "sam").await;

    for index in 0..12 {
        helper::create_note(
            &mut app,
            &access_token,
            &format!("Note {index}"),
            "content",
            &[],
        )
        .await;
    }

    let (_, notes, pagination) =
        helper::list_notes(&mut app, &access_token, "?page=2&limit=5").await;
    assert_eq!(5, notes.unwrap().len());
    assert_eq!(
        helper::Pagination {
            page: 2,
            limit: 5,
            total: 12,
            pages: 3,
        },
        pagination.unwrap()
    );

    // a page past the end is empty, the totals stay
    let (_, notes, pagination) =
        helper::list_notes(&mut app, &access_token, "?page=4&limit=5").await;
    assert!(notes.unwrap().is_empty());
    assert_eq!(12, pagination.unwrap().total);
}

#[tokio::test]
async fn test_list_notes_newest_first() {
    let mut app = helper::setup_test_app();
    let access_token = helper::register(&mut app, "sam").await;

    helper::create_note(&mut app, &access_token, "First", "content", &[]).await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    helper::create_note(&mut app, &access_token, "Second", "content", &[]).await;

    let (_, notes, _) = helper::list_notes(&mut app, &access_token, "").await;

    let notes = notes.unwrap();
    assert_eq!("Second", notes[0].title);
    assert_eq!("First", notes[1].title);
}

#[tokio::test]
async fn test_list_notes_clamps_limit() {
    let mut app = helper::setup_test_app();
    let access_token = helper::register(&mut app, "sam").await;

    let (status_code, _, pagination) =
        helper::list_notes(&mut app, &access_token, "?limit=500").await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!(100, pagination.unwrap().limit);

    // a zero page is bumped to the first
    let (_, _, pagination) = helper::list_notes(&mut app, &access_token, "?page=0").await;
    assert_eq!(1, pagination.unwrap().page);
}

#[tokio::test]
async fn test_list_notes_with_search() {
    let mut app = helper::setup_test_app();
    let access_token = helper::register(&mut app, "sam").await;

    helper::create_note(
        &mut app,
        &access_token,
        "Meeting agenda",
        "quarterly planning",
        &[],
    )
    .await;
    helper::create_note(&mut app, &access_token, "Groceries", "remember the milk", &[]).await;

    // case-insensitive match on the title
    let (_, notes, pagination) = helper::list_notes(&mut app, &access_token, "?q=MEETING").await;
    assert_eq!(1, pagination.unwrap().total);
    assert_eq!("Meeting agenda", notes.unwrap()[0].title);

    // match on the content
    let (_, notes, _) = helper::list_notes(&mut app, &access_token, "?q=milk").await;
    assert_eq!("Groceries", notes.unwrap()[0].title);

    let (_, notes, _) = helper::list_notes(&mut app, &access_token, "?q=nothing-like-this").await;
    assert!(notes.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_notes_with_tag_filter() {
    let mut app = helper::setup_test_app();
    let access_token = helper::register(&mut app, "sam").await;

    helper::create_note(&mut app, &access_token, "One", "content", &["work"]).await;
    helper::create_note(&mut app, &access_token, "Two", "content", &["personal"]).await;
    helper::create_note(&mut app, &access_token, "Three", "content", &["cooking"]).await;

    // any of the filtered tags matches
    let (_, notes, _) = helper::list_notes(&mut app, &access_token, "?tags=work,personal").await;
    assert_eq!(2, notes.unwrap().len());

    // the filter is normalized like the tags themselves
    let (_, notes, _) = helper::list_notes(&mut app, &access_token, "?tags=WORK").await;
    assert_eq!(1, notes.unwrap().len());
}

#[tokio::test]
async fn test_notes_are_scoped_to_the_owner() {
    let mut app = helper::setup_test_app();
    let access_token = helper::register(&mut app, "sam").await;
    let other_token = helper::register(&mut app, "alex").await;

    helper::create_note(&mut app, &access_token, "Mine", "content", &[]).await;
    helper::create_note(&mut app, &access_token, "Also mine", "content", &[]).await;
    helper::create_note(&mut app, &other_token, "Theirs", "content", &[]).await;

    let (_, notes, pagination) = helper::list_notes(&mut app, &other_token, "").await;
    assert_eq!(1, pagination.unwrap().total);
    assert_eq!("Theirs", notes.unwrap()[0].title);
}

#[tokio::test]
async fn test_notes_require_a_token() {
    let mut app = helper::setup_test_app();

    let (status_code, notes, _) = helper::list_notes(&mut app, "", "").await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);
    assert!(notes.is_none());
}
