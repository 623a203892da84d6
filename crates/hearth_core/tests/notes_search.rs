use hearth_core::db::open_db_in_memory;
use hearth_core::service::NoteService;
use hearth_core::{search_notes, NoteSearchQuery, SearchError, ServiceError, SqliteRepository};

#[test]
fn created_note_is_searchable_with_preview() {
    let conn = open_db_in_memory().unwrap();
    let service = NoteService::new(SqliteRepository::try_new(&conn).unwrap());

    let note = service
        .create("Recipes", "## Pancakes\n![stack](img/pancakes.jpg)\nflour, **milk** and eggs")
        .unwrap();
    assert_eq!(note.preview_image.as_deref(), Some("img/pancakes.jpg"));
    assert_eq!(note.preview_text.as_deref(), Some("Pancakes flour, milk and eggs"));

    let hits = service.search("pancake", 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].note_id, note.meta.id);
    assert_eq!(hits[0].title, "Recipes");
    assert!(hits[0].snippet.contains("[Pancakes]"));
    assert_eq!(service.state().snapshot().items, vec![note]);
}

#[test]
fn search_matches_title_and_follows_updates() {
    let conn = open_db_in_memory().unwrap();
    let service = NoteService::new(SqliteRepository::try_new(&conn).unwrap());
    let note = service.create("Garden", "tomatoes and basil").unwrap();

    assert_eq!(service.search("garden", 10).unwrap().len(), 1);

    service
        .update(note.meta.id, "Balcony", "peppers and mint")
        .unwrap();
    assert!(service.search("basil", 10).unwrap().is_empty());
    assert!(service.search("garden", 10).unwrap().is_empty());
    assert_eq!(service.search("mint", 10).unwrap().len(), 1);
    assert_eq!(
        service.get(note.meta.id).unwrap().unwrap().preview_text.as_deref(),
        Some("peppers and mint")
    );
}

#[test]
fn deleted_notes_leave_the_index() {
    let conn = open_db_in_memory().unwrap();
    let service = NoteService::new(SqliteRepository::try_new(&conn).unwrap());
    let note = service.create("Trip", "pack passport").unwrap();
    service.delete(note.meta.id).unwrap();

    assert!(service.search("passport", 10).unwrap().is_empty());
    assert!(service.list().unwrap().is_empty());
    assert!(matches!(
        service.delete(note.meta.id).unwrap_err(),
        ServiceError::NotFound(_)
    ));
}

#[test]
fn blank_query_and_zero_limit_return_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = NoteService::new(SqliteRepository::try_new(&conn).unwrap());
    service.create("Ideas", "a b c").unwrap();

    assert!(service.search("   ", 10).unwrap().is_empty());
    assert!(service.search("ideas", 0).unwrap().is_empty());
}

#[test]
fn user_text_with_fts_operators_is_quoted() {
    let conn = open_db_in_memory().unwrap();
    let service = NoteService::new(SqliteRepository::try_new(&conn).unwrap());
    service.create("Shopping", "milk OR eggs (organic)").unwrap();

    let hits = service.search("eggs (organic", 10).unwrap();
    assert_eq!(hits.len(), 1);
}

#[test]
fn raw_fts_syntax_errors_are_typed() {
    let conn = open_db_in_memory().unwrap();
    let mut query = NoteSearchQuery::new("\"unterminated");
    query.raw_fts_syntax = true;

    let err = search_notes(&conn, &query).unwrap_err();
    assert!(matches!(err, SearchError::InvalidQuery { .. }));
}

#[test]
fn note_needs_title_or_body() {
    let conn = open_db_in_memory().unwrap();
    let service = NoteService::new(SqliteRepository::try_new(&conn).unwrap());
    assert!(matches!(
        service.create(" ", "\n").unwrap_err(),
        ServiceError::Validation(_)
    ));
    assert!(service.create("", "body only").is_ok());
}
