mod support;

use chrono::NaiveDate;
use keepsake_core::view::gallery::project;
use keepsake_core::{
    group_by_month, latest_memory, seed_memories, AdminSession, GalleryState, HomeView,
    MemoryEntry, MemoryId, MemoryStore, NoticeVariant, ObjectKeyGenerator, RemoteMemoryRepository,
    Route, TimelineState, PLACEHOLDER_IMAGE, REDIRECT_DELAY,
};
use support::{FakeBucket, FakeTable};

fn entry(id: i64, title: &str, y: i32, m: u32, d: u32) -> MemoryEntry {
    MemoryEntry::new(
        MemoryId(id),
        title,
        NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        "description",
        format!("https://cdn.test/{id}.jpg"),
    )
}

fn loaded_store() -> MemoryStore<RemoteMemoryRepository<FakeTable, FakeBucket>> {
    let mut store = MemoryStore::new(RemoteMemoryRepository::with_key_generator(
        FakeTable::seeded(),
        FakeBucket::default(),
        ObjectKeyGenerator::new(Box::new(|| 1_683_000_000_000)),
    ));
    store.init().unwrap();
    store
}

#[test]
fn home_features_the_latest_memory() {
    let seed = seed_memories();
    let home = HomeView::build(&seed, "Noah");

    assert_eq!(home.headline, "Noah's First Year");
    assert_eq!(home.featured.title.as_deref(), Some("First Solid Food"));
    assert_eq!(home.featured.date.as_deref(), Some("April 10, 2023"));
    let routes = home.links.iter().map(|link| link.route).collect::<Vec<_>>();
    assert_eq!(routes, vec![Route::Timeline, Route::Gallery]);
}

#[test]
fn home_without_memories_shows_placeholder() {
    let home = HomeView::build(&[], "Noah");
    assert_eq!(home.featured.image_url, PLACEHOLDER_IMAGE);
    assert!(home.featured.title.is_none());
}

#[test]
fn latest_memory_prefers_the_last_entry_on_date_ties() {
    let entries = vec![
        entry(1, "a", 2023, 6, 1),
        entry(2, "b", 2023, 6, 1),
        entry(3, "c", 2023, 5, 1),
    ];
    assert_eq!(latest_memory(&entries).unwrap().id, MemoryId(2));
    assert!(latest_memory(&[]).is_none());
}

#[test]
fn timeline_groups_by_month_and_expands_only_the_last_group() {
    let seed = seed_memories();
    let groups = group_by_month(&seed);
    let months = groups.iter().map(|group| group.month).collect::<Vec<_>>();
    assert_eq!(months, vec!["January", "February", "March", "April"]);
    assert_eq!(groups[1].entries.len(), 2);

    let state = TimelineState::mount(&seed);
    let expanded = state
        .sections(&seed)
        .iter()
        .filter(|section| section.expanded)
        .map(|section| section.month)
        .collect::<Vec<_>>();
    assert_eq!(expanded, vec!["April"]);
}

#[test]
fn timeline_toggle_flips_one_section() {
    let seed = seed_memories();
    let mut state = TimelineState::mount(&seed);

    assert!(state.toggle("February"));
    assert!(!state.toggle("April"));
    assert!(state.is_expanded("February"));
    assert!(!state.is_expanded("April"));
    assert!(!state.is_expanded("January"));
}

#[test]
fn timeline_merges_same_month_across_years() {
    let entries = vec![entry(1, "a", 2023, 1, 5), entry(2, "b", 2024, 1, 5)];
    let groups = group_by_month(&entries);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].entries.len(), 2);
}

#[test]
fn timeline_of_empty_collection_has_no_sections() {
    let state = TimelineState::mount(&[]);
    assert!(state.sections(&[]).is_empty());
}

#[test]
fn gallery_modal_opens_and_closes() {
    let seed = seed_memories();
    let items = project(&seed);
    let mut gallery = GalleryState::default();

    assert!(gallery.open(MemoryId(3), &items));
    assert_eq!(gallery.modal(&items).unwrap().title, "First Laugh");
    assert_eq!(gallery.modal(&items).unwrap().date, "February 28, 2023");

    gallery.close();
    assert!(gallery.modal(&items).is_none());
    assert!(!gallery.open(MemoryId(99), &items));
    assert!(gallery.selected().is_none());
}

#[test]
fn every_entry_opens_its_own_photo() {
    let seed = seed_memories();
    let items = project(&seed);
    assert_eq!(items.len(), seed.len());

    let mut gallery = GalleryState::default();
    for entry in &seed {
        assert!(gallery.open(entry.id, &items));
        let shown = gallery.modal(&items).unwrap();
        assert_eq!(shown.title, entry.title);
        assert_eq!(shown.date, entry.display_date);
        assert_eq!(shown.image_url, entry.image_url);
    }
}

#[test]
fn wrong_password_keeps_the_form_hidden() {
    let mut session = AdminSession::new("noah123", "Noah");
    let notice = session.login("letmein");

    assert_eq!(notice.title, "Authentication failed");
    assert_eq!(notice.variant, NoticeVariant::Destructive);
    assert!(!session.is_authenticated());
    assert!(session.form().is_none());

    session.login("noah123");
    assert!(session.is_authenticated());
    assert!(session.form().unwrap().is_empty());
}

#[test]
fn submit_without_image_never_calls_the_repository() {
    let mut store = loaded_store();
    let mut session = AdminSession::new("noah123", "Noah");
    session.login("noah123");
    session.set_title("Crawling");
    session.set_date("2023-05-02");
    session.set_description("Across the room.");

    let outcome = session.submit(&mut store);

    assert!(!outcome.is_success());
    assert_eq!(outcome.notice.title, "Missing information");
    assert_eq!(store.repository().bucket().upload_calls.get(), 0);
    assert_eq!(store.repository().table().insert_calls.get(), 0);
    assert_eq!(session.form().unwrap().title, "Crawling");
}

#[test]
fn unauthenticated_submit_is_rejected() {
    let mut store = loaded_store();
    let mut session = AdminSession::new("noah123", "Noah");
    session.set_title("Crawling");

    let outcome = session.submit(&mut store);
    assert!(outcome.notice.is_error());
    assert_eq!(store.repository().bucket().upload_calls.get(), 0);
}

#[test]
fn successful_submit_clears_form_and_redirects_to_timeline() {
    let mut store = loaded_store();
    let mut session = AdminSession::new("noah123", "Noah");
    session.login("noah123");
    session.set_title("Crawling");
    session.set_date("2023-05-02");
    session.set_description("Across the room.");
    let preview = session
        .attach_image("crawl.png", Some("image/png".to_string()), vec![9, 9])
        .to_string();
    assert!(preview.starts_with("data:image/png;base64,"));

    let outcome = session.submit(&mut store);

    assert!(outcome.is_success());
    assert_eq!(outcome.notice.title, "Memory added");
    let redirect = outcome.redirect.unwrap();
    assert_eq!(redirect.route, Route::Timeline);
    assert_eq!(redirect.after, REDIRECT_DELAY);
    assert!(session.form().unwrap().is_empty());

    let entries = store.current();
    assert_eq!(entries.len(), 6);
    assert_eq!(entries[5].title, "Crawling");
    let state = TimelineState::mount(entries);
    assert!(state.is_expanded("May"));
}

#[test]
fn failed_upload_keeps_form_values() {
    let mut store = loaded_store();
    store.repository().bucket().fail_upload.set(true);
    let mut session = AdminSession::new("noah123", "Noah");
    session.login("noah123");
    session.set_title("Crawling");
    session.set_date("2023-05-02");
    session.set_description("Across the room.");
    session.attach_image("crawl.jpg", None, vec![1]);

    let outcome = session.submit(&mut store);

    assert_eq!(outcome.notice.title, "Upload failed");
    assert!(outcome.redirect.is_none());
    let form = session.form().unwrap();
    assert_eq!(form.title, "Crawling");
    assert!(form.image.is_some());
    assert_eq!(store.current().len(), 5);
}
