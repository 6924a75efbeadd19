//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose screen-level functions (home, timeline, gallery, admin) to Dart
//!   via FRB.
//! - Own the single process-wide memory store and per-screen UI state.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Calls that may reach the hosted backend are not `sync`; FRB runs them
//!   off the UI thread.
//! - `sync` calls never wait on repository I/O: they read the last published
//!   collection, and only async calls take the store lock.
//! - Every successful load or save bumps `memories_revision`, so Dart can
//!   re-pull view-models after a change.

use keepsake_core::view::gallery::{gallery_title, project};
use keepsake_core::view::timeline::timeline_title;
use keepsake_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, open_store,
    ping as ping_inner, AdminSession, AppConfig, DynMemoryRepository, GalleryItem, GalleryState,
    HomeView, MemoryEntry, MemoryId, MemoryStore, Notice, NoticeVariant, SubmitOutcome,
    TimelineState,
};
use log::{info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, RwLock};

const NOT_INITIALIZED: &str = "app not initialized; call app_init first";
const LOCK_POISONED: &str = "app state lock poisoned";

static SESSION: OnceLock<RwLock<Option<Arc<Session>>>> = OnceLock::new();

/// Everything `app_init` builds, shared by every exported call.
///
/// Lock order when both are needed: `ui` is released before `store` is taken.
struct Session {
    /// Only async calls lock this; it is held across repository I/O.
    store: Mutex<MemoryStore<DynMemoryRepository>>,
    /// Collection last handed to store subscribers.
    published: Arc<RwLock<Arc<[MemoryEntry]>>>,
    revision: Arc<AtomicU64>,
    child_name: String,
    ui: Mutex<UiState>,
}

struct UiState {
    timeline: TimelineState,
    gallery: GalleryState,
    admin: AdminSession,
}

impl Session {
    fn entries(&self) -> Result<Arc<[MemoryEntry]>, String> {
        self.published
            .read()
            .map(|entries| Arc::clone(&*entries))
            .map_err(|_| LOCK_POISONED.to_string())
    }

    fn ui(&self) -> Result<MutexGuard<'_, UiState>, String> {
        self.ui.lock().map_err(|_| LOCK_POISONED.to_string())
    }

    fn store(&self) -> Result<MutexGuard<'_, MemoryStore<DynMemoryRepository>>, String> {
        self.store.lock().map_err(|_| LOCK_POISONED.to_string())
    }
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Number of memories currently cached.
    pub count: u32,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, count: usize) -> Self {
        Self {
            ok: true,
            count: to_count(count),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>, count: usize) -> Self {
        Self {
            ok: false,
            count: to_count(count),
            message: message.into(),
        }
    }
}

/// One memory as shown by Dart widgets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryItem {
    pub id: i64,
    pub title: String,
    /// ISO `YYYY-MM-DD`.
    pub date: String,
    pub display_date: String,
    pub description: String,
    pub image_url: String,
    pub month: String,
}

/// Toast payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeItem {
    pub title: String,
    pub description: String,
    pub destructive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLinkItem {
    pub label: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeScreen {
    pub headline: String,
    pub tagline: String,
    pub welcome: String,
    pub featured_image_url: String,
    pub featured_alt: String,
    pub featured_title: Option<String>,
    pub featured_date: Option<String>,
    pub links: Vec<NavLinkItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineSectionItem {
    pub month: String,
    pub expanded: bool,
    pub entries: Vec<MemoryItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineScreen {
    pub title: String,
    pub sections: Vec<TimelineSectionItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryTile {
    pub id: i64,
    pub image_url: String,
    pub title: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryScreen {
    pub title: String,
    pub items: Vec<GalleryTile>,
    /// Photo shown in the modal, if open.
    pub selected: Option<GalleryTile>,
}

/// Result of an admin submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResponse {
    pub ok: bool,
    pub notice: NoticeItem,
    /// Route to navigate to once `redirect_after_ms` has elapsed.
    pub redirect_path: Option<String>,
    pub redirect_after_ms: Option<u64>,
}

/// Builds the store from `KEEPSAKE_*` environment variables and loads it.
///
/// # FFI contract
/// - Async call; may contact the hosted backend.
/// - Replaces any previously initialized state.
/// - A failed first load still installs the (empty) store so the UI can
///   render and retry with `memories_refresh`; `ok` is false in that case.
pub fn app_init() -> ActionResponse {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => return ActionResponse::failure(format!("app_init failed: {err}"), 0),
    };
    let store = match open_store(&config) {
        Ok(store) => store,
        Err(err) => return ActionResponse::failure(format!("app_init failed: {err}"), 0),
    };
    let admin = AdminSession::new(config.admin_password.as_str(), config.child_name.as_str());
    install_session(store, admin, config.child_name)
}

/// Loads `store` and makes it the process-wide session.
///
/// The first load runs before the session is visible, so no exported call
/// waits on it.
fn install_session(
    mut store: MemoryStore<DynMemoryRepository>,
    admin: AdminSession,
    child_name: String,
) -> ActionResponse {
    let published: Arc<RwLock<Arc<[MemoryEntry]>>> =
        Arc::new(RwLock::new(Arc::from(Vec::new())));
    let revision = Arc::new(AtomicU64::new(0));
    let (target, counter) = (Arc::clone(&published), Arc::clone(&revision));
    store.subscribe(Box::new(move |entries: &[MemoryEntry]| {
        match target.write() {
            Ok(mut slot) => *slot = Arc::from(entries),
            Err(poisoned) => *poisoned.into_inner() = Arc::from(entries),
        }
        counter.fetch_add(1, Ordering::SeqCst);
    }));
    let loaded = store.init().map(|entries| entries.len());

    let session = Session {
        ui: Mutex::new(UiState {
            timeline: TimelineState::mount(store.current()),
            gallery: GalleryState::default(),
            admin,
        }),
        store: Mutex::new(store),
        published,
        revision,
        child_name,
    };
    let mut slot = match session_slot().write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *slot = Some(Arc::new(session));

    match loaded {
        Ok(count) => {
            info!("event=app_init module=ffi status=ok count={count}");
            ActionResponse::success("Memories loaded.", count)
        }
        Err(err) => {
            warn!(
                "event=app_init module=ffi status=error stage={} error={}",
                err.stage(),
                err
            );
            ActionResponse::failure(format!("app_init load failed: {err}"), 0)
        }
    }
}

/// Re-reads the collection from the configured backend.
///
/// # FFI contract
/// - Async call; may contact the hosted backend.
/// - On failure the cached collection is kept and `ok` is false.
pub fn memories_refresh() -> ActionResponse {
    let refreshed = current_session().and_then(|session| {
        let mut store = session.store()?;
        let outcome = store.refresh().map(|entries| entries.len());
        let count = store.current().len();
        Ok(match outcome {
            Ok(count) => ActionResponse::success("Memories loaded.", count),
            Err(err) => ActionResponse::failure(format!("memories_refresh failed: {err}"), count),
        })
    });
    refreshed.unwrap_or_else(|err| ActionResponse::failure(err, 0))
}

/// Counter bumped on every published collection; `0` before `app_init`.
#[flutter_rust_bridge::frb(sync)]
pub fn memories_revision() -> u64 {
    current_session()
        .map(|session| session.revision.load(Ordering::SeqCst))
        .unwrap_or(0)
}

/// Full cached collection, sorted ascending by date.
#[flutter_rust_bridge::frb(sync)]
pub fn memories_current() -> Vec<MemoryItem> {
    current_session()
        .and_then(|session| session.entries())
        .map(|entries| entries.iter().map(to_memory_item).collect())
        .unwrap_or_default()
}

/// Home screen view-model.
#[flutter_rust_bridge::frb(sync)]
pub fn home_view() -> Option<HomeScreen> {
    let session = current_session().ok()?;
    let entries = session.entries().ok()?;
    let view = HomeView::build(&entries, &session.child_name);
    Some(HomeScreen {
        headline: view.headline,
        tagline: view.tagline,
        welcome: view.welcome,
        featured_image_url: view.featured.image_url,
        featured_alt: view.featured.alt,
        featured_title: view.featured.title,
        featured_date: view.featured.date,
        links: view
            .links
            .into_iter()
            .map(|link| NavLinkItem {
                label: link.label.to_string(),
                path: link.path.to_string(),
            })
            .collect(),
    })
}

/// Resets timeline expansion to the mount state (last month expanded).
#[flutter_rust_bridge::frb(sync)]
pub fn timeline_mount() -> Option<TimelineScreen> {
    with_ui(|session, entries, ui| {
        ui.timeline = TimelineState::mount(entries);
        timeline_screen(session, entries, &ui.timeline)
    })
    .ok()
}

/// Timeline view-model with the current expansion flags.
#[flutter_rust_bridge::frb(sync)]
pub fn timeline_view() -> Option<TimelineScreen> {
    with_ui(|session, entries, ui| timeline_screen(session, entries, &ui.timeline)).ok()
}

/// Flips one month section; returns the new expanded flag.
#[flutter_rust_bridge::frb(sync)]
pub fn timeline_toggle(month: String) -> bool {
    with_ui(|_, _, ui| ui.timeline.toggle(month.trim())).unwrap_or(false)
}

/// Gallery view-model including the open modal, if any.
#[flutter_rust_bridge::frb(sync)]
pub fn gallery_view() -> Option<GalleryScreen> {
    with_ui(|session, entries, ui| {
        let items = project(entries);
        GalleryScreen {
            title: gallery_title(&session.child_name),
            selected: ui.gallery.modal(&items).map(to_gallery_tile),
            items: items.iter().map(to_gallery_tile).collect(),
        }
    })
    .ok()
}

/// Opens the modal for `id`; false when the id is not in the collection.
#[flutter_rust_bridge::frb(sync)]
pub fn gallery_open(id: i64) -> bool {
    with_ui(|_, entries, ui| ui.gallery.open(MemoryId(id), &project(entries))).unwrap_or(false)
}

/// Closes the modal; false before `app_init`.
#[flutter_rust_bridge::frb(sync)]
pub fn gallery_close() -> bool {
    with_ui(|_, _, ui| ui.gallery.close()).is_ok()
}

/// Checks the admin password for this session.
#[flutter_rust_bridge::frb(sync)]
pub fn admin_login(password: String) -> NoticeItem {
    with_ui(|_, _, ui| to_notice_item(&ui.admin.login(&password)))
        .unwrap_or_else(not_initialized_notice)
}

#[flutter_rust_bridge::frb(sync)]
pub fn admin_is_authenticated() -> bool {
    with_ui(|_, _, ui| ui.admin.is_authenticated()).unwrap_or(false)
}

/// Stores the text fields as typed. `date` is the raw `YYYY-MM-DD` input.
///
/// Returns false when nothing was stored (before `app_init`).
#[flutter_rust_bridge::frb(sync)]
pub fn admin_update_form(title: String, date: String, description: String) -> bool {
    with_ui(|_, _, ui| {
        ui.admin.set_title(title);
        ui.admin.set_date(date);
        ui.admin.set_description(description);
    })
    .is_ok()
}

/// Attaches the picked photo; returns its preview `data:` URL.
///
/// Returns an empty string before `app_init`.
#[flutter_rust_bridge::frb(sync)]
pub fn admin_attach_image(
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
) -> String {
    with_ui(|_, _, ui| {
        ui.admin
            .attach_image(file_name, content_type, bytes)
            .to_string()
    })
    .unwrap_or_default()
}

/// Validates and saves the admin form.
///
/// # FFI contract
/// - Async call; uploads the photo and writes the row on the hosted backend.
/// - On failure the form keeps every entered value.
/// - Works on a copy of the admin session so `sync` calls stay responsive;
///   form edits made while the upload runs are replaced by the outcome.
pub fn admin_submit() -> SubmitResponse {
    let submitted = current_session().and_then(|session| {
        let mut admin = session.ui()?.admin.clone();
        let outcome = {
            let mut store = session.store()?;
            admin.submit(&mut *store)
        };
        session.ui()?.admin = admin;
        Ok(outcome)
    });
    match submitted {
        Ok(outcome) => to_submit_response(outcome),
        Err(err) => SubmitResponse {
            ok: false,
            notice: not_initialized_notice(err),
            redirect_path: None,
            redirect_after_ms: None,
        },
    }
}

fn session_slot() -> &'static RwLock<Option<Arc<Session>>> {
    SESSION.get_or_init(|| RwLock::new(None))
}

fn current_session() -> Result<Arc<Session>, String> {
    let slot = session_slot()
        .read()
        .map_err(|_| LOCK_POISONED.to_string())?;
    slot.as_ref()
        .map(Arc::clone)
        .ok_or_else(|| NOT_INITIALIZED.to_string())
}

/// Runs `f` against the published collection and the UI state.
fn with_ui<T>(f: impl FnOnce(&Session, &[MemoryEntry], &mut UiState) -> T) -> Result<T, String> {
    let session = current_session()?;
    let entries = session.entries()?;
    let mut ui = session.ui()?;
    Ok(f(&session, &entries, &mut ui))
}

fn timeline_screen(
    session: &Session,
    entries: &[MemoryEntry],
    timeline: &TimelineState,
) -> TimelineScreen {
    TimelineScreen {
        title: timeline_title(&session.child_name),
        sections: timeline
            .sections(entries)
            .into_iter()
            .map(|section| TimelineSectionItem {
                month: section.month.to_string(),
                expanded: section.expanded,
                entries: section.entries.into_iter().map(to_memory_item).collect(),
            })
            .collect(),
    }
}

fn to_memory_item(entry: &MemoryEntry) -> MemoryItem {
    MemoryItem {
        id: entry.id.0,
        title: entry.title.clone(),
        date: entry.date.format("%Y-%m-%d").to_string(),
        display_date: entry.display_date.clone(),
        description: entry.description.clone(),
        image_url: entry.image_url.clone(),
        month: entry.month.clone(),
    }
}

fn to_gallery_tile(item: &GalleryItem) -> GalleryTile {
    GalleryTile {
        id: item.id.0,
        image_url: item.image_url.clone(),
        title: item.title.clone(),
        date: item.date.clone(),
    }
}

fn to_notice_item(notice: &Notice) -> NoticeItem {
    NoticeItem {
        title: notice.title.clone(),
        description: notice.description.clone(),
        destructive: notice.variant == NoticeVariant::Destructive,
    }
}

fn not_initialized_notice(message: String) -> NoticeItem {
    NoticeItem {
        title: "Not ready".to_string(),
        description: message,
        destructive: true,
    }
}

fn to_submit_response(outcome: SubmitOutcome) -> SubmitResponse {
    let ok = outcome.is_success();
    SubmitResponse {
        ok,
        notice: to_notice_item(&outcome.notice),
        redirect_path: outcome
            .redirect
            .map(|redirect| redirect.route.path().to_string()),
        redirect_after_ms: outcome
            .redirect
            .map(|redirect| u64::try_from(redirect.after.as_millis()).unwrap_or(u64::MAX)),
    }
}

fn to_count(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}
