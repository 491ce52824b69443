use std::collections::HashSet;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{delete, get, post};
use serde::Deserialize;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::app::model::{
    AddBookmarkRequest, BookmarkChange, LoginRequest, ManualSummary, ManualView, OutlineRow,
    SearchHit, SearchQuery, SearchResponse, SectionView, SessionView,
};
use crate::auth::SessionStore;
use crate::bookmarks::BookmarkStore;
use crate::catalog::ManualCatalog;
use crate::config::Config;
use crate::formats::ManualType;
use crate::navigator::Navigator;
use crate::search::{highlight, search};

type ApiError = (StatusCode, String);

/// Mutable per-client state. One request holds the lock at a time, so every
/// action is fully applied before the next one is looked at.
#[derive(Debug)]
pub struct Stores {
    pub sessions: SessionStore,
    pub bookmarks: BookmarkStore,
}

#[derive(Debug, Clone)]
pub struct AppState {
    catalog: Arc<ManualCatalog>,
    stores: Arc<Mutex<Stores>>,
    require_login: bool,
}

impl AppState {
    pub fn new(catalog: ManualCatalog, stores: Stores, require_login: bool) -> Self {
        Self {
            catalog: Arc::new(catalog),
            stores: Arc::new(Mutex::new(stores)),
            require_login,
        }
    }

    pub fn load(config: &Config) -> anyhow::Result<Self> {
        let catalog = config.load_catalog()?;
        let storage = config.storage();
        let stores = Stores {
            sessions: SessionStore::load(storage.clone())?,
            bookmarks: BookmarkStore::load(storage)?,
        };
        Ok(Self::new(catalog, stores, config.require_login))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok\n" }))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/session", get(session))
        .route("/api/manuals", get(list_manuals))
        .route("/api/manuals/:manual_type", get(get_manual))
        .route("/api/manuals/:manual_type/outline", get(get_outline))
        .route("/api/manuals/:manual_type/sections/:section_id", get(get_section))
        .route("/api/search", get(search_sections))
        .route("/api/bookmarks", get(list_bookmarks).post(add_bookmark))
        .route("/api/bookmarks/:id", delete(remove_bookmark))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn ensure_logged_in(state: &AppState, stores: &Stores) -> Result<(), ApiError> {
    if state.require_login && !stores.sessions.is_authenticated() {
        return Err((StatusCode::UNAUTHORIZED, "login required".to_string()));
    }
    Ok(())
}

fn warning(err: anyhow::Error, what: &str) -> String {
    tracing::warn!(error = format!("{err:#}"), "{what}");
    format!("{what}: {err:#}")
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let mut stores = state.stores.lock().await;
    let warning = match stores.sessions.login(&req.username, &req.password) {
        Ok(true) => None,
        Ok(false) => {
            return Err((
                StatusCode::UNAUTHORIZED,
                "invalid username or password".to_string(),
            ));
        }
        Err(err) => Some(warning(err, "session not saved")),
    };
    Ok(Json(SessionView {
        authenticated: true,
        user: stores.sessions.user().cloned(),
        warning,
    }))
}

async fn logout(State(state): State<AppState>) -> Json<SessionView> {
    let mut stores = state.stores.lock().await;
    let warning = stores
        .sessions
        .logout()
        .err()
        .map(|err| warning(err, "stored session not removed"));
    Json(SessionView {
        authenticated: false,
        user: None,
        warning,
    })
}

async fn session(State(state): State<AppState>) -> Json<SessionView> {
    let stores = state.stores.lock().await;
    Json(SessionView {
        authenticated: stores.sessions.is_authenticated(),
        user: stores.sessions.user().cloned(),
        warning: None,
    })
}

async fn list_manuals(
    State(state): State<AppState>,
) -> Result<Json<Vec<ManualSummary>>, ApiError> {
    ensure_logged_in(&state, &*state.stores.lock().await)?;
    let manuals = state
        .catalog
        .manuals()
        .into_iter()
        .map(|(manual_type, manual)| ManualSummary::new(manual_type, manual))
        .collect();
    Ok(Json(manuals))
}

async fn get_manual(
    State(state): State<AppState>,
    Path(manual_type): Path<String>,
) -> Result<Json<ManualView>, ApiError> {
    ensure_logged_in(&state, &*state.stores.lock().await)?;
    let manual_type = ManualType::from_param(&manual_type);
    let manual = state.catalog.manual(manual_type);
    Ok(Json(ManualView {
        summary: ManualSummary::new(manual_type, manual),
        sections: manual.sections().to_vec(),
    }))
}

#[derive(Debug, Deserialize)]
struct OutlineQuery {
    /// Comma-separated section ids, or `all`.
    #[serde(default)]
    expanded: String,
}

async fn get_outline(
    State(state): State<AppState>,
    Path(manual_type): Path<String>,
    Query(q): Query<OutlineQuery>,
) -> Result<Json<Vec<OutlineRow>>, ApiError> {
    ensure_logged_in(&state, &*state.stores.lock().await)?;
    let manual = state.catalog.get_manual(&manual_type);
    let expanded: HashSet<String> = if q.expanded.trim() == "all" {
        manual
            .sections()
            .iter()
            .filter(|section| section.has_children())
            .map(|section| section.id.clone())
            .collect()
    } else {
        q.expanded
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_owned)
            .collect()
    };
    let rows = manual
        .outline(&expanded)
        .into_iter()
        .map(OutlineRow::from)
        .collect();
    Ok(Json(rows))
}

async fn get_section(
    State(state): State<AppState>,
    Path((manual_type, section_id)): Path<(String, String)>,
) -> Result<Json<SectionView>, ApiError> {
    let stores = state.stores.lock().await;
    ensure_logged_in(&state, &stores)?;

    // An unknown id falls back to the manual's first section.
    let mut navigator = Navigator::open(&state.catalog, ManualType::from_param(&manual_type));
    let selected = navigator.select(&section_id);
    let mut view = SectionView::from_navigator(&navigator, &stores.bookmarks).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            format!("{} has no sections", navigator.manual().title()),
        )
    })?;
    view.selected = selected;
    Ok(Json(view))
}

async fn search_sections(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> Result<Response, ApiError> {
    ensure_logged_in(&state, &*state.stores.lock().await)?;

    let catalog = state.catalog.as_ref();
    let results = search(catalog.get_all_sections(), &q.q)
        .into_iter()
        .map(|section| SearchHit {
            manual_type: catalog.manual_type_of(&section.id).unwrap_or_default(),
            section,
            title_fragments: highlight(&section.title, &q.q),
            content_fragments: section
                .content
                .as_deref()
                .map(|content| highlight(content, &q.q))
                .unwrap_or_default(),
        })
        .collect();

    // Serialized here because the hits borrow from the catalog.
    Ok(Json(SearchResponse {
        query: &q.q,
        results,
    })
    .into_response())
}

async fn list_bookmarks(State(state): State<AppState>) -> Result<Response, ApiError> {
    let stores = state.stores.lock().await;
    ensure_logged_in(&state, &stores)?;
    Ok(Json(stores.bookmarks.bookmarks()).into_response())
}

async fn add_bookmark(
    State(state): State<AppState>,
    Json(req): Json<AddBookmarkRequest>,
) -> Result<(StatusCode, Json<BookmarkChange>), ApiError> {
    let mut stores = state.stores.lock().await;
    ensure_logged_in(&state, &stores)?;

    let manual_type = ManualType::from_param(&req.manual_type);
    let Some(section) = state.catalog.manual(manual_type).section(&req.section_id) else {
        return Err((
            StatusCode::NOT_FOUND,
            format!(
                "no section {} in the {}",
                req.section_id,
                manual_type.display_name()
            ),
        ));
    };

    if let Some(existing) = stores.bookmarks.get(&section.id) {
        return Ok((
            StatusCode::OK,
            Json(BookmarkChange {
                bookmark: Some(existing.clone()),
                bookmarked: true,
                removed: None,
                warning: None,
            }),
        ));
    }

    let warning = stores
        .bookmarks
        .add(section, manual_type)
        .err()
        .map(|err| warning(err, "bookmark not saved"));
    Ok((
        StatusCode::CREATED,
        Json(BookmarkChange {
            bookmark: stores.bookmarks.get(&section.id).cloned(),
            bookmarked: true,
            removed: None,
            warning,
        }),
    ))
}

async fn remove_bookmark(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookmarkChange>, ApiError> {
    let mut stores = state.stores.lock().await;
    ensure_logged_in(&state, &stores)?;

    let before = stores.bookmarks.bookmarks().len();
    let warning = match stores.bookmarks.remove(&id) {
        Ok(_) => None,
        Err(err) => Some(warning(err, "bookmark removal not saved")),
    };
    let removed = before - stores.bookmarks.bookmarks().len();
    Ok(Json(BookmarkChange {
        bookmark: None,
        bookmarked: false,
        removed: Some(removed),
        warning,
    }))
}
