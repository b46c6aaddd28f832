use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::Context as _;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::bucket::FeedBuckets;
use crate::builtin;
use crate::config::Backend;
use crate::html::{self, Links};
use crate::load::{self, CommunityPage, Directory, Loader, Trigger, Viewer};
use crate::model::AccessKind;
use crate::row::COMMUNITY_MEMBERSHIPS;
use crate::store::{Row, TableClient};

/// Shared server state. Joins live in `joined` for the life of the process;
/// the home page views are one `Loader` each, shared by all requests.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Shared>,
}

struct Shared {
    backend: Backend,
    user_id: Option<String>,
    write_joins: bool,
    joined: RwLock<HashSet<String>>,
    feed: Loader<FeedBuckets>,
    directory: Loader<Directory>,
}

impl AppState {
    pub fn new(backend: Backend, user_id: Option<String>, write_joins: bool) -> Self {
        if write_joins && user_id.is_none() {
            tracing::warn!("--write-joins needs --user-id; joins stay local");
        }
        Self {
            inner: Arc::new(Shared {
                backend,
                user_id,
                write_joins,
                joined: RwLock::new(HashSet::new()),
                feed: Loader::new("feed"),
                directory: Loader::new("directory"),
            }),
        }
    }

    fn viewer(&self) -> Viewer {
        let joined = self
            .inner
            .joined
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Viewer {
            user_id: self.inner.user_id.clone(),
            joined,
        }
    }

    fn mark_joined(&self, id: &str) -> bool {
        self.inner
            .joined
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/community/:id", get(community))
        .route("/community/:id/join", post(join))
        .route("/assets/site.css", get(stylesheet))
        .fallback(not_found)
        .with_state(state)
}

pub async fn serve(state: AppState, listen: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("bind {listen}"))?;
    let addr = listener.local_addr().context("read local address")?;
    tracing::info!(%addr, "serving forum pages");
    axum::serve(listener, router(state)).await.context("serve")?;
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
struct Refresh {
    #[serde(default)]
    retry: bool,
}

impl Refresh {
    fn trigger(&self) -> Trigger {
        if self.retry { Trigger::Retry } else { Trigger::Open }
    }
}

async fn home(State(state): State<AppState>, Query(refresh): Query<Refresh>) -> Html<String> {
    let viewer = state.viewer();
    let shared = &state.inner;
    let trigger = refresh.trigger();
    let (feed, directory) = tokio::join!(
        load::load_feed(&shared.feed, trigger, &shared.backend, Utc::now()),
        load::load_directory(&shared.directory, trigger, &shared.backend, &viewer),
    );
    Html(html::build_home(&feed, &directory, Links::Served))
}

async fn community(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(refresh): Query<Refresh>,
) -> impl IntoResponse {
    let viewer = state.viewer();
    let loader = Loader::new("community");
    let page = load::load_community_page(
        &loader,
        refresh.trigger(),
        &state.inner.backend,
        &id,
        &viewer,
        Utc::now(),
    )
    .await;
    let status = match page.content() {
        Some(CommunityPage::NotFound) => StatusCode::NOT_FOUND,
        _ => StatusCode::OK,
    };
    (status, Html(html::build_community(&page, &id, Links::Served)))
}

async fn join(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let community = match load::fetch_community(&state.inner.backend, &id).await {
        Ok(Some(community)) => community,
        Ok(None) => {
            tracing::info!(community = %id, "join for unknown community");
            return not_found().await.into_response();
        }
        Err(err) => {
            tracing::error!(community = %id, error = %err, "could not check community before join");
            return Redirect::to(&Links::Served.community(&id)).into_response();
        }
    };
    if community.access.kind() != AccessKind::Free {
        tracing::info!(community = %id, "join refused; community needs a subscription");
        let page = html::build_subscription_required(&community, Links::Served);
        return (StatusCode::FORBIDDEN, Html(page)).into_response();
    }

    if state.mark_joined(&id) {
        tracing::info!(community = %id, "joined community");
    }

    if state.inner.write_joins {
        if let Some(user_id) = &state.inner.user_id {
            let mut row = Row::new();
            row.insert("user_id".to_string(), Value::from(user_id.as_str()));
            row.insert("community_id".to_string(), Value::from(id.as_str()));
            if let Err(err) = state
                .inner
                .backend
                .insert(COMMUNITY_MEMBERSHIPS, vec![row])
                .await
            {
                tracing::error!(community = %id, error = %err, "failed to record membership; join kept locally");
            }
        }
    }

    Redirect::to(&Links::Served.community(&id)).into_response()
}

async fn stylesheet() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        builtin::SITE_CSS,
    )
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html(html::build_not_found(Links::Served)))
}
