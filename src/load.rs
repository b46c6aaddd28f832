use std::collections::HashSet;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

use crate::bucket::{CommunityBuckets, FeedBuckets};
use crate::fallback;
use crate::model::{Community, DisplayTopic, SidebarEntry};
use crate::row::{COMMUNITIES, COMMUNITY_MEMBERSHIPS, CommunityRow, MembershipRow, TOPICS, TopicRow};
use crate::store::{Query, StoreError, TableClient, decode_rows};
use crate::transform;

pub const FEED_ERROR: &str = "Failed to load topics. Please try again later.";
pub const DIRECTORY_ERROR: &str = "Failed to load communities. Showing sample communities.";
pub const COMMUNITY_ERROR: &str = "Failed to load community data. Using default data.";

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Loaded(T),
    /// The fetch failed; `fallback` is shown together with `message`.
    Failed { message: String, fallback: T },
}

impl<T> LoadState<T> {
    /// What should be on screen, live or fallback.
    pub fn content(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(v) => Some(v),
            LoadState::Failed { fallback, .. } => Some(fallback),
            LoadState::Idle | LoadState::Loading => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Proof that a fetch was started; only the latest ticket may settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

struct Slot<T> {
    generation: u64,
    state: LoadState<T>,
}

/// One view's fetch state: `Idle -> Loading -> Loaded | Failed`.
pub struct Loader<T> {
    view: &'static str,
    slot: Mutex<Slot<T>>,
}

impl<T: Clone> Loader<T> {
    pub fn new(view: &'static str) -> Self {
        Self {
            view,
            slot: Mutex::new(Slot {
                generation: 0,
                state: LoadState::Idle,
            }),
        }
    }

    fn with_slot<R>(&self, f: impl FnOnce(&mut Slot<T>) -> R) -> R {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut slot)
    }

    pub fn start(&self) -> Ticket {
        self.with_slot(|slot| {
            slot.generation += 1;
            slot.state = LoadState::Loading;
            Ticket(slot.generation)
        })
    }

    /// Applies a finished fetch. Returns false when the ticket is stale.
    pub fn settle(
        &self,
        ticket: Ticket,
        result: Result<T, StoreError>,
        message: &str,
        fallback: impl FnOnce() -> T,
    ) -> bool {
        self.with_slot(|slot| {
            if slot.generation != ticket.0 {
                tracing::debug!(view = self.view, ticket = ticket.0, "dropping stale fetch result");
                return false;
            }
            slot.state = match result {
                Ok(value) => LoadState::Loaded(value),
                Err(err) => {
                    tracing::error!(view = self.view, error = %err, "fetch failed; showing fallback content");
                    LoadState::Failed {
                        message: message.to_string(),
                        fallback: fallback(),
                    }
                }
            };
            true
        })
    }

    /// Invalidates any in-flight fetch and returns to `Idle`.
    pub fn cancel(&self) {
        self.with_slot(|slot| {
            slot.generation += 1;
            slot.state = LoadState::Idle;
        });
    }

    /// Manual re-fetch: drops whatever is in flight and starts over from `Idle`.
    pub fn retry(&self) -> Ticket {
        tracing::debug!(view = self.view, "retry requested");
        self.cancel();
        self.start()
    }

    /// Cancels only if `ticket` is still the latest fetch.
    fn abandon(&self, ticket: Ticket) {
        self.with_slot(|slot| {
            if slot.generation == ticket.0 {
                tracing::debug!(view = self.view, ticket = ticket.0, "fetch abandoned");
                slot.generation += 1;
                slot.state = LoadState::Idle;
            }
        });
    }

    pub fn snapshot(&self) -> LoadState<T> {
        self.with_slot(|slot| slot.state.clone())
    }

    /// Runs one fetch and returns the view state afterwards. A fetch that was
    /// superseded meanwhile leaves the state to the newer one. If the caller
    /// drops this future before the fetch settles, the view goes back to `Idle`.
    pub async fn run<F>(
        &self,
        trigger: Trigger,
        fetch: F,
        message: &str,
        fallback: impl FnOnce() -> T,
    ) -> LoadState<T>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        let ticket = match trigger {
            Trigger::Open => self.start(),
            Trigger::Retry => self.retry(),
        };
        let mut guard = AbandonOnDrop {
            loader: self,
            ticket,
            armed: true,
        };
        let result = fetch.await;
        guard.armed = false;
        self.settle(ticket, result, message, fallback);
        self.snapshot()
    }
}

/// Why a fetch is being started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Trigger {
    #[default]
    Open,
    Retry,
}

struct AbandonOnDrop<'a, T: Clone> {
    loader: &'a Loader<T>,
    ticket: Ticket,
    armed: bool,
}

impl<T: Clone> Drop for AbandonOnDrop<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            self.loader.abandon(self.ticket);
        }
    }
}

/// Who is looking: the configured user (if any) and communities joined
/// during this process.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub user_id: Option<String>,
    pub joined: HashSet<String>,
}

pub async fn fetch_feed<C: TableClient>(client: &C, now: DateTime<Utc>) -> Result<FeedBuckets, StoreError> {
    let rows = client
        .select(TOPICS, &Query::all().order_desc("created_at"))
        .await?;
    let rows: Vec<TopicRow> = decode_rows(TOPICS, rows)?;
    Ok(FeedBuckets::partition(transform::display_topics(rows, now)))
}

pub async fn load_feed<C: TableClient>(
    loader: &Loader<FeedBuckets>,
    trigger: Trigger,
    client: &C,
    now: DateTime<Utc>,
) -> LoadState<FeedBuckets> {
    loader
        .run(trigger, fetch_feed(client, now), FEED_ERROR, fallback::feed)
        .await
}

/// Communities split into joined / discoverable, plus the sidebar list.
#[derive(Debug, Clone, PartialEq)]
pub struct Directory {
    pub communities: CommunityBuckets,
    pub sidebar: Vec<SidebarEntry>,
}

async fn fetch_memberships<C: TableClient>(
    client: &C,
    user_id: &str,
    community_id: Option<&str>,
) -> Result<Vec<MembershipRow>, StoreError> {
    let mut query = Query::all().eq("user_id", user_id);
    if let Some(id) = community_id {
        query = query.eq("community_id", id);
    }
    let rows = client.select(COMMUNITY_MEMBERSHIPS, &query).await?;
    decode_rows(COMMUNITY_MEMBERSHIPS, rows)
}

fn decode_communities(rows: Vec<CommunityRow>) -> Result<Vec<Community>, StoreError> {
    rows.into_iter()
        .map(transform::community)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|reason| StoreError::malformed(COMMUNITIES, reason))
}

pub async fn fetch_directory<C: TableClient>(client: &C, viewer: &Viewer) -> Result<Directory, StoreError> {
    let rows = client
        .select(COMMUNITIES, &Query::all().order_desc("member_count"))
        .await?;
    let communities = decode_communities(decode_rows(COMMUNITIES, rows)?)?;

    let memberships = match &viewer.user_id {
        Some(user_id) => fetch_memberships(client, user_id, None).await?,
        None => Vec::new(),
    };

    let mut joined = viewer.joined.clone();
    joined.extend(memberships.iter().filter_map(|m| m.community_id.clone()));

    let mut sidebar = transform::sidebar_entries(memberships, &communities);
    for community in &communities {
        let listed = sidebar.iter().any(|e| e.community_id == community.id);
        if viewer.joined.contains(&community.id) && !listed {
            sidebar.push(SidebarEntry {
                community_id: community.id.clone(),
                name: community.name.clone(),
                subscription: community.access.kind(),
                has_new_activity: false,
                unread_count: None,
            });
        }
    }

    Ok(Directory {
        communities: CommunityBuckets::partition(communities, &joined),
        sidebar,
    })
}

pub fn fallback_directory(viewer: &Viewer) -> Directory {
    Directory {
        communities: CommunityBuckets::partition(fallback::communities(), &viewer.joined),
        sidebar: fallback::sidebar(),
    }
}

pub async fn load_directory<C: TableClient>(
    loader: &Loader<Directory>,
    trigger: Trigger,
    client: &C,
    viewer: &Viewer,
) -> LoadState<Directory> {
    loader
        .run(trigger, fetch_directory(client, viewer), DIRECTORY_ERROR, || {
            fallback_directory(viewer)
        })
        .await
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommunityPage {
    Found {
        community: Community,
        topics: Vec<DisplayTopic>,
    },
    NotFound,
}

/// Looks up one community by id. `None` when the store has no such row.
pub async fn fetch_community<C: TableClient>(client: &C, id: &str) -> Result<Option<Community>, StoreError> {
    let rows = client.select(COMMUNITIES, &Query::all().eq("id", id)).await?;
    let rows: Vec<CommunityRow> = decode_rows(COMMUNITIES, rows)?;
    Ok(decode_communities(rows)?.into_iter().next())
}

pub async fn fetch_community_page<C: TableClient>(
    client: &C,
    id: &str,
    viewer: &Viewer,
    now: DateTime<Utc>,
) -> Result<CommunityPage, StoreError> {
    let topics_query = Query::all().eq("community_id", id).order_desc("created_at");
    let (community, topic_rows) = tokio::join!(
        fetch_community(client, id),
        client.select(TOPICS, &topics_query),
    );
    let topic_rows: Vec<TopicRow> = decode_rows(TOPICS, topic_rows?)?;

    let Some(mut community) = community? else {
        tracing::info!(community = id, "community not found");
        return Ok(CommunityPage::NotFound);
    };

    community.joined = viewer.joined.contains(id);
    if !community.joined {
        if let Some(user_id) = &viewer.user_id {
            community.joined = !fetch_memberships(client, user_id, Some(id)).await?.is_empty();
        }
    }

    Ok(CommunityPage::Found {
        community,
        topics: transform::display_topics(topic_rows, now),
    })
}

pub fn fallback_community_page(id: &str, viewer: &Viewer) -> CommunityPage {
    let mut community = fallback::community_page(id);
    community.joined = viewer.joined.contains(&community.id);
    CommunityPage::Found {
        community,
        topics: fallback::community_page_topics(),
    }
}

pub async fn load_community_page<C: TableClient>(
    loader: &Loader<CommunityPage>,
    trigger: Trigger,
    client: &C,
    id: &str,
    viewer: &Viewer,
    now: DateTime<Utc>,
) -> LoadState<CommunityPage> {
    loader
        .run(
            trigger,
            fetch_community_page(client, id, viewer, now),
            COMMUNITY_ERROR,
            || fallback_community_page(id, viewer),
        )
        .await
}
