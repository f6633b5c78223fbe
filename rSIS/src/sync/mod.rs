//! Sync controller: mediates between the store and its data sources.
//!
//! One controller per logical list session (screen/role context). It fetches
//! pages from a [`NotificationSource`], debounces full reloads, accumulates
//! pagination, decides when a server-reported unread count is trustworthy,
//! and falls back to the cached snapshot when the remote root fetch fails.

mod normalize;
mod poll;
mod source;
mod throttle;

pub use normalize::{normalize_page, normalize_record};
pub use poll::{Poller, DEFAULT_POLL_INTERVAL};
pub use source::{NotificationPage, NotificationSource, PageRequest, DEFAULT_PAGE_SIZE};
pub use throttle::{Clock, SharedClock, SystemClock, Throttle};

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::cache::{root_snapshot_key, CacheStorage, CacheStorageExt};
use crate::error::Result;
use crate::models::NotificationCollection;
use crate::store::NotificationStore;

/// Debounce window for full reloads.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(5);

/// Which collection this session feeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncTarget {
    /// The signed-in user's own collection.
    Root,
    /// One child's collection, keyed by the child's auth code.
    Student(String),
}

/// List-session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// What a load attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Fresh data applied to the store; carries the number of items received.
    Loaded(usize),
    /// Dropped: a page-1 load was already in flight.
    AlreadyLoading,
    /// Suppressed by the reload debounce window.
    Debounced,
    /// Response arrived for a superseded session and was discarded.
    StaleDiscarded,
    /// Remote fetch failed; the cached snapshot was applied instead.
    CacheFallback,
    /// No further pages exist.
    EndOfList,
}

/// Sync controller for one list session.
pub struct SyncController {
    source: Arc<dyn NotificationSource>,
    cache: Option<Arc<dyn CacheStorage>>,
    clock: SharedClock,
    throttle: Throttle,
    target: SyncTarget,
    state: ListState,
    /// Session token; responses whose token no longer matches are discarded.
    generation: u64,
    page: u32,
    page_size: u32,
    category: Option<String>,
    has_more: bool,
    total: Option<u64>,
    snapshot_key: Option<String>,
}

impl std::fmt::Debug for SyncController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncController")
            .field("target", &self.target)
            .field("state", &self.state)
            .field("page", &self.page)
            .field("has_more", &self.has_more)
            .finish()
    }
}

impl SyncController {
    /// Create a controller feeding the root collection, with the wall clock
    /// and the default debounce window.
    pub fn new(source: Arc<dyn NotificationSource>) -> Self {
        Self {
            source,
            cache: None,
            clock: Arc::new(SystemClock),
            throttle: Throttle::new(DEFAULT_DEBOUNCE),
            target: SyncTarget::Root,
            state: ListState::Idle,
            generation: 0,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            category: None,
            has_more: false,
            total: None,
            snapshot_key: None,
        }
    }

    /// Feed a child's collection instead of the root.
    pub fn for_student(mut self, student_auth_code: impl Into<String>) -> Self {
        self.target = SyncTarget::Student(student_auth_code.into());
        self
    }

    /// Use a snapshot cache for offline fallback. Only the root collection
    /// is snapshotted.
    pub fn with_cache(mut self, cache: Arc<dyn CacheStorage>, user_id: &str) -> Self {
        self.cache = Some(cache);
        self.snapshot_key = Some(root_snapshot_key(user_id));
        self
    }

    /// Replace the clock (tests).
    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    /// Override the reload debounce window.
    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.throttle = Throttle::new(window);
        self
    }

    /// Set a server-side category filter for this session.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Override the page size.
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = size;
        self
    }

    /// Current session state.
    pub fn state(&self) -> ListState {
        self.state
    }

    /// Whether more server pages are known or assumed to exist.
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Last loaded page number (0 before the first load).
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Start a new session: in-flight responses become stale and the next
    /// reload bypasses the debounce. Call on navigation or role change.
    pub fn reset_session(&mut self) {
        self.generation += 1;
        self.state = ListState::Idle;
        self.page = 0;
        self.has_more = false;
        self.total = None;
        self.throttle.reset();
    }

    /// Full reload (page 1).
    ///
    /// Dropped when a page-1 load is already in flight, suppressed inside
    /// the debounce window. On failure the store is left untouched unless a
    /// cached snapshot exists for the root collection.
    pub async fn load(&mut self, store: &mut NotificationStore) -> Result<LoadOutcome> {
        if self.state == ListState::Loading {
            return Ok(LoadOutcome::AlreadyLoading);
        }
        if !self.throttle.allow(self.clock.now_ms()) {
            debug!("reload debounced for {:?}", self.target);
            return Ok(LoadOutcome::Debounced);
        }

        let generation = self.generation;
        self.state = ListState::Loading;

        let req = self.request(1);
        match self.source.fetch_page(&req).await {
            Ok(page) => {
                if generation != self.generation {
                    return Ok(LoadOutcome::StaleDiscarded);
                }
                let received = page.items.len();
                self.update_paging(received, received, page.total);
                self.apply(store, page.items, page.unread_count);
                self.page = 1;
                self.state = ListState::Loaded;
                self.write_snapshot(store).await;
                Ok(LoadOutcome::Loaded(received))
            }
            Err(e) => {
                if generation != self.generation {
                    return Ok(LoadOutcome::StaleDiscarded);
                }
                self.state = ListState::Failed;
                if let Some(snapshot) = self.read_snapshot().await {
                    warn!("remote load failed, using cached snapshot: {}", e);
                    store.replace_all(snapshot.items, Some(snapshot.unread_count));
                    return Ok(LoadOutcome::CacheFallback);
                }
                Err(e)
            }
        }
    }

    /// Fetch the next page and append it. Bypasses the reload debounce.
    ///
    /// The server's per-page unread count is ignored here; a partial page
    /// cannot speak for the whole list, so the count is recomputed from the
    /// accumulated items.
    pub async fn load_more(&mut self, store: &mut NotificationStore) -> Result<LoadOutcome> {
        if self.state == ListState::Loading {
            return Ok(LoadOutcome::AlreadyLoading);
        }
        if !self.has_more {
            return Ok(LoadOutcome::EndOfList);
        }

        let generation = self.generation;
        self.state = ListState::Loading;

        let req = self.request(self.page + 1);
        match self.source.fetch_page(&req).await {
            Ok(page) => {
                if generation != self.generation {
                    return Ok(LoadOutcome::StaleDiscarded);
                }
                let received = page.items.len();
                let mut items = self.current_items(store);
                items.extend(page.items);
                self.update_paging(items.len(), received, page.total);
                // None forces count(!read) over the full accumulated set.
                self.apply(store, items, None);
                self.page += 1;
                self.state = ListState::Loaded;
                Ok(LoadOutcome::Loaded(received))
            }
            Err(e) => {
                if generation != self.generation {
                    return Ok(LoadOutcome::StaleDiscarded);
                }
                self.state = ListState::Failed;
                Err(e)
            }
        }
    }

    /// Mark a notification read: optimistic store mutation first, then the
    /// server call, whose failure is logged and ignored (never rolled
    /// back). Returns whether the id was known to the store.
    pub async fn mark_read(&self, store: &mut NotificationStore, id: &str) -> bool {
        let (server_id, student_code) = match store.find(id) {
            Some(n) => (n.server_id().to_owned(), n.student_auth_code.clone()),
            None => {
                debug!("mark_read: unknown id {}", id);
                return false;
            }
        };

        store.mark_read(id);

        if let Err(e) = self
            .source
            .mark_read(&server_id, student_code.as_deref())
            .await
        {
            warn!("mark_read confirmation failed for {}: {}", server_id, e);
        }
        true
    }

    /// Mark everything in this session's collection read.
    ///
    /// Local state flips immediately. If the bulk server call fails, falls
    /// back to individual mark-read calls for every previously-unread item,
    /// sequentially, swallowing individual failures.
    pub async fn mark_all_read(&self, store: &mut NotificationStore) {
        let student_code = match &self.target {
            SyncTarget::Root => None,
            SyncTarget::Student(key) => Some(key.clone()),
        };

        let unread_ids = match &self.target {
            SyncTarget::Root => store.root().unread_server_ids(),
            SyncTarget::Student(key) => store
                .student(key)
                .map(NotificationCollection::unread_server_ids)
                .unwrap_or_default(),
        };

        match &self.target {
            SyncTarget::Root => store.mark_all_root_read(),
            SyncTarget::Student(key) => store.mark_all_student_read(key),
        }

        if let Err(e) = self.source.mark_all_read(student_code.as_deref()).await {
            warn!(
                "mark_all_read failed, falling back to {} individual calls: {}",
                unread_ids.len(),
                e
            );
            for id in unread_ids {
                if let Err(e) = self.source.mark_read(&id, student_code.as_deref()).await {
                    warn!("individual mark_read failed for {}: {}", id, e);
                }
            }
        }
    }

    fn request(&self, page: u32) -> PageRequest {
        PageRequest {
            page,
            limit: self.page_size,
            category: self.category.clone(),
            student_auth_code: match &self.target {
                SyncTarget::Root => None,
                SyncTarget::Student(key) => Some(key.clone()),
            },
        }
    }

    fn current_items(&self, store: &NotificationStore) -> Vec<crate::models::Notification> {
        match &self.target {
            SyncTarget::Root => store.root().items.clone(),
            SyncTarget::Student(key) => store
                .student(key)
                .map(|c| c.items.clone())
                .unwrap_or_default(),
        }
    }

    fn apply(
        &self,
        store: &mut NotificationStore,
        items: Vec<crate::models::Notification>,
        unread_count: Option<u32>,
    ) {
        match &self.target {
            SyncTarget::Root => store.replace_all(items, unread_count),
            SyncTarget::Student(key) => {
                store.set_student_collection(key.clone(), items, unread_count)
            }
        }
    }

    fn update_paging(&mut self, loaded: usize, received: usize, reported_total: Option<u64>) {
        if reported_total.is_some() {
            self.total = reported_total;
        }
        self.has_more = match self.total {
            Some(total) => (loaded as u64) < total,
            None => received as u32 >= self.page_size,
        };
    }

    async fn write_snapshot(&self, store: &NotificationStore) {
        if self.target != SyncTarget::Root {
            return;
        }
        if let (Some(cache), Some(key)) = (&self.cache, &self.snapshot_key) {
            if let Err(e) = cache.set_json(key.as_str(), store.root()).await {
                warn!("snapshot write failed: {}", e);
            }
        }
    }

    async fn read_snapshot(&self) -> Option<NotificationCollection> {
        if self.target != SyncTarget::Root {
            return None;
        }
        let cache = self.cache.as_ref()?;
        let key = self.snapshot_key.as_ref()?;
        cache.get_json(key).await
    }
}
