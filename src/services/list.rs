//! Paginated list state and the cache of fetched pages.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::api::ResourceReader;
use crate::domain::types::{ResourceName, SortDirection};
use crate::dto::list::{ListRequest, ListResponse, Page};
use crate::services::selection::SelectionSet;
use crate::services::{ServiceError, ServiceResult};

pub const DEFAULT_ORDER_BY: &str = "id";
pub const SEARCH_FILTER: &str = "search";

/// Fetches one page of `resource` with a single `POST /back/<r>/index`.
///
/// Unknown response shapes give an empty page; transport and server errors
/// are returned.
pub fn fetch_page<R>(api: &R, resource: &ResourceName, request: &ListRequest) -> ServiceResult<Page>
where
    R: ResourceReader + ?Sized,
{
    let body = api.list(resource, request).map_err(|err| {
        log::error!("Failed to list {resource}: {err}");
        err
    })?;
    Ok(ListResponse::decode(body).into_page(request.per_page))
}

/// Everything that identifies one fetched page.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListKey {
    pub resource: ResourceName,
    pub request: ListRequest,
}

/// Filters, sort, pagination, deleted view, staged search text and the
/// selection of one table.
#[derive(Clone, Debug)]
pub struct ListState {
    resource: ResourceName,
    default_filters: BTreeMap<String, String>,
    filters: BTreeMap<String, String>,
    order_by: String,
    direction: SortDirection,
    page: usize,
    per_page: usize,
    showing_deleted: bool,
    search_text: String,
    filter_panel_open: bool,
    selection: SelectionSet,
}

impl ListState {
    pub fn new(resource: ResourceName, per_page: usize) -> Self {
        Self {
            resource,
            default_filters: BTreeMap::new(),
            filters: BTreeMap::new(),
            order_by: DEFAULT_ORDER_BY.to_string(),
            direction: SortDirection::Desc,
            page: 1,
            per_page: per_page.max(1),
            showing_deleted: false,
            search_text: String::new(),
            filter_panel_open: false,
            selection: SelectionSet::new(),
        }
    }

    /// Filters merged into every request. They also seed the active filters.
    pub fn with_default_filters(mut self, defaults: BTreeMap<String, String>) -> Self {
        self.filters = defaults.clone();
        self.default_filters = defaults;
        self
    }

    pub fn resource(&self) -> &ResourceName {
        &self.resource
    }

    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    pub fn order_by(&self) -> &str {
        &self.order_by
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn showing_deleted(&self) -> bool {
        self.showing_deleted
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn filter_panel_open(&self) -> bool {
        self.filter_panel_open
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionSet {
        &mut self.selection
    }

    pub fn set_filters(&mut self, filters: BTreeMap<String, String>) {
        self.filters = filters;
        self.page = 1;
    }

    pub fn set_filter(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.filters.insert(key.into(), value.into());
        self.page = 1;
    }

    pub fn set_order_by(&mut self, key: impl Into<String>) {
        self.order_by = key.into();
    }

    pub fn set_order_direction(&mut self, direction: SortDirection) {
        self.direction = direction;
    }

    /// Column header click: the same column flips the direction, another
    /// column becomes the sort key.
    pub fn sort_by(&mut self, key: &str) {
        if self.order_by == key {
            self.direction = self.direction.flipped();
        } else {
            self.order_by = key.to_string();
        }
    }

    pub fn set_showing_deleted(&mut self, showing_deleted: bool) {
        self.showing_deleted = showing_deleted;
        self.page = 1;
        self.selection.clear();
    }

    pub fn toggle_deleted(&mut self) {
        self.set_showing_deleted(!self.showing_deleted);
    }

    pub fn set_per_page(&mut self, per_page: usize) {
        self.per_page = per_page.max(1);
        self.page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn reset_filters(&mut self) {
        self.filters.clear();
        self.order_by = DEFAULT_ORDER_BY.to_string();
        self.direction = SortDirection::Desc;
        self.page = 1;
        self.filter_panel_open = false;
    }

    pub fn toggle_filter_panel(&mut self) {
        self.filter_panel_open = !self.filter_panel_open;
    }

    /// Stages search text without touching the query.
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    pub fn apply_search(&mut self) {
        let term = self.search_text.trim();
        if term.is_empty() {
            self.filters.remove(SEARCH_FILTER);
        } else {
            self.filters.insert(SEARCH_FILTER.to_string(), term.to_string());
        }
        self.page = 1;
    }

    pub fn clear_search(&mut self) {
        self.search_text.clear();
        self.filters.remove(SEARCH_FILTER);
        self.page = 1;
    }

    /// Default filters overlaid with the active ones, empty values dropped.
    pub fn merged_filters(&self) -> BTreeMap<String, String> {
        let mut merged = self.default_filters.clone();
        merged.extend(self.filters.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged.retain(|_, value| !value.trim().is_empty());
        merged
    }

    pub fn to_request(&self) -> ListRequest {
        ListRequest {
            filters: self.merged_filters(),
            order_by: self.order_by.clone(),
            order_by_direction: self.direction,
            per_page: self.per_page,
            page: Some(self.page),
            paginate: true,
            deleted: self.showing_deleted.then_some(true),
        }
    }

    pub fn key(&self) -> ListKey {
        ListKey {
            resource: self.resource.clone(),
            request: self.to_request(),
        }
    }
}

#[derive(Clone, Debug)]
struct CachedPage {
    page: Page,
    fetched_at: Instant,
    invalidated: bool,
}

/// Fetched pages by key.
///
/// A key has at most one fetch outstanding. Results are stored under the key
/// that requested them, so an old response never replaces a newer page.
#[derive(Debug)]
pub struct ListCache {
    stale_after: Duration,
    entries: HashMap<ListKey, CachedPage>,
    in_flight: HashSet<ListKey>,
}

impl ListCache {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            stale_after,
            entries: HashMap::new(),
            in_flight: HashSet::new(),
        }
    }

    /// Last page stored under `key`, however old.
    pub fn get(&self, key: &ListKey) -> Option<&Page> {
        self.entries.get(key).map(|entry| &entry.page)
    }

    pub fn fresh(&self, key: &ListKey) -> Option<&Page> {
        self.fresh_at(key, Instant::now())
    }

    pub fn fresh_at(&self, key: &ListKey, now: Instant) -> Option<&Page> {
        self.entries
            .get(key)
            .filter(|entry| {
                !entry.invalidated
                    && now.saturating_duration_since(entry.fetched_at) < self.stale_after
            })
            .map(|entry| &entry.page)
    }

    /// Number of pages held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops pages that can no longer be served fresh. Pages of keys with a
    /// fetch out are kept as the fallback for concurrent loads.
    fn prune_at(&mut self, now: Instant) {
        let stale_after = self.stale_after;
        let in_flight = &self.in_flight;
        self.entries.retain(|key, entry| {
            in_flight.contains(key)
                || (!entry.invalidated
                    && now.saturating_duration_since(entry.fetched_at) < stale_after)
        });
    }

    pub fn is_in_flight(&self, key: &ListKey) -> bool {
        self.in_flight.contains(key)
    }

    /// Marks `key` as being fetched. `false` when a fetch is already out.
    pub fn begin(&mut self, key: &ListKey) -> bool {
        self.in_flight.insert(key.clone())
    }

    /// Records the outcome of a fetch started with [`ListCache::begin`].
    pub fn complete(&mut self, key: ListKey, result: ServiceResult<Page>) -> ServiceResult<Page> {
        self.in_flight.remove(&key);
        let page = result?;
        self.prune_at(Instant::now());
        self.entries.insert(
            key,
            CachedPage {
                page: page.clone(),
                fetched_at: Instant::now(),
                invalidated: false,
            },
        );
        Ok(page)
    }

    /// Forces the next load of any page of `resource` to hit the server.
    pub fn invalidate(&mut self, resource: &ResourceName) {
        for (key, entry) in self.entries.iter_mut() {
            if &key.resource == resource {
                entry.invalidated = true;
            }
        }
        self.prune_at(Instant::now());
    }

    /// Fresh cached page, or one fetched now.
    ///
    /// While another fetch of the same key is out, the stale page is returned
    /// if there is one.
    pub fn load<R>(&mut self, api: &R, key: &ListKey) -> ServiceResult<Page>
    where
        R: ResourceReader + ?Sized,
    {
        if let Some(page) = self.fresh(key) {
            return Ok(page.clone());
        }
        if !self.begin(key) {
            return self
                .get(key)
                .cloned()
                .ok_or_else(|| ServiceError::Busy(format!("{} is loading", key.resource)));
        }
        let result = fetch_page(api, &key.resource, &key.request);
        self.complete(key.clone(), result)
    }
}
