//! Related-record lists feeding select inputs (brands of a product, agents
//! of an order and so on).

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use crate::api::ResourceReader;
use crate::domain::entity::Entity;
use crate::domain::types::{EntityId, ResourceName, SortDirection};
use crate::dto::list::{ListRequest, ListResponse};

pub const LOOKUP_PER_PAGE: usize = 100;
/// How long lookup results are reused when no configuration says otherwise.
pub const DEFAULT_LOOKUP_STALE: Duration = Duration::from_secs(300);

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LookupQuery {
    /// Name of the input the list feeds.
    pub key: String,
    pub resource: ResourceName,
    pub filters: BTreeMap<String, String>,
}

impl LookupQuery {
    pub fn new(key: impl Into<String>, resource: ResourceName) -> Self {
        Self {
            key: key.into(),
            resource,
            filters: BTreeMap::new(),
        }
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Filtered lookups go through the index endpoint, unfiltered ones fetch
    /// the plain collection.
    pub fn to_request(&self) -> Option<ListRequest> {
        if self.filters.is_empty() {
            return None;
        }
        Some(ListRequest {
            filters: self.filters.clone(),
            order_by: "id".to_string(),
            order_by_direction: SortDirection::Desc,
            per_page: LOOKUP_PER_PAGE,
            page: None,
            paginate: true,
            deleted: Some(false),
        })
    }
}

/// One choice of a select input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupOption {
    pub value: EntityId,
    pub label: String,
}

/// Fetches the records of a lookup. Failures are logged and give an empty
/// list so the form stays usable.
pub fn fetch_lookup<R>(api: &R, query: &LookupQuery) -> Vec<Entity>
where
    R: ResourceReader + ?Sized,
{
    let result = match query.to_request() {
        Some(request) => api.list(&query.resource, &request),
        None => api.list_all(&query.resource),
    };
    match result {
        Ok(body) => ListResponse::decode(body).into_page(LOOKUP_PER_PAGE).data,
        Err(err) => {
            log::warn!("Failed to load {} options from {}: {err}", query.key, query.resource);
            Vec::new()
        }
    }
}

pub fn to_options(entities: &[Entity]) -> Vec<LookupOption> {
    entities
        .iter()
        .map(|entity| LookupOption {
            value: entity.id,
            label: entity.display_title(),
        })
        .collect()
}

/// Lookup results by query, kept longer than list pages since they change
/// rarely.
#[derive(Debug)]
pub struct LookupCache {
    stale_after: Duration,
    entries: HashMap<LookupQuery, (Vec<Entity>, Instant)>,
}

impl LookupCache {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            stale_after,
            entries: HashMap::new(),
        }
    }

    pub fn load<R>(&mut self, api: &R, query: &LookupQuery) -> Vec<Entity>
    where
        R: ResourceReader + ?Sized,
    {
        let cached = self
            .entries
            .get(query)
            .filter(|(_, fetched_at)| fetched_at.elapsed() < self.stale_after);
        if let Some((entities, _)) = cached {
            return entities.clone();
        }
        let entities = fetch_lookup(api, query);
        self.entries
            .insert(query.clone(), (entities.clone(), Instant::now()));
        entities
    }

    pub fn invalidate(&mut self, resource: &ResourceName) {
        self.entries.retain(|query, _| &query.resource != resource);
    }
}
