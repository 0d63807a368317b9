//! Request and response shapes of the `/back/<resource>/index` endpoint.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::entity::Entity;
use crate::domain::types::SortDirection;
use crate::pagination::PaginationMeta;

/// Body posted to `/back/<resource>/index`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    pub filters: BTreeMap<String, String>,
    pub order_by: String,
    pub order_by_direction: SortDirection,
    pub per_page: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    pub paginate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

/// One page of a resource, whatever shape the server answered with.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    pub data: Vec<Entity>,
    pub meta: PaginationMeta,
}

impl Page {
    pub fn empty(per_page: usize) -> Self {
        Self {
            data: Vec::new(),
            meta: PaginationMeta::single_page(per_page, 0),
        }
    }

    pub fn ids(&self) -> Vec<crate::domain::types::EntityId> {
        self.data.iter().map(|entity| entity.id).collect()
    }
}

/// The response shapes list endpoints are known to produce.
#[derive(Clone, Debug, PartialEq)]
pub enum ListResponse {
    /// `{"data": [...], "meta": {...}?}`
    Wrapped {
        data: Vec<Value>,
        meta: Option<PaginationMeta>,
    },
    /// `[...]`
    Bare(Vec<Value>),
    /// `{"items": [...], "meta" | "pagination": {...}?}`
    Items {
        items: Vec<Value>,
        meta: Option<PaginationMeta>,
    },
    /// Anything else.
    Unrecognized,
}

fn decode_meta(raw: Option<Value>) -> Option<PaginationMeta> {
    let raw = raw.filter(|value| value.is_object())?;
    match serde_json::from_value(raw) {
        Ok(meta) => Some(meta),
        Err(err) => {
            log::warn!("Ignoring malformed pagination meta: {err}");
            None
        }
    }
}

fn decode_rows(rows: Vec<Value>) -> Vec<Entity> {
    let total = rows.len();
    let entities: Vec<Entity> = rows.into_iter().filter_map(Entity::from_value).collect();
    if entities.len() != total {
        log::warn!(
            "Skipped {} row(s) without a usable id",
            total - entities.len()
        );
    }
    entities
}

impl ListResponse {
    /// Classifies a raw response body. `data` wins over a bare array, which
    /// wins over `items`.
    pub fn decode(value: Value) -> Self {
        match value {
            Value::Object(mut object) => {
                if matches!(object.get("data"), Some(Value::Array(_))) {
                    let Some(Value::Array(data)) = object.remove("data") else {
                        return Self::Unrecognized;
                    };
                    return Self::Wrapped {
                        data,
                        meta: decode_meta(object.remove("meta")),
                    };
                }
                if matches!(object.get("items"), Some(Value::Array(_))) {
                    let Some(Value::Array(items)) = object.remove("items") else {
                        return Self::Unrecognized;
                    };
                    let meta = decode_meta(object.remove("meta"))
                        .or_else(|| decode_meta(object.remove("pagination")));
                    return Self::Items { items, meta };
                }
                Self::Unrecognized
            }
            Value::Array(rows) => Self::Bare(rows),
            _ => Self::Unrecognized,
        }
    }

    /// Normalizes into a page. Missing meta is synthesized as a single page
    /// holding every returned row.
    pub fn into_page(self, per_page: usize) -> Page {
        let (rows, meta) = match self {
            Self::Wrapped { data, meta } => (data, meta),
            Self::Bare(rows) => (rows, None),
            Self::Items { items, meta } => (items, meta),
            Self::Unrecognized => {
                log::warn!("Unexpected API response structure");
                return Page::empty(per_page);
            }
        };
        let data = decode_rows(rows);
        let meta = meta.unwrap_or_else(|| PaginationMeta::single_page(per_page, data.len()));
        Page { data, meta }
    }
}

/// Unwraps the `{"result": ..., "data": {...}}` envelope used by single
/// record endpoints, returning the body unchanged when it has none.
pub fn unwrap_record(value: Value) -> Value {
    match value {
        Value::Object(mut object) if object.get("data").is_some_and(Value::is_object) => {
            object.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}
