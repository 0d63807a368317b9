//! In-memory stand-in for the admin REST API.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;

use delivery_admin::api::errors::{ApiError, ApiResult};
use delivery_admin::api::{OrderStatusWriter, ResourceReader, ResourceWriter};
use delivery_admin::domain::order::{DeliveryStatus, OrderStatus};
use delivery_admin::domain::types::{EntityId, ResourceName, SortDirection};
use delivery_admin::dto::list::ListRequest;
use delivery_admin::forms::multipart::PartValue;
use delivery_admin::forms::payload::FormPayload;
use serde_json::{Map, Value, json};

/// Every call the backend received, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    List(String, ListRequest),
    ListAll(String),
    Get(String, i64),
    Create(String, FormPayload),
    Update(String, i64, FormPayload),
    Delete(String, Vec<i64>),
    Restore(String, Vec<i64>),
    ForceDelete(String, Vec<i64>),
    SetActive(String, i64, bool),
    OrderStatus(i64, String),
    DeliveryStatus(i64, String),
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Call::List(..) | Call::ListAll(_) | Call::Get(..))
    }
}

#[derive(Default)]
pub struct InMemoryApi {
    rows: RefCell<BTreeMap<String, Vec<Map<String, Value>>>>,
    calls: RefCell<Vec<Call>>,
    next_id: RefCell<i64>,
    fail_mutations: Option<String>,
}

fn raw_ids(ids: &[EntityId]) -> Vec<i64> {
    ids.iter().map(|id| id.get()).collect()
}

fn row_id(row: &Map<String, Value>) -> i64 {
    row.get("id").and_then(Value::as_i64).unwrap_or_default()
}

fn is_deleted(row: &Map<String, Value>) -> bool {
    row.get("deleted").and_then(Value::as_bool).unwrap_or(false)
}

impl InMemoryApi {
    pub fn new() -> Self {
        Self {
            next_id: RefCell::new(1000),
            ..Self::default()
        }
    }

    /// Every mutation answers with a 422 carrying `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            fail_mutations: Some(message.to_string()),
            ..Self::new()
        }
    }

    pub fn seed(&self, resource: &str, rows: Vec<Value>) {
        let rows = rows
            .into_iter()
            .filter_map(|row| match row {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        self.rows.borrow_mut().insert(resource.to_string(), rows);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn row(&self, resource: &str, id: i64) -> Option<Map<String, Value>> {
        self.rows
            .borrow()
            .get(resource)?
            .iter()
            .find(|row| row_id(row) == id)
            .cloned()
    }

    fn record(&self, call: Call) -> ApiResult<()> {
        let mutation = call.is_mutation();
        self.calls.borrow_mut().push(call);
        match &self.fail_mutations {
            Some(message) if mutation => Err(ApiError::Server {
                status: 422,
                message: Some(message.clone()),
            }),
            _ => Ok(()),
        }
    }

    fn update_rows(
        &self,
        resource: &ResourceName,
        ids: &[EntityId],
        f: impl Fn(&mut Map<String, Value>),
    ) {
        let ids = raw_ids(ids);
        if let Some(rows) = self.rows.borrow_mut().get_mut(resource.as_str()) {
            rows.iter_mut()
                .filter(|row| ids.contains(&row_id(row)))
                .for_each(|row| f(row));
        }
    }

    fn apply_payload(row: &mut Map<String, Value>, payload: &FormPayload) {
        match payload {
            FormPayload::Json(body) => {
                for (key, value) in body {
                    row.insert(key.clone(), value.clone());
                }
            }
            FormPayload::Multipart(parts) => {
                for (key, value) in parts.parts() {
                    if key == "_method" || key.contains('[') {
                        continue;
                    }
                    let value = match value {
                        PartValue::Text(text) if text.is_empty() => continue,
                        PartValue::Text(text) => json!(text),
                        PartValue::File(file) => json!(format!("/storage/{}", file.file_name)),
                    };
                    row.insert(key.clone(), value);
                }
            }
        }
    }
}

impl ResourceReader for InMemoryApi {
    fn list(&self, resource: &ResourceName, request: &ListRequest) -> ApiResult<Value> {
        self.record(Call::List(resource.to_string(), request.clone()))?;
        let rows = self.rows.borrow();
        let mut matching: Vec<&Map<String, Value>> = rows
            .get(resource.as_str())
            .map(|rows| rows.iter().collect())
            .unwrap_or_default();

        let showing_deleted = request.deleted.unwrap_or(false);
        matching.retain(|row| is_deleted(row) == showing_deleted);
        matching.retain(|row| {
            request.filters.iter().all(|(key, value)| match (key.as_str(), row.get(key)) {
                ("search", _) => row
                    .get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|name| name.to_lowercase().contains(&value.to_lowercase())),
                (_, Some(Value::String(field))) => field == value,
                (_, Some(other)) => &other.to_string() == value,
                (_, None) => false,
            })
        });
        matching.sort_by_key(|row| row_id(row));
        if request.order_by_direction == SortDirection::Desc {
            matching.reverse();
        }

        let total = matching.len();
        let per_page = request.per_page.max(1);
        let page = request.page.unwrap_or(1).max(1);
        let last_page = total.div_ceil(per_page).max(1);
        let data: Vec<Value> = matching
            .into_iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .map(|row| Value::Object(row.clone()))
            .collect();

        Ok(json!({
            "data": data,
            "meta": {
                "current_page": page,
                "last_page": last_page,
                "per_page": per_page,
                "total": total,
                "links": [],
            }
        }))
    }

    fn list_all(&self, resource: &ResourceName) -> ApiResult<Value> {
        self.record(Call::ListAll(resource.to_string()))?;
        let rows = self.rows.borrow();
        let data: Vec<Value> = rows
            .get(resource.as_str())
            .map(|rows| rows.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default();
        Ok(Value::Array(data))
    }

    fn get_by_id(&self, resource: &ResourceName, id: EntityId) -> ApiResult<Value> {
        self.record(Call::Get(resource.to_string(), id.get()))?;
        match self.row(resource.as_str(), id.get()) {
            Some(row) => Ok(json!({"result": "Success", "data": row})),
            None => Err(ApiError::Server {
                status: 404,
                message: Some("Not found".to_string()),
            }),
        }
    }
}

impl ResourceWriter for InMemoryApi {
    fn create(&self, resource: &ResourceName, payload: &FormPayload) -> ApiResult<Value> {
        self.record(Call::Create(resource.to_string(), payload.clone()))?;
        let id = {
            let mut next_id = self.next_id.borrow_mut();
            *next_id += 1;
            *next_id
        };
        let mut row = Map::new();
        row.insert("id".to_string(), json!(id));
        Self::apply_payload(&mut row, payload);
        self.rows
            .borrow_mut()
            .entry(resource.to_string())
            .or_default()
            .push(row.clone());
        Ok(json!({"result": "Success", "data": row}))
    }

    fn update(
        &self,
        resource: &ResourceName,
        id: EntityId,
        payload: &FormPayload,
    ) -> ApiResult<Value> {
        self.record(Call::Update(resource.to_string(), id.get(), payload.clone()))?;
        self.update_rows(resource, &[id], |row| Self::apply_payload(row, payload));
        Ok(json!({"result": "Success"}))
    }

    fn delete(&self, resource: &ResourceName, ids: &[EntityId]) -> ApiResult<()> {
        self.record(Call::Delete(resource.to_string(), raw_ids(ids)))?;
        self.update_rows(resource, ids, |row| {
            row.insert("deleted".to_string(), json!(true));
        });
        Ok(())
    }

    fn restore(&self, resource: &ResourceName, ids: &[EntityId]) -> ApiResult<()> {
        self.record(Call::Restore(resource.to_string(), raw_ids(ids)))?;
        self.update_rows(resource, ids, |row| {
            row.insert("deleted".to_string(), json!(false));
        });
        Ok(())
    }

    fn force_delete(&self, resource: &ResourceName, ids: &[EntityId]) -> ApiResult<()> {
        self.record(Call::ForceDelete(resource.to_string(), raw_ids(ids)))?;
        let ids = raw_ids(ids);
        if let Some(rows) = self.rows.borrow_mut().get_mut(resource.as_str()) {
            rows.retain(|row| !ids.contains(&row_id(row)));
        }
        Ok(())
    }

    fn set_active(&self, resource: &ResourceName, id: EntityId, active: bool) -> ApiResult<()> {
        self.record(Call::SetActive(resource.to_string(), id.get(), active))?;
        self.update_rows(resource, &[id], |row| {
            row.insert("active".to_string(), json!(active));
        });
        Ok(())
    }
}

impl OrderStatusWriter for InMemoryApi {
    fn change_order_status(&self, order_id: EntityId, status: OrderStatus) -> ApiResult<()> {
        self.record(Call::OrderStatus(order_id.get(), status.to_string()))?;
        let resource = orders_resource()?;
        self.update_rows(&resource, &[order_id], |row| {
            row.insert("status".to_string(), json!(status.as_str()));
        });
        Ok(())
    }

    fn assign_delivery_status(&self, order_id: EntityId, status: DeliveryStatus) -> ApiResult<()> {
        self.record(Call::DeliveryStatus(order_id.get(), status.to_string()))?;
        let resource = orders_resource()?;
        self.update_rows(&resource, &[order_id], |row| {
            row.insert("delivery_status".to_string(), json!(status.as_str()));
        });
        Ok(())
    }
}

fn orders_resource() -> ApiResult<ResourceName> {
    ResourceName::new("orders").map_err(|err| ApiError::Decode(err.to_string()))
}

pub fn id(value: i64) -> EntityId {
    EntityId::new(value).unwrap()
}

pub fn resource(name: &str) -> ResourceName {
    ResourceName::new(name).unwrap()
}

/// Ten products, ids 1 to 10, all active.
pub fn seeded_products() -> InMemoryApi {
    let api = InMemoryApi::new();
    api.seed(
        "products",
        (1..=10)
            .map(|id| {
                let status = if id % 2 == 0 { "pending" } else { "done" };
                json!({"id": id, "name": format!("Product {id}"), "active": true, "status": status})
            })
            .collect(),
    );
    api
}
