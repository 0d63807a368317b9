//! Access to the admin REST API.
//!
//! Services depend on the reader/writer traits below, never on the HTTP
//! client, so they can run against mocks and in-memory backends.

use serde_json::Value;

use crate::api::errors::ApiResult;
use crate::domain::order::{DeliveryStatus, OrderStatus};
use crate::domain::types::{EntityId, ResourceName};
use crate::dto::list::ListRequest;
use crate::forms::payload::FormPayload;

pub mod errors;
#[cfg(feature = "client")]
pub mod http;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

pub trait ResourceReader {
    /// `POST /back/<resource>/index`. Returns the raw body; shape decoding is
    /// left to the caller.
    fn list(&self, resource: &ResourceName, request: &ListRequest) -> ApiResult<Value>;
    /// `GET /back/<resource>`, the unpaginated collection.
    fn list_all(&self, resource: &ResourceName) -> ApiResult<Value>;
    /// `GET /back/<resource>/:id`.
    fn get_by_id(&self, resource: &ResourceName, id: EntityId) -> ApiResult<Value>;
}

pub trait ResourceWriter {
    fn create(&self, resource: &ResourceName, payload: &FormPayload) -> ApiResult<Value>;
    fn update(&self, resource: &ResourceName, id: EntityId, payload: &FormPayload)
    -> ApiResult<Value>;
    fn delete(&self, resource: &ResourceName, ids: &[EntityId]) -> ApiResult<()>;
    fn restore(&self, resource: &ResourceName, ids: &[EntityId]) -> ApiResult<()>;
    fn force_delete(&self, resource: &ResourceName, ids: &[EntityId]) -> ApiResult<()>;
    fn set_active(&self, resource: &ResourceName, id: EntityId, active: bool) -> ApiResult<()>;
}

pub trait OrderStatusWriter {
    /// `POST /back/orders/change-status/:id`.
    fn change_order_status(&self, order_id: EntityId, status: OrderStatus) -> ApiResult<()>;
    /// `PUT /back/delivery/order/:id/assign`.
    fn assign_delivery_status(&self, order_id: EntityId, status: DeliveryStatus)
    -> ApiResult<()>;
}
