//! Mock API implementations for isolating services in tests.

use mockall::mock;
use serde_json::Value;

use crate::api::errors::ApiResult;
use crate::api::{OrderStatusWriter, ResourceReader, ResourceWriter};
use crate::domain::order::{DeliveryStatus, OrderStatus};
use crate::domain::types::{EntityId, ResourceName};
use crate::dto::list::ListRequest;
use crate::forms::payload::FormPayload;

mock! {
    pub Api {}

    impl ResourceReader for Api {
        fn list(&self, resource: &ResourceName, request: &ListRequest) -> ApiResult<Value>;
        fn list_all(&self, resource: &ResourceName) -> ApiResult<Value>;
        fn get_by_id(&self, resource: &ResourceName, id: EntityId) -> ApiResult<Value>;
    }

    impl ResourceWriter for Api {
        fn create(&self, resource: &ResourceName, payload: &FormPayload) -> ApiResult<Value>;
        fn update(
            &self,
            resource: &ResourceName,
            id: EntityId,
            payload: &FormPayload,
        ) -> ApiResult<Value>;
        fn delete(&self, resource: &ResourceName, ids: &[EntityId]) -> ApiResult<()>;
        fn restore(&self, resource: &ResourceName, ids: &[EntityId]) -> ApiResult<()>;
        fn force_delete(&self, resource: &ResourceName, ids: &[EntityId]) -> ApiResult<()>;
        fn set_active(&self, resource: &ResourceName, id: EntityId, active: bool) -> ApiResult<()>;
    }

    impl OrderStatusWriter for Api {
        fn change_order_status(&self, order_id: EntityId, status: OrderStatus) -> ApiResult<()>;
        fn assign_delivery_status(
            &self,
            order_id: EntityId,
            status: DeliveryStatus,
        ) -> ApiResult<()>;
    }
}
