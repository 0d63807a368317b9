//! Optimistic order and delivery status updates.
//!
//! An update is split in two so the request can run elsewhere:
//! [`StatusBoard::begin`] patches the row and marks it in flight, then
//! [`StatusBoard::finish`] commits or rolls the patch back. Only the row
//! being updated is locked.

use std::collections::HashSet;

use serde_json::Value;

use crate::api::errors::ApiResult;
use crate::api::{OrderStatusWriter, ResourceReader};
use crate::domain::entity::Entity;
use crate::domain::order::StatusUpdate;
use crate::domain::types::{EntityId, ResourceName};
use crate::dto::list::{ListRequest, unwrap_record};
use crate::forms::status::StatusChange;
use crate::services::list::fetch_page;
use crate::services::{Notice, ServiceError, ServiceResult};

pub const ORDERS_RESOURCE: &str = "orders";
pub const DELIVERY_AGENTS_RESOURCE: &str = "man-delivery";

/// Where the rows of a board come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowSource {
    /// A page of the orders list.
    Orders(ListRequest),
    /// The orders assigned to one delivery agent, read from
    /// `GET /back/man-delivery/:id` under `orders`.
    DeliveryAgent(EntityId),
}

impl RowSource {
    pub fn load<R>(&self, api: &R) -> ServiceResult<Vec<Entity>>
    where
        R: ResourceReader + ?Sized,
    {
        match self {
            RowSource::Orders(request) => {
                let resource = ResourceName::new(ORDERS_RESOURCE)?;
                Ok(fetch_page(api, &resource, request)?.data)
            }
            RowSource::DeliveryAgent(agent_id) => {
                let resource = ResourceName::new(DELIVERY_AGENTS_RESOURCE)?;
                let agent = unwrap_record(api.get_by_id(&resource, *agent_id)?);
                let orders = match agent {
                    Value::Object(mut agent) => match agent.remove("orders") {
                        Some(Value::Array(orders)) => orders,
                        _ => Vec::new(),
                    },
                    _ => return Err(ServiceError::NotFound),
                };
                Ok(orders.into_iter().filter_map(Entity::from_value).collect())
            }
        }
    }
}

/// A status change that has been applied locally but not confirmed.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusTicket {
    pub order_id: EntityId,
    pub update: StatusUpdate,
    previous: Option<Value>,
}

impl StatusTicket {
    /// Sends the change to the backend.
    pub fn send<W>(&self, api: &W) -> ApiResult<()>
    where
        W: OrderStatusWriter + ?Sized,
    {
        match self.update {
            StatusUpdate::Order(status) => api.change_order_status(self.order_id, status),
            StatusUpdate::Delivery(status) => api.assign_delivery_status(self.order_id, status),
        }
    }

    fn success_message(&self) -> String {
        match self.update {
            StatusUpdate::Order(status) => format!("Order status updated to {status}"),
            StatusUpdate::Delivery(status) => format!("Delivery status updated to {status}"),
        }
    }

    fn failure_message(&self) -> &'static str {
        match self.update {
            StatusUpdate::Order(_) => "Failed to change order status",
            StatusUpdate::Delivery(_) => "Failed to update status",
        }
    }
}

/// Orders shown with editable statuses.
#[derive(Debug)]
pub struct StatusBoard {
    source: RowSource,
    rows: Vec<Entity>,
    updating: HashSet<EntityId>,
    notices: Vec<Notice>,
}

impl StatusBoard {
    pub fn new(source: RowSource) -> Self {
        Self {
            source,
            rows: Vec::new(),
            updating: HashSet::new(),
            notices: Vec::new(),
        }
    }

    pub fn with_rows(source: RowSource, rows: Vec<Entity>) -> Self {
        Self {
            rows,
            ..Self::new(source)
        }
    }

    pub fn rows(&self) -> &[Entity] {
        &self.rows
    }

    pub fn row(&self, id: EntityId) -> Option<&Entity> {
        self.rows.iter().find(|row| row.id == id)
    }

    pub fn is_updating(&self, id: EntityId) -> bool {
        self.updating.contains(&id)
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Reloads the rows from their source.
    pub fn refresh<R>(&mut self, api: &R) -> ServiceResult<()>
    where
        R: ResourceReader + ?Sized,
    {
        self.rows = self.source.load(api)?;
        Ok(())
    }

    /// Patches the row and marks it in flight.
    pub fn begin(&mut self, change: StatusChange) -> ServiceResult<StatusTicket> {
        if self.updating.contains(&change.order_id) {
            return Err(ServiceError::Busy(format!(
                "order {} is already being updated",
                change.order_id
            )));
        }
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.id == change.order_id)
            .ok_or(ServiceError::NotFound)?;

        let field = change.update.field();
        let previous = row.get(field).cloned();
        row.set(field, change.update.as_str());
        self.updating.insert(change.order_id);

        Ok(StatusTicket {
            order_id: change.order_id,
            update: change.update,
            previous,
        })
    }

    /// Commits the patch, or restores the previous value when `result` is an
    /// error.
    pub fn finish(&mut self, ticket: StatusTicket, result: ApiResult<()>) -> ServiceResult<()> {
        self.updating.remove(&ticket.order_id);
        match result {
            Ok(()) => {
                log::info!(
                    "Order {} {} set to {}",
                    ticket.order_id,
                    ticket.update.field(),
                    ticket.update.as_str()
                );
                self.notices.push(Notice::success(ticket.success_message()));
                Ok(())
            }
            Err(err) => {
                log::error!("Failed to update order {}: {err}", ticket.order_id);
                if let Some(row) = self.rows.iter_mut().find(|row| row.id == ticket.order_id) {
                    let field = ticket.update.field();
                    match &ticket.previous {
                        Some(previous) => row.set(field, previous.clone()),
                        None => {
                            row.fields.remove(field);
                        }
                    }
                }
                self.notices
                    .push(Notice::error(err.user_message(ticket.failure_message())));
                Err(err.into())
            }
        }
    }

    /// Runs a whole update and reloads the rows afterwards, whatever the
    /// outcome.
    pub fn update<A>(&mut self, api: &A, change: StatusChange) -> ServiceResult<()>
    where
        A: ResourceReader + OrderStatusWriter + ?Sized,
    {
        let ticket = self.begin(change)?;
        let result = ticket.send(api);
        let outcome = self.finish(ticket, result);
        if let Err(err) = self.refresh(api) {
            log::error!("Failed to reload orders: {err}");
        }
        outcome
    }
}
