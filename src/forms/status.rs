use serde::Deserialize;

use crate::domain::order::{DeliveryStatus, OrderStatus, StatusUpdate};
use crate::domain::types::EntityId;
use crate::forms::FormError;

#[derive(Debug, Deserialize)]
/// Raw status change as picked from a status dropdown.
pub struct StatusChangeForm {
    pub order_id: i64,
    pub status: String,
    /// `true` for the delivery-agent vocabulary, `false` for order statuses.
    #[serde(default)]
    pub delivery: bool,
}

/// Validated status change for one order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusChange {
    pub order_id: EntityId,
    pub update: StatusUpdate,
}

impl TryFrom<StatusChangeForm> for StatusChange {
    type Error = FormError;

    fn try_from(form: StatusChangeForm) -> Result<Self, Self::Error> {
        let order_id = EntityId::new(form.order_id)?;
        let update = if form.delivery {
            StatusUpdate::Delivery(form.status.parse::<DeliveryStatus>()?)
        } else {
            StatusUpdate::Order(form.status.parse::<OrderStatus>()?)
        };
        Ok(Self { order_id, update })
    }
}
