//! Data layer of the delivery platform admin: paginated resource tables,
//! confirmed mutations, optimistic order status updates, form payload
//! encoding and the image gallery editor.

#[cfg(feature = "data")]
pub mod api;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
pub mod dto;
#[cfg(feature = "data")]
pub mod error_conversions;
#[cfg(feature = "data")]
pub mod forms;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod pagination;
#[cfg(feature = "data")]
pub mod services;

/// Page size used when no configuration says otherwise.
pub const DEFAULT_PER_PAGE: usize = 10;
