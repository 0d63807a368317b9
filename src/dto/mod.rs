//! Wire payloads exchanged with the admin REST API.

pub mod auth;
pub mod list;
pub mod mutation;
