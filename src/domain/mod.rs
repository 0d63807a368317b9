//! Domain values shared by the query, mutation and form layers.

pub mod entity;
pub mod gallery;
pub mod order;
pub mod types;
pub mod upload;
