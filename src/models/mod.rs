//! Runtime models that are neither wire payloads nor domain values.

pub mod config;
pub mod session;
