//! Login exchange with `/login/admin`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Credentials posted to the login endpoint.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login answer. Only `token` is required; the admin record is
/// kept as raw JSON.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default, alias = "admin", alias = "data")]
    pub user: Option<Value>,
}
