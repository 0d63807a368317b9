//! Blocking `reqwest` implementation of the API traits.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::ACCEPT;
use serde_json::Value;

use crate::api::errors::{ApiError, ApiResult};
use crate::api::{OrderStatusWriter, ResourceReader, ResourceWriter};
use crate::domain::order::{DeliveryStatus, OrderStatus};
use crate::domain::types::{EntityId, ResourceName};
use crate::dto::auth::{LoginRequest, LoginResponse};
use crate::dto::list::ListRequest;
use crate::dto::mutation::{ActivePayload, IdsPayload, ServerMessage, StatusPayload};
use crate::forms::multipart::{MultipartPayload, PartValue};
use crate::forms::payload::FormPayload;
use crate::models::config::AdminConfig;
use crate::models::session::Session;

/// Admin API client. Cheap to clone; clones share the connection pool and
/// the session.
#[derive(Clone, Debug)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    session: Session,
}

impl HttpApi {
    pub fn new(config: &AdminConfig, session: Session) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::with_client(client, &config.api_base_url, session))
    }

    pub fn with_client(client: Client, base_url: &str, session: Session) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Exchanges credentials for a token and stores it in the session.
    pub fn login(
        &self,
        request: &LoginRequest,
        ttl: chrono::Duration,
    ) -> ApiResult<LoginResponse> {
        let body = self.send(self.client.post(self.url("login/admin")).json(request))?;
        let response: LoginResponse = serde_json::from_value(body)?;
        self.session.login(response.token.clone(), ttl);
        log::info!("Logged in as {}", request.email);
        Ok(response)
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn resource_url(&self, resource: &ResourceName, suffix: Option<&str>) -> String {
        match suffix {
            Some(suffix) => self.url(&format!("back/{resource}/{suffix}")),
            None => self.url(&format!("back/{resource}")),
        }
    }

    fn send(&self, request: RequestBuilder) -> ApiResult<Value> {
        let request = match self.session.bearer() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.header(ACCEPT, "application/json").send()?;
        read_body(response)
    }

    fn send_payload(&self, request: RequestBuilder, payload: &FormPayload) -> ApiResult<Value> {
        let request = match payload {
            FormPayload::Json(body) => request.json(body),
            FormPayload::Multipart(parts) => request.multipart(multipart_form(parts)?),
        };
        self.send(request)
    }
}

fn read_body(response: Response) -> ApiResult<Value> {
    let status = response.status();
    let text = response.text()?;
    let body: Value = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };

    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    if !status.is_success() {
        let message = ServerMessage::from_body(&body).text().map(str::to_string);
        log::warn!("Request failed with status {status}");
        return Err(ApiError::Server {
            status: status.as_u16(),
            message,
        });
    }
    Ok(body)
}

/// Converts the structured payload into a `reqwest` form. The boundary and
/// content type header are produced by `reqwest`.
fn multipart_form(payload: &MultipartPayload) -> ApiResult<Form> {
    let mut form = Form::new();
    for (name, value) in payload.parts() {
        form = match value {
            PartValue::Text(text) => form.text(name.clone(), text.clone()),
            PartValue::File(file) => {
                let part = Part::bytes(file.bytes().to_vec())
                    .file_name(file.file_name.clone())
                    .mime_str(&file.content_type)?;
                form.part(name.clone(), part)
            }
        };
    }
    Ok(form)
}

fn ids_payload(ids: &[EntityId]) -> IdsPayload {
    IdsPayload { ids: ids.to_vec() }
}

impl ResourceReader for HttpApi {
    fn list(&self, resource: &ResourceName, request: &ListRequest) -> ApiResult<Value> {
        let url = self.resource_url(resource, Some("index"));
        self.send(self.client.post(url).json(request))
    }

    fn list_all(&self, resource: &ResourceName) -> ApiResult<Value> {
        self.send(self.client.get(self.resource_url(resource, None)))
    }

    fn get_by_id(&self, resource: &ResourceName, id: EntityId) -> ApiResult<Value> {
        let url = self.resource_url(resource, Some(&id.to_string()));
        self.send(self.client.get(url))
    }
}

impl ResourceWriter for HttpApi {
    fn create(&self, resource: &ResourceName, payload: &FormPayload) -> ApiResult<Value> {
        let url = self.resource_url(resource, None);
        self.send_payload(self.client.post(url), payload)
    }

    /// Multipart updates are POSTed with `_method=PUT` already in the body;
    /// JSON updates use a real PUT.
    fn update(
        &self,
        resource: &ResourceName,
        id: EntityId,
        payload: &FormPayload,
    ) -> ApiResult<Value> {
        let url = self.resource_url(resource, Some(&id.to_string()));
        let request = match payload {
            FormPayload::Multipart(_) => self.client.post(url),
            FormPayload::Json(_) => self.client.put(url),
        };
        self.send_payload(request, payload)
    }

    fn delete(&self, resource: &ResourceName, ids: &[EntityId]) -> ApiResult<()> {
        let url = self.resource_url(resource, Some("delete"));
        self.send(self.client.delete(url).json(&ids_payload(ids)))?;
        Ok(())
    }

    fn restore(&self, resource: &ResourceName, ids: &[EntityId]) -> ApiResult<()> {
        let url = self.resource_url(resource, Some("restore"));
        self.send(self.client.post(url).json(&ids_payload(ids)))?;
        Ok(())
    }

    fn force_delete(&self, resource: &ResourceName, ids: &[EntityId]) -> ApiResult<()> {
        let url = self.resource_url(resource, Some("forceDelete"));
        self.send(self.client.delete(url).json(&ids_payload(ids)))?;
        Ok(())
    }

    fn set_active(&self, resource: &ResourceName, id: EntityId, active: bool) -> ApiResult<()> {
        let url = self.resource_url(resource, Some(&format!("{id}/active")));
        self.send(self.client.put(url).json(&ActivePayload { active }))?;
        Ok(())
    }
}

impl OrderStatusWriter for HttpApi {
    fn change_order_status(&self, order_id: EntityId, status: OrderStatus) -> ApiResult<()> {
        let url = self.url(&format!("back/orders/change-status/{order_id}"));
        let body = StatusPayload {
            status: status.as_str().to_string(),
        };
        self.send(self.client.post(url).json(&body))?;
        Ok(())
    }

    fn assign_delivery_status(
        &self,
        order_id: EntityId,
        status: DeliveryStatus,
    ) -> ApiResult<()> {
        let url = self.url(&format!("back/delivery/order/{order_id}/assign"));
        let body = StatusPayload {
            status: status.as_str().to_string(),
        };
        let answer = ServerMessage::from_body(&self.send(self.client.put(url).json(&body))?);
        if answer.success == Some(false) {
            let message = answer
                .text()
                .unwrap_or("Failed to update delivery status")
                .to_string();
            return Err(ApiError::Rejected(message));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use httpmock::Method::PUT;
    use httpmock::prelude::*;
    use serde_json::{Map, json};

    use super::*;
    use crate::domain::upload::UploadFile;

    fn api_for(server: &MockServer) -> HttpApi {
        HttpApi::with_client(Client::new(), &server.base_url(), Session::new())
    }

    fn products() -> ResourceName {
        ResourceName::new("products").unwrap()
    }

    fn id(value: i64) -> EntityId {
        EntityId::new(value).unwrap()
    }

    #[test]
    fn list_posts_request_with_bearer_token() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/back/products/index")
                .header("authorization", "Bearer secret")
                .json_body(json!({
                    "filters": {},
                    "orderBy": "id",
                    "orderByDirection": "desc",
                    "perPage": 10,
                    "page": 1,
                    "paginate": true,
                }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"data": [{"id": 1}]}));
        });

        let api = api_for(&server);
        api.session().login("secret", chrono::Duration::hours(1));
        let request = ListRequest {
            filters: Default::default(),
            order_by: "id".into(),
            order_by_direction: Default::default(),
            per_page: 10,
            page: Some(1),
            paginate: true,
            deleted: None,
        };

        let body = api.list(&products(), &request).expect("list should succeed");
        mock.assert();
        assert_eq!(body, json!({"data": [{"id": 1}]}));
    }

    #[test]
    fn server_errors_carry_the_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(DELETE).path("/back/products/delete");
            then.status(422)
                .header("content-type", "application/json")
                .json_body(json!({"message": "Product is referenced by orders"}));
        });

        let err = api_for(&server)
            .delete(&products(), &[id(1), id(2)])
            .expect_err("delete should fail");
        assert!(matches!(
            err,
            ApiError::Server {
                status: 422,
                message: Some(ref m),
            } if m == "Product is referenced by orders"
        ));
    }

    #[test]
    fn unauthorized_is_reported_separately() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/back/brands");
            then.status(401);
        });

        let err = api_for(&server)
            .list_all(&ResourceName::new("brands").unwrap())
            .expect_err("request should be rejected");
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn bulk_mutations_send_ids() {
        let server = MockServer::start();
        let restore = server.mock(|when, then| {
            when.method(POST)
                .path("/back/products/restore")
                .json_body(json!({"ids": [3, 4]}));
            then.status(200);
        });
        let force = server.mock(|when, then| {
            when.method(DELETE)
                .path("/back/products/forceDelete")
                .json_body(json!({"ids": [5]}));
            then.status(200);
        });
        let active = server.mock(|when, then| {
            when.method(PUT)
                .path("/back/products/7/active")
                .json_body(json!({"active": false}));
            then.status(200);
        });

        let api = api_for(&server);
        api.restore(&products(), &[id(3), id(4)]).unwrap();
        api.force_delete(&products(), &[id(5)]).unwrap();
        api.set_active(&products(), id(7), false).unwrap();

        restore.assert();
        force.assert();
        active.assert();
    }

    #[test]
    fn multipart_update_is_posted_with_method_override() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/back/products/9")
                .header_exists("content-type")
                .body_includes("name=\"_method\"")
                .body_includes("name=\"image\"; filename=\"a.png\"");
            then.status(200).json_body(json!({"result": "Success"}));
        });

        let mut parts = MultipartPayload::new();
        parts.push_text("name", "Chair");
        parts.push_file("image", UploadFile::new("a.png", "image/png", vec![1, 2, 3]));
        parts.push_text("_method", "PUT");

        api_for(&server)
            .update(&products(), id(9), &FormPayload::Multipart(parts))
            .expect("update should succeed");
        mock.assert();
    }

    #[test]
    fn json_update_uses_put() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/back/products/9")
                .json_body(json!({"name": "Chair"}));
            then.status(200);
        });

        let mut body = Map::new();
        body.insert("name".into(), json!("Chair"));
        api_for(&server)
            .update(&products(), id(9), &FormPayload::Json(body))
            .unwrap();
        mock.assert();
    }

    #[test]
    fn delivery_assign_with_success_false_is_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PUT)
                .path("/back/delivery/order/12/assign")
                .json_body(json!({"status": "delivering"}));
            then.status(200)
                .json_body(json!({"success": false, "message": "Order not assigned"}));
        });

        let err = api_for(&server)
            .assign_delivery_status(id(12), DeliveryStatus::Delivering)
            .expect_err("assignment should be rejected");
        assert_eq!(err.user_message("x"), "Order not assigned");
    }

    #[test]
    fn order_status_is_posted() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/back/orders/change-status/4")
                .json_body(json!({"status": "shipped"}));
            then.status(200).json_body(json!({"result": "Success"}));
        });

        api_for(&server)
            .change_order_status(id(4), OrderStatus::Shipped)
            .unwrap();
        mock.assert();
    }

    #[test]
    fn login_stores_token_in_session() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/login/admin")
                .json_body(json!({"email": "admin@example.com", "password": "pw"}));
            then.status(200)
                .json_body(json!({"token": "t-1", "admin": {"id": 1}}));
        });

        let api = api_for(&server);
        let response = api
            .login(
                &LoginRequest {
                    email: "admin@example.com".into(),
                    password: "pw".into(),
                },
                chrono::Duration::hours(1),
            )
            .expect("login should succeed");

        assert_eq!(response.token, "t-1");
        assert_eq!(api.session().bearer().as_deref(), Some("t-1"));
        api.logout();
        assert!(!api.session().is_authenticated());
    }
}
