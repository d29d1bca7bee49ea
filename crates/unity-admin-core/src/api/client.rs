//! Request pipeline for the assessment platform API.
//!
//! Every call goes through `ApiClient`: the outbound stage attaches the
//! bearer credential, the inbound stage unwraps the `{ code, msg, data }`
//! envelope and classifies failures into `ApiError`. Authentication
//! failures drive the one-shot `LogoutSequence`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::multipart::Form;
use reqwest::{header, Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::envelope::{Envelope, ErrorBody, NOT_FOUND_CODE, SUCCESS_CODE, UNAUTHORIZED_CODE};
use super::logout::{LogNotifier, LogoutSequence, Navigator, Notifier};
use super::ApiError;
use crate::auth::{LoginError, SessionStore};
use crate::config::Config;

// ============================================================================
// Constants
// ============================================================================

/// Credential exchange endpoint, relative to the API base URL
const LOGIN_PATH: &str = "/login/token";

/// Fallback message for a business failure without `msg`
const GENERIC_BUSINESS_ERROR: &str = "System error";

/// Fallback message for a rejected credential without a remote message
const GENERIC_AUTH_EXPIRED: &str = "Credential rejected by the server";

struct ClientInner {
    base_url: String,
    session: SessionStore,
    notifier: Arc<dyn Notifier>,
    logout: LogoutSequence,
}

/// API client for the assessment platform.
/// Clone is cheap - clones share the connection pool, the session store and
/// the logout state.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    inner: Arc<ClientInner>,
}

pub struct ApiClientBuilder {
    base_url: String,
    timeout: Duration,
    session: SessionStore,
    notifier: Arc<dyn Notifier>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl ApiClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        let client = Client::builder().timeout(self.timeout).build()?;
        let logout = LogoutSequence::new(
            self.session.clone(),
            Arc::clone(&self.notifier),
            self.navigator,
        );

        Ok(ApiClient {
            client,
            inner: Arc::new(ClientInner {
                base_url: self.base_url.trim_end_matches('/').to_string(),
                session: self.session,
                notifier: self.notifier,
                logout,
            }),
        })
    }
}

impl ApiClient {
    pub fn builder(base_url: impl Into<String>, session: SessionStore) -> ApiClientBuilder {
        ApiClientBuilder {
            base_url: base_url.into(),
            timeout: Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS),
            session,
            notifier: Arc::new(LogNotifier),
            navigator: None,
        }
    }

    /// Client configured from `config`, with log-only notices.
    pub fn from_config(config: &Config, session: SessionStore) -> Result<Self> {
        Self::builder(config.api_base_url.clone(), session)
            .timeout(config.request_timeout())
            .build()
    }

    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Whether a forced logout has already happened in this client.
    pub fn is_logout_pending(&self) -> bool {
        self.inner.logout.is_pending()
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.inner.base_url, path)
        } else {
            format!("{}/{}", self.inner.base_url, path)
        }
    }

    // ===== Session =====

    /// Exchange credentials at the login endpoint and store the result.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), LoginError> {
        let url = self.url(LOGIN_PATH);
        self.inner
            .session
            .login(&self.client, &url, username, password)
            .await
    }

    /// Explicit user logout. Clears the credential without notices.
    pub fn logout(&self) -> Result<()> {
        self.inner.session.clear_credential()
    }

    // ===== Outbound stage =====

    fn auth_headers(&self) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = self.inner.session.current_credential() {
            match header::HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(header::AUTHORIZATION, value);
                }
                Err(_) => warn!("Stored credential is not a valid header value, sending without it"),
            }
        }
        headers
    }

    // ===== Request helpers =====

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(Method::GET, path, None::<&()>).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(Method::POST, path, Some(body)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(Method::PUT, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(Method::DELETE, path, None::<&()>).await
    }

    /// POST a multipart form (file uploads).
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, ApiError> {
        let request = self.request(Method::POST, path).multipart(form);
        self.dispatch(request, path).await
    }

    async fn execute<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.dispatch(request, path).await
    }

    /// Outbound stage: every request carries the current credential.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!(%method, url = %url, "Sending request");

        self.client
            .request(method, &url)
            .header(header::ACCEPT, "application/json")
            .headers(self.auth_headers())
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &str,
    ) -> Result<T, ApiError> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Err(self.network_failure(ApiError::from(e))),
        };

        let status = response.status();
        if !status.is_success() {
            let raw = response
                .error_for_status_ref()
                .err()
                .map(|e| e.to_string())
                .unwrap_or_else(|| format!("HTTP status {}", status));
            let text = response.text().await.unwrap_or_default();
            return Err(self.classify_http_failure(status, &text, raw));
        }

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return Err(self.network_failure(ApiError::from(e))),
        };
        let payload = self.classify_body(&text)?;

        serde_json::from_value(payload).map_err(|e| {
            self.network_failure(ApiError::InvalidResponse(format!(
                "Unexpected payload from {}: {}",
                path, e
            )))
        })
    }

    // ===== Inbound stage =====

    /// Classify a 2xx body and return the payload.
    fn classify_body(&self, text: &str) -> Result<Value, ApiError> {
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        let body: Value = serde_json::from_str(text).map_err(|e| {
            self.network_failure(ApiError::InvalidResponse(format!(
                "{}: {}",
                e,
                ApiError::truncate_body(text)
            )))
        })?;

        let Some(envelope) = Envelope::from_value(&body) else {
            // Plain JSON, not an envelope
            return Ok(body);
        };

        match envelope.code {
            SUCCESS_CODE => Ok(envelope.data.unwrap_or(body)),
            UNAUTHORIZED_CODE => Err(self.auth_failure(Some(envelope.msg))),
            NOT_FOUND_CODE => {
                debug!(message = %envelope.msg, "Envelope reported not found");
                Err(ApiError::NotFound { envelope })
            }
            code => {
                let message = if envelope.msg.is_empty() {
                    GENERIC_BUSINESS_ERROR.to_string()
                } else {
                    envelope.msg
                };
                warn!(code, message = %message, "Business error");
                self.inner.notifier.error(&message);
                Err(ApiError::Business { code, message })
            }
        }
    }

    /// Classify a reply with a non-2xx HTTP status.
    fn classify_http_failure(&self, status: StatusCode, text: &str, raw: String) -> ApiError {
        let body: ErrorBody = serde_json::from_str(text).unwrap_or_default();

        match status {
            StatusCode::UNAUTHORIZED => self.auth_failure(body.message()),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                let fields = body.field_errors();
                let message = body.message().unwrap_or(raw);
                debug!(status = status.as_u16(), message = %message, "Validation error");
                ApiError::Validation { message, fields }
            }
            _ => {
                let message = body
                    .detail_text()
                    .or_else(|| body.msg.clone().filter(|m| !m.is_empty()))
                    .unwrap_or(raw);
                self.network_failure(ApiError::Network(message))
            }
        }
    }

    fn auth_failure(&self, message: Option<String>) -> ApiError {
        let message = message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| GENERIC_AUTH_EXPIRED.to_string());
        warn!(message = %message, "Authentication failure");
        self.inner.logout.trigger();
        ApiError::AuthExpired(message)
    }

    /// Log and notify a transport-level failure.
    fn network_failure(&self, error: ApiError) -> ApiError {
        warn!(kind = %error.kind(), error = %error.message(), "Request failed");
        self.inner.notifier.error(error.message());
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::logout::testing::{RecordingNavigator, RecordingNotifier};
    use crate::api::logout::SESSION_EXPIRED_PROMPT;
    use crate::api::ErrorKind;
    use crate::auth::MemoryTokenStorage;
    use crate::navigation::Route;
    use mockito::Matcher;
    use serde_json::json;

    struct Harness {
        server: mockito::ServerGuard,
        client: ApiClient,
        session: SessionStore,
        notifier: Arc<RecordingNotifier>,
        navigator: Arc<RecordingNavigator>,
    }

    async fn harness(credential: Option<&str>) -> Harness {
        let server = mockito::Server::new_async().await;
        let session = SessionStore::open(MemoryTokenStorage::new());
        if let Some(credential) = credential {
            session.set_credential(credential).unwrap();
        }
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(RecordingNavigator::at(Route::Platforms));
        let client = ApiClient::builder(server.url(), session.clone())
            .timeout(Duration::from_secs(5))
            .notifier(notifier.clone())
            .navigator(navigator.clone())
            .build()
            .unwrap();

        Harness {
            server,
            client,
            session,
            notifier,
            navigator,
        }
    }

    #[tokio::test]
    async fn test_attaches_stored_credential() {
        let mut h = harness(Some("t1")).await;
        let mock = h
            .server
            .mock("GET", "/platforms/")
            .match_header("authorization", "Bearer t1")
            .with_body(r#"{"code": 200, "msg": "success", "data": []}"#)
            .create_async()
            .await;

        let platforms: Vec<Value> = h.client.get("/platforms/").await.unwrap();
        assert!(platforms.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_header_without_credential() {
        let mut h = harness(None).await;
        let mock = h
            .server
            .mock("GET", "/platforms/")
            .match_header("authorization", Matcher::Missing)
            .with_body(r#"{"code": 200, "msg": "success", "data": []}"#)
            .create_async()
            .await;

        let _: Vec<Value> = h.client.get("/platforms/").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_success_returns_data() {
        let mut h = harness(Some("t1")).await;
        h.server
            .mock("GET", "/platforms/1")
            .with_body(r#"{"code": 200, "msg": "success", "data": {"id": 1, "name": "Welding"}}"#)
            .create_async()
            .await;

        let platform: Value = h.client.get("/platforms/1").await.unwrap();
        assert_eq!(platform, json!({ "id": 1, "name": "Welding" }));
        assert!(h.notifier.errors.lock().is_empty());
    }

    #[tokio::test]
    async fn test_success_without_data_returns_envelope() {
        let mut h = harness(Some("t1")).await;
        h.server
            .mock("POST", "/assessments/1/publish")
            .with_body(r#"{"code": 200, "msg": "published"}"#)
            .create_async()
            .await;

        let body: Value = h.client.post("/assessments/1/publish", &json!({})).await.unwrap();
        assert_eq!(body, json!({ "code": 200, "msg": "published" }));
    }

    #[tokio::test]
    async fn test_null_data_deserializes_to_unit() {
        let mut h = harness(Some("t1")).await;
        h.server
            .mock("DELETE", "/users/3")
            .with_body(r#"{"code": 200, "msg": "deleted", "data": null}"#)
            .create_async()
            .await;

        let () = h.client.delete("/users/3").await.unwrap();
    }

    #[tokio::test]
    async fn test_plain_json_is_passed_through() {
        let mut h = harness(Some("t1")).await;
        h.server
            .mock("GET", "/assessments/")
            .with_body(r#"[{"id": 1, "title": "Spring"}]"#)
            .create_async()
            .await;

        let assessments: Vec<Value> = h.client.get("/assessments/").await.unwrap();
        assert_eq!(assessments.len(), 1);
    }

    #[tokio::test]
    async fn test_soft_401_logs_out() {
        let mut h = harness(Some("t1")).await;
        h.server
            .mock("GET", "/platforms/")
            .with_body(r#"{"code": 401, "msg": "token expired"}"#)
            .create_async()
            .await;

        let err = h.client.get::<Value>("/platforms/").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthExpired);
        assert_eq!(err.message(), "token expired");
        assert_eq!(h.session.current_credential(), None);
        assert_eq!(h.notifier.alerts.lock().as_slice(), [SESSION_EXPIRED_PROMPT]);
        assert!(h.notifier.errors.lock().is_empty());
        assert_eq!(h.navigator.visits.lock().as_slice(), [Route::Login]);
    }

    #[tokio::test]
    async fn test_hard_401_logs_out() {
        let mut h = harness(Some("t1")).await;
        h.server
            .mock("GET", "/users/")
            .with_status(401)
            .with_body(r#"{"detail": "Could not validate credentials"}"#)
            .create_async()
            .await;

        let err = h.client.get::<Value>("/users/").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthExpired);
        assert_eq!(err.message(), "Could not validate credentials");
        assert!(!h.session.is_authenticated());
        assert_eq!(h.notifier.alerts.lock().len(), 1);
        assert!(h.client.is_logout_pending());
    }

    #[tokio::test]
    async fn test_concurrent_401s_trigger_one_logout() {
        let mut h = harness(Some("t1")).await;
        let mock = h
            .server
            .mock("GET", "/platforms/")
            .with_body(r#"{"code": 401, "msg": "token expired"}"#)
            .expect(5)
            .create_async()
            .await;

        let calls = (0..5).map(|_| h.client.get::<Value>("/platforms/"));
        let results = futures::future::join_all(calls).await;

        assert_eq!(results.len(), 5);
        for result in results {
            assert_eq!(result.unwrap_err().kind(), ErrorKind::AuthExpired);
        }
        assert_eq!(h.notifier.alerts.lock().len(), 1);
        assert_eq!(h.navigator.visits.lock().len(), 1);
        assert_eq!(h.session.current_credential(), None);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_mixed_401s_trigger_one_logout() {
        let mut h = harness(Some("t1")).await;
        h.server
            .mock("GET", "/platforms/")
            .with_body(r#"{"code": 401, "msg": "token expired"}"#)
            .create_async()
            .await;
        h.server
            .mock("GET", "/users/")
            .with_status(401)
            .create_async()
            .await;

        let (a, b) = tokio::join!(
            h.client.get::<Value>("/platforms/"),
            h.client.get::<Value>("/users/")
        );
        assert_eq!(a.unwrap_err().kind(), ErrorKind::AuthExpired);
        assert_eq!(b.unwrap_err().kind(), ErrorKind::AuthExpired);
        assert_eq!(h.notifier.alerts.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_404_envelope_is_silent() {
        let mut h = harness(Some("t1")).await;
        h.server
            .mock("GET", "/platforms/99")
            .with_body(r#"{"code": 404, "msg": "Platform not found", "data": null}"#)
            .create_async()
            .await;

        let err = h.client.get::<Value>("/platforms/99").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        match err {
            ApiError::NotFound { envelope } => {
                assert_eq!(envelope.code, 404);
                assert_eq!(envelope.msg, "Platform not found");
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
        assert!(h.notifier.errors.lock().is_empty());
        assert!(h.notifier.alerts.lock().is_empty());
        assert!(h.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_business_error_notifies() {
        let mut h = harness(Some("t1")).await;
        h.server
            .mock("POST", "/platforms/")
            .with_body(r#"{"code": 409, "msg": "Platform already exists", "data": {"id": 1}}"#)
            .create_async()
            .await;

        let err = h
            .client
            .post::<Value, _>("/platforms/", &json!({ "name": "Welding" }))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BusinessError);
        assert_eq!(err.message(), "Platform already exists");
        assert_eq!(h.notifier.errors.lock().as_slice(), ["Platform already exists"]);
    }

    #[tokio::test]
    async fn test_business_error_without_message() {
        let mut h = harness(Some("t1")).await;
        h.server
            .mock("GET", "/platforms/")
            .with_body(r#"{"code": 500}"#)
            .create_async()
            .await;

        let err = h.client.get::<Value>("/platforms/").await.unwrap_err();
        assert_eq!(err.message(), GENERIC_BUSINESS_ERROR);
        assert_eq!(h.notifier.errors.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_422_is_silent_validation_error() {
        let mut h = harness(Some("t1")).await;
        h.server
            .mock("POST", "/platforms/")
            .with_status(422)
            .with_body(
                r#"{"detail": [{"loc": ["body", "name"], "msg": "field required", "type": "value_error.missing"}]}"#,
            )
            .create_async()
            .await;

        let err = h
            .client
            .post::<Value, _>("/platforms/", &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        match &err {
            ApiError::Validation { fields, .. } => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].field, "body.name");
            }
            other => panic!("expected Validation, got {:?}", other),
        }
        assert!(h.notifier.errors.lock().is_empty());
    }

    #[tokio::test]
    async fn test_400_is_silent_validation_error() {
        let mut h = harness(Some("t1")).await;
        h.server
            .mock("POST", "/platforms/")
            .with_status(400)
            .with_body(r#"{"detail": "Platform with name 'Welding' already exists."}"#)
            .create_async()
            .await;

        let err = h
            .client
            .post::<Value, _>("/platforms/", &json!({ "name": "Welding" }))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert_eq!(err.message(), "Platform with name 'Welding' already exists.");
        assert!(h.notifier.errors.lock().is_empty());
    }

    #[tokio::test]
    async fn test_server_error_prefers_detail() {
        let mut h = harness(Some("t1")).await;
        h.server
            .mock("GET", "/platforms/")
            .with_status(500)
            .with_body(r#"{"detail": "database unavailable", "msg": "ignored"}"#)
            .create_async()
            .await;

        let err = h.client.get::<Value>("/platforms/").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkError);
        assert_eq!(err.message(), "database unavailable");
        assert_eq!(h.notifier.errors.lock().as_slice(), ["database unavailable"]);
    }

    #[tokio::test]
    async fn test_server_error_falls_back_to_msg_then_raw() {
        let mut h = harness(Some("t1")).await;
        h.server
            .mock("GET", "/a")
            .with_status(503)
            .with_body(r#"{"msg": "maintenance"}"#)
            .create_async()
            .await;
        h.server
            .mock("GET", "/b")
            .with_status(502)
            .with_body("<html>bad gateway</html>")
            .create_async()
            .await;

        let err = h.client.get::<Value>("/a").await.unwrap_err();
        assert_eq!(err.message(), "maintenance");

        let err = h.client.get::<Value>("/b").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkError);
        assert!(err.message().contains("502"));
        assert_eq!(h.notifier.errors.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let session = SessionStore::open(MemoryTokenStorage::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let client = ApiClient::builder("http://127.0.0.1:1", session)
            .timeout(Duration::from_secs(2))
            .notifier(notifier.clone())
            .build()
            .unwrap();

        let err = client.get::<Value>("/platforms/").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkError);
        assert_eq!(notifier.errors.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_request_timeout_is_network_error() {
        // Connections queue in the backlog but nothing ever answers
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let session = SessionStore::open(MemoryTokenStorage::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let client = ApiClient::builder(format!("http://{}", addr), session)
            .timeout(Duration::from_millis(300))
            .notifier(notifier.clone())
            .build()
            .unwrap();

        let err = client.get::<Value>("/platforms/").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkError);
        assert_eq!(notifier.errors.lock().len(), 1);
        drop(listener);
    }

    #[tokio::test]
    async fn test_payload_type_mismatch_is_invalid_response() {
        let mut h = harness(Some("t1")).await;
        h.server
            .mock("GET", "/platforms/")
            .with_body(r#"{"code": 200, "msg": "success", "data": "not a list"}"#)
            .create_async()
            .await;

        let err = h.client.get::<Vec<Value>>("/platforms/").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
        assert_eq!(h.notifier.errors.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_login_then_request_carries_new_credential() {
        let mut h = harness(None).await;
        h.server
            .mock("POST", "/login/token")
            .with_body(r#"{"code": 200, "msg": "success", "data": {"access_token": "fresh", "token_type": "bearer"}}"#)
            .create_async()
            .await;
        let mock = h
            .server
            .mock("GET", "/users/")
            .match_header("authorization", "Bearer fresh")
            .with_body(r#"{"code": 200, "msg": "success", "data": []}"#)
            .create_async()
            .await;

        h.client.login("alice", "pw").await.unwrap();
        let _: Vec<Value> = h.client.get("/users/").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_401_after_relogin_clears_new_credential() {
        let mut h = harness(Some("t1")).await;
        h.server
            .mock("GET", "/platforms/")
            .with_body(r#"{"code": 401, "msg": "token expired"}"#)
            .expect(2)
            .create_async()
            .await;
        h.server
            .mock("POST", "/login/token")
            .with_body(r#"{"access_token": "t2", "token_type": "bearer"}"#)
            .create_async()
            .await;

        h.client.get::<Value>("/platforms/").await.unwrap_err();
        h.client.login("alice", "pw").await.unwrap();
        assert_eq!(h.session.current_credential(), Some("t2".to_string()));

        let err = h.client.get::<Value>("/platforms/").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthExpired);
        assert_eq!(h.session.current_credential(), None);
        assert_eq!(h.notifier.alerts.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_explicit_logout_is_quiet() {
        let h = harness(Some("t1")).await;
        h.client.logout().unwrap();
        h.client.logout().unwrap();

        assert!(!h.session.is_authenticated());
        assert!(!h.client.is_logout_pending());
        assert!(h.notifier.alerts.lock().is_empty());
    }

    #[test]
    fn test_url_joining() {
        let session = SessionStore::open(MemoryTokenStorage::new());
        let client = ApiClient::builder("http://localhost:8000/api/v1/", session)
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api/v1");
        assert_eq!(client.url("/platforms/"), "http://localhost:8000/api/v1/platforms/");
        assert_eq!(client.url("users/"), "http://localhost:8000/api/v1/users/");
    }
}
