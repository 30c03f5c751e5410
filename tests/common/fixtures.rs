//! Test fixtures and app setup utilities

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use propfolio_server::api::{create_router, AppState};
use propfolio_server::billing::{BillingProvider, CheckoutParams, HostedSession};
use propfolio_server::config::Config;
use propfolio_server::error::{ServerError, ServerResult};
use propfolio_server::store::JsonStore;

/// A router wired to a fresh store on a temp file, with the billing
/// provider stubbed out
pub struct TestApp {
    pub router: Router,
    pub store: Arc<JsonStore>,
    pub billing: Arc<StubBilling>,
    _dir: tempfile::TempDir,
}

/// Create a test app with the default development configuration
pub async fn test_app() -> TestApp {
    test_app_with(Config::default()).await
}

/// Create a test app with a custom configuration
pub async fn test_app_with(config: Config) -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(
        JsonStore::open(dir.path().join("data.json"))
            .await
            .expect("open store"),
    );
    let billing = Arc::new(StubBilling::default());
    let state = Arc::new(AppState::new(
        Arc::clone(&store),
        Arc::clone(&billing) as Arc<dyn BillingProvider>,
        config,
    ));

    TestApp {
        router: create_router(state),
        store,
        billing,
        _dir: dir,
    }
}

/// Scripted billing provider: deterministic ids, optional failure mode
#[derive(Default)]
pub struct StubBilling {
    pub fail: Mutex<bool>,
    pub sessions_opened: Mutex<Vec<CheckoutParams>>,
}

impl StubBilling {
    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    fn check(&self) -> ServerResult<()> {
        if *self.fail.lock().unwrap() {
            Err(ServerError::Billing("stub provider down".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BillingProvider for StubBilling {
    async fn create_customer(&self, email: &str) -> ServerResult<String> {
        self.check()?;
        Ok(format!("cus_stub_{}", email.len()))
    }

    async fn create_checkout_session(&self, params: CheckoutParams) -> ServerResult<HostedSession> {
        self.check()?;
        self.sessions_opened.lock().unwrap().push(params);
        Ok(HostedSession {
            id: "cs_stub_1".to_string(),
            url: "https://billing.example/c/cs_stub_1".to_string(),
        })
    }

    async fn retrieve_checkout_session(&self, session_id: &str) -> ServerResult<Value> {
        self.check()?;
        Ok(json!({"id": session_id, "status": "complete"}))
    }
}

/// Send a request and decode the JSON response body
pub async fn request(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("build request");

    let response = router.clone().oneshot(request).await.expect("send request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Sign up a fresh account, returning its bearer token and id
pub async fn signup(router: &Router, email: &str) -> (String, u64) {
    let (status, body) = request(
        router,
        "POST",
        "/api/signup",
        None,
        Some(json!({"email": email, "password": "pw123456"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "signup failed: {body}");
    (
        body["token"].as_str().expect("token").to_string(),
        body["account"]["id"].as_u64().expect("account id"),
    )
}
