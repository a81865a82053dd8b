//! Scripted backend shared by the integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bookverse_application::auth::RENEWAL_PATH;
use bookverse_application::{
    AuthenticatedClient, HttpTransport, KeyValueStorage, MemoryStorage, TransportError,
};
use bookverse_domain::{ApiRequest, ApiResponse};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::Semaphore;

/// What the backend does with the next renewal exchange.
pub enum Reply {
    Respond(ApiResponse),
    Fail(TransportError),
    Hang,
}

impl Reply {
    pub fn tokens(access: &str, refresh: Option<&str>) -> Self {
        let mut data = json!({ "accessToken": access });
        if let Some(refresh) = refresh {
            data["refreshToken"] = json!(refresh);
        }
        Self::Respond(ApiResponse::json(200, &json!({ "data": data })))
    }
}

/// In-memory stand-in for the storefront backend.
///
/// Protected routes answer 401 unless the bearer matches `valid_token`.
/// A successful renewal reply makes its access token the valid one.
#[derive(Default)]
pub struct MockBackend {
    valid_token: Mutex<Option<String>>,
    renewals: Mutex<VecDeque<Reply>>,
    routes: Mutex<HashMap<String, ApiResponse>>,
    public: Mutex<HashMap<String, ApiResponse>>,
    gate: Option<Arc<Semaphore>>,
    held: Mutex<HashMap<String, Arc<Semaphore>>>,
    frozen: AtomicBool,
    log: Mutex<Vec<ApiRequest>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Holds every renewal exchange until [`Self::open_gate`] is called.
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::default()
        }
    }

    pub fn open_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    /// Holds requests to `path` until [`Self::release`] is called.
    pub fn hold(&self, path: &str) {
        self.held
            .lock()
            .insert(path.to_string(), Arc::new(Semaphore::new(0)));
    }

    /// Lets held requests to `path`, and any later ones, through.
    pub fn release(&self, path: &str) {
        if let Some(hold) = self.held.lock().get(path) {
            hold.add_permits(1);
        }
    }

    pub fn accept(&self, token: &str) {
        *self.valid_token.lock() = Some(token.to_string());
    }

    /// Renewed tokens are handed out but never accepted.
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::SeqCst);
    }

    pub fn reject_everything(&self) {
        *self.valid_token.lock() = None;
    }

    pub fn script_renewal(&self, reply: Reply) {
        self.renewals.lock().push_back(reply);
    }

    /// Registers the response of a protected route, keyed by
    /// `"METHOD /path?query"`.
    pub fn route(&self, key: &str, status: u16, body: Value) {
        self.routes
            .lock()
            .insert(key.to_string(), ApiResponse::json(status, &body));
    }

    /// Registers the response of an anonymous route.
    pub fn public_route(&self, key: &str, status: u16, body: Value) {
        self.public
            .lock()
            .insert(key.to_string(), ApiResponse::json(status, &body));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.log.lock().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.log.lock().iter().filter(|r| r.path == path).count()
    }

    pub fn renewal_calls(&self) -> usize {
        self.count(RENEWAL_PATH)
    }

    async fn renew(&self) -> Result<ApiResponse, TransportError> {
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        let reply = self
            .renewals
            .lock()
            .pop_front()
            .unwrap_or_else(|| Reply::Respond(ApiResponse::json(500, &json!({}))));
        match reply {
            Reply::Respond(response) => {
                if response.is_success()
                    && !self.frozen.load(Ordering::SeqCst)
                    && let Ok(body) = response.json_body::<Value>()
                    && let Some(token) = body["data"]["accessToken"].as_str()
                {
                    self.accept(token);
                }
                Ok(response)
            }
            Reply::Fail(error) => Err(error),
            Reply::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl HttpTransport for MockBackend {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.log.lock().push(request.clone());
        if request.path == RENEWAL_PATH {
            return self.renew().await;
        }
        let hold = self.held.lock().get(&request.path).cloned();
        if let Some(hold) = hold {
            drop(hold.acquire().await.unwrap());
        }

        let key = format!("{} {}", request.method, request.path_and_query().unwrap());
        if let Some(response) = self.public.lock().get(&key) {
            return Ok(response.clone());
        }

        let authorized = {
            let valid = self.valid_token.lock();
            valid.is_some() && request.bearer_token() == valid.as_deref()
        };
        if !authorized {
            return Ok(ApiResponse::json(401, &json!({ "message": "Unauthorized" })));
        }
        Ok(self
            .routes
            .lock()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| ApiResponse::json(200, &json!({ "data": { "path": request.path } }))))
    }
}

pub struct Harness {
    pub backend: Arc<MockBackend>,
    pub storage: Arc<MemoryStorage>,
    pub client: AuthenticatedClient,
}

impl Harness {
    pub fn new(backend: MockBackend) -> Self {
        Self::with_timeout(backend, Duration::from_secs(15))
    }

    pub fn with_timeout(backend: MockBackend, renewal_timeout: Duration) -> Self {
        let backend = Arc::new(backend);
        let storage = Arc::new(MemoryStorage::new());
        let client = AuthenticatedClient::new(backend.clone(), storage.clone(), renewal_timeout);
        Self {
            backend,
            storage,
            client,
        }
    }

    /// Stores a session as if the user had signed in earlier.
    pub fn signed_in(self, access: &str, refresh: &str) -> Self {
        self.client.tokens().set_session(access, refresh);
        self
    }

    /// Stores only an access token.
    pub fn access_only(self, access: &str) -> Self {
        self.storage.set("accessToken", access).unwrap();
        self
    }
}

/// Lets spawned tasks run until `condition` holds.
pub async fn settle_until(condition: impl Fn() -> bool) {
    for _ in 0..1_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never became true");
}
