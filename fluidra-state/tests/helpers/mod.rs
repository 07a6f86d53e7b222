//! Scripted in-memory cloud for coordinator tests
//!
//! Serves the vendor REST paths from test fixtures, with per-endpoint
//! failure injection and call counting.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use fluidra_client::{
    ApiRequest, ApiResponse, FluidraApi, GatewayConfig, HttpTransport, Method, RetryPolicy,
    StaticTokenProvider, TransportError,
};

pub struct MockCloud {
    tree: Mutex<Vec<Value>>,
    components: Mutex<HashMap<(String, u32), Value>>,
    fail_components: Mutex<HashSet<String>>,
    fail_tree: AtomicBool,
    reject_auth: AtomicBool,
    tree_fetches: AtomicUsize,
    /// Artificial latency so tests can overlap requests deterministically
    latency: Duration,
}

impl MockCloud {
    pub fn new() -> Arc<Self> {
        Self::with_latency(Duration::ZERO)
    }

    pub fn with_latency(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            tree: Mutex::new(Vec::new()),
            components: Mutex::new(HashMap::new()),
            fail_components: Mutex::new(HashSet::new()),
            fail_tree: AtomicBool::new(false),
            reject_auth: AtomicBool::new(false),
            tree_fetches: AtomicUsize::new(0),
            latency,
        })
    }

    /// Typed API over this cloud with a fast-failing gateway
    pub fn api(self: &Arc<Self>) -> FluidraApi {
        let config = GatewayConfig::new()
            .with_rate_limit(10_000, Duration::from_secs(60))
            .with_circuit(1_000, Duration::from_secs(300))
            .with_retry(RetryPolicy {
                max_attempts: 1,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(1),
                jitter_ceiling: Duration::ZERO,
            });
        FluidraApi::with_config(
            Arc::clone(self) as Arc<dyn HttpTransport>,
            Arc::new(StaticTokenProvider::new("test-token")),
            config,
        )
    }

    pub fn add_device(&self, id: &str, family: &str, components: &[(u32, Value)]) {
        self.tree.lock().unwrap().push(json!({
            "id": id,
            "type": "connected",
            "info": {"name": format!("{} unit", id), "family": family},
        }));
        let mut map = self.components.lock().unwrap();
        for (component_id, value) in components {
            map.insert((id.to_string(), *component_id), value.clone());
        }
    }

    pub fn fail_components_for(&self, id: &str) {
        self.fail_components.lock().unwrap().insert(id.to_string());
    }

    pub fn set_fail_tree(&self, fail: bool) {
        self.fail_tree.store(fail, Ordering::SeqCst);
    }

    pub fn set_reject_auth(&self, reject: bool) {
        self.reject_auth.store(reject, Ordering::SeqCst);
    }

    pub fn tree_fetches(&self) -> usize {
        self.tree_fetches.load(Ordering::SeqCst)
    }

    fn ok(body: Value) -> Result<ApiResponse, TransportError> {
        Ok(ApiResponse { status: 200, body })
    }

    fn status(status: u16) -> Result<ApiResponse, TransportError> {
        Ok(ApiResponse {
            status,
            body: Value::Null,
        })
    }
}

#[async_trait]
impl HttpTransport for MockCloud {
    async fn send(
        &self,
        request: &ApiRequest,
        _bearer: &str,
    ) -> Result<ApiResponse, TransportError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.reject_auth.load(Ordering::SeqCst) {
            return Self::status(401);
        }

        let path = request.path.as_str();

        if path == "/generic/users/me/pools" {
            return Self::ok(json!([{"id": "p1", "name": "Test Pool"}]));
        }

        if path.starts_with("/generic/devices?poolId=") {
            self.tree_fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_tree.load(Ordering::SeqCst) {
                return Self::status(503);
            }
            return Self::ok(Value::Array(self.tree.lock().unwrap().clone()));
        }

        if let Some(rest) = path.strip_prefix("/generic/devices/") {
            let mut segments = rest.split('/');
            let device_id = segments.next().unwrap_or("").to_string();
            let component_id: u32 = segments
                .nth(1)
                .and_then(|s| s.split('?').next())
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);

            match request.method {
                Method::Put => {
                    let desired = request
                        .body
                        .as_ref()
                        .and_then(|b| b.get("desiredValue"))
                        .cloned()
                        .unwrap_or(Value::Null);
                    self.components
                        .lock()
                        .unwrap()
                        .insert((device_id, component_id), desired.clone());
                    return Self::ok(json!({
                        "reportedValue": desired,
                        "desiredValue": desired,
                        "ts": 1,
                    }));
                }
                Method::Get => {
                    if self.fail_components.lock().unwrap().contains(&device_id) {
                        return Self::status(503);
                    }
                    let value = self
                        .components
                        .lock()
                        .unwrap()
                        .get(&(device_id, component_id))
                        .cloned()
                        .unwrap_or(json!(0));
                    return Self::ok(json!({"reportedValue": value}));
                }
            }
        }

        if path.contains("telemetryWaterQuality") {
            return Self::ok(json!({"items": [{"ph": 7.2, "orp": 720}]}));
        }

        if path.ends_with("/status") {
            return Self::ok(json!({}));
        }

        Self::status(404)
    }
}
