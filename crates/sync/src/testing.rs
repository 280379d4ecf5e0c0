//! Scripted gateway double shared by the crate's tests.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde_json::{Value, json};

use safetycheck_gateway::{Action, ActionAck, AppendRequest, Gateway, GatewayError, Snapshot};

/// Build a minimal append payload for queue tests.
pub fn request(sheet: &str, id: &str) -> AppendRequest {
    AppendRequest::create(
        sheet,
        vec!["id".to_string(), "timestamp".to_string()],
        vec![id.into(), "2024-05-10T08:30:00Z".into()],
        id,
    )
}

/// In-memory `Gateway` whose behavior tests script per call.
pub struct MockGateway {
    snapshot: Mutex<Value>,
    fail_fetch: AtomicBool,
    fail_append_ids: Mutex<HashSet<String>>,
    append_delay: Mutex<Duration>,
    appended: Mutex<Vec<AppendRequest>>,
    actions: Mutex<Vec<Action>>,
    action_ack: Mutex<Value>,
    fail_actions: AtomicBool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            snapshot: Mutex::new(json!({})),
            fail_fetch: AtomicBool::new(false),
            fail_append_ids: Mutex::new(HashSet::new()),
            append_delay: Mutex::new(Duration::ZERO),
            appended: Mutex::new(Vec::new()),
            actions: Mutex::new(Vec::new()),
            action_ack: Mutex::new(json!({"status": "success"})),
            fail_actions: AtomicBool::new(false),
        }
    }

    pub fn set_snapshot(&self, value: Value) {
        *self.snapshot.lock().unwrap() = value;
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    /// Make appends for this record id fail with a transport error.
    pub fn fail_append_for(&self, id: &str) {
        self.fail_append_ids.lock().unwrap().insert(id.to_string());
    }

    pub fn set_append_delay(&self, delay: Duration) {
        *self.append_delay.lock().unwrap() = delay;
    }

    pub fn appended(&self) -> Vec<AppendRequest> {
        self.appended.lock().unwrap().clone()
    }

    pub fn clear_appended(&self) {
        self.appended.lock().unwrap().clear();
    }

    pub fn actions(&self) -> Vec<Action> {
        self.actions.lock().unwrap().clone()
    }

    pub fn set_action_ack(&self, ack: Value) {
        *self.action_ack.lock().unwrap() = ack;
    }

    pub fn set_fail_actions(&self, fail: bool) {
        self.fail_actions.store(fail, Ordering::SeqCst);
    }
}

impl Gateway for MockGateway {
    async fn fetch_all(&self) -> Result<Snapshot, GatewayError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(GatewayError::Network("fetch scripted to fail".into()));
        }
        let value = self.snapshot.lock().unwrap().clone();
        Snapshot::from_value(value)
    }

    async fn append(&self, request: &AppendRequest) -> Result<(), GatewayError> {
        let delay = *self.append_delay.lock().unwrap();
        if delay > Duration::ZERO {
            tokio::time::sleep(delay).await;
        }
        self.appended.lock().unwrap().push(request.clone());
        if self.fail_append_ids.lock().unwrap().contains(&request.id) {
            return Err(GatewayError::Network("append scripted to fail".into()));
        }
        Ok(())
    }

    async fn post_action(&self, action: &Action) -> Result<ActionAck, GatewayError> {
        if self.fail_actions.load(Ordering::SeqCst) {
            return Err(GatewayError::Network("action scripted to fail".into()));
        }
        self.actions.lock().unwrap().push(action.clone());
        let ack = self.action_ack.lock().unwrap().clone();
        serde_json::from_value(ack).map_err(|err| GatewayError::Parse(err.to_string()))
    }
}
