//! Scripted transport for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use super::error::{ApiError, Result};
use super::transport::{ApiRequest, ApiResponse, Method, Transport};

#[derive(Debug, Clone)]
enum Scripted {
    Respond(ApiResponse),
    Fail(String),
}

/// Answers requests from per-route scripts and records everything it sees.
///
/// Each route holds a queue; the last scripted answer repeats once the
/// queue is down to one. Unscripted routes answer 404 with no body.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a response for `method path`.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.push(method, path, Scripted::Respond(ApiResponse::new(status, body)));
    }

    /// Queue a transport failure for `method path`.
    pub fn fail(&self, method: Method, path: &str, message: &str) {
        self.push(method, path, Scripted::Fail(message.to_string()));
    }

    fn push(&self, method: Method, path: &str, scripted: Scripted) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(scripted);
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests received for `method path`.
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Total number of requests received.
    pub fn total(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let key = (request.method, request.path.clone());
        self.requests.lock().unwrap().push(request);

        let scripted = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&key) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match scripted {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(message)) => Err(ApiError::ConnectionFailed(message)),
            None => Ok(ApiResponse::new(404, Value::Null)),
        }
    }
}
