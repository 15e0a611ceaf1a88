use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;

use crate::api::{ApiResponse, RequestDescriptor, Transport};
use crate::error::ApiError;

/// Transport double: records every request and replays queued responses.
/// With nothing queued it answers `200 null`.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<ApiResponse, String>>>,
    requests: Mutex<Vec<RequestDescriptor>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: Value) {
        self.responses.lock().push_back(Ok(ApiResponse::new(status, body)));
    }

    /// Queue a transport-level failure
    pub fn fail(&self, message: &str) {
        self.responses.lock().push_back(Err(message.to_string()));
    }

    pub fn requests(&self) -> Vec<RequestDescriptor> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<RequestDescriptor> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<ApiResponse, ApiError> {
        self.requests.lock().push(request);
        match self.responses.lock().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(ApiError::Network(message)),
            None => Ok(ApiResponse::new(200, Value::Null)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_in_order_then_defaults() {
        let mock = MockTransport::new();
        mock.respond(201, Value::Bool(true));
        mock.fail("connection refused");

        let first = mock.send(RequestDescriptor::get("/a")).await.unwrap();
        assert_eq!(first.status, 201);
        assert!(matches!(mock.send(RequestDescriptor::get("/b")).await, Err(ApiError::Network(_))));
        assert_eq!(mock.send(RequestDescriptor::get("/c")).await.unwrap().body, Value::Null);
        assert_eq!(mock.requests().len(), 3);
    }
}
