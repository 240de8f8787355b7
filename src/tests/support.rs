use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use reqwest::StatusCode;

use crate::lookup::{Dispatcher, FetchError, Platform};
use crate::scrape::{Http, Transport, UpstreamRequest, UpstreamResponse};

enum Reply {
    Body(StatusCode, String),
    Down,
}

/// Serves canned bodies by exact url and records every request it sees.
/// Urls without a canned reply behave like an unreachable host.
#[derive(Default)]
pub struct MockTransport {
    replies: HashMap<String, Reply>,
    calls: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(self, url: &str, body: impl Into<String>) -> Self {
        self.status(url, 200, body)
    }

    pub fn status(mut self, url: &str, status: u16, body: impl Into<String>) -> Self {
        let status = StatusCode::from_u16(status).expect("valid status");
        self.replies
            .insert(url.to_string(), Reply::Body(status, body.into()));
        self
    }

    pub fn down(mut self, url: &str) -> Self {
        self.replies.insert(url.to_string(), Reply::Down);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, FetchError> {
        self.calls.lock().unwrap().push(request.url.clone());

        match self.replies.get(&request.url) {
            Some(Reply::Body(status, body)) => Ok(UpstreamResponse {
                status: *status,
                body: body.clone(),
            }),
            Some(Reply::Down) | None => Err(FetchError::UpstreamUnavailable(format!(
                "{}: connection refused",
                request.iden()
            ))),
        }
    }
}

pub fn dispatcher(mock: &Arc<MockTransport>) -> Dispatcher {
    Dispatcher::new(Http::new(mock.clone()), Platform::TikTok)
}

pub fn http(mock: &Arc<MockTransport>) -> Http {
    Http::new(mock.clone())
}
