//! Recording transport for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use super::{HttpRequest, HttpResponse, HttpTransport};
use crate::{Error, Result};

#[derive(Debug, Default)]
struct MockState {
    requests: Vec<HttpRequest>,
    responses: VecDeque<Result<HttpResponse>>,
    fallback: Option<HttpResponse>,
}

/// Transport that records every request and replays scripted responses.
///
/// Scripted responses are consumed in order. Once they run out the fallback
/// response is returned, or a network error when no fallback is set.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Creates a transport with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport that answers every request with `status` and an
    /// empty body.
    pub fn always(status: u16) -> Self {
        let transport = Self::new();
        transport.lock().fallback = Some(HttpResponse::new(status, Vec::new()));
        transport
    }

    /// Queues a response with a JSON body.
    pub fn push_json<T: Serialize>(&self, status: u16, body: &T) -> &Self {
        let body = serde_json::to_vec(body).unwrap_or_default();
        self.push_response(HttpResponse::new(status, body))
    }

    /// Queues a raw response.
    pub fn push_response(&self, response: HttpResponse) -> &Self {
        self.lock().responses.push_back(Ok(response));
        self
    }

    /// Queues a transport failure.
    pub fn push_error(&self, error: Error) -> &Self {
        self.lock().responses.push_back(Err(error));
        self
    }

    /// Returns every request sent so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.lock().requests.clone()
    }

    /// Returns the most recent request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.lock().requests.last().cloned()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait::async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut state = self.lock();
        state.requests.push(request);

        match state.responses.pop_front() {
            Some(response) => response,
            None => state.fallback.clone().ok_or_else(|| {
                Error::network_error().with_message("no scripted response left")
            }),
        }
    }
}
