//! In-memory [Transport] for tests.
//!
//! Responses are queued up front and handed out in order.
//! Every request is recorded so tests can assert on paths, query flags and
//! bodies. It is only available with the `tests` feature or in unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use http::header::{HeaderValue, LOCATION};
use http::StatusCode;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::transport::{Transport, TransportError, TransportRequest, TransportResponse};

/// Base URL responses claim to come from unless they set their own.
const MOCK_BASE_URL: &str = "http://localhost:8080/geoserver/rest/";

#[derive(Debug, Default, Clone)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<TransportResponse>>>,
    requests: Arc<Mutex<Vec<TransportRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    pub fn push_response(&self, response: TransportResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Queue a response with a JSON body.
    pub fn push_json(&self, status: StatusCode, body: serde_json::Value) {
        self.push_response(TransportResponse::new(status, body.to_string()));
    }

    /// Queue a response without body.
    pub fn push_status(&self, status: StatusCode) {
        self.push_response(TransportResponse::new(status, Vec::new()));
    }

    /// Queue a `201 Created` with a `Location` header.
    pub fn push_created(&self, body: &str, location: &str) {
        let mut response = TransportResponse::new(StatusCode::CREATED, body);
        response
            .headers
            .insert(LOCATION, HeaderValue::from_str(location).unwrap());
        self.push_response(response);
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<TransportRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl Transport for MockTransport {
    async fn send(
        &self,
        request: TransportRequest,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse, TransportError> {
        if cancel.is_cancelled() {
            return Err(TransportError::Cancelled);
        }
        let mut response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no mock response queued");
        if response.url.is_none() {
            let base = Url::parse(MOCK_BASE_URL).unwrap();
            response.url = Some(base.join(&request.path).unwrap());
        }
        self.requests.lock().unwrap().push(request);
        Ok(response)
    }
}
