//! Last request / last response slots kept for troubleshooting.

use std::sync::{Mutex, MutexGuard, PoisonError};

use cardpointe_types::domain::{Map, Value};
use serde::Serialize;

/// What was sent on the most recent call. Credentials are never recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub body: Option<Map>,
}

/// What came back on the most recent call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedResponse {
    pub status: u16,
    pub body: String,
}

impl RecordedResponse {
    /// The body parsed as JSON, if it is JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Both slots are overwritten by every call. When one client is shared
/// between tasks they hold whichever exchange happened last.
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    request: Mutex<Option<RecordedRequest>>,
    response: Mutex<Option<RecordedResponse>>,
}

impl Diagnostics {
    /// Records an outgoing request and clears the previous response.
    pub(crate) fn begin(&self, request: RecordedRequest) {
        *lock(&self.request) = Some(request);
        *lock(&self.response) = None;
    }

    pub(crate) fn finish(&self, response: RecordedResponse) {
        *lock(&self.response) = Some(response);
    }

    pub(crate) fn last_request(&self) -> Option<RecordedRequest> {
        lock(&self.request).clone()
    }

    pub(crate) fn last_response(&self) -> Option<RecordedResponse> {
        lock(&self.response).clone()
    }
}

fn lock<T>(slot: &Mutex<T>) -> MutexGuard<'_, T> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str) -> RecordedRequest {
        RecordedRequest {
            method: "GET".into(),
            url: url.into(),
            body: None,
        }
    }

    #[test]
    fn test_begin_clears_previous_response() {
        let diag = Diagnostics::default();
        diag.begin(request("https://gw/one"));
        diag.finish(RecordedResponse {
            status: 200,
            body: "{}".into(),
        });
        assert!(diag.last_response().is_some());

        diag.begin(request("https://gw/two"));
        assert_eq!(diag.last_request().unwrap().url, "https://gw/two");
        assert!(diag.last_response().is_none());
    }

    #[test]
    fn test_response_json() {
        let ok = RecordedResponse {
            status: 200,
            body: r#"{"respstat":"A"}"#.into(),
        };
        assert_eq!(ok.json().unwrap()["respstat"], "A");

        let html = RecordedResponse {
            status: 200,
            body: "<h1>hi</h1>".into(),
        };
        assert!(html.json().is_none());
    }
}
