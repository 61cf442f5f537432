//! # CardPointe Client SDK
//!
//! A typed Rust client for the CardPointe gateway REST API.
//!
//! Each operation makes exactly one HTTP call. Nothing is retried; a
//! failed call surfaces once as a [`ClientError`]. A declined transaction
//! is not an error, it comes back as a response whose `success()` is false.
//!
//! ```no_run
//! # async fn run() -> Result<(), cardpointe_client::ClientError> {
//! use cardpointe_client::{AuthorizationRequest, CardPointe};
//!
//! let client = CardPointe::new("496160873888", "testing", "testing123", "https://fts-uat.cardconnect.com")?;
//!
//! let request = AuthorizationRequest::new()
//!     .account("4242424242424242")
//!     .amount(500)
//!     .expiry("1230")
//!     .capture(true);
//!
//! let result = client.authorize(&request).await?;
//! assert!(result.is_captured());
//! # Ok(())
//! # }
//! ```

mod builder;
mod diagnostics;

use reqwest::{Client, Method, Url};

pub use builder::CardPointeBuilder;
pub use cardpointe_types::*;
pub use diagnostics::{RecordedRequest, RecordedResponse};

use cardpointe_types::domain::Map;
use diagnostics::Diagnostics;

/// Heading the servlet root shows when credentials are accepted.
pub const AUTH_TEXT: &str = "CardConnect REST Servlet";

/// Body of a settlement query for a day without batches.
pub const NO_BATCHES_TEXT: &str = "Null batches";

/// Path every resource lives under.
pub const BASE_PATH: &str = "cardconnect/rest/";

pub(crate) const USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected response body: {0}")]
    UnexpectedBody(String),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// CardPointe gateway client.
///
/// Every call overwrites the [`last_request`](Self::last_request) and
/// [`last_response`](Self::last_response) slots. The client can be shared
/// between tasks, but then those slots only describe whichever call
/// finished last.
pub struct CardPointe {
    merchant_id: String,
    user: String,
    password: String,
    endpoint: String,
    currency: String,
    http: Client,
    diagnostics: Diagnostics,
}

impl std::fmt::Debug for CardPointe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardPointe")
            .field("merchant_id", &self.merchant_id)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("currency", &self.currency)
            .finish()
    }
}

impl CardPointe {
    /// Starts a builder. `endpoint` is the gateway root,
    /// e.g. `https://fts-uat.cardconnect.com`.
    pub fn builder(
        merchant_id: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> CardPointeBuilder {
        CardPointeBuilder::new(merchant_id, user, password, endpoint)
    }

    /// Creates a client with default settings (USD, certificates verified).
    pub fn new(
        merchant_id: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Result<Self, ClientError> {
        Self::builder(merchant_id, user, password, endpoint).build()
    }

    /// Checks connectivity and credentials against the servlet root.
    ///
    /// Any 4xx reply, such as a 401 for a bad password, yields `Ok(false)`.
    pub async fn test_credentials(&self) -> Result<bool, ClientError> {
        let url = self.url(&[])?;
        let body = match self.send(Method::GET, url, None).await {
            Ok(body) => body,
            Err(ClientError::Api { status, .. }) if (400..500).contains(&status) => {
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        Ok(heading(&body).is_some_and(|text| text.eq_ignore_ascii_case(AUTH_TEXT)))
    }

    /// Checks the configured merchant id is enabled on the gateway.
    pub async fn validate_merchant_id(&self) -> Result<bool, ClientError> {
        let url = self.url(&["inquireMerchant", self.merchant_id.as_str()])?;
        let body = self.send(Method::GET, url, None).await?;
        let res = parse_object(&body)?;
        Ok(res.get("enabled").and_then(Value::as_bool) == Some(true))
    }

    /// Authorizes a transaction, capturing it too when the request sets
    /// `capture`.
    ///
    /// The merchant id and the client's currency are filled in unless the
    /// request sets them.
    pub async fn authorize(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<AuthorizationResult, ClientError> {
        request.validate()?;
        let payload = Attributes::from(request.to_payload())
            .with_defaults([
                ("merchid", self.merchant_id.as_str()),
                ("currency", self.currency.as_str()),
            ])
            .into_map();

        let body = self.send(Method::PUT, self.url(&["auth"])?, Some(payload)).await?;
        let res = parse_object(&body)?;

        if request.wants_capture() {
            Ok(AuthorizationResult::Captured(CaptureResponse::new(res)))
        } else {
            Ok(AuthorizationResult::Authorized(AuthorizationResponse::new(
                res,
            )))
        }
    }

    /// Captures a previously authorized transaction.
    pub async fn capture(
        &self,
        retref: &str,
        request: &CaptureRequest,
    ) -> Result<CaptureResponse, ClientError> {
        let payload = self.merchant_payload(request, Some(retref))?;
        let body = self.send(Method::PUT, self.url(&["capture"])?, Some(payload)).await?;
        Ok(CaptureResponse::new(parse_object(&body)?))
    }

    /// Voids a transaction that has not settled yet.
    pub async fn void(
        &self,
        retref: &str,
        request: &VoidRequest,
    ) -> Result<VoidResponse, ClientError> {
        let payload = self.merchant_payload(request, Some(retref))?;
        let body = self.send(Method::PUT, self.url(&["void"])?, Some(payload)).await?;
        Ok(VoidResponse::new(parse_object(&body)?))
    }

    /// Refunds a settled transaction.
    pub async fn refund(&self, request: &RefundRequest) -> Result<RefundResponse, ClientError> {
        let payload = self.merchant_payload(request, None)?;
        let body = self.send(Method::PUT, self.url(&["refund"])?, Some(payload)).await?;
        Ok(RefundResponse::new(parse_object(&body)?))
    }

    /// Looks up the current state of a transaction.
    pub async fn inquire(&self, retref: &str) -> Result<InquireResponse, ClientError> {
        let url = self.url(&["inquire", retref, self.merchant_id.as_str()])?;
        let body = self.send(Method::GET, url, None).await?;
        Ok(InquireResponse::new(parse_object(&body)?))
    }

    /// Settlement batches for one business day.
    ///
    /// An empty JSON list from the gateway is reported as
    /// [`SettlementStatus::NoBatches`], the same as the `Null batches` reply.
    pub async fn settlement_status(
        &self,
        day: SettlementDay,
    ) -> Result<SettlementStatus, ClientError> {
        let mut url = self.url(&["settlestat"])?;
        url.query_pairs_mut()
            .append_pair("merchid", &self.merchant_id)
            .append_pair("date", &day.to_string());
        let body = self.send(Method::GET, url, None).await?;

        if body.trim().eq_ignore_ascii_case(NO_BATCHES_TEXT) {
            return Ok(SettlementStatus::NoBatches);
        }

        let batches = match serde_json::from_str::<Value>(&body)? {
            Value::Array(entries) => entries
                .into_iter()
                .map(|entry| match entry {
                    Value::Object(map) => Ok(SettlementResponse::new(map)),
                    other => Err(ClientError::UnexpectedBody(format!(
                        "settlement entry is not an object: {}",
                        other
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Value::Object(map) => vec![SettlementResponse::new(map)],
            other => {
                return Err(ClientError::UnexpectedBody(format!(
                    "expected settlement list, got {}",
                    other
                )));
            }
        };

        if batches.is_empty() {
            return Ok(SettlementStatus::NoBatches);
        }
        Ok(SettlementStatus::Batches(batches))
    }

    /// Creates or updates a stored profile. Returns the gateway's JSON as is.
    pub async fn create_profile(&self, request: &ProfileRequest) -> Result<Value, ClientError> {
        let payload = self.merchant_payload(request, None)?;
        let body = self.send(Method::PUT, self.url(&["profile"])?, Some(payload)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetches a profile, or a single account on it when `account_id` is given.
    pub async fn get_profile(
        &self,
        profile_id: &str,
        account_id: Option<&str>,
    ) -> Result<Value, ClientError> {
        let url = self.profile_url(profile_id, account_id)?;
        let body = self.send(Method::GET, url, None).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Deletes a profile, or a single account on it when `account_id` is given.
    pub async fn delete_profile(
        &self,
        profile_id: &str,
        account_id: Option<&str>,
    ) -> Result<Value, ClientError> {
        let url = self.profile_url(profile_id, account_id)?;
        let body = self.send(Method::DELETE, url, None).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// The request sent by the most recent call.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.diagnostics.last_request()
    }

    /// The reply to the most recent call, if one arrived.
    pub fn last_response(&self) -> Option<RecordedResponse> {
        self.diagnostics.last_response()
    }

    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    pub fn set_merchant_id(&mut self, merchant_id: impl Into<String>) -> &mut Self {
        self.merchant_id = merchant_id.into();
        self
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn set_user(&mut self, user: impl Into<String>) -> &mut Self {
        self.user = user.into();
        self
    }

    pub fn set_password(&mut self, password: impl Into<String>) -> &mut Self {
        self.password = password.into();
        self
    }

    /// Full REST root, including [`BASE_PATH`].
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// An unparseable endpoint surfaces as [`ClientError::InvalidEndpoint`]
    /// on the next call.
    pub fn set_endpoint(&mut self, endpoint: &str) -> &mut Self {
        self.endpoint = rest_root(endpoint);
        self
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn set_currency(&mut self, currency: impl Into<String>) -> &mut Self {
        self.currency = currency.into();
        self
    }

    /// Validates `request` and fills in the merchant id (and `retref`)
    /// unless the request already carries them.
    fn merchant_payload<R: GatewayRequest>(
        &self,
        request: &R,
        retref: Option<&str>,
    ) -> Result<Map, ClientError> {
        request.validate()?;
        let mut payload = Attributes::from(request.to_payload())
            .with_defaults([("merchid", self.merchant_id.as_str())]);
        if let Some(retref) = retref {
            payload = payload.with_defaults([("retref", retref)]);
        }
        Ok(payload.into_map())
    }

    /// A missing account id keeps its empty segment.
    fn profile_url(&self, profile_id: &str, account_id: Option<&str>) -> Result<Url, ClientError> {
        self.url(&[
            "profile",
            profile_id,
            account_id.unwrap_or_default(),
            self.merchant_id.as_str(),
        ])
    }

    /// Resource URL under the REST root. Each segment is percent-encoded,
    /// so ids containing `/`, `?` or `#` stay inside their own segment.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| ClientError::InvalidEndpoint(format!("{}: {}", self.endpoint, e)))?;
        if url.cannot_be_a_base() {
            return Err(ClientError::InvalidEndpoint(self.endpoint.clone()));
        }
        if !segments.is_empty() {
            url.path_segments_mut()
                .map_err(|()| ClientError::InvalidEndpoint(self.endpoint.clone()))?
                .pop_if_empty()
                .extend(segments);
        }
        Ok(url)
    }

    /// Sends one request and returns the body of a 2xx reply.
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<Map>,
    ) -> Result<String, ClientError> {
        self.diagnostics.begin(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            body: body.clone(),
        });

        let mut req = self
            .http
            .request(method.clone(), url.clone())
            .basic_auth(&self.user, Some(&self.password));
        if let Some(body) = &body {
            req = req.json(body);
        }

        tracing::debug!(%method, %url, "sending gateway request");
        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        tracing::debug!(status = status.as_u16(), "gateway replied");

        self.diagnostics.finish(RecordedResponse {
            status: status.as_u16(),
            body: text.clone(),
        });

        if status.is_success() {
            Ok(text)
        } else {
            tracing::warn!(status = status.as_u16(), %url, "gateway returned an error status");
            Err(ClientError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            })
        }
    }
}

/// Appends the trailing slash and [`BASE_PATH`] to a gateway root.
pub(crate) fn rest_root(endpoint: &str) -> String {
    let mut root = endpoint.to_string();
    if !root.ends_with('/') {
        root.push('/');
    }
    if !root.ends_with(BASE_PATH) {
        root.push_str(BASE_PATH);
    }
    root
}

/// Text of the first `<h1>` element.
fn heading(html: &str) -> Option<&str> {
    let lower = html.to_ascii_lowercase();
    let start = lower.find("<h1>")? + "<h1>".len();
    let end = start + lower[start..].find("</h1>")?;
    Some(html[start..end].trim())
}

fn parse_object(body: &str) -> Result<Map, ClientError> {
    match serde_json::from_str::<Value>(body)? {
        Value::Object(map) => Ok(map),
        other => Err(ClientError::UnexpectedBody(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["resptext", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str).map(String::from))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = CardPointe::new("123", "user", "pass", "https://gw.example:6443").unwrap();
        assert_eq!(client.endpoint(), "https://gw.example:6443/cardconnect/rest/");
        assert_eq!(client.currency(), "USD");
        assert_eq!(client.merchant_id(), "123");
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = CardPointe::new("123", "user", "pass", "https://gw.example/").unwrap();
        assert_eq!(client.endpoint(), "https://gw.example/cardconnect/rest/");
    }

    #[test]
    fn test_rest_root_not_doubled() {
        assert_eq!(
            rest_root("https://gw.example/cardconnect/rest"),
            "https://gw.example/cardconnect/rest/"
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let client = CardPointe::new("123", "user", "hunter2", "https://gw.example").unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_setters() {
        let mut client = CardPointe::new("123", "user", "pass", "https://gw.example").unwrap();
        client
            .set_merchant_id("456")
            .set_user("other")
            .set_currency("CAD")
            .set_endpoint("https://uat.example");
        assert_eq!(client.merchant_id(), "456");
        assert_eq!(client.user(), "other");
        assert_eq!(client.currency(), "CAD");
        assert_eq!(client.endpoint(), "https://uat.example/cardconnect/rest/");
    }

    #[test]
    fn test_heading() {
        let html = "<html><body><h1>CardConnect REST Servlet</h1></body></html>";
        assert_eq!(heading(html), Some("CardConnect REST Servlet"));
        assert_eq!(heading("<H1> Upper </H1>"), Some("Upper"));
        assert_eq!(heading("no heading"), None);
    }

    #[test]
    fn test_error_message() {
        assert_eq!(error_message(r#"{"resptext":"Invalid field"}"#), "Invalid field");
        assert_eq!(error_message(r#"{"error":"nope"}"#), "nope");
        assert_eq!(error_message(" Unauthorized \n"), "Unauthorized");
    }

    #[test]
    fn test_profile_url() {
        let client = CardPointe::new("123", "user", "pass", "https://gw.example").unwrap();
        let url = client.profile_url("p1", Some("1")).unwrap();
        assert_eq!(url.path(), "/cardconnect/rest/profile/p1/1/123");
        let url = client.profile_url("p1", None).unwrap();
        assert_eq!(url.path(), "/cardconnect/rest/profile/p1//123");
    }

    #[test]
    fn test_url_segments_encoded() {
        let client = CardPointe::new("123", "user", "pass", "https://gw.example").unwrap();
        let url = client.url(&["inquire", "a/b?c#d", "123"]).unwrap();
        assert_eq!(url.path(), "/cardconnect/rest/inquire/a%2Fb%3Fc%23d/123");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);

        let url = client.url(&["inquire", "..", "123"]).unwrap();
        assert!(url.path().starts_with("/cardconnect/rest/inquire/"));
    }

    #[test]
    fn test_root_url_keeps_trailing_slash() {
        let client = CardPointe::new("123", "user", "pass", "https://gw.example").unwrap();
        assert_eq!(
            client.url(&[]).unwrap().as_str(),
            "https://gw.example/cardconnect/rest/"
        );
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let err = CardPointe::new("123", "user", "pass", "not a url").unwrap_err();
        assert!(matches!(err, ClientError::InvalidEndpoint(_)));
    }
}
