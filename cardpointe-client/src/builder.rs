//! Construction of [`CardPointe`] clients.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::redirect::Policy;

use crate::diagnostics::Diagnostics;
use crate::{CardPointe, ClientError, USER_AGENT, rest_root};

/// Builder for [`CardPointe`].
///
/// TLS certificates are verified unless
/// [`danger_accept_invalid_certs`](Self::danger_accept_invalid_certs) is
/// switched on.
#[derive(Debug, Clone)]
pub struct CardPointeBuilder {
    merchant_id: String,
    user: String,
    password: String,
    endpoint: String,
    currency: String,
    timeout: Option<Duration>,
    accept_invalid_certs: bool,
}

impl CardPointeBuilder {
    pub(crate) fn new(
        merchant_id: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            user: user.into(),
            password: password.into(),
            endpoint: endpoint.into(),
            currency: "USD".to_string(),
            timeout: None,
            accept_invalid_certs: false,
        }
    }

    /// Currency sent with authorizations that do not set their own.
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Overall timeout for each request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Accept self-signed or otherwise invalid TLS certificates.
    ///
    /// Some gateway environments serve self-signed certificates. Turning
    /// this on removes all protection against a man in the middle.
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn build(self) -> Result<CardPointe, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(Policy::none())
            .danger_accept_invalid_certs(self.accept_invalid_certs);
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        if self.accept_invalid_certs {
            tracing::warn!("TLS certificate verification disabled for the gateway client");
        }

        let client = CardPointe {
            merchant_id: self.merchant_id,
            user: self.user,
            password: self.password,
            endpoint: rest_root(&self.endpoint),
            currency: self.currency,
            http: http.build()?,
            diagnostics: Diagnostics::default(),
        };
        client.url(&[])?;
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let builder = CardPointeBuilder::new("123", "user", "pass", "https://gw.example");
        assert_eq!(builder.currency, "USD");
        assert!(!builder.accept_invalid_certs);
        assert!(builder.timeout.is_none());
    }

    #[test]
    fn test_overrides() {
        let client = CardPointeBuilder::new("123", "user", "pass", "https://gw.example")
            .currency("CAD")
            .timeout(Duration::from_secs(5))
            .danger_accept_invalid_certs(true)
            .build()
            .unwrap();
        assert_eq!(client.currency(), "CAD");
        assert_eq!(client.endpoint(), "https://gw.example/cardconnect/rest/");
    }
}
