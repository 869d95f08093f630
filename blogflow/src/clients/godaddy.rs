//! GoDaddy domain availability client.

use async_trait::async_trait;
use serde::Deserialize;

use crate::errors::{BlogflowError, Result};

/// Prices on the wire are in micro-units of the currency.
const MICROS_PER_UNIT: f64 = 1_000_000.0;

/// Availability of one domain.
#[derive(Debug, Clone, PartialEq)]
pub struct Availability {
    /// Domain that was checked.
    pub domain: String,
    /// Whether it can be registered.
    pub available: bool,
    /// Registration price in major currency units, when quoted.
    pub price: Option<f64>,
}

/// Answers domain availability questions.
#[async_trait]
pub trait DomainRegistrar: Send + Sync {
    /// Checks one fully-qualified domain.
    async fn check_availability(&self, domain: &str) -> Result<Availability>;
}

#[derive(Debug, Deserialize)]
struct AvailableResponse {
    domain: String,
    available: bool,
    #[serde(default)]
    price: Option<u64>,
}

/// Client for the GoDaddy domains API.
#[derive(Debug, Clone)]
pub struct GoDaddyClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

impl GoDaddyClient {
    /// Creates a client against `base_url` (e.g. `https://api.godaddy.com`).
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            client: super::http_client(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    fn auth_header(&self) -> String {
        format!("sso-key {}:{}", self.api_key, self.api_secret)
    }
}

#[async_trait]
impl DomainRegistrar for GoDaddyClient {
    async fn check_availability(&self, domain: &str) -> Result<Availability> {
        let url = format!("{}/v1/domains/available", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("domain", domain)])
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BlogflowError::Upstream {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: AvailableResponse = resp.json().await?;
        tracing::debug!(domain = %parsed.domain, available = parsed.available, "Availability checked");

        #[allow(clippy::cast_precision_loss)]
        let price = parsed.price.map(|micros| micros as f64 / MICROS_PER_UNIT);

        Ok(Availability {
            domain: parsed.domain,
            available: parsed.available,
            price,
        })
    }
}
