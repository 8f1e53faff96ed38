//! Postal-code lookup against a ViaCEP-compatible service.
//!
//! The service answers `GET {base}/{cep}/json/` with either an address object
//! or `{"erro": true}` for codes that do not exist.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::models::{AddressHint, LookupOutcome, PostalCode, ServiceError};

pub const DEFAULT_POSTAL_LOOKUP_BASE_URL: &str = "https://viacep.com.br/ws";

/// Transient failures talking to the postal-code service
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Unexpected response for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<LookupError> for ServiceError {
    fn from(err: LookupError) -> Self {
        ServiceError::LookupFailed {
            message: err.to_string(),
        }
    }
}

/// Resolves a postal code to street and neighborhood
#[async_trait]
pub trait PostalCodeLookup: Send + Sync {
    async fn lookup(&self, postal_code: &PostalCode) -> Result<LookupOutcome, LookupError>;
}

#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    erro: Option<serde_json::Value>,
    #[serde(default)]
    logradouro: Option<String>,
    #[serde(default)]
    bairro: Option<String>,
    #[serde(default)]
    localidade: Option<String>,
    #[serde(default)]
    uf: Option<String>,
}

impl ViaCepResponse {
    // Older deployments send a boolean, newer ones the string "true"
    fn is_not_found(&self) -> bool {
        match &self.erro {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(flag)) => flag.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    fn into_outcome(self) -> LookupOutcome {
        if self.is_not_found() {
            return LookupOutcome::NotFound;
        }
        LookupOutcome::Found(AddressHint {
            street: self.logradouro.unwrap_or_default(),
            neighborhood: self.bairro.unwrap_or_default(),
            city: self.localidade.filter(|s| !s.is_empty()),
            state: self.uf.filter(|s| !s.is_empty()),
        })
    }
}

/// HTTP client for ViaCEP
pub struct ViaCepClient {
    client: Client,
    base_url: Url,
}

impl ViaCepClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("luminous-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Exactly one trailing slash so joins append instead of replacing
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| LookupError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn lookup_url(&self, postal_code: &PostalCode) -> Result<Url, LookupError> {
        self.base_url
            .join(&format!("{}/json/", postal_code.as_str()))
            .map_err(|e| LookupError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl PostalCodeLookup for ViaCepClient {
    #[instrument(skip(self), fields(postal_code = %postal_code))]
    async fn lookup(&self, postal_code: &PostalCode) -> Result<LookupOutcome, LookupError> {
        let url = self.lookup_url(postal_code)?;
        debug!(url = %url, "Querying postal-code service");

        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;

        let parsed: ViaCepResponse =
            serde_json::from_str(&body).map_err(|e| LookupError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;

        Ok(parsed.into_outcome())
    }
}
