use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::config::LeadsConfig;

/// Row written to the hosted `leads` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lead {
    pub id: Uuid,
    pub email: String,
    pub current_bill: f64,
    pub savings_estimation: f64,
}

#[derive(Debug, Error)]
pub enum LeadStoreError {
    #[error("lead store not configured")]
    NotConfigured,

    #[error("invalid lead store credentials")]
    InvalidCredentials,

    #[error("lead store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("lead store rejected insert: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn insert(&self, lead: &Lead) -> Result<(), LeadStoreError>;

    /// Whether inserts can succeed at all.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Used when no database is configured. Every insert fails, which the
/// capture flow reports as a warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledLeadStore;

#[async_trait]
impl LeadStore for DisabledLeadStore {
    async fn insert(&self, _lead: &Lead) -> Result<(), LeadStoreError> {
        Err(LeadStoreError::NotConfigured)
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Inserts rows through a PostgREST-style endpoint
/// (`POST {base_url}/rest/v1/{table}`).
#[derive(Clone)]
pub struct RestLeadStore {
    endpoint: String,
    client: reqwest::Client,
}

impl RestLeadStore {
    pub fn new(cfg: &LeadsConfig) -> Result<Self, LeadStoreError> {
        if !cfg.is_configured() {
            return Err(LeadStoreError::NotConfigured);
        }

        let key = HeaderValue::from_str(&cfg.api_key)
            .map_err(|_| LeadStoreError::InvalidCredentials)?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", cfg.api_key))
            .map_err(|_| LeadStoreError::InvalidCredentials)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("hvac-digital-twin/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("prefer", HeaderValue::from_static("return=minimal"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            endpoint: format!(
                "{}/rest/v1/{}",
                cfg.base_url.trim_end_matches('/'),
                cfg.table
            ),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LeadStore for RestLeadStore {
    async fn insert(&self, lead: &Lead) -> Result<(), LeadStoreError> {
        let resp = self.client.post(&self.endpoint).json(lead).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LeadStoreError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
