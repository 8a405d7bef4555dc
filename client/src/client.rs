//! HTTP client for the loan approval service.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::settings::ClientSettings;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Decision as returned by the service. `probability` is optional so an older
/// or partial response still renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub approved: Value,
    #[serde(default)]
    pub probability: Option<f64>,
}

impl Decision {
    pub fn label(&self) -> String {
        match &self.approved {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

pub struct LoanClient {
    client: reqwest::Client,
    settings: ClientSettings,
}

impl LoanClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Submits one payload and returns the raw response body.
    pub async fn predict_raw(&self, payload: &Value) -> Result<Value, ClientError> {
        let url = self.settings.predict_url();
        debug!("POST {url}");
        let resp = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        self.read_json(resp).await
    }

    pub async fn predict(&self, payload: &Value) -> Result<Decision, ClientError> {
        let body = self.predict_raw(payload).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// First rows of the service's reference dataset.
    pub async fn preview(&self) -> Result<Vec<Value>, ClientError> {
        let url = self.settings.preview_url();
        debug!("GET {url}");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        let body = self.read_json(resp).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn read_json(&self, resp: reqwest::Response) -> Result<Value, ClientError> {
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp
                .text()
                .await
                .unwrap_or_else(|e| format!("response body unreadable: {e}"));
            return Err(ClientError::Api { status, message });
        }
        let text = resp.text().await.map_err(|e| self.transport(e))?;
        Ok(serde_json::from_str(&text)?)
    }

    fn transport(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.settings.timeout_secs)
        } else {
            ClientError::Http(err)
        }
    }
}
