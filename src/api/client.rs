//! HTTP client for the complaint analysis service.
//!
//! Thin typed wrappers over the service's endpoints. Status handling is
//! uniform: any non-2xx reply becomes [`ApiError::Status`] carrying the
//! response body as plain text.

use super::error::ApiError;
use super::requests::{AnalyzeRequest, ReportRequest, ReviewRequest};
use crate::models::{ComplaintDetails, Method, OptionField};
use reqwest::{RequestBuilder, Response, Url};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Client bound to one analysis service base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    timeout_seconds: u64,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client for `base_url` (trailing slashes are ignored).
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            timeout_seconds,
            http,
        })
    }

    /// The normalized base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a server-relative path such as `/reports/report.pdf`.
    pub fn absolute(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Parsed URL for an endpoint path.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Url::parse(&self.absolute(path)).map_err(|e| ApiError::InvalidUrl(e.to_string()))
    }

    /// `GET /guide/{method}`
    pub async fn fetch_guide(&self, method: Method) -> Result<Value, ApiError> {
        self.get_json(&format!("/guide/{}", method.as_str())).await
    }

    /// `POST /analyze`
    pub async fn analyze(&self, request: &AnalyzeRequest<'_>) -> Result<Value, ApiError> {
        self.post_json("/analyze", request).await
    }

    /// `POST /review`
    pub async fn review(&self, request: &ReviewRequest<'_>) -> Result<Value, ApiError> {
        self.post_json("/review", request).await
    }

    /// `POST /report`
    pub async fn report(&self, request: &ReportRequest<'_>) -> Result<Value, ApiError> {
        self.post_json("/report", request).await
    }

    /// `GET /complaints[?filters]` with a prebuilt URL.
    pub async fn fetch_complaints(&self, url: Url) -> Result<Value, ApiError> {
        self.get_url(url).await
    }

    /// `GET /options/{field}`.
    ///
    /// Autocomplete is best effort: failures are logged and yield no values.
    pub async fn fetch_options(&self, field: OptionField) -> Vec<String> {
        match self.get_json(&format!("/options/{}", field.as_str())).await {
            Ok(payload) => option_values(&payload),
            Err(e) => {
                warn!("Failed to load {} options: {}", field, e);
                Vec::new()
            }
        }
    }

    /// `POST /scan_8d`. Returns the scanned row count when the server reports one.
    pub async fn scan_8d(&self) -> Result<Option<u64>, ApiError> {
        let response = self.send(self.http.post(self.absolute("/scan_8d"))).await?;
        let response = self.check_status(response).await?;
        let body = response.text().await.map_err(|e| self.map_err(e))?;

        Ok(serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("count").and_then(Value::as_u64)))
    }

    /// `POST /complaints`. Stores a complaint and returns the server status.
    pub async fn add_complaint(&self, details: &ComplaintDetails) -> Result<String, ApiError> {
        let payload = self.post_json("/complaints", details).await?;
        Ok(payload
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("ok")
            .to_string())
    }

    /// Download an artifact to `dest`, returning the number of bytes written.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<u64, ApiError> {
        debug!("Downloading {} to {}", url, dest.display());

        let response = self.send(self.http.get(url)).await?;
        let response = self.check_status(response).await?;
        let bytes = response.bytes().await.map_err(|e| self.map_err(e))?;

        tokio::fs::write(dest, &bytes)
            .await
            .map_err(|e| ApiError::Io {
                path: dest.display().to_string(),
                message: e.to_string(),
            })?;

        Ok(bytes.len() as u64)
    }

    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        self.get_url(self.endpoint(path)?).await
    }

    async fn get_url(&self, url: Url) -> Result<Value, ApiError> {
        debug!("GET {}", url);
        let response = self.send(self.http.get(url)).await?;
        self.read_json(response).await
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        debug!("POST {}{}", self.base_url, path);
        let response = self
            .send(self.http.post(self.absolute(path)).json(body))
            .await?;
        self.read_json(response).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        request.send().await.map_err(|e| self.map_err(e))
    }

    async fn check_status(&self, response: Response) -> Result<Response, ApiError> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            debug!("Service returned {}: {}", status, body);
            return Err(ApiError::Status { status, body });
        }
        Ok(response)
    }

    async fn read_json(&self, response: Response) -> Result<Value, ApiError> {
        let response = self.check_status(response).await?;
        let body = response.text().await.map_err(|e| self.map_err(e))?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn map_err(&self, err: reqwest::Error) -> ApiError {
        ApiError::from_reqwest(err, &self.base_url, self.timeout_seconds)
    }
}

/// Option values from `{values: [...]}` or a bare array.
pub fn option_values(payload: &Value) -> Vec<String> {
    let values = match payload {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("values") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    values
        .iter()
        .filter_map(|v| match v {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
        .collect()
}
