//! Claims query.
//!
//! Builds a filtered `GET /complaints` request, runs it (one request per
//! selected year) and keeps the normalized records for display.

pub mod error;
pub mod normalize;
pub mod query;
pub mod table;

pub use error::ClaimsError;
pub use query::{ClaimsFilters, ClaimsValues, FieldKeys};
pub use table::ClaimsTable;

use crate::api::ApiClient;
use futures::future::try_join_all;
use normalize::normalize;
use serde_json::Value;
use tracing::{debug, info, warn};

/// What the claims list currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ClaimsView {
    /// No fetch has been made yet.
    #[default]
    NotFetched,
    /// Last fetch succeeded, possibly with zero records.
    Fetched {
        records: Vec<Value>,
        /// Payloads that could not be read as records.
        raw_payloads: Vec<Value>,
    },
    /// Last fetch failed; records were cleared.
    Failed { error: String },
}

impl ClaimsView {
    /// Records on display (empty unless fetched).
    pub fn records(&self) -> &[Value] {
        match self {
            ClaimsView::Fetched { records, .. } => records,
            _ => &[],
        }
    }

    pub fn raw_payloads(&self) -> &[Value] {
        match self {
            ClaimsView::Fetched { raw_payloads, .. } => raw_payloads,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ClaimsView::Failed { error } => Some(error),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn is_fetched(&self) -> bool {
        matches!(self, ClaimsView::Fetched { .. })
    }
}

/// Claims list bound to one service.
pub struct ClaimsBrowser {
    client: ApiClient,
    keys: FieldKeys,
    view: ClaimsView,
}

impl ClaimsBrowser {
    pub fn new(client: ApiClient, keys: FieldKeys) -> Self {
        Self {
            client,
            keys,
            view: ClaimsView::NotFetched,
        }
    }

    pub fn view(&self) -> &ClaimsView {
        &self.view
    }

    /// Fetch and replace the record list. Returns the number of records.
    ///
    /// With several years the requests run concurrently and their records
    /// are concatenated in year order; any failure fails the whole fetch.
    pub async fn fetch_claims(
        &mut self,
        filters: &ClaimsFilters,
        values: &ClaimsValues,
    ) -> Result<usize, ClaimsError> {
        match self.fetch_all(filters, values).await {
            Ok((records, raw_payloads)) => {
                let count = records.len();
                info!("Fetched {} claims", count);
                for raw in &raw_payloads {
                    warn!("Unrecognized claims payload: {}", raw);
                }
                self.view = ClaimsView::Fetched {
                    records,
                    raw_payloads,
                };
                Ok(count)
            }
            Err(e) => {
                warn!("Claims fetch failed: {}", e);
                self.view = ClaimsView::Failed {
                    error: e.to_string(),
                };
                Err(e)
            }
        }
    }

    async fn fetch_all(
        &self,
        filters: &ClaimsFilters,
        values: &ClaimsValues,
    ) -> Result<(Vec<Value>, Vec<Value>), ClaimsError> {
        let endpoint = self.client.endpoint("/complaints")?;
        let urls = query::claims_urls(&endpoint, filters, values, &self.keys);
        debug!("Claims requests: {:?}", urls.iter().map(|u| u.as_str()).collect::<Vec<_>>());

        let payloads = try_join_all(urls.into_iter().map(|url| self.client.fetch_complaints(url))).await?;

        let mut records = Vec::new();
        let mut raw_payloads = Vec::new();
        for payload in payloads {
            let normalized = normalize(payload);
            records.extend(normalized.records);
            raw_payloads.extend(normalized.raw);
        }

        Ok((records, raw_payloads))
    }
}
