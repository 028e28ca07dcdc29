//! Query construction for `GET /complaints`.

use crate::config::ClaimsConfig;
use reqwest::Url;

/// Which filters are switched on, plus the years to fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimsFilters {
    pub use_complaint: bool,
    pub use_customer: bool,
    pub use_subject: bool,
    pub use_part_code: bool,
    /// Free-text search over stored complaints.
    pub use_keyword: bool,
    /// One request per year; no year filter when empty.
    pub years: Vec<u16>,
    /// Inclusive year range, sent with every request.
    pub start_year: Option<u16>,
    pub end_year: Option<u16>,
}

/// Filter values as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimsValues {
    pub complaint: String,
    pub customer: String,
    pub subject: String,
    pub part_code: String,
    pub keyword: String,
}

/// Query-string keys the server expects for each filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldKeys {
    pub complaint: String,
    pub customer: String,
    pub subject: String,
    pub part_code: String,
    pub keyword: String,
    pub year: String,
    pub start_year: String,
    pub end_year: String,
}

impl Default for FieldKeys {
    fn default() -> Self {
        Self::from(&ClaimsConfig::default())
    }
}

impl From<&ClaimsConfig> for FieldKeys {
    fn from(config: &ClaimsConfig) -> Self {
        Self {
            complaint: config.field_keys.complaint.clone(),
            customer: config.field_keys.customer.clone(),
            subject: config.field_keys.subject.clone(),
            part_code: config.field_keys.part_code.clone(),
            keyword: config.field_keys.keyword.clone(),
            year: config.year_key.clone(),
            start_year: config.start_year_key.clone(),
            end_year: config.end_year_key.clone(),
        }
    }
}

/// Key/value pairs for every enabled filter with a non-empty value,
/// followed by the year range bounds that are set.
pub fn filter_pairs(
    filters: &ClaimsFilters,
    values: &ClaimsValues,
    keys: &FieldKeys,
) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = [
        (filters.use_complaint, &keys.complaint, &values.complaint),
        (filters.use_customer, &keys.customer, &values.customer),
        (filters.use_subject, &keys.subject, &values.subject),
        (filters.use_part_code, &keys.part_code, &values.part_code),
        (filters.use_keyword, &keys.keyword, &values.keyword),
    ]
    .into_iter()
    .filter(|(enabled, _, value)| *enabled && !value.is_empty())
    .map(|(_, key, value)| (key.clone(), value.clone()))
    .collect();

    for (key, bound) in [
        (&keys.start_year, filters.start_year),
        (&keys.end_year, filters.end_year),
    ] {
        if let Some(year) = bound {
            pairs.push((key.clone(), year.to_string()));
        }
    }

    pairs
}

/// Request URLs for a claims fetch, one per selected year.
pub fn claims_urls(
    endpoint: &Url,
    filters: &ClaimsFilters,
    values: &ClaimsValues,
    keys: &FieldKeys,
) -> Vec<Url> {
    let pairs = filter_pairs(filters, values, keys);

    if filters.years.is_empty() {
        return vec![with_query(endpoint, &pairs)];
    }

    filters
        .years
        .iter()
        .map(|year| {
            let mut pairs = pairs.clone();
            pairs.push((keys.year.clone(), year.to_string()));
            with_query(endpoint, &pairs)
        })
        .collect()
}

fn with_query(endpoint: &Url, pairs: &[(String, String)]) -> Url {
    let mut url = endpoint.clone();
    // An empty pair list must not leave a dangling `?`.
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
    url
}
