//! Analysis service API client.

pub mod client;
pub mod error;
pub mod requests;

pub use client::ApiClient;
pub use error::ApiError;
