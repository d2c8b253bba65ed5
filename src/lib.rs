//! Workbrew API client library.
//!
//! Typed building blocks for talking to the Workbrew REST API: an HTTP
//! transport scoped to one workspace, a canonical query builder, and a
//! timestamp type for fields that may carry a status word such as
//! `"Never"` instead of a date.
//!
//! # Quick Start
//!
//! ```no_run
//! use brewapi::{BrewClient, Device, QueryBuilder};
//!
//! #[tokio::main]
//! async fn main() -> brewapi::Result<()> {
//!     // Create client from environment variables
//!     let client = BrewClient::from_env()?;
//!
//!     let mut query = QueryBuilder::new();
//!     query.add_if_not_empty("group", "engineering");
//!
//!     let response = client.get::<Vec<Device>>("devices.json", &query).await?;
//!     for device in &response.data {
//!         println!("{} last seen {}", device.serial_number, device.last_seen_at);
//!     }
//!     println!("Rate limit remaining: {:?}", response.meta.rate_limit_remaining());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! The client reads configuration from environment variables:
//!
//! - `WORKBREW_API_KEY` (required) - Your Workbrew API key
//! - `WORKBREW_WORKSPACE` (required) - Workspace name
//! - `WORKBREW_API_URL` (optional) - Base URL (defaults to `https://console.workbrew.com`)
//! - `WORKBREW_API_VERSION` (optional) - API version header (defaults to `v0`)

mod client;
mod error;
mod models;
mod query;
mod response;
mod timestamp;

// Re-export core types
pub use client::{BrewClient, RequestOptions};
pub use error::{BrewError, Result};
pub use query::QueryBuilder;
pub use response::{ApiResponse, ResponseMeta};
pub use reqwest::Method;

// Re-export timestamp types
pub use timestamp::{
    LastSeen, NeverStatus, ProgressStatus, ProgressTimestamp, Sentinel, TemporalValue,
};

// Re-export models
pub use models::{BrewCommand, Device};
