//! `linear-client`: the Linear GraphQL backend for cadence.
//!
//! [`LinearClient`] implements [`cadence_core::Tracker`] over Linear's public
//! GraphQL API. List queries page through connections until exhausted, so
//! the core always sees complete result sets.
//!
//! ```rust,ignore
//! use cadence_core::catalog::Catalog;
//! use linear_client::LinearClient;
//! use std::sync::Arc;
//!
//! let client = LinearClient::new(&std::env::var("LINEAR_API_KEY")?)?;
//! let catalog = Catalog::new(Arc::new(client));
//! let todo = catalog.state_id("Todo").await?;
//! ```

mod client;
mod error;
mod types;

pub use client::{LinearClient, LINEAR_API_URL};
pub use error::{LinearError, Result};
