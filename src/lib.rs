#![allow(clippy::doc_markdown)] // Allow technical terms like PostgREST, JSONB in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # CRM Data Core
//!
//! The data access core behind the CRM: filter compilation, boundary
//! validation, soft-delete visibility and resilient execution for every
//! operation the application issues against its PostgREST-style backend.
//!
//! ## Overview
//!
//! Callers describe operations in application terms (an entity kind, a
//! filter expression, a raw payload) and the core takes them the rest of the
//! way: write payloads pass a validation gate before anything touches the
//! network, read filters pick up the soft-delete policy and full-text search
//! expansion, everything compiles into deterministic wire filters, and each
//! compiled request runs under a shared retry/backoff/rate-limit policy.
//!
//! ## Architecture
//!
//! - [`orchestration`] - [`DataCore`]: one entry point per operation
//! - [`filter`] - filter expressions, escaping and wire compilation
//! - [`validation`] - per-entity payload rules with field-path errors
//! - [`visibility`] - the soft-delete read policy
//! - [`resilience`] - retry executor and shared rate-limit cooldown
//! - [`transport`] - the seam to the backend SDK (mockable in tests)
//! - [`entity`] - static per-entity configuration
//! - [`normalize`] - response shape normalization
//! - [`config`] - immutable, environment-overridable configuration
//! - [`error`] - structured error taxonomy
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use crm_data_core::config::DataCoreConfig;
//! use crm_data_core::entity::EntityKind;
//! use crm_data_core::filter::FilterExpression;
//! use crm_data_core::orchestration::{DataCore, GetListParams};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example<T: crm_data_core::transport::Transport>(
//! #     transport: Arc<T>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let core = DataCore::new(transport, DataCoreConfig::from_env()?);
//!
//! let params = GetListParams::new()
//!     .with_filter(FilterExpression::new().with_eq("q", "acme"));
//! let page = core
//!     .get_list(EntityKind::Organizations, params, &CancellationToken::new())
//!     .await?;
//! println!("{} organizations", page.data.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod filter;
pub mod logging;
pub mod normalize;
pub mod orchestration;
pub mod resilience;
pub mod transport;
pub mod validation;
pub mod visibility;

pub use config::{DataCoreConfig, ExecutorConfig};
pub use entity::{EntityKind, Ident};
pub use error::{DataError, ErrorClass, FieldErrors, Result, TransportError};
pub use filter::{FilterExpression, FilterValue, WireFilter};
pub use orchestration::{BulkOutcome, BulkStatus, DataCore, GetListParams, ListResult};
pub use transport::{Transport, TransportRequest, TransportResponse};
