//! # Operation Orchestration
//!
//! The top-level entry point of the crate. [`DataCore`] exposes one method
//! per operation (`create`, `update`, `get_one`, `get_list`, `get_many`,
//! `delete`, `bulk_update`, `bulk_delete`) and routes each through the full
//! pipeline:
//!
//! ```text
//! write:  validation gate ──▶ filter compiler ──▶ resilient executor
//! read:   search expansion ─▶ visibility policy ─▶ filter compiler ─▶ executor
//!                                      response ◀─ normalization ◀───┘
//! ```
//!
//! A single logical operation issues exactly one compiled request. Bulk
//! operations fan out one executor-wrapped request per target id so each id
//! succeeds or fails independently, and aggregate an id-keyed
//! [`BulkOutcome`].

pub mod core;
pub mod params;

pub use self::core::DataCore;
pub use params::{BulkFailure, BulkOutcome, BulkStatus, GetListParams, ListResult};
