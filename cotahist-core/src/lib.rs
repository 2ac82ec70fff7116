//! cotahist-core — retrieval and decoding of B3 COTAHIST historical quote
//! files.
//!
//! The exchange publishes each trading session's quotes as a dated,
//! fixed-width, zip-compressed file. This crate covers the whole pipeline:
//! - Trading calendar: fixed national holidays, Easter/Carnival computation,
//!   and the session-validity predicate
//! - Date expressions: `YYYY[-MM[-DD]]`, `today`/`yesterday`, and
//!   `start:end` ranges expanded into granularity values
//! - Resource resolution: granularity value → remote URL and versioned
//!   local cache path
//! - Idempotent fetching over an injected HTTP transport
//! - Fixed-width decoding against the published column layout
//! - Static reference tables for the categorical codes in the records

pub mod calendar;
pub mod config;
pub mod data;
pub mod dates;
