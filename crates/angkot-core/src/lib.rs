//! Core types and trait definitions for the angkot trip ledger.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod fare;
pub mod report;
pub mod roster;
pub mod store;
pub mod trip;

pub use error::{Error, Result};
