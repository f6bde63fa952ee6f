//! # TEA Techniques Core
//!
//! Pure catalog logic for the TEA techniques dataset: the technique model,
//! tag parsing, the goal/dimension hierarchy, validation, aggregation and
//! rendering of the static JSON artifacts.
//!
//! This crate does no filesystem or network I/O and has no async runtime.
//! The `tea` binary in the root package loads input, writes files and
//! reports progress.

pub mod aggregate;
pub mod artifacts;
pub mod error;
pub mod goals;
pub mod grouping;
pub mod hierarchy;
pub mod models;
pub mod redundancy;
pub mod search;
pub mod tag;
pub mod validate;
pub mod view;

pub use error::CatalogError;
