//! # TEA Techniques
//!
//! Builds the static JSON data behind the TEA techniques site from the
//! curated technique catalog.
//!
//! Techniques are validated, indexed by tag, goal and goal dimension, and
//! written as a tree of JSON files that a statically generated front end can
//! fetch without any server.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────────┐   ┌────────────┐
//! │  JSON input │──▶│   Validate   │──▶│    Index     │──▶│   Render   │
//! │ file / dir  │   │  (records)   │   │ tags / goals │   │  + write   │
//! └─────────────┘   └──────────────┘   └──────────────┘   └────────────┘
//! ```
//!
//! Everything between loading and writing lives in `tea-techniques-core`
//! and is pure. This crate owns configuration, file I/O and the CLI.
//!
//! ## Quick Start
//!
//! ```bash
//! tea validate                  # check the data
//! tea build                     # write public/data
//! tea search "shapley"          # keyword search
//! tea get shapley-additive-explanations
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`load`] | Input discovery and record loading |
//! | [`build`] | Artifact writing |
//! | [`validate`] | Validation report |
//! | [`stats`] | Catalog summary |
//! | [`search`] | Keyword search |
//! | [`get`] | Single technique view |
//! | [`progress`] | Build progress on stderr |

pub mod build;
pub mod config;
pub mod get;
pub mod load;
pub mod progress;
pub mod search;
pub mod stats;
pub mod validate;
