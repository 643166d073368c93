//! reqlint - linter and consistency checker for pip requirements manifests
//!
//! Parses `requirements.txt`-style manifests into typed requirements,
//! lints each file (duplicates, contradictory bounds, unpinned
//! declarations), compares manifests pairwise for version drift and
//! missing counterparts, and optionally verifies exact pins against
//! PyPI.
//!
//! # Architecture
//!
//! - `domain`: versions, specifiers, requirements, findings
//! - `manifest`: manifest detection and the requirements parser
//! - `lint`: per-file rules and cross-manifest comparison
//! - `registry`: PyPI client and registry-backed checks
//! - `orchestrator`: drives a full run
//! - `output`: text, JSON and diff rendering
//! - `cli`: command line interface

pub mod cli;
pub mod domain;
pub mod error;
pub mod lint;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod registry;

pub use orchestrator::{Orchestrator, OrchestratorResult};
