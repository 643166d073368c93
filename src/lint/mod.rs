//! Lint rules
//!
//! Per-file checks (duplicates, contradictory bounds, unpinned
//! declarations) and cross-manifest consistency checks (version drift,
//! missing counterparts).

pub mod compare;
pub mod filter;
pub mod rules;

pub use compare::compare_manifests;
pub use filter::LintFilter;
pub use rules::check_file;
