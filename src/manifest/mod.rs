//! Requirements manifest handling
//!
//! Discovers pip requirements manifests on disk and parses them into
//! domain requirements plus per-line findings.

pub mod detector;
pub mod requirements_txt;

pub use detector::{detect_manifests, ManifestInfo};
pub use requirements_txt::{parse_manifest, ParseOutcome, RequirementsParser};
