#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod builder;
pub mod config;
pub mod error;
pub mod manifest;
pub mod models;
pub mod pattern;
pub mod selection;

pub use builder::{ManifestBuilder, ScanOutcome};
pub use config::ManifestConfig;
pub use error::{ManifestError, Result};
pub use models::{Cutoff, FileEntry, GenerationReport, ManifestSelection, RankRange};
pub use selection::EntryInclusion;
