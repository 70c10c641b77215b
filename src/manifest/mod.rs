//! Manifest generation broken into focused submodules for easier testing.

mod scanning;
mod writing;

pub use scanning::{EntryScan, collect_entries};
pub use writing::{render_manifest, write_manifest, write_summary};
