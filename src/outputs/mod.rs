//! Output generation for the aggregated catalog.
//!
//! # Submodules
//!
//! - [`json`]: Writes the event list and the stats report as JSON files
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── plays.json   # array of events, sorted for display
//! └── stats.json   # summary counts
//! ```

pub mod json;
