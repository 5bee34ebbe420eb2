//! The aggregation pipeline.
//!
//! Data flows strictly left to right:
//!
//! ```text
//! per source:  Extractor -> validate -> normalize -> Accumulator
//! over union:  merge -> sort -> stats -> Catalog
//! ```
//!
//! # Submodules
//!
//! - [`validate`]: Per-source acceptance rules for scraped records
//! - [`normalize`]: Scraped record to canonical [`Event`](crate::models::Event)
//! - [`merge`]: Cross-source deduplication by title
//! - [`sort`]: Display order
//! - [`stats`]: Summary counts
//! - [`orchestrator`]: Sequencing and per-source failure containment

pub mod merge;
pub mod normalize;
pub mod orchestrator;
pub mod sort;
pub mod stats;
pub mod validate;

pub use merge::merge;
pub use normalize::normalize;
pub use orchestrator::{Catalog, run};
pub use sort::sort;
pub use stats::stats;
pub use validate::validate;
