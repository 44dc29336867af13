//! Display-row layout for aligned reads.
//!
//! [`LayoutEngine`] stacks overlapping alignment records into rows so that no
//! two records on one row of one category overlap, and keeps enough state to
//! extend the layout cheaply as a view pans. [`CoverageAccumulator`] builds the
//! per-base depth curve shown above the rows.
//!
//! Categories come from the [`SortMode`] (strand, haplotype), each with its
//! own row numbering. [`LinkMode`] forces records of one template (mates,
//! split alignments) onto a shared row.

pub mod config;
pub mod coverage;
pub mod engine;
pub mod frontier;

// re-exports
pub use self::config::{LayoutConfig, LayoutConfigError, LayoutConfigResult, LinkMode, SortMode};
pub use self::coverage::{CoverageAccumulator, collect_coverage};
pub use self::engine::{LayoutEngine, PlacementSummary};
pub use self::frontier::LevelPartition;
