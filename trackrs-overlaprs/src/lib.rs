//! Interval overlap indexing for genomic features.
//!
//! This crate provides a static, array-based interval index and a per-chromosome
//! feature store built on top of it. It is part of the trackrs workspace, which
//! lays out and summarizes aligned reads and annotation tracks over a genomic window.
//!
//! ## Features
//!
//! - **Branch-skip queries**: an index walk that jumps over whole runs of intervals
//!   ending before the query, with no per-node augmentation
//! - **Iterator-based API**: memory-efficient iteration over overlapping intervals
//! - **Thread-safe**: built indexes are `Send + Sync`; a [`FeatureStore`] builds its
//!   chromosomes in parallel
//!
//! Intervals here are closed: `[start, end]` includes both endpoints.
//!
//! ## Quick Start
//!
//! ```rust
//! use trackrs_overlaprs::{IntervalIndex, Overlapper, Interval};
//!
//! // create some genomic intervals (e.g., ChIP-seq peaks)
//! let intervals = vec![
//!     Interval { start: 100u32, end: 200, val: "gene1" },
//!     Interval { start: 150, end: 300, val: "gene2" },
//!     Interval { start: 400, end: 500, val: "gene3" },
//! ];
//!
//! let index = IntervalIndex::from_intervals(intervals);
//!
//! let overlaps = index.find(180, 250);
//! assert_eq!(overlaps.len(), 2); // gene1 and gene2 overlap
//!
//! for interval in index.find_iter(180, 250) {
//!     println!("Found overlap: {:?}", interval);
//! }
//! ```

/// The branch-skip interval index.
///
/// See [`IntervalIndex`] for details.
pub mod interval_index;

/// Genome-wide feature indexing.
///
/// See [`FeatureStore`] for details.
pub mod feature_store;

/// Core traits for overlap operations.
///
/// See [`Overlapper`] for the main trait.
pub mod traits;

// re-exports
pub use self::feature_store::{FeatureStore, FeatureStoreError, IntoFeatureStore};
pub use self::interval_index::{IntervalIndex, IterFind, OverlapCoverage};
pub use self::traits::{Interval, Overlapper};
