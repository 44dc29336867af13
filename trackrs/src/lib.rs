//! Interval indexing, read layout and coverage for genome alignment viewers.
//!
//! Each part lives in its own crate and is enabled by the feature of the same name:
//!
//! - `core`: shared models and alignment record decoding
//! - `overlaprs`: the interval index and per-chromosome feature store
//! - `layout`: display-row layout and coverage

#[cfg(feature = "core")]
#[doc(inline)]
pub use trackrs_core as core;

#[cfg(feature = "overlaprs")]
#[doc(inline)]
pub use trackrs_overlaprs as overlaprs;

#[cfg(feature = "layout")]
#[doc(inline)]
pub use trackrs_layout as layout;
