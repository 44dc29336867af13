//! Core models shared by the trackrs crates.
//!
//! - [`models`]: closed [`Interval`](models::Interval)s for overlap indexes and
//!   half-open [`Region`](models::Region)s read from track files.
//! - [`alignment`]: decoded alignment records (matched blocks, soft clips,
//!   insertions, pair orientation and edge classification) produced from the
//!   raw fields an alignment decoder supplies.
//! - [`utils`]: file helpers.
pub mod alignment;
pub mod errors;
pub mod models;
pub mod utils;
