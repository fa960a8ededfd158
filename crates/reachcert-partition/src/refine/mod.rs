//! Local refinement of existing partitionings
//!
//! - [`FiducciaMattheyses`]: two-way refinement of a fixed partition pair
//! - [`KWayRefiner`]: single-node moves across all partitions

mod buckets;
mod fm;
mod kway;

pub use fm::FiducciaMattheyses;
pub use kway::{GainFunction, KWayRefiner};

pub(crate) use fm::check_balance;
