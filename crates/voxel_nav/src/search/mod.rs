//! Path search over navigation graphs.
//!
//! The engine never writes to the permanent graph during search; all
//! per-query bookkeeping lives in [`state`]. Raw-position queries splice
//! temporary endpoint nodes around the search and clean them up on return.

pub mod engine;
mod state;

pub use engine::{path_length, Algorithm};
