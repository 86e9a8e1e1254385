//! In-memory caching for roster membership checks.
//!
//! Favors availability over freshness: cached data is served inside a
//! freshness window, and a failed refresh serves the previous contents
//! rather than an empty result.

mod roster;

pub use roster::RosterCache;
