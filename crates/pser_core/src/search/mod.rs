//! Record search entry points.
//!
//! Search runs over the repository's in-memory list; the primary store's
//! lookup indexes are not consulted.

pub mod filter;
