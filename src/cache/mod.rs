//! Cache module for storing raw API responses in memory
//!
//! This module provides a time-bounded cache keyed by request identity (the
//! full request URL). Entries are served only while fresh; expired entries are
//! treated as absent and are replaced on the next successful fetch.

mod ttl;

pub use ttl::TtlCache;
