//! Implementations of the port traits.
//!
//! `live` talks to the real service, `recording` wraps a live adapter and
//! captures cassettes, `replaying` serves a cassette back.

pub mod live;
pub mod recording;
pub mod replaying;
