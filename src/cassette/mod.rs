//! Cassettes: recorded task client interactions for deterministic replay.

pub mod format;
pub mod recorder;
pub mod replayer;
pub mod session;
