//! Port traits defining external boundaries.
//!
//! The only external system is the remote task service. Implementations
//! live in `src/adapters/`.

pub mod task_api;

pub use task_api::{ApiFuture, TaskApi};
