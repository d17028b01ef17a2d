//! Primary store writer.
//!
//! Subscribes to the readings key expression, applies the out-of-range
//! temperature policy, and persists qualifying readings to an embedded
//! document store (redb, JSON values). Runs independently of the other
//! writer: each sees every message and decides on its own.

pub mod config;
pub mod policy;
pub mod store;
pub mod subscriber;

pub use config::WriterConfig;
pub use store::{AlertRecord, DocStore, SortOrder, StoreError};
pub use subscriber::{StoreWriter, WriterError, WriterState, WriterStats};
