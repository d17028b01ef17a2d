//! Secondary store writer.
//!
//! Subscribes to the readings key expression, applies the
//! hot-or-vibrating policy, and persists qualifying readings to an
//! embedded SQL database. Runs independently of the other writer: each
//! sees every message and decides on its own.

pub mod config;
pub mod policy;
pub mod store;
pub mod subscriber;

pub use config::WriterConfig;
pub use store::{AlertRow, SortOrder, SqlStore, StoreError};
pub use subscriber::{StoreWriter, WriterError, WriterState, WriterStats};
