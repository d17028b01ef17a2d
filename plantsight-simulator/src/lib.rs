//! Simulated machine telemetry publisher.
//!
//! One tick of the publisher:
//!
//! 1. Generate a synthetic [`Reading`](plantsight_common::Reading)
//! 2. Publish it as JSON on the readings key expression
//! 3. Render a snapshot card summarizing the reading
//! 4. Stream the snapshot to the relay as `"image:" + base64`
//! 5. Drop the snapshot
//!
//! Steps 2 and 4 are best-effort: a transport failure is logged and the
//! tick loop keeps running. Persistence is never performed here; that is
//! the store writers' job.

pub mod config;
pub mod error;
pub mod generator;
pub mod publisher;
pub mod relay;
pub mod snapshot;

pub use config::SimulatorConfig;
pub use error::SimulatorError;
pub use generator::ReadingGenerator;
pub use publisher::TickLoop;
pub use relay::RelayClient;
pub use snapshot::{Snapshot, SnapshotRenderer};
