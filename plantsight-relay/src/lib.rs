//! Snapshot relay.
//!
//! A minimal streaming rendezvous: the publisher streams snapshot
//! frames in, the relay fans each one out to every other live
//! connection. Late joiners see nothing retroactively; a slow or dead
//! viewer never stalls delivery to the rest.

pub mod config;
pub mod server;

pub use config::RelayConfig;
pub use server::{RelayError, RelayServer};
