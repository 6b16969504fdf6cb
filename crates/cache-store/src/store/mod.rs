//! # Store Module
//!
//! The two interchangeable key/value backends.

pub mod memory;
#[cfg(feature = "redis")]
pub mod remote;

pub use memory::{MemoryStore, Sweeper};
#[cfg(feature = "redis")]
pub use remote::RemoteStore;
