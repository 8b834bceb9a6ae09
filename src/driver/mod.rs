//! # Storage Drivers
//!
//! Key-addressed byte storage behind a uniform driver contract, with a
//! local-filesystem implementation.

pub mod backend;
pub mod clock;
pub mod config;
pub mod errors;
pub mod local;
pub mod sharding;

pub use backend::{
    AbsolutePathAware, Capability, DirectoryAware, ListDepth, SizeAware, StorageDriver,
    Touchable, WriteOutcome,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::StorageConfig;
pub use errors::{StorageError, StorageResult};
pub use local::{LocalStore, PathResolver};
