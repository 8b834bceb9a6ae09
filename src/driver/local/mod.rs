//! # Local Filesystem Driver
//!
//! `PathResolver` owns all key/path arithmetic and the containment check,
//! `LocalStore` performs the filesystem actions on resolved paths.

pub mod resolver;
pub mod store;
pub mod walk;

pub use resolver::PathResolver;
pub use store::LocalStore;
