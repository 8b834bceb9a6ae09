//! depot - key-addressed byte storage
//!
//! A uniform driver contract (get/set/delete/list/rename/touch/size/mtime)
//! with a local-filesystem backend that keeps every resolved path inside its
//! configured root.

pub mod cli;
pub mod driver;
