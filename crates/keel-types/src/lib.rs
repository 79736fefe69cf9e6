//! Foundation types for KEEL.
//!
//! This crate contains the types shared by every KEEL crate: the error type,
//! the console configuration, the models exchanged with the persistence and
//! cluster collaborators, and the manifest codec used when those models
//! cross a process boundary.

pub mod config;
pub mod error;
pub mod manifest;
pub mod model;
