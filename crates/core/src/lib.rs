//! Domain rules for the muster campaign tracker.
//!
//! This crate has zero storage or transport dependencies so it can be used
//! by the repository layer and any future worker or CLI tooling. It owns
//! the caller-role capability gate, the asset-pool accounting arithmetic,
//! the timeline vocabulary, and the shared error taxonomy.

pub mod accounting;
pub mod audit;
pub mod error;
pub mod roles;
pub mod timeline;
pub mod types;

pub use error::CoreError;
pub use roles::Role;
