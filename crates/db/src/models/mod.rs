//! Entity structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` + `Validate` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod asset;
pub mod campaign;
pub mod event;
pub mod library;
pub mod log;
pub mod mission;
pub mod pool;
