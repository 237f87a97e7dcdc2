//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts

pub mod quest;
pub mod role;
pub mod session;
pub mod skill;
pub mod team;
pub mod user;
