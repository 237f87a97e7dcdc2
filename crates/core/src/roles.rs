//! Well-known role name constants.
//!
//! These must match the seed data in `20260301000001_create_roles_table.sql`.

pub const ROLE_GUILD_LEADER: &str = "guild_leader";
pub const ROLE_ADVENTURER: &str = "adventurer";
