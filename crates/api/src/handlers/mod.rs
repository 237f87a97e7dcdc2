//! HTTP handlers, grouped by resource.

pub mod auth;
pub mod quests;
pub mod skills;
pub mod teams;
pub mod users;
