//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod quest_repo;
pub mod role_repo;
pub mod session_repo;
pub mod skill_repo;
pub mod team_repo;
pub mod user_repo;

pub use quest_repo::QuestRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use skill_repo::SkillRepo;
pub use team_repo::TeamRepo;
pub use user_repo::UserRepo;
