//! Quest Board domain logic.
//!
//! Pure, synchronous building blocks shared by the persistence and API
//! layers: the XP/leveling curve, skill maps, candidate match scoring,
//! quest-completion XP awards, and skill declaration scoring. Nothing in
//! this crate performs I/O.

pub mod completion;
pub mod declaration;
pub mod error;
pub mod leveling;
pub mod matching;
pub mod quest;
pub mod roles;
pub mod skill_map;
pub mod types;
