//! Quest-completion XP award computation.
//!
//! Pure half of the turn-in transaction: given the quest's required-skill
//! proficiency weights and the assignee's skill map + favorite set, compute
//! the per-skill XP deltas. The atomic persistence of these deltas together
//! with the quest status flip lives in `questboard_db::QuestRepo::complete`.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::error::CoreError;
use crate::leveling::level_info;
use crate::skill_map::SkillMap;

/// XP earned per proficiency-weight point on completion.
pub const BASE_XP_MULTIPLIER: i64 = 5;

/// Extra multiplier applied to a user's favorite skills.
pub const FAVORITE_XP_MULTIPLIER: i64 = 3;

/// Maximum number of favorite skills a user may tag.
pub const MAX_FAVORITE_SKILLS: usize = 3;

/// Per-skill XP delta produced by completing a quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkillChange {
    pub before: i64,
    pub after: i64,
    pub gained: i64,
    pub is_favorite: bool,
}

impl SkillChange {
    /// Whether this change crossed at least one level boundary.
    ///
    /// Derived for UI feedback only; never persisted.
    pub fn leveled_up(&self) -> bool {
        level_info(self.before).level < level_info(self.after).level
    }
}

/// Compute XP awards for every required skill of a quest.
///
/// Exactly one change record per required skill. Undeclared (`-1`) and
/// missing skills award from a base of 0, so completion also transitions
/// them into the declared state. XP never decreases.
pub fn compute_skill_awards(
    required: &BTreeMap<String, i32>,
    skills: &SkillMap,
    favorites: &BTreeSet<String>,
) -> BTreeMap<String, SkillChange> {
    required
        .iter()
        .map(|(name, &weight)| {
            let before = skills.declared(name);
            let is_favorite = favorites.contains(name);
            let multiplier = if is_favorite {
                BASE_XP_MULTIPLIER * FAVORITE_XP_MULTIPLIER
            } else {
                BASE_XP_MULTIPLIER
            };
            let gained = i64::from(weight.max(0)) * multiplier;

            (
                name.clone(),
                SkillChange {
                    before,
                    after: before + gained,
                    gained,
                    is_favorite,
                },
            )
        })
        .collect()
}

/// Validate a favorite-skill selection: at most [`MAX_FAVORITE_SKILLS`],
/// each a skill the user actually has.
pub fn validate_favorites(
    favorites: &BTreeSet<String>,
    skills: &SkillMap,
) -> Result<(), CoreError> {
    if favorites.len() > MAX_FAVORITE_SKILLS {
        return Err(CoreError::Validation(format!(
            "At most {MAX_FAVORITE_SKILLS} favorite skills allowed, got {}",
            favorites.len()
        )));
    }
    for name in favorites {
        if !skills.contains(name) {
            return Err(CoreError::Validation(format!(
                "Cannot favorite unknown skill '{name}'"
            )));
        }
    }
    Ok(())
}
