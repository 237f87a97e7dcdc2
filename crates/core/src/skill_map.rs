//! Validated skill-name → XP map.
//!
//! XP values are either [`UNDECLARED_XP`] (`-1`, the "assigned but not yet
//! self-assessed" sentinel) or a non-negative integer. The constructor and
//! all mutators reject anything else, so downstream code never has to
//! re-validate what it reads out of a [`SkillMap`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Sentinel XP value for a skill that has been assigned to a user but not
/// yet declared (assessed or declined).
pub const UNDECLARED_XP: i64 = -1;

/// Ordered-irrelevant mapping from skill name to cumulative XP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillMap(BTreeMap<String, i64>);

impl SkillMap {
    /// Create an empty skill map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a skill map from `(name, xp)` entries.
    ///
    /// Rejects any XP value below `-1`.
    pub fn from_entries<I>(entries: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (String, i64)>,
    {
        let mut map = BTreeMap::new();
        for (name, xp) in entries {
            validate_xp(&name, xp)?;
            map.insert(name, xp);
        }
        Ok(Self(map))
    }

    /// Insert or replace a skill entry. Rejects XP values below `-1`.
    pub fn set(&mut self, name: &str, xp: i64) -> Result<(), CoreError> {
        validate_xp(name, xp)?;
        self.0.insert(name.to_string(), xp);
        Ok(())
    }

    /// Raw XP value for a skill, if present (may be the `-1` sentinel).
    pub fn get(&self, name: &str) -> Option<i64> {
        self.0.get(name).copied()
    }

    /// Effective XP for a skill: missing and undeclared skills read as 0.
    ///
    /// This is the value the leveling engine and XP-award logic consume;
    /// neither ever sees the sentinel.
    pub fn declared(&self, name: &str) -> i64 {
        self.get(name).map_or(0, |xp| xp.max(0))
    }

    /// Whether the skill is present and has been declared (not `-1`).
    pub fn is_declared(&self, name: &str) -> bool {
        matches!(self.get(name), Some(xp) if xp >= 0)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(name, xp)| (name.as_str(), *xp))
    }
}

fn validate_xp(name: &str, xp: i64) -> Result<(), CoreError> {
    if xp < UNDECLARED_XP {
        return Err(CoreError::Validation(format!(
            "Invalid XP value {xp} for skill '{name}': must be -1 (undeclared) or non-negative"
        )));
    }
    Ok(())
}
