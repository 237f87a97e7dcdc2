//! Candidate ranking against a quest's required-skill map.
//!
//! Used when a guild leader is composing a quest: team members are scored
//! by how closely their skill map covers the required proficiencies, best
//! match first.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::skill_map::SkillMap;
use crate::types::DbId;

/// A candidate assignee: user id plus their current skill map.
#[derive(Debug, Clone)]
pub struct CandidateProfile {
    pub user_id: DbId,
    pub skills: SkillMap,
}

/// A ranked candidate with its match score in `[0, 1]`.
#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    pub user_id: DbId,
    pub score: f64,
}

/// Score a skill map against required skills.
///
/// Per required skill the contribution is `min(user_xp, target) / target`,
/// so matching or exceeding the target scores 1.0. The total is the mean
/// across all required skills. An empty requirement map scores 0. A
/// zero-weight required skill is automatically satisfied (1.0) rather than
/// dividing by zero.
pub fn match_score(required: &BTreeMap<String, i32>, skills: &SkillMap) -> f64 {
    if required.is_empty() {
        return 0.0;
    }

    let sum: f64 = required
        .iter()
        .map(|(name, &target)| {
            if target <= 0 {
                return 1.0;
            }
            let user_xp = skills.declared(name);
            user_xp.min(i64::from(target)) as f64 / f64::from(target)
        })
        .sum();

    sum / required.len() as f64
}

/// Rank candidates by match score, best first.
///
/// The sort is stable, but the relative order of equal scores is not part
/// of the contract. The input is consumed; callers keep their own copy if
/// they need the original order.
pub fn rank_candidates(
    required: &BTreeMap<String, i32>,
    candidates: Vec<CandidateProfile>,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .into_iter()
        .map(|c| RankedCandidate {
            score: match_score(required, &c.skills),
            user_id: c.user_id,
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}
