//! Skill declaration scoring.
//!
//! Converts a four-slider self-assessment into a one-time declared XP
//! award. Declining a skill is the same computation with all sliders at 0,
//! which still transitions the skill out of the undeclared sentinel.

use serde::Deserialize;
use validator::Validate;

/// Upper bound of each assessment slider.
pub const ASSESSMENT_MAX: f64 = 5.0;

/// Maximum XP a self-assessment can award (all sliders at the top).
pub const DECLARED_XP_SCALE: i64 = 165;

/// Weighted contribution of each slider to the declared score.
const WEIGHT_PROFESSIONAL: f64 = 0.4;
const WEIGHT_EDUCATION: f64 = 0.3;
const WEIGHT_INFORMAL: f64 = 0.2;
const WEIGHT_CONFIDENCE: f64 = 0.1;

/// A self-assessment for one skill; each slider in `[0, 5]`.
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct SkillAssessment {
    #[validate(range(min = 0.0, max = 5.0))]
    pub professional_experience: f64,
    #[validate(range(min = 0.0, max = 5.0))]
    pub formal_education: f64,
    #[validate(range(min = 0.0, max = 5.0))]
    pub informal_experience: f64,
    #[validate(range(min = 0.0, max = 5.0))]
    pub confidence: f64,
}

impl SkillAssessment {
    /// The all-zeros assessment used by the "decline" action.
    pub fn declined() -> Self {
        Self {
            professional_experience: 0.0,
            formal_education: 0.0,
            informal_experience: 0.0,
            confidence: 0.0,
        }
    }
}

/// Compute the declared XP for an assessment.
///
/// The weighted slider sum (weights 0.4 / 0.3 / 0.2 / 0.1) is normalized
/// by [`ASSESSMENT_MAX`] into `[0, 1]` and scaled by [`DECLARED_XP_SCALE`],
/// so the maximum declared XP is 165. Monotonically non-decreasing in each
/// slider; all-zeros yields exactly 0.
pub fn declared_xp(assessment: &SkillAssessment) -> i64 {
    let weighted = assessment.professional_experience * WEIGHT_PROFESSIONAL
        + assessment.formal_education * WEIGHT_EDUCATION
        + assessment.informal_experience * WEIGHT_INFORMAL
        + assessment.confidence * WEIGHT_CONFIDENCE;

    (weighted / ASSESSMENT_MAX * DECLARED_XP_SCALE as f64).round() as i64
}
