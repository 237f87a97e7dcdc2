//! Quest status machine.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Lifecycle state of a quest.
///
/// Stored as lowercase text in the `quests.status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl QuestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(CoreError::Internal(format!(
                "Unknown quest status '{other}' in database"
            ))),
        }
    }

    /// A quest can be assigned only while open.
    pub fn can_assign(self) -> bool {
        self == Self::Open
    }

    /// A quest can be cancelled while open or in progress.
    pub fn can_cancel(self) -> bool {
        matches!(self, Self::Open | Self::InProgress)
    }

    /// A quest can be turned in only while in progress.
    pub fn can_turn_in(self) -> bool {
        self == Self::InProgress
    }
}

/// Check turn-in preconditions: the quest must be in progress and the
/// requester must be its current assignee.
///
/// The repository re-checks both conditions inside the completion
/// transaction (compare-and-swap on the status row), so a concurrent
/// second turn-in cannot award XP twice; this check exists to surface a
/// precise error before any write is attempted.
pub fn check_turn_in(
    status: QuestStatus,
    assignee_id: Option<DbId>,
    requester_id: DbId,
) -> Result<(), CoreError> {
    if !status.can_turn_in() {
        return Err(CoreError::Conflict(format!(
            "Quest cannot be turned in from status '{}'",
            status.as_str()
        )));
    }
    match assignee_id {
        Some(id) if id == requester_id => Ok(()),
        _ => Err(CoreError::Forbidden(
            "Only the quest's assignee can turn it in".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            QuestStatus::Open,
            QuestStatus::InProgress,
            QuestStatus::Completed,
            QuestStatus::Cancelled,
        ] {
            assert_eq!(QuestStatus::parse(status.as_str()).unwrap(), status);
        }
        assert_matches!(QuestStatus::parse("bogus"), Err(CoreError::Internal(_)));
    }

    #[test]
    fn turn_in_requires_in_progress() {
        assert!(check_turn_in(QuestStatus::InProgress, Some(7), 7).is_ok());

        assert_matches!(
            check_turn_in(QuestStatus::Completed, Some(7), 7),
            Err(CoreError::Conflict(_))
        );
        assert_matches!(
            check_turn_in(QuestStatus::Open, Some(7), 7),
            Err(CoreError::Conflict(_))
        );
        assert_matches!(
            check_turn_in(QuestStatus::Cancelled, Some(7), 7),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn turn_in_requires_the_assignee() {
        assert_matches!(
            check_turn_in(QuestStatus::InProgress, Some(7), 8),
            Err(CoreError::Forbidden(_))
        );
        assert_matches!(
            check_turn_in(QuestStatus::InProgress, None, 8),
            Err(CoreError::Forbidden(_))
        );
    }

    #[test]
    fn transition_guards() {
        assert!(QuestStatus::Open.can_assign());
        assert!(!QuestStatus::InProgress.can_assign());
        assert!(QuestStatus::Open.can_cancel());
        assert!(QuestStatus::InProgress.can_cancel());
        assert!(!QuestStatus::Completed.can_cancel());
    }
}
