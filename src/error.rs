//! Error taxonomy for the campaign map engine.

/// Everything the engine can fail with.
///
/// `Locked` is the only variant meant for the player; the rest are data or
/// infrastructure problems that get logged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CampaignError {
    #[error("rank {rank} is outside 1..={total}")]
    OutOfRange { rank: u32, total: u32 },
    #[error("sector {rank} is locked until sector {required} is complete")]
    Locked { rank: u32, required: u32 },
    #[error("progress store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("campaign has no waypoints")]
    EmptyCampaign,
    #[error("rank {0} is defined more than once")]
    DuplicateRank(u32),
    #[error("waypoint {0} has a non-finite position")]
    NonFinitePosition(u32),
    #[error("content margin must be finite and non-negative")]
    InvalidMargin,
}

impl CampaignError {
    /// Text shown to the player, if this error is one they should see.
    pub fn player_message(&self) -> Option<String> {
        match self {
            CampaignError::Locked { required, .. } => {
                Some(format!("Complete Sector {} first!", required))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_locked_has_player_message() {
        let locked = CampaignError::Locked { rank: 5, required: 2 };
        assert_eq!(locked.player_message().as_deref(), Some("Complete Sector 2 first!"));
        assert!(CampaignError::OutOfRange { rank: 0, total: 12 }.player_message().is_none());
        assert!(CampaignError::StoreUnavailable("quota".into()).player_message().is_none());
    }

    #[test]
    fn display_names_the_rank() {
        let e = CampaignError::OutOfRange { rank: 13, total: 12 };
        assert_eq!(e.to_string(), "rank 13 is outside 1..=12");
    }
}
