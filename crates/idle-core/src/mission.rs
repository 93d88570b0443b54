use crate::{CurrencyKind, StatisticKey};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MissionId(pub u32);

impl fmt::Display for MissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Currency credited when a mission is claimed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub currency: CurrencyKind,
    pub amount: u64,
}

/// A goal watching one statistic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionDef {
    pub id: MissionId,
    pub title: String,
    /// Statistic whose value is the mission's progress.
    pub statistic: StatisticKey,
    /// Progress at which the mission becomes claimable (>= 1).
    pub target: u64,
    pub reward: Reward,
}

/// Mission lifecycle. Transitions only move forward.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MissionState {
    #[default]
    Locked,
    InProgress,
    Claimable,
    Claimed,
}

impl MissionState {
    /// State reached after observing `current` progress, never regressing.
    pub fn advance(self, current: u64, target: u64) -> MissionState {
        match self {
            MissionState::Locked | MissionState::InProgress if current >= target => {
                MissionState::Claimable
            }
            MissionState::Locked => MissionState::InProgress,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn locked_promotes_on_first_observation() {
        assert_eq!(MissionState::Locked.advance(0, 10), MissionState::InProgress);
        assert_eq!(MissionState::Locked.advance(3, 10), MissionState::InProgress);
        assert_eq!(MissionState::Locked.advance(10, 10), MissionState::Claimable);
    }

    #[test]
    fn terminal_states_hold() {
        assert_eq!(MissionState::Claimable.advance(0, 10), MissionState::Claimable);
        assert_eq!(MissionState::Claimed.advance(99, 10), MissionState::Claimed);
    }

    fn any_state() -> impl Strategy<Value = MissionState> {
        prop_oneof![
            Just(MissionState::Locked),
            Just(MissionState::InProgress),
            Just(MissionState::Claimable),
            Just(MissionState::Claimed),
        ]
    }

    proptest! {
        #[test]
        fn advance_never_regresses(state in any_state(), current in 0u64..100, target in 1u64..100) {
            prop_assert!(state.advance(current, target) >= state);
        }
    }
}
