use crate::{ConsumableKind, CurrencyKind, GameKind, MissionId, SkillKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named lifetime counters. All are cumulative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticKey {
    LanguageCorrectCount,
    CodingCorrectCount,
    DebuggingCorrectCount,
    NetworkingCorrectCount,
    TotalEarnedMoney,
    TotalEarnedDiamond,
    TotalSpentMoney,
    ConsumablesUsed,
    SkillUpgrades,
    MissionsClaimed,
}

impl StatisticKey {
    /// Counter of successful actions in `game`.
    pub fn correct_count(game: GameKind) -> Self {
        match game {
            GameKind::Language => StatisticKey::LanguageCorrectCount,
            GameKind::Coding => StatisticKey::CodingCorrectCount,
            GameKind::Debugging => StatisticKey::DebuggingCorrectCount,
            GameKind::Networking => StatisticKey::NetworkingCorrectCount,
        }
    }
}

/// One gameplay occurrence, the unit consumed by the statistics ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    ActionPerformed { game: GameKind },
    CurrencyEarned { currency: CurrencyKind, amount: u64 },
    CurrencySpent { currency: CurrencyKind, amount: u64 },
    ConsumableUsed { kind: ConsumableKind },
    SkillUpgraded { key: SkillKey },
    MissionClaimed { id: MissionId },
}

/// Cumulative counters keyed by statistic.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Statistics {
    counters: BTreeMap<StatisticKey, u64>,
}

impl Statistics {
    pub fn get(&self, key: StatisticKey) -> u64 {
        self.counters.get(&key).copied().unwrap_or(0)
    }

    /// Applies the event's counting rule and returns the key it touched.
    ///
    /// Discrete events count one; value events add their amount. Events that
    /// no counter observes, and zero amounts, touch nothing.
    pub fn apply(&mut self, event: &GameEvent) -> Option<StatisticKey> {
        let (key, delta) = match event {
            GameEvent::ActionPerformed { game } => (StatisticKey::correct_count(*game), 1),
            GameEvent::CurrencyEarned { currency, amount } => match currency {
                CurrencyKind::Gold => (StatisticKey::TotalEarnedMoney, *amount),
                CurrencyKind::Diamond => (StatisticKey::TotalEarnedDiamond, *amount),
            },
            GameEvent::CurrencySpent {
                currency: CurrencyKind::Gold,
                amount,
            } => (StatisticKey::TotalSpentMoney, *amount),
            GameEvent::CurrencySpent { .. } => return None,
            GameEvent::ConsumableUsed { .. } => (StatisticKey::ConsumablesUsed, 1),
            GameEvent::SkillUpgraded { .. } => (StatisticKey::SkillUpgrades, 1),
            GameEvent::MissionClaimed { .. } => (StatisticKey::MissionsClaimed, 1),
        };
        if delta == 0 {
            return None;
        }
        let slot = self.counters.entry(key).or_insert(0);
        *slot = slot.saturating_add(delta);
        Some(key)
    }

    /// Non-zero counters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (StatisticKey, u64)> + '_ {
        self.counters.iter().map(|(k, v)| (*k, *v))
    }
}

impl FromIterator<(StatisticKey, u64)> for Statistics {
    fn from_iter<I: IntoIterator<Item = (StatisticKey, u64)>>(iter: I) -> Self {
        Self {
            counters: iter.into_iter().filter(|(_, v)| *v > 0).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn discrete_events_count_one() {
        let mut s = Statistics::default();
        let key = s.apply(&GameEvent::ActionPerformed {
            game: GameKind::Language,
        });
        assert_eq!(key, Some(StatisticKey::LanguageCorrectCount));
        assert_eq!(s.get(StatisticKey::LanguageCorrectCount), 1);
        assert_eq!(s.get(StatisticKey::CodingCorrectCount), 0);
    }

    #[test]
    fn value_events_add_amount() {
        let mut s = Statistics::default();
        s.apply(&GameEvent::CurrencyEarned {
            currency: CurrencyKind::Gold,
            amount: 40,
        });
        s.apply(&GameEvent::CurrencyEarned {
            currency: CurrencyKind::Gold,
            amount: 2,
        });
        assert_eq!(s.get(StatisticKey::TotalEarnedMoney), 42);
        assert_eq!(
            s.apply(&GameEvent::CurrencyEarned {
                currency: CurrencyKind::Gold,
                amount: 0
            }),
            None
        );
    }

    #[test]
    fn diamond_spend_is_not_counted() {
        let mut s = Statistics::default();
        let key = s.apply(&GameEvent::CurrencySpent {
            currency: CurrencyKind::Diamond,
            amount: 5,
        });
        assert_eq!(key, None);
        assert_eq!(s.iter().count(), 0);
    }

    #[test]
    fn serializes_with_snake_case_keys() {
        let s: Statistics = [(StatisticKey::TotalEarnedMoney, 7)].into_iter().collect();
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("total_earned_money"));
        let back: Statistics = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    proptest! {
        #[test]
        fn counters_never_decrease(amounts in proptest::collection::vec(0u64..1_000, 1..50)) {
            let mut s = Statistics::default();
            let mut last = 0;
            for a in amounts {
                s.apply(&GameEvent::CurrencyEarned { currency: CurrencyKind::Gold, amount: a });
                let now = s.get(StatisticKey::TotalEarnedMoney);
                prop_assert!(now >= last);
                last = now;
            }
        }
    }
}
