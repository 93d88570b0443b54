//! Lifetime statistics and the missions that watch them.
//!
//! All mutations go through one mutex, the single ordered commit point: an
//! event's counter update and the re-evaluation of every mission reading that
//! counter happen in the same critical section, so no observer can see a
//! counter that its missions have not yet caught up with.

use crate::sync::lock;
use idle_core::{
    EconError, GameEvent, MissionDef, MissionId, MissionState, Reward, StatisticKey, Statistics,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use tokio::sync::watch;
use tracing::info;

/// Read-only view of one mission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissionProgress {
    pub id: MissionId,
    pub title: String,
    pub statistic: StatisticKey,
    pub current: u64,
    pub target: u64,
    pub state: MissionState,
    pub reward: Reward,
}

#[derive(Debug)]
struct MissionEntry {
    def: MissionDef,
    state: MissionState,
}

#[derive(Debug, Default)]
struct RecordState {
    statistics: Statistics,
    missions: BTreeMap<MissionId, MissionEntry>,
    /// Missions indexed by the statistic they read.
    by_statistic: BTreeMap<StatisticKey, Vec<MissionId>>,
    /// Number of missions currently claimable.
    claimable: usize,
    events_applied: u64,
}

impl RecordState {
    fn new(defs: Vec<MissionDef>) -> Self {
        let mut state = Self::default();
        for def in defs {
            state
                .by_statistic
                .entry(def.statistic)
                .or_default()
                .push(def.id);
            state.missions.insert(
                def.id,
                MissionEntry {
                    def,
                    state: MissionState::Locked,
                },
            );
        }
        state
    }

    /// Advances every mission reading `key`; returns the newly claimable ones.
    fn reevaluate(&mut self, key: StatisticKey) -> Vec<MissionId> {
        let current = self.statistics.get(key);
        let mut promoted = Vec::new();
        let Some(ids) = self.by_statistic.get(&key) else {
            return promoted;
        };
        for id in ids {
            let Some(entry) = self.missions.get_mut(id) else {
                continue;
            };
            let before = entry.state;
            entry.state = before.advance(current, entry.def.target);
            if entry.state == MissionState::Claimable && before != MissionState::Claimable {
                self.claimable += 1;
                promoted.push(*id);
            }
        }
        promoted
    }

    fn progress(&self, entry: &MissionEntry) -> MissionProgress {
        MissionProgress {
            id: entry.def.id,
            title: entry.def.title.clone(),
            statistic: entry.def.statistic,
            current: self.statistics.get(entry.def.statistic),
            target: entry.def.target,
            state: entry.state,
            reward: entry.def.reward,
        }
    }
}

/// Statistics ledger and mission tracker.
#[derive(Debug)]
pub struct Record {
    inner: Mutex<RecordState>,
    completion: watch::Sender<bool>,
}

impl Record {
    pub fn new(missions: Vec<MissionDef>) -> Self {
        let (completion, _) = watch::channel(false);
        Self {
            inner: Mutex::new(RecordState::new(missions)),
            completion,
        }
    }

    /// Rebuilds from saved counters and claimed missions.
    ///
    /// Missions whose statistic has been observed are promoted as if the
    /// events had just been applied; claimed ones stay claimed.
    pub fn restore(missions: Vec<MissionDef>, statistics: Statistics, claimed: &[MissionId]) -> Self {
        let claimed: BTreeSet<MissionId> = claimed.iter().copied().collect();
        let mut state = RecordState::new(missions);
        state.statistics = statistics;
        for (id, entry) in state.missions.iter_mut() {
            if claimed.contains(id) {
                entry.state = MissionState::Claimed;
                continue;
            }
            let current = state.statistics.get(entry.def.statistic);
            if current > 0 {
                entry.state = entry.state.advance(current, entry.def.target);
            }
        }
        state.claimable = state
            .missions
            .values()
            .filter(|e| e.state == MissionState::Claimable)
            .count();
        let (completion, _) = watch::channel(state.claimable > 0);
        Self {
            inner: Mutex::new(state),
            completion,
        }
    }

    /// Applies one event and re-evaluates the missions it affects.
    ///
    /// Safe to call from any number of threads; returns the missions that
    /// became claimable because of this event.
    pub fn record(&self, event: &GameEvent) -> Vec<MissionId> {
        let mut state = lock(&self.inner);
        state.events_applied += 1;
        let Some(key) = state.statistics.apply(event) else {
            return Vec::new();
        };
        let promoted = state.reevaluate(key);
        if !promoted.is_empty() {
            info!(?event, ?promoted, "missions claimable");
            self.completion.send_replace(state.claimable > 0);
        }
        promoted
    }

    /// Moves a claimable mission to claimed and hands out its reward once.
    pub fn claim(&self, id: MissionId) -> Result<Reward, EconError> {
        let mut state = lock(&self.inner);
        let reward = {
            let entry = state
                .missions
                .get_mut(&id)
                .ok_or(EconError::UnknownMission(id))?;
            if entry.state != MissionState::Claimable {
                return Err(EconError::NotClaimable {
                    id,
                    state: entry.state,
                });
            }
            entry.state = MissionState::Claimed;
            entry.def.reward
        };
        debug_assert!(state.claimable > 0, "claimed mission was not counted");
        state.claimable -= 1;
        state.events_applied += 1;
        if let Some(key) = state.statistics.apply(&GameEvent::MissionClaimed { id }) {
            state.reevaluate(key);
        }
        self.completion.send_replace(state.claimable > 0);
        info!(%id, ?reward, "mission claimed");
        Ok(reward)
    }

    /// True while at least one mission waits to be claimed.
    pub fn has_completed_mission(&self) -> bool {
        lock(&self.inner).claimable > 0
    }

    pub fn claimable_count(&self) -> usize {
        lock(&self.inner).claimable
    }

    /// Observer of [`Record::has_completed_mission`].
    pub fn subscribe_completion(&self) -> watch::Receiver<bool> {
        self.completion.subscribe()
    }

    pub fn statistic(&self, key: StatisticKey) -> u64 {
        lock(&self.inner).statistics.get(key)
    }

    pub fn statistics(&self) -> Statistics {
        lock(&self.inner).statistics.clone()
    }

    /// Events accepted so far, including ones no counter observes.
    pub fn events_applied(&self) -> u64 {
        lock(&self.inner).events_applied
    }

    pub fn mission_state(&self, id: MissionId) -> Option<MissionState> {
        lock(&self.inner).missions.get(&id).map(|e| e.state)
    }

    pub fn progress(&self, id: MissionId) -> Option<MissionProgress> {
        let state = lock(&self.inner);
        state.missions.get(&id).map(|e| state.progress(e))
    }

    pub fn missions(&self) -> Vec<MissionProgress> {
        let state = lock(&self.inner);
        state.missions.values().map(|e| state.progress(e)).collect()
    }

    pub fn claimed(&self) -> Vec<MissionId> {
        lock(&self.inner)
            .missions
            .values()
            .filter(|e| e.state == MissionState::Claimed)
            .map(|e| e.def.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idle_core::{CurrencyKind, GameKind};
    use std::sync::Arc;
    use std::thread;

    fn mission(id: u32, statistic: StatisticKey, target: u64) -> MissionDef {
        MissionDef {
            id: MissionId(id),
            title: format!("mission {id}"),
            statistic,
            target,
            reward: Reward {
                currency: CurrencyKind::Gold,
                amount: 10,
            },
        }
    }

    fn language() -> GameEvent {
        GameEvent::ActionPerformed {
            game: GameKind::Language,
        }
    }

    #[test]
    fn lifecycle_moves_forward_only() {
        let record = Record::new(vec![mission(1, StatisticKey::LanguageCorrectCount, 3)]);
        let id = MissionId(1);
        assert_eq!(record.mission_state(id), Some(MissionState::Locked));
        record.record(&language());
        assert_eq!(record.mission_state(id), Some(MissionState::InProgress));
        record.record(&language());
        assert!(!record.has_completed_mission());
        assert_eq!(record.record(&language()), vec![id]);
        assert_eq!(record.mission_state(id), Some(MissionState::Claimable));
        assert!(record.has_completed_mission());
        // further events never re-promote
        assert!(record.record(&language()).is_empty());
        assert_eq!(record.claimable_count(), 1);
    }

    #[test]
    fn unrelated_events_leave_missions_locked() {
        let record = Record::new(vec![mission(1, StatisticKey::LanguageCorrectCount, 3)]);
        record.record(&GameEvent::ActionPerformed {
            game: GameKind::Coding,
        });
        assert_eq!(record.mission_state(MissionId(1)), Some(MissionState::Locked));
        assert_eq!(record.events_applied(), 1);
    }

    #[test]
    fn claim_only_from_claimable_and_once() {
        let record = Record::new(vec![mission(1, StatisticKey::LanguageCorrectCount, 1)]);
        let id = MissionId(1);
        assert_eq!(
            record.claim(id),
            Err(EconError::NotClaimable {
                id,
                state: MissionState::Locked
            })
        );
        record.record(&language());
        let reward = record.claim(id).unwrap();
        assert_eq!(reward.amount, 10);
        assert!(!record.has_completed_mission());
        assert_eq!(
            record.claim(id),
            Err(EconError::NotClaimable {
                id,
                state: MissionState::Claimed
            })
        );
        assert_eq!(record.statistic(StatisticKey::MissionsClaimed), 1);
        assert_eq!(
            record.claim(MissionId(99)),
            Err(EconError::UnknownMission(MissionId(99)))
        );
    }

    #[test]
    fn claimable_count_follows_every_claim() {
        let defs = (1..=5)
            .map(|i| mission(i, StatisticKey::CodingCorrectCount, u64::from(i)))
            .collect();
        let record = Record::new(defs);
        for _ in 0..3 {
            record.record(&GameEvent::ActionPerformed {
                game: GameKind::Coding,
            });
        }
        assert_eq!(record.claimable_count(), 3);
        for id in [2, 1, 3] {
            record.claim(MissionId(id)).unwrap();
        }
        assert_eq!(record.claimable_count(), 0);
        assert!(!record.has_completed_mission());
        assert_eq!(record.claimed(), vec![MissionId(1), MissionId(2), MissionId(3)]);
        assert!(record.claim(MissionId(4)).is_err());
        assert_eq!(record.claimable_count(), 0);
    }

    #[test]
    fn claiming_can_complete_meta_missions() {
        let record = Record::new(vec![
            mission(1, StatisticKey::LanguageCorrectCount, 1),
            mission(2, StatisticKey::MissionsClaimed, 1),
        ]);
        record.record(&language());
        record.claim(MissionId(1)).unwrap();
        assert_eq!(record.mission_state(MissionId(2)), Some(MissionState::Claimable));
        assert!(record.has_completed_mission());
    }

    #[test]
    fn one_event_promotes_all_thirty_watchers() {
        let defs = (1..=30)
            .map(|i| mission(i, StatisticKey::LanguageCorrectCount, 1))
            .collect();
        let record = Record::new(defs);
        let promoted = record.record(&language());
        assert_eq!(promoted.len(), 30);
        assert_eq!(record.claimable_count(), 30);
        assert!(record
            .missions()
            .iter()
            .all(|m| m.state == MissionState::Claimable));
    }

    #[test]
    fn concurrent_hundred_events_count_exactly() {
        let record = Record::new(vec![
            mission(1, StatisticKey::LanguageCorrectCount, 100),
            mission(2, StatisticKey::LanguageCorrectCount, 101),
        ]);
        thread::scope(|s| {
            for _ in 0..100 {
                s.spawn(|| {
                    record.record(&language());
                });
            }
        });
        assert_eq!(record.statistic(StatisticKey::LanguageCorrectCount), 100);
        assert_eq!(record.mission_state(MissionId(1)), Some(MissionState::Claimable));
        assert_eq!(record.mission_state(MissionId(2)), Some(MissionState::InProgress));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn ten_thousand_concurrent_events_promote_exactly_once() {
        const N: u64 = 10_000;
        let defs = (1..=30)
            .map(|i| mission(i, StatisticKey::TotalEarnedMoney, u64::from(i) * 1_000))
            .collect();
        let record = Arc::new(Record::new(defs));
        let mut tasks = Vec::with_capacity(N as usize);
        for _ in 0..N {
            let record = Arc::clone(&record);
            tasks.push(tokio::spawn(async move {
                record.record(&GameEvent::CurrencyEarned {
                    currency: CurrencyKind::Gold,
                    amount: 3,
                })
            }));
        }
        let mut promotions = 0;
        for t in tasks {
            promotions += t.await.unwrap().len();
        }
        assert_eq!(record.statistic(StatisticKey::TotalEarnedMoney), 3 * N);
        assert_eq!(record.events_applied(), N);
        // 30_000 earned crosses every target up to 30_000
        assert_eq!(promotions, 30);
        assert_eq!(record.claimable_count(), 30);
    }

    #[test]
    fn concurrent_claims_pay_once() {
        let record = Record::new(vec![mission(1, StatisticKey::LanguageCorrectCount, 1)]);
        record.record(&language());
        let paid = std::sync::atomic::AtomicU32::new(0);
        thread::scope(|s| {
            for _ in 0..16 {
                s.spawn(|| {
                    if record.claim(MissionId(1)).is_ok() {
                        paid.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    }
                });
            }
        });
        assert_eq!(paid.into_inner(), 1);
    }

    #[test]
    fn restore_rederives_states() {
        let defs = vec![
            mission(1, StatisticKey::LanguageCorrectCount, 5),
            mission(2, StatisticKey::LanguageCorrectCount, 50),
            mission(3, StatisticKey::CodingCorrectCount, 5),
            mission(4, StatisticKey::LanguageCorrectCount, 1),
        ];
        let stats: Statistics = [(StatisticKey::LanguageCorrectCount, 7)].into_iter().collect();
        let record = Record::restore(defs, stats, &[MissionId(4)]);
        assert_eq!(record.mission_state(MissionId(1)), Some(MissionState::Claimable));
        assert_eq!(record.mission_state(MissionId(2)), Some(MissionState::InProgress));
        assert_eq!(record.mission_state(MissionId(3)), Some(MissionState::Locked));
        assert_eq!(record.mission_state(MissionId(4)), Some(MissionState::Claimed));
        assert!(record.has_completed_mission());
        assert!(*record.subscribe_completion().borrow());
        assert_eq!(record.claimed(), vec![MissionId(4)]);
    }

    #[test]
    fn completion_observer_follows_transitions() {
        let record = Record::new(vec![mission(1, StatisticKey::LanguageCorrectCount, 1)]);
        let rx = record.subscribe_completion();
        assert!(!*rx.borrow());
        record.record(&language());
        assert!(*rx.borrow());
        record.claim(MissionId(1)).unwrap();
        assert!(!*rx.borrow());
    }

    #[test]
    fn progress_reports_current_value() {
        let record = Record::new(vec![mission(1, StatisticKey::LanguageCorrectCount, 4)]);
        record.record(&language());
        record.record(&language());
        let p = record.progress(MissionId(1)).unwrap();
        assert_eq!((p.current, p.target), (2, 4));
        assert_eq!(p.state, MissionState::InProgress);
        assert!(record.progress(MissionId(2)).is_none());
    }
}
