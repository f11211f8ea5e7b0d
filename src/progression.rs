//! Campaign progression: which sectors are completed, unlocked or locked.
//!
//! The model writes through to its [`ProgressStore`] on every mutation, so the
//! in-memory state never runs ahead of what is persisted. A failed write is
//! logged and retried on the next mutation; it never reaches the caller.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::error::CampaignError;
use crate::model::{ProgressRecord, WaypointStatus};

/// Backing storage for progress. Absence of a record means a new player.
pub trait ProgressStore {
    fn load(&self) -> Result<Option<ProgressRecord>, CampaignError>;
    fn save(&mut self, record: &ProgressRecord) -> Result<(), CampaignError>;
}

/// In-memory store. Clones share the same slot, so a caller can keep a handle
/// and inspect what the model persisted.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    slot: Rc<RefCell<Option<ProgressRecord>>>,
}

impl MemoryStore {
    pub fn with_record(record: ProgressRecord) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(record))),
        }
    }

    pub fn record(&self) -> Option<ProgressRecord> {
        self.slot.borrow().clone()
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self) -> Result<Option<ProgressRecord>, CampaignError> {
        Ok(self.slot.borrow().clone())
    }

    fn save(&mut self, record: &ProgressRecord) -> Result<(), CampaignError> {
        *self.slot.borrow_mut() = Some(record.clone());
        Ok(())
    }
}

/// Proof that a selection passed the unlock gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Accepted {
    pub rank: u32,
}

pub struct ProgressionModel {
    total: u32,
    completed: BTreeSet<u32>,
    highest_unlocked: u32,
    unlock_all: bool,
    store: Box<dyn ProgressStore>,
    /// Set when the last write failed; cleared by the next successful one.
    unsaved: bool,
}

impl ProgressionModel {
    /// Reads progress for a campaign of `total` sectors, falling back to the
    /// new-player state when the store is empty or unreadable.
    pub fn load(total: u32, store: Box<dyn ProgressStore>, unlock_all: bool) -> Self {
        let total = total.max(1);
        let record = match store.load() {
            Ok(Some(r)) => r,
            Ok(None) => ProgressRecord::default(),
            Err(e) => {
                tracing::warn!("progress load failed, starting fresh for this session: {}", e);
                ProgressRecord::default()
            }
        };
        let mut completed = BTreeSet::new();
        for rank in record.completed_ranks {
            if rank >= 1 && rank <= total {
                completed.insert(rank);
            } else {
                tracing::warn!("dropping persisted completion for unknown rank {}", rank);
            }
        }
        let highest_unlocked = record.highest_unlocked_rank.clamp(1, total);
        tracing::info!(
            "progress loaded: frontier={} completed={:?} unlock_all={}",
            highest_unlocked,
            completed,
            unlock_all
        );
        Self {
            total,
            completed,
            highest_unlocked,
            unlock_all,
            store,
            unsaved: false,
        }
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn highest_unlocked_rank(&self) -> u32 {
        self.highest_unlocked
    }

    pub fn completed_ranks(&self) -> impl Iterator<Item = u32> + '_ {
        self.completed.iter().copied()
    }

    pub fn snapshot(&self) -> ProgressRecord {
        ProgressRecord {
            completed_ranks: self.completed.iter().copied().collect(),
            highest_unlocked_rank: self.highest_unlocked,
        }
    }

    fn in_range(&self, rank: u32) -> bool {
        rank >= 1 && rank <= self.total
    }

    pub fn is_unlocked(&self, rank: u32) -> bool {
        self.in_range(rank) && (self.unlock_all || rank <= self.highest_unlocked)
    }

    pub fn is_completed(&self, rank: u32) -> bool {
        self.completed.contains(&rank)
    }

    pub fn is_current(&self, rank: u32) -> bool {
        self.is_unlocked(rank) && !self.is_completed(rank) && rank == self.highest_unlocked
    }

    pub fn waypoint_status(&self, rank: u32) -> WaypointStatus {
        if self.is_completed(rank) {
            WaypointStatus::Completed
        } else if self.is_current(rank) {
            WaypointStatus::Current
        } else if self.is_unlocked(rank) {
            WaypointStatus::Unlocked
        } else {
            WaypointStatus::Locked
        }
    }

    /// No sector cleared yet and only the first one open.
    pub fn is_fresh(&self) -> bool {
        self.completed.is_empty() && self.highest_unlocked == 1
    }

    pub fn is_campaign_complete(&self) -> bool {
        self.completed.contains(&self.total)
    }

    pub fn unlock_all(&self) -> bool {
        self.unlock_all
    }

    pub fn set_unlock_all(&mut self, on: bool) {
        if self.unlock_all != on {
            tracing::info!("unlock_all override set to {}", on);
        }
        self.unlock_all = on;
    }

    /// False while a failed write is waiting for the next mutation to retry it.
    pub fn is_synced(&self) -> bool {
        !self.unsaved
    }

    pub fn attempt_select(&self, rank: u32) -> Result<Accepted, CampaignError> {
        if !self.in_range(rank) {
            tracing::error!("selection of unknown rank {} (total {})", rank, self.total);
            return Err(CampaignError::OutOfRange { rank, total: self.total });
        }
        if self.is_unlocked(rank) {
            Ok(Accepted { rank })
        } else {
            // The frontier is the sector that actually has to be cleared next.
            Err(CampaignError::Locked { rank, required: self.highest_unlocked })
        }
    }

    /// Records a cleared sector. Clearing the frontier opens the next one;
    /// clearing anything else never moves the frontier. Always persists.
    pub fn mark_completed(&mut self, rank: u32) -> Result<(), CampaignError> {
        if !self.in_range(rank) {
            tracing::error!("completion reported for unknown rank {} (total {})", rank, self.total);
            return Err(CampaignError::OutOfRange { rank, total: self.total });
        }
        let newly = self.completed.insert(rank);
        if rank == self.highest_unlocked && rank < self.total {
            self.highest_unlocked = rank + 1;
            tracing::info!("sector {} cleared, frontier advanced to {}", rank, self.highest_unlocked);
        } else if newly {
            tracing::info!("sector {} cleared, frontier stays at {}", rank, self.highest_unlocked);
        }
        self.persist();
        Ok(())
    }

    /// Back to the new-player state, persisted immediately.
    pub fn reset(&mut self) {
        self.completed.clear();
        self.highest_unlocked = 1;
        tracing::info!("progress reset");
        self.persist();
    }

    fn persist(&mut self) {
        let record = self.snapshot();
        match self.store.save(&record) {
            Ok(()) => {
                if self.unsaved {
                    tracing::info!("progress save recovered");
                }
                self.unsaved = false;
            }
            Err(e) => {
                tracing::warn!("progress save failed, will retry on next change: {}", e);
                self.unsaved = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlakyStore {
        fail_saves: Rc<RefCell<bool>>,
        inner: MemoryStore,
    }

    impl ProgressStore for FlakyStore {
        fn load(&self) -> Result<Option<ProgressRecord>, CampaignError> {
            Err(CampaignError::StoreUnavailable("no storage".into()))
        }
        fn save(&mut self, record: &ProgressRecord) -> Result<(), CampaignError> {
            if *self.fail_saves.borrow() {
                return Err(CampaignError::StoreUnavailable("quota".into()));
            }
            self.inner.save(record)
        }
    }

    fn fresh(total: u32) -> (ProgressionModel, MemoryStore) {
        let store = MemoryStore::default();
        (ProgressionModel::load(total, Box::new(store.clone()), false), store)
    }

    #[test]
    fn empty_store_is_new_player() {
        let (m, store) = fresh(12);
        assert_eq!(m.highest_unlocked_rank(), 1);
        assert!(m.is_fresh());
        assert!(m.is_current(1));
        assert!(!m.is_unlocked(2));
        // Loading alone writes nothing.
        assert!(store.record().is_none());
    }

    #[test]
    fn completing_frontier_advances_by_one() {
        let (mut m, store) = fresh(12);
        m.mark_completed(1).unwrap();
        assert_eq!(m.snapshot(), ProgressRecord { completed_ranks: vec![1], highest_unlocked_rank: 2 });
        assert_eq!(store.record(), Some(m.snapshot()));
        m.mark_completed(1).unwrap();
        assert_eq!(m.snapshot(), ProgressRecord { completed_ranks: vec![1], highest_unlocked_rank: 2 });
    }

    #[test]
    fn completing_off_frontier_keeps_frontier() {
        let (mut m, _) = fresh(12);
        m.mark_completed(1).unwrap();
        m.mark_completed(3).unwrap();
        assert_eq!(m.highest_unlocked_rank(), 2);
        assert!(m.is_completed(3));
        assert_eq!(m.waypoint_status(3), WaypointStatus::Completed);
        assert_eq!(m.waypoint_status(2), WaypointStatus::Current);
        assert_eq!(m.waypoint_status(4), WaypointStatus::Locked);
    }

    #[test]
    fn last_sector_never_pushes_frontier_past_total() {
        let store = MemoryStore::with_record(ProgressRecord {
            completed_ranks: vec![1, 2],
            highest_unlocked_rank: 3,
        });
        let mut m = ProgressionModel::load(3, Box::new(store), false);
        m.mark_completed(3).unwrap();
        assert_eq!(m.highest_unlocked_rank(), 3);
        assert!(m.is_campaign_complete());
        assert!(!m.is_current(3));
    }

    #[test]
    fn select_gate_names_frontier() {
        let (mut m, _) = fresh(12);
        assert_eq!(m.attempt_select(1), Ok(Accepted { rank: 1 }));
        assert_eq!(m.attempt_select(2), Err(CampaignError::Locked { rank: 2, required: 1 }));
        m.mark_completed(1).unwrap();
        assert_eq!(m.attempt_select(2), Ok(Accepted { rank: 2 }));
        assert_eq!(m.attempt_select(5), Err(CampaignError::Locked { rank: 5, required: 2 }));
        assert_eq!(m.attempt_select(13), Err(CampaignError::OutOfRange { rank: 13, total: 12 }));
        assert_eq!(m.attempt_select(0), Err(CampaignError::OutOfRange { rank: 0, total: 12 }));
    }

    #[test]
    fn out_of_range_completion_is_rejected() {
        let (mut m, store) = fresh(4);
        assert_eq!(m.mark_completed(9), Err(CampaignError::OutOfRange { rank: 9, total: 4 }));
        assert!(store.record().is_none());
    }

    #[test]
    fn unlock_all_opens_everything_without_touching_frontier() {
        let store = MemoryStore::default();
        let mut m = ProgressionModel::load(12, Box::new(store), true);
        assert_eq!(m.attempt_select(12), Ok(Accepted { rank: 12 }));
        assert_eq!(m.highest_unlocked_rank(), 1);
        assert_eq!(m.waypoint_status(7), WaypointStatus::Unlocked);
        m.set_unlock_all(false);
        assert!(m.attempt_select(12).is_err());
    }

    #[test]
    fn load_sanitizes_corrupt_records() {
        let store = MemoryStore::with_record(ProgressRecord {
            completed_ranks: vec![0, 2, 40],
            highest_unlocked_rank: 0,
        });
        let m = ProgressionModel::load(5, Box::new(store), false);
        assert_eq!(m.highest_unlocked_rank(), 1);
        assert_eq!(m.completed_ranks().collect::<Vec<_>>(), vec![2]);

        let store = MemoryStore::with_record(ProgressRecord {
            completed_ranks: vec![],
            highest_unlocked_rank: 99,
        });
        let m = ProgressionModel::load(5, Box::new(store), false);
        assert_eq!(m.highest_unlocked_rank(), 5);
    }

    #[test]
    fn unavailable_store_falls_back_and_retries() {
        let fail = Rc::new(RefCell::new(true));
        let inner = MemoryStore::default();
        let store = FlakyStore { fail_saves: fail.clone(), inner: inner.clone() };
        let mut m = ProgressionModel::load(12, Box::new(store), false);
        assert!(m.is_fresh());

        m.mark_completed(1).unwrap();
        assert_eq!(m.highest_unlocked_rank(), 2);
        assert!(!m.is_synced());
        assert!(inner.record().is_none());

        *fail.borrow_mut() = false;
        m.mark_completed(2).unwrap();
        assert!(m.is_synced());
        assert_eq!(
            inner.record(),
            Some(ProgressRecord { completed_ranks: vec![1, 2], highest_unlocked_rank: 3 })
        );
    }

    #[test]
    fn reset_returns_to_new_player() {
        let (mut m, store) = fresh(12);
        m.mark_completed(1).unwrap();
        m.mark_completed(2).unwrap();
        m.reset();
        assert!(m.is_fresh());
        assert_eq!(store.record(), Some(ProgressRecord::default()));
    }
}
