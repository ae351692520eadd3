//! Takoyaki Rush state definitions.

use crate::config::GameConfig;
use crate::time::Millis;

/// Index of a slot on the plate (0..slot_count).
pub type SlotId = usize;

/// Cooking status of a single slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotStatus {
    Empty,
    Raw,
    Cooked,
    Burnt,
}

impl SlotStatus {
    /// Pure projection of a fill time onto a status.
    ///
    /// Burn is checked first: at `elapsed >= cook + burn` both thresholds are
    /// met and the slot is burnt.
    pub fn project(filled_at: Option<Millis>, now: Millis, timing: &Timing) -> SlotStatus {
        let Some(filled_at) = filled_at else {
            return SlotStatus::Empty;
        };
        let elapsed = now.saturating_sub(filled_at);
        if elapsed >= timing.burn_at_ms {
            SlotStatus::Burnt
        } else if elapsed >= timing.cook_time_ms {
            SlotStatus::Cooked
        } else {
            SlotStatus::Raw
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SlotStatus::Empty => "空き",
            SlotStatus::Raw => "生",
            SlotStatus::Cooked => "焼けた",
            SlotStatus::Burnt => "焦げ",
        }
    }
}

/// Cook and burn thresholds, measured from the fill time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timing {
    pub cook_time_ms: Millis,
    pub burn_at_ms: Millis,
}

impl Timing {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            cook_time_ms: config.cook_time_ms,
            burn_at_ms: config.burn_at_ms(),
        }
    }
}

/// One cooking position.
///
/// `filled_at` is authoritative. `status` is a cache refreshed on every slot
/// tick and only otherwise changed by fill / clear.
#[derive(Clone, Debug, PartialEq)]
pub struct Slot {
    pub id: SlotId,
    status: SlotStatus,
    filled_at: Option<Millis>,
}

impl Slot {
    pub fn new(id: SlotId) -> Self {
        Self {
            id,
            status: SlotStatus::Empty,
            filled_at: None,
        }
    }

    pub fn status(&self) -> SlotStatus {
        self.status
    }

    pub fn filled_at(&self) -> Option<Millis> {
        self.filled_at
    }

    /// Empty → Raw. Returns false if the slot was not empty.
    pub(super) fn fill(&mut self, now: Millis) -> bool {
        if self.status != SlotStatus::Empty {
            return false;
        }
        self.status = SlotStatus::Raw;
        self.filled_at = Some(now);
        true
    }

    /// Cooked/Burnt → Empty when the status matches `expected`.
    pub(super) fn clear_if(&mut self, expected: SlotStatus) -> bool {
        if self.status != expected || expected == SlotStatus::Empty {
            return false;
        }
        self.status = SlotStatus::Empty;
        self.filled_at = None;
        true
    }

    /// Re-derive the cached status from `filled_at`. Only Raw and Cooked
    /// slots move; a cooked slot never goes back to raw. Returns true if the
    /// status changed.
    pub(super) fn refresh(&mut self, now: Millis, timing: &Timing) -> bool {
        if !matches!(self.status, SlotStatus::Raw | SlotStatus::Cooked) {
            return false;
        }
        let next = match SlotStatus::project(self.filled_at, now, timing) {
            // Never back to raw, never out of the plate without an action.
            SlotStatus::Raw | SlotStatus::Empty => self.status,
            projected => projected,
        };
        let changed = next != self.status;
        self.status = next;
        changed
    }
}

/// Result of a finished (or in-progress) session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Lose,
}

/// One play-through, from a full countdown to zero.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub slots: Vec<Slot>,
    pub good_count: u32,
    pub bad_count: u32,
    pub time_left: u32,
    pub ended: bool,
}

impl Session {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            slots: (0..config.slot_count).map(Slot::new).collect(),
            good_count: 0,
            bad_count: 0,
            time_left: config.countdown_secs,
            ended: false,
        }
    }

    pub fn slot(&self, id: SlotId) -> Option<&Slot> {
        self.slots.get(id)
    }

    /// Number of slots currently holding takoyaki in the given status.
    #[cfg(test)]
    pub fn count(&self, status: SlotStatus) -> usize {
        self.slots.iter().filter(|s| s.status() == status).count()
    }

    pub fn is_win(&self, win_threshold: u32) -> bool {
        self.good_count >= win_threshold
    }

    pub fn outcome(&self, win_threshold: u32) -> Outcome {
        if self.is_win(win_threshold) {
            Outcome::Win
        } else {
            Outcome::Lose
        }
    }
}
