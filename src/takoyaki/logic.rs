//! Takoyaki Rush game logic — pure functions over [`Session`], fully testable.
//!
//! Every function here treats an ended session as frozen and ignores inputs
//! that are not valid for the current slot status.

use super::state::{Session, SlotId, SlotStatus, Timing};
use crate::time::Millis;

/// A player action on one slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotAction {
    /// Put raw batter into an empty slot.
    Fill,
    /// Take a cooked takoyaki off the plate (+1 good).
    Collect,
    /// Throw away a burnt takoyaki (+1 bad).
    Discard,
}

impl SlotAction {
    pub fn verb(&self) -> &'static str {
        match self {
            SlotAction::Fill => "生地を入れた",
            SlotAction::Collect => "回収した",
            SlotAction::Discard => "捨てた",
        }
    }
}

/// What a countdown tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockTick {
    /// Session already over; nothing changed.
    Ignored,
    /// One second elapsed.
    Counted { time_left: u32 },
    /// The countdown hit zero on this tick.
    Ended,
}

/// Advance the countdown by one tick.
pub fn tick_clock(session: &mut Session) -> ClockTick {
    if session.ended {
        return ClockTick::Ignored;
    }
    session.time_left = session.time_left.saturating_sub(1);
    if session.time_left == 0 {
        session.ended = true;
        ClockTick::Ended
    } else {
        ClockTick::Counted {
            time_left: session.time_left,
        }
    }
}

/// Re-derive every slot's status at `now`. Returns the ids that changed.
///
/// Idempotent: a second call with the same `now` changes nothing.
pub fn tick_slots(session: &mut Session, now: Millis, timing: &Timing) -> Vec<SlotId> {
    if session.ended {
        return Vec::new();
    }
    session
        .slots
        .iter_mut()
        .filter_map(|slot| slot.refresh(now, timing).then_some(slot.id))
        .collect()
}

/// Apply a player action. Returns true if the session changed.
pub fn apply_action(session: &mut Session, id: SlotId, action: SlotAction, now: Millis) -> bool {
    if session.ended {
        return false;
    }
    let Some(slot) = session.slots.get_mut(id) else {
        return false;
    };
    match action {
        SlotAction::Fill => slot.fill(now),
        SlotAction::Collect => {
            let applied = slot.clear_if(SlotStatus::Cooked);
            if applied {
                session.good_count += 1;
            }
            applied
        }
        SlotAction::Discard => {
            let applied = slot.clear_if(SlotStatus::Burnt);
            if applied {
                session.bad_count += 1;
            }
            applied
        }
    }
}

/// The action a plain click on a slot stands for, if any.
///
/// Raw slots are not clickable yet.
pub fn resolve_click(session: &Session, id: SlotId) -> Option<SlotAction> {
    match session.slot(id)?.status() {
        SlotStatus::Empty => Some(SlotAction::Fill),
        SlotStatus::Raw => None,
        SlotStatus::Cooked => Some(SlotAction::Collect),
        SlotStatus::Burnt => Some(SlotAction::Discard),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use proptest::prelude::*;

    fn fresh() -> (Session, Timing) {
        let config = GameConfig::default();
        (Session::new(&config), Timing::from_config(&config))
    }

    fn status(s: &Session, id: SlotId) -> SlotStatus {
        s.slots[id].status()
    }

    #[test]
    fn scenario_cook_then_collect() {
        let (mut s, t) = fresh();
        assert!(apply_action(&mut s, 0, SlotAction::Fill, 0));
        assert_eq!(tick_slots(&mut s, 5_000, &t), vec![0]);
        assert_eq!(status(&s, 0), SlotStatus::Cooked);

        assert!(apply_action(&mut s, 0, SlotAction::Collect, 5_000));
        assert_eq!(s.good_count, 1);
        assert_eq!(status(&s, 0), SlotStatus::Empty);
        assert_eq!(s.slots[0].filled_at(), None);
    }

    #[test]
    fn scenario_burn_then_discard() {
        let (mut s, t) = fresh();
        apply_action(&mut s, 1, SlotAction::Fill, 0);
        tick_slots(&mut s, 7_000, &t);
        assert_eq!(status(&s, 1), SlotStatus::Burnt);

        assert!(apply_action(&mut s, 1, SlotAction::Discard, 7_000));
        assert_eq!(s.bad_count, 1);
        assert_eq!(status(&s, 1), SlotStatus::Empty);
    }

    #[test]
    fn scenario_between_thresholds_is_cooked() {
        let (mut s, t) = fresh();
        apply_action(&mut s, 2, SlotAction::Fill, 0);
        tick_slots(&mut s, 6_000, &t);
        assert_eq!(status(&s, 2), SlotStatus::Cooked);
    }

    #[test]
    fn every_second_tick_walks_raw_cooked_burnt() {
        let (mut s, t) = fresh();
        apply_action(&mut s, 0, SlotAction::Fill, 0);
        let mut seen = Vec::new();
        for sec in 1..=8 {
            tick_slots(&mut s, sec * 1_000, &t);
            seen.push(status(&s, 0));
        }
        use SlotStatus::*;
        assert_eq!(seen, vec![Raw, Raw, Raw, Raw, Cooked, Cooked, Burnt, Burnt]);
    }

    #[test]
    fn burn_checked_before_cook_at_boundary() {
        // A raw slot first observed exactly at cook + burn meets both
        // thresholds; it must burn, not cook.
        let (mut s, t) = fresh();
        apply_action(&mut s, 0, SlotAction::Fill, 0);
        tick_slots(&mut s, 4_000, &t);
        assert_eq!(status(&s, 0), SlotStatus::Raw);
        tick_slots(&mut s, 7_000, &t);
        assert_eq!(status(&s, 0), SlotStatus::Burnt);
    }

    #[test]
    fn cook_threshold_is_inclusive() {
        let (mut s, t) = fresh();
        apply_action(&mut s, 0, SlotAction::Fill, 1_000);
        tick_slots(&mut s, 5_999, &t);
        assert_eq!(status(&s, 0), SlotStatus::Raw);
        tick_slots(&mut s, 6_000, &t);
        assert_eq!(status(&s, 0), SlotStatus::Cooked);
    }

    #[test]
    fn raw_slot_ignores_collect_and_discard() {
        let (mut s, _) = fresh();
        apply_action(&mut s, 0, SlotAction::Fill, 0);
        let before = s.clone();
        assert!(!apply_action(&mut s, 0, SlotAction::Collect, 1_000));
        assert!(!apply_action(&mut s, 0, SlotAction::Discard, 1_000));
        assert!(!apply_action(&mut s, 0, SlotAction::Fill, 1_000));
        assert_eq!(s, before);
    }

    #[test]
    fn collect_on_burnt_is_ignored() {
        let (mut s, t) = fresh();
        apply_action(&mut s, 0, SlotAction::Fill, 0);
        tick_slots(&mut s, 7_000, &t);
        assert!(!apply_action(&mut s, 0, SlotAction::Collect, 7_000));
        assert_eq!(s.good_count, 0);
        assert_eq!(status(&s, 0), SlotStatus::Burnt);
    }

    #[test]
    fn discard_on_cooked_is_ignored() {
        let (mut s, t) = fresh();
        apply_action(&mut s, 0, SlotAction::Fill, 0);
        tick_slots(&mut s, 5_000, &t);
        assert!(!apply_action(&mut s, 0, SlotAction::Discard, 5_000));
        assert_eq!(s.bad_count, 0);
    }

    #[test]
    fn out_of_range_slot_is_ignored() {
        let (mut s, _) = fresh();
        let before = s.clone();
        for action in [SlotAction::Fill, SlotAction::Collect, SlotAction::Discard] {
            assert!(!apply_action(&mut s, 99, action, 0));
        }
        assert_eq!(s, before);
        assert_eq!(resolve_click(&s, 99), None);
    }

    #[test]
    fn countdown_ends_after_full_duration() {
        let (mut s, _) = fresh();
        for _ in 0..59 {
            assert!(matches!(tick_clock(&mut s), ClockTick::Counted { .. }));
        }
        assert_eq!(s.time_left, 1);
        assert_eq!(tick_clock(&mut s), ClockTick::Ended);
        assert!(s.ended);
        assert_eq!(s.time_left, 0);
        assert_eq!(tick_clock(&mut s), ClockTick::Ignored);
        assert_eq!(s.time_left, 0);
    }

    #[test]
    fn ended_session_is_frozen() {
        let (mut s, t) = fresh();
        apply_action(&mut s, 0, SlotAction::Fill, 0);
        s.ended = true;
        let before = s.clone();
        assert!(!apply_action(&mut s, 1, SlotAction::Fill, 0));
        assert!(tick_slots(&mut s, 10_000, &t).is_empty());
        assert_eq!(s, before);
    }

    #[test]
    fn click_resolves_by_status() {
        let (mut s, t) = fresh();
        assert_eq!(resolve_click(&s, 0), Some(SlotAction::Fill));
        apply_action(&mut s, 0, SlotAction::Fill, 0);
        assert_eq!(resolve_click(&s, 0), None);
        tick_slots(&mut s, 5_000, &t);
        assert_eq!(resolve_click(&s, 0), Some(SlotAction::Collect));
        tick_slots(&mut s, 7_000, &t);
        assert_eq!(resolve_click(&s, 0), Some(SlotAction::Discard));
    }

    #[test]
    fn slots_are_independent() {
        let (mut s, t) = fresh();
        apply_action(&mut s, 0, SlotAction::Fill, 0);
        apply_action(&mut s, 1, SlotAction::Fill, 3_000);
        let changed = tick_slots(&mut s, 7_000, &t);
        assert_eq!(changed, vec![0]);
        assert_eq!(status(&s, 0), SlotStatus::Burnt);
        assert_eq!(status(&s, 1), SlotStatus::Raw);
    }

    // ── Property tests ─────────────────────────────────────────

    #[derive(Clone, Debug)]
    enum Step {
        Act(SlotId, SlotAction),
        Slots(Millis),
        Clock,
    }

    fn arb_action() -> impl Strategy<Value = SlotAction> {
        prop_oneof![
            Just(SlotAction::Fill),
            Just(SlotAction::Collect),
            Just(SlotAction::Discard),
        ]
    }

    fn arb_step() -> impl Strategy<Value = Step> {
        prop_oneof![
            (0usize..10, arb_action()).prop_map(|(id, a)| Step::Act(id, a)),
            (0u64..3_000).prop_map(Step::Slots),
            Just(Step::Clock),
        ]
    }

    fn allowed(from: SlotStatus, to: SlotStatus) -> bool {
        use SlotStatus::*;
        from == to
            || matches!(
                (from, to),
                (Empty, Raw) | (Raw, Cooked) | (Raw, Burnt) | (Cooked, Burnt)
                    | (Cooked, Empty) | (Burnt, Empty)
            )
    }

    proptest! {
        #[test]
        fn prop_only_legal_edges_and_monotonic_counters(
            steps in prop::collection::vec(arb_step(), 0..120),
        ) {
            let (mut s, t) = fresh();
            let mut now: Millis = 0;
            for step in steps {
                let before = s.clone();
                match step {
                    Step::Act(id, a) => { apply_action(&mut s, id, a, now); }
                    Step::Slots(dt) => { now += dt; tick_slots(&mut s, now, &t); }
                    Step::Clock => { tick_clock(&mut s); }
                }
                for (b, a) in before.slots.iter().zip(&s.slots) {
                    prop_assert!(allowed(b.status(), a.status()),
                        "illegal {:?} -> {:?}", b.status(), a.status());
                    prop_assert_eq!(a.filled_at().is_some(), a.status() != SlotStatus::Empty);
                }
                prop_assert!(s.good_count >= before.good_count);
                prop_assert!(s.bad_count >= before.bad_count);
                prop_assert!(s.time_left <= before.time_left);
                prop_assert!(!before.ended || s == before);
            }
        }

        #[test]
        fn prop_tick_slots_idempotent(
            fills in prop::collection::vec(0u64..20_000, 8),
            now in 0u64..30_000,
        ) {
            let (mut s, t) = fresh();
            for (id, at) in fills.iter().enumerate() {
                apply_action(&mut s, id, SlotAction::Fill, *at);
            }
            tick_slots(&mut s, now, &t);
            let once = s.clone();
            prop_assert!(tick_slots(&mut s, now, &t).is_empty());
            prop_assert_eq!(s, once);
        }

        #[test]
        fn prop_tick_agrees_with_projection(
            fill_at in 0u64..10_000,
            now in 0u64..30_000,
        ) {
            let (mut s, t) = fresh();
            apply_action(&mut s, 0, SlotAction::Fill, fill_at);
            tick_slots(&mut s, now, &t);
            prop_assert_eq!(
                s.slots[0].status(),
                SlotStatus::project(Some(fill_at), now, &t)
            );
        }
    }
}
