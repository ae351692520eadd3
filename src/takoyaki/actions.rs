//! Semantic action IDs for Takoyaki Rush click targets.
//!
//! Registered during render and dispatched via `InputEvent::Click`.

// ── Slots (base + slot index) ───────────────────────────────────
pub const SLOT_BASE: u16 = 0;
/// Upper bound on the number of addressable slots.
pub const SLOT_LIMIT: u16 = 100;

// ── Session ─────────────────────────────────────────────────────
pub const RESTART: u16 = 100;
pub const DISMISS_RESULT: u16 = 101;
