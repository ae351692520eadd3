//! Takoyaki Rush — fill the plate, collect before it burns, beat the clock.

pub mod actions;
pub mod logic;
pub mod render;
pub mod session;
pub mod state;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;
use tachyonfx::{fx, Effect, Interpolation};

use crate::config::{ConfigError, GameConfig};
use crate::input::{ClickState, InputEvent};
use crate::time::{Clock, Millis};

use actions::*;
use logic::SlotAction;
use session::{SessionController, SessionEvent};
use state::{Outcome, Session, SlotStatus};

/// Log entry shown in the side panel.
#[derive(Clone, Debug)]
pub struct LogEntry {
    pub text: String,
    pub is_important: bool,
}

/// Presentation-only state, updated by a session listener.
pub struct UiState {
    pub log: Vec<LogEntry>,
    /// Result overlay visible. Dismissing it leaves the session ended.
    pub show_result: bool,
    /// Entrance effect for the result overlay.
    pub overlay_fx: Option<Effect>,
    /// Clock reading at the previous render, for effect timing.
    pub last_render_ms: Option<Millis>,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            log: vec![LogEntry {
                text: "たこ焼きラッシュへようこそ！".into(),
                is_important: true,
            }],
            show_result: false,
            overlay_fx: None,
            last_render_ms: None,
        }
    }

    pub fn add_log(&mut self, text: &str, is_important: bool) {
        self.log.push(LogEntry {
            text: text.to_string(),
            is_important,
        });
        if self.log.len() > 50 {
            self.log.remove(0);
        }
    }

    fn on_event(&mut self, session: &Session, event: &SessionEvent) {
        match event {
            SessionEvent::Action { slot, action } => {
                let important = *action == SlotAction::Collect;
                let text = match action {
                    SlotAction::Collect => format!("#{} {} (+1)", slot + 1, action.verb()),
                    _ => format!("#{} {}", slot + 1, action.verb()),
                };
                self.add_log(&text, important);
            }
            SessionEvent::SlotsChanged { slots } => {
                for &id in slots {
                    if session.slots[id].status() == SlotStatus::Burnt {
                        self.add_log(&format!("#{} が焦げた！", id + 1), true);
                    }
                }
            }
            SessionEvent::Countdown { time_left: 10 } => {
                self.add_log("残り10秒！", true);
            }
            SessionEvent::Countdown { .. } => {}
            SessionEvent::Ended { outcome } => {
                let text = match outcome {
                    Outcome::Win => "★ チャレンジ成功！ ★",
                    Outcome::Lose => "タイムアップ… チャレンジ失敗",
                };
                self.add_log(text, true);
                self.show_result = true;
                self.overlay_fx = Some(fx::coalesce((400, Interpolation::QuadOut)));
            }
            SessionEvent::Restarted => {
                self.show_result = false;
                self.overlay_fx = None;
                self.add_log("もう一度スタート！", true);
            }
        }
    }
}

pub struct TakoyakiGame {
    pub controller: SessionController,
    pub ui: Rc<RefCell<UiState>>,
}

impl TakoyakiGame {
    pub fn new(config: GameConfig, clock: Box<dyn Clock>) -> Result<Self, ConfigError> {
        let mut controller = SessionController::new(config, clock)?;
        let ui = Rc::new(RefCell::new(UiState::new()));
        let sink = ui.clone();
        controller.subscribe(move |session, event| sink.borrow_mut().on_event(session, event));
        Ok(Self { controller, ui })
    }

    /// Handle an input event. Returns true if the event was consumed.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Key(c) => self.handle_key(*c),
            InputEvent::Click(id) => self.handle_click(*id),
        }
    }

    fn handle_key(&mut self, key: char) -> bool {
        match key {
            '1'..='9' => {
                let id = key as usize - '1' as usize;
                self.controller.click(id)
            }
            'r' | 'R' => self.handle_click(RESTART),
            'h' | 'H' => self.handle_click(DISMISS_RESULT),
            _ => false,
        }
    }

    fn handle_click(&mut self, action_id: u16) -> bool {
        match action_id {
            RESTART => {
                self.controller.restart();
                true
            }
            DISMISS_RESULT => {
                let mut ui = self.ui.borrow_mut();
                let was_shown = ui.show_result;
                ui.show_result = false;
                ui.overlay_fx = None;
                was_shown
            }
            id if (SLOT_BASE..SLOT_BASE + SLOT_LIMIT).contains(&id) => {
                self.controller.click((id - SLOT_BASE) as usize)
            }
            _ => false,
        }
    }

    /// Run every timer firing due now. Returns how many were applied.
    pub fn tick(&mut self) -> usize {
        self.controller.pump()
    }

    pub fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(self, f, area, click_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualClock;

    fn game() -> (TakoyakiGame, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::at(0));
        let g = TakoyakiGame::new(GameConfig::default(), Box::new(clock.clone())).unwrap();
        (g, clock)
    }

    fn run_secs(g: &mut TakoyakiGame, clock: &ManualClock, secs: u32) {
        for _ in 0..secs {
            clock.advance(1_000);
            g.tick();
        }
    }

    #[test]
    fn number_keys_click_slots() {
        let (mut g, clock) = game();
        assert!(g.handle_input(&InputEvent::Key('1')));
        assert_eq!(g.controller.state().slots[0].status(), SlotStatus::Raw);
        // raw slot: a second press is ignored
        assert!(!g.handle_input(&InputEvent::Key('1')));

        run_secs(&mut g, &clock, 5);
        assert!(g.handle_input(&InputEvent::Key('1')));
        assert_eq!(g.controller.state().good_count, 1);
    }

    #[test]
    fn key_beyond_slot_count_ignored() {
        let (mut g, _clock) = game();
        assert!(!g.handle_input(&InputEvent::Key('9')));
        assert!(!g.handle_input(&InputEvent::Key('x')));
    }

    #[test]
    fn click_targets_dispatch_to_slots() {
        let (mut g, _clock) = game();
        assert!(g.handle_input(&InputEvent::Click(SLOT_BASE + 7)));
        assert_eq!(g.controller.state().slots[7].status(), SlotStatus::Raw);
        assert!(!g.handle_input(&InputEvent::Click(SLOT_BASE + 50)));
    }

    #[test]
    fn end_shows_result_and_dismiss_keeps_session_frozen() {
        let (mut g, clock) = game();
        run_secs(&mut g, &clock, 60);
        assert!(g.ui.borrow().show_result);
        assert!(g.ui.borrow().overlay_fx.is_some());

        assert!(g.handle_input(&InputEvent::Click(DISMISS_RESULT)));
        assert!(!g.ui.borrow().show_result);
        assert!(g.controller.state().ended);
        // slots stay locked after dismissing
        assert!(!g.handle_input(&InputEvent::Key('1')));
        // nothing left to dismiss
        assert!(!g.handle_input(&InputEvent::Key('h')));
    }

    #[test]
    fn restart_key_hides_result() {
        let (mut g, clock) = game();
        run_secs(&mut g, &clock, 60);
        assert!(g.handle_input(&InputEvent::Key('r')));
        assert!(!g.ui.borrow().show_result);
        assert!(!g.controller.state().ended);
        assert_eq!(g.controller.state().time_left, 60);
    }

    #[test]
    fn burnt_slots_are_logged() {
        let (mut g, clock) = game();
        g.handle_input(&InputEvent::Key('2'));
        run_secs(&mut g, &clock, 7);
        let ui = g.ui.borrow();
        assert!(ui.log.iter().any(|e| e.text == "#2 が焦げた！" && e.is_important));
    }

    #[test]
    fn log_truncation() {
        let mut ui = UiState::new();
        for i in 0..60 {
            ui.add_log(&format!("msg {}", i), false);
        }
        assert!(ui.log.len() <= 50);
        assert_eq!(ui.log.last().map(|e| e.text.as_str()), Some("msg 59"));
    }
}
