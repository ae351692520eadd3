mod config;
mod input;
mod logging;
mod takoyaki;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use config::GameConfig;
use input::{pixel_x_to_col, pixel_y_to_row, ClickState, InputEvent};
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use takoyaki::actions::DISMISS_RESULT;
use takoyaki::TakoyakiGame;
use time::PerformanceClock;
use tracing::{debug, warn};

/// Query the grid container's bounding rect and convert pixel coordinates to a cell.
fn dom_pixel_to_cell(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<(u16, u16)> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let click_x = mouse_x as f64 - rect.left();
    let click_y = mouse_y as f64 - rect.top();

    let col = pixel_x_to_col(click_x, rect.width(), cs.terminal_cols)?;
    let row = pixel_y_to_row(click_y, rect.height(), cs.terminal_rows)?;
    Some((col, row))
}

fn load_config() -> GameConfig {
    #[cfg(target_arch = "wasm32")]
    {
        config::load_from_query()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        GameConfig::default()
    }
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();
    logging::init();

    let game = match TakoyakiGame::new(load_config(), Box::new(PerformanceClock::new())) {
        Ok(game) => game,
        Err(e) => {
            warn!(error = %e, "invalid config, using defaults");
            TakoyakiGame::new(GameConfig::default(), Box::new(PerformanceClock::new()))
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?
        }
    };

    let state = Rc::new(RefCell::new(game));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    // Mouse/touch click handler
    terminal.on_mouse_event({
        let state = state.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let cs = click_state.borrow();
            if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                return;
            }

            let Some((col, row)) = dom_pixel_to_cell(mouse_event.x, mouse_event.y, &cs) else {
                return;
            };
            let hit = cs.hit_test(col, row);
            drop(cs);

            debug!(col, row, ?hit, "tap");
            if let Some(action_id) = hit {
                state
                    .borrow_mut()
                    .handle_input(&InputEvent::Click(action_id));
            }
        }
    });

    // Keyboard handler
    terminal.on_key_event({
        let state = state.clone();
        move |key_event| {
            let event = match key_event.code {
                KeyCode::Char(c) => InputEvent::Key(c),
                KeyCode::Esc => InputEvent::Click(DISMISS_RESULT),
                _ => return,
            };
            state.borrow_mut().handle_input(&event);
        }
    });

    terminal.draw_web({
        let click_state = click_state.clone();
        move |f| {
            // Timers are polled once per frame, before drawing.
            state.borrow_mut().tick();

            let gs = state.borrow();
            let size = f.area();

            {
                let mut cs = click_state.borrow_mut();
                cs.terminal_cols = size.width;
                cs.terminal_rows = size.height;
                cs.clear_targets();
            }

            gs.render(f, size, &click_state);
        }
    });

    Ok(())
}
