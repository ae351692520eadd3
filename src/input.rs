//! Player input as the game sees it: key presses and taps resolved to
//! action ids through the click targets registered on the last frame.

use ratzilla::ratatui::layout::Rect;

/// A key press or a tap that already hit a registered target.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key(char),
    /// Action id from `takoyaki::actions`.
    Click(u16),
}

/// Tappable cell rectangle and the action it triggers.
#[derive(Debug, Clone)]
pub struct ClickTarget {
    pub rect: Rect,
    pub action_id: u16,
}

impl ClickTarget {
    fn contains(&self, col: u16, row: u16) -> bool {
        let r = &self.rect;
        (r.x..r.x + r.width).contains(&col) && (r.y..r.y + r.height).contains(&row)
    }
}

/// Targets registered by the last render plus the terminal size they were
/// laid out for. Written by `draw_web`, read by the mouse handler.
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            terminal_cols: 0,
            terminal_rows: 0,
        }
    }

    pub fn clear_targets(&mut self) {
        self.targets.clear();
    }

    pub fn add_click_target(&mut self, rect: Rect, action_id: u16) {
        self.targets.push(ClickTarget { rect, action_id });
    }

    /// One-row target spanning `area`. Rows outside `area` are ignored.
    pub fn add_row_target(&mut self, area: Rect, row: u16, action_id: u16) {
        if (area.y..area.y + area.height).contains(&row) {
            self.add_click_target(Rect::new(area.x, row, area.width, 1), action_id);
        }
    }

    /// Action under the cell. The most recently registered target wins, so
    /// the result overlay shadows the plate beneath it.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<u16> {
        self.targets
            .iter()
            .rev()
            .find(|t| t.contains(col, row))
            .map(|t| t.action_id)
    }
}

/// Below this many columns the plate drops to two columns and the log
/// moves under it.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 60
}

/// Map an offset in pixels along one axis of the grid container to a cell
/// index, or `None` when it falls outside the grid.
fn pixel_to_cell(offset: f64, extent: f64, cells: u16) -> Option<u16> {
    if extent <= 0.0 || cells == 0 || offset < 0.0 {
        return None;
    }
    let cell = (offset / (extent / cells as f64)) as u16;
    (cell < cells).then_some(cell)
}

/// Row under a pixel offset from the grid's top edge.
pub fn pixel_y_to_row(click_y: f64, grid_height: f64, terminal_rows: u16) -> Option<u16> {
    pixel_to_cell(click_y, grid_height, terminal_rows)
}

/// Column under a pixel offset from the grid's left edge.
pub fn pixel_x_to_col(click_x: f64, grid_width: f64, terminal_cols: u16) -> Option<u16> {
    pixel_to_cell(click_x, grid_width, terminal_cols)
}
