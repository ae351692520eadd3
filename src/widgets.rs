//! Widgets shared by the game screens.

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::text::Line;

use crate::input::ClickState;

/// Lines for a `Paragraph`, some of which are buttons. Each button row is
/// found from its line index at registration time, so text and tap target
/// stay on the same row.
///
/// ```ignore
/// let mut cl = ClickableList::new();
/// cl.push(Line::from("チャレンジ成功！"));
/// cl.push_clickable(Line::from(" [R] もう一度"), RESTART);
/// cl.register_targets(area, &mut cs, 1, 1, 0);
/// f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
/// ```
pub struct ClickableList<'a> {
    lines: Vec<Line<'a>>,
    /// `(index into lines, action id)`, in line order.
    actions: Vec<(u16, u16)>,
}

impl<'a> ClickableList<'a> {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn push(&mut self, line: Line<'a>) {
        self.lines.push(line);
    }

    /// Button line for `action_id`.
    pub fn push_clickable(&mut self, line: Line<'a>, action_id: u16) {
        let idx = self.lines.len() as u16;
        self.actions.push((idx, action_id));
        self.lines.push(line);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn into_lines(self) -> Vec<Line<'a>> {
        self.lines
    }

    /// Add a row target for every button line that fits inside `area`.
    /// `top_offset` and `bottom_offset` are the border rows; `inner_width`
    /// is the wrap width, or 0 for a paragraph that does not wrap.
    pub fn register_targets(
        &self,
        area: Rect,
        cs: &mut ClickState,
        top_offset: u16,
        bottom_offset: u16,
        inner_width: u16,
    ) {
        let content_y = area.y + top_offset;
        let content_end = area.y + area.height.saturating_sub(bottom_offset);

        let mut visual_row: u16 = 0;
        let mut next_action = self.actions.iter().peekable();
        for (idx, line) in self.lines.iter().enumerate() {
            let height = if inner_width == 0 {
                1
            } else {
                let w = inner_width as usize;
                let lw = line.width();
                if lw <= w { 1 } else { lw.div_ceil(w) as u16 }
            };
            if let Some(&&(line_idx, action_id)) = next_action.peek() {
                if line_idx as usize == idx {
                    next_action.next();
                    // every visual row of a wrapped line is clickable
                    for r in 0..height {
                        let row = content_y + visual_row + r;
                        if row >= content_end {
                            break;
                        }
                        cs.add_row_target(area, row, action_id);
                    }
                }
            }
            visual_row += height;
        }
    }
}
