//! Takoyaki Rush rendering.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratzilla::ratatui::Frame;
use tachyonfx::Duration;

use crate::config::GameConfig;
use crate::input::{is_narrow_layout, ClickState};
use crate::time::Millis;
use crate::widgets::ClickableList;

use super::actions::*;
use super::state::{Outcome, Session, Slot, SlotStatus};
use super::{TakoyakiGame, UiState};

pub fn render(
    game: &TakoyakiGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let session = game.controller.state();
    let config = game.controller.config();
    let now = game.controller.now();
    let is_narrow = is_narrow_layout(area.width);

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(area);

    let mut ui = game.ui.borrow_mut();

    render_header(session, config, f, main_chunks[0]);

    let cols = plate_columns(is_narrow);
    if is_narrow {
        let rows = plate_rows(session.slots.len(), cols);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(rows.saturating_mul(5).saturating_add(2)),
                Constraint::Min(3),
            ])
            .split(main_chunks[1]);
        render_plate(session, config, now, cols, f, chunks[0], click_state);
        render_log(&ui, f, chunks[1]);
    } else {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(main_chunks[1]);
        render_plate(session, config, now, cols, f, chunks[0], click_state);
        render_log(&ui, f, chunks[1]);
    }

    render_help(session, f, main_chunks[2], click_state);

    let delta = ui.last_render_ms.map_or(0, |prev| now.saturating_sub(prev));
    ui.last_render_ms = Some(now);
    if ui.show_result {
        render_result(session, config, &mut ui, delta, f, main_chunks[1], click_state);
    }
}

fn plate_columns(is_narrow: bool) -> usize {
    if is_narrow {
        2
    } else {
        4
    }
}

fn plate_rows(slot_count: usize, cols: usize) -> u16 {
    u16::try_from(slot_count.div_ceil(cols)).unwrap_or(u16::MAX)
}

/// Help line text. Number keys only reach the first nine slots.
fn help_label(ended: bool, slot_count: usize) -> String {
    if ended {
        return " [R] もう一度プレイ".to_string();
    }
    let keys = slot_count.min(9);
    let mut label = format!(" [R] 最初から   1-{}キー / タップで焼く・回収", keys);
    if slot_count > 9 {
        label.push_str(" (#10以降はタップ)");
    }
    label
}

fn render_header(session: &Session, config: &GameConfig, f: &mut Frame, area: Rect) {
    let time_style = if session.ended {
        Style::default().fg(Color::DarkGray)
    } else if session.time_left <= 10 {
        Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    };

    let spans = vec![
        Span::styled(format!("⏱ {}s", session.time_left), time_style),
        Span::raw("   "),
        Span::styled(
            format!("良 {}", session.good_count),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled(
            format!("焦げ {}", session.bad_count),
            Style::default().fg(Color::Gray),
        ),
        Span::raw("   "),
        Span::styled(
            format!("目標 {}", config.win_threshold),
            Style::default().fg(Color::Cyan),
        ),
    ];

    let widget = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" たこ焼きラッシュ "),
        )
        .alignment(Alignment::Center);
    f.render_widget(widget, area);
}

fn render_plate(
    session: &Session,
    config: &GameConfig,
    now: Millis,
    cols: usize,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" 鉄板 ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = plate_rows(session.slots.len(), cols).max(1);
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows as u32); rows as usize])
        .split(inner);

    let mut cs = click_state.borrow_mut();
    for (r, chunk) in session.slots.chunks(cols).enumerate() {
        let Some(&row_area) = row_areas.get(r) else {
            break;
        };
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, cols as u32); cols])
            .split(row_area);
        for (slot, &cell) in chunk.iter().zip(cells.iter()) {
            render_slot(slot, config, now, session.ended, f, cell);
            if !session.ended && (slot.id as u16) < SLOT_LIMIT {
                cs.add_click_target(cell, SLOT_BASE + slot.id as u16);
            }
        }
    }
}

fn status_color(status: SlotStatus) -> Color {
    match status {
        SlotStatus::Empty => Color::DarkGray,
        SlotStatus::Raw => Color::LightYellow,
        SlotStatus::Cooked => Color::Yellow,
        SlotStatus::Burnt => Color::Red,
    }
}

/// Whole seconds until `deadline_ms` after the fill, rounded up.
fn secs_until(slot: &Slot, deadline_ms: Millis, now: Millis) -> u64 {
    let elapsed = slot.filled_at().map_or(0, |at| now.saturating_sub(at));
    deadline_ms.saturating_sub(elapsed).div_ceil(1_000)
}

fn slot_lines(slot: &Slot, config: &GameConfig, now: Millis) -> Vec<Line<'static>> {
    let color = status_color(slot.status());
    match slot.status() {
        SlotStatus::Empty => vec![
            Line::from(Span::styled("＋", Style::default().fg(color))),
            Line::from(Span::styled(slot.status().label(), Style::default().fg(color))),
        ],
        SlotStatus::Raw => vec![
            Line::from(Span::styled("◎", Style::default().fg(color))),
            Line::from(Span::styled(
                format!("あと{}s", secs_until(slot, config.cook_time_ms, now)),
                Style::default().fg(color),
            )),
        ],
        SlotStatus::Cooked => vec![
            Line::from(Span::styled(
                "●",
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!(
                    "{} {}s",
                    slot.status().label(),
                    secs_until(slot, config.burn_at_ms(), now)
                ),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
        ],
        SlotStatus::Burnt => vec![
            Line::from(Span::styled("✖", Style::default().fg(color))),
            Line::from(Span::styled(slot.status().label(), Style::default().fg(color))),
        ],
    }
}

fn render_slot(
    slot: &Slot,
    config: &GameConfig,
    now: Millis,
    ended: bool,
    f: &mut Frame,
    area: Rect,
) {
    let border = if ended {
        Color::DarkGray
    } else {
        status_color(slot.status())
    };
    let widget = Paragraph::new(slot_lines(slot, config, now))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(format!(" {} ", slot.id + 1)),
        )
        .alignment(Alignment::Center);
    f.render_widget(widget, area);
}

fn render_log(ui: &UiState, f: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue))
        .title(" ログ ");
    let inner = block.inner(area);

    let lines: Vec<Line> = ui
        .log
        .iter()
        .map(|entry| {
            let style = if entry.is_important {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(entry.text.as_str(), style))
        })
        .collect();

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    // keep the newest entries in view
    let total = paragraph.line_count(inner.width) as u16;
    let scroll = total.saturating_sub(inner.height);
    f.render_widget(paragraph.block(block).scroll((scroll, 0)), area);
}

fn render_help(
    session: &Session,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let label = help_label(session.ended, session.slots.len());
    let mut cl = ClickableList::new();
    cl.push_clickable(
        Line::from(Span::styled(label, Style::default().fg(Color::DarkGray))),
        RESTART,
    );

    {
        let mut cs = click_state.borrow_mut();
        cl.register_targets(area, &mut cs, 1, 1, 0);
    }

    let widget = Paragraph::new(cl.into_lines())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .alignment(Alignment::Center);
    f.render_widget(widget, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

fn render_result(
    session: &Session,
    config: &GameConfig,
    ui: &mut UiState,
    delta_ms: Millis,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let outcome = session.outcome(config.win_threshold);
    let (title, color) = match outcome {
        Outcome::Win => ("★ チャレンジ成功！ ★", Color::Yellow),
        Outcome::Lose => ("チャレンジ失敗…", Color::LightBlue),
    };

    let mut cl = ClickableList::new();
    cl.push(Line::from(Span::styled(
        title,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )));
    cl.push(Line::from(""));
    cl.push(Line::from(format!(
        "良 {}  /  焦げ {}",
        session.good_count, session.bad_count
    )));
    cl.push(Line::from(Span::styled(
        format!("目標 {}", config.win_threshold),
        Style::default().fg(Color::DarkGray),
    )));
    cl.push(Line::from(""));
    cl.push_clickable(
        Line::from(Span::styled(
            "[R] もう一度",
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )),
        RESTART,
    );
    cl.push_clickable(
        Line::from(Span::styled("[H] 戻る", Style::default().fg(Color::Gray))),
        DISMISS_RESULT,
    );

    let height = cl.len() as u16 + 2;
    let overlay = centered(area, 36, height);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(" 結果 ");
    let inner_width = block.inner(overlay).width;

    {
        let mut cs = click_state.borrow_mut();
        cl.register_targets(overlay, &mut cs, 1, 1, inner_width);
    }

    f.render_widget(Clear, overlay);
    let widget = Paragraph::new(cl.into_lines())
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    f.render_widget(widget, overlay);

    if let Some(effect) = ui.overlay_fx.as_mut() {
        let ms = delta_ms.min(u32::MAX as Millis) as u32;
        effect.process(Duration::from_millis(ms), f.buffer_mut(), overlay);
        if effect.done() {
            ui.overlay_fx = None;
        }
    }
}
