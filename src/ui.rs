use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::grid::SLOT_ROWS;
use crate::state::{
    is_fighter, AppState, FocusArea, LayoutMode, Player, LOCKED_SLOT, RANDOM_SLOT, ROSTER,
    SLOT_COUNT,
};

const BG: Color = Color::Rgb(16, 18, 24);
const FG: Color = Color::Rgb(230, 228, 218);
const DIM: Color = Color::Rgb(124, 126, 134);
const FRAME_EDGE: Color = Color::Rgb(72, 76, 88);
const ACCENT: Color = Color::Rgb(233, 199, 104);
const P1_COLOR: Color = Color::Rgb(96, 170, 230);
const P2_COLOR: Color = Color::Rgb(210, 88, 78);
const LOCK_FLASH_COLOR: Color = Color::Rgb(222, 158, 78);

const MIN_GRID_WIDTH: u16 = 27;
const MIN_GRID_HEIGHT: u16 = 15;

/// Screen rectangles for one frame. Rendering and mouse hit-testing both go
/// through this so clicks always agree with what is on screen.
pub struct ScreenLayout {
    pub panels: [Rect; 2],
    pub grid: Rect,
    pub footer: Rect,
    pub sound_toggle: Rect,
    pub slots: [Rect; SLOT_COUNT],
}

impl ScreenLayout {
    pub fn slot_at(&self, x: u16, y: u16) -> Option<usize> {
        let pos = Position::new(x, y);
        (0..SLOT_COUNT).find(|&slot| self.slots[slot].contains(pos))
    }

    pub fn fighter_at(&self, x: u16, y: u16) -> Option<usize> {
        self.slot_at(x, y).filter(|&slot| is_fighter(slot))
    }

    pub fn over_sound_toggle(&self, x: u16, y: u16) -> bool {
        self.sound_toggle.contains(Position::new(x, y))
    }
}

pub fn screen_layout(area: Rect, mode: LayoutMode) -> ScreenLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(3)])
        .split(area);
    let body = chunks[0];
    let footer = chunks[1];

    let (panels, grid) = match mode {
        LayoutMode::Versus => {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(24),
                    Constraint::Min(MIN_GRID_WIDTH),
                    Constraint::Percentage(24),
                ])
                .split(body);
            ([cols[0], cols[2]], cols[1])
        }
        LayoutMode::Single => {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(6), Constraint::Min(MIN_GRID_HEIGHT)])
                .split(body);
            ([rows[0], Rect::default()], rows[1])
        }
    };

    ScreenLayout {
        panels,
        grid,
        footer,
        sound_toggle: Rect::new(footer.x, footer.y, 16.min(footer.width), 1.min(footer.height)),
        slots: slot_areas(grid),
    }
}

/// Place the five uneven rows, each centered, so the 2-wide rows sit between
/// the 3-wide ones like the original's staggered columns.
fn slot_areas(area: Rect) -> [Rect; SLOT_COUNT] {
    let mut slots = [Rect::default(); SLOT_COUNT];
    if area.width < MIN_GRID_WIDTH || area.height < MIN_GRID_HEIGHT {
        return slots;
    }
    let row_count = SLOT_ROWS.len() as u16;
    let cell_h = (area.height / row_count).clamp(3, 5);
    let cell_w = (area.width / 3).clamp(9, 18);
    let y0 = area.y + (area.height - cell_h * row_count) / 2;

    for (row_idx, row) in SLOT_ROWS.iter().enumerate() {
        let row_w = cell_w * row.len() as u16;
        let x0 = area.x + area.width.saturating_sub(row_w) / 2;
        let y = y0 + row_idx as u16 * cell_h;
        for (col, &slot) in row.iter().enumerate() {
            slots[slot] = Rect::new(x0 + col as u16 * cell_w, y, cell_w, cell_h);
        }
    }
    slots
}

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let layout = screen_layout(area, state.layout);

    let backdrop = Block::default().style(Style::default().bg(BG).fg(FG));
    frame.render_widget(backdrop, area);

    render_panel(frame, layout.panels[0], state, Player::One);
    if state.layout == LayoutMode::Versus {
        render_panel(frame, layout.panels[1], state, Player::Two);
    }
    render_grid(frame, &layout, state);
    render_footer(frame, layout.footer, state);
}

fn render_grid(frame: &mut Frame, layout: &ScreenLayout, state: &AppState) {
    let block = Block::default()
        .title(turn_label(state))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(FRAME_EDGE));
    frame.render_widget(block, layout.grid);

    if layout.slots[0].width == 0 {
        let warning = Paragraph::new("Enlarge the terminal to see the roster.")
            .style(Style::default().fg(DIM))
            .alignment(Alignment::Center);
        frame.render_widget(warning, layout.grid);
        return;
    }

    for slot in 0..SLOT_COUNT {
        render_slot(frame, layout.slots[slot], slot, state);
    }
}

fn render_slot(frame: &mut Frame, area: Rect, slot: usize, state: &AppState) {
    let focused = state.focus == FocusArea::Grid && state.focused_slot == Some(slot);
    let highlighted = state.highlighted_slot() == Some(slot);
    let holder = if is_fighter(slot) {
        state.fighter_held_by(slot)
    } else {
        None
    };
    let disabled = state.slot_disabled(slot);

    let mut border_style = Style::default().fg(FRAME_EDGE);
    if let Some(player) = holder {
        border_style = Style::default().fg(player_color(player));
    }
    if highlighted {
        border_style = Style::default().fg(ACCENT).add_modifier(Modifier::BOLD);
    } else if focused {
        border_style = Style::default().fg(FG).add_modifier(Modifier::BOLD);
    }

    let mut label_style = Style::default().fg(FG);
    if disabled && !highlighted {
        label_style = Style::default().fg(DIM);
    }
    if let Some(player) = holder {
        label_style = Style::default()
            .fg(player_color(player))
            .add_modifier(Modifier::BOLD);
    }
    if highlighted {
        label_style = Style::default()
            .fg(ACCENT)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED);
    }

    let label = match slot {
        LOCKED_SLOT => {
            if state.lock_flash {
                label_style = Style::default()
                    .fg(LOCK_FLASH_COLOR)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED);
            } else {
                label_style = Style::default().fg(DIM);
            }
            Line::from("× locked")
        }
        RANDOM_SLOT => Line::from("? random"),
        _ => {
            let mut spans = vec![Span::raw(ROSTER[slot])];
            if let Some(player) = holder {
                spans.push(Span::raw(" "));
                spans.push(Span::styled(
                    player.label(),
                    Style::default().add_modifier(Modifier::REVERSED),
                ));
            }
            Line::from(spans)
        }
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let cell = Paragraph::new(label)
        .style(label_style)
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(cell, area);
}

fn render_panel(frame: &mut Frame, area: Rect, state: &AppState, player: Player) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let title = match state.layout {
        LayoutMode::Single => " fighter ".to_string(),
        LayoutMode::Versus => format!(" {} ", player.label()),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(player_color(player)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    match panel_character(state, player) {
        Some((fighter, true)) => {
            lines.push(Line::from(Span::styled(
                ROSTER[fighter].to_string(),
                Style::default().fg(DIM).add_modifier(Modifier::ITALIC),
            )));
            lines.push(Line::from(Span::styled(
                "previewing",
                Style::default().fg(DIM),
            )));
        }
        Some((fighter, false)) => {
            lines.push(Line::from(Span::styled(
                ROSTER[fighter].to_uppercase(),
                Style::default()
                    .fg(player_color(player))
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled("ready", Style::default().fg(FG))));
            if state.undo_available(player) {
                let key = match player {
                    Player::One => "1",
                    Player::Two => "2",
                };
                lines.push(Line::from(Span::styled(
                    format!("[{}] undo", key),
                    Style::default().fg(DIM),
                )));
            }
        }
        None => {
            lines.push(Line::from(Span::styled(
                "waiting...",
                Style::default().fg(DIM),
            )));
        }
    }

    let body = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(body, inner);
}

/// What a panel shows: the committed fighter, or the live preview when this
/// panel is the one the next commit would fill.
fn panel_character(state: &AppState, player: Player) -> Option<(usize, bool)> {
    if let Some(pick) = state.pick(player) {
        return Some((pick, false));
    }
    let previews = match (state.layout, player) {
        (LayoutMode::Single, Player::One) => true,
        (LayoutMode::Single, Player::Two) => false,
        (LayoutMode::Versus, Player::One) => true,
        (LayoutMode::Versus, Player::Two) => state.pick(Player::One).is_some(),
    };
    if previews {
        state.preview.map(|fighter| (fighter, true))
    } else {
        None
    }
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut sound_style = Style::default().fg(FG);
    if state.focus == FocusArea::Footer {
        sound_style = Style::default().fg(ACCENT).add_modifier(Modifier::REVERSED);
    }
    let sound_label = format!("[m] sound: {}", if state.muted { "off" } else { "on " });

    let mut first = vec![Span::styled(sound_label, sound_style)];
    if let Some(message) = &state.message {
        first.push(Span::raw("  "));
        first.push(Span::styled(message.clone(), Style::default().fg(ACCENT)));
    }

    let lines = vec![
        Line::from(first),
        Line::from(Span::styled(
            "arrows move  enter select  r random  backspace undo  1/2 undo player  tab focus  q quit",
            Style::default().fg(DIM),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Left), area);
}

fn turn_label(state: &AppState) -> String {
    if !state.random_queue.is_empty() {
        return " randomizing... ".to_string();
    }
    match state.layout {
        LayoutMode::Single => " pick your fighter ".to_string(),
        LayoutMode::Versus => {
            if state.select_disabled() {
                " both sides ready ".to_string()
            } else {
                format!(" {} picks ", state.next_player().label())
            }
        }
    }
}

fn player_color(player: Player) -> Color {
    match player {
        Player::One => P1_COLOR,
        Player::Two => P2_COLOR,
    }
}
