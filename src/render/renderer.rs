use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction as LayoutDirection, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::game::{BonusKind, Direction, GameState, Phase, Position};
use crate::metrics::{GameMetrics, format_time};

/// Terminal columns per grid cell
const CELL_WIDTH: u16 = 2;

/// Display toggles the player can flip at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub show_grid: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { show_grid: true }
    }
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    /// Draw the whole screen. Reads state only.
    pub fn render(
        &self,
        frame: &mut Frame,
        state: &GameState,
        metrics: &GameMetrics,
        options: &RenderOptions,
    ) {
        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(state, metrics), chunks[0]);

        let board_area = Self::board_area(chunks[1], state);
        frame.render_widget(self.render_grid(state, options), board_area);

        match state.phase {
            Phase::NotStarted => self.render_popup(frame, chunks[1], self.start_screen(), Color::Cyan),
            Phase::Paused => self.render_popup(frame, chunks[1], self.pause_screen(), Color::Yellow),
            Phase::GameOver => self.render_popup(
                frame,
                chunks[1],
                self.game_over_screen(state, metrics),
                Color::Red,
            ),
            Phase::Running => {}
        }

        frame.render_widget(self.render_controls(state), chunks[2]);
    }

    /// Center a rect sized to the grid inside `area`, clipped to fit
    fn board_area(area: Rect, state: &GameState) -> Rect {
        let width = u16::try_from(state.grid_width)
            .unwrap_or(u16::MAX)
            .saturating_mul(CELL_WIDTH)
            .saturating_add(2);
        let height = u16::try_from(state.grid_height)
            .unwrap_or(u16::MAX)
            .saturating_add(2);

        let [row] = Layout::vertical([Constraint::Length(height)])
            .flex(Flex::Center)
            .areas(area);
        let [board] = Layout::horizontal([Constraint::Length(width)])
            .flex(Flex::Center)
            .areas(row);
        board
    }

    fn render_grid(&self, state: &GameState, options: &RenderOptions) -> Paragraph<'_> {
        let warped = state.is_time_warped();
        let mut lines = Vec::with_capacity(state.grid_height);

        for y in 0..state.grid_height {
            let mut spans = Vec::with_capacity(state.grid_width);

            for x in 0..state.grid_width {
                let pos = Position::new(x as i32, y as i32);
                spans.push(self.cell(state, pos, options, warped));
            }

            lines.push(Line::from(spans));
        }

        let (border, background) = if warped {
            (Color::Magenta, Color::Rgb(26, 0, 51))
        } else {
            (Color::Cyan, Color::Rgb(10, 10, 30))
        };

        Paragraph::new(lines)
            .style(Style::default().bg(background))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(border))
                    .title(" Cosmic Tracer "),
            )
    }

    fn cell(&self, state: &GameState, pos: Position, options: &RenderOptions, warped: bool) -> Span<'static> {
        let bold = Modifier::BOLD;

        if pos == state.snake.head() {
            let color = if warped { Color::Magenta } else { Color::Cyan };
            return Span::styled(
                head_glyph(state.snake.direction),
                Style::default().fg(color).add_modifier(bold),
            );
        }
        if state.snake.contains(pos) {
            let color = if warped { Color::LightMagenta } else { Color::Green };
            return Span::styled("■ ", Style::default().fg(color));
        }
        if pos == state.food {
            return Span::styled("● ", Style::default().fg(Color::Red).add_modifier(bold));
        }
        if state.bomb_at(pos) {
            return Span::styled("✖ ", Style::default().fg(Color::LightRed).add_modifier(bold));
        }
        if let Some(bonus) = state.bonus_at(pos) {
            let (glyph, color) = bonus_glyph(bonus.kind);
            return Span::styled(glyph, Style::default().fg(color).add_modifier(bold));
        }

        if options.show_grid {
            Span::styled("· ", Style::default().fg(Color::DarkGray))
        } else {
            Span::raw("  ")
        }
    }

    fn render_stats(&self, state: &GameState, metrics: &GameMetrics) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let mut spans = vec![
            Span::styled("Score: ", label),
            Span::styled(state.score.to_string(), value.add_modifier(Modifier::BOLD)),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(metrics.best_score.max(state.score).to_string(), value),
            Span::raw("    "),
            Span::styled("Length: ", label),
            Span::styled(state.snake.len().to_string(), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(format_time(state.elapsed), value),
        ];

        for kind in BonusKind::ALL.into_iter().filter(BonusKind::is_timed) {
            if let Some(left) = state.effects.remaining(kind, state.elapsed) {
                let (_, color) = bonus_glyph(kind);
                spans.push(Span::raw("    "));
                spans.push(Span::styled(
                    format!("{} {}s", kind.name(), left.as_secs() + 1),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ));
            }
        }

        let mut lines = vec![Line::from(spans)];
        if let Some(status) = &metrics.submission_status {
            lines.push(Line::from(Span::styled(
                status.clone(),
                Style::default().fg(Color::Gray),
            )));
        }

        Paragraph::new(lines).alignment(Alignment::Center)
    }

    /// Draw a bordered message box centered over the game area
    fn render_popup(&self, frame: &mut Frame, area: Rect, text: Vec<Line<'static>>, color: Color) {
        let height = text.len() as u16 + 2;
        let width = text.iter().map(Line::width).max().unwrap_or(0) as u16 + 4;

        let [row] = Layout::vertical([Constraint::Length(height)])
            .flex(Flex::Center)
            .areas(area);
        let [popup] = Layout::horizontal([Constraint::Length(width)])
            .flex(Flex::Center)
            .areas(row);

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(text).alignment(Alignment::Center).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(color)),
            ),
            popup,
        );
    }

    fn start_screen(&self) -> Vec<Line<'static>> {
        let hint = Style::default().fg(Color::Cyan);
        vec![
            Line::from(Span::styled(
                "COSMIC TRACER",
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled("Steer with WASD or the arrow keys", hint)),
            Line::from(Span::styled("Eat food to grow and earn points", hint)),
            Line::from(Span::styled("Avoid walls, bombs and your own trail", hint)),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Enter",
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to start", Style::default().fg(Color::Gray)),
            ]),
        ]
    }

    fn pause_screen(&self) -> Vec<Line<'static>> {
        vec![
            Line::from(Span::styled(
                "PAUSED",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Space",
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to resume", Style::default().fg(Color::Gray)),
            ]),
        ]
    }

    fn game_over_screen(&self, state: &GameState, metrics: &GameMetrics) -> Vec<Line<'static>> {
        let reason = state
            .game_over_reason
            .map(|r| r.describe())
            .unwrap_or_default();

        let mut text = vec![
            Line::from(Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(reason, Style::default().fg(Color::Gray))),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    state.score.to_string(),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
            ]),
        ];

        if metrics.new_best {
            text.push(Line::from(Span::styled(
                "New best score!",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )));
        }

        text.push(Line::from(""));
        text.push(Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::Gray)),
            Span::styled(
                "Space",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to play again or ", Style::default().fg(Color::Gray)),
            Span::styled(
                "Q",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to quit", Style::default().fg(Color::Gray)),
        ]));

        text
    }

    fn render_controls(&self, state: &GameState) -> Paragraph<'_> {
        let action = match state.phase {
            Phase::NotStarted => " | Enter to start",
            Phase::Running => " | Space to pause",
            Phase::Paused => " | Space to resume",
            Phase::GameOver => " | Space to restart",
        };

        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move"),
            Span::raw(action),
            Span::raw(" | "),
            Span::styled("G", Style::default().fg(Color::Cyan)),
            Span::raw(" grid | "),
            Span::styled("R", Style::default().fg(Color::Cyan)),
            Span::raw(" reset | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn head_glyph(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "▲ ",
        Direction::Down => "▼ ",
        Direction::Left => "◀ ",
        Direction::Right => "▶ ",
    }
}

fn bonus_glyph(kind: BonusKind) -> (&'static str, Color) {
    match kind {
        BonusKind::TrailReset => ("R ", Color::Yellow),
        BonusKind::Magnet => ("M ", Color::Blue),
        BonusKind::ScoreDoubler => ("2 ", Color::LightGreen),
        BonusKind::TimeWarp => ("T ", Color::Magenta),
    }
}
