use std::io::{self, Stdout};
use std::time::Instant;

use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{cursor, execute};
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Row, Table};

use crate::card::Card;
use crate::engine::{Engine, GridSelection, Screen};
use crate::grid::{CardSize, GridDimension};
use crate::player::{GameMode, Player};
use crate::scores::{HighScoreRecord, ScoreBook, format_time};

const P1_COLOR: Color = Color::Rgb(0, 255, 0);
const P2_COLOR: Color = Color::Rgb(135, 206, 235);
const AI_COLOR: Color = Color::Rgb(255, 107, 107);
const INFO_COLOR: Color = Color::Rgb(135, 206, 235);
const WARN_COLOR: Color = Color::Rgb(255, 165, 0);
const GOLD_COLOR: Color = Color::Rgb(255, 215, 0);
const DIM_COLOR: Color = Color::Rgb(102, 102, 102);

/// How the last game ended, as far as records go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub time_ms: u64,
    pub eligible: bool,
    pub new_record: bool,
    pub best_ms: Option<u64>,
}

/// Everything a frame shows. Borrowed from the game loop, never mutated.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    pub engine: &'a Engine,
    pub now: Instant,
    pub scores: &'a ScoreBook,
    pub outcome: Option<&'a Outcome>,
    /// Text typed so far while a name prompt is open.
    pub name_prompt: Option<&'a str>,
    pub notice: Option<&'a str>,
    /// Online records for the table shown on the leaderboard screen.
    pub online: Option<&'a [HighScoreRecord]>,
}

/// Abstracts the drawing layer so the game loop can run headless in tests.
pub trait Renderer {
    fn render(&mut self, view: &View<'_>) -> io::Result<()>;
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn render(&mut self, view: &View<'_>) -> io::Result<()> {
        (**self).render(view)
    }
}

// ---------------------------------------------------------------------------
// TUI Renderer
// ---------------------------------------------------------------------------

/// Full-screen ratatui renderer on crossterm.
pub struct TuiRenderer {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TuiRenderer {
    pub fn new() -> io::Result<Self> {
        Ok(TuiRenderer {
            terminal: Terminal::new(CrosstermBackend::new(io::stdout()))?,
        })
    }

    pub fn enter(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        execute!(self.terminal.backend_mut(), EnterAlternateScreen, cursor::Hide)?;
        self.terminal.clear()
    }

    pub fn exit(&mut self) -> io::Result<()> {
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)?;
        disable_raw_mode()
    }
}

impl Renderer for TuiRenderer {
    fn render(&mut self, view: &View<'_>) -> io::Result<()> {
        self.terminal.draw(|frame| draw(frame, view))?;
        Ok(())
    }
}

fn draw(frame: &mut Frame, view: &View<'_>) {
    let outer = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::new().fg(DIM_COLOR))
        .title(Line::from(" tMemory ").centered());
    let area = outer.inner(frame.area());
    frame.render_widget(outer, frame.area());

    match view.engine.screen() {
        Screen::Welcome => draw_welcome(frame, area, view),
        Screen::Playing => draw_playing(frame, area, view),
        Screen::GameOver => draw_game_over(frame, area, view),
        Screen::Leaderboard => draw_leaderboard(frame, area, view),
    }
}

fn player_color(player: Player) -> Color {
    match player {
        Player::P1 => P1_COLOR,
        Player::P2 => P2_COLOR,
        Player::Ai => AI_COLOR,
    }
}

fn key_hint(key: &'static str, text: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(key, Style::new().add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(text, Style::new().fg(DIM_COLOR)),
    ])
}

fn notice_line(view: &View<'_>) -> Option<Line<'static>> {
    view.notice
        .map(|n| Line::styled(n.to_string(), Style::new().fg(DIM_COLOR)))
}

// ---- Welcome ---------------------------------------------------------------

fn draw_welcome(frame: &mut Frame, area: Rect, view: &View<'_>) {
    let engine = view.engine;
    let grid = engine.grid_dimension();
    let [menu, preview] =
        Layout::vertical([Constraint::Length(16), Constraint::Min(0)]).areas(area);

    let mut lines = vec![
        Line::styled(
            "Memory",
            Style::new().fg(GOLD_COLOR).add_modifier(Modifier::BOLD),
        ),
        Line::raw(""),
        Line::from(vec![
            Span::raw("Mode: "),
            Span::styled(engine.mode().title(), Style::new().fg(INFO_COLOR).bold()),
        ]),
        Line::from(vec![
            Span::raw(format!("Grid ({}): ", engine.grid_selection().label())),
            Span::styled(grid.to_string(), Style::new().fg(INFO_COLOR).bold()),
            Span::styled(format!("  {} pairs", grid.pairs()), Style::new().fg(DIM_COLOR)),
        ]),
    ];
    match view.scores.best(engine.mode(), grid) {
        Some(best) => lines.push(Line::from(vec![
            Span::raw("Best: "),
            Span::styled(format_time(best.time_ms), Style::new().fg(GOLD_COLOR)),
            Span::styled(format!(" by {}", best.display_name()), Style::new().fg(DIM_COLOR)),
        ])),
        None => lines.push(Line::styled("No record yet", Style::new().fg(DIM_COLOR))),
    }
    lines.push(Line::raw(""));
    lines.push(Line::styled("Controls:", Style::new().fg(WARN_COLOR).bold()));
    lines.push(key_hint("Space", "Start game"));
    lines.push(key_hint("G", "Change game mode"));
    match engine.grid_selection() {
        GridSelection::Preset => {
            lines.push(key_hint("M", "Switch to custom mode"));
            lines.push(key_hint("↑/↓", "Cycle through grid sizes"));
        }
        GridSelection::Custom => {
            lines.push(key_hint("M", "Switch to preset mode"));
            lines.push(key_hint("←/→", "Adjust columns"));
            lines.push(key_hint("↑/↓", "Adjust rows"));
        }
    }
    lines.push(key_hint("L", "Leaderboard"));
    lines.push(key_hint("Q", "Quit"));
    lines.extend(notice_line(view));

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), menu);
    frame.render_widget(grid_preview(grid), preview);
}

/// Dot sketch of the table shape.
fn grid_preview(grid: GridDimension) -> Paragraph<'static> {
    let row = vec!["▪"; grid.cols()].join(" ");
    let lines: Vec<Line> = (0..grid.rows())
        .map(|_| Line::styled(row.clone(), Style::new().fg(DIM_COLOR)))
        .collect();
    Paragraph::new(lines).alignment(Alignment::Center)
}

// ---- Playing ---------------------------------------------------------------

fn draw_playing(frame: &mut Frame, area: Rect, view: &View<'_>) {
    let engine = view.engine;
    let [status, table, message] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let timer = format_time(engine.elapsed(view.now).as_millis() as u64);
    let mut spans = vec![
        Span::styled(format!("⏱ {timer}"), Style::new().fg(INFO_COLOR)),
        Span::raw("   "),
    ];
    spans.extend(score_spans(engine));
    spans.push(Span::raw("   "));
    let current = engine.current_player();
    spans.push(Span::styled(
        format!("Turn: {}", current.label()),
        Style::new().fg(player_color(current)).bold(),
    ));
    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        status,
    );

    draw_table(frame, table, engine);

    frame.render_widget(
        Paragraph::new(Line::styled(
            engine.message().to_string(),
            Style::new().fg(WARN_COLOR),
        ))
        .alignment(Alignment::Center),
        message,
    );
}

fn score_spans(engine: &Engine) -> Vec<Span<'static>> {
    let scores = engine.scores();
    let entry = |player: Player, label: &str| {
        Span::styled(
            format!("{label}: {} ", scores.get(player)),
            Style::new().fg(player_color(player)),
        )
    };
    match engine.mode() {
        GameMode::Single => vec![entry(Player::P1, "Pairs")],
        GameMode::VsPlayer => vec![entry(Player::P1, "P1"), entry(Player::P2, "P2")],
        GameMode::VsAi => vec![entry(Player::P1, "You"), entry(Player::Ai, "AI")],
    }
}

/// Cell footprint per density class: (width, height, bordered).
fn footprint(size: CardSize) -> (u16, u16, bool) {
    match size {
        CardSize::Simple => (9, 5, true),
        CardSize::Minimal => (7, 3, true),
        CardSize::Mini => (5, 1, false),
        CardSize::Micro => (4, 1, false),
    }
}

fn draw_table(frame: &mut Frame, area: Rect, engine: &Engine) {
    let grid = engine.grid_dimension();
    let (width, height, bordered) = footprint(CardSize::for_grid(grid));
    let gap = u16::from(!bordered);
    let total_w = (width + gap) * grid.cols() as u16;
    let total_h = height * grid.rows() as u16;
    let x0 = area.x + area.width.saturating_sub(total_w) / 2;
    let y0 = area.y + area.height.saturating_sub(total_h) / 2;

    for (index, card) in engine.cards().iter().enumerate() {
        let (row, col) = grid.position(index);
        let cell = Rect::new(
            x0 + col as u16 * (width + gap),
            y0 + row as u16 * height,
            width,
            height,
        )
        .intersection(area);
        if cell.is_empty() {
            continue;
        }
        let matched = engine.is_matched(index);
        let (text, style) = card_face(*card, matched, width - 2 * u16::from(bordered));

        let face = if bordered {
            let border = if card.selected {
                Style::new().fg(GOLD_COLOR).bold()
            } else {
                Style::new().fg(DIM_COLOR)
            };
            let block = Block::new()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(border);
            let pad = usize::from(height.saturating_sub(3) / 2);
            let lines: Vec<Line> = std::iter::repeat_n(Line::raw(""), pad)
                .chain([Line::styled(text, style)])
                .collect();
            Paragraph::new(lines).alignment(Alignment::Center).block(block)
        } else {
            let style = if card.selected {
                style.add_modifier(Modifier::REVERSED)
            } else {
                style
            };
            Paragraph::new(Line::styled(text, style)).alignment(Alignment::Center)
        };
        frame.render_widget(face, cell);
    }
}

fn card_face(card: Card, matched: bool, inner_width: u16) -> (String, Style) {
    if !card.face_up {
        let back = "▒".repeat(usize::from(inner_width.clamp(1, 3)));
        return (back, Style::new().fg(Color::Blue));
    }
    let color = if card.suit.is_red() { Color::Red } else { Color::White };
    let mut style = Style::new().fg(color).bold();
    if matched {
        style = style.add_modifier(Modifier::DIM);
    }
    (card.label(), style)
}

// ---- Game over -------------------------------------------------------------

fn draw_game_over(frame: &mut Frame, area: Rect, view: &View<'_>) {
    let engine = view.engine;
    let winner = engine.winner();
    let mut lines = vec![
        Line::styled(
            "Game Over",
            Style::new().fg(GOLD_COLOR).add_modifier(Modifier::BOLD),
        ),
        Line::raw(""),
        Line::styled(winner.announcement(), Style::new().fg(WARN_COLOR).bold()),
        Line::from(score_spans(engine)),
        Line::raw(""),
    ];

    if let Some(outcome) = view.outcome {
        lines.push(Line::from(vec![
            Span::styled("Time: ", Style::new().fg(INFO_COLOR)),
            Span::styled(format_time(outcome.time_ms), Style::new().fg(INFO_COLOR).bold()),
        ]));
        if outcome.new_record {
            let by = match engine.mode() {
                GameMode::VsPlayer => format!(" by {}", winner.label()),
                _ => String::new(),
            };
            lines.push(Line::styled(
                format!("★ New Record{by}! ★"),
                Style::new().fg(GOLD_COLOR).bold(),
            ));
        } else if let Some(best) = outcome.best_ms.filter(|_| outcome.eligible) {
            lines.push(Line::styled(
                format!("Best: {}", format_time(best)),
                Style::new().fg(DIM_COLOR),
            ));
        }
    }

    lines.push(Line::raw(""));
    match view.name_prompt {
        Some(name) => {
            lines.push(Line::styled(
                "New high score! Enter your name:",
                Style::new().fg(GOLD_COLOR),
            ));
            lines.push(Line::from(vec![
                Span::raw("> "),
                Span::styled(name.to_string(), Style::new().bold()),
                Span::styled("_", Style::new().add_modifier(Modifier::SLOW_BLINK)),
            ]));
            lines.push(Line::styled(
                "Enter to save, Esc to skip",
                Style::new().fg(DIM_COLOR),
            ));
        }
        None => {
            lines.push(key_hint("N", "New game"));
            lines.push(key_hint("L", "Leaderboard"));
            lines.push(key_hint("Q", "Quit"));
        }
    }
    lines.extend(notice_line(view));

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

// ---- Leaderboard -----------------------------------------------------------

fn draw_leaderboard(frame: &mut Frame, area: Rect, view: &View<'_>) {
    let board = view.engine.leaderboard_view();
    let [title, local, online, footer] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(6),
        Constraint::Min(6),
        Constraint::Length(2),
    ])
    .areas(area);

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("◀ ", Style::new().fg(DIM_COLOR)),
            Span::styled(board.mode.title(), Style::new().fg(INFO_COLOR).bold()),
            Span::styled(" ▶   ", Style::new().fg(DIM_COLOR)),
            Span::styled(board.grid().to_string(), Style::new().fg(GOLD_COLOR).bold()),
        ]))
        .alignment(Alignment::Center),
        title,
    );

    let records = view.scores.leaderboard(board.mode, board.grid());
    frame.render_widget(record_table(" Local ", records), local);
    match view.online {
        Some(records) => frame.render_widget(record_table(" Online ", records), online),
        None => frame.render_widget(
            Paragraph::new(Line::styled("Online scores unavailable", Style::new().fg(DIM_COLOR)))
                .alignment(Alignment::Center)
                .block(Block::bordered().title(" Online ")),
            online,
        ),
    }

    let mut lines = vec![Line::styled(
        "←/→ mode  ↑/↓ grid  B back",
        Style::new().fg(DIM_COLOR),
    )];
    lines.extend(notice_line(view));
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), footer);
}

fn record_table<'a>(title: &'a str, records: &'a [HighScoreRecord]) -> Table<'a> {
    let header = Row::new(["#", "Name", "Time", "Date"])
        .style(Style::new().fg(WARN_COLOR).bold());
    let rows = records.iter().enumerate().map(|(rank, record)| {
        let style = if rank == 0 {
            Style::new().fg(GOLD_COLOR)
        } else {
            Style::new()
        };
        Row::new([
            format!("{}", rank + 1),
            record.display_name().to_string(),
            format_time(record.time_ms),
            record.date.chars().take(10).collect(),
        ])
        .style(style)
    });
    Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Length(14),
            Constraint::Length(7),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(Block::bordered().title(title))
}
