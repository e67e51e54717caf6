use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, TimeZone};
use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use miette::IntoDiagnostic;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use crate::catalog::CatalogClient;
use crate::controller::{Effect, Screen, ViewController};
use crate::detail::{Clipboard, DetailView};
use crate::domain::{Seed, SeedId, Theme};
use crate::error::SeedsError;
use crate::list::{FetchTicket, ListView};
use crate::seo::{HtmlHead, SITE_NAME};
use crate::theme::ThemeStore;

const LOGS_MAX: usize = 200;
const CODE_PREVIEW_CHARS: usize = 15;
const FEATURE_PREVIEW: usize = 3;
const SETTLE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Browse,
    Search,
}

enum Outcome {
    Listed {
        ticket: FetchTicket,
        result: Result<Vec<Seed>, SeedsError>,
    },
    Incremented {
        id: SeedId,
        current: u64,
        result: Result<(), SeedsError>,
    },
}

#[derive(Debug, Clone, Copy)]
struct Palette {
    accent: Color,
    accent_alt: Color,
    text: Color,
    muted: Color,
    highlight_bg: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Palette {
                accent: Color::Yellow,
                accent_alt: Color::LightYellow,
                text: Color::White,
                muted: Color::Gray,
                highlight_bg: Color::Rgb(120, 90, 10),
            },
            Theme::Dark => Palette {
                accent: Color::LightBlue,
                accent_alt: Color::Blue,
                text: Color::White,
                muted: Color::DarkGray,
                highlight_bg: Color::Rgb(30, 50, 90),
            },
        }
    }
}

pub struct Tui<C: CatalogClient + 'static, T: ThemeStore> {
    controller: ViewController<HtmlHead, T>,
    client: Arc<C>,
    clipboard: Box<dyn Clipboard>,
    input_mode: InputMode,
    status: String,
    logs: VecDeque<String>,
    show_logs: bool,
    in_flight: usize,
    tx: Sender<Outcome>,
    rx: Receiver<Outcome>,
}

impl<C: CatalogClient + 'static, T: ThemeStore> Tui<C, T> {
    pub fn new(
        controller: ViewController<HtmlHead, T>,
        client: C,
        clipboard: Box<dyn Clipboard>,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            controller,
            client: Arc::new(client),
            clipboard,
            input_mode: InputMode::Browse,
            status: "ready".to_string(),
            logs: VecDeque::new(),
            show_logs: false,
            in_flight: 0,
            tx,
            rx,
        }
    }

    pub fn run(&mut self) -> miette::Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().into_diagnostic()?;
        stdout.execute(EnterAlternateScreen).into_diagnostic()?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).into_diagnostic()?;
        terminal.clear().into_diagnostic()?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode().into_diagnostic()?;
        let mut stdout = io::stdout();
        stdout.execute(LeaveAlternateScreen).into_diagnostic()?;
        self.settle(SETTLE_TIMEOUT);
        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> miette::Result<()> {
        loop {
            self.spawn_effects();
            self.drain_outcomes();

            let now = Instant::now();
            terminal
                .draw(|frame| draw_ui(frame, self, now))
                .into_diagnostic()?;

            if event::poll(Duration::from_millis(120)).into_diagnostic()? {
                if let Event::Key(key) = event::read().into_diagnostic()? {
                    if self.handle_key(key) {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn spawn_effects(&mut self) {
        for effect in self.controller.take_effects() {
            let client = Arc::clone(&self.client);
            let tx = self.tx.clone();
            self.in_flight += 1;
            match effect {
                Effect::FetchList { ticket, sort } => {
                    self.log(format!("fetch sort={sort} ticket={}", ticket.value()));
                    thread::spawn(move || {
                        let result = client.fetch_all(sort, true);
                        let _ = tx.send(Outcome::Listed { ticket, result });
                    });
                }
                Effect::IncrementViews { id, current } => {
                    self.log(format!("views {id} -> {}", current.saturating_add(1)));
                    thread::spawn(move || {
                        let result = client.increment_views(&id, current);
                        let _ = tx.send(Outcome::Incremented {
                            id,
                            current,
                            result,
                        });
                    });
                }
            }
        }
    }

    fn drain_outcomes(&mut self) {
        while let Ok(outcome) = self.rx.try_recv() {
            self.apply_outcome(outcome);
        }
    }

    /// Blocks until every spawned request has reported back, or `timeout`
    /// runs out.
    fn settle(&mut self, timeout: Duration) {
        let deadline = Instant::now() + timeout;
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.rx.recv_timeout(remaining) {
                Ok(outcome) => self.apply_outcome(outcome),
                Err(_) => break,
            }
        }
        if self.in_flight > 0 {
            tracing::warn!(pending = self.in_flight, "exiting with store requests in flight");
        }
    }

    fn apply_outcome(&mut self, outcome: Outcome) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match outcome {
            Outcome::Listed { ticket, result } => {
                match &result {
                    Ok(seeds) => self.log(format!("loaded {} seeds", seeds.len())),
                    Err(err) => self.log(format!("fetch failed: {err}")),
                }
                self.controller.on_list_fetched(ticket, result);
            }
            Outcome::Incremented {
                id,
                current,
                result,
            } => {
                if let Err(err) = &result {
                    self.log(format!("view count for {id} not saved: {err}"));
                }
                self.controller.on_increment_result(&id, current, result);
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        if self.input_mode == InputMode::Search {
            self.handle_search_key(key);
            return false;
        }
        if matches!(key.code, KeyCode::F(4)) {
            self.show_logs = !self.show_logs;
            return false;
        }

        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('t') => {
                let theme = self.controller.toggle_theme();
                self.set_status(format!("theme: {theme}"));
            }
            _ => {
                if self.controller.detail().is_some() {
                    return self.handle_detail_key(key);
                }
                return self.handle_list_key(key);
            }
        }
        false
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.input_mode = InputMode::Browse,
            KeyCode::Backspace => self.controller.list_mut().pop_query_char(),
            KeyCode::Char(ch) => self.controller.list_mut().push_query_char(ch),
            _ => {}
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('/') => self.input_mode = InputMode::Search,
            KeyCode::Tab => {
                let next = self.controller.list().sort_mode().toggled();
                self.controller.set_sort_mode(next);
                self.set_status(format!("sort: {next}"));
            }
            KeyCode::Char('r') => self.controller.refresh(),
            KeyCode::Up | KeyCode::Char('k') => self.controller.list_mut().move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.controller.list_mut().move_cursor(1),
            KeyCode::PageUp => self.controller.list_mut().move_cursor(-10),
            KeyCode::PageDown => self.controller.list_mut().move_cursor(10),
            KeyCode::Enter => {
                if self.controller.select_cursor() {
                    let title = self
                        .controller
                        .detail()
                        .map(|detail| detail.seed().title.clone())
                        .unwrap_or_default();
                    self.set_status(format!("opened {title}"));
                }
            }
            _ => {}
        }
        false
    }

    fn handle_detail_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => {
                self.controller.back();
                self.set_status("ready".to_string());
            }
            KeyCode::Char('c') => {
                let outcome = self
                    .controller
                    .copy_seed(self.clipboard.as_mut(), Instant::now());
                match outcome {
                    Some(Ok(())) => self.set_status("seed copied".to_string()),
                    Some(Err(err)) => self.set_status(format!("copy failed: {err}")),
                    None => {}
                }
            }
            KeyCode::Up | KeyCode::Char('k') => self.controller.scroll_by(-1),
            KeyCode::Down | KeyCode::Char('j') => self.controller.scroll_by(1),
            _ => {}
        }
        false
    }

    fn set_status(&mut self, status: String) {
        self.log(status.clone());
        self.status = status;
    }

    fn log(&mut self, message: String) {
        push_log(&mut self.logs, format!("[{}] {message}", timestamp()));
    }
}

fn draw_ui<C: CatalogClient + 'static, T: ThemeStore>(
    frame: &mut ratatui::Frame,
    tui: &Tui<C, T>,
    now: Instant,
) {
    let palette = Palette::for_theme(tui.controller.theme());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(frame.area());

    frame.render_widget(draw_header(tui, palette), chunks[0]);

    let body = if tui.show_logs {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(chunks[1]);
        frame.render_widget(draw_logs_view(&tui.logs, split[1].height, palette), split[1]);
        split[0]
    } else {
        chunks[1]
    };

    match tui.controller.screen() {
        Screen::List => draw_list(frame, tui.controller.list(), palette, body),
        Screen::Detail(detail) => {
            let view = draw_detail(detail, palette, now).scroll((tui.controller.scroll(), 0));
            frame.render_widget(view, body);
        }
    }

    draw_footer(frame, tui, palette, chunks[2]);
}

fn draw_header<C: CatalogClient + 'static, T: ThemeStore>(
    tui: &Tui<C, T>,
    palette: Palette,
) -> Paragraph<'static> {
    let activity = if tui.in_flight > 0 { "syncing" } else { "idle" };
    let title_line = Line::from(vec![
        Span::styled(
            SITE_NAME,
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(env!("CARGO_PKG_VERSION"), Style::default().fg(palette.muted)),
        Span::raw("   Theme: "),
        Span::styled(tui.controller.theme().to_string(), Style::default().fg(palette.accent)),
        Span::raw("   "),
        Span::styled(activity, Style::default().fg(palette.muted)),
    ]);
    let page_title = tui.controller.head().title().to_string();
    let head_line = Line::from(Span::styled(page_title, Style::default().fg(palette.muted)));
    Paragraph::new(vec![title_line, head_line])
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::BOTTOM))
}

fn draw_list(frame: &mut ratatui::Frame, list: &ListView, palette: Palette, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(3)])
        .split(area);

    let visible = list.visible();
    let summary = Line::from(vec![
        Span::styled("Search: ", Style::default().fg(palette.muted)),
        Span::styled(list.query().to_string(), Style::default().fg(palette.text)),
        Span::styled("   Sort: ", Style::default().fg(palette.muted)),
        Span::styled(list.sort_mode().to_string(), Style::default().fg(palette.accent)),
        Span::styled(
            format!("   {}", showing_label(visible.len())),
            Style::default().fg(palette.muted),
        ),
    ]);
    frame.render_widget(Paragraph::new(summary), chunks[0]);

    if list.is_loading() && list.records().is_empty() {
        let loading = Paragraph::new("Loading amazing seeds...")
            .alignment(Alignment::Center)
            .style(Style::default().fg(palette.muted));
        frame.render_widget(loading, chunks[1]);
        return;
    }
    if visible.is_empty() {
        let empty = Paragraph::new("No seeds found matching your search")
            .alignment(Alignment::Center)
            .style(Style::default().fg(palette.muted));
        frame.render_widget(empty, chunks[1]);
        return;
    }

    let items = visible
        .iter()
        .map(|seed| ListItem::new(card_lines(seed, palette)))
        .collect::<Vec<_>>();
    let widget = List::new(items)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .title("Available Seeds"),
        )
        .highlight_style(Style::default().bg(palette.highlight_bg));
    let mut state = ListState::default().with_selected(Some(list.cursor()));
    frame.render_stateful_widget(widget, chunks[1], &mut state);
}

fn card_lines(seed: &Seed, palette: Palette) -> Vec<Line<'static>> {
    vec![
        Line::from(vec![
            Span::styled(
                seed.title.clone(),
                Style::default()
                    .fg(palette.text)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(format!("[{}]", seed.edition), Style::default().fg(palette.accent)),
            Span::raw(" "),
            Span::styled(
                format!("[{}]", seed.version),
                Style::default().fg(palette.accent_alt),
            ),
        ]),
        Line::from(vec![
            Span::styled(code_preview(&seed.seed_code), Style::default().fg(palette.muted)),
            Span::styled(
                format!("   {} views   ", seed.views),
                Style::default().fg(palette.muted),
            ),
            Span::raw(feature_preview(&seed.features)),
        ]),
    ]
}

fn draw_detail(detail: &DetailView, palette: Palette, now: Instant) -> Paragraph<'static> {
    let seed = detail.seed();
    let heading = Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::BOLD);
    let copy_label = if detail.is_copied(now) {
        "Copied!"
    } else {
        "[c] Copy Seed"
    };

    let mut lines = vec![
        Line::from(Span::styled(
            seed.title.clone(),
            Style::default()
                .fg(palette.text)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(format!("{} views", seed.views), Style::default().fg(palette.muted)),
            Span::raw("   "),
            Span::styled(detail.format_created_at(), Style::default().fg(palette.muted)),
            Span::raw("   "),
            Span::styled(seed.edition.clone(), Style::default().fg(palette.accent)),
            Span::raw(" "),
            Span::styled(seed.version.clone(), Style::default().fg(palette.accent_alt)),
        ]),
        Line::from(""),
        Line::from(Span::styled("Seed Code", heading)),
        Line::from(vec![
            Span::styled(
                seed.seed_code.clone(),
                Style::default()
                    .fg(palette.text)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
            Span::styled(copy_label, Style::default().fg(palette.accent)),
        ]),
        Line::from(""),
        Line::from(Span::styled("Description", heading)),
        Line::from(seed.description.clone()),
        Line::from(""),
        Line::from(Span::styled("Features", heading)),
    ];
    lines.extend(seed.features.iter().map(|feature| Line::from(format!("- {feature}"))));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Biomes", heading)));
    lines.extend(seed.biomes.iter().map(|biome| Line::from(format!("- {biome}"))));

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::NONE))
        .wrap(Wrap { trim: false })
}

fn draw_footer<C: CatalogClient + 'static, T: ThemeStore>(
    frame: &mut ratatui::Frame,
    tui: &Tui<C, T>,
    palette: Palette,
    area: Rect,
) {
    let keys = match (tui.input_mode, tui.controller.screen()) {
        (InputMode::Search, _) => "type to filter  Enter/Esc done",
        (InputMode::Browse, Screen::List) => {
            "/ search  Tab popular/recent  Enter open  r reload  t theme  F4 logs  q quit"
        }
        (InputMode::Browse, Screen::Detail(_)) => "c copy  Esc back  j/k scroll  t theme  q quit",
    };
    let prefix = if tui.input_mode == InputMode::Search {
        "/ "
    } else {
        ": "
    };
    let lines = vec![
        Line::from(vec![
            Span::styled(
                prefix,
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(tui.status.clone(), Style::default().fg(palette.text)),
        ]),
        Line::from(Span::styled(keys, Style::default().fg(palette.muted))),
    ];
    let para = Paragraph::new(lines).block(Block::default().borders(Borders::TOP));
    frame.render_widget(para, area);
}

fn draw_logs_view(logs: &VecDeque<String>, height: u16, palette: Palette) -> Paragraph<'static> {
    let visible = height.saturating_sub(2) as usize;
    let start = logs.len().saturating_sub(visible);
    let lines = logs
        .iter()
        .skip(start)
        .map(|line| Line::from(line.clone()))
        .collect::<Vec<_>>();
    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::LEFT)
                .title(Span::styled("LOGS", Style::default().fg(palette.accent))),
        )
        .wrap(Wrap { trim: true })
}

fn showing_label(count: usize) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("Showing {count} seed{plural}")
}

fn code_preview(code: &str) -> String {
    if code.chars().count() > CODE_PREVIEW_CHARS {
        let head = code.chars().take(CODE_PREVIEW_CHARS).collect::<String>();
        format!("{head}...")
    } else {
        code.to_string()
    }
}

fn feature_preview(features: &[String]) -> String {
    let mut parts = features
        .iter()
        .take(FEATURE_PREVIEW)
        .cloned()
        .collect::<Vec<_>>();
    if features.len() > FEATURE_PREVIEW {
        parts.push(format!("+{}", features.len() - FEATURE_PREVIEW));
    }
    parts.join(" · ")
}

fn push_log(buffer: &mut VecDeque<String>, item: String) {
    buffer.push_back(item);
    while buffer.len() > LOGS_MAX {
        buffer.pop_front();
    }
}

fn timestamp() -> String {
    clock_label(&Local::now())
}

fn clock_label<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    at.format("%H:%M:%S").to_string()
}
