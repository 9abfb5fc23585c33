//! Terminal UI for playing a dice game.
//!
//! Draws the scoreboard, the three dice and the roll button from the turn
//! machine's [`Table`], keeps a history of notices, and shows blocking
//! notices as a popup the player has to dismiss.

use anyhow::Result;
use chrono::{DateTime, Utc};
use dice_duel::{
    DieSlot, Face, GameOutcome, Notice, Route, Sequencer, Session, Severity, Table, Username,
    entities::Die,
};
use ratatui::{
    DefaultTerminal, Frame,
    crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    layout::{Alignment, Constraint, Flex, Layout, Margin, Rect},
    style::{Style, Stylize},
    symbols::scrollbar,
    text::{Line, Span, Text},
    widgets::{
        Block, Clear, List, ListDirection, ListItem, Padding, Paragraph, Scrollbar,
        ScrollbarOrientation, Wrap,
    },
};
use std::time::Duration;

mod widgets;

use widgets::ScrollableList;

use crate::api_client::Credentials;
use crate::driver::GameDriver;
use crate::websocket_client::{GameConnection, Incoming};

const HELP: &str = "\
Space, Enter
        Roll the dice when the roll button is lit.
Up, Down
        Scroll through the history.
Ctrl+Home, Ctrl+End
        Jump to the oldest or newest history entry.
Tab
        Show or hide this help.
Esc
        Leave the game.
";
const MAX_LOG_RECORDS: usize = 1024;
const POLL_TIMEOUT: Duration = Duration::from_millis(50);
const DIE_WIDTH: u16 = 11;
const DIE_HEIGHT: u16 = 5;

#[derive(Clone, Copy)]
enum RecordKind {
    Alert,
    Error,
    Game,
    You,
}

impl From<Severity> for RecordKind {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Success | Severity::Info => Self::Game,
            Severity::Warning => Self::Alert,
            Severity::Error => Self::Error,
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum ConnectionStatus {
    Connected,
    Disconnected,
}

/// A timestamped history entry with an importance label.
struct Record {
    datetime: DateTime<Utc>,
    kind: RecordKind,
    content: String,
}

impl Record {
    fn new(kind: RecordKind, content: String) -> Self {
        Self {
            datetime: Utc::now(),
            kind,
            content,
        }
    }
}

impl From<Record> for ListItem<'_> {
    fn from(val: Record) -> Self {
        let repr = match val.kind {
            RecordKind::Alert => "ALERT".light_magenta(),
            RecordKind::Error => "ERROR".light_red(),
            RecordKind::Game => "GAME".light_yellow(),
            RecordKind::You => "YOU".light_green(),
        };

        let msg = vec![
            format!("[{} ", val.datetime.format("%H:%M:%S")).into(),
            Span::styled(format!("{repr:5}"), repr.style),
            format!("]: {}", val.content).into(),
        ];

        ListItem::new(Line::from(msg))
    }
}

/// Pip rows for a die face, top to bottom.
pub fn pips(face: Face) -> [&'static str; 3] {
    match face {
        1 => ["       ", "   ●   ", "       "],
        2 => [" ●     ", "       ", "     ● "],
        3 => [" ●     ", "   ●   ", "     ● "],
        4 => [" ●   ● ", "       ", " ●   ● "],
        5 => [" ●   ● ", "   ●   ", " ●   ● "],
        6 => [" ●   ● ", " ●   ● ", " ●   ● "],
        _ => ["       ", "   ?   ", "       "],
    }
}

/// Face drawn for a die. Rolling dice tumble through every face.
pub fn shown_face(die: &Die, slot: DieSlot, tick: u64) -> Option<Face> {
    if die.rolling {
        let offset = match slot {
            DieSlot::Left => 0,
            DieSlot::Centre => 2,
            DieSlot::Right => 4,
        };
        // `tick % 6` always fits in a face.
        let step = u8::try_from((tick + offset) % 6).unwrap_or(0);
        Some(step + 1)
    } else {
        die.face
    }
}

/// Headline for the results screen.
pub fn results_message(local_player: &Username, outcome: &GameOutcome) -> String {
    let points = outcome
        .score
        .map(|score| format!(" with {score} points"))
        .unwrap_or_default();
    let tiebreak = if outcome.tie { " after a tiebreak" } else { "" };
    match &outcome.winner {
        Some(winner) if winner == local_player => format!("You won{points}{tiebreak}!"),
        Some(winner) => format!("{winner} won{points}{tiebreak}."),
        None if outcome.tie => "The game ended in a tiebreak.".to_string(),
        None => "The game is over.".to_string(),
    }
}

/// TUI App state
pub struct TuiApp {
    session: Session,
    credentials: Option<Credentials>,
    sequencer: Sequencer,
    /// Whether to display the help menu window
    show_help_menu: bool,
    /// Helps scroll through the help menu window if the terminal is small
    help_handle: ScrollableList,
    /// History of recorded messages
    log_handle: ScrollableList,
    /// Blocking notices waiting to be dismissed, oldest first
    popups: Vec<Notice>,
    connection_status: ConnectionStatus,
    /// Frame counter driving the tumbling dice
    tick: u64,
}

impl TuiApp {
    pub fn new(session: Session, credentials: Option<Credentials>, sequencer: Sequencer) -> Self {
        let mut help_handle = ScrollableList::new(MAX_LOG_RECORDS);
        help_handle.push("".into());
        for line in HELP.lines() {
            help_handle.push(line.into());
        }
        help_handle.push("".into());
        help_handle.jump_to_last();

        Self {
            session,
            credentials,
            sequencer,
            show_help_menu: false,
            help_handle,
            log_handle: ScrollableList::new(MAX_LOG_RECORDS),
            popups: Vec::new(),
            connection_status: ConnectionStatus::Disconnected,
            tick: 0,
        }
    }

    fn add_log(&mut self, kind: RecordKind, content: String) {
        let record = Record::new(kind, content);
        self.log_handle.push(record.into());
    }

    /// Move notices the driver collected into the history and popups.
    fn collect_notices(&mut self, notices: &mut Vec<Notice>) {
        for notice in notices.drain(..) {
            self.add_log(notice.severity.into(), notice.message.clone());
            if notice.blocking {
                self.popups.push(notice);
            }
        }
    }

    fn draw_scoreboard(&self, frame: &mut Frame, area: Rect, table: &Table) {
        let board = &table.scoreboard;
        let lines = vec![
            Line::from(format!("You: {}", self.session.local_player())).bold(),
            Line::from(board.opponent_label()),
            Line::from(board.round_label()),
            Line::from(board.own_score_label()).light_green(),
            Line::from(board.opponent_score_label()).light_red(),
            Line::from(""),
            Line::from(board.turn_label()).bold().white(),
        ];
        let scoreboard = Paragraph::new(lines).block(
            Block::bordered()
                .padding(Padding::uniform(1))
                .title(" scoreboard  "),
        );
        frame.render_widget(scoreboard, area);
    }

    fn draw_die(&self, frame: &mut Frame, area: Rect, die: &Die, slot: DieSlot) {
        if !die.visible {
            return;
        }
        let face = shown_face(die, slot, self.tick).unwrap_or(0);
        let style = if die.rolling {
            Style::default().light_yellow()
        } else {
            Style::default().white().bold()
        };
        let lines: Vec<Line> = pips(face).into_iter().map(Line::from).collect();
        let die = Paragraph::new(lines)
            .style(style)
            .block(Block::bordered().border_style(style));
        frame.render_widget(die, area);
    }

    fn draw_dice(&self, frame: &mut Frame, area: Rect, table: &Table) {
        let block = Block::bordered()
            .padding(Padding::uniform(1))
            .title(format!(" game {}  ", self.session.game_id()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [dice_area, button_area] =
            Layout::vertical([Constraint::Min(DIE_HEIGHT), Constraint::Length(1)]).areas(inner);
        let [dice_area] = Layout::vertical([Constraint::Length(DIE_HEIGHT)])
            .flex(Flex::Center)
            .areas(dice_area);
        let slots = Layout::horizontal([Constraint::Length(DIE_WIDTH); 3])
            .flex(Flex::Center)
            .spacing(2)
            .split(dice_area);
        for (slot, slot_area) in DieSlot::ALL.into_iter().zip(slots.iter()) {
            self.draw_die(frame, *slot_area, table.dice.die(slot), slot);
        }

        let button = if table.roll_button.is_visible() {
            Line::from(" ROLL (Space) ".black().on_light_green().bold())
        } else {
            Line::from(" ROLL ".dark_gray())
        };
        frame.render_widget(
            Paragraph::new(button).alignment(Alignment::Center),
            button_area,
        );
    }

    /// Render the log/history window with scrollbar
    fn draw_log(&mut self, frame: &mut Frame, area: Rect) {
        let log_records = self.log_handle.list_items.clone();
        let log_records = List::new(log_records)
            .direction(ListDirection::BottomToTop)
            .block(Block::bordered().title(" history  "));
        frame.render_stateful_widget(log_records, area, &mut self.log_handle.list_state);

        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .symbols(scrollbar::VERTICAL)
                .begin_symbol(None)
                .end_symbol(None),
            area.inner(Margin {
                vertical: 1,
                horizontal: 1,
            }),
            &mut self.log_handle.scroll_state,
        );
    }

    /// Render the help/status bar at the bottom
    fn draw_help_bar(&self, frame: &mut Frame, area: Rect) {
        let status_indicator = match self.connection_status {
            ConnectionStatus::Connected => "● Connected".green(),
            ConnectionStatus::Disconnected => "● Disconnected".red(),
        };

        let help_message = vec![
            status_indicator,
            " | press ".into(),
            "Space".bold().white(),
            " to roll, ".into(),
            "Tab".bold().white(),
            " to view help, or ".into(),
            "Esc".bold().white(),
            " to exit".into(),
        ];
        frame.render_widget(Paragraph::new(Line::from(help_message)), area);
    }

    /// Render the help menu overlay
    fn draw_help_menu(&mut self, frame: &mut Frame) {
        let area = centered(frame.area(), 60, 16);
        frame.render_widget(Clear, area);

        let help_items = self.help_handle.list_items.clone();
        let help_items = List::new(help_items)
            .direction(ListDirection::BottomToTop)
            .block(Block::bordered().title(" keys  "));
        frame.render_stateful_widget(help_items, area, &mut self.help_handle.list_state);
    }

    fn draw_popup(frame: &mut Frame, notice: &Notice) {
        let area = centered(frame.area(), 64, 8);
        frame.render_widget(Clear, area);
        let title = match notice.severity {
            Severity::Error => " error  ".light_red(),
            Severity::Warning => " warning  ".light_magenta(),
            Severity::Success | Severity::Info => " notice  ".light_yellow(),
        };
        let text = Text::from(vec![
            Line::from(notice.message.clone()),
            Line::from(""),
            Line::from("press any key to continue".dark_gray()),
        ]);
        let popup = Paragraph::new(text)
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center)
            .block(Block::bordered().padding(Padding::uniform(1)).title(title));
        frame.render_widget(popup, area);
    }

    fn draw_results(&self, frame: &mut Frame, outcome: &GameOutcome) {
        let area = centered(frame.area(), 48, 7);
        frame.render_widget(Clear, area);
        let text = Text::from(vec![
            Line::from(results_message(self.session.local_player(), outcome)).bold(),
            Line::from(""),
            Line::from("press Enter or Esc to leave".dark_gray()),
        ]);
        let results = Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::bordered().padding(Padding::uniform(1)).title(" results  "));
        frame.render_widget(results, area);
    }

    /// Main draw function - orchestrates rendering of all UI components
    fn draw(&mut self, frame: &mut Frame, table: &Table, route: Option<&Route>) {
        let window = Layout::vertical([
            Constraint::Min(6),    // Table and history
            Constraint::Length(1), // Help bar
        ]);
        let [top_area, help_area] = window.areas(frame.area());

        let [view_area, log_area] =
            Layout::vertical([Constraint::Min(DIE_HEIGHT + 6), Constraint::Percentage(40)])
                .areas(top_area);
        let [scoreboard_area, dice_area] =
            Layout::horizontal([Constraint::Percentage(30), Constraint::Percentage(70)])
                .areas(view_area);

        self.draw_scoreboard(frame, scoreboard_area, table);
        self.draw_dice(frame, dice_area, table);
        self.draw_log(frame, log_area);
        self.draw_help_bar(frame, help_area);

        if self.show_help_menu {
            self.draw_help_menu(frame);
        }
        if let Some(Route::Results(outcome)) = route {
            self.draw_results(frame, outcome);
        }
        if let Some(notice) = self.popups.first() {
            Self::draw_popup(frame, notice);
        }
    }

    /// Run the TUI application until the game screen is left.
    ///
    /// Returns the route the game navigated to, or `None` if the player quit.
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> Result<Option<Route>> {
        let mut connection =
            GameConnection::connect(&self.session, self.credentials.as_ref()).await?;
        self.connection_status = ConnectionStatus::Connected;
        self.add_log(
            RecordKind::Game,
            format!("Joined game {}", self.session.game_id()),
        );

        let mut driver = GameDriver::new(
            self.session.local_player().clone(),
            self.sequencer.clone(),
            connection.handle(),
            Vec::new(),
        );

        loop {
            self.tick = self.tick.wrapping_add(1);
            terminal.draw(|frame| self.draw(frame, driver.table(), driver.route()))?;

            if event::poll(POLL_TIMEOUT)?
                && let Event::Key(KeyEvent {
                    code,
                    modifiers,
                    kind: KeyEventKind::Press,
                    ..
                }) = event::read()?
            {
                if !self.popups.is_empty() {
                    self.popups.remove(0);
                } else if driver.route().is_some() {
                    if matches!(code, KeyCode::Enter | KeyCode::Esc) {
                        break;
                    }
                } else {
                    match (modifiers, code) {
                        (KeyModifiers::CONTROL, KeyCode::Home) => self.log_handle.jump_to_last(),
                        (KeyModifiers::CONTROL, KeyCode::End) => self.log_handle.jump_to_first(),
                        (_, KeyCode::Char(' ') | KeyCode::Enter) => {
                            if driver.roll()? {
                                self.add_log(RecordKind::You, "Rolled the dice".to_string());
                            }
                        }
                        (_, KeyCode::Up) => {
                            if self.show_help_menu {
                                self.help_handle.move_up();
                            } else {
                                self.log_handle.move_up();
                            }
                        }
                        (_, KeyCode::Down) => {
                            if self.show_help_menu {
                                self.help_handle.move_down();
                            } else {
                                self.log_handle.move_down();
                            }
                        }
                        (_, KeyCode::Tab) => self.show_help_menu = !self.show_help_menu,
                        (_, KeyCode::Esc) => {
                            connection.shutdown().await;
                            return Ok(None);
                        }
                        _ => {}
                    }
                }
            }

            while let Some(incoming) = connection.try_recv() {
                if let Incoming::Closed(reason) = &incoming {
                    self.connection_status = ConnectionStatus::Disconnected;
                    if let Some(reason) = reason {
                        self.add_log(RecordKind::Error, format!("Connection closed: {reason}"));
                    }
                }
                driver.on_incoming(incoming)?;
            }

            if driver
                .animation_deadline()
                .is_some_and(|deadline| deadline <= tokio::time::Instant::now())
            {
                driver.finish_animation()?;
            }

            self.collect_notices(driver.notifier_mut());

            // Home routes only carry a blocking notice; leave once it's read.
            if matches!(driver.route(), Some(Route::Home)) && self.popups.is_empty() {
                break;
            }
        }

        let route = driver.into_route();
        connection.shutdown().await;
        Ok(route)
    }
}

/// A rectangle of at most `width` by `height` in the middle of `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Max(height)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Max(width)])
        .flex(Flex::Center)
        .areas(area);
    area
}
