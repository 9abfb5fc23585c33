//! WebSocket connection to a running game.
//!
//! [`GameConnection`] owns the socket. A reader task decodes every text
//! frame into a [`ServerEvent`] and a writer task sends whatever the
//! [`ConnectionHandle`] queues, so neither side ever blocks the other.
//! [`WebSocketClient`] is the line-oriented frontend built on top of it.

use anyhow::{Context, Result, anyhow};
use dice_duel::{
    Acknowledgement, DieSlot, Notice, ProtocolError, Route, Sequencer, ServerEvent, Session,
    Table,
};
use futures_util::{SinkExt, StreamExt};
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        Message,
        client::IntoClientRequest,
        http::{HeaderValue, header::AUTHORIZATION},
    },
};

use crate::api_client::Credentials;
use crate::commands::{Command, HELP_TEXT, ParseError, parse_command};
use crate::driver::{self, GameDriver};
use crate::logging::log_protocol_anomaly;

/// What the reader task hands to the session loop.
#[derive(Debug)]
pub enum Incoming {
    Event(ServerEvent),
    Malformed { raw: String, error: ProtocolError },
    /// The socket closed or failed. Carries the close reason if there was one.
    Closed(Option<String>),
}

/// Cheap handle for writing to the socket.
#[derive(Clone, Debug)]
pub struct ConnectionHandle {
    outgoing: mpsc::UnboundedSender<Message>,
}

impl ConnectionHandle {
    pub fn new(outgoing: mpsc::UnboundedSender<Message>) -> Self {
        Self { outgoing }
    }

    /// Tell the server the local turn has played out.
    pub fn send_ack(&self) -> Result<()> {
        let json = Acknowledgement::default()
            .encode()
            .context("Failed to encode acknowledgement")?;
        self.outgoing
            .send(Message::Text(json.into()))
            .map_err(|_| anyhow!("Connection writer has stopped"))
    }

    /// Start the closing handshake. Safe to call more than once.
    pub fn close(&self) {
        let _ = self.outgoing.send(Message::Close(None));
    }
}

pub struct GameConnection {
    handle: ConnectionHandle,
    incoming: mpsc::UnboundedReceiver<Incoming>,
    open: bool,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl GameConnection {
    /// Open the game socket, authenticating with Basic auth if given
    /// credentials.
    pub async fn connect(session: &Session, credentials: Option<&Credentials>) -> Result<Self> {
        let mut request = session
            .socket_url()
            .into_client_request()
            .context("Invalid game socket URL")?;
        if let Some(credentials) = credentials {
            let value = HeaderValue::from_str(&credentials.basic_header())
                .context("Credentials can't be sent as a header")?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }

        let (ws_stream, _) = connect_async(request)
            .await
            .context("Failed to connect to WebSocket")?;
        tracing::info!(game_id = session.game_id(), "Connected to game socket");

        let (mut write, mut read) = ws_stream.split();
        let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();
        let (outgoing_tx, mut outgoing_rx) = mpsc::unbounded_channel::<Message>();

        let game_id = session.game_id().to_string();
        let reader = tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                let incoming = match msg {
                    Ok(Message::Text(text)) => match ServerEvent::decode(text.as_str()) {
                        Ok(event) => Incoming::Event(event),
                        Err(error) => {
                            log_protocol_anomaly(&game_id, &error.to_string(), text.as_str());
                            Incoming::Malformed {
                                raw: text.as_str().to_string(),
                                error,
                            }
                        }
                    },
                    Ok(Message::Close(frame)) => {
                        let reason = frame
                            .map(|frame| frame.reason.as_str().to_string())
                            .filter(|reason| !reason.is_empty());
                        let _ = incoming_tx.send(Incoming::Closed(reason));
                        return;
                    }
                    Err(e) => {
                        tracing::warn!(game_id = %game_id, "WebSocket error: {e}");
                        let _ = incoming_tx.send(Incoming::Closed(Some(e.to_string())));
                        return;
                    }
                    Ok(_) => continue,
                };
                if incoming_tx.send(incoming).is_err() {
                    return;
                }
            }
            let _ = incoming_tx.send(Incoming::Closed(None));
        });

        let writer = tokio::spawn(async move {
            while let Some(msg) = outgoing_rx.recv().await {
                let closing = matches!(msg, Message::Close(_));
                if let Err(e) = write.send(msg).await {
                    tracing::warn!("Failed to write to game socket: {e}");
                    break;
                }
                if closing {
                    break;
                }
            }
        });

        Ok(Self {
            handle: ConnectionHandle::new(outgoing_tx),
            incoming: incoming_rx,
            open: true,
            reader,
            writer,
        })
    }

    pub fn handle(&self) -> ConnectionHandle {
        self.handle.clone()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Next message from the server. After the first [`Incoming::Closed`]
    /// this returns `None`.
    pub async fn recv(&mut self) -> Option<Incoming> {
        if !self.open {
            return None;
        }
        let incoming = self
            .incoming
            .recv()
            .await
            .unwrap_or(Incoming::Closed(None));
        if matches!(incoming, Incoming::Closed(_)) {
            self.open = false;
        }
        Some(incoming)
    }

    /// Like [`Self::recv`] but never waits.
    pub fn try_recv(&mut self) -> Option<Incoming> {
        if !self.open {
            return None;
        }
        let incoming = match self.incoming.try_recv() {
            Ok(incoming) => incoming,
            Err(mpsc::error::TryRecvError::Empty) => return None,
            Err(mpsc::error::TryRecvError::Disconnected) => Incoming::Closed(None),
        };
        if matches!(incoming, Incoming::Closed(_)) {
            self.open = false;
        }
        Some(incoming)
    }

    /// Close the socket and stop both tasks.
    pub async fn shutdown(self) {
        self.handle.close();
        let _ = tokio::time::timeout(std::time::Duration::from_secs(1), self.writer).await;
        self.reader.abort();
    }
}

/// Line-oriented game client
pub struct WebSocketClient {
    session: Session,
    credentials: Option<Credentials>,
    sequencer: Sequencer,
}

impl WebSocketClient {
    pub fn new(session: Session, credentials: Option<Credentials>, sequencer: Sequencer) -> Self {
        Self {
            session,
            credentials,
            sequencer,
        }
    }

    /// Connect to the game and play it out on stdin/stdout.
    ///
    /// Returns where the game screen sent the player, or `None` if they quit.
    pub async fn connect_and_play(self) -> Result<Option<Route>> {
        println!("Connecting to {}...", self.session.socket_url());
        let mut connection =
            GameConnection::connect(&self.session, self.credentials.as_ref()).await?;
        println!("Connected to game {}! Type 'help' for commands.\n", self.session.game_id());

        let notifier = |notice: &Notice| println!("[{}] {}", notice.severity, notice.message);
        let mut driver = GameDriver::new(
            self.session.local_player().clone(),
            self.sequencer,
            connection.handle(),
            notifier,
        );

        let mut stdin = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        let mut last_frame = String::new();

        while driver.route().is_none() {
            let deadline = driver.animation_deadline();
            tokio::select! {
                Some(incoming) = connection.recv(), if connection.is_open() => {
                    driver.on_incoming(incoming)?;
                }
                () = driver::wait_until(deadline) => {
                    driver.finish_animation()?;
                }
                line = stdin.next_line() => {
                    let Some(line) = line.context("Failed to read input")? else {
                        break; // EOF
                    };
                    match parse_command(&line) {
                        Ok(Command::Roll) => {
                            if !driver.roll()? {
                                println!("It's not your turn to roll.");
                            }
                        }
                        Ok(Command::Help) => println!("{HELP_TEXT}"),
                        Ok(Command::Quit) => {
                            println!("Leaving the game...");
                            break;
                        }
                        Err(ParseError::Empty) => {}
                        Err(e) => eprintln!("{e}"),
                    }
                }
            }

            let frame = render_table(driver.table());
            if frame != last_frame {
                println!("{frame}");
                last_frame = frame;
            }
        }

        let route = driver.into_route();
        connection.shutdown().await;
        Ok(route)
    }
}

/// One die as text. Rolling dice show a spinner.
pub fn format_die(table: &Table, slot: DieSlot) -> Option<String> {
    let die = table.dice.die(slot);
    if !die.visible {
        return None;
    }
    Some(match (die.rolling, die.face) {
        (true, _) => "[ ~ ]".to_string(),
        (false, Some(face)) => format!("[ {face} ]"),
        (false, None) => "[   ]".to_string(),
    })
}

/// The scoreboard and dice as a few lines of text.
pub fn render_table(table: &Table) -> String {
    let board = &table.scoreboard;
    let dice: Vec<String> = DieSlot::ALL
        .iter()
        .filter_map(|slot| format_die(table, *slot))
        .collect();

    let mut lines = vec![
        format!(
            "{} | {} | {} | {}",
            board.opponent_label(),
            board.round_label(),
            board.own_score_label(),
            board.opponent_score_label()
        ),
        board.turn_label().to_string(),
    ];
    if !dice.is_empty() {
        lines.push(dice.join(" "));
    }
    if table.roll_button.is_visible() {
        lines.push("Type 'roll' to roll the dice.".to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use dice_duel::{Effect, TurnMachine, Username};

    fn table_after(events: Vec<ServerEvent>) -> (TurnMachine, Vec<Effect>) {
        let mut machine = TurnMachine::new(Username::new("alice"), Sequencer::default());
        let mut effects = Vec::new();
        for event in events {
            effects.extend(machine.handle_event(event));
        }
        (machine, effects)
    }

    #[test]
    fn test_send_ack_writes_empty_object() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = ConnectionHandle::new(tx);
        handle.send_ack().unwrap();

        match rx.try_recv().unwrap() {
            Message::Text(text) => assert_eq!(text.as_str(), "{}"),
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn test_send_ack_fails_once_writer_gone() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        assert!(ConnectionHandle::new(tx).send_ack().is_err());
    }

    #[test]
    fn test_render_waiting_table() {
        let (machine, _) = table_after(vec![]);
        let frame = render_table(machine.table());
        assert!(frame.contains("Opponent: waiting..."));
        assert!(!frame.contains("roll the dice"));
    }

    #[test]
    fn test_render_local_turn() {
        let (machine, _) = table_after(vec![
            ServerEvent::Ready {
                player1: Username::new("alice"),
                player2: Username::new("bob"),
            },
            ServerEvent::YourRoll(dice_duel::Roll::pair(3, 5).unwrap()),
        ]);
        let frame = render_table(machine.table());
        assert!(frame.contains("Opponent: bob"));
        assert!(frame.contains("Type 'roll'"));
        assert_eq!(format_die(machine.table(), DieSlot::Centre), None);
    }

    #[test]
    fn test_rolling_die_shows_spinner() {
        let (machine, _) = table_after(vec![ServerEvent::OpponentRoll {
            player: Username::new("bob"),
            roll: dice_duel::Roll::pair(2, 6).unwrap(),
        }]);
        assert_eq!(
            format_die(machine.table(), DieSlot::Left).as_deref(),
            Some("[ ~ ]")
        );
    }
}
