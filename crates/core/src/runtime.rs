//! Session runtime
//!
//! One tokio task owns the [`Session`] and drives it from a single
//! `select!` loop: handle commands, dial completion, inbound frames, the
//! reconnect timer and the stats poll. Each wakeup is handled to completion,
//! then the effects it queued are executed before the loop waits again.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::Sleep;

use crate::config::SessionConfig;
use crate::session::{Session, SessionView};
use crate::transport::{ws, Effect, FrameReceiver, FrameSender, Generation, StatsPoller};
use crate::types::SessionEvent;
use crate::{CoreError, Result};

const COMMAND_BUFFER: usize = 64;

type DialFuture = Pin<Box<dyn Future<Output = Result<(FrameSender, FrameReceiver)>> + Send>>;

/// Requests from a [`SessionHandle`]
enum Command {
    Submit(String),
    SetInput(String),
    AcceptSuggestion(usize, oneshot::Sender<bool>),
    RecallPrevious(oneshot::Sender<String>),
    RecallNext(oneshot::Sender<String>),
    ScanTarget { target: String, scan_type: String },
    View(oneshot::Sender<SessionView>),
    Close(oneshot::Sender<()>),
}

/// Cloneable handle to a running session
///
/// Every async call fails with [`CoreError::SessionClosed`] once the
/// session loop has exited.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<SessionEvent>,
    state: watch::Receiver<SessionView>,
}

/// Spawn the session loop on the current tokio runtime
///
/// The returned receiver is subscribed before the loop starts, so it sees
/// every event including the initial connection notice.
pub fn spawn(config: SessionConfig) -> Result<(SessionHandle, broadcast::Receiver<SessionEvent>)> {
    let session = Session::new(config)?;
    let events = session.event_sender();
    let first_subscriber = events.subscribe();
    let (state_tx, state_rx) = watch::channel(session.view());
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);

    tokio::spawn(run(session, command_rx, state_tx));

    let handle = SessionHandle {
        commands: command_tx,
        events,
        state: state_rx,
    };
    Ok((handle, first_subscriber))
}

impl SessionHandle {
    pub async fn submit(&self, text: impl Into<String>) -> Result<()> {
        self.dispatch(Command::Submit(text.into())).await
    }

    pub async fn set_input(&self, text: impl Into<String>) -> Result<()> {
        self.dispatch(Command::SetInput(text.into())).await
    }

    /// Returns false when `index` is out of range
    pub async fn accept_suggestion(&self, index: usize) -> Result<bool> {
        self.request(|reply| Command::AcceptSuggestion(index, reply)).await
    }

    /// Resulting input after stepping back through history
    pub async fn recall_previous(&self) -> Result<String> {
        self.request(Command::RecallPrevious).await
    }

    pub async fn recall_next(&self) -> Result<String> {
        self.request(Command::RecallNext).await
    }

    pub async fn scan_target(&self, target: impl Into<String>, scan_type: impl Into<String>) -> Result<()> {
        self.dispatch(Command::ScanTarget {
            target: target.into(),
            scan_type: scan_type.into(),
        })
        .await
    }

    pub async fn view(&self) -> Result<SessionView> {
        self.request(Command::View).await
    }

    /// Close the connection and stop the loop
    pub async fn close(&self) -> Result<()> {
        self.request(Command::Close).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Latest view, updated after every handled event
    pub fn watch_state(&self) -> watch::Receiver<SessionView> {
        self.state.clone()
    }

    /// Resolves once the session loop has exited
    pub async fn closed(&self) {
        self.commands.closed().await
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    async fn dispatch(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| CoreError::SessionClosed)
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.dispatch(make(reply_tx)).await?;
        reply_rx.await.map_err(|_| CoreError::SessionClosed)
    }
}

struct Dialing {
    generation: Generation,
    future: DialFuture,
}

struct Link {
    generation: Generation,
    sender: FrameSender,
    receiver: FrameReceiver,
}

struct PendingReconnect {
    generation: Generation,
    sleep: Pin<Box<Sleep>>,
}

/// Transport resources owned by the loop
#[derive(Default)]
struct Wires {
    dialing: Option<Dialing>,
    link: Option<Link>,
    reconnect: Option<PendingReconnect>,
}

enum LoopEvent {
    Command(Option<Command>),
    Dialed(Generation, Result<(FrameSender, FrameReceiver)>),
    Inbound(Generation, Option<Result<String>>),
    ReconnectDue(Generation),
    PollStats,
}

async fn run(mut session: Session, mut commands: mpsc::Receiver<Command>, state: watch::Sender<SessionView>) {
    let mut wires = Wires::default();
    let mut poller = StatsPoller::new(session.config().stats_interval());

    tracing::info!("Session loop started");
    session.start();

    loop {
        wires.apply(&mut session).await;
        state.send_replace(session.view());

        let event = tokio::select! {
            command = commands.recv() => LoopEvent::Command(command),
            (generation, result) = dial_outcome(&mut wires.dialing), if wires.dialing.is_some() => {
                LoopEvent::Dialed(generation, result)
            }
            (generation, frame) = next_inbound(&mut wires.link), if wires.link.is_some() => {
                LoopEvent::Inbound(generation, frame)
            }
            generation = reconnect_due(&mut wires.reconnect), if wires.reconnect.is_some() => {
                LoopEvent::ReconnectDue(generation)
            }
            _ = poller.tick() => LoopEvent::PollStats,
        };

        match event {
            LoopEvent::Command(Some(command)) => {
                if let Some(reply) = handle_command(&mut session, command) {
                    session.close();
                    wires.apply(&mut session).await;
                    state.send_replace(session.view());
                    let _ = reply.send(());
                    break;
                }
            }
            LoopEvent::Command(None) => {
                tracing::debug!("All session handles dropped");
                session.close();
                wires.apply(&mut session).await;
                break;
            }
            LoopEvent::Dialed(generation, Ok((sender, receiver))) => {
                wires.dialing = None;
                wires.link = Some(Link {
                    generation,
                    sender,
                    receiver,
                });
                session.on_open(generation);
            }
            LoopEvent::Dialed(generation, Err(e)) => {
                wires.dialing = None;
                session.on_error(generation, &e);
                session.on_close(generation);
            }
            LoopEvent::Inbound(generation, Some(Ok(frame))) => session.on_frame(generation, &frame),
            LoopEvent::Inbound(generation, Some(Err(e))) => {
                wires.link = None;
                session.on_error(generation, &e);
                session.on_close(generation);
            }
            LoopEvent::Inbound(generation, None) => {
                wires.link = None;
                session.on_close(generation);
            }
            LoopEvent::ReconnectDue(generation) => {
                wires.reconnect = None;
                session.on_reconnect_timer(generation);
            }
            LoopEvent::PollStats => session.poll_stats(),
        }
    }

    tracing::info!("Session loop stopped");
}

/// Apply one handle request; yields the reply slot when it asks to close
fn handle_command(session: &mut Session, command: Command) -> Option<oneshot::Sender<()>> {
    match command {
        Command::Submit(text) => session.submit(&text),
        Command::SetInput(text) => session.set_input(text),
        Command::AcceptSuggestion(index, reply) => {
            let _ = reply.send(session.accept_suggestion(index));
        }
        Command::RecallPrevious(reply) => {
            let _ = reply.send(session.recall_previous().to_owned());
        }
        Command::RecallNext(reply) => {
            let _ = reply.send(session.recall_next().to_owned());
        }
        Command::ScanTarget { target, scan_type } => session.scan_target(&target, &scan_type),
        Command::View(reply) => {
            let _ = reply.send(session.view());
        }
        Command::Close(reply) => return Some(reply),
    }
    None
}

impl Wires {
    /// Execute queued effects until the session stops producing them
    async fn apply(&mut self, session: &mut Session) {
        loop {
            let effects = session.take_effects();
            if effects.is_empty() {
                return;
            }
            for effect in effects {
                self.execute(session, effect).await;
            }
        }
    }

    async fn execute(&mut self, session: &mut Session, effect: Effect) {
        match effect {
            Effect::Dial { generation, url } => {
                tracing::debug!("Dialing {} (generation {})", url, generation);
                let timeout = session.config().connect_timeout();
                self.link = None;
                self.dialing = Some(Dialing {
                    generation,
                    future: Box::pin(async move { ws::dial(&url, timeout).await }),
                });
            }
            Effect::Transmit { generation, frame } => {
                let Some(link) = self.link.as_mut().filter(|l| l.generation == generation) else {
                    tracing::warn!("No live connection for generation {}, frame dropped", generation);
                    return;
                };
                if let Err(e) = link.sender.send_text(frame).await {
                    self.link = None;
                    session.on_error(generation, &e);
                    session.on_close(generation);
                }
            }
            Effect::ScheduleReconnect { generation, delay } => {
                self.reconnect = Some(PendingReconnect {
                    generation,
                    sleep: Box::pin(tokio::time::sleep(delay)),
                });
            }
            Effect::CancelReconnect => {
                self.reconnect = None;
            }
            Effect::Disconnect { generation } => {
                if self.dialing.as_ref().is_some_and(|d| d.generation == generation) {
                    self.dialing = None;
                }
                if let Some(mut link) = self.link.take() {
                    if link.generation == generation {
                        link.sender.close().await;
                    } else {
                        self.link = Some(link);
                    }
                }
            }
        }
    }
}

async fn dial_outcome(dialing: &mut Option<Dialing>) -> (Generation, Result<(FrameSender, FrameReceiver)>) {
    match dialing {
        Some(d) => {
            let result = d.future.as_mut().await;
            (d.generation, result)
        }
        None => std::future::pending().await,
    }
}

async fn next_inbound(link: &mut Option<Link>) -> (Generation, Option<Result<String>>) {
    match link {
        Some(l) => (l.generation, l.receiver.next_frame().await),
        None => std::future::pending().await,
    }
}

async fn reconnect_due(reconnect: &mut Option<PendingReconnect>) -> Generation {
    match reconnect {
        Some(r) => {
            r.sleep.as_mut().await;
            r.generation
        }
        None => std::future::pending().await,
    }
}
