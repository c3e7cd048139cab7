//! Session driver: frame loop, countdown timer and network dispatch
//!
//! The driver task is the only owner of the [`Session`]. Host input arrives
//! over an mpsc channel, network calls run as spawned tasks whose results come
//! back over a second channel, and every change is published as a [`View`] on
//! a watch channel for the host to draw.

use std::future;
use std::path::PathBuf;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::input::{ArrowKey, KnobOffset};
use crate::remote::{ClientError, PlayResponse, SimClient};
use crate::render::DisplayList;
use crate::util::time::frame_interval;

use super::{Command, GameState, Hud, InputMethod, Phase, Session};

/// Events the host feeds into the session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Leave the splash screen
    Begin,
    EditName(String),
    SubmitName(String),
    KeyDown(ArrowKey),
    /// Key press from a host that cannot report key releases
    KeyDownExclusive(ArrowKey),
    KeyUp(ArrowKey),
    PointerDown(KnobOffset),
    PointerMove(KnobOffset),
    PointerUp,
    SelectInput(InputMethod),
    SwitchRole,
    Reset,
    Shutdown,
}

/// Finished network call, delivered back onto the driver task
#[derive(Debug)]
enum Completion {
    Reset {
        generation: u64,
        result: Result<GameState, ClientError>,
    },
    Play {
        generation: u64,
        seq: u64,
        result: Result<PlayResponse, ClientError>,
    },
}

/// Snapshot of everything the host draws
#[derive(Debug, Clone)]
pub struct View {
    pub phase: Phase,
    pub scene: DisplayList,
    pub hud: Hud,
}

impl View {
    fn of(session: &Session) -> Self {
        let mut scene = DisplayList::new();
        session.draw(&mut scene);
        Self {
            phase: session.phase(),
            scene,
            hud: session.hud().clone(),
        }
    }
}

/// Handle to a running driver
pub struct DriverHandle {
    pub events: mpsc::Sender<SessionEvent>,
    pub view: watch::Receiver<View>,
    task: JoinHandle<()>,
}

impl DriverHandle {
    /// Forward an event; returns false once the driver has stopped
    pub async fn send(&self, event: SessionEvent) -> bool {
        self.events.send(event).await.is_ok()
    }

    /// Stop the driver and wait for it to finish
    pub async fn shutdown(self) {
        let _ = self.events.send(SessionEvent::Shutdown).await;
        if let Err(e) = self.task.await {
            error!(error = %e, "Session driver panicked");
        }
    }
}

/// Spawn the driver task for `session`
pub fn spawn_driver(
    session: Session,
    client: SimClient,
    render_output: Option<PathBuf>,
) -> DriverHandle {
    let (events_tx, events_rx) = mpsc::channel::<SessionEvent>(64);
    let (completion_tx, completion_rx) = mpsc::channel::<Completion>(64);
    let (view_tx, view_rx) = watch::channel(View::of(&session));

    let driver = Driver {
        session,
        client,
        render_output,
        completion_tx,
        view_tx,
    };
    let task = tokio::spawn(driver.run(events_rx, completion_rx));

    DriverHandle {
        events: events_tx,
        view: view_rx,
        task,
    }
}

struct Driver {
    session: Session,
    client: SimClient,
    render_output: Option<PathBuf>,
    completion_tx: mpsc::Sender<Completion>,
    view_tx: watch::Sender<View>,
}

impl Driver {
    async fn run(
        mut self,
        mut events: mpsc::Receiver<SessionEvent>,
        mut completions: mpsc::Receiver<Completion>,
    ) {
        info!("Session driver started");

        let mut frames = interval(frame_interval());
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let countdown = self.session.countdown_deadline();

            tokio::select! {
                _ = frames.tick() => {
                    let now = Instant::now();
                    self.session.expire_toasts(now);
                    let commands = self.session.on_frame(now);
                    self.execute(commands);
                }

                event = events.recv() => {
                    match event {
                        Some(SessionEvent::Shutdown) | None => break,
                        Some(event) => self.handle_event(event),
                    }
                }

                Some(done) = completions.recv() => {
                    self.handle_completion(done);
                }

                _ = wait_until(countdown) => {
                    self.session.on_countdown_deadline(Instant::now());
                }
            }

            self.publish();
        }

        info!(generation = self.session.generation(), "Session driver stopped");
    }

    fn handle_event(&mut self, event: SessionEvent) {
        let now = Instant::now();
        let commands = match event {
            SessionEvent::Begin => self.session.begin(),
            SessionEvent::EditName(text) => {
                self.session.edit_name(text);
                Vec::new()
            }
            SessionEvent::SubmitName(name) => self.session.submit_name(&name),
            SessionEvent::KeyDown(key) => {
                self.session.key_down(key, now);
                Vec::new()
            }
            SessionEvent::KeyDownExclusive(key) => {
                self.session.key_down_exclusive(key, now);
                Vec::new()
            }
            SessionEvent::KeyUp(key) => {
                self.session.key_up(key);
                Vec::new()
            }
            SessionEvent::PointerDown(offset) => {
                self.session.pointer_down(offset, now);
                Vec::new()
            }
            SessionEvent::PointerMove(offset) => {
                self.session.pointer_move(offset);
                Vec::new()
            }
            SessionEvent::PointerUp => {
                self.session.pointer_up();
                Vec::new()
            }
            SessionEvent::SelectInput(method) => {
                self.session.select_input(method);
                Vec::new()
            }
            SessionEvent::SwitchRole => self.session.switch_role(now),
            SessionEvent::Reset => self.session.reset(),
            SessionEvent::Shutdown => Vec::new(),
        };
        self.execute(commands);
    }

    fn handle_completion(&mut self, done: Completion) {
        let now = Instant::now();
        let commands = match done {
            Completion::Reset { generation, result } => {
                self.session.on_reset_complete(generation, result, now)
            }
            Completion::Play {
                generation,
                seq,
                result,
            } => self.session.on_play_complete(generation, seq, result, now),
        };
        self.execute(commands);
    }

    /// Run commands as detached tasks; the frame loop never waits on them
    fn execute(&self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::Reset { generation } => {
                    let client = self.client.clone();
                    let tx = self.completion_tx.clone();
                    tokio::spawn(async move {
                        let result = client.reset().await;
                        if tx.send(Completion::Reset { generation, result }).await.is_err() {
                            debug!(generation, "Driver gone, dropping reset result");
                        }
                    });
                }
                Command::Play {
                    generation,
                    seq,
                    request,
                } => {
                    let client = self.client.clone();
                    let tx = self.completion_tx.clone();
                    tokio::spawn(async move {
                        let result = client.play(&request).await;
                        let done = Completion::Play {
                            generation,
                            seq,
                            result,
                        };
                        if tx.send(done).await.is_err() {
                            debug!(generation, seq, "Driver gone, dropping play result");
                        }
                    });
                }
                Command::Render { state } => {
                    let Some(path) = self.render_output.clone() else {
                        continue;
                    };
                    let client = self.client.clone();
                    tokio::spawn(async move {
                        match client.render(&state).await {
                            Ok(frame) => {
                                if let Err(e) = tokio::fs::write(&path, &frame.png).await {
                                    warn!(path = %path.display(), error = %e, "Failed to write rendered frame");
                                }
                            }
                            Err(e) => warn!(error = %e, "Error fetching render"),
                        }
                    });
                }
            }
        }
    }

    fn publish(&self) {
        self.view_tx.send_replace(View::of(&self.session));
    }
}

/// Resolve at `deadline`, or never when there is none
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => future::pending().await,
    }
}
