//! Terminal host: maps crossterm input to session events and draws the view

pub mod view;

use std::io::{self, Stdout};

use anyhow::{Context, Result};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers, KeyboardEnhancementFlags, MouseButton, MouseEvent,
        MouseEventKind, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tracing::{error, info};

use crate::game::session::JOYSTICK_RADIUS;
use crate::game::{DriverHandle, InputMethod, SessionEvent};
use crate::input::{ArrowKey, KnobOffset};

use self::view::Regions;

/// Run the terminal UI until the user quits
pub async fn run(handle: DriverHandle) -> Result<()> {
    let mut stdout = io::stdout();
    enable_raw_mode().context("failed to enable raw mode")?;
    enter_screen(&mut stdout, disable_raw_mode)?;

    // Release events are only reported with the kitty keyboard protocol
    let key_release = supports_keyboard_enhancement().unwrap_or(false);
    if key_release {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )
        .context("failed to enable key release events")?;
    }
    info!(key_release, "Terminal host started");

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to build terminal backend")?;
    terminal.hide_cursor().ok();

    let result = event_loop(&mut terminal, &handle, key_release).await;

    terminal.show_cursor().ok();
    if key_release {
        if let Err(err) = execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags) {
            error!(?err, "failed to restore keyboard flags");
        }
    }
    if let Err(err) = disable_raw_mode() {
        error!(?err, "failed to disable raw mode");
    }
    if let Err(err) = execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen) {
        error!(?err, "failed to leave alternate screen");
    }

    handle.shutdown().await;
    result
}

/// Switch to the alternate screen, leaving raw mode again if that fails
fn enter_screen<W, F>(out: &mut W, leave_raw_mode: F) -> Result<()>
where
    W: io::Write,
    F: FnOnce() -> io::Result<()>,
{
    if let Err(err) = execute!(out, EnterAlternateScreen, EnableMouseCapture) {
        if let Err(restore) = leave_raw_mode() {
            error!(?restore, "failed to disable raw mode");
        }
        return Err(err).context("failed to enter alternate screen");
    }
    Ok(())
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    handle: &DriverHandle,
    key_release: bool,
) -> Result<()> {
    let mut view_rx = handle.view.clone();
    let mut reader = EventStream::new();
    let mut host = HostState::new(key_release);

    loop {
        {
            let view = view_rx.borrow_and_update().clone();
            terminal.draw(|frame| host.regions = view::draw(frame, &view, &host.name_input))?;
            host.name_modal_open = view.hud.name_modal.is_some();
            host.splash = view.hud.splash;
        }

        tokio::select! {
            changed = view_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            maybe_event = reader.next() => {
                let Some(event) = maybe_event else {
                    break;
                };
                let event = event.context("failed to read terminal event")?;
                match host.translate(event) {
                    HostAction::Quit => break,
                    HostAction::Send(events) => {
                        for event in events {
                            if !handle.send(event).await {
                                return Ok(());
                            }
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

/// What a terminal event turns into
#[derive(Debug, PartialEq)]
enum HostAction {
    Send(Vec<SessionEvent>),
    Quit,
}

impl HostAction {
    fn one(event: SessionEvent) -> Self {
        HostAction::Send(vec![event])
    }

    fn none() -> Self {
        HostAction::Send(Vec::new())
    }
}

/// Host-side bits that are not game state
struct HostState {
    key_release: bool,
    regions: Regions,
    name_input: String,
    name_modal_open: bool,
    splash: bool,
    /// Mouse pressed inside the joystick; drags keep reporting until release
    pointer_captured: bool,
}

impl HostState {
    fn new(key_release: bool) -> Self {
        Self {
            key_release,
            regions: Regions::default(),
            name_input: String::new(),
            name_modal_open: false,
            splash: true,
            pointer_captured: false,
        }
    }

    fn translate(&mut self, event: Event) -> HostAction {
        match event {
            Event::Key(key) => self.translate_key(key),
            Event::Mouse(mouse) => self.translate_mouse(mouse),
            _ => HostAction::none(),
        }
    }

    fn translate_key(&mut self, key: KeyEvent) -> HostAction {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return HostAction::Quit;
        }

        if let Some(arrow) = arrow_key(key.code) {
            if self.splash || self.name_modal_open {
                return HostAction::none();
            }
            return match key.kind {
                KeyEventKind::Press if self.key_release => {
                    HostAction::one(SessionEvent::KeyDown(arrow))
                }
                KeyEventKind::Press => HostAction::one(SessionEvent::KeyDownExclusive(arrow)),
                KeyEventKind::Release => HostAction::one(SessionEvent::KeyUp(arrow)),
                KeyEventKind::Repeat => HostAction::none(),
            };
        }

        if key.kind != KeyEventKind::Press {
            return HostAction::none();
        }

        if self.splash {
            return match key.code {
                KeyCode::Enter => HostAction::one(SessionEvent::Begin),
                KeyCode::Esc | KeyCode::Char('q') => HostAction::Quit,
                _ => HostAction::none(),
            };
        }

        if self.name_modal_open {
            return match key.code {
                KeyCode::Enter => HostAction::one(SessionEvent::SubmitName(self.name_input.clone())),
                KeyCode::Backspace => {
                    self.name_input.pop();
                    HostAction::one(SessionEvent::EditName(self.name_input.clone()))
                }
                KeyCode::Char(c) => {
                    self.name_input.push(c);
                    HostAction::one(SessionEvent::EditName(self.name_input.clone()))
                }
                KeyCode::Esc => HostAction::Quit,
                _ => HostAction::none(),
            };
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => HostAction::Quit,
            KeyCode::Char('r') => HostAction::one(SessionEvent::Reset),
            KeyCode::Char('s') => HostAction::one(SessionEvent::SwitchRole),
            KeyCode::Char('k') => HostAction::one(SessionEvent::SelectInput(InputMethod::Keyboard)),
            KeyCode::Char('j') => HostAction::one(SessionEvent::SelectInput(InputMethod::Joystick)),
            _ => HostAction::none(),
        }
    }

    fn translate_mouse(&mut self, mouse: MouseEvent) -> HostAction {
        if self.splash || self.name_modal_open {
            return HostAction::none();
        }
        let area = self.regions.joystick;
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if !contains(area, mouse.column, mouse.row) {
                    return HostAction::none();
                }
                self.pointer_captured = true;
                HostAction::one(SessionEvent::PointerDown(pointer_offset(
                    area,
                    mouse.column,
                    mouse.row,
                )))
            }
            MouseEventKind::Drag(MouseButton::Left) if self.pointer_captured => HostAction::one(
                SessionEvent::PointerMove(pointer_offset(area, mouse.column, mouse.row)),
            ),
            MouseEventKind::Up(MouseButton::Left) if self.pointer_captured => {
                self.pointer_captured = false;
                HostAction::one(SessionEvent::PointerUp)
            }
            _ => HostAction::none(),
        }
    }
}

fn arrow_key(code: KeyCode) -> Option<ArrowKey> {
    match code {
        KeyCode::Up => Some(ArrowKey::Up),
        KeyCode::Down => Some(ArrowKey::Down),
        KeyCode::Left => Some(ArrowKey::Left),
        KeyCode::Right => Some(ArrowKey::Right),
        _ => None,
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.x + area.width && row >= area.y && row < area.y + area.height
}

/// Cell position → offset from the widget center in joystick units (y down)
fn pointer_offset(area: Rect, column: u16, row: u16) -> KnobOffset {
    let half_w = (area.width.max(1) as f64) / 2.0;
    let half_h = (area.height.max(1) as f64) / 2.0;
    let cx = area.x as f64 + half_w;
    let cy = area.y as f64 + half_h;
    // sample the middle of the cell
    let px = column as f64 + 0.5;
    let py = row as f64 + 0.5;
    KnobOffset {
        x: (px - cx) / half_w * JOYSTICK_RADIUS,
        y: (py - cy) / half_h * JOYSTICK_RADIUS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn playing_host(key_release: bool) -> HostState {
        let mut host = HostState::new(key_release);
        host.splash = false;
        host.regions.joystick = Rect::new(10, 10, 20, 10);
        host
    }

    struct BrokenTerminal;

    impl io::Write for BrokenTerminal {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn failed_screen_setup_leaves_raw_mode() {
        let mut left_raw = false;
        let result = enter_screen(&mut BrokenTerminal, || {
            left_raw = true;
            Ok(())
        });
        assert!(result.is_err());
        assert!(left_raw);

        let mut left_raw = false;
        let mut out = Vec::new();
        enter_screen(&mut out, || {
            left_raw = true;
            Ok(())
        })
        .unwrap();
        assert!(!left_raw);
        assert!(!out.is_empty());
    }

    #[test]
    fn splash_enter_begins() {
        let mut host = HostState::new(false);
        assert_eq!(
            host.translate(key(KeyCode::Enter, KeyEventKind::Press)),
            HostAction::one(SessionEvent::Begin)
        );
        assert_eq!(
            host.translate(key(KeyCode::Up, KeyEventKind::Press)),
            HostAction::none()
        );
    }

    #[test]
    fn arrows_respect_release_support() {
        let mut host = playing_host(true);
        assert!(matches!(
            host.translate(key(KeyCode::Left, KeyEventKind::Press)),
            HostAction::Send(ref v) if matches!(v[..], [SessionEvent::KeyDown(ArrowKey::Left)])
        ));
        assert!(matches!(
            host.translate(key(KeyCode::Left, KeyEventKind::Release)),
            HostAction::Send(ref v) if matches!(v[..], [SessionEvent::KeyUp(ArrowKey::Left)])
        ));

        let mut host = playing_host(false);
        assert!(matches!(
            host.translate(key(KeyCode::Up, KeyEventKind::Press)),
            HostAction::Send(ref v) if matches!(v[..], [SessionEvent::KeyDownExclusive(ArrowKey::Up)])
        ));
    }

    #[test]
    fn name_entry_edits_and_submits() {
        let mut host = playing_host(false);
        host.name_modal_open = true;
        host.translate(key(KeyCode::Char('a'), KeyEventKind::Press));
        host.translate(key(KeyCode::Char('b'), KeyEventKind::Press));
        host.translate(key(KeyCode::Backspace, KeyEventKind::Press));
        assert_eq!(host.name_input, "a");
        assert!(matches!(
            host.translate(key(KeyCode::Enter, KeyEventKind::Press)),
            HostAction::Send(ref v) if matches!(&v[..], [SessionEvent::SubmitName(name)] if name == "a")
        ));
        // 'q' is text while the modal is open
        assert_ne!(
            host.translate(key(KeyCode::Char('q'), KeyEventKind::Press)),
            HostAction::Quit
        );
    }

    #[test]
    fn mouse_outside_joystick_is_ignored() {
        let mut host = playing_host(false);
        assert_eq!(
            host.translate(mouse(MouseEventKind::Down(MouseButton::Left), 0, 0)),
            HostAction::none()
        );
        assert_eq!(
            host.translate(mouse(MouseEventKind::Drag(MouseButton::Left), 15, 15)),
            HostAction::none()
        );
    }

    #[test]
    fn drag_keeps_capture_outside_widget() {
        let mut host = playing_host(false);
        let down = host.translate(mouse(MouseEventKind::Down(MouseButton::Left), 20, 15));
        assert!(matches!(
            down,
            HostAction::Send(ref v) if matches!(v[..], [SessionEvent::PointerDown(_)])
        ));
        let drag = host.translate(mouse(MouseEventKind::Drag(MouseButton::Left), 80, 2));
        assert!(matches!(
            drag,
            HostAction::Send(ref v) if matches!(v[..], [SessionEvent::PointerMove(_)])
        ));
        assert!(matches!(
            host.translate(mouse(MouseEventKind::Up(MouseButton::Left), 80, 2)),
            HostAction::Send(ref v) if matches!(v[..], [SessionEvent::PointerUp])
        ));
    }

    #[test]
    fn pointer_offset_is_centered() {
        let area = Rect::new(0, 0, 20, 10);
        // cell 10,5 samples at 10.5,5.5, just right of and below center
        let offset = pointer_offset(area, 10, 5);
        assert!(offset.x > 0.0 && offset.y > 0.0);
        let offset = pointer_offset(area, 0, 0);
        assert!(offset.x < -40.0 && offset.y < -40.0);
    }
}
