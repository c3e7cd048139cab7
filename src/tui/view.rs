//! Terminal drawing of the session view

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line as TextLine, Span},
    widgets::{
        canvas::{Canvas, Circle, Line, Points},
        Block, Borders, Clear, Paragraph, Wrap,
    },
    Frame,
};

use crate::game::{InputMethod, Role, View};
use crate::input::KnobOffset;
use crate::render::{DrawCmd, Rgba, CANVAS_SIZE};

/// Discs at least this large are drawn as outlines (the capture radius)
const OUTLINE_RADIUS: f64 = 15.0;

/// Screen regions the input mapping needs after a draw
#[derive(Debug, Clone, Copy, Default)]
pub struct Regions {
    pub joystick: Rect,
}

/// Premultiply against the black terminal background
pub fn blend(color: Rgba) -> Color {
    let a = color.a.clamp(0.0, 1.0);
    let scale = |c: u8| (c as f64 * a).round() as u8;
    Color::Rgb(scale(color.r), scale(color.g), scale(color.b))
}

fn role_color(role: Role) -> Color {
    match role {
        Role::Predator => Color::Red,
        Role::Prey => Color::Blue,
    }
}

pub fn draw(frame: &mut Frame, view: &View, name_input: &str) -> Regions {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(34)])
        .split(frame.area());

    draw_canvas(frame, columns[0], view);
    let regions = draw_panel(frame, columns[1], view);

    if let Some(step) = view.hud.countdown {
        let area = centered(columns[0], 12, 3);
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(step.label())
                .alignment(Alignment::Center)
                .style(Style::default().add_modifier(Modifier::BOLD))
                .block(Block::default().borders(Borders::ALL)),
            area,
        );
    }

    draw_toasts(frame, columns[0], view);

    if view.hud.splash {
        let area = centered(frame.area(), 40, 5);
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new("Press Enter to start")
                .alignment(Alignment::Center)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("Prey-Predator Game"),
                ),
            area,
        );
    } else if let Some(modal) = &view.hud.name_modal {
        let area = centered(frame.area(), 40, 6);
        let mut lines = vec![
            TextLine::from("Enter your name (1-10 characters):"),
            TextLine::from(Span::styled(
                format!("> {name_input}_"),
                Style::default().add_modifier(Modifier::BOLD),
            )),
        ];
        if let Some(alert) = &modal.alert {
            lines.push(TextLine::from(Span::styled(
                alert.clone(),
                Style::default().fg(Color::Yellow),
            )));
        }
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Player")),
            area,
        );
    }

    regions
}

fn draw_canvas(frame: &mut Frame, area: Rect, view: &View) {
    let scene = &view.scene;
    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(view.hud.title()))
        .marker(Marker::Braille)
        .x_bounds([0.0, CANVAS_SIZE])
        .y_bounds([0.0, CANVAS_SIZE])
        .paint(move |ctx| {
            // canvas y grows upward, scene pixels grow downward
            let flip = |(x, y): (f64, f64)| (x, CANVAS_SIZE - y);
            for cmd in scene.commands() {
                match cmd {
                    DrawCmd::Clear => {}
                    DrawCmd::Polyline { points, color, .. } => {
                        for pair in points.windows(2) {
                            let (x1, y1) = flip(pair[0]);
                            let (x2, y2) = flip(pair[1]);
                            ctx.draw(&Line::new(x1, y1, x2, y2, blend(*color)));
                        }
                    }
                    DrawCmd::Circle {
                        center,
                        radius,
                        color,
                    } => {
                        let (x, y) = flip(*center);
                        let color = blend(*color);
                        ctx.draw(&Circle {
                            x,
                            y,
                            radius: *radius,
                            color,
                        });
                        if *radius < OUTLINE_RADIUS {
                            ctx.draw(&Circle {
                                x,
                                y,
                                radius: radius / 2.0,
                                color,
                            });
                            ctx.draw(&Points {
                                coords: &[(x, y)],
                                color,
                            });
                        }
                    }
                }
            }
        });
    frame.render_widget(canvas, area);
}

fn draw_panel(frame: &mut Frame, area: Rect, view: &View) -> Regions {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Min(4),
            Constraint::Length(12),
            Constraint::Length(7),
        ])
        .split(area);

    let hud = &view.hud;
    let timer = match &hud.timer {
        Some(timer) => Span::styled(
            timer.text(),
            Style::default().fg(if timer.urgent { Color::Red } else { Color::Green }),
        ),
        None => Span::raw("Time left: --"),
    };
    let input = match hud.input_method {
        InputMethod::Keyboard => "keyboard",
        InputMethod::Joystick => "joystick",
    };
    let info = vec![
        TextLine::from(vec![
            Span::raw("Role: "),
            Span::styled(hud.role.label(), Style::default().fg(role_color(hud.role))),
        ]),
        TextLine::from(format!(
            "Player: {}",
            hud.player_name.as_deref().unwrap_or("-")
        )),
        TextLine::from(format!("Input: {input}")),
        TextLine::from(timer),
    ];
    frame.render_widget(
        Paragraph::new(info).block(Block::default().borders(Borders::ALL).title("Game")),
        rows[0],
    );

    frame.render_widget(
        Paragraph::new(hud.status.clone())
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Status")),
        rows[1],
    );

    let joystick = draw_joystick(frame, rows[2], hud.knob);

    let help = vec![
        TextLine::from("arrows  move"),
        TextLine::from("mouse   drag joystick"),
        TextLine::from("r reset  s switch role"),
        TextLine::from("k keyboard  j joystick  q quit"),
    ];
    frame.render_widget(
        Paragraph::new(help).block(Block::default().borders(Borders::ALL).title("Keys")),
        rows[3],
    );

    Regions { joystick }
}

/// Draw the stick and return its inner area for pointer mapping
fn draw_joystick(frame: &mut Frame, area: Rect, knob: KnobOffset) -> Rect {
    let block = Block::default().borders(Borders::ALL).title("Joystick");
    let inner = block.inner(area);
    let radius = crate::game::session::JOYSTICK_RADIUS;

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([-radius, radius])
        .y_bounds([-radius, radius])
        .paint(move |ctx| {
            ctx.draw(&Circle {
                x: 0.0,
                y: 0.0,
                radius,
                color: Color::Gray,
            });
            ctx.draw(&Circle {
                x: knob.x,
                y: -knob.y,
                radius: radius / 4.0,
                color: Color::White,
            });
        });
    frame.render_widget(canvas, area);
    inner
}

fn draw_toasts(frame: &mut Frame, area: Rect, view: &View) {
    for (i, toast) in view.hud.toasts.iter().rev().take(3).enumerate() {
        let width = (toast.message.chars().count() as u16 + 4).min(area.width);
        let y = area.y + 1 + i as u16 * 3;
        if y + 3 > area.y + area.height {
            break;
        }
        let rect = Rect::new(area.x + area.width.saturating_sub(width + 1), y, width, 3);
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(toast.message.clone()).block(Block::default().borders(Borders::ALL)),
            rect,
        );
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
