//! Scene drawing: trails, agents and the capture radius

use crate::game::{GameState, Trail};

use super::{Rgba, Surface};

/// Canvas edge length in pixels; normalized coordinates are scaled by this
pub const CANVAS_SIZE: f64 = 500.0;

const PREY_COLOR: Rgba = Rgba::new(0, 0, 255, 1.0);
const PREDATOR_COLOR: Rgba = Rgba::new(255, 0, 0, 1.0);

const MARKER_RADIUS: f64 = 10.0;
/// Capture radius in normalized units
const CAPTURE_RADIUS: f64 = 0.2;
const CAPTURE_ALPHA: f64 = 0.2;
const TRAIL_LINE_ALPHA: f64 = 0.4;
const TRAIL_LINE_WIDTH: f64 = 2.0;

/// Map a normalized position to pixels, flipping y
pub fn to_pixels((x, y): (f64, f64)) -> (f64, f64) {
    (x * CANVAS_SIZE, (1.0 - y) * CANVAS_SIZE)
}

/// Draw one frame. Holds no state between calls.
pub fn draw_scene<S: Surface + ?Sized>(
    surface: &mut S,
    state: &GameState,
    prey_trail: &Trail,
    predator_trail: &Trail,
) {
    surface.clear();

    draw_trail(surface, prey_trail, PREY_COLOR);
    draw_trail(surface, predator_trail, PREDATOR_COLOR);

    surface.fill_circle(to_pixels(state.prey()), MARKER_RADIUS, PREY_COLOR);

    let predator = to_pixels(state.predator());
    surface.fill_circle(
        predator,
        CAPTURE_RADIUS * CANVAS_SIZE,
        PREDATOR_COLOR.with_alpha(CAPTURE_ALPHA),
    );
    surface.fill_circle(predator, MARKER_RADIUS, PREDATOR_COLOR);
}

/// Faded polyline plus dots that grow and brighten toward the newest point
fn draw_trail<S: Surface + ?Sized>(surface: &mut S, trail: &Trail, color: Rgba) {
    if trail.is_empty() {
        return;
    }

    let points: Vec<(f64, f64)> = trail.iter().map(|p| to_pixels(*p)).collect();
    surface.stroke_polyline(&points, color.with_alpha(TRAIL_LINE_ALPHA), TRAIL_LINE_WIDTH);

    let len = points.len() as f64;
    for (i, point) in points.iter().enumerate() {
        let alpha = i as f64 / len;
        surface.fill_circle(*point, 2.0 + 4.0 * alpha, color.with_alpha(alpha));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DisplayList, DrawCmd};

    #[test]
    fn maps_and_flips_y() {
        assert_eq!(to_pixels((0.0, 0.0)), (0.0, 500.0));
        assert_eq!(to_pixels((1.0, 1.0)), (500.0, 0.0));
        assert_eq!(to_pixels((0.25, 0.75)), (125.0, 125.0));
    }

    #[test]
    fn draws_agents_without_trails() {
        let state = GameState::new([0.0, 0.25, 0.5, 0.5, 0.75]);
        let mut list = DisplayList::new();
        draw_scene(&mut list, &state, &Trail::new(), &Trail::new());

        let cmds = list.commands();
        assert_eq!(cmds.len(), 4);
        assert_eq!(cmds[0], DrawCmd::Clear);
        assert_eq!(
            cmds[1],
            DrawCmd::Circle {
                center: (125.0, 250.0),
                radius: 10.0,
                color: PREY_COLOR,
            }
        );
        match &cmds[2] {
            DrawCmd::Circle { center, radius, color } => {
                assert_eq!(*center, (250.0, 125.0));
                assert_eq!(*radius, 100.0);
                assert_eq!(color.a, 0.2);
            }
            other => panic!("expected capture disc, got {other:?}"),
        }
    }

    #[test]
    fn trail_dots_grow_with_recency() {
        let state = GameState::new([0.0; 5]);
        let mut prey = Trail::new();
        for i in 0..4 {
            prey.push((i as f64 * 0.1, 0.5));
        }
        let mut list = DisplayList::new();
        draw_scene(&mut list, &state, &prey, &Trail::new());

        let cmds = list.commands();
        match &cmds[1] {
            DrawCmd::Polyline { points, color, width } => {
                assert_eq!(points.len(), 4);
                assert_eq!(color.a, 0.4);
                assert_eq!(*width, 2.0);
            }
            other => panic!("expected polyline, got {other:?}"),
        }

        let radii: Vec<f64> = cmds[2..6]
            .iter()
            .map(|cmd| match cmd {
                DrawCmd::Circle { radius, .. } => *radius,
                other => panic!("expected dot, got {other:?}"),
            })
            .collect();
        assert_eq!(radii, vec![2.0, 3.0, 4.0, 5.0]);
    }
}
