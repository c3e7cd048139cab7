//! Canvas rendering of the latest game state

pub mod display_list;
pub mod scene;

pub use display_list::{DisplayList, DrawCmd};
pub use scene::{draw_scene, to_pixels, CANVAS_SIZE};

/// RGBA color, alpha in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }
}

/// Drawing surface in pixel coordinates, origin top-left, y growing downward
pub trait Surface {
    fn clear(&mut self);

    /// Stroke a connected line through `points`
    fn stroke_polyline(&mut self, points: &[(f64, f64)], color: Rgba, width: f64);

    fn fill_circle(&mut self, center: (f64, f64), radius: f64, color: Rgba);
}
