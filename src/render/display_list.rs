//! Recording surface; the host replays it onto the terminal canvas

use super::{Rgba, Surface};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear,
    Polyline {
        points: Vec<(f64, f64)>,
        color: Rgba,
        width: f64,
    },
    Circle {
        center: (f64, f64),
        radius: f64,
        color: Rgba,
    },
}

/// Draw commands of one frame, in paint order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    commands: Vec<DrawCmd>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Surface for DisplayList {
    /// Clearing drops everything painted so far
    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCmd::Clear);
    }

    fn stroke_polyline(&mut self, points: &[(f64, f64)], color: Rgba, width: f64) {
        if points.len() < 2 {
            return;
        }
        self.commands.push(DrawCmd::Polyline {
            points: points.to_vec(),
            color,
            width,
        });
    }

    fn fill_circle(&mut self, center: (f64, f64), radius: f64, color: Rgba) {
        self.commands.push(DrawCmd::Circle {
            center,
            radius,
            color,
        });
    }
}
