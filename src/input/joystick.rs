//! Virtual joystick: pointer drags inside a circular widget

use super::ActionAngle;

/// Knob displacement from the widget center, in screen units (y grows downward)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KnobOffset {
    pub x: f64,
    pub y: f64,
}

/// Clamp an offset to `radius` keeping its direction
pub fn clamp_offset(offset: KnobOffset, radius: f64) -> KnobOffset {
    let distance = offset.x.hypot(offset.y);
    if distance > radius && distance > 0.0 {
        let ratio = radius / distance;
        KnobOffset {
            x: offset.x * ratio,
            y: offset.y * ratio,
        }
    } else {
        offset
    }
}

/// Angle of a screen-space offset with the vertical axis flipped to math orientation.
///
/// `0.0 - y` instead of `-y` keeps a level stick pointing left at +π, not -π.
pub fn offset_angle(offset: KnobOffset) -> ActionAngle {
    (0.0 - offset.y).atan2(offset.x)
}

/// Circular drag widget with pointer capture
#[derive(Debug, Clone)]
pub struct Joystick {
    radius: f64,
    captured: bool,
    knob: KnobOffset,
}

impl Joystick {
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            captured: false,
            knob: KnobOffset::default(),
        }
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Current knob position relative to center
    pub fn knob(&self) -> KnobOffset {
        self.knob
    }

    /// Pointer down: capture and aim at the pointer
    pub fn press(&mut self, offset: KnobOffset) -> ActionAngle {
        self.captured = true;
        self.aim(offset)
    }

    /// Pointer move; ignored unless the pointer is captured
    pub fn drag(&mut self, offset: KnobOffset) -> Option<ActionAngle> {
        if !self.captured {
            return None;
        }
        Some(self.aim(offset))
    }

    /// Pointer up: release capture and recenter the knob
    pub fn release(&mut self) {
        self.captured = false;
        self.recenter();
    }

    pub fn recenter(&mut self) {
        self.knob = KnobOffset::default();
    }

    fn aim(&mut self, offset: KnobOffset) -> ActionAngle {
        self.knob = clamp_offset(offset, self.radius);
        offset_angle(self.knob)
    }
}
