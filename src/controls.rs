//! Keyboard-driven debug parameters for the morph geometry.
//!
//! The viewer exposes four named parameters with fixed bounds and step sizes:
//!
//! | Parameter         | Min | Max | Step  | On change      |
//! |-------------------|-----|-----|-------|----------------|
//! | `radius`          | 0   | 10  | 0.1   | rebuild        |
//! | `width_segments`  | 1   | 256 | 1     | rebuild        |
//! | `height_segments` | 1   | 256 | 1     | rebuild        |
//! | `transition`      | 0   | 1   | 0.001 | set transition |
//!
//! [`ControlPanel`] keeps the current values and turns edits into
//! [`ControlChange`] events, which the app forwards to
//! [`MorphGeometry::rebuild`](crate::MorphGeometry::rebuild) or
//! [`MorphGeometry::set_transition`](crate::MorphGeometry::set_transition).

use winit::keyboard::KeyCode;

use crate::input::Input;
use crate::morph::MorphParameters;

/// Bounds and step size of one numeric parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl ParamSpec {
    /// Clamps into `[min, max]` without snapping. Non-finite input maps to `min`.
    pub fn bound(&self, value: f32) -> f32 {
        if value.is_finite() {
            value.clamp(self.min, self.max)
        } else {
            self.min
        }
    }

    /// Clamps into `[min, max]` and snaps onto the step grid starting at `min`.
    /// Non-finite input maps to `min`.
    pub fn clamp(&self, value: f32) -> f32 {
        if !value.is_finite() {
            return self.min;
        }
        let steps = ((self.bound(value) - self.min) / self.step).round();
        (self.min + steps * self.step).clamp(self.min, self.max)
    }

    /// `value` moved by `steps` increments, clamped.
    pub fn nudge(&self, value: f32, steps: i32) -> f32 {
        self.clamp(value + steps as f32 * self.step)
    }
}

pub const RADIUS: ParamSpec = ParamSpec {
    name: "radius",
    min: 0.0,
    max: 10.0,
    step: 0.1,
};

pub const WIDTH_SEGMENTS: ParamSpec = ParamSpec {
    name: "width_segments",
    min: 1.0,
    max: 256.0,
    step: 1.0,
};

pub const HEIGHT_SEGMENTS: ParamSpec = ParamSpec {
    name: "height_segments",
    min: 1.0,
    max: 256.0,
    step: 1.0,
};

pub const TRANSITION: ParamSpec = ParamSpec {
    name: "transition",
    min: 0.0,
    max: 1.0,
    step: 0.001,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Param {
    Radius,
    WidthSegments,
    HeightSegments,
    Transition,
}

impl Param {
    pub const ALL: [Param; 4] = [
        Param::Radius,
        Param::WidthSegments,
        Param::HeightSegments,
        Param::Transition,
    ];

    pub fn spec(self) -> &'static ParamSpec {
        match self {
            Param::Radius => &RADIUS,
            Param::WidthSegments => &WIDTH_SEGMENTS,
            Param::HeightSegments => &HEIGHT_SEGMENTS,
            Param::Transition => &TRANSITION,
        }
    }

    /// The next parameter in [`Param::ALL`], wrapping around.
    pub fn next(self) -> Param {
        let i = Param::ALL.iter().position(|&p| p == self).unwrap_or(0);
        Param::ALL[(i + 1) % Param::ALL.len()]
    }
}

/// What the geometry has to do after a parameter edit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlChange {
    Rebuild {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Transition(f32),
}

/// Current parameter values plus the parameter the arrow keys edit.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlPanel {
    radius: f32,
    width_segments: u32,
    height_segments: u32,
    transition: f32,
    selected: Param,
}

impl ControlPanel {
    /// Starts from `parameters`, clamped into the panel's bounds.
    pub fn new(parameters: &MorphParameters) -> Self {
        Self {
            radius: RADIUS.clamp(parameters.radius),
            width_segments: WIDTH_SEGMENTS.clamp(parameters.width_segments as f32) as u32,
            height_segments: HEIGHT_SEGMENTS.clamp(parameters.height_segments as f32) as u32,
            transition: TRANSITION.clamp(parameters.transition),
            selected: Param::Transition,
        }
    }

    pub fn value(&self, param: Param) -> f32 {
        match param {
            Param::Radius => self.radius,
            Param::WidthSegments => self.width_segments as f32,
            Param::HeightSegments => self.height_segments as f32,
            Param::Transition => self.transition,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn width_segments(&self) -> u32 {
        self.width_segments
    }

    pub fn height_segments(&self) -> u32 {
        self.height_segments
    }

    pub fn transition(&self) -> f32 {
        self.transition
    }

    pub fn selected(&self) -> Param {
        self.selected
    }

    pub fn select(&mut self, param: Param) {
        self.selected = param;
    }

    pub fn select_next(&mut self) {
        self.selected = self.selected.next();
    }

    /// Sets `param` to `value` (clamped). Returns `None` if nothing changed.
    pub fn set(&mut self, param: Param, value: f32) -> Option<ControlChange> {
        let value = param.spec().clamp(value);
        if value == self.value(param) {
            return None;
        }

        match param {
            Param::Radius => self.radius = value,
            Param::WidthSegments => self.width_segments = value as u32,
            Param::HeightSegments => self.height_segments = value as u32,
            Param::Transition => {
                self.transition = value;
                return Some(ControlChange::Transition(value));
            }
        }

        Some(ControlChange::Rebuild {
            radius: self.radius,
            width_segments: self.width_segments,
            height_segments: self.height_segments,
        })
    }

    /// Moves `param` by `steps` increments.
    pub fn adjust(&mut self, param: Param, steps: i32) -> Option<ControlChange> {
        let value = param.spec().nudge(self.value(param), steps);
        self.set(param, value)
    }

    /// Applies this frame's key presses.
    ///
    /// `Tab` cycles the selection, arrows step it (`Shift` for ten steps),
    /// `0` and `1` snap the transition to the plane or the sphere.
    pub fn apply_input(&mut self, input: &Input) -> Vec<ControlChange> {
        let mut changes = Vec::new();

        if input.key_pressed(KeyCode::Tab) {
            self.select_next();
        }

        let scale = if input.shift_down() { 10 } else { 1 };
        let mut steps = 0;
        if input.key_pressed(KeyCode::ArrowUp) || input.key_pressed(KeyCode::ArrowRight) {
            steps += scale;
        }
        if input.key_pressed(KeyCode::ArrowDown) || input.key_pressed(KeyCode::ArrowLeft) {
            steps -= scale;
        }
        if steps != 0 {
            changes.extend(self.adjust(self.selected, steps));
        }

        if input.key_pressed(KeyCode::Digit0) {
            changes.extend(self.set(Param::Transition, 0.0));
        }
        if input.key_pressed(KeyCode::Digit1) {
            changes.extend(self.set(Param::Transition, 1.0));
        }

        changes
    }

    /// One-line description for the window title.
    pub fn summary(&self) -> String {
        Param::ALL
            .iter()
            .map(|&p| {
                let marker = if p == self.selected { ">" } else { "" };
                match p {
                    Param::Radius => format!("{marker}radius {:.1}", self.radius),
                    Param::WidthSegments => format!("{marker}width {}", self.width_segments),
                    Param::HeightSegments => format!("{marker}height {}", self.height_segments),
                    Param::Transition => format!("{marker}transition {:.3}", self.transition),
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    }
}

/// Drives the transition back and forth between plane and sphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionAnimator {
    /// Transition units per second.
    pub speed: f32,
    direction: f32,
    pub enabled: bool,
}

impl TransitionAnimator {
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            direction: 1.0,
            enabled: false,
        }
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    /// Next transition value after `dt` seconds, bouncing off 0 and 1.
    /// Returns `None` while disabled.
    pub fn advance(&mut self, current: f32, dt: f32) -> Option<f32> {
        if !self.enabled {
            return None;
        }

        let mut next = current + self.direction * self.speed * dt;
        if next >= 1.0 {
            next = 2.0 - next;
            self.direction = -1.0;
        } else if next <= 0.0 {
            next = -next;
            self.direction = 1.0;
        }
        Some(next.clamp(0.0, 1.0))
    }
}
