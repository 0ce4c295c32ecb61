use std::f64::consts::PI;

use anyhow::Result;

use crate::Position;

/// Animations assume one step per frame at roughly 60 frames per second.
pub const TICK_MS: f64 = 16.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EaseOptions {
    pub start: Position,
    pub end: Position,
    pub duration_ms: f64,
}

impl Default for EaseOptions {
    fn default() -> Self {
        Self {
            start: Position::new(0.0, 0.0),
            end: Position::new(1.0, 1.0),
            duration_ms: 200.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    /// Somewhere between the start and end
    Moving(Position),
    /// Exactly the end position. Always the last step.
    Arrived(Position),
}

impl Step {
    pub fn position(self) -> Position {
        match self {
            Step::Moving(pos) | Step::Arrived(pos) => pos,
        }
    }
}

/// Moves from one position to another along a sine-squared speed curve: zero velocity at both
/// ends, fastest halfway through. Purely numeric; something else decides when to tick.
#[derive(Clone, Debug)]
pub struct EaseSession {
    end: Position,
    step_count: f64,
    increment_lat: f64,
    increment_lng: f64,
    phase_increment: f64,

    current: Position,
    phase: f64,
    done: bool,
}

impl EaseSession {
    pub fn new(options: EaseOptions) -> Result<Self> {
        let EaseOptions {
            start,
            end,
            duration_ms,
        } = options;
        // Must be positive and finite
        if !duration_ms.is_finite() || duration_ms <= 0.0 {
            bail!("Easing needs a positive duration, not {duration_ms}ms");
        }
        if !start.is_finite() || !end.is_finite() {
            bail!("Can't ease from {start:?} to {end:?}");
        }

        let step_count = duration_ms / TICK_MS;
        Ok(Self {
            end,
            step_count,
            increment_lat: (end.lat - start.lat) / step_count,
            increment_lng: (end.lng - start.lng) / step_count,
            phase_increment: PI / step_count,

            current: start,
            phase: 0.0,
            done: false,
        })
    }

    /// Not necessarily a whole number. Durations under one tick finish on the first step.
    pub fn step_count(&self) -> f64 {
        self.step_count
    }

    /// Goes from 0 up to (at least) pi.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// None once the session has arrived.
    pub fn tick(&mut self) -> Option<Step> {
        if self.done {
            return None;
        }

        self.phase += self.phase_increment;
        let rate = 2.0 * self.phase.sin().powi(2);
        self.current = Position::new(
            self.current.lat + self.increment_lat * rate,
            self.current.lng + self.increment_lng * rate,
        );

        if self.phase < PI {
            Some(Step::Moving(self.current))
        } else {
            // The exact end, not the accumulated value
            self.done = true;
            Some(Step::Arrived(self.end))
        }
    }
}

impl Iterator for EaseSession {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        self.tick()
    }
}
