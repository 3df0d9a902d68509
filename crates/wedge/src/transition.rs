//! Twist transition: a full turn that defers the item-set swap to its end.

pub const DEFAULT_DURATION_MS: i64 = 400;
pub const FULL_TURN_DEG: f64 = 360.0;

/// The two ring groups turn in opposite directions while twisting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationGroup {
    Clockwise,
    CounterClockwise,
}

impl RotationGroup {
    pub fn apply(&self, degrees: f64) -> f64 {
        match self {
            RotationGroup::Clockwise => degrees,
            RotationGroup::CounterClockwise => -degrees,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionState {
    Idle,
    Rotating,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Frame<T> {
    Idle,
    Rotating { degrees: f64 },
    /// The animation just finished; apply `T` now. Rotation is back to 0.
    Completed(T),
}

#[derive(Debug)]
enum Phase<T> {
    Idle,
    Rotating { started_at_ms: i64, target: T },
}

#[derive(Debug)]
pub struct TransitionController<T> {
    duration_ms: i64,
    phase: Phase<T>,
    degrees: f64,
}

impl<T> Default for TransitionController<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_MS)
    }
}

impl<T> TransitionController<T> {
    pub fn new(duration_ms: i64) -> Self {
        Self {
            duration_ms: duration_ms.max(1),
            phase: Phase::Idle,
            degrees: 0.0,
        }
    }

    pub fn state(&self) -> TransitionState {
        match self.phase {
            Phase::Idle => TransitionState::Idle,
            Phase::Rotating { .. } => TransitionState::Rotating,
        }
    }

    pub fn is_rotating(&self) -> bool {
        self.state() == TransitionState::Rotating
    }

    pub fn target(&self) -> Option<&T> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Rotating { target, .. } => Some(target),
        }
    }

    /// Current rotation in degrees; 0 when idle.
    pub fn degrees(&self) -> f64 {
        self.degrees
    }

    /// Begins twisting towards `target`. Returns `false` and keeps the
    /// running target if a transition is already in flight.
    pub fn start(&mut self, target: T, now_ms: i64) -> bool {
        if self.is_rotating() {
            return false;
        }
        self.phase = Phase::Rotating {
            started_at_ms: now_ms,
            target,
        };
        self.degrees = 0.0;
        true
    }

    /// Advances by wall clock.
    pub fn tick(&mut self, now_ms: i64) -> Frame<T> {
        let progress = match &self.phase {
            Phase::Idle => return Frame::Idle,
            Phase::Rotating { started_at_ms, .. } => {
                (now_ms - started_at_ms) as f64 / self.duration_ms as f64
            }
        };
        self.advance(progress)
    }

    /// Advances to `progress` in `[0, 1]`; values outside are clamped.
    pub fn advance(&mut self, progress: f64) -> Frame<T> {
        if !self.is_rotating() {
            return Frame::Idle;
        }
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        if progress < 1.0 {
            self.degrees = FULL_TURN_DEG * progress;
            return Frame::Rotating {
                degrees: self.degrees,
            };
        }
        self.degrees = 0.0;
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Rotating { target, .. } => Frame::Completed(target),
            Phase::Idle => Frame::Idle,
        }
    }
}
