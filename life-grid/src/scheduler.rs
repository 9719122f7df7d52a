use crate::matrix::CellMatrix;
use log::trace;

const DEFAULT_SPEED: f64 = 20.0;

/// Allowed range for [`Speed`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedBounds {
    pub min: f64,
    pub max: f64,
}

impl SpeedBounds {
    pub fn new(min: f64, max: f64) -> Self {
        assert!(
            min > 0.0 && min <= max && max.is_finite(),
            "Speed bounds must satisfy 0 < min <= max, got [{min}, {max}]"
        );
        Self { min, max }
    }

    /// NaN maps to `min`.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        }
    }
}

impl Default for SpeedBounds {
    fn default() -> Self {
        Self::new(1.0, 100.0)
    }
}

/// Hundredths of a tick per frame; 100 means one tick every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Speed {
    value: f64,
    bounds: SpeedBounds,
}

impl Speed {
    pub fn new(value: f64, bounds: SpeedBounds) -> Self {
        Self {
            value: bounds.clamp(value),
            bounds,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn bounds(&self) -> SpeedBounds {
        self.bounds
    }

    /// Returns the clamped value actually stored.
    pub fn set(&mut self, value: f64) -> f64 {
        self.value = self.bounds.clamp(value);
        self.value
    }

    pub fn adjust(&mut self, delta: f64) -> f64 {
        self.set(self.value + delta)
    }

    pub fn progress_per_frame(&self) -> f64 {
        self.value / 100.0
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED, SpeedBounds::default())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameOutcome {
    pub ticked: bool,
    pub progress: f64,
}

/// Converts a stream of frames into ticks.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    progress: f64,
    speed: Speed,
}

impl Scheduler {
    pub fn new(speed: Speed) -> Self {
        Self {
            progress: 0.0,
            speed,
        }
    }

    /// Always in `[0, 1)`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn set_speed(&mut self, value: f64) -> f64 {
        self.speed.set(value)
    }

    pub fn adjust_speed(&mut self, delta: f64) -> f64 {
        self.speed.adjust(delta)
    }

    /// Advances by one frame, ticking `matrix` at most once. If more than a
    /// whole tick has built up, the extra ticks are dropped.
    pub fn advance_frame(&mut self, matrix: &mut CellMatrix) -> FrameOutcome {
        self.progress += self.speed.progress_per_frame();
        let whole_ticks = self.progress.floor();
        let ticked = whole_ticks >= 1.0;
        if ticked {
            if whole_ticks > 1.0 {
                trace!("Collapsing {whole_ticks} ticks into one");
            }
            matrix.tick();
        }
        self.progress -= whole_ticks;
        FrameOutcome {
            ticked,
            progress: self.progress,
        }
    }
}
