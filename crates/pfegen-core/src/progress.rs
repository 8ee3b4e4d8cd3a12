//! Cosmetic progress indicator. Not tied to real request progress.

pub const PROGRESS_MAX: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressTicker {
    value: u8,
    step: u8,
    running: bool,
}

impl ProgressTicker {
    pub fn new(step: u8) -> Self {
        Self {
            value: 0,
            step: step.max(1),
            running: false,
        }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Fraction in `0.0..=1.0`, for gauges.
    pub fn ratio(&self) -> f64 {
        f64::from(self.value) / f64::from(PROGRESS_MAX)
    }

    /// Restart from zero.
    pub fn start(&mut self) {
        self.value = 0;
        self.running = true;
    }

    /// Advance one step. Returns whether the ticker is still running; it
    /// stops itself on reaching the max, and further ticks are no-ops.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.value = self.value.saturating_add(self.step).min(PROGRESS_MAX);
        if self.value >= PROGRESS_MAX {
            self.running = false;
        }
        self.running
    }

    /// Halt without resetting the value.
    pub fn stop(&mut self) {
        self.running = false;
    }
}

impl Default for ProgressTicker {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_to_max_and_stops() {
        let mut ticker = ProgressTicker::new(1);
        ticker.start();
        let mut ticks = 0;
        while ticker.tick() {
            ticks += 1;
        }
        assert_eq!(ticks, 99);
        assert_eq!(ticker.value(), PROGRESS_MAX);
        assert!(!ticker.is_running());
    }

    #[test]
    fn ticks_past_max_are_no_ops() {
        let mut ticker = ProgressTicker::new(30);
        ticker.start();
        for _ in 0..10 {
            ticker.tick();
        }
        assert_eq!(ticker.value(), PROGRESS_MAX);
        assert!(!ticker.tick());
        assert_eq!(ticker.value(), PROGRESS_MAX);
    }

    #[test]
    fn overlapping_start_restarts() {
        let mut ticker = ProgressTicker::new(10);
        ticker.start();
        ticker.tick();
        ticker.tick();
        ticker.start();
        assert_eq!(ticker.value(), 0);
        assert!(ticker.is_running());
    }

    #[test]
    fn stop_freezes_value() {
        let mut ticker = ProgressTicker::new(5);
        ticker.start();
        ticker.tick();
        ticker.stop();
        assert!(!ticker.tick());
        assert_eq!(ticker.value(), 5);
        assert!((ticker.ratio() - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_step_is_clamped() {
        let mut ticker = ProgressTicker::new(0);
        ticker.start();
        ticker.tick();
        assert_eq!(ticker.value(), 1);
    }
}
