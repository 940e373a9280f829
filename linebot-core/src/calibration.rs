//! Line threshold store.

use log::info;

/// The calibrated color-sensor threshold.
///
/// Zero until the first capture. Captures overwrite unconditionally; the
/// value is never range checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calibration {
    threshold: i32,
    captures: u32,
}

impl Calibration {
    /// Store `reading` as the new threshold.
    pub fn capture(&mut self, reading: i32) {
        self.threshold = reading;
        self.captures = self.captures.saturating_add(1);
        info!("calibrated threshold: {} (capture #{})", reading, self.captures);
    }

    /// The current threshold.
    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    /// How many captures have been taken since start.
    pub fn captures(&self) -> u32 {
        self.captures
    }

    /// Whether a capture has been taken since start.
    pub fn is_calibrated(&self) -> bool {
        self.captures > 0
    }
}
