//! Obstacle stop.

use crate::display::{self, OBSTACLE};
use crate::error::RobotError;
use crate::hardware::{Brick, InputPort, LedPattern, Outputs};

use log::{trace, warn};

/// Result of one guard sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardStatus {
    /// Nothing in range; the caller may drive.
    Clear,
    /// An obstacle is in range; the drive motors have been halted.
    Blocked {
        /// The proximity reading that triggered the stop.
        proximity: i32,
    },
}

impl GuardStatus {
    /// Whether the robot must stay put.
    pub fn is_blocked(&self) -> bool {
        matches!(self, GuardStatus::Blocked { .. })
    }
}

/// Halts the drive motors while the proximity sensor reads above a threshold.
///
/// Each [`check`](Self::check) takes one sample. Callers loop on it for as
/// long as it reports [`GuardStatus::Blocked`], so the wait stays inside their
/// own loop and remains cancellable.
#[derive(Debug, Clone)]
pub struct ObstructionGuard {
    sensor: InputPort,
    drive: Outputs,
    threshold: i32,
}

impl ObstructionGuard {
    /// Guard `drive` using the sensor on `sensor`.
    pub fn new(sensor: InputPort, drive: Outputs, threshold: i32) -> Self {
        Self {
            sensor,
            drive,
            threshold,
        }
    }

    /// Readings strictly above this value block.
    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    /// Take one proximity sample, halting the drive motors if blocked.
    pub fn check<B: Brick + ?Sized>(&self, brick: &B) -> Result<GuardStatus, RobotError> {
        let proximity = brick.read_sensor(self.sensor)?;
        if proximity <= self.threshold {
            trace!("path clear (proximity {})", proximity);
            return Ok(GuardStatus::Clear);
        }

        warn!("obstacle detected (proximity {} > {})", proximity, self.threshold);
        brick.set_led(LedPattern::Red)?;
        display::draw(brick, &OBSTACLE)?;
        brick.off(self.drive)?;
        Ok(GuardStatus::Blocked { proximity })
    }
}
