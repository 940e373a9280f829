//! On/off line-following controller.
//!
//! The robot tracks the edge of a line: readings above the threshold turn it
//! right, everything else turns it left. There is no hysteresis, so it
//! oscillates around the edge.

use crate::error::RobotError;
use crate::hardware::{Brick, InputPort, LedPattern, Outputs};
use crate::obstruction::{GuardStatus, ObstructionGuard};

use log::debug;

/// Steering direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steer {
    /// Right wheel fast, left wheel slow.
    Right,
    /// Right wheel slow, left wheel fast.
    Left,
}

impl Steer {
    /// Indicator pattern shown while steering this way.
    pub fn led(self) -> LedPattern {
        match self {
            Steer::Right => LedPattern::Green,
            Steer::Left => LedPattern::Red,
        }
    }
}

/// Decide the steering direction. The boundary steers left.
pub fn steer(reading: i32, threshold: i32) -> Steer {
    if reading > threshold {
        Steer::Right
    } else {
        Steer::Left
    }
}

/// Outcome of one follower step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowStatus {
    /// A steering command was issued.
    Steered {
        /// Direction taken.
        steer: Steer,
        /// Color reading the decision was based on.
        reading: i32,
    },
    /// The obstruction guard stopped the robot; nothing was steered.
    Blocked {
        /// The proximity reading that triggered the stop.
        proximity: i32,
    },
}

/// Differential-drive line follower.
#[derive(Debug, Clone)]
pub struct LineFollower {
    sensor: InputPort,
    right_wheel: Outputs,
    left_wheel: Outputs,
    fast: i8,
    slow: i8,
}

impl LineFollower {
    /// Create a follower reading `sensor` and driving the two wheels.
    pub fn new(sensor: InputPort, right_wheel: Outputs, left_wheel: Outputs, fast: i8, slow: i8) -> Self {
        Self {
            sensor,
            right_wheel,
            left_wheel,
            fast,
            slow,
        }
    }

    /// Wheel speeds `(right, left)` for a direction.
    pub fn wheel_speeds(&self, steer: Steer) -> (i8, i8) {
        match steer {
            Steer::Right => (self.fast, self.slow),
            Steer::Left => (self.slow, self.fast),
        }
    }

    /// Run one control iteration against `threshold`.
    ///
    /// The guard is consulted first; while it reports an obstacle no steering
    /// command is issued.
    pub fn step<B: Brick + ?Sized>(
        &self,
        brick: &B,
        guard: &ObstructionGuard,
        threshold: i32,
    ) -> Result<FollowStatus, RobotError> {
        if let GuardStatus::Blocked { proximity } = guard.check(brick)? {
            return Ok(FollowStatus::Blocked { proximity });
        }

        let reading = brick.read_sensor(self.sensor)?;
        let direction = steer(reading, threshold);
        let (right, left) = self.wheel_speeds(direction);
        debug!(
            "reading {} vs threshold {}: steer {:?} (right={}, left={})",
            reading, threshold, direction, right, left
        );

        brick.set_speed(self.right_wheel, right)?;
        brick.set_speed(self.left_wheel, left)?;
        brick.on(self.right_wheel | self.left_wheel)?;
        brick.set_led(direction.led())?;
        Ok(FollowStatus::Steered {
            steer: direction,
            reading,
        })
    }
}
