//! Timed reverse drive.

use crate::clock::Clock;
use crate::display::{self, Screen};
use crate::error::RobotError;
use crate::hardware::{Brick, Button, Outputs};

use log::{info, warn};
use std::time::Duration;

/// How a reverse run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReverseOutcome {
    /// The full duration elapsed.
    Completed {
        /// Drive commands issued.
        ticks: u32,
    },
    /// Escape was pressed before the duration elapsed.
    Aborted {
        /// Drive commands issued before the abort.
        ticks: u32,
    },
}

impl ReverseOutcome {
    /// Drive commands issued during the run.
    pub fn ticks(&self) -> u32 {
        match *self {
            ReverseOutcome::Completed { ticks } | ReverseOutcome::Aborted { ticks } => ticks,
        }
    }
}

/// Backs the robot up for a fixed time, cancellable with Escape.
#[derive(Debug, Clone)]
pub struct ReverseDriver {
    drive: Outputs,
    speed: i8,
    duration: Duration,
    tick: Duration,
}

impl ReverseDriver {
    /// Back up `drive` at `speed` (given as a positive magnitude) for
    /// `duration`, re-issuing the command every `tick`.
    pub fn new(drive: Outputs, speed: i8, duration: Duration, tick: Duration) -> Self {
        Self {
            drive,
            speed,
            duration,
            tick,
        }
    }

    /// Back up until the deadline passes or Escape is pressed.
    ///
    /// Escape is polled after every tick. The drive motors are switched off
    /// before returning.
    pub fn run<B, C>(&self, brick: &B, clock: &C) -> Result<ReverseOutcome, RobotError>
    where
        B: Brick + ?Sized,
        C: Clock + ?Sized,
    {
        let deadline = clock.now() + self.duration;
        let speed = self.speed.saturating_abs().saturating_neg();
        let mut ticks = 0u32;
        info!("backing up for {:?}", self.duration);

        let outcome = loop {
            if clock.now() >= deadline {
                break ReverseOutcome::Completed { ticks };
            }

            display::render(brick, &Screen::BackingUp)?;
            brick.set_speed(self.drive, speed)?;
            brick.on(self.drive)?;
            ticks += 1;
            clock.sleep(self.tick);

            if brick.button_is_down(Button::Escape)? {
                warn!("reverse aborted after {} ticks", ticks);
                break ReverseOutcome::Aborted { ticks };
            }
        };

        brick.off(self.drive)?;
        Ok(outcome)
    }
}
