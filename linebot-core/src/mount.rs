//! Mount raise/lower toggle.

use crate::error::RobotError;
use crate::hardware::{Brick, Outputs};
use crate::state::ButtonSnapshot;

use log::info;

/// Where the mount is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MountPosition {
    /// Raised.
    #[default]
    Up,
    /// Lowered.
    Down,
}

/// A mount rotation that was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountMove {
    /// Rotated forward, Down to Up.
    Raise,
    /// Rotated backward, Up to Down.
    Lower,
}

impl MountMove {
    /// Position after the move.
    pub fn target(self) -> MountPosition {
        match self {
            MountMove::Raise => MountPosition::Up,
            MountMove::Lower => MountPosition::Down,
        }
    }
}

/// Rotates the mount motor between its two positions.
#[derive(Debug, Clone)]
pub struct MountController {
    output: Outputs,
    speed: i8,
    angle: i32,
}

impl MountController {
    /// Create a controller for the motor on `output`.
    pub fn new(output: Outputs, speed: i8, angle: i32) -> Self {
        Self {
            output,
            speed,
            angle,
        }
    }

    /// Which move, if any, the buttons request from `position`.
    ///
    /// Down raises a lowered mount, Up lowers a raised one. Down is checked
    /// first. A held button does not repeat because the position has already
    /// flipped.
    pub fn requested(position: MountPosition, buttons: &ButtonSnapshot) -> Option<MountMove> {
        match position {
            MountPosition::Down if buttons.down => Some(MountMove::Raise),
            MountPosition::Up if buttons.up => Some(MountMove::Lower),
            _ => None,
        }
    }

    /// Carry out the requested move, if any, and update `position`.
    pub fn apply<B: Brick + ?Sized>(
        &self,
        brick: &B,
        position: &mut MountPosition,
        buttons: &ButtonSnapshot,
    ) -> Result<Option<MountMove>, RobotError> {
        let Some(mv) = Self::requested(*position, buttons) else {
            return Ok(None);
        };

        let speed = match mv {
            MountMove::Raise => self.speed,
            MountMove::Lower => self.speed.saturating_neg(),
        };
        brick.rotate(self.output, speed, self.angle)?;
        *position = mv.target();
        info!("mount {:?}: now {:?}", mv, position);
        Ok(Some(mv))
    }
}
