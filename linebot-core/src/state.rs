//! Robot state carried across loop passes.

use crate::calibration::Calibration;
use crate::error::RobotError;
use crate::hardware::{Brick, Button};
use crate::mount::MountPosition;

/// A level-triggered sample of the brick's buttons.
///
/// `true` means the button was held down when it was sampled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonSnapshot {
    /// Escape (back) button.
    pub escape: bool,
    /// Enter (center) button.
    pub enter: bool,
    /// Up button.
    pub up: bool,
    /// Down button.
    pub down: bool,
    /// Left button.
    pub left: bool,
    /// Right button.
    pub right: bool,
}

impl ButtonSnapshot {
    /// Sample all six buttons.
    pub fn sample<B: Brick + ?Sized>(brick: &B) -> Result<Self, RobotError> {
        let mut snapshot = Self::default();
        for button in Button::ALL {
            snapshot.refresh(brick, button)?;
        }
        Ok(snapshot)
    }

    /// Re-sample a single button and return its new level.
    pub fn refresh<B: Brick + ?Sized>(&mut self, brick: &B, button: Button) -> Result<bool, RobotError> {
        let down = brick.button_is_down(button)?;
        *self.flag_mut(button) = down;
        Ok(down)
    }

    /// Level of a single button in this sample.
    pub fn is_down(&self, button: Button) -> bool {
        match button {
            Button::Escape => self.escape,
            Button::Enter => self.enter,
            Button::Up => self.up,
            Button::Down => self.down,
            Button::Left => self.left,
            Button::Right => self.right,
        }
    }

    fn flag_mut(&mut self, button: Button) -> &mut bool {
        match button {
            Button::Escape => &mut self.escape,
            Button::Enter => &mut self.enter,
            Button::Up => &mut self.up,
            Button::Down => &mut self.down,
            Button::Left => &mut self.left,
            Button::Right => &mut self.right,
        }
    }
}

/// Everything the control loop remembers between passes.
#[derive(Debug, Clone, Default)]
pub struct RobotState {
    /// The most recent button sample.
    pub buttons: ButtonSnapshot,
    /// Where the mount currently is.
    pub mount: MountPosition,
    /// The line threshold.
    pub calibration: Calibration,
}

impl RobotState {
    /// Fresh state with the mount at `mount`.
    pub fn new(mount: MountPosition) -> Self {
        Self {
            mount,
            ..Default::default()
        }
    }
}
