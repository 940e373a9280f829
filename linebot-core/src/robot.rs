//! The menu loop.
//!
//! [`Robot`] owns the brick, the clock and all state. Each
//! [`menu_pass`](Robot::menu_pass) draws the main menu, samples the buttons
//! once and dispatches to the mount controller, the follow-line session, the
//! calibration session and the reverse driver, in that order.
//!
//! ```
//! use linebot_core::{Button, MockBrick, MockClock, Robot, RobotConfig};
//!
//! let brick = MockBrick::new();
//! brick.set_button(Button::Right, true);
//! brick.script_button(Button::Escape, [false, false, true]);
//! brick.script_button(Button::Enter, [false, true]);
//! brick.set_sensor(linebot_core::InputPort::Port3, 17);
//!
//! let mut robot = Robot::new(brick, MockClock::new(), RobotConfig::default());
//! let report = robot.menu_pass().unwrap();
//! assert!(report.calibrated);
//! assert_eq!(robot.state().calibration.threshold(), 17);
//! ```

use crate::clock::Clock;
use crate::config::RobotConfig;
use crate::display::{self, CAPTURED, Screen, TextBuffers};
use crate::error::RobotError;
use crate::hardware::{Brick, Button, LedPattern, Outputs, SensorMode};
use crate::line::{FollowStatus, LineFollower};
use crate::mount::{MountController, MountMove, MountPosition};
use crate::obstruction::ObstructionGuard;
use crate::reverse::{ReverseDriver, ReverseOutcome};
use crate::state::{ButtonSnapshot, RobotState};

use log::{debug, info};

/// What happened during one menu pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Mount move carried out, if any.
    pub mount: Option<MountMove>,
    /// Whether the follow-line session ran.
    pub followed_line: bool,
    /// Whether the calibration session ran.
    pub calibrated: bool,
    /// Outcome of the reverse driver, if it ran.
    pub reverse: Option<ReverseOutcome>,
}

/// The robot: hardware, clock, configuration and loop state.
pub struct Robot<B: Brick, C: Clock> {
    brick: B,
    clock: C,
    config: RobotConfig,
    state: RobotState,
    buffers: TextBuffers,
    follower: LineFollower,
    guard: ObstructionGuard,
    mount: MountController,
    reverse: ReverseDriver,
}

impl<B: Brick, C: Clock> Robot<B, C> {
    /// Build a robot from its parts.
    pub fn new(brick: B, clock: C, config: RobotConfig) -> Self {
        let ports = &config.ports;
        let speeds = &config.speeds;
        let follower = LineFollower::new(
            ports.color_sensor,
            ports.right_wheel,
            ports.left_wheel,
            speeds.fast,
            speeds.slow,
        );
        let guard = ObstructionGuard::new(
            ports.proximity_sensor,
            ports.drive,
            config.obstruction_threshold,
        );
        let mount = MountController::new(ports.mount, speeds.mount, config.mount.angle);
        let reverse = ReverseDriver::new(
            ports.drive,
            speeds.reverse,
            config.timing.reverse_duration(),
            config.timing.reverse_tick(),
        );
        let position = if config.mount.starts_up {
            MountPosition::Up
        } else {
            MountPosition::Down
        };

        Self {
            brick,
            clock,
            state: RobotState::new(position),
            buffers: TextBuffers::default(),
            follower,
            guard,
            mount,
            reverse,
            config,
        }
    }

    /// The hardware.
    pub fn brick(&self) -> &B {
        &self.brick
    }

    /// The clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The configuration the robot was built with.
    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    /// Current loop state.
    pub fn state(&self) -> &RobotState {
        &self.state
    }

    /// Current display text buffers.
    pub fn buffers(&self) -> &TextBuffers {
        &self.buffers
    }

    /// Reset the tacho counters and put the color sensor into color mode.
    pub fn init(&self) -> Result<(), RobotError> {
        self.brick.reset_tacho_counts(Outputs::ALL)?;
        self.brick
            .set_sensor_mode(self.config.ports.color_sensor, SensorMode::ColorColor)?;
        debug!("robot initialized, mount {:?}", self.state.mount);
        Ok(())
    }

    /// Initialize, then run menu passes until a hardware error occurs.
    pub fn run(&mut self) -> Result<(), RobotError> {
        self.init()?;
        info!("entering main menu");
        loop {
            let report = self.menu_pass()?;
            if report != PassReport::default() {
                debug!("pass: {:?}", report);
            }
            self.clock.sleep(self.config.timing.idle_tick());
        }
    }

    /// Run one pass of the main menu.
    pub fn menu_pass(&mut self) -> Result<PassReport, RobotError> {
        let mut report = PassReport::default();

        display::render(&self.brick, &Screen::MainMenu)?;
        self.brick.set_led(LedPattern::Green)?;

        self.state.buttons = ButtonSnapshot::sample(&self.brick)?;
        report.mount = self
            .mount
            .apply(&self.brick, &mut self.state.mount, &self.state.buttons)?;
        self.brick.off(self.config.ports.drive)?;

        if self.state.buttons.enter && !self.state.buttons.escape {
            self.follow_line()?;
            report.followed_line = true;
        }
        if self.state.buttons.right && !self.state.buttons.escape {
            self.calibrate()?;
            report.calibrated = true;
        }
        if self.state.buttons.left && !self.state.buttons.escape {
            let outcome = self.reverse.run(&self.brick, &self.clock)?;
            if let ReverseOutcome::Aborted { .. } = outcome {
                self.state.buttons.escape = true;
            }
            report.reverse = Some(outcome);
        }

        Ok(report)
    }

    /// Follow the line until Escape is pressed.
    ///
    /// An obstacle keeps the session in a blocked state, with the motors
    /// halted, until it clears; Escape is still honored while blocked.
    fn follow_line(&mut self) -> Result<(), RobotError> {
        info!(
            "following line (threshold {})",
            self.state.calibration.threshold()
        );
        let mut blocked = false;

        while !self.state.buttons.refresh(&self.brick, Button::Escape)? {
            display::render(&self.brick, &Screen::Running)?;
            let status = self.follower.step(
                &self.brick,
                &self.guard,
                self.state.calibration.threshold(),
            )?;

            match status {
                FollowStatus::Blocked { .. } if !blocked => {
                    info!("waiting for obstacle to clear");
                    blocked = true;
                }
                FollowStatus::Steered { .. } if blocked => {
                    info!("obstacle cleared, resuming");
                    blocked = false;
                }
                _ => {}
            }
        }

        self.brick.off(self.config.ports.drive)?;
        info!("line following stopped");
        Ok(())
    }

    /// Show the live reading and capture it on Enter until Escape is pressed.
    fn calibrate(&mut self) -> Result<(), RobotError> {
        info!("entering calibration menu");
        let sensor = self.config.ports.color_sensor;

        while !self.state.buttons.refresh(&self.brick, Button::Escape)? {
            let live = self.brick.read_sensor(sensor)?;
            self.buffers.set_sensor(live);
            display::render(
                &self.brick,
                &Screen::Calibration {
                    sensor: self.buffers.sensor(),
                    calibrated: self.buffers.calibrated(),
                },
            )?;

            if self.state.buttons.refresh(&self.brick, Button::Enter)? {
                let captured = self.brick.read_sensor(sensor)?;
                self.state.calibration.capture(captured);
                self.buffers.set_calibrated(captured);
                display::draw(&self.brick, &CAPTURED)?;
                self.clock.sleep(self.config.timing.calibration_hold());
            }
        }

        info!("leaving calibration menu");
        Ok(())
    }
}
