//! Control loop for a line-following EV3 robot.
//!
//! The robot drives on two wheels (outputs B and C), follows a line with a
//! color sensor, stops for obstacles seen by a proximity sensor, and raises
//! or lowers a mount with a third motor. A button menu on the brick selects
//! between following the line, moving the mount, backing up and calibrating
//! the line threshold.
//!
//! # Example
//!
//! ```no_run
//! use linebot_core::{Ev3Brick, Robot, RobotConfig, SystemClock};
//!
//! fn main() -> Result<(), linebot_core::RobotError> {
//!     let config = RobotConfig::default();
//!     let brick = Ev3Brick::new(&config.library)?;
//!
//!     // Runs until a hardware error occurs
//!     Robot::new(brick, SystemClock::new(), config).run()
//! }
//! ```
//!
//! # Testing
//!
//! Use [`MockBrick`] and [`MockClock`] to test code without hardware:
//!
//! ```
//! use linebot_core::{steer, Steer};
//!
//! assert_eq!(steer(43, 42), Steer::Right);
//! assert_eq!(steer(42, 42), Steer::Left);
//! ```

#![warn(missing_docs)]

mod calibration;
mod clock;
mod config;
mod display;
mod error;
mod ev3;
mod hardware;
mod line;
mod mock;
mod mount;
mod obstruction;
mod reverse;
mod robot;
mod state;

// Re-export public API
pub use calibration::Calibration;
pub use clock::{Clock, SystemClock};
pub use config::{
    DEFAULT_LIBRARY, MountConfig, PortConfig, RobotConfig, SpeedConfig, TimingConfig,
};
pub use display::{Screen, TEXT_BUFFER_LEN, TextBuffers, TextLine};
pub use error::RobotError;
pub use ev3::Ev3Brick;
pub use hardware::{Brick, Button, InputPort, LedPattern, Outputs, SensorMode};
pub use line::{FollowStatus, LineFollower, Steer, steer};
pub use mock::{Command, MockBrick, MockClock};
pub use mount::{MountController, MountMove, MountPosition};
pub use obstruction::{GuardStatus, ObstructionGuard};
pub use reverse::{ReverseDriver, ReverseOutcome};
pub use robot::{PassReport, Robot};
pub use state::{ButtonSnapshot, RobotState};

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const COLOR: InputPort = InputPort::Port3;
    const PROXIMITY: InputPort = InputPort::Port1;

    fn follower() -> LineFollower {
        LineFollower::new(COLOR, Outputs::B, Outputs::C, 10, 5)
    }

    fn guard() -> ObstructionGuard {
        ObstructionGuard::new(PROXIMITY, Outputs::BC, 300)
    }

    fn speeds(commands: &[Command]) -> Vec<(Outputs, i8)> {
        commands
            .iter()
            .filter_map(|c| match *c {
                Command::SetSpeed { outputs, speed } => Some((outputs, speed)),
                _ => None,
            })
            .collect()
    }

    fn count(commands: &[Command], wanted: &Command) -> usize {
        commands.iter().filter(|c| *c == wanted).count()
    }

    #[test]
    fn test_steer_right_above_threshold() {
        let mock = MockBrick::new();
        mock.set_sensor(COLOR, 8);

        let status = follower().step(&mock, &guard(), 3).unwrap();
        assert_eq!(
            status,
            FollowStatus::Steered {
                steer: Steer::Right,
                reading: 8
            }
        );

        let commands = mock.commands();
        assert_eq!(speeds(&commands), vec![(Outputs::B, 10), (Outputs::C, 5)]);
        assert_eq!(count(&commands, &Command::On(Outputs::BC)), 1);
        assert_eq!(commands.last(), Some(&Command::Led(LedPattern::Green)));
    }

    #[test]
    fn test_steer_left_at_or_below_threshold() {
        for reading in [3, -20] {
            let mock = MockBrick::new();
            mock.set_sensor(COLOR, reading);

            let status = follower().step(&mock, &guard(), 3).unwrap();
            assert!(matches!(
                status,
                FollowStatus::Steered {
                    steer: Steer::Left,
                    ..
                }
            ));

            let commands = mock.commands();
            assert_eq!(speeds(&commands), vec![(Outputs::B, 5), (Outputs::C, 10)]);
            assert_eq!(commands.last(), Some(&Command::Led(LedPattern::Red)));
        }
    }

    #[test]
    fn test_calibrated_threshold_boundary() {
        let mut calibration = Calibration::default();
        assert!(!calibration.is_calibrated());
        calibration.capture(42);

        assert_eq!(calibration.threshold(), 42);
        assert_eq!(steer(43, calibration.threshold()), Steer::Right);
        assert_eq!(steer(41, calibration.threshold()), Steer::Left);
        assert_eq!(steer(42, calibration.threshold()), Steer::Left);
    }

    #[test]
    fn test_repeated_capture_keeps_decisions() {
        let mut calibration = Calibration::default();
        calibration.capture(42);
        let before: Vec<Steer> = (30..55).map(|r| steer(r, calibration.threshold())).collect();

        calibration.capture(42);
        calibration.capture(42);
        let after: Vec<Steer> = (30..55).map(|r| steer(r, calibration.threshold())).collect();

        assert_eq!(before, after);
        assert_eq!(calibration.captures(), 3);
    }

    #[test]
    fn test_guard_halts_every_blocked_sample() {
        let mock = MockBrick::new();
        mock.script_sensor(PROXIMITY, [450, 301, 320, 300, 120]);
        mock.set_sensor(COLOR, 50);
        let follower = follower();
        let guard = guard();

        let statuses: Vec<FollowStatus> = (0..5)
            .map(|_| follower.step(&mock, &guard, 10).unwrap())
            .collect();

        let blocked = statuses
            .iter()
            .take_while(|s| matches!(s, FollowStatus::Blocked { .. }))
            .count();
        assert_eq!(blocked, 3);
        assert_eq!(statuses[0], FollowStatus::Blocked { proximity: 450 });
        assert!(matches!(statuses[3], FollowStatus::Steered { .. }));

        let commands = mock.commands();
        assert_eq!(count(&commands, &Command::Off(Outputs::BC)), 3);
        // Only the two clear steps steered.
        assert_eq!(speeds(&commands).len(), 4);
        assert_eq!(mock.sensor_reads(COLOR), 2);
    }

    #[test]
    fn test_guard_never_clearing_never_steers() {
        let mock = MockBrick::new();
        mock.set_sensor(PROXIMITY, 900);
        let clock = MockClock::new();
        let follower = follower();
        let guard = guard();

        let deadline = Duration::from_secs(60);
        let mut samples = 0;
        while clock.now() < deadline {
            let status = follower.step(&mock, &guard, 0).unwrap();
            assert!(matches!(status, FollowStatus::Blocked { proximity: 900 }));
            samples += 1;
            clock.sleep(Duration::from_millis(100));
        }

        let commands = mock.commands();
        assert_eq!(samples, 600);
        assert_eq!(count(&commands, &Command::Off(Outputs::BC)), 600);
        assert!(speeds(&commands).is_empty());
        assert_eq!(mock.sensor_reads(COLOR), 0);
    }

    #[test]
    fn test_guard_boundary_is_clear() {
        let mock = MockBrick::new();
        mock.set_sensor(PROXIMITY, 300);
        assert_eq!(guard().check(&mock).unwrap(), GuardStatus::Clear);
        assert!(mock.commands().is_empty());

        mock.set_sensor(PROXIMITY, 301);
        assert!(guard().check(&mock).unwrap().is_blocked());
        assert!(mock.commands().contains(&Command::LcdText {
            color: 1,
            x: 0,
            y: 70,
            text: "Obstacle! Stopping.".to_string(),
        }));
    }

    #[test]
    fn test_mount_toggle_sequence() {
        let mock = MockBrick::new();
        let mount = MountController::new(Outputs::A, 20, 100);
        let mut position = MountPosition::Down;
        let down = ButtonSnapshot {
            down: true,
            ..Default::default()
        };
        let up = ButtonSnapshot {
            up: true,
            ..Default::default()
        };

        assert_eq!(
            mount.apply(&mock, &mut position, &down).unwrap(),
            Some(MountMove::Raise)
        );
        assert_eq!(position, MountPosition::Up);
        assert_eq!(mount.apply(&mock, &mut position, &down).unwrap(), None);
        assert_eq!(
            mount.apply(&mock, &mut position, &up).unwrap(),
            Some(MountMove::Lower)
        );
        assert_eq!(position, MountPosition::Down);
        assert_eq!(mount.apply(&mock, &mut position, &up).unwrap(), None);

        assert_eq!(
            mock.commands(),
            vec![
                Command::Rotate {
                    outputs: Outputs::A,
                    speed: 20,
                    angle: 100
                },
                Command::Rotate {
                    outputs: Outputs::A,
                    speed: -20,
                    angle: 100
                },
            ]
        );
    }

    #[test]
    fn test_mount_down_checked_first() {
        let both = ButtonSnapshot {
            up: true,
            down: true,
            ..Default::default()
        };
        assert_eq!(
            MountController::requested(MountPosition::Down, &both),
            Some(MountMove::Raise)
        );
        assert_eq!(
            MountController::requested(MountPosition::Up, &both),
            Some(MountMove::Lower)
        );
        assert_eq!(
            MountController::requested(MountPosition::Up, &ButtonSnapshot::default()),
            None
        );
    }

    #[test]
    fn test_reverse_aborts_on_escape() {
        let mock = MockBrick::new();
        mock.script_button(Button::Escape, [false; 9].into_iter().chain([true]));
        let clock = MockClock::new();
        let driver = ReverseDriver::new(
            Outputs::BC,
            20,
            Duration::from_secs(5),
            Duration::from_millis(100),
        );

        let outcome = driver.run(&mock, &clock).unwrap();
        assert_eq!(outcome, ReverseOutcome::Aborted { ticks: 10 });

        let commands = mock.commands();
        assert_eq!(speeds(&commands), vec![(Outputs::BC, -20); 10]);
        assert_eq!(count(&commands, &Command::On(Outputs::BC)), 10);
        assert_eq!(commands.last(), Some(&Command::Off(Outputs::BC)));
        assert_eq!(clock.now(), Duration::from_secs(1));
    }

    #[test]
    fn test_reverse_runs_to_deadline() {
        let mock = MockBrick::new();
        let clock = MockClock::new();
        let driver = ReverseDriver::new(
            Outputs::BC,
            20,
            Duration::from_secs(5),
            Duration::from_millis(100),
        );

        let outcome = driver.run(&mock, &clock).unwrap();
        assert_eq!(outcome, ReverseOutcome::Completed { ticks: 50 });
        assert_eq!(outcome.ticks(), 50);
        assert_eq!(clock.sleeps().len(), 50);
    }

    #[test]
    fn test_menu_pass_renders_main_menu() {
        let mut robot = Robot::new(MockBrick::new(), MockClock::new(), RobotConfig::default());
        let report = robot.menu_pass().unwrap();

        assert_eq!(report, PassReport::default());
        let commands = robot.brick().commands();
        assert_eq!(commands[0], Command::LcdClean);
        assert!(commands.contains(&Command::LcdText {
            color: 0,
            x: 0,
            y: 10,
            text: "- Main Menu -".to_string(),
        }));
        assert!(commands.contains(&Command::Led(LedPattern::Green)));
        assert_eq!(commands.last(), Some(&Command::Off(Outputs::BC)));
    }

    #[test]
    fn test_menu_pass_lowers_mount_once() {
        let brick = MockBrick::new();
        brick.set_button(Button::Up, true);
        let mut robot = Robot::new(brick, MockClock::new(), RobotConfig::default());

        assert_eq!(robot.menu_pass().unwrap().mount, Some(MountMove::Lower));
        assert_eq!(robot.menu_pass().unwrap().mount, None);
        assert_eq!(robot.state().mount, MountPosition::Down);
    }

    #[test]
    fn test_follow_session_escapes_while_blocked() {
        let brick = MockBrick::new();
        brick.set_button(Button::Enter, true);
        // Released at the menu sample and for four session polls.
        brick.script_button(Button::Escape, [false, false, false, false, false, true]);
        brick.set_sensor(PROXIMITY, 1000);
        let mut robot = Robot::new(brick, MockClock::new(), RobotConfig::default());

        let report = robot.menu_pass().unwrap();
        assert!(report.followed_line);
        assert!(!report.calibrated);
        assert!(robot.state().buttons.escape);

        let commands = robot.brick().commands();
        assert!(speeds(&commands).is_empty());
        // One halt per blocked sample, one at menu entry, one on exit.
        assert_eq!(count(&commands, &Command::Off(Outputs::BC)), 6);
    }

    #[test]
    fn test_follow_session_uses_calibrated_threshold() {
        let brick = MockBrick::new();
        brick.set_button(Button::Right, true);
        brick.script_button(Button::Escape, [false, false, true]);
        brick.script_button(Button::Enter, [false, true]);
        brick.script_sensor(COLOR, [40, 42]);
        let mut robot = Robot::new(brick, MockClock::new(), RobotConfig::default());

        let report = robot.menu_pass().unwrap();
        assert!(report.calibrated);
        assert_eq!(robot.state().calibration.threshold(), 42);
        assert_eq!(robot.buffers().sensor(), "- Sensor Value: 40");
        assert_eq!(robot.buffers().calibrated(), "- Calibrated: 42");
        assert_eq!(robot.clock().sleeps(), vec![Duration::from_millis(500)]);

        robot.brick().take_commands();
        robot.brick().set_button(Button::Right, false);
        robot.brick().set_button(Button::Enter, true);
        robot
            .brick()
            .script_button(Button::Escape, [false, false, false, false, true]);
        robot.brick().script_sensor(COLOR, [43, 42, 41]);

        assert!(robot.menu_pass().unwrap().followed_line);
        let steered: Vec<(Outputs, i8)> = speeds(&robot.brick().commands());
        assert_eq!(
            steered,
            vec![
                (Outputs::B, 10),
                (Outputs::C, 5),
                (Outputs::B, 5),
                (Outputs::C, 10),
                (Outputs::B, 5),
                (Outputs::C, 10),
            ]
        );
    }

    #[test]
    fn test_escape_from_session_skips_reverse() {
        let brick = MockBrick::new();
        brick.set_button(Button::Enter, true);
        brick.set_button(Button::Left, true);
        brick.script_button(Button::Escape, [false, true]);
        let mut robot = Robot::new(brick, MockClock::new(), RobotConfig::default());

        let report = robot.menu_pass().unwrap();
        assert!(report.followed_line);
        assert_eq!(report.reverse, None);
    }

    #[test]
    fn test_menu_pass_backs_up_on_left() {
        let brick = MockBrick::new();
        brick.set_button(Button::Left, true);
        let mut config = RobotConfig::default();
        config.timing.reverse_duration = 1000;
        let mut robot = Robot::new(brick, MockClock::new(), config);

        let report = robot.menu_pass().unwrap();
        assert_eq!(report.reverse, Some(ReverseOutcome::Completed { ticks: 10 }));
        assert!(robot.brick().commands().contains(&Command::LcdText {
            color: 0,
            x: 0,
            y: 10,
            text: "- BACKING UP -".to_string(),
        }));
    }

    #[test]
    fn test_init_sets_color_mode() {
        let robot = Robot::new(MockBrick::new(), MockClock::new(), RobotConfig::default());
        robot.init().unwrap();
        assert_eq!(
            robot.brick().commands(),
            vec![
                Command::ResetTachoCounts(Outputs::ALL),
                Command::SensorMode {
                    port: COLOR,
                    mode: SensorMode::ColorColor
                },
            ]
        );
    }

    #[test]
    fn test_sensor_failure_propagates() {
        let mock = MockBrick::new();
        mock.fail_sensor(COLOR);

        let result = follower().step(&mock, &guard(), 0);
        assert!(matches!(
            result,
            Err(RobotError::SensorRead { port: InputPort::Port3, code: -1 })
        ));
        assert!(speeds(&mock.commands()).is_empty());
    }

    #[test]
    fn test_outputs_display() {
        assert_eq!(Outputs::BC.to_string(), "OUT_BC");
        assert_eq!((Outputs::A | Outputs::D).bits(), 0x09);
        assert_eq!(Outputs::from_bits(0xff), Outputs::ALL);
        assert_eq!(InputPort::Port3.to_string(), "INPUT_3");
    }
}
