//! Example: one calibration and a short line-following run on a mock brick.
//!
//! Run with: `RUST_LOG=debug cargo run --example mock_lap`

use linebot_core::{Button, Command, InputPort, MockBrick, MockClock, Robot, RobotConfig, RobotError};

fn main() -> Result<(), RobotError> {
    // Initialize logging (optional)
    env_logger::init();

    let brick = MockBrick::new();
    let mut robot = Robot::new(brick, MockClock::new(), RobotConfig::default());
    robot.init()?;

    // Calibrate on the line edge
    robot.brick().set_button(Button::Right, true);
    robot.brick().script_button(Button::Enter, [false, true]);
    robot.brick().script_button(Button::Escape, [false, false, true]);
    robot.brick().set_sensor(InputPort::Port3, 3);
    robot.menu_pass()?;
    println!("Calibrated threshold: {}", robot.state().calibration.threshold());

    // Follow the line across a few readings, with an obstacle in the middle
    robot.brick().take_commands();
    robot.brick().set_button(Button::Right, false);
    robot.brick().set_button(Button::Enter, true);
    robot.brick().script_button(Button::Escape, [false; 7].into_iter().chain([true]));
    robot.brick().script_sensor(InputPort::Port3, [5, 1, 4, 2]);
    robot.brick().script_sensor(InputPort::Port1, [0, 0, 420, 350, 0, 0]);
    let report = robot.menu_pass()?;
    println!("Pass: {:?}", report);

    for command in robot.brick().commands() {
        match command {
            Command::SetSpeed { .. } | Command::Off(_) | Command::Led(_) => println!("  {:?}", command),
            _ => {}
        }
    }

    Ok(())
}
