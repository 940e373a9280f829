use linebot_core::{Ev3Brick, Robot, RobotConfig, RobotError, SystemClock};
use log::info;

/// Environment variable naming an optional JSON config file.
const CONFIG_ENV: &str = "LINEBOT_CONFIG";

fn main() -> Result<(), RobotError> {
    env_logger::init();

    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => RobotConfig::load(path)?,
        None => RobotConfig::default(),
    };
    info!("using EV3 library {}", config.library.display());

    let brick = Ev3Brick::new(&config.library)?;
    let mut robot = Robot::new(brick, SystemClock::new(), config);
    robot.run()
}
