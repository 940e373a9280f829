//! Robot configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```
//! use linebot_core::RobotConfig;
//!
//! let config: RobotConfig = serde_json::from_str(r#"{ "speeds": { "fast": 30 } }"#).unwrap();
//! assert_eq!(config.speeds.fast, 30);
//! assert_eq!(config.speeds.slow, 5);
//! ```

use crate::error::RobotError;
use crate::hardware::{InputPort, Outputs};

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default file name of the EV3 C library.
pub const DEFAULT_LIBRARY: &str = "libev3api.so";

/// Complete robot configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    /// Path of the EV3 C library loaded by [`Ev3Brick`](crate::Ev3Brick).
    pub library: PathBuf,
    /// Which motor and sensor sits on which port.
    pub ports: PortConfig,
    /// Motor speeds.
    pub speeds: SpeedConfig,
    /// Mount geometry.
    pub mount: MountConfig,
    /// Proximity readings above this value count as an obstacle.
    pub obstruction_threshold: i32,
    /// Loop timings.
    pub timing: TimingConfig,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            library: PathBuf::from(DEFAULT_LIBRARY),
            ports: PortConfig::default(),
            speeds: SpeedConfig::default(),
            mount: MountConfig::default(),
            obstruction_threshold: 300,
            timing: TimingConfig::default(),
        }
    }
}

impl RobotConfig {
    /// Load a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RobotError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Write this config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RobotError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Port assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortConfig {
    /// Both drive wheels.
    pub drive: Outputs,
    /// The wheel on the outside of a right turn.
    pub right_wheel: Outputs,
    /// The wheel on the outside of a left turn.
    pub left_wheel: Outputs,
    /// The mount motor.
    pub mount: Outputs,
    /// The line-sensing color sensor.
    pub color_sensor: InputPort,
    /// The forward proximity sensor.
    pub proximity_sensor: InputPort,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            drive: Outputs::BC,
            right_wheel: Outputs::B,
            left_wheel: Outputs::C,
            mount: Outputs::A,
            color_sensor: InputPort::Port3,
            proximity_sensor: InputPort::Port1,
        }
    }
}

/// Motor speeds, in library units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedConfig {
    /// Outer wheel while following the line.
    pub fast: i8,
    /// Inner wheel while following the line.
    pub slow: i8,
    /// Both wheels while backing up (applied negated).
    pub reverse: i8,
    /// Mount motor.
    pub mount: i8,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            fast: 10,
            slow: 5,
            reverse: 20,
            mount: 20,
        }
    }
}

/// Mount geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    /// Rotation between the two mount positions, in degrees.
    pub angle: i32,
    /// Whether the mount is up when the program starts.
    pub starts_up: bool,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            angle: 100,
            starts_up: true,
        }
    }
}

/// Loop timings, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Total time the reverse driver backs up for.
    pub reverse_duration: u64,
    /// Time between reverse drive commands.
    pub reverse_tick: u64,
    /// Pause after a calibration capture.
    pub calibration_hold: u64,
    /// Pause between main menu passes.
    pub idle_tick: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            reverse_duration: 5000,
            reverse_tick: 100,
            calibration_hold: 500,
            idle_tick: 10,
        }
    }
}

impl TimingConfig {
    /// [`Self::reverse_duration`] as a [`Duration`].
    pub fn reverse_duration(&self) -> Duration {
        Duration::from_millis(self.reverse_duration)
    }

    /// [`Self::reverse_tick`] as a [`Duration`].
    pub fn reverse_tick(&self) -> Duration {
        Duration::from_millis(self.reverse_tick)
    }

    /// [`Self::calibration_hold`] as a [`Duration`].
    pub fn calibration_hold(&self) -> Duration {
        Duration::from_millis(self.calibration_hold)
    }

    /// [`Self::idle_tick`] as a [`Duration`].
    pub fn idle_tick(&self) -> Duration {
        Duration::from_millis(self.idle_tick)
    }
}
