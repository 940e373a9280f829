//! Error types for the robot hardware and control loop.

use crate::hardware::InputPort;

/// Errors that can occur while driving the robot.
#[derive(Debug, thiserror::Error)]
pub enum RobotError {
    /// Failed to load the EV3 library or resolve one of its symbols.
    #[error("Failed to load EV3 library: {0}")]
    LibraryLoad(#[from] libloading::Error),

    /// A subsystem init routine reported failure.
    #[error("{0} initialization failed")]
    InitFailed(&'static str),

    /// Attempted to open a second brick instance.
    #[error("Brick already initialized - only one instance allowed")]
    AlreadyInitialized,

    /// A library call reported failure.
    #[error("{0} failed")]
    CallFailed(&'static str),

    /// A sensor read returned the library's error sentinel.
    #[error("Failed to read sensor on {port} (code: {code})")]
    SensorRead {
        /// The port that was read.
        port: InputPort,
        /// The raw value returned by the library.
        code: i32,
    },

    /// Display text contained an interior NUL byte.
    #[error("Invalid display text: {0}")]
    InvalidText(#[from] std::ffi::NulError),

    /// An I/O error occurred (e.g., reading the config file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file could not be parsed.
    #[error("Invalid config: {0}")]
    Config(#[from] serde_json::Error),
}
