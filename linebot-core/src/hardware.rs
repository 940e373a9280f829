//! Hardware boundary of the robot.
//!
//! [`Brick`] is the only way the control code talks to motors, sensors,
//! buttons, the display and the indicator light. The constants below use the
//! raw values of the EV3 C library headers so [`Ev3Brick`](crate::Ev3Brick)
//! can pass them straight through.

use crate::error::RobotError;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

// =============================================================================
// Brick Trait
// =============================================================================

/// Trait for brick implementations.
///
/// This allows for mock implementations in tests.
pub trait Brick: Send + Sync {
    /// Set the speed (-100..=100) of the given outputs without starting them.
    fn set_speed(&self, outputs: Outputs, speed: i8) -> Result<(), RobotError>;

    /// Switch the given outputs on at their configured speed.
    fn on(&self, outputs: Outputs) -> Result<(), RobotError>;

    /// Switch the given outputs off (brake).
    fn off(&self, outputs: Outputs) -> Result<(), RobotError>;

    /// Rotate the given outputs by a relative angle in degrees.
    fn rotate(&self, outputs: Outputs, speed: i8, angle: i32) -> Result<(), RobotError>;

    /// Reset the tacho counters of the given outputs.
    fn reset_tacho_counts(&self, outputs: Outputs) -> Result<(), RobotError>;

    /// Put the sensor on `port` into `mode`.
    fn set_sensor_mode(&self, port: InputPort, mode: SensorMode) -> Result<(), RobotError>;

    /// Read the current value of the sensor on `port`.
    fn read_sensor(&self, port: InputPort) -> Result<i32, RobotError>;

    /// Whether `button` is currently held down.
    fn button_is_down(&self, button: Button) -> Result<bool, RobotError>;

    /// Set the indicator light pattern.
    fn set_led(&self, pattern: LedPattern) -> Result<(), RobotError>;

    /// Clear the display.
    fn lcd_clean(&self) -> Result<(), RobotError>;

    /// Draw `text` at pixel position (`x`, `y`) with the given color.
    fn lcd_text(&self, color: u8, x: i16, y: i16, text: &str) -> Result<(), RobotError>;
}

// =============================================================================
// Outputs
// =============================================================================

/// A set of motor outputs, as a bitmask (A = 0x01 .. D = 0x08).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Outputs(u8);

impl Outputs {
    /// Output port A.
    pub const A: Outputs = Outputs(0x01);
    /// Output port B.
    pub const B: Outputs = Outputs(0x02);
    /// Output port C.
    pub const C: Outputs = Outputs(0x04);
    /// Output port D.
    pub const D: Outputs = Outputs(0x08);
    /// Outputs B and C.
    pub const BC: Outputs = Outputs(0x06);
    /// All four outputs.
    pub const ALL: Outputs = Outputs(0x0f);

    /// Build an output set from a raw bitmask. Bits above D are dropped.
    pub const fn from_bits(bits: u8) -> Self {
        Outputs(bits & 0x0f)
    }

    /// The raw bitmask.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether every output in `other` is also in `self`.
    pub const fn contains(self, other: Outputs) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Outputs {
    type Output = Outputs;

    fn bitor(self, rhs: Self) -> Self::Output {
        Outputs(self.0 | rhs.0)
    }
}

impl fmt::Display for Outputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OUT_")?;
        for (bit, name) in [(Self::A, 'A'), (Self::B, 'B'), (Self::C, 'C'), (Self::D, 'D')] {
            if self.contains(bit) {
                write!(f, "{}", name)?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Inputs
// =============================================================================

/// A sensor input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputPort {
    /// Input 1.
    Port1,
    /// Input 2.
    Port2,
    /// Input 3.
    Port3,
    /// Input 4.
    Port4,
}

impl InputPort {
    /// The zero-based port number used by the library.
    pub const fn raw(self) -> i32 {
        match self {
            InputPort::Port1 => 0,
            InputPort::Port2 => 1,
            InputPort::Port3 => 2,
            InputPort::Port4 => 3,
        }
    }
}

impl fmt::Display for InputPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "INPUT_{}", self.raw() + 1)
    }
}

/// Sensor reading modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorMode {
    /// Touch sensor, pressed state.
    TouchPress,
    /// Color sensor, reflected light intensity.
    ColorReflect,
    /// Color sensor, ambient light intensity.
    ColorAmbient,
    /// Color sensor, color class code.
    ColorColor,
    /// Ultrasonic sensor, distance in centimeters.
    UltrasonicCm,
    /// Ultrasonic sensor, distance in millimeters.
    UltrasonicMm,
    /// Infrared sensor, proximity.
    InfraredProximity,
}

impl SensorMode {
    /// The mode identifier used by the library.
    pub const fn raw(self) -> i32 {
        match self {
            SensorMode::TouchPress => 1,
            SensorMode::ColorReflect => 2,
            SensorMode::ColorAmbient => 3,
            SensorMode::ColorColor => 4,
            SensorMode::UltrasonicCm => 5,
            SensorMode::UltrasonicMm => 6,
            SensorMode::InfraredProximity => 10,
        }
    }
}

// =============================================================================
// Buttons and LED
// =============================================================================

/// The brick's buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    /// Up.
    Up,
    /// Enter (center).
    Enter,
    /// Down.
    Down,
    /// Right.
    Right,
    /// Left.
    Left,
    /// Escape (back).
    Escape,
}

impl Button {
    /// All buttons, in library id order.
    pub const ALL: [Button; 6] = [
        Button::Up,
        Button::Enter,
        Button::Down,
        Button::Right,
        Button::Left,
        Button::Escape,
    ];

    /// The button id used by the library.
    pub const fn raw(self) -> u8 {
        match self {
            Button::Up => 0x01,
            Button::Enter => 0x02,
            Button::Down => 0x03,
            Button::Right => 0x04,
            Button::Left => 0x05,
            Button::Escape => 0x06,
        }
    }
}

/// Indicator light patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedPattern {
    /// Off.
    Black,
    /// Steady green.
    Green,
    /// Steady red.
    Red,
    /// Steady orange.
    Orange,
    /// Flashing green.
    GreenFlash,
    /// Flashing red.
    RedFlash,
    /// Flashing orange.
    OrangeFlash,
}

impl LedPattern {
    /// The pattern id used by the library.
    pub const fn raw(self) -> u8 {
        match self {
            LedPattern::Black => 0,
            LedPattern::Green => 1,
            LedPattern::Red => 2,
            LedPattern::Orange => 3,
            LedPattern::GreenFlash => 4,
            LedPattern::RedFlash => 5,
            LedPattern::OrangeFlash => 6,
        }
    }
}
