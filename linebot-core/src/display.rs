//! Menu screens and display text buffers.

use crate::error::RobotError;
use crate::hardware::Brick;

use log::trace;
use std::fmt::Write;

/// Capacity of a text buffer in bytes, including the terminator the library
/// expects.
pub const TEXT_BUFFER_LEN: usize = 50;

/// Line color for headings.
pub const HEADING: u8 = 0;
/// Line color for body text.
pub const BODY: u8 = 1;

/// Shown by the obstruction guard.
pub const OBSTACLE_TEXT: &str = "Obstacle! Stopping.";

/// A line of text at a fixed display position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLine {
    /// Color passed to the library.
    pub color: u8,
    /// Horizontal pixel position.
    pub x: i16,
    /// Vertical pixel position.
    pub y: i16,
    /// The text.
    pub text: &'static str,
}

const fn line(color: u8, y: i16, text: &'static str) -> TextLine {
    TextLine { color, x: 0, y, text }
}

const MAIN_MENU: [TextLine; 6] = [
    line(HEADING, 10, "- Main Menu -"),
    line(BODY, 30, "- Enter to Follow Line"),
    line(BODY, 50, "- Up to Lower Mount"),
    line(BODY, 60, "- Down to Raise Mount"),
    line(BODY, 80, "- Left to Go Backwards"),
    line(BODY, 100, "- Right to Calibrate"),
];

const RUNNING: [TextLine; 2] = [
    line(HEADING, 10, "- RUNNING -"),
    line(BODY, 30, "- Escape to Exit"),
];

const BACKING_UP: [TextLine; 2] = [
    line(HEADING, 10, "- BACKING UP -"),
    line(BODY, 30, "- Escape to Exit"),
];

const CALIBRATION: [TextLine; 3] = [
    line(HEADING, 10, "- Calibration Menu -"),
    line(BODY, 30, "- Escape to Exit"),
    line(BODY, 60, "- Enter to Calibrate"),
];

const SENSOR_VALUE_Y: i16 = 50;
const CALIBRATED_Y: i16 = 80;

/// Body line drawn over the menu when an obstacle blocks the robot.
pub const OBSTACLE: TextLine = line(BODY, 70, OBSTACLE_TEXT);
/// Heading overlay drawn right after a calibration capture.
pub const CAPTURED: TextLine = line(HEADING, 70, "- Calibrated");

/// The fixed screens of the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen<'a> {
    /// Main menu listing every action.
    MainMenu,
    /// Line following in progress.
    Running,
    /// Reverse driver in progress.
    BackingUp,
    /// Calibration menu with the live reading and the last readout.
    Calibration {
        /// Formatted live sensor reading.
        sensor: &'a str,
        /// Formatted last captured value (may be empty).
        calibrated: &'a str,
    },
}

impl Screen<'_> {
    fn static_lines(&self) -> &'static [TextLine] {
        match self {
            Screen::MainMenu => &MAIN_MENU,
            Screen::Running => &RUNNING,
            Screen::BackingUp => &BACKING_UP,
            Screen::Calibration { .. } => &CALIBRATION,
        }
    }
}

/// Clear the display and draw `screen`.
pub fn render<B: Brick + ?Sized>(brick: &B, screen: &Screen<'_>) -> Result<(), RobotError> {
    trace!("render {:?}", screen);
    brick.lcd_clean()?;
    for text in screen.static_lines() {
        draw(brick, text)?;
    }
    if let Screen::Calibration { sensor, calibrated } = screen {
        brick.lcd_text(BODY, 0, SENSOR_VALUE_Y, sensor)?;
        if !calibrated.is_empty() {
            brick.lcd_text(BODY, 0, CALIBRATED_Y, calibrated)?;
        }
    }
    Ok(())
}

/// Draw a single line without clearing.
pub fn draw<B: Brick + ?Sized>(brick: &B, text: &TextLine) -> Result<(), RobotError> {
    brick.lcd_text(text.color, text.x, text.y, text.text)
}

/// The two text buffers used by the calibration menu.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffers {
    sensor: String,
    calibrated: String,
}

impl TextBuffers {
    /// Format the live sensor reading.
    pub fn set_sensor(&mut self, reading: i32) -> &str {
        format_bounded(&mut self.sensor, format_args!("- Sensor Value: {}", reading));
        &self.sensor
    }

    /// Format the value just captured.
    pub fn set_calibrated(&mut self, value: i32) -> &str {
        format_bounded(&mut self.calibrated, format_args!("- Calibrated: {}", value));
        &self.calibrated
    }

    /// The live reading line.
    pub fn sensor(&self) -> &str {
        &self.sensor
    }

    /// The calibrated readout line; empty before the first capture.
    pub fn calibrated(&self) -> &str {
        &self.calibrated
    }
}

fn format_bounded(buffer: &mut String, args: std::fmt::Arguments<'_>) {
    buffer.clear();
    // Writing to a String cannot fail.
    let _ = buffer.write_fmt(args);
    if buffer.len() >= TEXT_BUFFER_LEN {
        let mut end = TEXT_BUFFER_LEN - 1;
        while !buffer.is_char_boundary(end) {
            end -= 1;
        }
        buffer.truncate(end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffers_format_readings() {
        let mut buffers = TextBuffers::default();
        assert_eq!(buffers.calibrated(), "");
        assert_eq!(buffers.set_sensor(-3), "- Sensor Value: -3");
        assert_eq!(buffers.set_calibrated(42), "- Calibrated: 42");
        assert_eq!(buffers.set_sensor(7), "- Sensor Value: 7");
        assert_eq!(buffers.calibrated(), "- Calibrated: 42");
    }

    #[test]
    fn test_buffer_is_bounded() {
        let mut buffer = String::new();
        format_bounded(&mut buffer, format_args!("{}", "x".repeat(80)));
        assert_eq!(buffer.len(), TEXT_BUFFER_LEN - 1);
    }
}
