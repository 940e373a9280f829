//! EV3 brick backed by the EV3 C library.
//!
//! The library is loaded at runtime and its exported functions are resolved by
//! name on every call.

use crate::error::RobotError;
use crate::hardware::{Brick, Button, InputPort, LedPattern, Outputs, SensorMode};

use libloading::{Library, Symbol};
use log::{debug, info, trace};
use std::ffi::{CString, OsStr, c_char, c_int, c_short};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// Value `readSensor` returns when a port cannot be read.
const READ_ERROR: c_int = -1;

/// Teardown routines called on drop, in order.
const EXIT_SYMBOLS: [&str; 4] = ["ButtonLedExit", "LcdExit", "SensorsExit", "OutputExit"];

type BoolFn = unsafe extern "C" fn() -> bool;
type IntFn = unsafe extern "C" fn() -> c_int;
type OutputsFn = unsafe extern "C" fn(u8);

/// Guard to ensure only one brick instance exists at a time.
static INSTANCE_EXISTS: AtomicBool = AtomicBool::new(false);

/// The physical EV3 brick.
///
/// # Example
///
/// ```no_run
/// use linebot_core::{Brick, Ev3Brick, LedPattern};
///
/// let brick = Ev3Brick::new("libev3api.so")?;
/// brick.set_led(LedPattern::Orange)?;
/// # Ok::<(), linebot_core::RobotError>(())
/// ```
///
/// # Limitations
///
/// Only one instance can exist at a time; the library keeps global device
/// handles.
pub struct Ev3Brick {
    lib: Library,
}

impl Ev3Brick {
    /// Load the library at `path` and initialize outputs, sensors, display
    /// and buttons.
    ///
    /// # Errors
    ///
    /// - [`RobotError::AlreadyInitialized`] if another instance already exists
    /// - [`RobotError::LibraryLoad`] if the library or a symbol fails to load
    /// - [`RobotError::InitFailed`] if a subsystem fails to initialize
    pub fn new(path: impl AsRef<OsStr>) -> Result<Self, RobotError> {
        if INSTANCE_EXISTS.swap(true, Ordering::SeqCst) {
            return Err(RobotError::AlreadyInitialized);
        }

        match Self::init_internal(path.as_ref()) {
            Ok(brick) => Ok(brick),
            Err(e) => {
                INSTANCE_EXISTS.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    fn init_internal(path: &OsStr) -> Result<Self, RobotError> {
        let lib = unsafe { Library::new(path)? };
        let brick = Self { lib };

        brick.init_subsystem("OutputInit")?;
        let sensors = unsafe {
            let init: Symbol<IntFn> = brick.lib.get(b"initSensors")?;
            init()
        };
        if sensors < 0 {
            return Err(RobotError::InitFailed("initSensors"));
        }
        brick.init_subsystem("LcdInit")?;
        brick.init_subsystem("ButtonLedInit")?;

        info!("EV3 brick initialized from {}", Path::new(path).display());
        Ok(brick)
    }

    fn init_subsystem(&self, symbol: &'static str) -> Result<(), RobotError> {
        if self.call_bool(symbol)? {
            debug!("{} ok", symbol);
            Ok(())
        } else {
            Err(RobotError::InitFailed(symbol))
        }
    }

    fn call_bool(&self, symbol: &'static str) -> Result<bool, RobotError> {
        unsafe {
            let func: Symbol<BoolFn> = self.lib.get(symbol.as_bytes())?;
            Ok(func())
        }
    }

    fn call_outputs(&self, symbol: &'static str, outputs: Outputs) -> Result<(), RobotError> {
        trace!("{}({})", symbol, outputs);
        unsafe {
            let func: Symbol<OutputsFn> = self.lib.get(symbol.as_bytes())?;
            func(outputs.bits());
        }
        Ok(())
    }
}

impl Brick for Ev3Brick {
    fn set_speed(&self, outputs: Outputs, speed: i8) -> Result<(), RobotError> {
        trace!("SetSpeed({}, {})", outputs, speed);
        unsafe {
            type SetSpeedFn = unsafe extern "C" fn(u8, i8);
            let set_speed: Symbol<SetSpeedFn> = self.lib.get(b"SetSpeed")?;
            set_speed(outputs.bits(), speed);
        }
        Ok(())
    }

    fn on(&self, outputs: Outputs) -> Result<(), RobotError> {
        self.call_outputs("On", outputs)
    }

    fn off(&self, outputs: Outputs) -> Result<(), RobotError> {
        self.call_outputs("Off", outputs)
    }

    fn rotate(&self, outputs: Outputs, speed: i8, angle: i32) -> Result<(), RobotError> {
        trace!("RotateMotor({}, {}, {})", outputs, speed, angle);
        unsafe {
            type RotateFn = unsafe extern "C" fn(u8, i8, c_int);
            let rotate: Symbol<RotateFn> = self.lib.get(b"RotateMotor")?;
            rotate(outputs.bits(), speed, angle);
        }
        Ok(())
    }

    fn reset_tacho_counts(&self, outputs: Outputs) -> Result<(), RobotError> {
        self.call_outputs("ResetAllTachoCounts", outputs)
    }

    fn set_sensor_mode(&self, port: InputPort, mode: SensorMode) -> Result<(), RobotError> {
        let result = unsafe {
            type SetModeFn = unsafe extern "C" fn(c_int, c_int) -> c_int;
            let set_mode: Symbol<SetModeFn> = self.lib.get(b"setSensorMode")?;
            set_mode(port.raw(), mode.raw())
        };
        debug!("set {} to {:?}, result: {}", port, mode, result);

        if result < 0 {
            Err(RobotError::CallFailed("setSensorMode"))
        } else {
            Ok(())
        }
    }

    fn read_sensor(&self, port: InputPort) -> Result<i32, RobotError> {
        let value = unsafe {
            type ReadFn = unsafe extern "C" fn(c_int) -> c_int;
            let read: Symbol<ReadFn> = self.lib.get(b"readSensor")?;
            read(port.raw())
        };
        trace!("readSensor({}) = {}", port, value);

        if value == READ_ERROR {
            Err(RobotError::SensorRead { port, code: value })
        } else {
            Ok(value)
        }
    }

    fn button_is_down(&self, button: Button) -> Result<bool, RobotError> {
        unsafe {
            type ButtonFn = unsafe extern "C" fn(u8) -> bool;
            let is_down: Symbol<ButtonFn> = self.lib.get(b"ButtonIsDown")?;
            Ok(is_down(button.raw()))
        }
    }

    fn set_led(&self, pattern: LedPattern) -> Result<(), RobotError> {
        trace!("SetLedPattern({:?})", pattern);
        unsafe {
            type LedFn = unsafe extern "C" fn(u8);
            let set_led: Symbol<LedFn> = self.lib.get(b"SetLedPattern")?;
            set_led(pattern.raw());
        }
        Ok(())
    }

    fn lcd_clean(&self) -> Result<(), RobotError> {
        if self.call_bool("LcdClean")? {
            Ok(())
        } else {
            Err(RobotError::CallFailed("LcdClean"))
        }
    }

    fn lcd_text(&self, color: u8, x: i16, y: i16, text: &str) -> Result<(), RobotError> {
        let text = CString::new(text)?;
        let ok = unsafe {
            type TextFn = unsafe extern "C" fn(c_char, c_short, c_short, *const c_char) -> bool;
            let lcd_text: Symbol<TextFn> = self.lib.get(b"LcdText")?;
            lcd_text(color as c_char, x, y, text.as_ptr())
        };

        if ok {
            Ok(())
        } else {
            Err(RobotError::CallFailed("LcdText"))
        }
    }
}

impl Drop for Ev3Brick {
    fn drop(&mut self) {
        let _ = self.off(Outputs::ALL);
        for symbol in EXIT_SYMBOLS {
            unsafe {
                if let Ok(exit) = self.lib.get::<BoolFn>(symbol.as_bytes()) {
                    exit();
                }
            }
        }
        INSTANCE_EXISTS.store(false, Ordering::SeqCst);
    }
}
