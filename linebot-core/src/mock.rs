//! Mock brick and clock for testing.

use crate::clock::Clock;
use crate::error::RobotError;
use crate::hardware::{Brick, Button, InputPort, LedPattern, Outputs, SensorMode};

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// A hardware call recorded by [`MockBrick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `set_speed`.
    SetSpeed {
        /// Target outputs.
        outputs: Outputs,
        /// Requested speed.
        speed: i8,
    },
    /// `on`.
    On(Outputs),
    /// `off`.
    Off(Outputs),
    /// `rotate`.
    Rotate {
        /// Target outputs.
        outputs: Outputs,
        /// Requested speed.
        speed: i8,
        /// Relative angle in degrees.
        angle: i32,
    },
    /// `reset_tacho_counts`.
    ResetTachoCounts(Outputs),
    /// `set_sensor_mode`.
    SensorMode {
        /// Configured port.
        port: InputPort,
        /// Selected mode.
        mode: SensorMode,
    },
    /// `set_led`.
    Led(LedPattern),
    /// `lcd_clean`.
    LcdClean,
    /// `lcd_text`.
    LcdText {
        /// Color.
        color: u8,
        /// Horizontal position.
        x: i16,
        /// Vertical position.
        y: i16,
        /// The text drawn.
        text: String,
    },
}

/// Values handed out in order; the last one repeats once the queue is empty.
#[derive(Debug, Clone)]
struct Script<T> {
    queue: VecDeque<T>,
    last: T,
}

impl<T: Copy> Script<T> {
    fn constant(value: T) -> Self {
        Self {
            queue: VecDeque::new(),
            last: value,
        }
    }

    fn replace(&mut self, values: impl IntoIterator<Item = T>) {
        self.queue = values.into_iter().collect();
        if let Some(&last) = self.queue.back() {
            self.last = last;
        }
    }

    fn next(&mut self) -> T {
        self.queue.pop_front().unwrap_or(self.last)
    }
}

#[derive(Debug, Default)]
struct MockState {
    sensors: HashMap<InputPort, Script<i32>>,
    buttons: HashMap<Button, Script<bool>>,
    failing: HashSet<InputPort>,
    reads: HashMap<InputPort, usize>,
    commands: Vec<Command>,
}

/// A mock brick for testing.
///
/// Sensors read 0 and buttons read released unless scripted. Scripted values
/// are handed out one per read, and the last one repeats afterwards. Every
/// output call is recorded as a [`Command`].
///
/// # Example
///
/// ```
/// use linebot_core::{Brick, Button, Command, InputPort, MockBrick, Outputs};
///
/// let mock = MockBrick::new();
/// mock.script_sensor(InputPort::Port3, [12, 40]);
/// mock.set_button(Button::Enter, true);
///
/// assert_eq!(mock.read_sensor(InputPort::Port3).unwrap(), 12);
/// assert_eq!(mock.read_sensor(InputPort::Port3).unwrap(), 40);
/// assert_eq!(mock.read_sensor(InputPort::Port3).unwrap(), 40);
/// assert!(mock.button_is_down(Button::Enter).unwrap());
///
/// mock.on(Outputs::BC).unwrap();
/// assert_eq!(mock.commands(), vec![Command::On(Outputs::BC)]);
/// ```
pub struct MockBrick {
    state: Mutex<MockState>,
}

impl MockBrick {
    /// Create a mock brick with every sensor at 0 and every button released.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
        }
    }

    /// Make the sensor on `port` read `value` from now on.
    pub fn set_sensor(&self, port: InputPort, value: i32) {
        self.state
            .lock()
            .unwrap()
            .sensors
            .insert(port, Script::constant(value));
    }

    /// Queue readings for the sensor on `port`.
    pub fn script_sensor(&self, port: InputPort, values: impl IntoIterator<Item = i32>) {
        self.state
            .lock()
            .unwrap()
            .sensors
            .entry(port)
            .or_insert_with(|| Script::constant(0))
            .replace(values);
    }

    /// Hold `button` down (or release it) from now on.
    pub fn set_button(&self, button: Button, down: bool) {
        self.state
            .lock()
            .unwrap()
            .buttons
            .insert(button, Script::constant(down));
    }

    /// Queue levels for `button`.
    pub fn script_button(&self, button: Button, levels: impl IntoIterator<Item = bool>) {
        self.state
            .lock()
            .unwrap()
            .buttons
            .entry(button)
            .or_insert_with(|| Script::constant(false))
            .replace(levels);
    }

    /// Make every read of `port` fail with [`RobotError::SensorRead`].
    pub fn fail_sensor(&self, port: InputPort) {
        self.state.lock().unwrap().failing.insert(port);
    }

    /// Number of reads taken from `port` so far.
    pub fn sensor_reads(&self, port: InputPort) -> usize {
        self.state
            .lock()
            .unwrap()
            .reads
            .get(&port)
            .copied()
            .unwrap_or(0)
    }

    /// All recorded commands.
    pub fn commands(&self) -> Vec<Command> {
        self.state.lock().unwrap().commands.clone()
    }

    /// Return and forget all recorded commands.
    pub fn take_commands(&self) -> Vec<Command> {
        std::mem::take(&mut self.state.lock().unwrap().commands)
    }

    fn record(&self, command: Command) -> Result<(), RobotError> {
        self.state.lock().unwrap().commands.push(command);
        Ok(())
    }
}

impl Default for MockBrick {
    fn default() -> Self {
        Self::new()
    }
}

impl Brick for MockBrick {
    fn set_speed(&self, outputs: Outputs, speed: i8) -> Result<(), RobotError> {
        self.record(Command::SetSpeed { outputs, speed })
    }

    fn on(&self, outputs: Outputs) -> Result<(), RobotError> {
        self.record(Command::On(outputs))
    }

    fn off(&self, outputs: Outputs) -> Result<(), RobotError> {
        self.record(Command::Off(outputs))
    }

    fn rotate(&self, outputs: Outputs, speed: i8, angle: i32) -> Result<(), RobotError> {
        self.record(Command::Rotate {
            outputs,
            speed,
            angle,
        })
    }

    fn reset_tacho_counts(&self, outputs: Outputs) -> Result<(), RobotError> {
        self.record(Command::ResetTachoCounts(outputs))
    }

    fn set_sensor_mode(&self, port: InputPort, mode: SensorMode) -> Result<(), RobotError> {
        self.record(Command::SensorMode { port, mode })
    }

    fn read_sensor(&self, port: InputPort) -> Result<i32, RobotError> {
        let mut state = self.state.lock().unwrap();
        *state.reads.entry(port).or_insert(0) += 1;
        if state.failing.contains(&port) {
            return Err(RobotError::SensorRead { port, code: -1 });
        }
        Ok(state.sensors.get_mut(&port).map_or(0, Script::next))
    }

    fn button_is_down(&self, button: Button) -> Result<bool, RobotError> {
        let mut state = self.state.lock().unwrap();
        Ok(state.buttons.get_mut(&button).is_some_and(Script::next))
    }

    fn set_led(&self, pattern: LedPattern) -> Result<(), RobotError> {
        self.record(Command::Led(pattern))
    }

    fn lcd_clean(&self) -> Result<(), RobotError> {
        self.record(Command::LcdClean)
    }

    fn lcd_text(&self, color: u8, x: i16, y: i16, text: &str) -> Result<(), RobotError> {
        self.record(Command::LcdText {
            color,
            x,
            y,
            text: text.to_string(),
        })
    }
}

/// A synthetic clock that only advances when slept on.
#[derive(Debug, Default)]
pub struct MockClock {
    now: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl MockClock {
    /// Create a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward without recording a sleep.
    pub fn advance(&self, duration: Duration) {
        *self.now.lock().unwrap() += duration;
    }

    /// Every sleep requested so far.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        self.advance(duration);
    }
}
