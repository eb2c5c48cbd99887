use evdev::Key;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Repeated firings of the same chord within this window are coalesced
/// into one action (key-repeat storms, duplicate device reports).
pub const DEBOUNCE: Duration = Duration::from_millis(250);

const KEY_UP: i32 = 0;
const KEY_DOWN: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotkeyAction {
    MuteOrPause,
    UnmuteOrResume,
    Toggle,
    Stop,
}

/// Ctrl+Shift+<key> chord bindings.
const BINDINGS: &[(Key, HotkeyAction)] = &[
    (Key::KEY_A, HotkeyAction::MuteOrPause),
    (Key::KEY_S, HotkeyAction::UnmuteOrResume),
    (Key::KEY_M, HotkeyAction::Toggle),
    (Key::KEY_D, HotkeyAction::Stop),
];

/// Chord state machine over raw key-transition events.
///
/// All mutable state (modifier flags, per-binding debounce timestamps)
/// lives here so the machine can be driven with synthetic event sequences
/// in tests; the clock is passed in by the caller for the same reason.
pub struct HotkeyMachine {
    ctrl: bool,
    shift: bool,
    last_fired: HashMap<HotkeyAction, Instant>,
}

impl Default for HotkeyMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl HotkeyMachine {
    pub fn new() -> Self {
        Self {
            ctrl: false,
            shift: false,
            last_fired: HashMap::new(),
        }
    }

    /// Feed one key-transition event (value 0 = up, 1 = down, 2 = repeat).
    /// Returns the action to fire, if any.
    pub fn handle(&mut self, key: Key, value: i32, now: Instant) -> Option<HotkeyAction> {
        if key == Key::KEY_LEFTCTRL || key == Key::KEY_RIGHTCTRL {
            self.ctrl = value != KEY_UP;
            return None;
        }
        if key == Key::KEY_LEFTSHIFT || key == Key::KEY_RIGHTSHIFT {
            self.shift = value != KEY_UP;
            return None;
        }
        // Only fresh presses count; repeats are handled by the debounce
        // window anyway but must never register as a new chord.
        if value != KEY_DOWN {
            return None;
        }
        if !(self.ctrl && self.shift) {
            return None;
        }

        let action = BINDINGS
            .iter()
            .find(|(bound, _)| *bound == key)
            .map(|(_, action)| *action)?;

        match self.last_fired.get(&action) {
            Some(&last) if now.duration_since(last) < DEBOUNCE => {
                log::debug!("debounced {:?}", action);
                None
            }
            _ => {
                self.last_fired.insert(action, now);
                Some(action)
            }
        }
    }
}
