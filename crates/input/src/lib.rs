#![warn(missing_docs)]
//! Discrete input actions and the key bindings that produce them.
//!
//! The terminal front-end turns raw key events into [`Key`]s; everything
//! past this crate only sees [`Action`]s.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use asciicraft_core::Compass;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Highest session number reachable with a digit key.
pub const MAX_SESSION_HOTKEY: usize = 9;

/// One user intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Walk one voxel, or pan the camera in look-around mode.
    Step(Compass),
    /// Climb: up a ladder or onto the block ahead-and-above.
    Ascend,
    /// Climb down.
    Descend,
    /// Break the block adjacent in a direction.
    Dig(Compass),
    /// Toggle look-around mode.
    ToggleLook,
    /// Describe what sits at the camera's target voxel.
    Examine,
    /// Focus the next session.
    NextSession,
    /// Focus the session with this zero-based index.
    FocusSession(usize),
    /// Close the focused session.
    CloseSession,
    /// Leave the program.
    Quit,
}

const COMPASS_NAMES: [(Compass, &str); 8] = [
    (Compass::North, "n"),
    (Compass::NorthEast, "ne"),
    (Compass::East, "e"),
    (Compass::SouthEast, "se"),
    (Compass::South, "s"),
    (Compass::SouthWest, "sw"),
    (Compass::West, "w"),
    (Compass::NorthWest, "nw"),
];

fn compass_name(direction: Compass) -> &'static str {
    COMPASS_NAMES
        .iter()
        .find(|(d, _)| *d == direction)
        .map(|(_, name)| *name)
        .unwrap_or("?")
}

fn compass_from_name(name: &str) -> Option<Compass> {
    COMPASS_NAMES
        .iter()
        .find(|(_, n)| *n == name)
        .map(|(d, _)| *d)
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Step(d) => write!(f, "step_{}", compass_name(*d)),
            Action::Ascend => f.write_str("ascend"),
            Action::Descend => f.write_str("descend"),
            Action::Dig(d) => write!(f, "dig_{}", compass_name(*d)),
            Action::ToggleLook => f.write_str("toggle_look"),
            Action::Examine => f.write_str("examine"),
            Action::NextSession => f.write_str("next_session"),
            Action::FocusSession(i) => write!(f, "session_{}", i + 1),
            Action::CloseSession => f.write_str("close_session"),
            Action::Quit => f.write_str("quit"),
        }
    }
}

/// An action name that matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action `{0}`")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownAction(s.to_string());
        let action = match s {
            "ascend" => Action::Ascend,
            "descend" => Action::Descend,
            "toggle_look" => Action::ToggleLook,
            "examine" => Action::Examine,
            "next_session" => Action::NextSession,
            "close_session" => Action::CloseSession,
            "quit" => Action::Quit,
            _ => {
                if let Some(dir) = s.strip_prefix("step_") {
                    Action::Step(compass_from_name(dir).ok_or_else(unknown)?)
                } else if let Some(dir) = s.strip_prefix("dig_") {
                    Action::Dig(compass_from_name(dir).ok_or_else(unknown)?)
                } else if let Some(n) = s.strip_prefix("session_") {
                    match n.parse::<usize>() {
                        Ok(n) if (1..=MAX_SESSION_HOTKEY).contains(&n) => {
                            Action::FocusSession(n - 1)
                        }
                        _ => return Err(unknown()),
                    }
                } else {
                    return Err(unknown());
                }
            }
        };
        Ok(action)
    }
}

/// A key press as the front-end reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character, case preserved.
    Char(char),
    /// Tab.
    Tab,
    /// Escape.
    Esc,
    /// Ctrl+C.
    Interrupt,
}

/// Binding overrides as written in the config file: key character to
/// action name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingOverrides(pub HashMap<String, String>);

/// Key to action table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    map: HashMap<Key, Action>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut map = HashMap::new();
        let keypad = [
            ('k', Compass::North),
            ('u', Compass::NorthEast),
            ('l', Compass::East),
            ('n', Compass::SouthEast),
            ('j', Compass::South),
            ('b', Compass::SouthWest),
            ('h', Compass::West),
            ('y', Compass::NorthWest),
        ];
        for (c, direction) in keypad {
            map.insert(Key::Char(c), Action::Step(direction));
            map.insert(Key::Char(c.to_ascii_uppercase()), Action::Dig(direction));
        }
        map.insert(Key::Char('<'), Action::Ascend);
        map.insert(Key::Char('>'), Action::Descend);
        map.insert(Key::Char('x'), Action::ToggleLook);
        map.insert(Key::Char('e'), Action::Examine);
        map.insert(Key::Tab, Action::NextSession);
        for n in 1..=MAX_SESSION_HOTKEY {
            if let Some(c) = char::from_digit(n as u32, 10) {
                map.insert(Key::Char(c), Action::FocusSession(n - 1));
            }
        }
        map.insert(Key::Char('w'), Action::CloseSession);
        map.insert(Key::Char('q'), Action::Quit);
        map.insert(Key::Interrupt, Action::Quit);
        Self { map }
    }
}

impl KeyBindings {
    /// Default bindings with `overrides` applied on top. Entries whose key
    /// is not a single character or whose action is unknown are skipped
    /// with a warning.
    pub fn with_overrides(overrides: &BindingOverrides) -> Self {
        let mut bindings = Self::default();
        for (key, action) in &overrides.0 {
            let mut chars = key.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                warn!(key = %key, "binding key must be a single character, ignoring");
                continue;
            };
            match action.parse::<Action>() {
                Ok(action) => bindings.bind(Key::Char(c), action),
                Err(err) => warn!(key = %key, %err, "ignoring binding override"),
            }
        }
        bindings
    }

    /// Bind `key`, replacing any previous action.
    pub fn bind(&mut self, key: Key, action: Action) {
        self.map.insert(key, action);
    }

    /// Action bound to `key`.
    pub fn action_for(&self, key: Key) -> Option<Action> {
        self.map.get(&key).copied()
    }

    /// Keys bound to `action`, for help text.
    pub fn keys_for(&self, action: Action) -> Vec<Key> {
        let mut keys: Vec<Key> = self
            .map
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|(k, _)| *k)
            .collect();
        keys.sort_by_key(|k| match k {
            Key::Char(c) => *c as u32,
            Key::Tab => 0x1_0000,
            Key::Esc => 0x1_0001,
            Key::Interrupt => 0x1_0002,
        });
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_keypad_covers_all_directions() {
        let bindings = KeyBindings::default();
        for direction in Compass::ALL {
            assert_eq!(bindings.keys_for(Action::Step(direction)).len(), 1);
            assert_eq!(bindings.keys_for(Action::Dig(direction)).len(), 1);
        }
        assert_eq!(
            bindings.action_for(Key::Char('h')),
            Some(Action::Step(Compass::West))
        );
        assert_eq!(
            bindings.action_for(Key::Char('N')),
            Some(Action::Dig(Compass::SouthEast))
        );
    }

    #[test]
    fn digits_focus_sessions() {
        let bindings = KeyBindings::default();
        assert_eq!(
            bindings.action_for(Key::Char('1')),
            Some(Action::FocusSession(0))
        );
        assert_eq!(
            bindings.action_for(Key::Char('9')),
            Some(Action::FocusSession(8))
        );
        assert_eq!(bindings.action_for(Key::Char('0')), None);
    }

    #[test]
    fn action_names_round_trip() {
        let actions = [
            Action::Step(Compass::NorthEast),
            Action::Dig(Compass::West),
            Action::Ascend,
            Action::Descend,
            Action::ToggleLook,
            Action::Examine,
            Action::NextSession,
            Action::FocusSession(3),
            Action::CloseSession,
            Action::Quit,
        ];
        for action in actions {
            assert_eq!(action.to_string().parse::<Action>(), Ok(action));
        }
    }

    #[test]
    fn bad_names_are_rejected() {
        assert!("step_up".parse::<Action>().is_err());
        assert!("session_0".parse::<Action>().is_err());
        assert!("session_10".parse::<Action>().is_err());
        assert!("fly".parse::<Action>().is_err());
    }

    #[test]
    fn overrides_replace_defaults_and_skip_garbage() {
        let mut raw = HashMap::new();
        raw.insert("w".to_string(), "step_n".to_string());
        raw.insert("ab".to_string(), "quit".to_string());
        raw.insert("z".to_string(), "teleport".to_string());
        let bindings = KeyBindings::with_overrides(&BindingOverrides(raw));

        assert_eq!(
            bindings.action_for(Key::Char('w')),
            Some(Action::Step(Compass::North))
        );
        assert_eq!(bindings.action_for(Key::Char('z')), None);
        assert_eq!(bindings.action_for(Key::Char('q')), Some(Action::Quit));
    }
}
