/// Held-key set and discrete action dispatch.
///
/// The input source delivers raw `{code, is_down}` transitions once per frame.
/// This module derives:
///   - the set of keys currently held (continuous movement)
///   - discrete actions on fresh presses only (a repeat of a held key is ignored)
///   - the hidden `t p s` sequence, as a tiny FSM
///
/// ## Cheat sequence
///
/// ```text
///   alphabet: Other | First(t) | Second(p) | Third(s)
///
///   any      ──First──▶  SawFirst
///   SawFirst ──Second─▶  SawSecond
///   SawSecond──Third──▶  Idle  (fires)
///   anything else      ▶  Idle
/// ```

use std::collections::HashMap;

use crossterm::event::KeyCode;

pub const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a')];
pub const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d')];
pub const KEYS_JUMP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char(' ')];
pub const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc];
pub const KEY_PALETTE: KeyCode = KeyCode::Char('t');
const CHEAT_SECOND: KeyCode = KeyCode::Char('p');
const CHEAT_THIRD: KeyCode = KeyCode::Char('s');

/// Device a transition came from. Each source holds its keys independently.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeySource {
    Keyboard,
    Gamepad,
}

impl KeySource {
    fn bit(self) -> u8 {
        1 << self as u8
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct KeyTransition {
    pub code: KeyCode,
    pub is_down: bool,
    pub source: KeySource,
}

impl KeyTransition {
    pub fn down(code: KeyCode) -> Self {
        KeyTransition { code: normalize(code), is_down: true, source: KeySource::Keyboard }
    }

    pub fn up(code: KeyCode) -> Self {
        KeyTransition { code: normalize(code), is_down: false, source: KeySource::Keyboard }
    }

    pub fn via(self, source: KeySource) -> Self {
        KeyTransition { source, ..self }
    }
}

/// Letters are tracked lower-case so Shift does not split a key in two.
pub fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Quit,
    Jump,
    TogglePalette,
    ToggleTickLabel,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum CheatKey {
    Other,
    First,
    Second,
    Third,
}

impl CheatKey {
    fn classify(code: KeyCode) -> Self {
        match code {
            KEY_PALETTE => CheatKey::First,
            CHEAT_SECOND => CheatKey::Second,
            CHEAT_THIRD => CheatKey::Third,
            _ => CheatKey::Other,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum CheatState {
    Idle,
    SawFirst,
    SawSecond,
}

impl CheatState {
    /// Next state, and whether the sequence just completed.
    fn advance(self, key: CheatKey) -> (CheatState, bool) {
        match (self, key) {
            (_, CheatKey::First) => (CheatState::SawFirst, false),
            (CheatState::SawFirst, CheatKey::Second) => (CheatState::SawSecond, false),
            (CheatState::SawSecond, CheatKey::Third) => (CheatState::Idle, true),
            _ => (CheatState::Idle, false),
        }
    }
}

pub struct InputTracker {
    /// Held keys, with one bit per source holding them.
    held: HashMap<KeyCode, u8>,
    cheat: CheatState,
}

impl InputTracker {
    pub fn new() -> Self {
        InputTracker {
            held: HashMap::with_capacity(16),
            cheat: CheatState::Idle,
        }
    }

    /// Apply one frame's transitions. Returns the actions they trigger, in order.
    pub fn consume(&mut self, transitions: &[KeyTransition]) -> Vec<Action> {
        let mut actions = Vec::new();
        for t in transitions {
            let code = normalize(t.code);
            let bit = t.source.bit();
            if !t.is_down {
                if let Some(sources) = self.held.get_mut(&code) {
                    *sources &= !bit;
                    if *sources == 0 {
                        self.held.remove(&code);
                    }
                }
                continue;
            }
            let sources = self.held.entry(code).or_insert(0);
            let fresh = *sources == 0;
            *sources |= bit;
            if !fresh {
                continue;
            }

            if KEYS_QUIT.contains(&code) {
                actions.push(Action::Quit);
            }
            if KEYS_JUMP.contains(&code) {
                actions.push(Action::Jump);
            }
            if code == KEY_PALETTE {
                actions.push(Action::TogglePalette);
            }

            let (next, fired) = self.cheat.advance(CheatKey::classify(code));
            self.cheat = next;
            if fired {
                actions.push(Action::ToggleTickLabel);
            }
        }
        actions
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.held.contains_key(&code)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }
}
