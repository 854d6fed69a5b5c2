/// Gamepad event source using gilrs.
///
/// Pad state is folded into the same key transitions the keyboard produces,
/// so the core never knows which device a key came from.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick ←→  →  Left / Right
///   D-pad / Left Stick ↑   →  Up (jump)
///   A / B                  →  jump
///   Y                      →  invert colours
///   Select                 →  quit

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};
use crossterm::event::KeyCode;

use crate::config::GamepadConfig;
use crate::sim::input::{KeySource, KeyTransition, KEY_PALETTE};

const STICK_DEADZONE: f32 = 0.25;

const PAD_JUMP: KeyCode = KeyCode::Char(' ');
const PAD_QUIT: KeyCode = KeyCode::Esc;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2  => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Action-to-button mapping (loaded from config).
struct ActionMap {
    jump: Vec<Btn>,
    quit: Vec<Btn>,
    palette: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            jump:    vec![Btn::A, Btn::B],
            quit:    vec![Btn::Select],
            palette: vec![Btn::Y],
        }
    }
}

/// Pad state as seen by the game: which logical keys are down.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
struct PadKeys {
    left: bool,
    right: bool,
    up: bool,
    jump: bool,
    quit: bool,
    palette: bool,
}

impl PadKeys {
    fn entries(&self) -> [(KeyCode, bool); 6] {
        [
            (KeyCode::Left, self.left),
            (KeyCode::Right, self.right),
            (KeyCode::Up, self.up),
            (PAD_JUMP, self.jump),
            (PAD_QUIT, self.quit),
            (KEY_PALETTE, self.palette),
        ]
    }

    /// Transitions that take `prev` to `self`.
    fn changes_since(&self, prev: &PadKeys) -> Vec<KeyTransition> {
        self.entries()
            .into_iter()
            .zip(prev.entries())
            .filter(|((_, now), (_, was))| now != was)
            .map(|((code, now), _)| {
                let t = if now { KeyTransition::down(code) } else { KeyTransition::up(code) };
                t.via(KeySource::Gamepad)
            })
            .collect()
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    // All tracked buttons (indexed by Btn)
    buttons: [bool; 10],

    // D-pad
    dpad_up: bool,
    dpad_left: bool,
    dpad_right: bool,

    // Stick
    stick_x: f32,
    stick_y: f32,

    action_map: ActionMap,

    /// What the last `update` reported.
    reported: PadKeys,

    pub connected: bool,
}

fn btn_index(btn: Btn) -> usize {
    btn as usize
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(_) => (None, false),
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [false; 10],
            dpad_up: false,
            dpad_left: false,
            dpad_right: false,
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            reported: PadKeys::default(),
            connected,
        }
    }

    /// Load button mapping from config. Unknown names are skipped; a list
    /// with no known names keeps the default.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names.iter().filter_map(|s| Btn::from_name(s)).collect()
        }
        let map = &mut self.action_map;
        let jump = parse_list(&cfg.jump);
        if !jump.is_empty() { map.jump = jump; }
        let quit = parse_list(&cfg.quit);
        if !quit.is_empty() { map.quit = quit; }
        let palette = parse_list(&cfg.palette);
        if !palette.is_empty() { map.palette = palette; }
    }

    /// Poll the pad and return the key transitions since the last call.
    pub fn update(&mut self) -> Vec<KeyTransition> {
        #[cfg(feature = "gamepad")]
        self.poll_gilrs();

        let now = self.keys();
        let changes = now.changes_since(&self.reported);
        self.reported = now;
        changes
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => { self.connected = true; }
                EventType::Disconnected => {
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        // D-pad handled separately (not in Btn enum)
        match gilrs_btn {
            Button::DPadUp    => { self.dpad_up = held; return; }
            Button::DPadLeft  => { self.dpad_left = held; return; }
            Button::DPadRight => { self.dpad_right = held; return; }
            _ => {}
        }

        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.buttons[btn_index(btn)] = held;
        }
    }

    // ── Internal ──

    fn any_held(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)])
    }

    fn keys(&self) -> PadKeys {
        PadKeys {
            left: self.dpad_left || self.stick_x < -STICK_DEADZONE,
            right: self.dpad_right || self.stick_x > STICK_DEADZONE,
            up: self.dpad_up || self.stick_y > STICK_DEADZONE,
            jump: self.any_held(&self.action_map.jump),
            quit: self.any_held(&self.action_map.quit),
            palette: self.any_held(&self.action_map.palette),
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.buttons = [false; 10];
        self.dpad_up = false;
        self.dpad_left = false;
        self.dpad_right = false;
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad_down(code: KeyCode) -> KeyTransition {
        KeyTransition::down(code).via(KeySource::Gamepad)
    }

    fn pad_up(code: KeyCode) -> KeyTransition {
        KeyTransition::up(code).via(KeySource::Gamepad)
    }

    fn pad() -> GamepadState {
        // Built by hand so tests never touch a real device.
        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: None,
            buttons: [false; 10],
            dpad_up: false,
            dpad_left: false,
            dpad_right: false,
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            reported: PadKeys::default(),
            connected: false,
        }
    }

    #[test]
    fn button_names_parse_case_insensitively() {
        assert_eq!(Btn::from_name("south"), Some(Btn::A));
        assert_eq!(Btn::from_name("Back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("turbo"), None);
    }

    #[test]
    fn stick_past_deadzone_walks() {
        let mut p = pad();
        p.stick_x = -0.1;
        assert!(p.update().is_empty());
        p.stick_x = -0.8;
        assert_eq!(p.update(), vec![pad_down(KeyCode::Left)]);
        assert!(p.update().is_empty());
        p.stick_x = 0.0;
        assert_eq!(p.update(), vec![pad_up(KeyCode::Left)]);
    }

    #[test]
    fn configured_buttons_map_to_keys() {
        let mut p = pad();
        p.load_button_config(&GamepadConfig {
            jump: vec!["X".into(), "nonsense".into()],
            quit: vec![],
            palette: vec!["R1".into()],
        });
        p.buttons[btn_index(Btn::X)] = true;
        p.buttons[btn_index(Btn::Select)] = true;
        assert_eq!(p.update(), vec![
            pad_down(PAD_JUMP),
            pad_down(PAD_QUIT),
        ]);
        p.buttons[btn_index(Btn::R1)] = true;
        assert_eq!(p.update(), vec![pad_down(KEY_PALETTE)]);
    }

    #[test]
    fn release_all_reports_ups() {
        let mut p = pad();
        p.dpad_right = true;
        p.update();
        p.release_all();
        assert_eq!(p.update(), vec![pad_up(KeyCode::Right)]);
    }
}
