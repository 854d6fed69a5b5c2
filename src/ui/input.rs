/// Keyboard event source.
///
/// Turns crossterm key events into `{code, is_down}` transitions, once per
/// frame, without blocking.
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't
/// support it: a key with no Press/Repeat for `hold_timeout` is reported up.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::sim::input::{normalize, KeyTransition};

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each held key.
    last_active: HashMap<KeyCode, Instant>,

    hold_timeout: Duration,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    honor_release: bool,

    ctrl_c: bool,
}

impl InputState {
    pub fn new(honor_release: bool, hold_timeout: Duration) -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            hold_timeout,
            honor_release,
            ctrl_c: false,
        }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn drain_events(&mut self) -> Vec<KeyTransition> {
        let mut out = Vec::new();
        self.ctrl_c = false;

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.apply_key(key, Instant::now(), &mut out);
            }
        }

        self.expire(Instant::now(), &mut out);
        out
    }

    /// Was Ctrl+C seen during the last drain?
    pub fn ctrl_c_pressed(&self) -> bool {
        self.ctrl_c
    }

    // ── Internal ──

    fn apply_key(&mut self, key: KeyEvent, now: Instant, out: &mut Vec<KeyTransition>) {
        let code = normalize(key.code);
        if key.modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
            self.ctrl_c = true;
            return;
        }

        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                if self.last_active.remove(&code).is_some() {
                    out.push(KeyTransition::up(code));
                }
            }
            // Unconfirmed release reports are ignored; expiry handles them.
            KeyEventKind::Release => {}
            _ => {
                if self.last_active.insert(code, now).is_none() {
                    out.push(KeyTransition::down(code));
                }
            }
        }
    }

    fn expire(&mut self, now: Instant, out: &mut Vec<KeyTransition>) {
        if self.honor_release {
            return;
        }
        let timeout = self.hold_timeout;
        self.last_active.retain(|code, t| {
            let alive = now.duration_since(*t) < timeout;
            if !alive {
                out.push(KeyTransition::up(*code));
            }
            alive
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent { code, modifiers: KeyModifiers::NONE, kind, state: KeyEventState::NONE }
    }

    #[test]
    fn repeats_report_one_down() {
        let mut input = InputState::new(false, Duration::from_millis(160));
        let now = Instant::now();
        let mut out = vec![];
        input.apply_key(key(KeyCode::Left, KeyEventKind::Press), now, &mut out);
        input.apply_key(key(KeyCode::Left, KeyEventKind::Repeat), now, &mut out);
        assert_eq!(out, vec![KeyTransition::down(KeyCode::Left)]);
    }

    #[test]
    fn silent_key_times_out_into_release() {
        let mut input = InputState::new(false, Duration::from_millis(160));
        let start = Instant::now();
        let mut out = vec![];
        input.apply_key(key(KeyCode::Char('D'), KeyEventKind::Press), start, &mut out);
        input.expire(start + Duration::from_millis(100), &mut out);
        assert_eq!(out.len(), 1);
        input.expire(start + Duration::from_millis(200), &mut out);
        assert_eq!(out, vec![
            KeyTransition::down(KeyCode::Char('d')),
            KeyTransition::up(KeyCode::Char('d')),
        ]);
    }

    #[test]
    fn release_events_only_count_when_honored() {
        let now = Instant::now();
        let mut out = vec![];
        let mut input = InputState::new(false, Duration::from_millis(160));
        input.apply_key(key(KeyCode::Up, KeyEventKind::Press), now, &mut out);
        input.apply_key(key(KeyCode::Up, KeyEventKind::Release), now, &mut out);
        assert_eq!(out.len(), 1);

        let mut out = vec![];
        let mut input = InputState::new(true, Duration::from_millis(160));
        input.apply_key(key(KeyCode::Up, KeyEventKind::Press), now, &mut out);
        input.expire(now + Duration::from_secs(5), &mut out);
        input.apply_key(key(KeyCode::Up, KeyEventKind::Release), now, &mut out);
        assert_eq!(out, vec![KeyTransition::down(KeyCode::Up), KeyTransition::up(KeyCode::Up)]);
    }

    #[test]
    fn ctrl_c_is_flagged_not_forwarded() {
        let mut input = InputState::new(false, Duration::from_millis(160));
        let mut out = vec![];
        let mut k = key(KeyCode::Char('c'), KeyEventKind::Press);
        k.modifiers = KeyModifiers::CONTROL;
        input.apply_key(k, Instant::now(), &mut out);
        assert!(input.ctrl_c_pressed());
        assert!(out.is_empty());
    }
}
