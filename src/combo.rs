//! Combo detection: short, timed key sequences retroactively replaced by a
//! configured action.
//!
//! Matching is purely observational: the raw key is always processed by
//! the host, and only a completed match asks the host to undo the typed
//! keys and feed the action instead. Every registration is an independent
//! state machine; all of them are evaluated on every keystroke, in
//! registration order.

use std::fmt;

use log::trace;

use crate::error::Error;
use crate::key::{KeyEvent, Mode, ModeSet};

pub type ComboId = u64;

/// The action fired when a combo's key sequence completes in time.
pub enum ComboAction {
    /// Feed these keys through normal mapping resolution.
    Keys(String),
    /// Invoke synchronously at match time; a returned string is fed as
    /// keys.
    Call(Box<dyn FnMut() -> Option<String>>),
}

impl fmt::Debug for ComboAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComboAction::Keys(s) => f.debug_tuple("Keys").field(s).finish(),
            ComboAction::Call(_) => f.write_str("Call(..)"),
        }
    }
}

/// Where an observed keystroke came from. Keys a combo's own action
/// emulates are invisible to that combo but observed by every other one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Typed,
    Emulated(ComboId),
}

/// A completed match. The host deletes the `erase_count` just-typed
/// characters (undoing the raw insertion), then feeds `keys` through the
/// normal mapping-resolution path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboFire {
    pub id: ComboId,
    pub namespace: String,
    pub erase_count: usize,
    pub keys: Option<String>,
}

struct Combo {
    id: ComboId,
    namespace: String,
    modes: ModeSet,
    keys: Vec<KeyEvent>,
    action: ComboAction,
    delay_ms: u64,
    progress: usize,
    last_key_ms: u64,
}

impl Combo {
    /// Advance this combo's state machine for one observed key. Returns a
    /// fire when the full sequence has typed out in time.
    fn observe(&mut self, mode: Mode, key: KeyEvent, now_ms: u64) -> Option<ComboFire> {
        if !self.modes.contains(mode.as_set()) {
            self.progress = 0;
            return None;
        }

        let in_time =
            self.progress == 0 || now_ms.saturating_sub(self.last_key_ms) <= self.delay_ms;
        if in_time && key == self.keys[self.progress] {
            self.progress += 1;
            self.last_key_ms = now_ms;
        } else {
            // Reset, then re-evaluate this key as a fresh start.
            self.progress = 0;
            if key == self.keys[0] {
                self.progress = 1;
                self.last_key_ms = now_ms;
            }
        }
        trace!("combo {}: progress {}", self.namespace, self.progress);

        if self.progress < self.keys.len() {
            return None;
        }
        self.progress = 0;
        let keys = match &mut self.action {
            ComboAction::Keys(s) => Some(s.clone()),
            ComboAction::Call(f) => f(),
        };
        Some(ComboFire {
            id: self.id,
            namespace: self.namespace.clone(),
            erase_count: self.keys.len(),
            keys,
        })
    }
}

/// The process-wide combo registry: created once at setup, entries added
/// and removed by explicit calls, never garbage-collected implicitly.
#[derive(Default)]
pub struct ComboRegistry {
    combos: Vec<Combo>,
    next_id: ComboId,
}

impl fmt::Debug for ComboRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComboRegistry")
            .field("combos", &self.combos.iter().map(|c| &c.namespace).collect::<Vec<_>>())
            .finish()
    }
}

impl ComboRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a combo for the given mode set. The returned id names a
    /// unique namespace (`combo:<id>:<modes>:<lhs>`) for later query or
    /// removal.
    pub fn register(
        &mut self,
        modes: ModeSet,
        keys: &[KeyEvent],
        action: ComboAction,
        delay_ms: u64,
    ) -> Result<ComboId, Error> {
        if keys.is_empty() {
            return Err(Error::InvalidInput("combo needs at least one key".into()));
        }
        if modes.is_empty() {
            return Err(Error::InvalidInput("combo needs at least one mode".into()));
        }
        self.next_id += 1;
        let id = self.next_id;
        let lhs: String = keys.iter().map(ToString::to_string).collect();
        let namespace = format!("combo:{id}:{modes}:{lhs}");
        self.combos.push(Combo {
            id,
            namespace,
            modes,
            keys: keys.to_vec(),
            action,
            delay_ms,
            progress: 0,
            last_key_ms: 0,
        });
        Ok(id)
    }

    /// Unregister. Returns false when the id is unknown.
    pub fn remove(&mut self, id: ComboId) -> bool {
        let before = self.combos.len();
        self.combos.retain(|c| c.id != id);
        self.combos.len() != before
    }

    pub fn namespace(&self, id: ComboId) -> Option<&str> {
        self.combos
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.namespace.as_str())
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.combos.iter().map(|c| c.namespace.as_str())
    }

    /// Feed one raw keystroke to every registration. Fires are returned in
    /// registration order; the host applies each by deleting the typed
    /// keys and feeding the action keys.
    pub fn observe(
        &mut self,
        mode: Mode,
        key: KeyEvent,
        now_ms: u64,
        source: KeySource,
    ) -> Vec<ComboFire> {
        let mut fires = Vec::new();
        for combo in &mut self.combos {
            if let KeySource::Emulated(src) = source {
                if src == combo.id {
                    continue;
                }
            }
            if let Some(fire) = combo.observe(mode, key, now_ms) {
                fires.push(fire);
            }
        }
        fires
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(s: &str) -> Vec<KeyEvent> {
        s.chars().map(KeyEvent::char).collect()
    }

    #[test]
    fn namespace_encodes_id_modes_and_lhs() {
        let mut reg = ComboRegistry::new();
        let id = reg
            .register(
                ModeSet::INSERT | ModeSet::VISUAL,
                &keys("jk"),
                ComboAction::Keys("<Esc>".into()),
                200,
            )
            .unwrap();
        assert_eq!(reg.namespace(id), Some("combo:1:i,x:jk"));
    }

    #[test]
    fn mismatched_key_restarts_from_current_key() {
        let mut reg = ComboRegistry::new();
        reg.register(ModeSet::INSERT, &keys("jk"), ComboAction::Keys("x".into()), 100)
            .unwrap();
        // "jjk": the second j resets, then counts as a fresh start.
        assert!(reg.observe(Mode::Insert, KeyEvent::char('j'), 0, KeySource::Typed).is_empty());
        assert!(reg.observe(Mode::Insert, KeyEvent::char('j'), 10, KeySource::Typed).is_empty());
        let fires = reg.observe(Mode::Insert, KeyEvent::char('k'), 20, KeySource::Typed);
        assert_eq!(fires.len(), 1);
        assert_eq!(fires[0].erase_count, 2);
    }

    #[test]
    fn wrong_mode_resets_progress() {
        let mut reg = ComboRegistry::new();
        reg.register(ModeSet::INSERT, &keys("jk"), ComboAction::Keys("x".into()), 100)
            .unwrap();
        assert!(reg.observe(Mode::Insert, KeyEvent::char('j'), 0, KeySource::Typed).is_empty());
        assert!(reg.observe(Mode::Normal, KeyEvent::char('x'), 5, KeySource::Typed).is_empty());
        assert!(reg.observe(Mode::Insert, KeyEvent::char('k'), 10, KeySource::Typed).is_empty());
    }
}
