use std::collections::VecDeque;

use keyspan::{InputSource, KeyCode, KeyEvent, Modifiers};

/// Scripted input: keystrokes and prompt answers are queued up front. An
/// exhausted queue reads as a cancel, so a test that forgets to script an
/// answer aborts instead of hanging.
#[derive(Default)]
pub struct MockInput {
    keys: VecDeque<KeyEvent>,
    strings: VecDeque<Option<String>>,
    pub prompts: Vec<String>,
    pub helps: Vec<String>,
}

impl MockInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue each character of `s` as a plain keystroke.
    pub fn keys(s: &str) -> Self {
        let mut input = Self::new();
        for c in s.chars() {
            input.push_key(KeyEvent::char(c));
        }
        input
    }

    pub fn push_key(&mut self, key: KeyEvent) -> &mut Self {
        self.keys.push_back(key);
        self
    }

    pub fn push_cancel_key(&mut self) -> &mut Self {
        self.push_key(KeyEvent {
            code: KeyCode::Esc,
            mods: Modifiers::empty(),
        })
    }

    pub fn push_string(&mut self, s: &str) -> &mut Self {
        self.strings.push_back(Some(s.to_string()));
        self
    }

    pub fn push_cancel_string(&mut self) -> &mut Self {
        self.strings.push_back(None);
        self
    }
}

impl InputSource for MockInput {
    fn read_key(&mut self, help: &str) -> KeyEvent {
        self.helps.push(help.to_string());
        self.keys.pop_front().unwrap_or(KeyEvent {
            code: KeyCode::Esc,
            mods: Modifiers::empty(),
        })
    }

    fn read_string(&mut self, prompt: &str) -> Option<String> {
        self.prompts.push(prompt.to_string());
        self.strings.pop_front().flatten()
    }
}
