use std::fmt;

/// Key codes representing individual keys on the keyboard.
///
/// This enum provides a platform-agnostic representation of keys.
/// Hosts should map their platform-specific key events to these codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A character key. Hosts should normalize to lowercase for consistency
    /// unless SHIFT is held.
    Char(char),
    /// The Escape key, used to cancel awaiting-input phases.
    Esc,
    /// The Enter/Return key.
    Enter,
    /// The Backspace key.
    Backspace,
    /// The Tab key.
    Tab,
}

bitflags::bitflags! {
    /// Keyboard modifier flags.
    ///
    /// These can be combined to represent multiple modifiers held
    /// simultaneously.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const META  = 0b1000;
    }
}

/// A key press event with optional modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key that was pressed.
    pub code: KeyCode,
    /// Modifier keys held during the key press.
    pub mods: Modifiers,
}

impl KeyEvent {
    /// A plain (unmodified) character key.
    pub const fn char(c: char) -> Self {
        Self {
            code: KeyCode::Char(c),
            mods: Modifiers::empty(),
        }
    }

    /// Whether this key cancels an awaiting-input phase: `<Esc>` or `<C-c>`.
    pub fn is_cancel(&self) -> bool {
        matches!(self.code, KeyCode::Esc)
            || (self.mods.contains(Modifiers::CTRL) && self.code == KeyCode::Char('c'))
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ctrl = self.mods.contains(Modifiers::CTRL);
        match (self.code, ctrl) {
            (KeyCode::Char(c), false) => write!(f, "{c}"),
            (KeyCode::Char(c), true) => write!(f, "<C-{c}>"),
            (KeyCode::Esc, _) => f.write_str("<Esc>"),
            (KeyCode::Enter, _) => f.write_str("<CR>"),
            (KeyCode::Backspace, _) => f.write_str("<BS>"),
            (KeyCode::Tab, _) => f.write_str("<Tab>"),
        }
    }
}

bitflags::bitflags! {
    /// The set of editor modes a combo registration is active in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ModeSet: u8 {
        const NORMAL   = 0b00001;
        const INSERT   = 0b00010;
        const VISUAL   = 0b00100;
        const CMDLINE  = 0b01000;
        const TERMINAL = 0b10000;
    }
}

/// A single editor mode, as reported with each observed keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Insert,
    Visual,
    Cmdline,
    Terminal,
}

impl Mode {
    pub(crate) fn as_set(self) -> ModeSet {
        match self {
            Mode::Normal => ModeSet::NORMAL,
            Mode::Insert => ModeSet::INSERT,
            Mode::Visual => ModeSet::VISUAL,
            Mode::Cmdline => ModeSet::CMDLINE,
            Mode::Terminal => ModeSet::TERMINAL,
        }
    }
}

impl fmt::Display for ModeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (flag, short) in [
            (ModeSet::NORMAL, 'n'),
            (ModeSet::INSERT, 'i'),
            (ModeSet::VISUAL, 'x'),
            (ModeSet::CMDLINE, 'c'),
            (ModeSet::TERMINAL, 't'),
        ] {
            if self.contains(flag) {
                if !first {
                    f.write_str(",")?;
                }
                write!(f, "{short}")?;
                first = false;
            }
        }
        Ok(())
    }
}
