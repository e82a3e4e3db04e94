//! Key classification.
//!
//! Every key event that reaches the controller falls into one of three
//! classes. Pure modifiers are dropped before they can touch the debounce
//! timer, navigation keys drive highlight/selection/shadow completion, and
//! everything else is treated as typing.

/// Key codes that never reach the controller (Shift, Ctrl, Alt, CapsLock, ArrowLeft).
pub const IGNORED_KEY_CODES: [u32; 5] = [16, 17, 18, 20, 37];

/// Key codes routed to navigation (Enter, Escape, Tab, ArrowUp, ArrowRight, ArrowDown).
pub const NAVIGATION_KEY_CODES: [u32; 6] = [13, 27, 9, 38, 39, 40];

/// A key as seen by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Shift,
    Control,
    Alt,
    CapsLock,
    ArrowLeft,
    Enter,
    Escape,
    Tab,
    ArrowUp,
    ArrowRight,
    ArrowDown,
    /// Any other key, by code.
    Other(u32),
}

/// How the controller treats a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// Pure modifier, filtered out entirely.
    Ignored,
    /// Navigation, selection or shadow acceptance.
    Navigation,
    /// Text editing; feeds the debounce scheduler.
    Text,
}

impl Key {
    /// Map a key code to a key.
    pub fn from_code(code: u32) -> Self {
        match code {
            16 => Self::Shift,
            17 => Self::Control,
            18 => Self::Alt,
            20 => Self::CapsLock,
            37 => Self::ArrowLeft,
            13 => Self::Enter,
            27 => Self::Escape,
            9 => Self::Tab,
            38 => Self::ArrowUp,
            39 => Self::ArrowRight,
            40 => Self::ArrowDown,
            other => Self::Other(other),
        }
    }

    /// The key code of this key.
    pub fn code(self) -> u32 {
        match self {
            Self::Shift => 16,
            Self::Control => 17,
            Self::Alt => 18,
            Self::CapsLock => 20,
            Self::ArrowLeft => 37,
            Self::Enter => 13,
            Self::Escape => 27,
            Self::Tab => 9,
            Self::ArrowUp => 38,
            Self::ArrowRight => 39,
            Self::ArrowDown => 40,
            Self::Other(code) => code,
        }
    }

    /// Classify this key.
    pub fn class(self) -> KeyClass {
        let code = self.code();
        if IGNORED_KEY_CODES.contains(&code) {
            KeyClass::Ignored
        } else if NAVIGATION_KEY_CODES.contains(&code) {
            KeyClass::Navigation
        } else {
            KeyClass::Text
        }
    }
}

impl From<u32> for Key {
    fn from(code: u32) -> Self {
        Self::from_code(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_matches_code_tables() {
        for code in IGNORED_KEY_CODES {
            assert_eq!(Key::from_code(code).class(), KeyClass::Ignored, "code {code}");
        }
        for code in NAVIGATION_KEY_CODES {
            assert_eq!(Key::from_code(code).class(), KeyClass::Navigation, "code {code}");
        }
        // Letters, Backspace, Delete, Space
        for code in [65, 90, 8, 46, 32] {
            assert_eq!(Key::from_code(code).class(), KeyClass::Text, "code {code}");
        }
    }

    #[test]
    fn test_code_roundtrip_for_named_keys() {
        let keys = [Key::Shift, Key::Tab, Key::ArrowRight, Key::Escape, Key::Other(65)];
        for key in keys {
            assert_eq!(Key::from(key.code()), key);
        }
    }

    #[test]
    fn test_other_with_named_code_still_classified() {
        assert_eq!(Key::Other(13).class(), KeyClass::Navigation);
        assert_eq!(Key::Other(16).class(), KeyClass::Ignored);
    }
}
