//! Keyboard shortcuts

use super::Command;

/// A key press as reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyPress {
    /// Key name, e.g. `s`, `Enter` or `Escape`
    pub key: String,
    pub ctrl: bool,
    /// Cmd on macOS
    pub meta: bool,
}

impl KeyPress {
    pub fn plain(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn ctrl(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: true,
            meta: false,
        }
    }

    /// Parse a chord such as `ctrl+s`, `cmd+b` or `Escape`
    pub fn parse(chord: &str) -> Option<Self> {
        let mut press = KeyPress::default();
        let mut parts = chord.split('+').peekable();
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                if part.is_empty() {
                    return None;
                }
                press.key = part.to_string();
                break;
            }
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => press.ctrl = true,
                "cmd" | "meta" | "super" => press.meta = true,
                _ => return None,
            }
        }
        Some(press)
    }

    fn has_command_modifier(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Map a key press to the command it triggers
///
/// While the name field is being edited, Enter commits and Escape reverts.
/// Ctrl or Cmd with `s`, `n` or `b` save, start a new diagram and toggle the
/// sidebar. A `Some` result means the host should suppress the key's
/// default action.
pub fn resolve_shortcut(press: &KeyPress, renaming: bool) -> Option<Command> {
    if renaming {
        match press.key.as_str() {
            "Enter" => return Some(Command::CommitRename),
            "Escape" => return Some(Command::CancelRename),
            _ => {}
        }
    }

    if !press.has_command_modifier() {
        return None;
    }
    match press.key.as_str() {
        "s" => Some(Command::Save),
        "n" => Some(Command::New),
        "b" => Some(Command::ToggleSidebar),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_shortcuts() {
        assert_eq!(resolve_shortcut(&KeyPress::ctrl("s"), false), Some(Command::Save));
        assert_eq!(resolve_shortcut(&KeyPress::ctrl("n"), false), Some(Command::New));
        let cmd_b = KeyPress {
            key: "b".into(),
            ctrl: false,
            meta: true,
        };
        assert_eq!(resolve_shortcut(&cmd_b, false), Some(Command::ToggleSidebar));
        assert_eq!(resolve_shortcut(&KeyPress::plain("s"), false), None);
        assert_eq!(resolve_shortcut(&KeyPress::ctrl("x"), false), None);
    }

    #[test]
    fn test_rename_keys_only_apply_while_renaming() {
        assert_eq!(
            resolve_shortcut(&KeyPress::plain("Enter"), true),
            Some(Command::CommitRename)
        );
        assert_eq!(
            resolve_shortcut(&KeyPress::plain("Escape"), true),
            Some(Command::CancelRename)
        );
        assert_eq!(resolve_shortcut(&KeyPress::plain("Enter"), false), None);
        assert_eq!(resolve_shortcut(&KeyPress::ctrl("s"), true), Some(Command::Save));
    }

    #[test]
    fn test_parse_chords() {
        assert_eq!(KeyPress::parse("ctrl+s"), Some(KeyPress::ctrl("s")));
        assert_eq!(KeyPress::parse("Escape"), Some(KeyPress::plain("Escape")));
        let cmd = KeyPress::parse("Cmd+b").unwrap();
        assert!(cmd.meta && !cmd.ctrl);
        assert_eq!(KeyPress::parse("hyper+s"), None);
        assert_eq!(KeyPress::parse("ctrl+"), None);
    }
}
