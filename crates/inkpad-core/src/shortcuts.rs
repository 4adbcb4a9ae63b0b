//! Keyboard shortcut registry and documentation.

use crate::input::KeyPress;

/// What a shortcut triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutAction {
    Undo,
    Save,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    /// Key value as reported by the host, matched exactly.
    pub key: &'static str,
    /// Requires Ctrl (or Cmd on macOS).
    pub command: bool,
    pub action: ShortcutAction,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        command: bool,
        action: ShortcutAction,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            command,
            action,
            description,
        }
    }

    /// Whether a key press triggers this shortcut.
    pub fn matches(&self, press: &KeyPress) -> bool {
        press.key == self.key && (!self.command || press.modifiers.command())
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.command {
            parts.push("Ctrl".to_string());
        }
        parts.push(self.key.to_uppercase());
        parts.join("+")
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("z", true, ShortcutAction::Undo, "Undo last stroke or clear"),
            Shortcut::new("s", true, ShortcutAction::Save, "Save drawing as PNG"),
        ]
    }

    /// The action bound to a key press, if any.
    pub fn resolve(press: &KeyPress) -> Option<ShortcutAction> {
        Self::all()
            .into_iter()
            .find(|shortcut| shortcut.matches(press))
            .map(|shortcut| shortcut.action)
    }

    /// Log all shortcuts at info level.
    pub fn log_all() {
        for shortcut in Self::all() {
            log::info!("  {:10} {}", shortcut.format(), shortcut.description);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;

    #[test]
    fn test_resolve_ctrl_and_meta() {
        assert_eq!(
            ShortcutRegistry::resolve(&KeyPress::ctrl("z")),
            Some(ShortcutAction::Undo)
        );
        let meta = Modifiers {
            meta: true,
            ..Modifiers::default()
        };
        assert_eq!(
            ShortcutRegistry::resolve(&KeyPress::new("s", meta)),
            Some(ShortcutAction::Save)
        );
    }

    #[test]
    fn test_requires_modifier() {
        assert_eq!(
            ShortcutRegistry::resolve(&KeyPress::new("z", Modifiers::default())),
            None
        );
    }

    #[test]
    fn test_key_match_is_exact() {
        // Shift+Ctrl+Z reports "Z" and is not bound.
        let press = KeyPress::new(
            "Z",
            Modifiers {
                shift: true,
                ctrl: true,
                ..Modifiers::default()
            },
        );
        assert_eq!(ShortcutRegistry::resolve(&press), None);
        assert_eq!(ShortcutRegistry::resolve(&KeyPress::ctrl("x")), None);
    }

    #[test]
    fn test_format() {
        let formatted: Vec<String> = ShortcutRegistry::all().iter().map(Shortcut::format).collect();
        assert_eq!(formatted, vec!["Ctrl+Z", "Ctrl+S"]);
    }
}
