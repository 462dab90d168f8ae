use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use crate::app::Action;

/// A key combination
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn shift(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::SHIFT,
        }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// Context for keybindings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Global,
    PodList,
    LogPanel,
}

/// Keybinding configuration
pub struct KeyBindings {
    bindings: HashMap<KeyContext, HashMap<KeyBinding, Action>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut bindings = HashMap::new();

        // Global bindings
        let mut global = HashMap::new();
        global.insert(KeyBinding::new(KeyCode::Char('?')), Action::ToggleHelp);
        global.insert(KeyBinding::new(KeyCode::Esc), Action::GoBack);
        global.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Char('q')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Char('r')), Action::Refresh);
        global.insert(KeyBinding::new(KeyCode::F(5)), Action::Refresh);
        global.insert(KeyBinding::new(KeyCode::Char('l')), Action::ReloadLog);
        bindings.insert(KeyContext::Global, global);

        // Pod tree
        let mut pod_list = HashMap::new();
        pod_list.insert(KeyBinding::new(KeyCode::Char('j')), Action::ListDown);
        pod_list.insert(KeyBinding::new(KeyCode::Down), Action::ListDown);
        pod_list.insert(KeyBinding::new(KeyCode::Char('k')), Action::ListUp);
        pod_list.insert(KeyBinding::new(KeyCode::Up), Action::ListUp);
        pod_list.insert(KeyBinding::new(KeyCode::Enter), Action::ListSelect);
        pod_list.insert(KeyBinding::new(KeyCode::Char(' ')), Action::ListSelect);
        pod_list.insert(KeyBinding::new(KeyCode::Right), Action::Expand);
        pod_list.insert(KeyBinding::new(KeyCode::Left), Action::Collapse);
        pod_list.insert(KeyBinding::new(KeyCode::Char('e')), Action::ExpandAll);
        pod_list.insert(KeyBinding::shift(KeyCode::Char('E')), Action::CollapseAll);
        bindings.insert(KeyContext::PodList, pod_list);

        // Log panel bindings - less-like navigation
        let mut log_panel = HashMap::new();
        log_panel.insert(KeyBinding::new(KeyCode::Char('j')), Action::ScrollDown(1));
        log_panel.insert(KeyBinding::new(KeyCode::Down), Action::ScrollDown(1));
        log_panel.insert(KeyBinding::new(KeyCode::Char('k')), Action::ScrollUp(1));
        log_panel.insert(KeyBinding::new(KeyCode::Up), Action::ScrollUp(1));
        log_panel.insert(KeyBinding::ctrl(KeyCode::Char('f')), Action::PageDown);
        log_panel.insert(KeyBinding::ctrl(KeyCode::Char('b')), Action::PageUp);
        log_panel.insert(KeyBinding::ctrl(KeyCode::Char('d')), Action::PageDown);
        log_panel.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::PageUp);
        log_panel.insert(KeyBinding::new(KeyCode::PageDown), Action::PageDown);
        log_panel.insert(KeyBinding::new(KeyCode::PageUp), Action::PageUp);
        log_panel.insert(KeyBinding::new(KeyCode::Char('g')), Action::ScrollToTop);
        log_panel.insert(KeyBinding::shift(KeyCode::Char('G')), Action::ScrollToBottom);
        log_panel.insert(KeyBinding::new(KeyCode::Home), Action::ScrollToTop);
        log_panel.insert(KeyBinding::new(KeyCode::End), Action::ScrollToBottom);
        log_panel.insert(KeyBinding::new(KeyCode::Left), Action::GoBack);
        bindings.insert(KeyContext::LogPanel, log_panel);

        Self { bindings }
    }

    /// Look up action for key event in given context
    pub fn get_action(&self, context: KeyContext, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        // First check context-specific bindings
        if let Some(action) = self
            .bindings
            .get(&context)
            .and_then(|context_bindings| context_bindings.get(&binding))
        {
            return Some(action.clone());
        }

        // Fall back to global bindings
        self.bindings
            .get(&KeyContext::Global)?
            .get(&binding)
            .cloned()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_context_binding_wins() {
        let bindings = KeyBindings::new();
        let j = key(KeyCode::Char('j'), KeyModifiers::NONE);

        assert_eq!(
            bindings.get_action(KeyContext::PodList, &j),
            Some(Action::ListDown)
        );
        assert_eq!(
            bindings.get_action(KeyContext::LogPanel, &j),
            Some(Action::ScrollDown(1))
        );
    }

    #[test]
    fn test_falls_back_to_global() {
        let bindings = KeyBindings::new();
        let r = key(KeyCode::Char('r'), KeyModifiers::NONE);
        let ctrl_c = key(KeyCode::Char('c'), KeyModifiers::CONTROL);

        for context in [KeyContext::PodList, KeyContext::LogPanel] {
            assert_eq!(bindings.get_action(context, &r), Some(Action::Refresh));
            assert_eq!(bindings.get_action(context, &ctrl_c), Some(Action::Quit));
        }
    }

    #[test]
    fn test_shifted_keys() {
        let bindings = KeyBindings::new();
        let shift_e = key(KeyCode::Char('E'), KeyModifiers::SHIFT);
        let e = key(KeyCode::Char('e'), KeyModifiers::NONE);

        assert_eq!(
            bindings.get_action(KeyContext::PodList, &shift_e),
            Some(Action::CollapseAll)
        );
        assert_eq!(
            bindings.get_action(KeyContext::PodList, &e),
            Some(Action::ExpandAll)
        );
    }

    #[test]
    fn test_unbound_key() {
        let bindings = KeyBindings::new();
        let x = key(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(bindings.get_action(KeyContext::PodList, &x), None);
    }
}
