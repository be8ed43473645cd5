//! Key binding definitions.
//!
//! Keys mean different things depending on whether a text input has focus:
//! while typing, printable characters edit the input; otherwise they are
//! single-letter shortcuts.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press asks for, before page context is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Logout,
    /// Ctrl+S, save the open form from any field.
    Save,
    /// Esc.
    Back,
    /// Enter.
    Submit,
    NextField,
    PrevField,
    Up,
    Down,
    /// Space outside a text input.
    Toggle,
    /// F2.
    RegisterStudent,
    /// F3.
    RegisterTeacher,
    /// A key that edits the focused text input.
    Edit(KeyEvent),
    /// A letter outside a text input.
    Shortcut(char),
}

/// Classify `key`; `typing` is whether a text input has focus.
pub fn classify(key: KeyEvent, typing: bool) -> Option<KeyAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let action = match key.code {
        KeyCode::Char('c') if ctrl => KeyAction::Quit,
        KeyCode::Char('l') if ctrl => KeyAction::Logout,
        KeyCode::Char('s') if ctrl => KeyAction::Save,
        KeyCode::Esc => KeyAction::Back,
        KeyCode::Enter => KeyAction::Submit,
        KeyCode::Tab => KeyAction::NextField,
        KeyCode::BackTab => KeyAction::PrevField,
        KeyCode::Up => KeyAction::Up,
        KeyCode::Down => KeyAction::Down,
        KeyCode::F(2) => KeyAction::RegisterStudent,
        KeyCode::F(3) => KeyAction::RegisterTeacher,
        _ if typing => return is_edit(key).then_some(KeyAction::Edit(key)),
        KeyCode::Char(' ') => KeyAction::Toggle,
        KeyCode::Char('j') => KeyAction::Down,
        KeyCode::Char('k') => KeyAction::Up,
        KeyCode::Char(c) if !ctrl => KeyAction::Shortcut(c),
        _ => return None,
    };
    Some(action)
}

fn is_edit(key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('u' | 'w') if key.modifiers.contains(KeyModifiers::CONTROL) => true,
        KeyCode::Char(_) => !key.modifiers.contains(KeyModifiers::CONTROL),
        KeyCode::Backspace | KeyCode::Delete => true,
        _ => false,
    }
}

/// Hint line per context, keys in brackets.
pub fn hints(context: HintContext) -> &'static str {
    match context {
        HintContext::Login => "[Enter] entrar  [Tab] próximo campo  [F2] cadastro de aluno  [F3] cadastro de professor  [Esc] sair",
        HintContext::Register => "[Enter] cadastrar  [Tab] próximo campo  [Esc] voltar",
        HintContext::Menu => "[j/k] mover  [Enter] abrir  [Ctrl+L] sair da conta  [q] fechar",
        HintContext::Records => "[j/k] mover  [r] recarregar  [Esc] voltar  [Ctrl+L] sair da conta",
        HintContext::List => "[n] novo  [e] editar  [d] excluir  [/] buscar  [r] recarregar  [Esc] voltar",
        HintContext::Form => "[Tab] próximo campo  [Enter] salvar/abrir lista  [Ctrl+S] salvar  [Esc] cancelar",
        HintContext::Search => "[Enter] concluir  [Esc] sair da busca",
        HintContext::Confirm => "[y] confirmar exclusão  [n] cancelar",
        HintContext::Dropdown => "[↑/↓] mover  [Enter] escolher  [Esc] fechar",
        HintContext::NotFound => "[Enter] voltar ao painel",
    }
}

/// Where the hint line is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintContext {
    Login,
    Register,
    Menu,
    Records,
    List,
    Form,
    Search,
    Confirm,
    Dropdown,
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_letters_edit_while_typing() {
        let n = key(KeyCode::Char('n'));
        assert_eq!(classify(n, true), Some(KeyAction::Edit(n)));
        assert_eq!(classify(n, false), Some(KeyAction::Shortcut('n')));
    }

    #[test]
    fn test_space_and_jk_depend_on_typing() {
        let space = key(KeyCode::Char(' '));
        assert_eq!(classify(space, true), Some(KeyAction::Edit(space)));
        assert_eq!(classify(space, false), Some(KeyAction::Toggle));
        assert_eq!(classify(key(KeyCode::Char('j')), false), Some(KeyAction::Down));
    }

    #[test]
    fn test_control_keys_work_everywhere() {
        for typing in [true, false] {
            assert_eq!(classify(ctrl('c'), typing), Some(KeyAction::Quit));
            assert_eq!(classify(ctrl('s'), typing), Some(KeyAction::Save));
            assert_eq!(classify(key(KeyCode::Esc), typing), Some(KeyAction::Back));
        }
        assert_eq!(classify(ctrl('u'), true), Some(KeyAction::Edit(ctrl('u'))));
        assert_eq!(classify(ctrl('u'), false), None);
    }

    #[test]
    fn test_backspace_only_while_typing() {
        let backspace = key(KeyCode::Backspace);
        assert_eq!(classify(backspace, true), Some(KeyAction::Edit(backspace)));
        assert_eq!(classify(backspace, false), None);
    }
}
