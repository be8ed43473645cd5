//! One-line key hints for the current context.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::events::{hints, HintContext};
use crate::ui::theme::theme;

/// Render the hint line for `context`.
pub fn render_context_help(frame: &mut Frame, area: Rect, context: HintContext) {
    let line = Line::from(parse_hints_to_spans(hints(context)));
    frame.render_widget(Paragraph::new(line), area);
}

/// Split a hint line into spans, keys in brackets highlighted.
fn parse_hints_to_spans(hints: &str) -> Vec<Span<'static>> {
    let t = theme();
    let key = Style::default().fg(t.accent);
    let text = Style::default().fg(t.muted);

    let mut spans = Vec::new();
    for piece in hints.split_inclusive(']') {
        let (before, bracketed) = match piece.find('[') {
            Some(open) if piece.ends_with(']') => piece.split_at(open),
            _ => (piece, ""),
        };
        if !before.is_empty() {
            spans.push(Span::styled(before.to_string(), text));
        }
        if !bracketed.is_empty() {
            spans.push(Span::styled(bracketed.to_string(), key));
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hints_to_spans_multiple_keys() {
        let spans = parse_hints_to_spans("[n] novo  [e] editar  [Esc] voltar");
        // [n], " novo  ", [e], " editar  ", [Esc], " voltar"
        assert_eq!(spans.len(), 6);
        assert_eq!(spans[0].content, "[n]");
    }

    #[test]
    fn test_parse_hints_to_spans_empty() {
        assert!(parse_hints_to_spans("").is_empty());
    }

    #[test]
    fn test_parse_hints_to_spans_no_brackets() {
        assert_eq!(parse_hints_to_spans("apenas texto").len(), 1);
    }

    #[test]
    fn test_every_context_has_hints() {
        for context in [HintContext::Login, HintContext::List, HintContext::Confirm] {
            assert!(!parse_hints_to_spans(hints(context)).is_empty());
        }
    }
}
