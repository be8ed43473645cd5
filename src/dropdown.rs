//! Open/closed state for custom select widgets.
//!
//! Each widget registers under an id and owns one flag plus the screen
//! region it was last drawn in. A pointer-down anywhere closes every open
//! widget whose region does not contain the pointer; it never opens one.
//! Opening is only ever done by [`DropdownRegistry::toggle`].

use std::collections::HashMap;
use std::hash::Hash;

use ratatui::layout::Rect;
use tracing::trace;

use crate::resource::{DraftField, ResourceKind};

/// Ids of the dropdowns the client draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropdownId {
    /// Account type on the login page.
    LoginRole,
    /// A foreign-key field of a resource form.
    Field(ResourceKind, DraftField),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Entry {
    open: bool,
    region: Option<Rect>,
    highlighted: usize,
}

fn contains(region: Rect, x: u16, y: u16) -> bool {
    x >= region.x
        && y >= region.y
        && u32::from(x) < u32::from(region.x) + u32::from(region.width)
        && u32::from(y) < u32::from(region.y) + u32::from(region.height)
}

/// Independent dropdown flags keyed by widget id.
#[derive(Debug, Clone)]
pub struct DropdownRegistry<K> {
    entries: HashMap<K, Entry>,
}

impl<K> Default for DropdownRegistry<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash + std::fmt::Debug> DropdownRegistry<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self, id: K) -> bool {
        self.entries.get(&id).is_some_and(|entry| entry.open)
    }

    /// Record where `id` was drawn, including its option list when open.
    pub fn set_region(&mut self, id: K, region: Rect) {
        self.entries.entry(id).or_default().region = Some(region);
    }

    pub fn region(&self, id: K) -> Option<Rect> {
        self.entries.get(&id).and_then(|entry| entry.region)
    }

    /// Flip `id` and return its new state. Other widgets are untouched.
    pub fn toggle(&mut self, id: K) -> bool {
        let entry = self.entries.entry(id).or_default();
        entry.open = !entry.open;
        entry.highlighted = 0;
        trace!(?id, open = entry.open, "Dropdown toggled");
        entry.open
    }

    pub fn close(&mut self, id: K) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.open = false;
        }
    }

    /// Close every widget matching `predicate`.
    pub fn close_where(&mut self, mut predicate: impl FnMut(&K) -> bool) {
        for (id, entry) in self.entries.iter_mut() {
            if predicate(id) {
                entry.open = false;
            }
        }
    }

    /// Forget every widget, e.g. when the screen changes.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Outside-interaction dismissal. Returns the ids it closed.
    pub fn pointer_down(&mut self, x: u16, y: u16) -> Vec<K> {
        let mut closed = Vec::new();
        for (id, entry) in self.entries.iter_mut() {
            let inside = entry.region.is_some_and(|region| contains(region, x, y));
            if entry.open && !inside {
                entry.open = false;
                closed.push(*id);
            }
        }
        if !closed.is_empty() {
            trace!(x, y, ?closed, "Closed dropdowns on outside pointer");
        }
        closed
    }

    /// Index of the highlighted option of an open widget.
    pub fn highlighted(&self, id: K) -> usize {
        self.entries.get(&id).map_or(0, |entry| entry.highlighted)
    }

    /// Move the highlight by `delta` within `len` options, wrapping around.
    pub fn move_highlight(&mut self, id: K, delta: isize, len: usize) {
        if len == 0 {
            return;
        }
        if let Some(entry) = self.entries.get_mut(&id) {
            let len = len as isize;
            let current = (entry.highlighted as isize).min(len - 1);
            entry.highlighted = (current + delta).rem_euclid(len) as usize;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: DropdownId = DropdownId::Field(ResourceKind::GradeRecord, DraftField::Evaluation);
    const B: DropdownId = DropdownId::Field(ResourceKind::GradeRecord, DraftField::Student);

    fn registry() -> DropdownRegistry<DropdownId> {
        let mut registry = DropdownRegistry::new();
        registry.set_region(A, Rect::new(0, 0, 20, 6));
        registry.set_region(B, Rect::new(30, 0, 20, 6));
        registry
    }

    #[test]
    fn test_toggle_is_independent() {
        let mut registry = registry();
        assert!(registry.toggle(A));
        assert!(registry.toggle(B));
        assert!(registry.is_open(A));
        assert!(registry.is_open(B));

        assert!(!registry.toggle(A));
        assert!(registry.is_open(B));
    }

    #[test]
    fn test_click_in_other_region_closes_without_opening() {
        let mut registry = registry();
        registry.toggle(A);

        let closed = registry.pointer_down(35, 2);
        assert_eq!(closed, vec![A]);
        assert!(!registry.is_open(A));
        assert!(!registry.is_open(B));
    }

    #[test]
    fn test_click_inside_keeps_open() {
        let mut registry = registry();
        registry.toggle(A);
        assert!(registry.pointer_down(19, 5).is_empty());
        assert!(registry.is_open(A));

        // Region edges are exclusive.
        registry.pointer_down(20, 5);
        assert!(!registry.is_open(A));
    }

    #[test]
    fn test_open_without_region_closes_on_any_click() {
        let mut registry = DropdownRegistry::new();
        registry.toggle(DropdownId::LoginRole);
        registry.pointer_down(0, 0);
        assert!(!registry.is_open(DropdownId::LoginRole));
    }

    #[test]
    fn test_close_where() {
        let mut registry = registry();
        registry.toggle(A);
        registry.toggle(DropdownId::LoginRole);
        registry.close_where(|id| matches!(id, DropdownId::Field(ResourceKind::GradeRecord, _)));
        assert!(!registry.is_open(A));
        assert!(registry.is_open(DropdownId::LoginRole));
    }

    #[test]
    fn test_highlight_wraps() {
        let mut registry = registry();
        registry.toggle(A);
        registry.move_highlight(A, -1, 3);
        assert_eq!(registry.highlighted(A), 2);
        registry.move_highlight(A, 1, 3);
        assert_eq!(registry.highlighted(A), 0);
    }
}
