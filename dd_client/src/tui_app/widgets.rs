use ratatui::widgets::{ListItem, ListState, ScrollbarState};
use std::collections::VecDeque;

/// A list of rendered lines with a selection cursor and matching scrollbar.
///
/// Lists render bottom-to-top, so index 0 is the newest item.
pub struct ScrollableList {
    max_items: usize,
    pub list_items: VecDeque<ListItem<'static>>,
    pub list_state: ListState,
    pub scroll_state: ScrollbarState,
}

impl ScrollableList {
    pub fn new(max_items: usize) -> Self {
        Self {
            max_items,
            list_items: VecDeque::new(),
            list_state: ListState::default(),
            scroll_state: ScrollbarState::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.list_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list_items.is_empty()
    }

    /// Add a newest item, dropping the oldest once full.
    pub fn push(&mut self, item: ListItem<'static>) {
        self.list_items.push_front(item);
        self.list_items.truncate(self.max_items);
        self.scroll_state = self.scroll_state.content_length(self.list_items.len());
        self.jump_to_first();
    }

    pub fn move_up(&mut self) {
        let last = self.list_items.len().saturating_sub(1);
        let idx = self
            .list_state
            .selected()
            .map_or(0, |idx| (idx + 1).min(last));
        self.select(idx);
    }

    pub fn move_down(&mut self) {
        let idx = self
            .list_state
            .selected()
            .map_or(0, |idx| idx.saturating_sub(1));
        self.select(idx);
    }

    /// Select the newest item.
    pub fn jump_to_first(&mut self) {
        self.select(0);
    }

    /// Select the oldest item.
    pub fn jump_to_last(&mut self) {
        self.select(self.list_items.len().saturating_sub(1));
    }

    fn select(&mut self, idx: usize) {
        self.list_state.select(Some(idx));
        // Scrollbar runs top to bottom while the list runs bottom to top.
        let position = self.list_items.len().saturating_sub(idx + 1);
        self.scroll_state = self.scroll_state.position(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(n: usize) -> ScrollableList {
        let mut list = ScrollableList::new(4);
        for i in 0..n {
            list.push(ListItem::new(i.to_string()));
        }
        list
    }

    #[test]
    fn test_push_caps_length() {
        let list = filled(6);
        assert_eq!(list.len(), 4);
        assert_eq!(list.list_state.selected(), Some(0));
    }

    #[test]
    fn test_move_up_stops_at_oldest() {
        let mut list = filled(3);
        for _ in 0..10 {
            list.move_up();
        }
        assert_eq!(list.list_state.selected(), Some(2));
        list.move_down();
        assert_eq!(list.list_state.selected(), Some(1));
    }

    #[test]
    fn test_jumps() {
        let mut list = filled(3);
        list.jump_to_last();
        assert_eq!(list.list_state.selected(), Some(2));
        list.jump_to_first();
        assert_eq!(list.list_state.selected(), Some(0));
    }

    #[test]
    fn test_empty_list_is_safe() {
        let mut list = ScrollableList::new(4);
        list.move_up();
        list.move_down();
        list.jump_to_last();
        assert!(list.is_empty());
    }
}
