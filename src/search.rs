//! Pagination and search-query state.
//!
//! [`QueryState`] is what a list fetch is keyed on. [`SearchInput`] is the text the
//! user is typing, applied to the query once typing pauses.
use std::time::{Duration, Instant};

/// Page number, fixed page size and search filter driving a list fetch.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryState {
    page: u32,
    page_size: u32,
    search: String,
}

impl QueryState {
    /// Start at page 1 with no filter. A zero page size is raised to 1.
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            search: String::new(),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Move to page `n` (0 is read as 1). Returns whether anything changed.
    pub fn set_page(&mut self, n: u32) -> bool {
        let n = n.max(1);
        if n == self.page {
            return false;
        }
        self.page = n;
        true
    }

    /// Replace the filter. A new filter restarts from page 1, since the old page
    /// index means nothing against a different result set.
    pub fn set_search(&mut self, s: &str) -> bool {
        if s == self.search {
            return false;
        }
        self.search = s.to_string();
        self.page = 1;
        true
    }

    /// Number of pages needed for `total` matches; at least 1.
    pub fn total_pages(&self, total: u64) -> u32 {
        let size = u64::from(self.page_size);
        let pages = total.div_ceil(size).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

/// Search text being typed, with the time of the last keystroke.
#[derive(Clone, Debug, Default)]
pub struct SearchInput {
    buffer: String,
    applied: String,
    last_edit: Option<Instant>,
}

impl SearchInput {
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Begin editing from the currently applied query.
    pub fn begin(&mut self, applied: &str) {
        self.buffer = applied.to_string();
        self.applied = applied.to_string();
        self.last_edit = None;
    }

    pub fn push(&mut self, c: char, now: Instant) {
        self.buffer.push(c);
        self.last_edit = Some(now);
    }

    pub fn pop(&mut self, now: Instant) {
        if self.buffer.pop().is_some() {
            self.last_edit = Some(now);
        }
    }

    /// Abandon the edit and go back to what was applied.
    pub fn revert(&mut self) -> &str {
        self.buffer = self.applied.clone();
        self.last_edit = None;
        &self.applied
    }

    /// The text to apply if typing has been idle for `debounce`, at most once per pause.
    pub fn due(&mut self, now: Instant, debounce: Duration) -> Option<String> {
        let last = self.last_edit?;
        if now.duration_since(last) < debounce {
            return None;
        }
        Some(self.commit())
    }

    /// Apply the buffer right away (Enter).
    pub fn commit(&mut self) -> String {
        self.last_edit = None;
        self.applied = self.buffer.clone();
        self.applied.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_change_resets_page() {
        let mut q = QueryState::new(10);
        assert!(q.set_page(3));
        assert!(q.set_search("ann"));
        assert_eq!(q.page(), 1);
        assert_eq!(q.search(), "ann");
    }

    #[test]
    fn repeated_values_are_not_changes() {
        let mut q = QueryState::new(10);
        assert!(!q.set_page(1));
        assert!(!q.set_page(0));
        assert!(!q.set_search(""));
        assert!(q.set_page(2));
        assert!(!q.set_page(2));
    }

    #[test]
    fn total_pages_rounds_up_and_is_never_zero() {
        let q = QueryState::new(10);
        assert_eq!(q.total_pages(0), 1);
        assert_eq!(q.total_pages(10), 1);
        assert_eq!(q.total_pages(25), 3);
    }

    #[test]
    fn debounce_waits_for_a_pause() {
        let start = Instant::now();
        let window = Duration::from_millis(250);
        let mut input = SearchInput::default();
        input.begin("");
        input.push('a', start);
        input.push('n', start + Duration::from_millis(100));
        assert_eq!(input.due(start + Duration::from_millis(200), window), None);
        assert_eq!(
            input.due(start + Duration::from_millis(400), window).as_deref(),
            Some("an")
        );
        assert_eq!(input.due(start + Duration::from_millis(900), window), None);
    }

    #[test]
    fn zero_debounce_applies_every_keystroke() {
        let now = Instant::now();
        let mut input = SearchInput::default();
        input.begin("");
        input.push('x', now);
        assert_eq!(input.due(now, Duration::ZERO).as_deref(), Some("x"));
    }

    #[test]
    fn revert_restores_applied_query() {
        let now = Instant::now();
        let mut input = SearchInput::default();
        input.begin("bob");
        input.push('!', now);
        assert_eq!(input.revert(), "bob");
        assert_eq!(input.text(), "bob");
    }
}
