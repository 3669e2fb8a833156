use notemarket_model::{Document, UserId};
use serde::{Deserialize, Serialize};

/// Which pages of a document a viewer may see.
///
/// Owners see everything. Everyone else sees the first
/// `preview_page_count` pages and may step onto the first locked page so the
/// reader can render the purchase prompt there. Requested pages are clamped,
/// never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewGate {
    total_pages: u32,
    preview_page_count: u32,
    is_owner: bool,
}

/// Snapshot of the gate for one page, as returned to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewState {
    pub page: u32,
    pub total_pages: u32,
    pub max_viewable_pages: u32,
    pub locked_page_count: u32,
    pub is_locked: bool,
    pub is_owner: bool,
    pub can_go_back: bool,
    pub can_go_forward: bool,
}

impl PreviewGate {
    pub fn new(total_pages: u32, preview_page_count: u32, is_owner: bool) -> Self {
        Self {
            total_pages: total_pages.max(1),
            preview_page_count: preview_page_count.max(1),
            is_owner,
        }
    }

    /// Gate for `viewer` on `doc`. Anonymous viewers are never owners.
    pub fn for_document(doc: &Document, viewer: Option<&UserId>) -> Self {
        let is_owner = viewer.is_some_and(|v| doc.is_owned_by(v));
        Self::new(doc.total_pages(), doc.preview_page_count, is_owner)
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn is_owner(&self) -> bool {
        self.is_owner
    }

    pub fn max_viewable_pages(&self) -> u32 {
        if self.is_owner {
            self.total_pages
        } else {
            self.preview_page_count.min(self.total_pages)
        }
    }

    pub fn locked_page_count(&self) -> u32 {
        if self.is_owner {
            0
        } else {
            self.total_pages.saturating_sub(self.preview_page_count)
        }
    }

    pub fn is_locked(&self, page: u32) -> bool {
        page > self.max_viewable_pages()
    }

    /// Highest page navigation may reach.
    pub fn navigation_limit(&self) -> u32 {
        if self.locked_page_count() > 0 {
            self.max_viewable_pages() + 1
        } else {
            self.total_pages
        }
    }

    pub fn clamp(&self, page: u32) -> u32 {
        page.clamp(1, self.navigation_limit())
    }

    pub fn next(&self, page: u32) -> u32 {
        self.clamp(page.saturating_add(1))
    }

    pub fn prev(&self, page: u32) -> u32 {
        self.clamp(page.saturating_sub(1))
    }

    /// True when the derived preview copy differs from the original file.
    pub fn needs_truncated_copy(&self) -> bool {
        self.locked_page_count() > 0
    }

    pub fn state(&self, requested: u32) -> PreviewState {
        let page = self.clamp(requested);
        PreviewState {
            page,
            total_pages: self.total_pages,
            max_viewable_pages: self.max_viewable_pages(),
            locked_page_count: self.locked_page_count(),
            is_locked: self.is_locked(page),
            is_owner: self.is_owner,
            can_go_back: page > 1,
            can_go_forward: page < self.navigation_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_never_hits_a_lock() {
        let gate = PreviewGate::new(10, 1, true);
        assert_eq!(gate.max_viewable_pages(), 10);
        assert_eq!(gate.locked_page_count(), 0);
        assert!((1..=10).all(|p| !gate.is_locked(p)));
        assert_eq!(gate.clamp(11), 10);
    }

    #[test]
    fn non_owner_sees_only_the_preview() {
        let gate = PreviewGate::new(10, 3, false);
        assert_eq!(gate.max_viewable_pages(), 3);
        assert_eq!(gate.locked_page_count(), 7);
        assert!(gate.is_locked(4));
        assert!(!gate.is_locked(3));
    }

    #[test]
    fn navigation_stops_one_past_the_preview() {
        let gate = PreviewGate::new(5, 1, false);
        assert!(gate.is_locked(2));
        assert_eq!(gate.next(1), 2);
        assert_eq!(gate.next(2), 2);
        assert_eq!(gate.clamp(3), 2);
        assert_eq!(gate.prev(1), 1);
        assert_eq!(gate.clamp(0), 1);

        let state = gate.state(9);
        assert_eq!(state.page, 2);
        assert!(state.is_locked);
        assert!(!state.can_go_forward);
    }

    #[test]
    fn preview_larger_than_document_unlocks_everything() {
        let gate = PreviewGate::new(3, 10, false);
        assert_eq!(gate.max_viewable_pages(), 3);
        assert_eq!(gate.locked_page_count(), 0);
        assert_eq!(gate.navigation_limit(), 3);
        assert!(!gate.needs_truncated_copy());
    }

    #[test]
    fn zero_inputs_are_raised_to_one() {
        let gate = PreviewGate::new(0, 0, false);
        assert_eq!(gate.total_pages(), 1);
        assert_eq!(gate.max_viewable_pages(), 1);
        assert_eq!(gate.clamp(5), 1);
    }
}
