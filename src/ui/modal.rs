//! Outside-click dismissal for modal overlays.
//!
//! A close fires only when both the press and the release of one
//! interaction land on the overlay element itself. A drag that starts in
//! the dialog content and ends on the backdrop (text selection) or the
//! reverse does not close the modal.

/// Tracks where the current press started.
#[derive(Debug, Clone)]
pub struct OverlayDismissGuard<T> {
    overlay: T,
    pressed_on_overlay: bool,
}

impl<T: PartialEq> OverlayDismissGuard<T> {
    /// `overlay` is the identity of the backdrop element.
    pub fn new(overlay: T) -> Self {
        Self {
            overlay,
            pressed_on_overlay: false,
        }
    }

    /// Record a press (mousedown / pointerdown) on `target`.
    pub fn press_start(&mut self, target: &T) {
        self.pressed_on_overlay = *target == self.overlay;
    }

    /// Record the release (click / pointerup) on `target`.
    ///
    /// Returns `true` if the interaction should dismiss the modal. The
    /// recorded press is consumed either way.
    pub fn press_end(&mut self, target: &T) -> bool {
        let started_on_overlay = std::mem::take(&mut self.pressed_on_overlay);
        started_on_overlay && *target == self.overlay
    }
}

/// A modal's dismissal behaviour: guarded outside clicks plus Escape.
pub struct ModalOverlay<T, F> {
    guard: OverlayDismissGuard<T>,
    on_close: F,
}

impl<T: PartialEq, F: FnMut()> ModalOverlay<T, F> {
    pub fn new(overlay: T, on_close: F) -> Self {
        Self {
            guard: OverlayDismissGuard::new(overlay),
            on_close,
        }
    }

    pub fn pointer_down(&mut self, target: &T) {
        self.guard.press_start(target);
    }

    /// Returns whether `on_close` was invoked.
    pub fn pointer_up(&mut self, target: &T) -> bool {
        let close = self.guard.press_end(target);
        if close {
            (self.on_close)();
        }
        close
    }

    /// Escape key always closes.
    pub fn escape(&mut self) {
        (self.on_close)();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[derive(Debug, PartialEq)]
    enum El {
        Overlay,
        Content,
        Input,
    }

    #[test]
    fn press_and_release_on_overlay_closes() {
        let closed = Cell::new(0);
        let mut modal = ModalOverlay::new(El::Overlay, || closed.set(closed.get() + 1));
        modal.pointer_down(&El::Overlay);
        assert!(modal.pointer_up(&El::Overlay));
        assert_eq!(closed.get(), 1);
    }

    #[test]
    fn drag_from_content_to_overlay_does_not_close() {
        let closed = Cell::new(0);
        let mut modal = ModalOverlay::new(El::Overlay, || closed.set(closed.get() + 1));
        modal.pointer_down(&El::Input);
        assert!(!modal.pointer_up(&El::Overlay));
        assert_eq!(closed.get(), 0);
    }

    #[test]
    fn drag_from_overlay_to_content_does_not_close() {
        let mut guard = OverlayDismissGuard::new(El::Overlay);
        guard.press_start(&El::Overlay);
        assert!(!guard.press_end(&El::Content));
    }

    #[test]
    fn release_without_press_does_not_close() {
        let mut guard = OverlayDismissGuard::new(El::Overlay);
        assert!(!guard.press_end(&El::Overlay));
    }

    #[test]
    fn press_is_consumed_by_release() {
        let mut guard = OverlayDismissGuard::new(El::Overlay);
        guard.press_start(&El::Overlay);
        assert!(guard.press_end(&El::Overlay));
        // A second release with no new press must not close again.
        assert!(!guard.press_end(&El::Overlay));
    }

    #[test]
    fn later_press_on_content_resets_overlay_press() {
        let mut guard = OverlayDismissGuard::new(El::Overlay);
        guard.press_start(&El::Overlay);
        guard.press_start(&El::Content);
        assert!(!guard.press_end(&El::Overlay));
    }

    #[test]
    fn escape_closes() {
        let closed = Cell::new(false);
        let mut modal = ModalOverlay::new(El::Overlay, || closed.set(true));
        modal.escape();
        assert!(closed.get());
    }
}
