use std::time::{Duration, Instant};

use super::gate::{PreviewGate, PreviewState};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

/// Page cursor over a [`PreviewGate`].
///
/// Rapid repeated navigation inside the debounce window is ignored. The
/// debounce only drops input; the page is always clamped by the gate.
#[derive(Debug, Clone)]
pub struct PageNavigator {
    gate: PreviewGate,
    page: u32,
    debounce: Duration,
    last_move: Option<Instant>,
}

impl PageNavigator {
    pub fn new(gate: PreviewGate) -> Self {
        Self::with_debounce(gate, DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(gate: PreviewGate, debounce: Duration) -> Self {
        Self {
            gate,
            page: 1,
            debounce,
            last_move: None,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn state(&self) -> PreviewState {
        self.gate.state(self.page)
    }

    pub fn forward(&mut self, now: Instant) -> u32 {
        self.step(now, |gate, page| gate.next(page))
    }

    pub fn back(&mut self, now: Instant) -> u32 {
        self.step(now, |gate, page| gate.prev(page))
    }

    /// Jump to a page; not debounced.
    pub fn go_to(&mut self, page: u32) -> u32 {
        self.page = self.gate.clamp(page);
        self.page
    }

    fn step(&mut self, now: Instant, f: impl Fn(&PreviewGate, u32) -> u32) -> u32 {
        let settled = self
            .last_move
            .is_none_or(|last| now.saturating_duration_since(last) >= self.debounce);
        if settled {
            self.page = f(&self.gate, self.page);
            self.last_move = Some(now);
        }
        self.page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rapid_presses_are_dropped() {
        let mut nav = PageNavigator::new(PreviewGate::new(10, 10, false));
        let t0 = Instant::now();
        assert_eq!(nav.forward(t0), 2);
        assert_eq!(nav.forward(t0 + Duration::from_millis(50)), 2);
        assert_eq!(nav.forward(t0 + Duration::from_millis(200)), 3);
        assert_eq!(nav.back(t0 + Duration::from_millis(400)), 2);
    }

    #[test]
    fn debounce_never_escapes_the_gate() {
        let mut nav =
            PageNavigator::with_debounce(PreviewGate::new(5, 1, false), Duration::ZERO);
        let t0 = Instant::now();
        for _ in 0..5 {
            nav.forward(t0);
        }
        assert_eq!(nav.page(), 2);
        assert!(nav.state().is_locked);
        assert_eq!(nav.go_to(40), 2);
    }
}
