//! Page gating for PDF previews.

pub mod gate;
pub mod navigator;

pub use gate::{PreviewGate, PreviewState};
pub use navigator::{DEFAULT_DEBOUNCE, PageNavigator};
