//! Terminal rendering using ratatui.
//!
//! ## Layout
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │ header: fleet counts, active thresholds    │
//! │ tabs:   1:Fleet | 2:Trend | 3:Explain      │
//! ├────────────────────────────────────────────┤
//! │ content: one of fleet / trend / explain    │
//! ├────────────────────────────────────────────┤
//! │ status bar: selection, controls, errors    │
//! └────────────────────────────────────────────┘
//! ```

pub mod common;
pub mod explain;
pub mod fleet;
pub mod theme;
pub mod trend;

pub use theme::Theme;
