//! parley-tui: Terminal UI components
//!
//! Chat-oriented widgets built on ratatui and crossterm.

pub mod input;
pub mod theme;
pub mod widgets;

pub use theme::Theme;
