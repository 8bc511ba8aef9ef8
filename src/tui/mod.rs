//! TUI debugger.
//!
//! Provides an interactive terminal-based debugger with:
//! - Program listing around the PC, dimmed while skipping
//! - Tape view that follows the pointer
//! - Register and output-pulse display
//! - Step/run/breakpoint controls

mod app;
mod ui;

pub use app::{DebuggerApp, run_debugger};
