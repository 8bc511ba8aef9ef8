//! # bf-engine
//!
//! A tick-accurate execution engine for the eight-symbol Brainfuck
//! instruction set.
//!
//! The engine runs one instruction per tick against a read-only program
//! store and a wrapping data tape. Loop brackets are matched at run time
//! by a skip-mode scan with a signed depth counter, so programs need no
//! preprocessing beyond assembly. The only output is a byte plus a
//! one-tick valid pulse; the engine never halts.

pub mod cpu;
pub mod asm;
pub mod config;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use cpu::{ControlState, DataTape, Engine, Geometry, GeometryError, Instruction, Opcode, ProgramStore, Sign, TickReport};
pub use asm::{assemble, disassemble, load_program, AssemblerError, ImageError, ProgramImage};
pub use config::{Config, ConfigError};

#[cfg(feature = "tui")]
pub use tui::run_debugger;
