//! The execution core.
//!
//! - A program store of `2^code_addr_bits` bytes, read-only after load
//! - A data tape of `2^tape_addr_bits` eight-bit cells
//! - A control unit with a run/skip state machine, one instruction per tick

pub mod memory;
pub mod registers;
pub mod decode;
pub mod execute;

pub use memory::{DataTape, Geometry, GeometryError, ProgramStore, MAX_ADDR_BITS};
pub use registers::{ControlState, Direction, Mode};
pub use decode::{decode, encode, Instruction, Opcode, Sign};
pub use execute::{Engine, Snapshot, TapeWrite, TickReport, Transition};
