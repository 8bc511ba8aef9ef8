//! Control unit registers.
//!
//! All mutable execution state lives in one [`ControlState`] value:
//! - `pc`: program address
//! - `ptr`: tape address
//! - `direction`: which way `pc` advances
//! - `mode` / `skip_level`: run/skip state machine and bracket depth
//! - `output_byte` / `output_valid`: one-tick output pulse

use serde::{Serialize, Deserialize};

/// Direction `pc` advances each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    /// Signed address step: +1 or -1.
    #[inline]
    pub const fn step(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// Control unit state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Executing instructions.
    #[default]
    Run,
    /// Scanning for a matching bracket; instructions are inert.
    Skip,
}

/// The register file of the control unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControlState {
    /// Program address of the instruction executed this tick.
    pub pc: usize,
    /// Tape address of the current cell.
    pub ptr: usize,
    /// Scan direction applied to `pc`.
    pub direction: Direction,
    /// Run or skip.
    pub mode: Mode,
    /// Bracket depth while skipping. Zero exactly when `mode` is `Run`.
    pub skip_level: i16,
    /// Last byte latched by OUT.
    pub output_byte: u8,
    /// High for the single tick after an OUT executes.
    pub output_valid: bool,
}

impl ControlState {
    /// Power-on state: `pc = 0`, `ptr = 0`, running forward, no output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all registers to the power-on state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    #[inline]
    pub fn is_skipping(&self) -> bool {
        self.mode == Mode::Skip
    }

    /// The output byte if the valid pulse is high this tick.
    #[inline]
    pub fn output(&self) -> Option<u8> {
        self.output_valid.then_some(self.output_byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_on_state() {
        let regs = ControlState::new();
        assert_eq!(regs.pc, 0);
        assert_eq!(regs.ptr, 0);
        assert_eq!(regs.direction, Direction::Forward);
        assert_eq!(regs.mode, Mode::Run);
        assert_eq!(regs.skip_level, 0);
        assert_eq!(regs.output(), None);
    }

    #[test]
    fn test_reset() {
        let mut regs = ControlState {
            pc: 12,
            ptr: 3,
            direction: Direction::Backward,
            mode: Mode::Skip,
            skip_level: 2,
            output_byte: 9,
            output_valid: true,
        };
        regs.reset();
        assert_eq!(regs, ControlState::new());
    }

    #[test]
    fn test_output_gated_by_valid() {
        let mut regs = ControlState::new();
        regs.output_byte = 5;
        assert_eq!(regs.output(), None);
        regs.output_valid = true;
        assert_eq!(regs.output(), Some(5));
    }

    #[test]
    fn test_direction_step() {
        assert_eq!(Direction::Forward.step(), 1);
        assert_eq!(Direction::Backward.step(), -1);
    }
}
