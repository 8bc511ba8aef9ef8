//! Control unit and execution engine.
//!
//! Each tick is split in two: [`ControlState::step`] computes the next
//! register values and the optional tape write purely from the state at
//! the start of the tick, then [`Engine::tick`] commits them together.
//! Loop brackets are matched online by scanning with a signed depth
//! counter; there is no jump table.

use crate::asm::ProgramImage;
use crate::cpu::decode::{self, Instruction, Opcode};
use crate::cpu::memory::{DataTape, Geometry, ProgramStore};
use crate::cpu::registers::{ControlState, Direction, Mode};
use serde::{Serialize, Deserialize};

/// A pending write to the data tape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapeWrite {
    pub addr: usize,
    pub value: u8,
}

/// Everything one tick changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Register values for the next tick.
    pub state: ControlState,
    /// Tape write to apply at the tick boundary.
    pub tape_write: Option<TapeWrite>,
}

impl ControlState {
    /// Compute the next state.
    ///
    /// `instr` is the decoded byte at `self.pc` and `cell` the tape value
    /// at `self.ptr`. Nothing here observes a value produced in the same
    /// tick except the scan direction, which is resolved before `pc`
    /// advances so a back-skip moves backward immediately.
    pub fn step(&self, instr: Instruction, cell: u8, geometry: &Geometry) -> Transition {
        let mut next = ControlState { output_valid: false, ..*self };
        let mut tape_write = None;
        let step = instr.sign.step();

        match self.mode {
            Mode::Skip => {
                if instr.op == Opcode::Loop {
                    let level = self.skip_level.wrapping_add(step as i16);
                    next.skip_level = level;
                    if level == 0 {
                        next.mode = Mode::Run;
                        next.direction = Direction::Forward;
                    }
                }
            }
            Mode::Run => match instr.op {
                Opcode::Nop => {}
                Opcode::Move => {
                    next.ptr = wrap(self.ptr, step as isize, geometry.tape_size());
                }
                Opcode::Update => {
                    tape_write = Some(TapeWrite {
                        addr: self.ptr,
                        value: cell.wrapping_add_signed(step as i8),
                    });
                }
                Opcode::Loop => {
                    // '[' skips on zero, ']' loops back on non-zero
                    if (cell == 0) == instr.sign.is_negative() {
                        next.mode = Mode::Skip;
                        next.skip_level = step as i16;
                        next.direction = if instr.is_open() {
                            Direction::Forward
                        } else {
                            Direction::Backward
                        };
                    }
                }
                Opcode::Out => {
                    next.output_byte = cell;
                    next.output_valid = true;
                }
            },
        }

        next.pc = wrap(self.pc, next.direction.step(), geometry.code_size());

        Transition { state: next, tape_write }
    }
}

#[inline]
fn wrap(addr: usize, delta: isize, size: usize) -> usize {
    addr.wrapping_add_signed(delta) & (size - 1)
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Zero-based tick index.
    pub tick: u64,
    /// Address the instruction was fetched from.
    pub pc: usize,
    /// Raw program byte.
    pub byte: u8,
    /// Decoded instruction.
    pub instr: Instruction,
    /// True if the instruction was scanned over in skip mode.
    pub skipped: bool,
    /// Tape write committed at the end of the tick.
    pub tape_write: Option<TapeWrite>,
    /// Output pulse visible after the tick committed.
    pub output: Option<u8>,
}

/// Serializable view of the engine for dumps and front-ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub ticks: u64,
    pub geometry: Geometry,
    pub registers: ControlState,
    /// Non-zero tape cells as `(address, value)`.
    pub tape: Vec<(usize, u8)>,
}

/// Program store, data tape and control unit wired together.
#[derive(Clone)]
pub struct Engine {
    geometry: Geometry,
    program: ProgramStore,
    tape: DataTape,
    state: ControlState,
    ticks: u64,
}

impl Engine {
    /// Build an engine around an assembled image.
    pub fn new(geometry: Geometry, image: &ProgramImage) -> Self {
        log::debug!(
            "engine: {} byte image, code store {} bytes, tape {} cells",
            image.len(),
            geometry.code_size(),
            geometry.tape_size()
        );
        Self {
            geometry,
            program: ProgramStore::new(&geometry, image.as_bytes()),
            tape: DataTape::new(&geometry),
            state: ControlState::new(),
            ticks: 0,
        }
    }

    /// Assemble `source` and build an engine around it.
    pub fn from_source(geometry: Geometry, source: &str) -> Self {
        Self::new(geometry, &crate::asm::assemble(source))
    }

    /// Return to the power-on state. The program store is kept.
    pub fn reset(&mut self) {
        log::debug!("engine reset after {} ticks", self.ticks);
        self.state.reset();
        self.tape.clear();
        self.ticks = 0;
    }

    /// Advance one tick.
    pub fn tick(&mut self) -> TickReport {
        let pc = self.state.pc;
        let byte = self.program.read(pc);
        let instr = decode::decode(byte);
        let cell = self.tape.read(self.state.ptr);
        let skipped = self.state.is_skipping();

        let Transition { state, tape_write } = self.state.step(instr, cell, &self.geometry);

        if let Some(write) = tape_write {
            self.tape.write(write.addr, write.value);
        }
        self.state = state;
        let tick = self.ticks;
        self.ticks += 1;

        log::trace!(
            "tick {}: pc={:#06x} {}{} ptr={} cell={}",
            tick,
            pc,
            instr,
            if skipped { " (skip)" } else { "" },
            self.state.ptr,
            cell
        );

        TickReport {
            tick,
            pc,
            byte,
            instr,
            skipped,
            tape_write,
            output: self.state.output(),
        }
    }

    /// Run `count` ticks and collect every output pulse.
    pub fn run_ticks(&mut self, count: u64) -> Vec<u8> {
        (0..count).filter_map(|_| self.tick().output).collect()
    }

    /// Run until the first output pulse, for at most `max_ticks` ticks.
    pub fn run_until_output(&mut self, max_ticks: u64) -> Option<u8> {
        (0..max_ticks).find_map(|_| self.tick().output)
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    pub fn tape(&self) -> &DataTape {
        &self.tape
    }

    pub fn program(&self) -> &ProgramStore {
        &self.program
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Ticks elapsed since construction or the last reset.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Decoded instruction at the current `pc`.
    pub fn current_instruction(&self) -> Instruction {
        decode::decode(self.program.read(self.state.pc))
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            ticks: self.ticks,
            geometry: self.geometry,
            registers: self.state,
            tape: self.tape
                .as_bytes()
                .iter()
                .enumerate()
                .filter(|(_, v)| **v != 0)
                .map(|(i, &v)| (i, v))
                .collect(),
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("pc", &self.state.pc)
            .field("ptr", &self.state.ptr)
            .field("mode", &self.state.mode)
            .field("skip_level", &self.state.skip_level)
            .field("ticks", &self.ticks)
            .field("tape", &self.tape)
            .finish()
    }
}
