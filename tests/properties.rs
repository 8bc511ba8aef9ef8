//! Property tests over decoding, assembly and the control unit.

use bf::asm::{assemble, PADDING, SYMBOLS};
use bf::cpu::{decode, ControlState, Mode, Opcode, ProgramStore};
use bf::{Engine, Geometry};
use proptest::prelude::*;

const INSTRUCTIONS: &[u8] = b"><+-[].";

/// Run a skip that starts at `start` and return the address where it ends.
fn skip_end(program: &ProgramStore, geometry: &Geometry, start: usize, cell: u8) -> Option<usize> {
    let mut state = ControlState { pc: start, ..ControlState::new() };
    state = state.step(decode(program.read(start)), cell, geometry).state;
    if state.mode != Mode::Skip {
        return None;
    }
    for _ in 0..program.len() {
        let pc = state.pc;
        state = state.step(decode(program.read(pc)), cell, geometry).state;
        if state.mode == Mode::Run {
            return Some(pc);
        }
    }
    None
}

/// Matching bracket for every bracket address.
fn partners(bytes: &[u8]) -> Vec<(usize, usize)> {
    let mut stack = Vec::new();
    let mut pairs = Vec::new();
    for (addr, &byte) in bytes.iter().enumerate() {
        match byte {
            b'[' => stack.push(addr),
            b']' => pairs.push((stack.pop().unwrap(), addr)),
            _ => {}
        }
    }
    pairs
}

fn balanced_program() -> impl Strategy<Value = String> {
    let leaf = prop::collection::vec(prop::sample::select(vec!['+', '-', '<', '>', '.', ' ']), 0..4)
        .prop_map(|chars| chars.into_iter().collect::<String>());
    leaf.prop_recursive(4, 48, 4, |inner| {
        (prop::collection::vec(inner.clone(), 1..4), inner).prop_map(|(bodies, tail)| {
            let mut program: String = bodies.iter().map(|b| format!("[{}]", b)).collect();
            program.push_str(&tail);
            program
        })
    })
}

proptest! {
    #[test]
    fn decode_is_total_and_recognizes_seven_symbols(byte in any::<u8>()) {
        let instr = decode(byte);
        prop_assert_eq!(instr.op != Opcode::Nop, INSTRUCTIONS.contains(&byte));
    }

    #[test]
    fn assemble_keeps_symbols_in_order(source in ".{0,200}") {
        let image = assemble(&source);
        let expected: Vec<u8> = source
            .chars()
            .filter(|c| SYMBOLS.contains(c))
            .map(|c| c as u8)
            .collect();
        prop_assert_eq!(&image.as_bytes()[..PADDING], &[0u8, 0][..]);
        prop_assert_eq!(&image.as_bytes()[PADDING..], &expected[..]);
    }

    #[test]
    fn tape_size_moves_return_pointer(bits in 1u8..=10, start in any::<usize>(), left in any::<bool>()) {
        let geometry = Geometry::new(8, bits).unwrap();
        let start = start % geometry.tape_size();
        let instr = decode(if left { b'<' } else { b'>' });

        let mut state = ControlState { ptr: start, ..ControlState::new() };
        for _ in 0..geometry.tape_size() {
            state = state.step(instr, 0, &geometry).state;
        }
        prop_assert_eq!(state.ptr, start);
    }

    #[test]
    fn cell_updates_wrap_after_256(cell in any::<u8>(), down in any::<bool>()) {
        let geometry = Geometry::default();
        let instr = decode(if down { b'-' } else { b'+' });
        let state = ControlState::new();

        let mut value = cell;
        for _ in 0..256 {
            let write = state.step(instr, value, &geometry).tape_write;
            prop_assert!(write.is_some());
            value = write.map_or(value, |w| w.value);
        }
        prop_assert_eq!(value, cell);
    }

    #[test]
    fn skips_end_at_matching_bracket(source in balanced_program()) {
        let geometry = Geometry::new(12, 4).unwrap();
        let image = assemble(&source);
        let program = ProgramStore::new(&geometry, image.as_bytes());

        for (open, close) in partners(image.as_bytes()) {
            // '[' over a zero cell skips forward to its ']'
            prop_assert_eq!(skip_end(&program, &geometry, open, 0), Some(close));
            // ']' over a non-zero cell skips back to its '['
            prop_assert_eq!(skip_end(&program, &geometry, close, 1), Some(open));
        }
    }

    #[test]
    fn output_pulse_lasts_one_tick(value in any::<u8>()) {
        let source = format!("{}.", "+".repeat(value as usize));
        let mut engine = Engine::from_source(Geometry::new(10, 4).unwrap(), &source);

        let len = (PADDING + value as usize + 1) as u64;
        let pulses: Vec<(u64, u8)> = (0..len + 4)
            .filter_map(|_| {
                let report = engine.tick();
                report.output.map(|b| (report.tick, b))
            })
            .collect();
        prop_assert_eq!(pulses, vec![(len - 1, value)]);
    }
}
