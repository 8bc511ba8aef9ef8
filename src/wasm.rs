//! WebAssembly bindings.
//!
//! JavaScript-friendly wrappers around the engine.

use wasm_bindgen::prelude::*;
use crate::{assemble, Engine, Geometry, ProgramImage};
use crate::asm::disasm::disassemble_byte;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WebAssembly-friendly engine wrapper.
#[wasm_bindgen]
pub struct WasmEngine {
    engine: Engine,
    output: Vec<u8>,
}

#[wasm_bindgen]
impl WasmEngine {
    /// Create an engine with the given address widths and no program.
    #[wasm_bindgen(constructor)]
    pub fn new(code_addr_bits: u8, tape_addr_bits: u8) -> Result<WasmEngine, JsError> {
        let geometry = Geometry::new(code_addr_bits, tape_addr_bits)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(Self {
            engine: Engine::new(geometry, &ProgramImage::default()),
            output: Vec::new(),
        })
    }

    /// Load a program from source. Returns the image length.
    #[wasm_bindgen]
    pub fn load_source(&mut self, source: &str) -> usize {
        let image = assemble(source);
        self.engine = Engine::new(self.engine.geometry(), &image);
        self.output.clear();
        image.len()
    }

    /// Step one tick. Returns the disassembled instruction.
    #[wasm_bindgen]
    pub fn step(&mut self) -> String {
        let report = self.engine.tick();
        if let Some(byte) = report.output {
            self.output.push(byte);
        }
        disassemble_byte(report.byte).trim_start().to_string()
    }

    /// Run `ticks` ticks. Returns the bytes output during the run.
    #[wasm_bindgen]
    pub fn run(&mut self, ticks: u32) -> Vec<u8> {
        let emitted = self.engine.run_ticks(u64::from(ticks));
        self.output.extend_from_slice(&emitted);
        emitted
    }

    /// Reset to the power-on state, keeping the program.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.engine.reset();
        self.output.clear();
    }

    #[wasm_bindgen]
    pub fn ticks(&self) -> u64 {
        self.engine.ticks()
    }

    #[wasm_bindgen]
    pub fn pc(&self) -> usize {
        self.engine.state().pc
    }

    #[wasm_bindgen]
    pub fn ptr(&self) -> usize {
        self.engine.state().ptr
    }

    /// True while scanning for a matching bracket.
    #[wasm_bindgen]
    pub fn skipping(&self) -> bool {
        self.engine.state().is_skipping()
    }

    #[wasm_bindgen]
    pub fn skip_level(&self) -> i16 {
        self.engine.state().skip_level
    }

    /// Output byte if the valid pulse is high, otherwise -1.
    #[wasm_bindgen]
    pub fn output_pulse(&self) -> i32 {
        self.engine.state().output().map_or(-1, i32::from)
    }

    /// Every byte output since load or reset.
    #[wasm_bindgen]
    pub fn output_log(&self) -> Vec<u8> {
        self.output.clone()
    }

    /// Tape cell at `index` (wrapping).
    #[wasm_bindgen]
    pub fn tape_at(&self, index: usize) -> u8 {
        self.engine.tape().read(index)
    }

    /// Whole tape.
    #[wasm_bindgen]
    pub fn tape_all(&self) -> Vec<u8> {
        self.engine.tape().as_bytes().to_vec()
    }

    /// Registers and non-zero tape cells as a JSON string.
    #[wasm_bindgen]
    pub fn snapshot_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.engine.snapshot())
            .map_err(|e| JsError::new(&e.to_string()))
    }
}

/// Assemble source code and return the image length.
#[wasm_bindgen]
pub fn wasm_assemble(source: &str) -> usize {
    assemble(source).len()
}

/// Disassemble a single program byte.
#[wasm_bindgen]
pub fn wasm_disassemble(byte: u8) -> String {
    disassemble_byte(byte).trim_start().to_string()
}
