//! Disassembler for program images.

use crate::asm::ProgramImage;
use crate::cpu::decode::decode;

/// Disassemble a single program byte.
pub fn disassemble_byte(byte: u8) -> String {
    let instr = decode(byte);
    match instr.symbol() {
        Some(symbol) => format!("{}  {}", symbol, instr),
        None if byte.is_ascii_graphic() => format!("{}  NOP", byte as char),
        None => "   NOP".to_string(),
    }
}

/// Disassemble an image to an address listing.
pub fn disassemble(image: &ProgramImage) -> String {
    let mut output = String::new();
    output.push_str("; Program Disassembly\n");
    output.push_str("; -------------------\n\n");

    for (addr, &byte) in image.as_bytes().iter().enumerate() {
        output.push_str(&format!("{:04}: {:02x}  {}\n", addr, byte, disassemble_byte(byte)));
    }

    output
}
