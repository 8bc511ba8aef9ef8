//! Assembler and disassembler.
//!
//! This module provides:
//! - The assembler (source text → program image)
//! - A disassembler (program image → address listing)
//! - The `.bfi` image file format

pub mod assembler;
pub mod disasm;
pub mod image;

pub use assembler::{assemble, check_brackets, AssemblerError, ProgramImage, PADDING, SYMBOLS};
pub use disasm::{disassemble, disassemble_byte};
pub use image::{load_image, load_program, parse_image, save_image, ImageError, IMAGE_EXTENSION};
