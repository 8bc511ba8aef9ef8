//! Program image files.
//!
//! An image file (`.bfi`) is plain text:
//! - One byte per line as two hex digits
//! - Text after `;` is a comment
//! - Blank lines are ignored

use crate::asm::{assemble, ProgramImage};
use crate::asm::disasm::disassemble_byte;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// File extension of image files.
pub const IMAGE_EXTENSION: &str = "bfi";

/// Parse image text.
pub fn parse_image(text: &str) -> Result<ProgramImage, ImageError> {
    let mut bytes = Vec::new();

    for (line_num, line) in text.lines().enumerate() {
        let content = match line.find(';') {
            Some(idx) => &line[..idx],
            None => line,
        }
        .trim();

        if content.is_empty() {
            continue;
        }

        if content.len() > 2 || !content.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ImageError::ParseError {
                line: line_num + 1,
                message: format!("expected one hex byte, found '{}'", content),
            });
        }

        let byte = u8::from_str_radix(content, 16).map_err(|e| ImageError::ParseError {
            line: line_num + 1,
            message: format!("invalid hex byte '{}': {}", content, e),
        })?;
        bytes.push(byte);
    }

    Ok(ProgramImage::from_bytes(bytes))
}

/// Load an image file from disk.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<ProgramImage, ImageError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    parse_image(&text)
}

/// Save an image file to disk.
pub fn save_image<P: AsRef<Path>>(path: P, image: &ProgramImage) -> Result<(), ImageError> {
    let mut file = std::fs::File::create(path.as_ref())?;

    writeln!(file, "; Program image")?;
    writeln!(file, "; {} bytes", image.len())?;
    writeln!(file)?;

    for (addr, &byte) in image.as_bytes().iter().enumerate() {
        writeln!(file, "{:02x} ; {:04} {}", byte, addr, disassemble_byte(byte).trim_start())?;
    }

    Ok(())
}

/// Load a program from either an image file or source text.
///
/// Files with the image extension are parsed as images; anything else is
/// read as source and assembled.
pub fn load_program<P: AsRef<Path>>(path: P) -> Result<ProgramImage, ImageError> {
    let path = path.as_ref();
    if path.extension().is_some_and(|ext| ext == IMAGE_EXTENSION) {
        let image = load_image(path)?;
        log::debug!("loaded {} byte image from {}", image.len(), path.display());
        Ok(image)
    } else {
        let source = std::fs::read_to_string(path)?;
        Ok(assemble(&source))
    }
}

/// Errors that can occur reading or writing image files.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("parse error on line {line}: {message}")]
    ParseError { line: usize, message: String },
}
