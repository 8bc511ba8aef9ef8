//! Source-to-image assembler.
//!
//! Assembly keeps the instruction symbols of the source in order and
//! drops everything else, so comments need no special syntax:
//! ```text
//! +[ loop forever
//!     >++++.< emit 4
//! ]
//! ```
//! Two NOP bytes are prepended to absorb pipeline start-up.

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Symbols kept by the assembler. `,` is kept but decodes to NOP.
pub const SYMBOLS: [char; 8] = ['+', '-', '<', '>', '[', ']', '.', ','];

/// Number of NOP bytes at the start of every image.
pub const PADDING: usize = 2;

/// An assembled, immutable program image.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgramImage {
    bytes: Vec<u8>,
}

impl ProgramImage {
    /// Wrap raw bytes (for images loaded from disk).
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The program text without padding.
    pub fn source_text(&self) -> String {
        self.bytes
            .iter()
            .map(|&b| b as char)
            .filter(|c| SYMBOLS.contains(c))
            .collect()
    }
}

/// Assemble source text to a program image. Never fails.
pub fn assemble(source: &str) -> ProgramImage {
    let mut bytes = vec![0u8; PADDING];
    bytes.extend(
        source
            .chars()
            .filter(|c| SYMBOLS.contains(c))
            .map(|c| c as u8),
    );
    log::debug!("assembled {} instruction bytes", bytes.len() - PADDING);
    ProgramImage { bytes }
}

/// Check that every bracket in an image has a partner.
///
/// The engine never performs this check; an unbalanced program simply
/// scans through the wrapping address space. Front-ends use this to
/// warn before running.
pub fn check_brackets(image: &ProgramImage) -> Result<(), AssemblerError> {
    let mut open = Vec::new();
    for (addr, &byte) in image.as_bytes().iter().enumerate() {
        match byte {
            b'[' => open.push(addr),
            b']' => {
                open.pop().ok_or(AssemblerError::UnmatchedClose { addr })?;
            }
            _ => {}
        }
    }
    match open.pop() {
        Some(addr) => Err(AssemblerError::UnmatchedOpen { addr }),
        None => Ok(()),
    }
}

/// Diagnostics about an assembled image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblerError {
    #[error("'[' at address {addr} has no matching ']'")]
    UnmatchedOpen { addr: usize },

    #[error("']' at address {addr} has no matching '['")]
    UnmatchedClose { addr: usize },
}
