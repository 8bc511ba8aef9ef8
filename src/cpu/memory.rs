//! Program store and data tape.
//!
//! Both memories are power-of-two sized byte arrays. Addresses are
//! reduced modulo the size on every access, so no access can fault.

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Largest accepted address width for either memory.
pub const MAX_ADDR_BITS: u8 = 20;

/// Address widths of the two memories, fixed at construction.
///
/// The only ways to obtain one are [`Geometry::new`], `Default` and
/// deserialization, and all three go through the same range check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GeometryBits")]
pub struct Geometry {
    code_addr_bits: u8,
    tape_addr_bits: u8,
}

#[derive(Deserialize)]
struct GeometryBits {
    code_addr_bits: u8,
    tape_addr_bits: u8,
}

impl TryFrom<GeometryBits> for Geometry {
    type Error = GeometryError;

    fn try_from(bits: GeometryBits) -> Result<Self, Self::Error> {
        Geometry::new(bits.code_addr_bits, bits.tape_addr_bits)
    }
}

impl Geometry {
    /// Create a validated geometry.
    pub fn new(code_addr_bits: u8, tape_addr_bits: u8) -> Result<Self, GeometryError> {
        let geometry = Self { code_addr_bits, tape_addr_bits };
        geometry.validate()?;
        Ok(geometry)
    }

    fn validate(&self) -> Result<(), GeometryError> {
        check_bits("code", self.code_addr_bits)?;
        check_bits("tape", self.tape_addr_bits)
    }

    /// Program store holds `2^code_addr_bits` bytes.
    pub fn code_addr_bits(&self) -> u8 {
        self.code_addr_bits
    }

    /// Data tape holds `2^tape_addr_bits` cells.
    pub fn tape_addr_bits(&self) -> u8 {
        self.tape_addr_bits
    }

    /// Number of bytes in the program store.
    #[inline]
    pub fn code_size(&self) -> usize {
        1 << self.code_addr_bits
    }

    /// Number of cells on the data tape.
    #[inline]
    pub fn tape_size(&self) -> usize {
        1 << self.tape_addr_bits
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self { code_addr_bits: 8, tape_addr_bits: 8 }
    }
}

fn check_bits(memory: &'static str, bits: u8) -> Result<(), GeometryError> {
    if bits == 0 || bits > MAX_ADDR_BITS {
        return Err(GeometryError::AddrBitsOutOfRange { memory, bits });
    }
    Ok(())
}

/// Errors from constructing a [`Geometry`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("{memory} address width {bits} out of range (1-{max})", max = MAX_ADDR_BITS)]
    AddrBitsOutOfRange { memory: &'static str, bits: u8 },
}

/// A wrapping byte array shared by both memories.
#[derive(Clone, PartialEq, Eq)]
struct Cells {
    bytes: Vec<u8>,
}

impl Cells {
    /// `size` is a power of two; [`Geometry`] guarantees it.
    fn zeroed(size: usize) -> Self {
        Self { bytes: vec![0; size] }
    }

    #[inline]
    fn index(&self, addr: usize) -> usize {
        addr & (self.bytes.len() - 1)
    }

    #[inline]
    fn read(&self, addr: usize) -> u8 {
        self.bytes[self.index(addr)]
    }

    #[inline]
    fn write(&mut self, addr: usize, value: u8) {
        let index = self.index(addr);
        self.bytes[index] = value;
    }

    fn non_zero(&self) -> usize {
        self.bytes.iter().filter(|&&b| b != 0).count()
    }
}

/// Read-only instruction memory.
#[derive(Clone, PartialEq, Eq)]
pub struct ProgramStore {
    cells: Cells,
}

impl ProgramStore {
    /// Populate a store of `geometry.code_size()` bytes from an image.
    ///
    /// Byte `i` of the image lands at address `i mod size`, so an
    /// oversized image aliases onto earlier addresses. Unused addresses
    /// hold 0 (NOP).
    pub fn new(geometry: &Geometry, image: &[u8]) -> Self {
        let mut cells = Cells::zeroed(geometry.code_size());
        let size = cells.bytes.len();
        if image.len() > size {
            log::warn!(
                "program image of {} bytes exceeds store of {} bytes; addresses alias",
                image.len(),
                size
            );
        }
        for (addr, &byte) in image.iter().enumerate() {
            cells.write(addr, byte);
        }
        Self { cells }
    }

    /// Read the byte at `addr` (wrapping).
    #[inline]
    pub fn read(&self, addr: usize) -> u8 {
        self.cells.read(addr)
    }

    /// Number of addressable bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.bytes.len()
    }

    /// Always false; a store holds at least two bytes.
    pub fn is_empty(&self) -> bool {
        self.cells.bytes.is_empty()
    }

    /// Reduce an address to its in-range form.
    #[inline]
    pub fn wrap(&self, addr: usize) -> usize {
        self.cells.index(addr)
    }

    /// Contents as a slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.cells.bytes
    }
}

impl std::fmt::Debug for ProgramStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramStore")
            .field("non_nop_bytes", &self.cells.non_zero())
            .field("size", &self.len())
            .finish()
    }
}

/// Read/write working memory of 8-bit cells.
///
/// Only the control unit writes the tape during execution.
#[derive(Clone, PartialEq, Eq)]
pub struct DataTape {
    cells: Cells,
}

impl DataTape {
    /// Create a tape of `geometry.tape_size()` zeroed cells.
    pub fn new(geometry: &Geometry) -> Self {
        Self { cells: Cells::zeroed(geometry.tape_size()) }
    }

    /// Read the cell at `addr` (wrapping).
    #[inline]
    pub fn read(&self, addr: usize) -> u8 {
        self.cells.read(addr)
    }

    /// Write the cell at `addr` (wrapping).
    #[inline]
    pub fn write(&mut self, addr: usize, value: u8) {
        self.cells.write(addr, value);
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.bytes.is_empty()
    }

    /// Zero every cell.
    pub fn clear(&mut self) {
        self.cells.bytes.fill(0);
    }

    /// Cells `start..start+count`, clipped to the tape (for debugging).
    pub fn dump(&self, start: usize, count: usize) -> Vec<(usize, u8)> {
        let end = start.saturating_add(count).min(self.len());
        (start..end)
            .map(|i| (i, self.cells.bytes[i]))
            .collect()
    }

    /// Contents as a slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.cells.bytes
    }
}

impl std::fmt::Debug for DataTape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataTape")
            .field("non_zero_cells", &self.cells.non_zero())
            .field("total_cells", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_validation() {
        assert!(Geometry::new(1, 1).is_ok());
        assert!(Geometry::new(MAX_ADDR_BITS, 8).is_ok());
        assert_eq!(
            Geometry::new(0, 8),
            Err(GeometryError::AddrBitsOutOfRange { memory: "code", bits: 0 })
        );
        assert_eq!(
            Geometry::new(8, MAX_ADDR_BITS + 1),
            Err(GeometryError::AddrBitsOutOfRange { memory: "tape", bits: MAX_ADDR_BITS + 1 })
        );
    }

    #[test]
    fn test_geometry_sizes() {
        let g = Geometry::new(4, 10).unwrap();
        assert_eq!(g.code_size(), 16);
        assert_eq!(g.tape_size(), 1024);
    }

    fn tape(bits: u8) -> DataTape {
        DataTape::new(&Geometry::new(8, bits).unwrap())
    }

    fn store(bits: u8, image: &[u8]) -> ProgramStore {
        ProgramStore::new(&Geometry::new(bits, 8).unwrap(), image)
    }

    #[test]
    fn test_geometry_deserialize_validates() {
        let g: Geometry = serde_json::from_str(r#"{"code_addr_bits":4,"tape_addr_bits":6}"#).unwrap();
        assert_eq!((g.code_addr_bits(), g.tape_addr_bits()), (4, 6));

        let wide = serde_json::from_str::<Geometry>(r#"{"code_addr_bits":64,"tape_addr_bits":8}"#);
        assert!(wide.is_err());
        let zero = serde_json::from_str::<Geometry>(r#"{"code_addr_bits":8,"tape_addr_bits":0}"#);
        assert!(zero.is_err());
    }

    #[test]
    fn test_tape_read_write() {
        let mut tape = tape(4);
        tape.write(3, 42);
        assert_eq!(tape.read(3), 42);
        assert_eq!(tape.read(4), 0);
    }

    #[test]
    fn test_tape_address_wraps() {
        let mut tape = tape(4);
        tape.write(16 + 5, 7);
        assert_eq!(tape.read(5), 7);
        assert_eq!(tape.read(usize::MAX), tape.read(15));
    }

    #[test]
    fn test_tape_clear() {
        let mut tape = tape(3);
        tape.write(1, 9);
        tape.clear();
        assert!(tape.as_bytes().iter().all(|&c| c == 0));
    }

    #[test]
    fn test_program_store_pads_with_nop() {
        let store = store(3, &[0, 0, b'+']);
        assert_eq!(store.len(), 8);
        assert_eq!(store.read(2), b'+');
        assert_eq!(store.read(7), 0);
        assert_eq!(store.read(8 + 2), b'+');
    }

    #[test]
    fn test_program_store_aliases_oversized_image() {
        let store = store(1, &[0, 0, b'+', b'-', b'.']);
        // later bytes overwrite earlier ones at the same address
        assert_eq!(store.as_bytes(), &[b'.', b'-']);
    }

    #[test]
    fn test_dump_clips_to_tape() {
        let mut tape = tape(2);
        tape.write(3, 1);
        assert_eq!(tape.dump(2, 10), vec![(2, 0), (3, 1)]);
    }

    #[test]
    fn test_dump_past_end_is_empty() {
        let tape = tape(2);
        assert!(tape.dump(usize::MAX, 2).is_empty());
        assert!(tape.dump(4, usize::MAX).is_empty());
    }
}
