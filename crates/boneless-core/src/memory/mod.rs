//! Flat word-addressed memory backing both data and the register window.

use crate::FaultCode;

/// Largest memory the 16-bit PC can address, in cells.
pub const MAX_MEMORY_CELLS: usize = u16::MAX as usize + 1;

/// Default memory size in cells.
pub const DEFAULT_MEMORY_CELLS: usize = 1024;

/// Zero-initialised array of 16-bit cells with bounds-checked access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    cells: Box<[u16]>,
}

impl Memory {
    /// Allocates `size` zeroed cells.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            cells: vec![0; size].into_boxed_slice(),
        }
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true when no cells are allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Read-only view of every cell.
    #[must_use]
    pub fn as_slice(&self) -> &[u16] {
        &self.cells
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u16] {
        &mut self.cells
    }

    /// Reads one cell.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::OutOfBounds`] when `addr` is past the end.
    pub fn read(&self, addr: usize) -> Result<u16, FaultCode> {
        self.cells.get(addr).copied().ok_or(FaultCode::OutOfBounds)
    }

    /// Borrows `len` cells starting at `start`.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::OutOfBounds`] when the range does not fit.
    pub fn slice(&self, start: usize, len: usize) -> Result<&[u16], FaultCode> {
        let end = start.checked_add(len).ok_or(FaultCode::OutOfBounds)?;
        self.cells.get(start..end).ok_or(FaultCode::OutOfBounds)
    }

    /// Copies `words` into memory starting at `start`.
    ///
    /// The whole range is checked first, so a rejected load writes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::OutOfBounds`] when the words overrun memory.
    pub fn load(&mut self, start: usize, words: &[u16]) -> Result<(), FaultCode> {
        let end = start
            .checked_add(words.len())
            .ok_or(FaultCode::OutOfBounds)?;
        let target = self
            .cells
            .get_mut(start..end)
            .ok_or(FaultCode::OutOfBounds)?;
        target.copy_from_slice(words);
        Ok(())
    }
}

/// Converts a big-endian byte stream into 16-bit words.
///
/// # Errors
///
/// Returns [`FaultCode::InvalidEncoding`] when `bytes` has an odd length.
pub fn words_from_be_bytes(bytes: &[u8]) -> Result<Vec<u16>, FaultCode> {
    if bytes.len() % 2 != 0 {
        return Err(FaultCode::InvalidEncoding);
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect())
}
