//! RAM-backed EEPROM image
//!
//! Used on host for tests and tooling, and on boards that shadow a
//! slow external part in RAM.

use crate::eeprom::{Eeprom, ERASED_BYTE};

/// In-memory EEPROM of `N` bytes
///
/// Starts fully erased ([`ERASED_BYTE`]). Reads outside the image return
/// [`ERASED_BYTE`]; writes outside it are dropped.
///
/// # Example
///
/// ```
/// use digidash_hal::{Eeprom, MemoryEeprom};
///
/// let mut eeprom = MemoryEeprom::<64>::new();
/// eeprom.write_byte(0x10, 0x01);
///
/// assert_eq!(eeprom.read_byte(0x10), 0x01);
/// assert_eq!(eeprom.read_byte(0x11), 0xFF);
/// assert_eq!(eeprom.write_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryEeprom<const N: usize> {
    cells: [u8; N],
    writes: u32,
}

impl<const N: usize> Default for MemoryEeprom<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MemoryEeprom<N> {
    /// Create an erased image
    pub const fn new() -> Self {
        Self {
            cells: [ERASED_BYTE; N],
            writes: 0,
        }
    }

    /// Create an image from existing contents (e.g. a dump read from a device)
    pub const fn from_image(cells: [u8; N]) -> Self {
        Self { cells, writes: 0 }
    }

    /// Raw contents
    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }

    /// Inspect a byte without going through the [`Eeprom`] trait
    pub fn peek(&self, address: u16) -> u8 {
        self.cells
            .get(address as usize)
            .copied()
            .unwrap_or(ERASED_BYTE)
    }

    /// Overwrite a byte without counting it as a write
    ///
    /// Used to simulate corruption or a foreign firmware's layout.
    pub fn poke(&mut self, address: u16, value: u8) {
        if let Some(cell) = self.cells.get_mut(address as usize) {
            *cell = value;
        }
    }

    /// Erase the whole image
    pub fn erase(&mut self) {
        self.cells = [ERASED_BYTE; N];
    }

    /// Number of byte writes since creation or the last reset
    pub fn write_count(&self) -> u32 {
        self.writes
    }

    /// Reset the write counter
    pub fn reset_write_count(&mut self) {
        self.writes = 0;
    }
}

impl<const N: usize> Eeprom for MemoryEeprom<N> {
    fn read_byte(&mut self, address: u16) -> u8 {
        self.peek(address)
    }

    fn write_byte(&mut self, address: u16, value: u8) {
        if let Some(cell) = self.cells.get_mut(address as usize) {
            *cell = value;
            self.writes = self.writes.saturating_add(1);
        }
    }
}
