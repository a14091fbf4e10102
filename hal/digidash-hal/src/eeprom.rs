//! EEPROM storage abstractions
//!
//! Provides the byte read/write capability the settings store persists
//! through. Implementations are synchronous: on-chip EEPROM and emulated
//! EEPROM complete a byte access in microseconds.

/// Value of a byte that has never been written (erased cell)
pub const ERASED_BYTE: u8 = 0xFF;

/// Byte-addressable persistent storage
///
/// `read_byte` returns the last value written to `address`, or an
/// implementation-defined reset value (usually [`ERASED_BYTE`]) if the
/// address was never written. Addresses outside the device are the
/// implementation's concern; the settings store never produces them.
pub trait Eeprom {
    /// Read a single byte
    fn read_byte(&mut self, address: u16) -> u8;

    /// Write a single byte
    fn write_byte(&mut self, address: u16, value: u8);

    /// Read `buffer.len()` consecutive bytes starting at `address`
    fn read_into(&mut self, address: u16, buffer: &mut [u8]) {
        for (offset, byte) in buffer.iter_mut().enumerate() {
            *byte = self.read_byte(address.wrapping_add(offset as u16));
        }
    }

    /// Write `data` to consecutive bytes starting at `address`
    fn write_from(&mut self, address: u16, data: &[u8]) {
        for (offset, &byte) in data.iter().enumerate() {
            self.write_byte(address.wrapping_add(offset as u16), byte);
        }
    }

    /// Write `data`, skipping bytes that already hold the target value
    ///
    /// Saves erase/write cycles on cells that do not change.
    /// Returns the number of bytes actually written.
    fn update_from(&mut self, address: u16, data: &[u8]) -> usize {
        let mut written = 0;
        for (offset, &byte) in data.iter().enumerate() {
            let addr = address.wrapping_add(offset as u16);
            if self.read_byte(addr) != byte {
                self.write_byte(addr, byte);
                written += 1;
            }
        }
        written
    }
}

impl<T: Eeprom + ?Sized> Eeprom for &mut T {
    fn read_byte(&mut self, address: u16) -> u8 {
        (**self).read_byte(address)
    }

    fn write_byte(&mut self, address: u16, value: u8) {
        (**self).write_byte(address, value)
    }
}

/// Storage built from a pair of read/write handlers
///
/// Lets a board hand over two plain functions (for example thin wrappers
/// around vendor HAL calls) instead of implementing [`Eeprom`] on a type.
///
/// ```
/// use digidash_hal::{Eeprom, EepromHandlers};
///
/// let mut cells = [0xFFu8; 16];
/// let cells = core::cell::RefCell::new(&mut cells);
/// let mut eeprom = EepromHandlers::new(
///     |addr| cells.borrow()[addr as usize],
///     |addr, value| cells.borrow_mut()[addr as usize] = value,
/// );
///
/// eeprom.write_byte(3, 0x42);
/// assert_eq!(eeprom.read_byte(3), 0x42);
/// ```
pub struct EepromHandlers<R, W> {
    read: R,
    write: W,
}

impl<R, W> EepromHandlers<R, W>
where
    R: FnMut(u16) -> u8,
    W: FnMut(u16, u8),
{
    /// Create storage from a read handler and a write handler
    pub fn new(read: R, write: W) -> Self {
        Self { read, write }
    }
}

impl<R, W> Eeprom for EepromHandlers<R, W>
where
    R: FnMut(u16) -> u8,
    W: FnMut(u16, u8),
{
    fn read_byte(&mut self, address: u16) -> u8 {
        (self.read)(address)
    }

    fn write_byte(&mut self, address: u16, value: u8) {
        (self.write)(address, value)
    }
}
