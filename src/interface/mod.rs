//! Bus interface abstraction for the MAX30102 driver.

pub mod i2c;

/// Abstraction over the low-level register access required by the driver.
///
/// Implementations either transfer the full requested data or fail; partial
/// reads are never reported as success.
pub trait Max30102Interface {
    /// Error type produced by the concrete bus implementation.
    type Error;

    /// Writes a single register.
    fn write_register(&mut self, register: u8, value: u8) -> core::result::Result<(), Self::Error>;

    /// Reads a single register.
    fn read_register(&mut self, register: u8) -> core::result::Result<u8, Self::Error>;

    /// Reads `buf.len()` bytes starting at the provided register.
    fn read_many(&mut self, register: u8, buf: &mut [u8]) -> core::result::Result<(), Self::Error>;

    /// Reports whether a bus error means the transfer timed out.
    fn is_timeout(_error: &Self::Error) -> bool {
        false
    }
}
