//! Bus transport abstraction for the PMW3360 driver.

pub mod spi;

/// Per-channel bus primitives the register transaction engine is built on.
///
/// Every PMW3360 register access is a hand-timed sequence of these primitives, so the trait
/// exposes chip-select, single-byte shifting and blocking delays separately instead of a
/// whole-transaction operation.
pub trait BusTransport {
    /// Error type produced by the concrete bus implementation.
    type Error;

    /// Asserts the sensor's chip-select line.
    fn select(&mut self) -> core::result::Result<(), Self::Error>;

    /// Deasserts the sensor's chip-select line once all shifted bytes are on the wire.
    fn deselect(&mut self) -> core::result::Result<(), Self::Error>;

    /// Shifts one byte out.
    fn transmit(&mut self, byte: u8) -> core::result::Result<(), Self::Error>;

    /// Shifts one byte in.
    fn receive(&mut self) -> core::result::Result<u8, Self::Error>;

    /// Blocks for at least `us` microseconds.
    fn delay_us(&mut self, us: u32);

    /// Blocks for at least `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

impl<T: BusTransport + ?Sized> BusTransport for &mut T {
    type Error = T::Error;

    fn select(&mut self) -> core::result::Result<(), Self::Error> {
        (**self).select()
    }

    fn deselect(&mut self) -> core::result::Result<(), Self::Error> {
        (**self).deselect()
    }

    fn transmit(&mut self, byte: u8) -> core::result::Result<(), Self::Error> {
        (**self).transmit(byte)
    }

    fn receive(&mut self) -> core::result::Result<u8, Self::Error> {
        (**self).receive()
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}
