//! SPI transport built on top of `embedded-hal` `SpiBus`, `OutputPin` and `DelayNs`.
//!
//! The PMW3360 needs chip-select held across multi-microsecond gaps between bytes, which an
//! `SpiDevice` cannot express, so the transport drives the select line itself.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use super::BusTransport;

/// Errors raised by [`SpiTransport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiTransportError<SpiE, PinE> {
    /// Error from the underlying SPI bus.
    Spi(SpiE),
    /// Error from the chip-select pin.
    Pin(PinE),
}

/// SPI-based transport for one sensor channel.
pub struct SpiTransport<SPI, CS, D> {
    spi: SPI,
    cs: CS,
    delay: D,
}

impl<SPI, CS, D> SpiTransport<SPI, CS, D>
where
    CS: OutputPin,
{
    /// Creates a new transport and drives chip-select to its idle (high) level.
    pub fn new(spi: SPI, mut cs: CS, delay: D) -> core::result::Result<Self, CS::Error> {
        cs.set_high()?;
        Ok(Self { spi, cs, delay })
    }
}

impl<SPI, CS, D> SpiTransport<SPI, CS, D> {
    /// Provides mutable access to the wrapped SPI bus.
    pub fn spi_mut(&mut self) -> &mut SPI {
        &mut self.spi
    }

    /// Consumes the transport and returns the owned bus, pin and delay.
    pub fn release(self) -> (SPI, CS, D) {
        (self.spi, self.cs, self.delay)
    }
}

impl<SPI, CS, D> BusTransport for SpiTransport<SPI, CS, D>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
    D: DelayNs,
{
    type Error = SpiTransportError<SPI::Error, CS::Error>;

    fn select(&mut self) -> core::result::Result<(), Self::Error> {
        self.cs.set_low().map_err(SpiTransportError::Pin)
    }

    fn deselect(&mut self) -> core::result::Result<(), Self::Error> {
        self.spi.flush().map_err(SpiTransportError::Spi)?;
        self.cs.set_high().map_err(SpiTransportError::Pin)
    }

    fn transmit(&mut self, byte: u8) -> core::result::Result<(), Self::Error> {
        self.spi
            .write(core::slice::from_ref(&byte))
            .map_err(SpiTransportError::Spi)
    }

    fn receive(&mut self) -> core::result::Result<u8, Self::Error> {
        let mut value = [0u8; 1];
        self.spi.read(&mut value).map_err(SpiTransportError::Spi)?;
        Ok(value[0])
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
