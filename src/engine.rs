//! Timed register read/write protocol for a single PMW3360 channel.
//!
//! Each transaction runs select → address → data → deselect with fixed waits between the
//! phases. The waits are chip minimums: they may be lengthened but never shortened, since the
//! sensor has no handshake and an early clock edge silently corrupts the byte.

use crate::error::Result;
use crate::interface::BusTransport;
use crate::registers::{READ_MASK, REG_MOTION_BURST, WRITE_FLAG};

// Chip-select assertion to first clock edge.
const T_NCS_SCLK_US: u32 = 1;
// Additional guard after chip-select before the address byte.
const T_SELECT_GUARD_US: u32 = 10;
// Read address to data: the sensor's internal register access latency.
const T_SRAD_US: u32 = 100;
// Last clock of the data byte to chip-select release on reads.
const T_SCLK_NCS_READ_US: u32 = 1;
// Chip-select release after a read until the bus may carry the next transaction.
const T_READ_SETTLE_US: u32 = 19;
// Write address byte to data byte spacing.
const T_ADDRESS_DATA_US: u32 = 1;
// Additional guard between the write address and data bytes.
const T_ADDRESS_GUARD_US: u32 = 10;
// Last clock of the written byte to chip-select release.
const T_SCLK_NCS_WRITE_US: u32 = 20;
// Chip-select release after a write until the bus may carry the next transaction.
const T_WRITE_SETTLE_US: u32 = 100;
// Motion_Burst address to first data byte.
const T_SRAD_MOTBR_US: u32 = 35;
// Chip-select release to burst mode exit.
const T_BEXIT_US: u32 = 1;
// Spacing after every byte of a streaming write.
const T_BURST_BYTE_US: u32 = 15;
// Chip-select release after a streaming write.
const T_BURST_WRITE_SETTLE_US: u32 = 200;

/// Register transaction engine bound to one bus transport.
///
/// The engine owns its transport and every transaction takes `&mut self`, so a
/// select → deselect sequence can never be interleaved with another transaction on the same
/// channel. Two engines share nothing.
pub struct RegisterEngine<BUS> {
    bus: BUS,
}

impl<BUS> RegisterEngine<BUS> {
    /// Creates a new engine from the provided transport.
    pub const fn new(bus: BUS) -> Self {
        Self { bus }
    }

    /// Provides mutable access to the underlying transport.
    pub fn bus_mut(&mut self) -> &mut BUS {
        &mut self.bus
    }

    /// Consumes the engine and returns the owned transport.
    pub fn release(self) -> BUS {
        self.bus
    }
}

impl<BUS, CommE> RegisterEngine<BUS>
where
    BUS: BusTransport<Error = CommE>,
{
    /// Runs `body` inside one select/deselect frame, then waits `settle_us`.
    ///
    /// Chip-select is released even when `body` fails, so a bus error never leaves the sensor
    /// selected. The body's error takes precedence over a deselect error.
    fn framed<T>(
        &mut self,
        settle_us: &[u32],
        body: impl FnOnce(&mut BUS) -> core::result::Result<T, CommE>,
    ) -> Result<T, CommE> {
        self.bus.select()?;
        let outcome = body(&mut self.bus);
        let released = self.bus.deselect();
        for &us in settle_us {
            self.bus.delay_us(us);
        }

        let value = outcome?;
        released?;
        Ok(value)
    }

    /// Reads a single register.
    ///
    /// Bit 7 of `address` is cleared before transmission. The received byte is returned as is;
    /// an absent chip yields whatever the bus floats to.
    pub fn read_register(&mut self, address: u8) -> Result<u8, CommE> {
        let address = address & READ_MASK;

        self.framed(&[T_READ_SETTLE_US], |bus| {
            bus.delay_us(T_NCS_SCLK_US);
            bus.delay_us(T_SELECT_GUARD_US);
            bus.transmit(address)?;
            bus.delay_us(T_SRAD_US);
            let value = bus.receive()?;
            bus.delay_us(T_SCLK_NCS_READ_US);
            Ok(value)
        })
    }

    /// Writes a single register.
    ///
    /// Bit 7 of `address` is set before transmission; `value` is sent unmodified.
    pub fn write_register(&mut self, address: u8, value: u8) -> Result<(), CommE> {
        let address = address | WRITE_FLAG;

        self.framed(&[T_WRITE_SETTLE_US], |bus| {
            bus.delay_us(T_NCS_SCLK_US);
            bus.delay_us(T_SELECT_GUARD_US);
            bus.transmit(address)?;
            bus.delay_us(T_ADDRESS_DATA_US);
            bus.delay_us(T_ADDRESS_GUARD_US);
            bus.transmit(value)?;
            bus.delay_us(T_SCLK_NCS_WRITE_US);
            Ok(())
        })
    }

    /// Streams `buf.len()` bytes out of `Motion_Burst`.
    ///
    /// The burst is armed by a write to `Motion_Burst`, then read back in one transaction.
    pub fn read_burst(&mut self, buf: &mut [u8]) -> Result<(), CommE> {
        if buf.is_empty() {
            return Ok(());
        }

        self.write_register(REG_MOTION_BURST, 0x00)?;

        self.framed(&[T_BEXIT_US, T_READ_SETTLE_US], |bus| {
            bus.delay_us(T_NCS_SCLK_US);
            bus.transmit(REG_MOTION_BURST & READ_MASK)?;
            bus.delay_us(T_SRAD_MOTBR_US);
            for byte in buf.iter_mut() {
                *byte = bus.receive()?;
            }
            bus.delay_us(T_SCLK_NCS_READ_US);
            Ok(())
        })
    }

    /// Streams `data` into a burst-load register such as `SROM_Load_Burst`.
    pub fn write_burst(&mut self, address: u8, data: &[u8]) -> Result<(), CommE> {
        if data.is_empty() {
            return Ok(());
        }

        self.framed(&[T_BURST_WRITE_SETTLE_US], |bus| {
            bus.delay_us(T_NCS_SCLK_US);
            bus.transmit(address | WRITE_FLAG)?;
            bus.delay_us(T_BURST_BYTE_US);
            for byte in data {
                bus.transmit(*byte)?;
                bus.delay_us(T_BURST_BYTE_US);
            }
            Ok(())
        })
    }

    /// Blocks for at least `ms` milliseconds using the channel's delay primitive.
    pub fn delay_ms(&mut self, ms: u32) {
        self.bus.delay_ms(ms);
    }

    /// Blocks for at least `us` microseconds using the channel's delay primitive.
    pub fn delay_us(&mut self, us: u32) {
        self.bus.delay_us(us);
    }
}
