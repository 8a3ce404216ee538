//! High-level PMW3360 single-channel driver implementation.

use crate::config::{Config, ReadMode};
use crate::cpi::{CpiEncoding, StepEncoding};
use crate::engine::RegisterEngine;
use crate::error::Result;
use crate::firmware::FirmwareLoader;
use crate::interface::BusTransport;
use crate::interface::spi::SpiTransport;
use crate::log::{debug, info, trace, warn};
use crate::motion::{BurstReport, Motion};
use crate::registers::{
    EXPECTED_INVERSE_PRODUCT_ID,
    EXPECTED_PRODUCT_ID,
    MOTION_BURST_LEN,
    MotionStatus,
    REG_CONFIG1,
    REG_DELTA_X_H,
    REG_DELTA_X_L,
    REG_DELTA_Y_H,
    REG_DELTA_Y_L,
    REG_INVERSE_PRODUCT_ID,
    REG_LIFT_CONFIG,
    REG_MOTION,
    REG_POWER_UP_RESET,
    REG_PRODUCT_ID,
    REG_REVISION_ID,
    REG_SHUTDOWN,
    REG_SQUAL,
    REG_SROM_ID,
    RESET_COMMAND,
    SHUTDOWN_COMMAND,
};
use embedded_hal::digital::OutputPin;

// Power-up reset to first register access (milliseconds).
const RESET_SETTLE_DELAY_MS: u32 = 100;
// Firmware upload to first trusted register read (milliseconds).
const FIRMWARE_SETTLE_DELAY_MS: u32 = 10;

/// Identification registers read back from the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Signatures {
    /// `Product_ID` register.
    pub product_id: u8,
    /// `Inverse_Product_ID` register.
    pub inverse_product_id: u8,
    /// `SROM_ID` register, when requested.
    pub srom_id: Option<u8>,
}

impl Signatures {
    /// Returns `true` when the product ID pair matches a PMW3360.
    pub fn identity_matches(&self) -> bool {
        self.product_id == EXPECTED_PRODUCT_ID
            && self.inverse_product_id == EXPECTED_INVERSE_PRODUCT_ID
    }

    /// Returns `true` when the identity matches and, if read, the SROM ID is non-zero.
    pub fn is_valid(&self) -> bool {
        self.identity_matches() && self.srom_id != Some(0x00)
    }
}

/// High-level synchronous driver for one PMW3360 channel.
pub struct Pmw3360<BUS, ENC = StepEncoding> {
    engine: RegisterEngine<BUS>,
    encoding: ENC,
    config: Config,
    present: bool,
    cpi: Option<u16>,
}

impl<BUS> Pmw3360<BUS> {
    // ==================================================================
    // == Driver Construction & Ownership ===============================
    // ==================================================================
    /// Creates a new driver using the stock `Config1` CPI table.
    pub fn new(bus: BUS, config: Config) -> Self {
        Self::with_encoding(bus, config, StepEncoding)
    }
}

impl<BUS, ENC> Pmw3360<BUS, ENC> {
    /// Creates a new driver with a custom CPI encoding.
    pub fn with_encoding(bus: BUS, config: Config, encoding: ENC) -> Self {
        Self {
            engine: RegisterEngine::new(bus),
            encoding,
            config,
            present: false,
            cpi: None,
        }
    }

    /// Consumes the driver and returns the owned transport.
    pub fn release(self) -> (BUS, Config) {
        (self.engine.release(), self.config)
    }

    /// Provides mutable access to the register transaction engine.
    pub fn engine_mut(&mut self) -> &mut RegisterEngine<BUS> {
        &mut self.engine
    }

    /// Returns `true` once [`init`](Self::init) has confirmed the chip identity.
    pub fn is_present(&self) -> bool {
        self.present
    }

    /// Returns a shared reference to the active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Last CPI written or read back, without touching the bus.
    pub fn cached_cpi(&self) -> Option<u16> {
        self.cpi
    }
}

impl<SPI, CS, D> Pmw3360<SpiTransport<SPI, CS, D>>
where
    CS: OutputPin,
{
    // ==================================================================
    // == SPI Convenience Constructors ==================================
    // ==================================================================
    /// Convenience constructor for SPI transports.
    pub fn new_spi(
        spi: SPI,
        cs: CS,
        delay: D,
        config: Config,
    ) -> core::result::Result<Self, CS::Error> {
        Ok(Self::new(SpiTransport::new(spi, cs, delay)?, config))
    }

    /// Releases the driver, returning the SPI bus, chip-select pin, delay and configuration.
    pub fn release_spi(self) -> (SPI, CS, D, Config) {
        let (transport, config) = self.release();
        let (spi, cs, delay) = transport.release();
        (spi, cs, delay, config)
    }
}

impl<BUS, ENC, CommE> Pmw3360<BUS, ENC>
where
    BUS: BusTransport<Error = CommE>,
    ENC: CpiEncoding,
{
    // ==================================================================
    // == Initialization & Identification ===============================
    // ==================================================================
    /// Resets the chip, checks its identity and uploads firmware.
    ///
    /// Returns `Ok(false)` when the product ID pair does not match; the chip is then marked
    /// absent, no firmware upload is attempted and the caller may retry. On success the motion
    /// and delta registers are drained so the first sample carries no pre-reset motion, the
    /// `firmware` loader runs and the stored [`Config`] is applied.
    pub fn init(&mut self, mut firmware: impl FirmwareLoader) -> Result<bool, CommE> {
        self.reset()?;
        self.engine.delay_ms(RESET_SETTLE_DELAY_MS);

        let product_id = self.engine.read_register(REG_PRODUCT_ID)?;
        let inverse_product_id = self.engine.read_register(REG_INVERSE_PRODUCT_ID)?;
        let signatures = Signatures {
            product_id,
            inverse_product_id,
            srom_id: None,
        };

        if !signatures.identity_matches() {
            warn!(
                "product id mismatch: {=u8:#x}/{=u8:#x}",
                product_id, inverse_product_id
            );
            return Ok(false);
        }

        self.drain_motion()?;

        firmware.upload(&mut self.engine)?;
        self.engine.delay_ms(FIRMWARE_SETTLE_DELAY_MS);

        self.present = true;
        self.apply_config(self.config)?;
        info!("PMW3360 ready");
        Ok(true)
    }

    /// Issues the power-up reset command and marks the chip absent until re-initialized.
    pub fn reset(&mut self) -> Result<(), CommE> {
        self.present = false;
        self.cpi = None;
        debug!("power-up reset");
        self.engine.write_register(REG_POWER_UP_RESET, RESET_COMMAND)
    }

    /// Reads the identification registers, optionally including `SROM_ID`.
    pub fn check_signatures(&mut self, check_srom: bool) -> Result<Signatures, CommE> {
        let product_id = self.engine.read_register(REG_PRODUCT_ID)?;
        let inverse_product_id = self.engine.read_register(REG_INVERSE_PRODUCT_ID)?;
        let srom_id = if check_srom {
            Some(self.engine.read_register(REG_SROM_ID)?)
        } else {
            None
        };

        Ok(Signatures {
            product_id,
            inverse_product_id,
            srom_id,
        })
    }

    /// Reads the `Product_ID` register.
    pub fn product_id(&mut self) -> Result<u8, CommE> {
        self.engine.read_register(REG_PRODUCT_ID)
    }

    /// Reads the `Revision_ID` register.
    pub fn revision_id(&mut self) -> Result<u8, CommE> {
        self.engine.read_register(REG_REVISION_ID)
    }

    /// Reads the `SROM_ID` register.
    pub fn srom_id(&mut self) -> Result<u8, CommE> {
        self.engine.read_register(REG_SROM_ID)
    }

    // ==================================================================
    // == Configuration =================================================
    // ==================================================================
    /// Applies a new configuration to the chip and stores it.
    ///
    /// A requested CPI is stored as the effective value the encoding produced.
    pub fn configure(&mut self, config: Config) -> Result<(), CommE> {
        self.config = config;
        self.apply_config(config)
    }

    /// Writes the encoded resolution to `Config1`.
    pub fn set_cpi(&mut self, cpi: u16) -> Result<(), CommE> {
        let raw = self.encoding.encode(cpi);
        self.engine.write_register(REG_CONFIG1, raw)?;

        let effective = self.encoding.decode(raw);
        self.cpi = Some(effective);
        self.config.cpi = Some(effective);
        info!("CPI set to {=u16} (requested {=u16})", effective, cpi);
        Ok(())
    }

    /// Reads `Config1` back and decodes the active resolution.
    pub fn cpi(&mut self) -> Result<u16, CommE> {
        let raw = self.engine.read_register(REG_CONFIG1)?;
        let cpi = self.encoding.decode(raw);
        self.cpi = Some(cpi);
        Ok(cpi)
    }

    // ==================================================================
    // == Motion Acquisition ============================================
    // ==================================================================
    /// Reads one motion sample using the configured [`ReadMode`].
    pub fn read_motion(&mut self) -> Result<Motion, CommE> {
        match self.config.read_mode {
            ReadMode::Registers => self.read_motion_registers(),
            ReadMode::Burst => Ok(self.read_burst_report()?.motion),
        }
    }

    /// Fills every slot of `samples` with a fresh motion sample.
    pub fn read_samples(&mut self, samples: &mut [Motion]) -> Result<(), CommE> {
        for sample in samples.iter_mut() {
            *sample = self.read_motion()?;
        }
        Ok(())
    }

    /// Reads one sample register by register: status, X, Y, then SQUAL.
    ///
    /// Status and delta reads clear the chip's accumulators, so the order is fixed.
    pub fn read_motion_registers(&mut self) -> Result<Motion, CommE> {
        let status = self.engine.read_register(REG_MOTION)?;
        let dx_l = self.engine.read_register(REG_DELTA_X_L)?;
        let dx_h = self.engine.read_register(REG_DELTA_X_H)?;
        let dy_l = self.engine.read_register(REG_DELTA_Y_L)?;
        let dy_h = self.engine.read_register(REG_DELTA_Y_H)?;
        let squal = self.engine.read_register(REG_SQUAL)?;

        let motion = Motion::from_registers(status, dx_l, dx_h, dy_l, dy_h, squal);
        trace!("motion {}", motion);
        Ok(motion)
    }

    /// Reads a full `Motion_Burst` frame.
    pub fn read_burst_report(&mut self) -> Result<BurstReport, CommE> {
        let mut frame = [0u8; MOTION_BURST_LEN];
        self.engine.read_burst(&mut frame)?;
        Ok(BurstReport::from_frame(&frame))
    }

    /// Reads and decodes the `Motion` status register alone.
    pub fn read_status(&mut self) -> Result<MotionStatus, CommE> {
        let raw = self.engine.read_register(REG_MOTION)?;
        Ok(MotionStatus::from(raw))
    }

    // ==================================================================
    // == Raw Register Access & Power ===================================
    // ==================================================================
    /// Reads an arbitrary register.
    pub fn read_register(&mut self, address: u8) -> Result<u8, CommE> {
        self.engine.read_register(address)
    }

    /// Writes an arbitrary register.
    pub fn write_register(&mut self, address: u8, value: u8) -> Result<(), CommE> {
        self.engine.write_register(address, value)
    }

    /// Powers the chip down. A new [`init`](Self::init) is required afterwards.
    pub fn shutdown(&mut self) -> Result<(), CommE> {
        self.engine.write_register(REG_SHUTDOWN, SHUTDOWN_COMMAND)?;
        self.present = false;
        self.cpi = None;
        Ok(())
    }

    // ==================================================================
    // == Internal Helpers ==============================================
    // ==================================================================
    fn drain_motion(&mut self) -> Result<(), CommE> {
        for register in [
            REG_MOTION,
            REG_DELTA_X_L,
            REG_DELTA_X_H,
            REG_DELTA_Y_L,
            REG_DELTA_Y_H,
        ] {
            self.engine.read_register(register)?;
        }
        Ok(())
    }

    fn apply_config(&mut self, config: Config) -> Result<(), CommE> {
        if let Some(cpi) = config.cpi {
            self.set_cpi(cpi)?;
        }

        if let Some(lift_cutoff) = config.lift_cutoff {
            self.engine.write_register(REG_LIFT_CONFIG, lift_cutoff.bits())?;
        }

        Ok(())
    }
}

impl<SPI, CS, D, ENC> Pmw3360<SpiTransport<SPI, CS, D>, ENC> {
    /// Provides mutable access to the wrapped SPI bus.
    pub fn spi_mut(&mut self) -> &mut SPI {
        self.engine.bus_mut().spi_mut()
    }
}
