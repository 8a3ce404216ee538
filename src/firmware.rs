//! SROM firmware upload.
//!
//! The PMW3360 boots from ROM and accepts an optional SROM image that replaces its optical
//! processing microcode. The upload runs right after the identity check in
//! [`Pmw3360::init`](crate::device::Pmw3360::init), while the chip is freshly reset.

use crate::engine::RegisterEngine;
use crate::error::{Error, Result};
use crate::interface::BusTransport;
use crate::log::{debug, info, warn};
use crate::registers::{REG_CONFIG2, REG_SROM_ENABLE, REG_SROM_ID, REG_SROM_LOAD_BURST};

// SROM_Enable value that initializes the download.
const SROM_ENABLE_INIT: u8 = 0x1D;
// SROM_Enable value that starts the download.
const SROM_ENABLE_START: u8 = 0x18;
// Wait between the two SROM_Enable writes (milliseconds).
const SROM_INIT_DELAY_MS: u32 = 10;

/// Uploads firmware to a freshly reset, identity-checked chip.
pub trait FirmwareLoader {
    /// Runs the upload over the channel's engine, leaving the chip ready for register access.
    fn upload<BUS: BusTransport>(
        &mut self,
        engine: &mut RegisterEngine<BUS>,
    ) -> Result<(), BUS::Error>;
}

impl<T: FirmwareLoader + ?Sized> FirmwareLoader for &mut T {
    fn upload<BUS: BusTransport>(
        &mut self,
        engine: &mut RegisterEngine<BUS>,
    ) -> Result<(), BUS::Error> {
        (**self).upload(engine)
    }
}

/// Loader that leaves the chip on its ROM firmware.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFirmware;

impl FirmwareLoader for NoFirmware {
    fn upload<BUS: BusTransport>(
        &mut self,
        _engine: &mut RegisterEngine<BUS>,
    ) -> Result<(), BUS::Error> {
        debug!("no SROM image, running ROM firmware");
        Ok(())
    }
}

/// Loader that streams a caller-supplied SROM image through `SROM_Load_Burst`.
#[derive(Debug, Clone, Copy)]
pub struct SromLoader<'a> {
    image: &'a [u8],
    srom_id: Option<u8>,
}

impl<'a> SromLoader<'a> {
    /// Creates a loader for the provided image.
    pub const fn new(image: &'a [u8]) -> Self {
        Self { image, srom_id: None }
    }

    /// `SROM_ID` reported after the most recent successful upload.
    pub fn srom_id(&self) -> Option<u8> {
        self.srom_id
    }
}

impl FirmwareLoader for SromLoader<'_> {
    fn upload<BUS: BusTransport>(
        &mut self,
        engine: &mut RegisterEngine<BUS>,
    ) -> Result<(), BUS::Error> {
        info!("uploading SROM image ({} bytes)", self.image.len());

        // Rest modes stay off while the download runs.
        engine.write_register(REG_CONFIG2, 0x00)?;
        engine.write_register(REG_SROM_ENABLE, SROM_ENABLE_INIT)?;
        engine.delay_ms(SROM_INIT_DELAY_MS);
        engine.write_register(REG_SROM_ENABLE, SROM_ENABLE_START)?;
        engine.write_burst(REG_SROM_LOAD_BURST, self.image)?;

        let srom_id = engine.read_register(REG_SROM_ID)?;
        if srom_id == 0x00 {
            warn!("SROM upload rejected");
            self.srom_id = None;
            return Err(Error::FirmwareRejected);
        }

        debug!("SROM_ID {=u8:#x}", srom_id);
        self.srom_id = Some(srom_id);
        Ok(())
    }
}
