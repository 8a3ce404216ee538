//! CPI (counts per inch) encoding for the `Config1` resolution register.

/// Lowest resolution supported by the chip.
pub const CPI_MIN: u16 = 100;
/// Highest resolution supported by the chip.
pub const CPI_MAX: u16 = 12_000;
/// Resolution granularity.
pub const CPI_STEP: u16 = 100;

/// Translates between a CPI value and the chip's resolution register encoding.
///
/// The driver writes whatever byte `encode` returns; clamping and rounding of unsupported
/// values is the encoder's decision.
pub trait CpiEncoding {
    /// Encodes a CPI value into the register byte.
    fn encode(&self, cpi: u16) -> u8;

    /// Decodes a register byte into a CPI value.
    fn decode(&self, raw: u8) -> u16;
}

/// Linear `Config1` table: `cpi = (raw + 1) * 100` for raw `0x00..=0x77`.
///
/// Out-of-range requests are clamped to 100..=12000 and rounded to the nearest step.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StepEncoding;

impl StepEncoding {
    const RAW_MAX: u8 = ((CPI_MAX / CPI_STEP) - 1) as u8;
}

impl CpiEncoding for StepEncoding {
    fn encode(&self, cpi: u16) -> u8 {
        let clamped = cpi.clamp(CPI_MIN, CPI_MAX);
        let steps = (clamped + CPI_STEP / 2) / CPI_STEP;
        // clamped >= 100 so steps >= 1
        (steps - 1).min(Self::RAW_MAX as u16) as u8
    }

    fn decode(&self, raw: u8) -> u16 {
        (raw.min(Self::RAW_MAX) as u16 + 1) * CPI_STEP
    }
}
