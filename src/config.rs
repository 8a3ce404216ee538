//! Configuration primitives for the PMW3360 driver.

use crate::registers::LiftCutoff;

/// How motion samples are collected from the chip.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadMode {
    /// One transaction per register, in status → X → Y → SQUAL order.
    #[default]
    Registers,
    /// One `Motion_Burst` transaction per sample.
    Burst,
}

/// User-facing configuration for one PMW3360 channel.
///
/// Nothing here is persisted: the chip registers are the source of truth and are lost on
/// power cycle, so the configuration has to be re-applied after every initialization.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Resolution to program, or `None` to keep the chip default.
    pub cpi: Option<u16>,
    /// Motion acquisition strategy.
    pub read_mode: ReadMode,
    /// Lift detection height, or `None` to keep the chip default.
    pub lift_cutoff: Option<LiftCutoff>,
}

impl Config {
    /// Begins building a [`Config`] using the builder pattern.
    pub fn new() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for [`Config`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder seeded with [`Config::default()`].
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Sets the resolution in counts per inch.
    pub fn cpi(mut self, cpi: u16) -> Self {
        self.config.cpi = Some(cpi);
        self
    }

    /// Selects the motion acquisition strategy.
    pub fn read_mode(mut self, read_mode: ReadMode) -> Self {
        self.config.read_mode = read_mode;
        self
    }

    /// Sets the lift detection height.
    pub fn lift_cutoff(mut self, lift_cutoff: LiftCutoff) -> Self {
        self.config.lift_cutoff = Some(lift_cutoff);
        self
    }

    /// Finalizes the builder and returns the [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_starts_from_defaults() {
        assert_eq!(Config::new().build(), Config::default());
        assert_eq!(Config::default().read_mode, ReadMode::Registers);
    }

    #[test]
    fn builder_overrides_fields() {
        let config = Config::new()
            .cpi(1_600)
            .read_mode(ReadMode::Burst)
            .lift_cutoff(LiftCutoff::Mm3)
            .build();

        assert_eq!(config.cpi, Some(1_600));
        assert_eq!(config.read_mode, ReadMode::Burst);
        assert_eq!(config.lift_cutoff, Some(LiftCutoff::Mm3));
    }
}
