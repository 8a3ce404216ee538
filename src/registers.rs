//! Register map definitions for the PMW3360 optical flow sensor.
//!
//! Addresses are the bare 7-bit values from the datasheet. The transaction engine owns the
//! direction bit, so none of these constants carry bit 7.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

/// Register address of `Product_ID`.
pub const REG_PRODUCT_ID: u8 = 0x00;
/// Register address of `Revision_ID`.
pub const REG_REVISION_ID: u8 = 0x01;
/// Register address of `Motion`.
pub const REG_MOTION: u8 = 0x02;
/// Register address of `Delta_X_L`.
pub const REG_DELTA_X_L: u8 = 0x03;
/// Register address of `Delta_X_H`.
pub const REG_DELTA_X_H: u8 = 0x04;
/// Register address of `Delta_Y_L`.
pub const REG_DELTA_Y_L: u8 = 0x05;
/// Register address of `Delta_Y_H`.
pub const REG_DELTA_Y_H: u8 = 0x06;
/// Register address of `SQUAL`.
pub const REG_SQUAL: u8 = 0x07;
/// Register address of `Raw_Data_Sum`.
pub const REG_RAW_DATA_SUM: u8 = 0x08;
/// Register address of `Maximum_Raw_data`.
pub const REG_MAXIMUM_RAW_DATA: u8 = 0x09;
/// Register address of `Minimum_Raw_data`.
pub const REG_MINIMUM_RAW_DATA: u8 = 0x0A;
/// Register address of `Shutter_Lower`.
pub const REG_SHUTTER_LOWER: u8 = 0x0B;
/// Register address of `Shutter_Upper`.
pub const REG_SHUTTER_UPPER: u8 = 0x0C;
/// Register address of `Control`.
pub const REG_CONTROL: u8 = 0x0D;
/// Register address of `Config1` (resolution).
pub const REG_CONFIG1: u8 = 0x0F;
/// Register address of `Config2`.
pub const REG_CONFIG2: u8 = 0x10;
/// Register address of `Angle_Tune`.
pub const REG_ANGLE_TUNE: u8 = 0x11;
/// Register address of `Frame_Capture`.
pub const REG_FRAME_CAPTURE: u8 = 0x12;
/// Register address of `SROM_Enable`.
pub const REG_SROM_ENABLE: u8 = 0x13;
/// Register address of `Run_Downshift`.
pub const REG_RUN_DOWNSHIFT: u8 = 0x14;
/// Register address of `Rest1_Rate_Lower`.
pub const REG_REST1_RATE_LOWER: u8 = 0x15;
/// Register address of `Rest1_Rate_Upper`.
pub const REG_REST1_RATE_UPPER: u8 = 0x16;
/// Register address of `Rest1_Downshift`.
pub const REG_REST1_DOWNSHIFT: u8 = 0x17;
/// Register address of `Rest2_Rate_Lower`.
pub const REG_REST2_RATE_LOWER: u8 = 0x18;
/// Register address of `Rest2_Rate_Upper`.
pub const REG_REST2_RATE_UPPER: u8 = 0x19;
/// Register address of `Rest2_Downshift`.
pub const REG_REST2_DOWNSHIFT: u8 = 0x1A;
/// Register address of `Rest3_Rate_Lower`.
pub const REG_REST3_RATE_LOWER: u8 = 0x1B;
/// Register address of `Rest3_Rate_Upper`.
pub const REG_REST3_RATE_UPPER: u8 = 0x1C;
/// Register address of `Observation`.
pub const REG_OBSERVATION: u8 = 0x24;
/// Register address of `Data_Out_Lower`.
pub const REG_DATA_OUT_LOWER: u8 = 0x25;
/// Register address of `Data_Out_Upper`.
pub const REG_DATA_OUT_UPPER: u8 = 0x26;
/// Register address of `Raw_Data_Dump`.
pub const REG_RAW_DATA_DUMP: u8 = 0x29;
/// Register address of `SROM_ID`.
pub const REG_SROM_ID: u8 = 0x2A;
/// Register address of `Min_SQ_Run`.
pub const REG_MIN_SQ_RUN: u8 = 0x2B;
/// Register address of `Raw_Data_Threshold`.
pub const REG_RAW_DATA_THRESHOLD: u8 = 0x2C;
/// Register address of `Config5`.
pub const REG_CONFIG5: u8 = 0x2F;
/// Register address of `Power_Up_Reset`.
pub const REG_POWER_UP_RESET: u8 = 0x3A;
/// Register address of `Shutdown`.
pub const REG_SHUTDOWN: u8 = 0x3B;
/// Register address of `Inverse_Product_ID`.
pub const REG_INVERSE_PRODUCT_ID: u8 = 0x3F;
/// Register address of `LiftCutoff_Tune3`.
pub const REG_LIFT_CUTOFF_TUNE3: u8 = 0x41;
/// Register address of `Angle_Snap`.
pub const REG_ANGLE_SNAP: u8 = 0x42;
/// Register address of `LiftCutoff_Tune1`.
pub const REG_LIFT_CUTOFF_TUNE1: u8 = 0x4A;
/// Register address of `Motion_Burst`.
pub const REG_MOTION_BURST: u8 = 0x50;
/// Register address of `LiftCutoff_Tune_Timeout`.
pub const REG_LIFT_CUTOFF_TUNE_TIMEOUT: u8 = 0x58;
/// Register address of `LiftCutoff_Tune_Min_Length`.
pub const REG_LIFT_CUTOFF_TUNE_MIN_LENGTH: u8 = 0x5A;
/// Register address of `SROM_Load_Burst`.
pub const REG_SROM_LOAD_BURST: u8 = 0x62;
/// Register address of `Lift_Config`.
pub const REG_LIFT_CONFIG: u8 = 0x63;
/// Register address of `Raw_Data_Burst`.
pub const REG_RAW_DATA_BURST: u8 = 0x64;
/// Register address of `LiftCutoff_Tune2`.
pub const REG_LIFT_CUTOFF_TUNE2: u8 = 0x65;

/// Value reported by `Product_ID` on a genuine PMW3360.
pub const EXPECTED_PRODUCT_ID: u8 = 0x47;
/// Value reported by `Inverse_Product_ID`, the bitwise complement of the product ID.
pub const EXPECTED_INVERSE_PRODUCT_ID: u8 = 0xB8;
/// Value written to `Power_Up_Reset` to trigger a full reset.
pub const RESET_COMMAND: u8 = 0x5A;
/// Value written to `Shutdown` to power the chip down.
pub const SHUTDOWN_COMMAND: u8 = 0xB6;

/// Mask applied to an address for a read transaction (bit 7 cleared).
pub const READ_MASK: u8 = 0x7F;
/// Flag applied to an address for a write transaction (bit 7 set).
pub const WRITE_FLAG: u8 = 0x80;

/// Number of bytes streamed by a full `Motion_Burst` read.
pub const MOTION_BURST_LEN: usize = 12;

/// Operating mode reported in `Motion[2:1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum OperationMode {
    /// Run mode.
    Run = 0b00,
    /// Rest 1 low-power mode.
    Rest1 = 0b01,
    /// Rest 2 low-power mode.
    Rest2 = 0b10,
    /// Rest 3 low-power mode.
    Rest3 = 0b11,
}

/// Bitfield representation of the `Motion` register (address `0x02`).
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionStatus {
    // First raw-data pixel marker during frame capture (bit 0).
    pub frame_rdata_first: bool,
    // Current operating mode (bits 2:1).
    pub operation_mode: OperationMode,
    // Chip is lifted off the tracking surface (bit 3).
    pub lifted: bool,
    #[skip]
    __: B3,
    // Motion occurred since the last report (bit 7).
    pub motion: bool,
}

impl From<u8> for MotionStatus {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<MotionStatus> for u8 {
    fn from(value: MotionStatus) -> Self {
        value.into_bytes()[0]
    }
}

/// Lift detection height programmed into `Lift_Config[1:0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LiftCutoff {
    /// Nominal 2 mm lift-off distance (chip default).
    Mm2,
    /// Nominal 3 mm lift-off distance.
    Mm3,
}

impl LiftCutoff {
    /// Returns the raw `Lift_Config` value.
    pub const fn bits(self) -> u8 {
        match self {
            Self::Mm2 => 0b10,
            Self::Mm3 => 0b11,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motion_status_decodes_motion_and_lift_bits() {
        let status = MotionStatus::from(0x88);
        assert!(status.motion());
        assert!(status.lifted());
        assert_eq!(status.operation_mode(), OperationMode::Run);

        let status = MotionStatus::from(0x80);
        assert!(status.motion());
        assert!(!status.lifted());
    }

    #[test]
    fn motion_status_decodes_operation_mode() {
        assert_eq!(MotionStatus::from(0x02).operation_mode(), OperationMode::Rest1);
        assert_eq!(MotionStatus::from(0x04).operation_mode(), OperationMode::Rest2);
        assert_eq!(MotionStatus::from(0x06).operation_mode(), OperationMode::Rest3);
        assert!(MotionStatus::from(0x01).frame_rdata_first());
    }

    #[test]
    fn identity_constants_are_complements() {
        assert_eq!(!EXPECTED_PRODUCT_ID, EXPECTED_INVERSE_PRODUCT_ID);
    }

    #[test]
    fn motion_status_round_trips_raw_byte() {
        assert_eq!(u8::from(MotionStatus::from(0x8E)), 0x8E);
    }
}
