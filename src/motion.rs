//! Motion sample decoding.

use crate::registers::{MOTION_BURST_LEN, MotionStatus};

/// Snapshot of one channel's motion registers.
///
/// Deltas are the raw counts accumulated since the previous read; no thresholding or unit
/// conversion is applied.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Motion {
    /// `Motion[7]` MOT.
    pub has_motion: bool,
    /// Inverse of `Motion[3]` Lift_Stat.
    pub is_on_surface: bool,
    /// X displacement in counts.
    pub delta_x: i16,
    /// Y displacement in counts.
    pub delta_y: i16,
    /// `SQUAL` register, relative tracking confidence.
    pub surface_quality: u8,
}

impl Motion {
    /// Builds a sample from the individually read registers.
    pub fn from_registers(status: u8, dx_l: u8, dx_h: u8, dy_l: u8, dy_h: u8, squal: u8) -> Self {
        let status = MotionStatus::from(status);
        Self {
            has_motion: status.motion(),
            is_on_surface: !status.lifted(),
            delta_x: assemble_delta(dx_l, dx_h),
            delta_y: assemble_delta(dy_l, dy_h),
            surface_quality: squal,
        }
    }

    /// Builds a sample from the leading bytes of a `Motion_Burst` frame.
    ///
    /// Returns `None` when `frame` is shorter than the seven bytes that carry the sample.
    pub fn from_burst(frame: &[u8]) -> Option<Self> {
        match *frame {
            [status, _observation, dx_l, dx_h, dy_l, dy_h, squal, ..] => {
                Some(Self::from_registers(status, dx_l, dx_h, dy_l, dy_h, squal))
            }
            _ => None,
        }
    }
}

/// Combines a low/high register pair into a two's-complement delta.
#[inline]
pub fn assemble_delta(low: u8, high: u8) -> i16 {
    i16::from_le_bytes([low, high])
}

/// Full decoded `Motion_Burst` frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BurstReport {
    /// Motion sample carried in the first bytes of the frame.
    pub motion: Motion,
    /// Raw `Motion` status byte.
    pub status: u8,
    /// `Observation` register.
    pub observation: u8,
    /// `Raw_Data_Sum` register.
    pub raw_data_sum: u8,
    /// `Maximum_Raw_data` register.
    pub maximum_raw_data: u8,
    /// `Minimum_Raw_data` register.
    pub minimum_raw_data: u8,
    /// Shutter value assembled from `Shutter_Upper`/`Shutter_Lower`.
    pub shutter: u16,
}

impl BurstReport {
    /// Decodes a complete burst frame.
    pub fn from_frame(frame: &[u8; MOTION_BURST_LEN]) -> Self {
        let [
            status,
            observation,
            dx_l,
            dx_h,
            dy_l,
            dy_h,
            squal,
            raw_data_sum,
            maximum_raw_data,
            minimum_raw_data,
            shutter_upper,
            shutter_lower,
        ] = *frame;

        Self {
            motion: Motion::from_registers(status, dx_l, dx_h, dy_l, dy_h, squal),
            status,
            observation,
            raw_data_sum,
            maximum_raw_data,
            minimum_raw_data,
            shutter: u16::from_be_bytes([shutter_upper, shutter_lower]),
        }
    }

    /// Returns the decoded `Motion` status bitfield.
    pub fn motion_status(&self) -> MotionStatus {
        MotionStatus::from(self.status)
    }
}
