//! Marking parameters: the laser/process settings active for a vector block

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sky-writing mode of the scan head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkingMode {
    /// No sky writing
    #[default]
    NoSky,
    /// Sky writing mode 1
    Sky1,
    /// Sky writing mode 2
    Sky2,
    /// Sky writing mode 3
    Sky3,
}

impl MarkingMode {
    /// Numeric code used by the text formats
    pub fn code(self) -> u8 {
        match self {
            Self::NoSky => 0,
            Self::Sky1 => 1,
            Self::Sky2 => 2,
            Self::Sky3 => 3,
        }
    }

    /// Inverse of [`MarkingMode::code`]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::NoSky),
            1 => Some(Self::Sky1),
            2 => Some(Self::Sky2),
            3 => Some(Self::Sky3),
            _ => None,
        }
    }
}

impl fmt::Display for MarkingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSky => write!(f, "no sky"),
            Self::Sky1 => write!(f, "sky 1"),
            Self::Sky2 => write!(f, "sky 2"),
            Self::Sky3 => write!(f, "sky 3"),
        }
    }
}

/// Flat record of process settings
///
/// Two records are interchangeable (share a key in the params map) iff all
/// fields compare equal. Float fields compare by value, so `-0.0 == 0.0`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkingParams {
    /// Optional human-readable name
    #[serde(default)]
    pub name: String,
    /// Laser power in watt
    pub laser_power_in_w: f32,
    /// Marking speed in mm/s
    pub laser_speed_in_mm_per_s: f32,
    /// Jump (travel) speed in mm/s
    pub jump_speed_in_mm_per_s: f32,
    /// Delay after a jump in µs
    pub jump_delay_in_us: f32,
    /// Delay after a mark in µs
    pub mark_delay_in_us: f32,
    /// Delay at polyline corners in µs
    pub polygon_delay_in_us: f32,
    /// Laser-on delay in µs
    pub laser_on_delay_in_us: f32,
    /// Laser-off delay in µs
    pub laser_off_delay_in_us: f32,
    /// Laser-on shift in µs (sky writing)
    pub laser_on_shift_in_us: f32,
    /// Laser-off shift in µs (sky writing)
    pub laser_off_shift_in_us: f32,
    /// Focus shift in mm
    pub laser_focus_shift_in_mm: f32,
    /// Dwell time of a point exposure in µs
    pub point_exposure_time_in_us: f32,
    /// Sky-writing mode
    pub marking_mode: MarkingMode,
}

/// A single field update applied to the current parameter state
#[derive(Debug, Clone, PartialEq)]
pub enum ParamChange {
    /// Set [`MarkingParams::name`]
    Name(String),
    /// Set [`MarkingParams::laser_power_in_w`]
    LaserPower(f32),
    /// Set [`MarkingParams::laser_speed_in_mm_per_s`]
    MarkSpeed(f32),
    /// Set [`MarkingParams::jump_speed_in_mm_per_s`]
    JumpSpeed(f32),
    /// Set [`MarkingParams::jump_delay_in_us`]
    JumpDelay(f32),
    /// Set [`MarkingParams::mark_delay_in_us`]
    MarkDelay(f32),
    /// Set [`MarkingParams::polygon_delay_in_us`]
    PolygonDelay(f32),
    /// Set [`MarkingParams::laser_on_delay_in_us`]
    LaserOnDelay(f32),
    /// Set [`MarkingParams::laser_off_delay_in_us`]
    LaserOffDelay(f32),
    /// Set [`MarkingParams::laser_on_shift_in_us`]
    LaserOnShift(f32),
    /// Set [`MarkingParams::laser_off_shift_in_us`]
    LaserOffShift(f32),
    /// Set [`MarkingParams::laser_focus_shift_in_mm`]
    FocusShift(f32),
    /// Set [`MarkingParams::point_exposure_time_in_us`]
    PointExposureTime(f32),
    /// Set [`MarkingParams::marking_mode`]
    MarkingMode(MarkingMode),
}

impl MarkingParams {
    /// Whether applying `change` would leave this record unchanged
    pub fn already_has(&self, change: &ParamChange) -> bool {
        match change {
            ParamChange::Name(v) => &self.name == v,
            ParamChange::LaserPower(v) => self.laser_power_in_w == *v,
            ParamChange::MarkSpeed(v) => self.laser_speed_in_mm_per_s == *v,
            ParamChange::JumpSpeed(v) => self.jump_speed_in_mm_per_s == *v,
            ParamChange::JumpDelay(v) => self.jump_delay_in_us == *v,
            ParamChange::MarkDelay(v) => self.mark_delay_in_us == *v,
            ParamChange::PolygonDelay(v) => self.polygon_delay_in_us == *v,
            ParamChange::LaserOnDelay(v) => self.laser_on_delay_in_us == *v,
            ParamChange::LaserOffDelay(v) => self.laser_off_delay_in_us == *v,
            ParamChange::LaserOnShift(v) => self.laser_on_shift_in_us == *v,
            ParamChange::LaserOffShift(v) => self.laser_off_shift_in_us == *v,
            ParamChange::FocusShift(v) => self.laser_focus_shift_in_mm == *v,
            ParamChange::PointExposureTime(v) => self.point_exposure_time_in_us == *v,
            ParamChange::MarkingMode(v) => self.marking_mode == *v,
        }
    }

    /// Apply a field update in place
    pub fn apply(&mut self, change: ParamChange) {
        match change {
            ParamChange::Name(v) => self.name = v,
            ParamChange::LaserPower(v) => self.laser_power_in_w = v,
            ParamChange::MarkSpeed(v) => self.laser_speed_in_mm_per_s = v,
            ParamChange::JumpSpeed(v) => self.jump_speed_in_mm_per_s = v,
            ParamChange::JumpDelay(v) => self.jump_delay_in_us = v,
            ParamChange::MarkDelay(v) => self.mark_delay_in_us = v,
            ParamChange::PolygonDelay(v) => self.polygon_delay_in_us = v,
            ParamChange::LaserOnDelay(v) => self.laser_on_delay_in_us = v,
            ParamChange::LaserOffDelay(v) => self.laser_off_delay_in_us = v,
            ParamChange::LaserOnShift(v) => self.laser_on_shift_in_us = v,
            ParamChange::LaserOffShift(v) => self.laser_off_shift_in_us = v,
            ParamChange::FocusShift(v) => self.laser_focus_shift_in_mm = v,
            ParamChange::PointExposureTime(v) => self.point_exposure_time_in_us = v,
            ParamChange::MarkingMode(v) => self.marking_mode = v,
        }
    }

    /// Hashable value identity used by the dedup cache
    ///
    /// Consistent with `PartialEq` for non-NaN values: zero is normalized so
    /// that `-0.0` and `0.0` share a signature.
    pub fn signature(&self) -> ParamsSignature {
        let bits = |v: f32| if v == 0.0 { 0 } else { v.to_bits() };
        ParamsSignature {
            name: self.name.clone(),
            values: [
                bits(self.laser_power_in_w),
                bits(self.laser_speed_in_mm_per_s),
                bits(self.jump_speed_in_mm_per_s),
                bits(self.jump_delay_in_us),
                bits(self.mark_delay_in_us),
                bits(self.polygon_delay_in_us),
                bits(self.laser_on_delay_in_us),
                bits(self.laser_off_delay_in_us),
                bits(self.laser_on_shift_in_us),
                bits(self.laser_off_shift_in_us),
                bits(self.laser_focus_shift_in_mm),
                bits(self.point_exposure_time_in_us),
            ],
            mode: self.marking_mode,
        }
    }
}

/// Value identity of a [`MarkingParams`] record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamsSignature {
    name: String,
    values: [u32; 12],
    mode: MarkingMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_and_already_has() {
        let mut params = MarkingParams::default();
        let change = ParamChange::LaserPower(120.0);
        assert!(!params.already_has(&change));
        params.apply(change.clone());
        assert!(params.already_has(&change));
        assert_eq!(params.laser_power_in_w, 120.0);
    }

    #[test]
    fn test_signature_matches_equality() {
        let mut a = MarkingParams::default();
        let mut b = MarkingParams::default();
        a.apply(ParamChange::MarkSpeed(800.0));
        b.apply(ParamChange::MarkSpeed(800.0));
        assert_eq!(a, b);
        assert_eq!(a.signature(), b.signature());

        b.apply(ParamChange::MarkingMode(MarkingMode::Sky2));
        assert_ne!(a.signature(), b.signature());
    }

    #[test]
    fn test_signature_normalizes_negative_zero() {
        let mut a = MarkingParams::default();
        a.apply(ParamChange::FocusShift(-0.0));
        assert_eq!(a, MarkingParams::default());
        assert_eq!(a.signature(), MarkingParams::default().signature());
    }

    #[test]
    fn test_marking_mode_codes() {
        for code in 0..4 {
            let mode = MarkingMode::from_code(code).unwrap();
            assert_eq!(mode.code(), code);
        }
        assert_eq!(MarkingMode::from_code(9), None);
    }
}
