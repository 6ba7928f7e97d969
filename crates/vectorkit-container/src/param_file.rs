//! Section parameter files
//!
//! One `Key = <number> <unit>` per line, `#` starts a comment. The unit of
//! every numeric key is fixed and checked. `Name` takes free text and
//! `SkyMode` a plain integer from 0 to 3.

use std::io::Write;

use vectorkit_core::{
    format_tagged, parse_tagged, MarkingMode, MarkingParams, ParamChange, PhysicalUnit, UnitError,
};

use crate::error::{ContainerError, Result};

type Setter = fn(f32) -> ParamChange;
type Getter = fn(&MarkingParams) -> f32;

/// Numeric keys with their unit and field
const NUMERIC_KEYS: &[(&str, PhysicalUnit, Setter, Getter)] = &[
    ("LaserPower", PhysicalUnit::Watt, ParamChange::LaserPower, |p| p.laser_power_in_w),
    ("MarkSpeed", PhysicalUnit::MillimetrePerSecond, ParamChange::MarkSpeed, |p| p.laser_speed_in_mm_per_s),
    ("JumpSpeed", PhysicalUnit::MillimetrePerSecond, ParamChange::JumpSpeed, |p| p.jump_speed_in_mm_per_s),
    ("JumpDelay", PhysicalUnit::Microsecond, ParamChange::JumpDelay, |p| p.jump_delay_in_us),
    ("MarkDelay", PhysicalUnit::Microsecond, ParamChange::MarkDelay, |p| p.mark_delay_in_us),
    ("PolygonDelay", PhysicalUnit::Microsecond, ParamChange::PolygonDelay, |p| p.polygon_delay_in_us),
    ("LaserOnDelay", PhysicalUnit::Microsecond, ParamChange::LaserOnDelay, |p| p.laser_on_delay_in_us),
    ("LaserOffDelay", PhysicalUnit::Microsecond, ParamChange::LaserOffDelay, |p| p.laser_off_delay_in_us),
    ("LaserOnShift", PhysicalUnit::Microsecond, ParamChange::LaserOnShift, |p| p.laser_on_shift_in_us),
    ("LaserOffShift", PhysicalUnit::Microsecond, ParamChange::LaserOffShift, |p| p.laser_off_shift_in_us),
    ("FocusShift", PhysicalUnit::Millimetre, ParamChange::FocusShift, |p| p.laser_focus_shift_in_mm),
    ("PointExposureTime", PhysicalUnit::Microsecond, ParamChange::PointExposureTime, |p| p.point_exposure_time_in_us),
];

const NAME_KEY: &str = "Name";
const SKY_MODE_KEY: &str = "SkyMode";

fn unit_error(key: &str, value: &str, line: usize, err: UnitError) -> ContainerError {
    match err {
        UnitError::Mismatch { expected, found } => ContainerError::UnitMismatch {
            key: key.to_string(),
            expected,
            found,
        },
        UnitError::InvalidNumber { .. } => ContainerError::InvalidValue {
            key: key.to_string(),
            text: value.to_string(),
            line,
        },
    }
}

/// Parse a parameter file into the seed record of its section
///
/// Keys not listed above are skipped with a warning; a later line for the
/// same key wins.
pub fn parse_param_file(text: &str) -> Result<MarkingParams> {
    let mut params = MarkingParams::default();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let content = raw.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }
        let Some((key, value)) = content.split_once('=') else {
            return Err(ContainerError::MalformedLine {
                line,
                text: raw.to_string(),
            });
        };
        let (key, value) = (key.trim(), value.trim());

        if key == NAME_KEY {
            params.apply(ParamChange::Name(value.to_string()));
            continue;
        }

        if key == SKY_MODE_KEY {
            let code = parse_tagged(value, PhysicalUnit::Unitless)
                .map_err(|err| unit_error(key, value, line, err))?;
            let mode = (code.fract() == 0.0 && (0.0..=3.0).contains(&code))
                .then(|| MarkingMode::from_code(code as u8))
                .flatten()
                .ok_or_else(|| ContainerError::InvalidValue {
                    key: key.to_string(),
                    text: value.to_string(),
                    line,
                })?;
            params.apply(ParamChange::MarkingMode(mode));
            continue;
        }

        match NUMERIC_KEYS.iter().find(|(name, ..)| *name == key) {
            Some((_, unit, setter, _)) => {
                let number =
                    parse_tagged(value, *unit).map_err(|err| unit_error(key, value, line, err))?;
                params.apply(setter(number));
            }
            None => tracing::warn!(key, line, "unknown parameter key skipped"),
        }
    }

    Ok(params)
}

/// Write the parameter file of a section
pub fn write_param_file<W: Write>(params: &MarkingParams, out: &mut W) -> std::io::Result<()> {
    if !params.name.is_empty() {
        writeln!(out, "{NAME_KEY} = {}", params.name)?;
    }
    for (key, unit, _, getter) in NUMERIC_KEYS {
        writeln!(out, "{key} = {}", format_tagged(getter(params), *unit))?;
    }
    writeln!(out, "{SKY_MODE_KEY} = {}", params.marking_mode.code())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_values_and_comments() {
        let params = parse_param_file(
            "# core volume\nName = core\nLaserPower = 370 W\n\nMarkSpeed = 1250 mm/s # fast\nFocusShift = -0.5 mm\nSkyMode = 2\n",
        )
        .unwrap();
        assert_eq!(params.name, "core");
        assert_eq!(params.laser_power_in_w, 370.0);
        assert_eq!(params.laser_speed_in_mm_per_s, 1250.0);
        assert_eq!(params.laser_focus_shift_in_mm, -0.5);
        assert_eq!(params.marking_mode, MarkingMode::Sky2);
    }

    #[test]
    fn test_unit_mismatch() {
        let err = parse_param_file("MarkSpeed = 1.2 m/s\n").unwrap_err();
        match err {
            ContainerError::UnitMismatch {
                key,
                expected,
                found,
            } => {
                assert_eq!(key, "MarkSpeed");
                assert_eq!(expected, "mm/s");
                assert_eq!(found, "m/s");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_unknown_key_skipped() {
        let params = parse_param_file("Hatching = 0.1 mm\nJumpDelay = 10 us\n").unwrap();
        assert_eq!(params.jump_delay_in_us, 10.0);
    }

    #[test]
    fn test_bad_lines() {
        assert!(matches!(
            parse_param_file("LaserPower 200 W\n"),
            Err(ContainerError::MalformedLine { line: 1, .. })
        ));
        assert!(matches!(
            parse_param_file("\nSkyMode = 7\n"),
            Err(ContainerError::InvalidValue { line: 2, .. })
        ));
        assert!(matches!(
            parse_param_file("LaserPower = lots W\n"),
            Err(ContainerError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_written_file_parses_back() {
        let mut params = MarkingParams::default();
        params.name = "skin".to_string();
        params.laser_power_in_w = 95.5;
        params.laser_on_shift_in_us = -12.0;
        params.marking_mode = MarkingMode::Sky1;

        let mut out = Vec::new();
        write_param_file(&params, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("LaserPower = 95.5 W\n"));
        assert_eq!(parse_param_file(&text).unwrap(), params);
    }
}
