//! Format selection and whole-file conversion
//!
//! Every readable format decodes into a [`Job`]; every format can be
//! written from one. The format is always named explicitly.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use vectorkit_container::{ContainerReader, ContainerWriter};
use vectorkit_core::{Job, JobWriter, WorkPlaneDecoder};
use vectorkit_gcode::{GcodeDecoder, GcodeWriter};
use vectorkit_laser::{LaserDecoder, LaserWriter};
use vectorkit_layer::{CliDecoder, CliEncoding, CliWriter, DecodeOptions};
use vectorkit_settings::{CliOutputEncoding, Config};

/// Supported file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Common Layer Interface, ASCII or binary
    Cli,
    /// Two-letter laser command language
    Laser,
    /// G-code
    Gcode,
    /// Directory of CLI sections with parameter files
    Container,
    /// Job model as JSON
    Json,
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "cli"),
            Self::Laser => write!(f, "laser"),
            Self::Gcode => write!(f, "gcode"),
            Self::Container => write!(f, "container"),
            Self::Json => write!(f, "json"),
        }
    }
}

fn decode_options(config: &Config) -> DecodeOptions {
    DecodeOptions {
        detect_fake_hatches: config.layer.detect_fake_hatches,
        fake_hatch_epsilon: config.layer.fake_hatch_epsilon,
    }
}

fn cli_encoding(encoding: CliOutputEncoding) -> CliEncoding {
    match encoding {
        CliOutputEncoding::Ascii => CliEncoding::Ascii,
        CliOutputEncoding::BinaryLong => CliEncoding::BinaryLong,
        CliOutputEncoding::BinaryShort => CliEncoding::BinaryShort,
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Decode `path` as `format`
///
/// Jobs whose format carries no name are named after the file stem.
pub fn read_job(format: Format, path: &Path, config: &Config) -> Result<Job> {
    let context = || format!("Failed to decode {} as {format}", path.display());
    let mut job = match format {
        Format::Cli => CliDecoder::with_options(open(path)?, decode_options(config))
            .and_then(|decoder| decoder.read_job())
            .with_context(context)?,
        Format::Laser => LaserDecoder::new(open(path)?)
            .read_job()
            .with_context(context)?,
        Format::Gcode => GcodeDecoder::new(open(path)?)
            .with_angle_tolerance(config.gcode.arc_angle_tolerance)
            .read_job()
            .with_context(context)?,
        Format::Container => ContainerReader::with_options(path, decode_options(config))
            .and_then(|reader| reader.read_job())
            .with_context(context)?,
        Format::Json => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            let job = Job::from_json(&text).with_context(context)?;
            job.validate().with_context(context)?;
            job
        }
    };

    if job.metadata.job_name.is_empty() {
        if let Some(stem) = path.file_stem() {
            job.metadata.job_name = stem.to_string_lossy().into_owned();
        }
    }
    tracing::info!(
        path = %path.display(),
        %format,
        planes = job.num_work_planes,
        "read job"
    );
    Ok(job)
}

/// Write `job` to `path` as `format`
pub fn write_job(format: Format, job: &Job, path: &Path, config: &Config) -> Result<()> {
    let context = || format!("Failed to write {} as {format}", path.display());
    let create = || -> Result<BufWriter<File>> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        Ok(BufWriter::new(file))
    };

    match format {
        Format::Cli => CliWriter::new(create()?, cli_encoding(config.layer.output_encoding))
            .with_units(config.layer.output_units)
            .write_job(job)
            .with_context(context)?,
        Format::Laser => LaserWriter::new(create()?)
            .with_job_name(config.laser.write_job_name)
            .write_job(job)
            .with_context(context)?,
        Format::Gcode => GcodeWriter::new(create()?)
            .with_job_name(config.gcode.write_job_name)
            .write_job(job)
            .with_context(context)?,
        Format::Container => ContainerWriter::new(path)
            .with_encoding(cli_encoding(config.container.output_encoding))
            .write_job(job)
            .with_context(context)?,
        Format::Json => fs::write(path, job.to_json()?).with_context(context)?,
    }

    tracing::info!(path = %path.display(), %format, "wrote job");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_laser_to_gcode_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let laser = dir.path().join("square.lsr");
        fs::write(
            &laser,
            "LP120\nVG500\nJP0,0,0\nGO10,0,0\nGO10,10,0\nLY0.5\nJP0,0,0.5\nGO5,0,0.5\n",
        )
        .unwrap();

        let config = Config::default();
        let job = read_job(Format::Laser, &laser, &config).unwrap();
        assert_eq!(job.metadata.job_name, "square");
        assert_eq!(job.num_work_planes, 2);

        let gcode = dir.path().join("square.nc");
        write_job(Format::Gcode, &job, &gcode, &config).unwrap();
        let back = read_job(Format::Gcode, &gcode, &config).unwrap();
        assert_eq!(back.num_work_planes, 2);
        assert_eq!(back.marking_params_map[&0].laser_power_in_w, 120.0);
        assert_eq!(back.marking_params_map[&0].laser_speed_in_mm_per_s, 500.0);

        let json = dir.path().join("square.json");
        write_job(Format::Json, &job, &json, &config).unwrap();
        let parsed = Job::from_json(&fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(parsed, job);
    }

    #[test]
    fn test_json_input_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let laser = dir.path().join("part.lsr");
        fs::write(&laser, "LP80\nJP0,0,0\nGO3,0,0\nGO3,3,0\n").unwrap();

        let config = Config::default();
        let job = read_job(Format::Laser, &laser, &config).unwrap();
        let json = dir.path().join("part.json");
        write_job(Format::Json, &job, &json, &config).unwrap();

        let back = read_job(Format::Json, &json, &config).unwrap();
        assert_eq!(back, job);

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{}").unwrap();
        assert!(read_job(Format::Json, &broken, &config).is_err());
    }

    #[test]
    fn test_cli_uses_configured_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let laser = dir.path().join("line.lsr");
        fs::write(&laser, "JP0,0,0\nGO4,0,0\nGO4,4,0\n").unwrap();

        let mut config = Config::default();
        config.layer.output_encoding = CliOutputEncoding::Ascii;
        let job = read_job(Format::Laser, &laser, &config).unwrap();

        let cli = dir.path().join("line.cli");
        write_job(Format::Cli, &job, &cli, &config).unwrap();
        let text = fs::read_to_string(&cli).unwrap();
        assert!(text.contains("$$ASCII"));
        assert!(text.contains("$$GEOMETRYSTART"));

        let back = read_job(Format::Cli, &cli, &config).unwrap();
        assert_eq!(back.blocks().count(), 1);
    }
}
