//! # VectorKit
//!
//! Converts additive-manufacturing vector formats into, and back from, one
//! canonical job model:
//! - Common Layer Interface (CLI), ASCII and binary
//! - The two-letter laser command language
//! - G-code
//! - Section containers (CLI sections with parameter files)
//!
//! ## Architecture
//!
//! VectorKit is organized as a workspace with multiple crates:
//!
//! 1. **vectorkit-core** - Job model, parameter table, decoder/writer traits
//! 2. **vectorkit-layer** - CLI reader, decoder and writer
//! 3. **vectorkit-laser** - Laser command decoder and writer
//! 4. **vectorkit-gcode** - G-code decoder and writer
//! 5. **vectorkit-container** - Section classifier, container reader and writer
//! 6. **vectorkit-settings** - Configuration file
//! 7. **vectorkit** - Format dispatch and the command-line binary

pub mod convert;

pub use convert::{read_job, write_job, Format};

pub use vectorkit_core::{
    Job, JobWriter, MarkingParams, ParamTable, VectorBlock, VectorData, WorkPlane,
    WorkPlaneDecoder,
};
pub use vectorkit_settings::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output on stderr, keeping stdout for command output
/// - RUST_LOG environment variable support
/// - `verbose` raising the default level from WARN to DEBUG
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
