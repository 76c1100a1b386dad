use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while building catalogs, computing tracks,
/// or rendering a coverage plot.
#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("invalid {axis} range: max {max} is below min {min}")]
    InvalidRange {
        axis: &'static str,
        min: f64,
        max: f64,
    },

    #[error("unknown spectral line '{0}'")]
    UnknownLine(String),

    #[error("unknown bandpass '{0}'")]
    UnknownBandpass(String),

    #[error("{bandpasses} bandpasses but {labels} bandpass labels")]
    Validation { bandpasses: usize, labels: usize },

    #[error("line '{key}' has invalid rest wavelength {wavelength} Å")]
    InvalidLine { key: String, wavelength: f64 },

    #[error("bandpass '{name}' is malformed: {reason}")]
    MalformedBandpass { name: String, reason: String },

    #[error("unknown colour scheme '{0}'")]
    UnknownColorScheme(String),

    #[error("unsupported output format for {}", .path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to write plot {}: {reason}", .path.display())]
    Output { path: PathBuf, reason: String },

    #[error("failed to load reference curve {}", .path.display())]
    Reference {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to export line catalog to {}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid configuration {}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = CoverageError> = std::result::Result<T, E>;
