//! Redshifted spectral line tracks against spectrograph wavelength coverage.
//!
//! A line at rest wavelength λ₀ is observed at λ₀(1 + z). Plotting that track
//! for each line of interest over the bands an instrument covers shows which
//! instrument captures which line at which redshift.

pub mod color;
pub mod config;
pub mod coverage;
pub mod data;
pub mod error;
pub mod plot;

pub use config::PlotterConfig;
pub use coverage::{
    bandpass_extent, compute_line_track, compute_redshift_range, covering_bands,
};
pub use data::catalog::LineCatalog;
pub use data::model::{Bandpass, SpectralLine};
pub use error::CoverageError;
pub use plot::{CoveragePlotter, PlotRequest};
