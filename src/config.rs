use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::ColorScheme;
use crate::coverage::DEFAULT_TRACK_SAMPLES;
use crate::data::catalog::{find_preset, preset_group};
use crate::data::loader::load_bandpass;
use crate::data::model::Bandpass;
use crate::error::{CoverageError, Result};

// ---------------------------------------------------------------------------
// Plotter configuration
// ---------------------------------------------------------------------------

/// A sampled throughput curve kept in an external file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCurve {
    /// Legend label.
    pub label: String,
    /// `.csv`, `.json` or `.parquet` with `wave` and `throughput` columns.
    pub path: PathBuf,
}

/// Rendering and reference-data settings, read once at start-up.
///
/// Every field has a default, so a config file only needs the keys it
/// changes:
///
/// ```json
/// { "width": 1600, "output_dir": "figures", "lines_export": null }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotterConfig {
    /// Total image size in pixels, legend panel included.
    pub width: u32,
    pub height: u32,
    /// Width of the legend panel to the right of the chart.
    pub legend_width: u32,
    /// Redshift samples per line track.
    pub num_samples: usize,
    /// Track stroke width in pixels.
    pub line_width: u32,
    /// Opacity of the bandpass shading.
    pub band_alpha: f64,
    pub font_family: String,
    /// Relative output filenames are resolved against this directory.
    pub output_dir: PathBuf,
    /// Where the line catalog is exported at start-up; `null` disables it.
    pub lines_export: Option<PathBuf>,
    pub lines_cmap: ColorScheme,
    pub bands_cmap: ColorScheme,
    /// Extra bandpasses by name, loaded on demand.
    pub reference_curves: BTreeMap<String, ReferenceCurve>,
}

impl Default for PlotterConfig {
    fn default() -> Self {
        let mut reference_curves = BTreeMap::new();
        reference_curves.insert(
            "g102".to_string(),
            ReferenceCurve {
                label: "WFC3 G102".to_string(),
                path: PathBuf::from("filters/hst_g102_throughput.csv"),
            },
        );
        reference_curves.insert(
            "g141".to_string(),
            ReferenceCurve {
                label: "WFC3 G141".to_string(),
                path: PathBuf::from("filters/hst_g141_throughput.csv"),
            },
        );

        Self {
            width: 2000,
            height: 1100,
            legend_width: 560,
            num_samples: DEFAULT_TRACK_SAMPLES,
            line_width: 3,
            band_alpha: 0.2,
            font_family: "sans-serif".to_string(),
            output_dir: PathBuf::from("."),
            lines_export: Some(PathBuf::from("lines.csv")),
            lines_cmap: ColorScheme::LINES,
            bands_cmap: ColorScheme::BANDS,
            reference_curves,
        }
    }
}

impl PlotterConfig {
    /// Read a JSON config file, filling unspecified keys with defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut config: PlotterConfig =
            serde_json::from_str(&text).map_err(|source| CoverageError::Config {
                path: path.to_path_buf(),
                source,
            })?;
        config.sanitize();
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Pull out-of-range values back to something drawable.
    pub(crate) fn sanitize(&mut self) {
        if !(0.0..=1.0).contains(&self.band_alpha) {
            log::warn!("band_alpha {} outside [0, 1], clamping", self.band_alpha);
            self.band_alpha = self.band_alpha.clamp(0.0, 1.0);
        }
        if self.legend_width >= self.width {
            log::warn!(
                "legend_width {} leaves no room for the chart, using a quarter of width {}",
                self.legend_width,
                self.width
            );
            self.legend_width = self.width / 4;
        }
        if self.line_width == 0 {
            self.line_width = 1;
        }
    }

    /// Resolve one bandpass name: a preset key first, then a reference curve.
    pub fn resolve_bandpass(&self, name: &str) -> Result<Bandpass> {
        if let Some(preset) = find_preset(name) {
            return preset.to_bandpass();
        }
        match self.reference_curves.get(name) {
            Some(curve) => load_bandpass(&curve.label, &curve.path),
            None => Err(CoverageError::UnknownBandpass(name.to_string())),
        }
    }

    /// Resolve names in order, expanding groups such as `jwst`.
    pub fn resolve_bandpasses<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Bandpass>> {
        let mut bands = Vec::new();
        for name in names {
            let name = name.as_ref();
            match preset_group(name) {
                Some(keys) => {
                    for key in keys {
                        bands.push(self.resolve_bandpass(key)?);
                    }
                }
                None => bands.push(self.resolve_bandpass(name)?),
            }
        }
        Ok(bands)
    }
}
