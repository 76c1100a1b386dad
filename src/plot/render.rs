use std::ops::Range;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;

use super::dash::{clip_to_window, dash_segments};
use super::legend::{LegendEntry, Swatch, draw_legend};
use crate::color::{ColorScheme, LineStyle, band_colors, line_styles};
use crate::config::PlotterConfig;
use crate::coverage::{bandpass_extent, check_range, compute_line_track};
use crate::data::catalog::LineCatalog;
use crate::data::model::{Bandpass, SpectralLine, plain_text};
use crate::error::{CoverageError, Result};

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// One coverage plot: which lines, which bands, what window, where to.
#[derive(Debug, Clone)]
pub struct PlotRequest {
    /// Catalog keys, drawn and coloured in this order.
    pub lines: Vec<String>,
    pub bandpasses: Vec<Bandpass>,
    /// Legend label per bandpass; must match `bandpasses` in length.
    pub bandpass_labels: Vec<String>,
    pub z_min: f64,
    pub z_max: f64,
    /// Observed wavelength window in microns.
    pub lambda_min: f64,
    pub lambda_max: f64,
    pub show_grid: bool,
    /// `.svg`, `.png`, `.jpg`/`.jpeg` or `.bmp`.
    pub filename: PathBuf,
    pub lines_cmap: ColorScheme,
    pub bands_cmap: ColorScheme,
}

impl Default for PlotRequest {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            bandpasses: Vec::new(),
            bandpass_labels: Vec::new(),
            z_min: 0.0,
            z_max: 20.0,
            lambda_min: 0.0,
            lambda_max: 30.0,
            show_grid: false,
            filename: PathBuf::from("wavelength_coverage_plot.png"),
            lines_cmap: ColorScheme::LINES,
            bands_cmap: ColorScheme::BANDS,
        }
    }
}

impl PlotRequest {
    /// Label each band with its own name.
    pub fn with_bandpasses(mut self, bandpasses: Vec<Bandpass>) -> Self {
        self.bandpass_labels = bandpasses.iter().map(|b| b.name().to_string()).collect();
        self.bandpasses = bandpasses;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Svg,
    Bitmap,
}

fn output_format(path: &Path) -> Result<OutputFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "svg" => Ok(OutputFormat::Svg),
        "png" | "jpg" | "jpeg" | "bmp" => Ok(OutputFormat::Bitmap),
        _ => Err(CoverageError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Widen a zero-width axis so the chart still has a scale.
fn axis_window(min: f64, max: f64) -> Range<f64> {
    if max > min {
        min..max
    } else {
        (min - 0.5)..(max + 0.5)
    }
}

// ---------------------------------------------------------------------------
// Scene – everything validated and computed before a file is touched
// ---------------------------------------------------------------------------

struct Track<'a> {
    line: &'a SpectralLine,
    style: LineStyle,
    points: Vec<(f64, f64)>,
}

struct Band {
    label: String,
    extent: [f64; 2],
    color: RGBColor,
}

struct Scene<'a> {
    tracks: Vec<Track<'a>>,
    bands: Vec<Band>,
    x: Range<f64>,
    y: Range<f64>,
    grid: bool,
}

// ---------------------------------------------------------------------------
// CoveragePlotter
// ---------------------------------------------------------------------------

/// Draws line tracks over instrument coverage bands.
#[derive(Debug, Clone)]
pub struct CoveragePlotter {
    catalog: LineCatalog,
    config: PlotterConfig,
}

impl CoveragePlotter {
    /// Out-of-range config values are pulled back the same way
    /// [`PlotterConfig::load`] does.
    pub fn new(catalog: LineCatalog, mut config: PlotterConfig) -> Self {
        config.sanitize();
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &LineCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &PlotterConfig {
        &self.config
    }

    /// Where `filename` will be written.
    pub fn output_path(&self, filename: &Path) -> PathBuf {
        if filename.is_absolute() {
            filename.to_path_buf()
        } else {
            self.config.output_dir.join(filename)
        }
    }

    /// Validate the request and write the plot.
    ///
    /// All checks run before the output file is created, so a rejected
    /// request leaves nothing behind.
    pub fn render(&self, request: &PlotRequest) -> Result<()> {
        let scene = self.prepare(request)?;
        let path = self.output_path(&request.filename);
        let format = output_format(&path)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let size = (self.config.width, self.config.height);
        let output_err = |reason: String| CoverageError::Output {
            path: path.clone(),
            reason,
        };
        match format {
            OutputFormat::Svg => {
                let root = SVGBackend::new(&path, size).into_drawing_area();
                self.draw(&root, &scene)
                    .map_err(|e| output_err(e.to_string()))?;
            }
            OutputFormat::Bitmap => {
                let root = BitMapBackend::new(&path, size).into_drawing_area();
                self.draw(&root, &scene)
                    .map_err(|e| output_err(e.to_string()))?;
            }
        }

        log::info!(
            "Rendered {} lines over {} bands to {}",
            scene.tracks.len(),
            scene.bands.len(),
            path.display()
        );
        Ok(())
    }

    fn prepare<'a>(&'a self, request: &PlotRequest) -> Result<Scene<'a>> {
        check_range("redshift", request.z_min, request.z_max)?;
        check_range("wavelength", request.lambda_min, request.lambda_max)?;

        if request.bandpasses.len() != request.bandpass_labels.len() {
            return Err(CoverageError::Validation {
                bandpasses: request.bandpasses.len(),
                labels: request.bandpass_labels.len(),
            });
        }

        let lines = self.catalog.select(request.lines.as_slice())?;
        output_format(&request.filename)?;

        let styles = line_styles(lines.len(), request.lines_cmap);
        let tracks = lines
            .into_iter()
            .zip(styles)
            .map(|(line, style)| {
                let points = compute_line_track(
                    line,
                    request.z_min,
                    request.z_max,
                    self.config.num_samples,
                )?;
                log::debug!("{line}: {} samples, {:?}", points.len(), style.dash);
                Ok(Track {
                    line,
                    style,
                    points,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let colors = band_colors(request.bandpasses.len(), request.bands_cmap);
        let bands = request
            .bandpasses
            .iter()
            .zip(&request.bandpass_labels)
            .zip(colors)
            .map(|((band, label), color)| Band {
                label: plain_text(label),
                extent: bandpass_extent(band),
                color,
            })
            .collect();

        Ok(Scene {
            tracks,
            bands,
            x: axis_window(request.lambda_min, request.lambda_max),
            y: axis_window(request.z_min, request.z_max),
            grid: request.show_grid,
        })
    }

    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        scene: &Scene<'_>,
    ) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let font = self.config.font_family.as_str();
        let stroke = self.config.line_width;
        root.fill(&WHITE)?;

        let chart_width = self.config.width.saturating_sub(self.config.legend_width);
        let (chart_area, legend_area) = root.split_horizontally(chart_width);

        let mut chart = ChartBuilder::on(&chart_area)
            .margin(20)
            .x_label_area_size(70)
            .y_label_area_size(80)
            .build_cartesian_2d(scene.x.clone(), scene.y.clone())?;

        let mut mesh = chart.configure_mesh();
        mesh.x_desc("Observed Wavelength [microns]")
            .y_desc("Redshift")
            .axis_desc_style((font, 26))
            .label_style((font, 20));
        if !scene.grid {
            mesh.disable_mesh();
        }
        mesh.draw()?;

        // Bands sit underneath the tracks.
        let (x0, x1) = (scene.x.start, scene.x.end);
        let (y0, y1) = (scene.y.start, scene.y.end);
        for band in &scene.bands {
            let lo = band.extent[0].max(x0);
            let hi = band.extent[1].min(x1);
            if lo > hi {
                log::debug!("Band '{}' lies outside the wavelength window", band.label);
                continue;
            }
            chart.draw_series(std::iter::once(Rectangle::new(
                [(lo, y0), (hi, y1)],
                band.color.mix(self.config.band_alpha).filled(),
            )))?;
        }

        let (plot_w, plot_h) = chart.plotting_area().dim_in_pixel();
        let sx = plot_w as f64 / (x1 - x0);
        let sy = plot_h as f64 / (y1 - y0);
        for track in &scene.tracks {
            let pattern: Vec<f64> = track
                .style
                .dash
                .pattern()
                .iter()
                .map(|len| len * stroke as f64)
                .collect();
            let segments: Vec<_> = clip_to_window(&track.points, (x0, x1), (y0, y1))
                .iter()
                .flat_map(|piece| dash_segments(piece, &pattern, |(x, y)| (x * sx, y * sy)))
                .collect();
            let style = track.style.color.stroke_width(stroke);
            chart.draw_series(
                segments
                    .into_iter()
                    .map(|seg| PathElement::new(seg, style)),
            )?;
        }

        let entries = self.legend_entries(scene);
        draw_legend(&legend_area, &entries, font)?;

        root.present()?;
        Ok(())
    }

    fn legend_entries(&self, scene: &Scene<'_>) -> Vec<LegendEntry> {
        let lines = scene
            .tracks
            .iter()
            .filter(|t| t.line.has_label())
            .map(|t| LegendEntry {
                label: t.line.plain_label(),
                swatch: Swatch::Line {
                    style: t.style,
                    width: self.config.line_width,
                },
            });
        let bands = scene.bands.iter().map(|b| LegendEntry {
            label: b.label.clone(),
            swatch: Swatch::Band {
                color: b.color,
                alpha: self.config.band_alpha,
            },
        });
        lines.chain(bands).collect()
    }
}
