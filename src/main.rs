use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use redshift_coverage::color::ColorScheme;
use redshift_coverage::coverage::{
    compute_redshift_range, covering_bands, observed_wavelength_micron,
};
use redshift_coverage::data::catalog::BANDPASS_PRESETS;
use redshift_coverage::{CoveragePlotter, LineCatalog, PlotRequest, PlotterConfig};

#[derive(Parser)]
#[command(name = "redshift-coverage")]
#[command(about = "Plot redshifted spectral lines against spectrograph coverage")]
#[command(version)]
struct Cli {
    /// JSON configuration file (image size, output directory, reference curves)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Skip writing the line catalog at start-up
    #[arg(long, global = true)]
    no_export: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a coverage plot
    Plot {
        /// Line keys to draw, in legend order
        #[arg(
            long,
            value_delimiter = ',',
            default_value = "lya,civ,ciii],mgii,[oii],hbeta,[oiii]2,halpha,pabeta,paalpha"
        )]
        lines: Vec<String>,

        /// Bandpass presets, groups (jwst, gemini) or reference curve names
        #[arg(long, value_delimiter = ',', default_value = "jwst")]
        bands: Vec<String>,

        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        z_min: f64,

        #[arg(long, default_value_t = 20.0, allow_negative_numbers = true)]
        z_max: f64,

        /// Lower wavelength limit in microns
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        lambda_min: f64,

        /// Upper wavelength limit in microns
        #[arg(long, default_value_t = 30.0, allow_negative_numbers = true)]
        lambda_max: f64,

        /// Draw the grid
        #[arg(long)]
        grid: bool,

        /// Colour scheme for line tracks (matplotlib names, `_r` reverses)
        #[arg(long)]
        lines_cmap: Option<ColorScheme>,

        /// Colour scheme for band shading
        #[arg(long)]
        bands_cmap: Option<ColorScheme>,

        /// Output file (.png, .svg, .jpg, .bmp)
        #[arg(short, long, default_value = "wavelength_coverage_plot.png")]
        output: PathBuf,
    },

    /// Print the redshift window over which a line falls inside a band
    ZRange {
        #[arg(long)]
        line: String,

        #[arg(long)]
        band: String,
    },

    /// List the bands that capture each catalog line at a redshift
    Coverage {
        #[arg(long, allow_negative_numbers = true)]
        z: f64,

        #[arg(long, value_delimiter = ',', default_value = "jwst,gemini")]
        bands: Vec<String>,
    },

    /// Show the built-in lines and bandpass presets
    List,

    /// Write the line catalog as CSV
    ExportLines {
        #[arg(default_value = "lines.csv")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => PlotterConfig::load(path)?,
        None => PlotterConfig::default(),
    };
    let catalog = LineCatalog::builtin();

    if !cli.no_export && !matches!(cli.command, Command::ExportLines { .. }) {
        if let Some(path) = &config.lines_export {
            catalog.export_csv(path)?;
        }
    }

    match cli.command {
        Command::Plot {
            lines,
            bands,
            z_min,
            z_max,
            lambda_min,
            lambda_max,
            grid,
            lines_cmap,
            bands_cmap,
            output,
        } => {
            let bandpasses = config
                .resolve_bandpasses(bands.as_slice())
                .context("resolving bandpasses")?;
            let request = PlotRequest {
                lines,
                z_min,
                z_max,
                lambda_min,
                lambda_max,
                show_grid: grid,
                filename: output,
                lines_cmap: lines_cmap.unwrap_or(config.lines_cmap),
                bands_cmap: bands_cmap.unwrap_or(config.bands_cmap),
                ..PlotRequest::default()
            }
            .with_bandpasses(bandpasses);

            let plotter = CoveragePlotter::new(catalog, config);
            plotter.render(&request)?;
            println!(
                "Plot saved to: {}",
                plotter.output_path(&request.filename).display()
            );
        }

        Command::ZRange { line, band } => {
            let line = catalog.lookup(&line)?;
            let band = config.resolve_bandpass(&band)?;
            let [z_lo, z_hi] = compute_redshift_range(line, &band);
            println!(
                "{} in {}: z = {:.3} .. {:.3}",
                line.key(),
                band.name(),
                z_lo,
                z_hi
            );
        }

        Command::Coverage { z, bands } => {
            let bandpasses = config.resolve_bandpasses(bands.as_slice())?;
            println!("Line coverage at z = {z}");
            println!("=========================");
            for line in catalog.iter() {
                let names: Vec<&str> = covering_bands(line, &bandpasses, z)
                    .iter()
                    .map(|b| b.name())
                    .collect();
                let observed = observed_wavelength_micron(line, z);
                let covered = if names.is_empty() {
                    "-".to_string()
                } else {
                    names.join(", ")
                };
                println!("{:<10} {:>8.3} µm  {covered}", line.key(), observed);
            }
        }

        Command::List => {
            println!("Lines");
            println!("-----");
            for line in catalog.iter() {
                println!(
                    "{:<10} {:>9.2} Å  {}",
                    line.key(),
                    line.rest_wavelength_angstrom(),
                    line.plain_label()
                );
            }
            println!();
            println!("Bandpass presets");
            println!("----------------");
            for preset in BANDPASS_PRESETS {
                println!(
                    "{:<14} {:<14} {:>6.2} – {:>6.2} µm",
                    preset.key,
                    preset.name,
                    preset.min_angstrom / 1e4,
                    preset.max_angstrom / 1e4
                );
            }
            for (name, curve) in &config.reference_curves {
                println!("{name:<14} {:<14} {}", curve.label, curve.path.display());
            }
        }

        Command::ExportLines { path } => {
            catalog.export_csv(&path)?;
            println!("Wrote {} lines to {}", catalog.len(), path.display());
        }
    }

    Ok(())
}
