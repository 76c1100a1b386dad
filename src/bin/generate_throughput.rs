//! Write sample HST/WFC3 grism throughput curves.
//!
//! Produces `hst_g102_throughput.{csv,parquet}` and
//! `hst_g141_throughput.{csv,parquet}` with `wave` (Å) and `throughput`
//! columns, matching the default reference curves of `redshift-coverage`.
//!
//! Usage:
//! ```
//! cargo run --bin generate_throughput -- --out-dir filters
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::Float64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "generate_throughput")]
#[command(about = "Write sample grism throughput curves")]
struct Args {
    /// Directory for the generated files
    #[arg(long, default_value = "filters")]
    out_dir: PathBuf,

    /// Wavelength step in Å
    #[arg(long, default_value_t = 10.0)]
    step: f64,

    /// Seed for the ripple noise
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Flat-topped response with soft edges (a super-Gaussian).
struct GrismShape {
    name: &'static str,
    center: f64,
    half_width: f64,
    peak: f64,
    cut_on: f64,
    cut_off: f64,
}

const GRISMS: &[GrismShape] = &[
    GrismShape {
        name: "g102",
        center: 9900.0,
        half_width: 1300.0,
        peak: 0.41,
        cut_on: 7800.0,
        cut_off: 11700.0,
    },
    GrismShape {
        name: "g141",
        center: 13900.0,
        half_width: 2700.0,
        peak: 0.48,
        cut_on: 10600.0,
        cut_off: 17200.0,
    },
];

impl GrismShape {
    fn throughput(&self, wave: f64) -> f64 {
        let x = (wave - self.center) / self.half_width;
        self.peak * (-x.powi(6)).exp()
    }
}

/// Seeded ripple noise (splitmix64), so regenerated curves match.
struct Ripple {
    state: u64,
}

impl Ripple {
    fn new(seed: u64) -> Self {
        Ripple { state: seed }
    }

    /// Uniform in [-1, 1).
    fn next_signed(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z >> 11) as f64 / (1u64 << 52) as f64 - 1.0
    }
}

#[derive(Serialize)]
struct Row {
    wave: f64,
    throughput: f64,
}

fn sample_curve(shape: &GrismShape, step: f64, rng: &mut Ripple) -> (Vec<f64>, Vec<f64>) {
    let n = ((shape.cut_off - shape.cut_on) / step).floor() as usize + 1;
    let wave: Vec<f64> = (0..n).map(|i| shape.cut_on + i as f64 * step).collect();
    let throughput = wave
        .iter()
        .map(|&w| {
            let base = shape.throughput(w);
            (base * (1.0 + 0.02 * rng.next_signed())).max(0.0)
        })
        .collect();
    (wave, throughput)
}

fn write_csv(path: &Path, wave: &[f64], throughput: &[f64]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for (&wave, &throughput) in wave.iter().zip(throughput) {
        writer.serialize(Row { wave, throughput })?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, wave: &[f64], throughput: &[f64]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("wave", DataType::Float64, false),
        Field::new("throughput", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from(wave.to_vec())),
            Arc::new(Float64Array::from(throughput.to_vec())),
        ],
    )
    .context("building record batch")?;

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.step <= 0.0 {
        anyhow::bail!("--step must be positive, got {}", args.step);
    }
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    let mut rng = Ripple::new(args.seed);
    for shape in GRISMS {
        let (wave, throughput) = sample_curve(shape, args.step, &mut rng);
        let stem = format!("hst_{}_throughput", shape.name);

        let csv_path = args.out_dir.join(format!("{stem}.csv"));
        write_csv(&csv_path, &wave, &throughput)?;
        let parquet_path = args.out_dir.join(format!("{stem}.parquet"));
        write_parquet(&parquet_path, &wave, &throughput)?;

        log::info!("{}: {} samples", shape.name, wave.len());
        println!(
            "Wrote {} ({:.0}–{:.0} Å) to {} and {}",
            shape.name,
            shape.cut_on,
            shape.cut_off,
            csv_path.display(),
            parquet_path.display()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ripple_is_seeded_and_bounded() {
        let mut a = Ripple::new(42);
        let mut b = Ripple::new(42);
        for _ in 0..1000 {
            let v = a.next_signed();
            assert_eq!(v, b.next_signed());
            assert!((-1.0..1.0).contains(&v));
        }
        assert_ne!(Ripple::new(1).next_signed(), Ripple::new(2).next_signed());
    }

    #[test]
    fn test_sampled_curve_spans_cut_range() {
        let mut rng = Ripple::new(7);
        let (wave, throughput) = sample_curve(&GRISMS[0], 10.0, &mut rng);
        assert_eq!(wave.first(), Some(&7800.0));
        assert_eq!(wave.last(), Some(&11700.0));
        assert!(throughput.iter().all(|&t| t >= 0.0));
    }
}
