//! Redshift ↔ observed-wavelength transforms.
//!
//! Observed wavelength is `rest × (1 + z)`; the plot works in microns while
//! the catalogs store Ångströms.

use crate::data::model::{ANGSTROM_PER_MICRON, Bandpass, SpectralLine};
use crate::error::{CoverageError, Result};

/// Samples per line track when the caller has no preference.
pub const DEFAULT_TRACK_SAMPLES: usize = 1000;

/// `num` evenly spaced values from `start` to `end` inclusive.
///
/// `num == 1` yields `start` alone; `num == 0` yields nothing.
pub fn linspace(start: f64, end: f64, num: usize) -> impl Iterator<Item = f64> + Clone {
    let step = if num > 1 {
        (end - start) / (num - 1) as f64
    } else {
        0.0
    };
    (0..num).map(move |i| {
        // Pin the last sample so rounding never overshoots the bound.
        if num > 1 && i == num - 1 {
            end
        } else {
            start + step * i as f64
        }
    })
}

/// Fail with `InvalidRange` unless `min <= max` and both are finite.
pub fn check_range(axis: &'static str, min: f64, max: f64) -> Result<()> {
    if !min.is_finite() || !max.is_finite() || max < min {
        return Err(CoverageError::InvalidRange { axis, min, max });
    }
    Ok(())
}

/// Observed wavelength of `line` at redshift `z`, in microns.
pub fn observed_wavelength_micron(line: &SpectralLine, z: f64) -> f64 {
    line.rest_wavelength_angstrom() * (1.0 + z) / ANGSTROM_PER_MICRON
}

/// Redshift at which `line` is observed at `wavelength_micron`.
pub fn redshift_at(line: &SpectralLine, wavelength_micron: f64) -> f64 {
    wavelength_micron * ANGSTROM_PER_MICRON / line.rest_wavelength_angstrom() - 1.0
}

/// `(observed wavelength µm, z)` pairs for `num_samples` redshifts spread
/// evenly over `[z_min, z_max]`, in increasing z.
pub fn compute_line_track(
    line: &SpectralLine,
    z_min: f64,
    z_max: f64,
    num_samples: usize,
) -> Result<Vec<(f64, f64)>> {
    check_range("redshift", z_min, z_max)?;
    Ok(linspace(z_min, z_max, num_samples)
        .map(|z| (observed_wavelength_micron(line, z), z))
        .collect())
}

/// `[min, max]` wavelength of the band in microns.
pub fn bandpass_extent(bandpass: &Bandpass) -> [f64; 2] {
    let [lo, hi] = bandpass.range_angstrom();
    [lo / ANGSTROM_PER_MICRON, hi / ANGSTROM_PER_MICRON]
}

/// Redshift window `[z_lo, z_hi]` over which `line` lands inside the band.
///
/// Either end may be negative when the band reaches blueward of the rest
/// wavelength.
pub fn compute_redshift_range(line: &SpectralLine, bandpass: &Bandpass) -> [f64; 2] {
    let [lo, hi] = bandpass.range_angstrom();
    let rest = line.rest_wavelength_angstrom();
    [lo / rest - 1.0, hi / rest - 1.0]
}

/// Bands (in input order) whose extent contains `line` observed at `z`.
pub fn covering_bands<'a>(
    line: &SpectralLine,
    bands: &'a [Bandpass],
    z: f64,
) -> Vec<&'a Bandpass> {
    let observed = observed_wavelength_micron(line, z);
    bands
        .iter()
        .filter(|band| {
            let [lo, hi] = bandpass_extent(band);
            (lo..=hi).contains(&observed)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::data::catalog::LineCatalog;

    fn lya() -> SpectralLine {
        SpectralLine::new("lya", 1215.67, r"Ly$\alpha$").unwrap()
    }

    fn gmos() -> Bandpass {
        Bandpass::from_edges("Gemini GMOS", 3600.0, 10300.0).unwrap()
    }

    #[test]
    fn test_linspace_endpoints() {
        let v: Vec<f64> = linspace(0.0, 20.0, 1000).collect();
        assert_eq!(v.len(), 1000);
        assert_eq!(v[0], 0.0);
        assert_eq!(v[999], 20.0);
        assert!(v.windows(2).all(|w| w[0] < w[1]));

        assert_eq!(linspace(3.0, 7.0, 1).collect::<Vec<_>>(), vec![3.0]);
        assert_eq!(linspace(3.0, 7.0, 0).count(), 0);
        assert_eq!(linspace(0.1, 1.0, 2).collect::<Vec<_>>(), vec![0.1, 1.0]);
    }

    #[test]
    fn test_track_at_zero_redshift_is_rest_wavelength() {
        let line = lya();
        let track = compute_line_track(&line, 0.0, 0.0, 7).unwrap();
        assert_eq!(track.len(), 7);
        for (wave, z) in track {
            assert_eq!(z, 0.0);
            assert_relative_eq!(wave, 0.121567, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_track_is_ordered_by_redshift() {
        let track = compute_line_track(&lya(), 0.0, 5.0, 1000).unwrap();
        assert_relative_eq!(track[0].0, 0.121567, epsilon = 1e-12);
        assert_relative_eq!(track[999].0, 1215.67 * 6.0 / 1e4, epsilon = 1e-12);
        assert!(track.windows(2).all(|w| w[0].1 < w[1].1 && w[0].0 < w[1].0));
    }

    #[test]
    fn test_track_rejects_inverted_range() {
        assert!(matches!(
            compute_line_track(&lya(), 5.0, 1.0, 10),
            Err(CoverageError::InvalidRange { axis: "redshift", .. })
        ));
        assert!(compute_line_track(&lya(), 0.0, f64::NAN, 10).is_err());
    }

    #[test]
    fn test_extent_is_ordered() {
        let flipped = Bandpass::from_edges("flipped", 28.1e4, 5.9e4).unwrap();
        let [lo, hi] = bandpass_extent(&flipped);
        assert!(lo <= hi);
        assert_relative_eq!(lo, 5.9);
        assert_relative_eq!(hi, 28.1);

        let single = Bandpass::from_curve("single", vec![9000.0], vec![1.0]).unwrap();
        assert_eq!(bandpass_extent(&single), [0.9, 0.9]);
    }

    #[test]
    fn test_extent_ignores_interior_samples() {
        let curve = Bandpass::from_curve(
            "g102",
            vec![8000.0, 8500.0, 9000.0, 11500.0],
            vec![0.0, 0.3, 0.4, 0.0],
        )
        .unwrap();
        assert_eq!(bandpass_extent(&curve), [0.8, 1.15]);
    }

    #[test]
    fn test_redshift_range_for_lya_in_gmos() {
        let [z_lo, z_hi] = compute_redshift_range(&lya(), &gmos());
        assert_relative_eq!(z_lo, 3600.0 / 1215.67 - 1.0);
        assert_relative_eq!(z_hi, 10300.0 / 1215.67 - 1.0);
    }

    #[test]
    fn test_redshift_range_round_trips_with_forward_transform() {
        let catalog = LineCatalog::builtin();
        let band = gmos();
        let [lo_um, hi_um] = bandpass_extent(&band);
        for line in catalog.iter() {
            let [z_lo, z_hi] = compute_redshift_range(line, &band);
            assert_relative_eq!(observed_wavelength_micron(line, z_lo), lo_um, epsilon = 1e-12);
            assert_relative_eq!(observed_wavelength_micron(line, z_hi), hi_um, epsilon = 1e-12);

            for z in linspace(0.0, 20.0, 41) {
                let back = redshift_at(line, observed_wavelength_micron(line, z));
                assert_relative_eq!(back, z, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_covering_bands() {
        let bands = vec![
            gmos(),
            Bandpass::from_edges("NIRSpec Prism", 0.6e4, 5.3e4).unwrap(),
            Bandpass::from_edges("MIRI LRS", 5e4, 12e4).unwrap(),
        ];
        let line = lya();

        // z = 6 puts Lyα at 0.851 µm.
        let names: Vec<&str> = covering_bands(&line, &bands, 6.0)
            .iter()
            .map(|b| b.name())
            .collect();
        assert_eq!(names, ["Gemini GMOS", "NIRSpec Prism"]);

        assert!(covering_bands(&line, &bands, 0.0).is_empty());
    }
}
