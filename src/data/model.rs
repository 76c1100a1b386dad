use std::fmt;

use crate::error::{CoverageError, Result};

/// Angstroms per micron; catalog values are in Å, plot axes are in µm.
pub const ANGSTROM_PER_MICRON: f64 = 1e4;

// ---------------------------------------------------------------------------
// SpectralLine – one entry of the line catalog
// ---------------------------------------------------------------------------

/// A spectral line at its rest-frame wavelength.
///
/// The label may carry typesetting markup (`Ly$\alpha$ $\lambda$1215.67`)
/// and embedded newlines; [`SpectralLine::plain_label`] turns it into text a
/// plotting backend can draw. An empty label keeps the line out of legends.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralLine {
    key: String,
    rest_wavelength: f64,
    label: String,
}

impl SpectralLine {
    /// Build a line, rejecting non-positive or non-finite wavelengths.
    pub fn new(
        key: impl Into<String>,
        rest_wavelength_angstrom: f64,
        label: impl Into<String>,
    ) -> Result<Self> {
        let key = key.into();
        if !rest_wavelength_angstrom.is_finite() || rest_wavelength_angstrom <= 0.0 {
            return Err(CoverageError::InvalidLine {
                key,
                wavelength: rest_wavelength_angstrom,
            });
        }
        Ok(SpectralLine {
            key,
            rest_wavelength: rest_wavelength_angstrom,
            label: label.into(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Rest wavelength in Å. Always finite and > 0.
    pub fn rest_wavelength_angstrom(&self) -> f64 {
        self.rest_wavelength
    }

    pub fn rest_wavelength_micron(&self) -> f64 {
        self.rest_wavelength / ANGSTROM_PER_MICRON
    }

    /// Raw label as stored in the catalog, markup included.
    pub fn display_label(&self) -> &str {
        &self.label
    }

    /// Whether the line should get its own legend entry.
    pub fn has_label(&self) -> bool {
        !self.label.trim().is_empty()
    }

    /// Label with markup replaced by Unicode and newlines folded.
    pub fn plain_label(&self) -> String {
        plain_text(&self.label)
    }
}

impl fmt::Display for SpectralLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} Å)", self.key, self.rest_wavelength)
    }
}

const GREEK: &[(&str, &str)] = &[
    ("alpha", "α"),
    ("beta", "β"),
    ("gamma", "γ"),
    ("delta", "δ"),
    ("epsilon", "ε"),
    ("lambda", "λ"),
];

/// Turn math-mode markup like `H$\beta$ $\lambda$4863` into `Hβ λ4863`.
pub fn plain_text(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;
    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let word_len = after
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(after.len());
        let word = &after[..word_len];
        match GREEK.iter().find(|(name, _)| *name == word) {
            Some((_, symbol)) => out.push_str(symbol),
            None => out.push_str(word),
        }
        rest = &after[word_len..];
    }
    out.push_str(rest);

    out.replace('$', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Bandpass – an instrument / grism wavelength coverage
// ---------------------------------------------------------------------------

/// Wavelength coverage of an instrument mode.
///
/// Either a literal pair of edges or a sampled throughput curve. Samples are
/// kept in source order; only their minimum and maximum feed the plot.
#[derive(Debug, Clone, PartialEq)]
pub struct Bandpass {
    name: String,
    wavelengths: Vec<f64>,
    throughput: Vec<f64>,
}

impl Bandpass {
    /// A flat bandpass between two edges (Å), in either order.
    pub fn from_edges(name: impl Into<String>, a: f64, b: f64) -> Result<Self> {
        Self::from_curve(name, vec![a, b], vec![1.0, 1.0])
    }

    /// A sampled throughput curve (wavelengths in Å).
    pub fn from_curve(
        name: impl Into<String>,
        wavelengths: Vec<f64>,
        throughput: Vec<f64>,
    ) -> Result<Self> {
        let name = name.into();
        let malformed = |reason: String| CoverageError::MalformedBandpass {
            name: name.clone(),
            reason,
        };

        if wavelengths.is_empty() {
            return Err(malformed("no wavelength samples".into()));
        }
        if wavelengths.len() != throughput.len() {
            return Err(malformed(format!(
                "{} wavelengths but {} throughput values",
                wavelengths.len(),
                throughput.len()
            )));
        }
        if let Some(bad) = wavelengths.iter().find(|w| !w.is_finite() || **w <= 0.0) {
            return Err(malformed(format!("invalid wavelength {bad}")));
        }

        Ok(Bandpass {
            name,
            wavelengths,
            throughput,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn throughput(&self) -> &[f64] {
        &self.throughput
    }

    /// Number of samples (2 for edge-defined bands).
    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    /// Ascending `[min, max]` wavelength in Å, independent of sample order.
    pub fn range_angstrom(&self) -> [f64; 2] {
        let min = self.wavelengths.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = self
            .wavelengths
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        [min, max]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_rejects_non_positive_wavelength() {
        assert!(matches!(
            SpectralLine::new("bad", 0.0, ""),
            Err(CoverageError::InvalidLine { .. })
        ));
        assert!(SpectralLine::new("bad", -5.0, "").is_err());
        assert!(SpectralLine::new("bad", f64::NAN, "").is_err());
        assert!(SpectralLine::new("ok", 1215.67, "Ly$\\alpha$").is_ok());
    }

    #[test]
    fn test_plain_label_converts_markup() {
        let line = SpectralLine::new("lya", 1215.67, r"Ly$\alpha$ $\lambda$1215.67").unwrap();
        assert_eq!(line.plain_label(), "Lyα λ1215.67");

        let doublet =
            SpectralLine::new("[oiii]2", 5007.0, "[OIII] $\\lambda$4959\n    & $\\lambda$5007")
                .unwrap();
        assert_eq!(doublet.plain_label(), "[OIII] λ4959 & λ5007");
    }

    #[test]
    fn test_plain_text_keeps_unknown_commands_as_words() {
        assert_eq!(plain_text(r"Pf$\zeta$"), "Pfzeta");
        assert_eq!(plain_text("CIV $\\lambda$1549"), "CIV λ1549");
    }

    #[test]
    fn test_empty_label_has_no_legend_entry() {
        let line = SpectralLine::new("[nev]1", 3346.0, "").unwrap();
        assert!(!line.has_label());
    }

    #[test]
    fn test_bandpass_range_is_ascending() {
        let band = Bandpass::from_edges("flipped", 10300.0, 3600.0).unwrap();
        assert_eq!(band.range_angstrom(), [3600.0, 10300.0]);

        let curve = Bandpass::from_curve(
            "curve",
            vec![11000.0, 8000.0, 17000.0, 9500.0],
            vec![0.1, 0.0, 0.0, 0.4],
        )
        .unwrap();
        assert_eq!(curve.range_angstrom(), [8000.0, 17000.0]);
    }

    #[test]
    fn test_bandpass_rejects_malformed_curves() {
        assert!(Bandpass::from_curve("empty", vec![], vec![]).is_err());
        assert!(Bandpass::from_curve("ragged", vec![1.0, 2.0], vec![1.0]).is_err());
        assert!(Bandpass::from_curve("neg", vec![-1.0, 2.0], vec![1.0, 1.0]).is_err());
    }
}
