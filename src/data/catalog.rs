use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use super::model::{Bandpass, SpectralLine};
use crate::error::{CoverageError, Result};

// ---------------------------------------------------------------------------
// Built-in tables
// ---------------------------------------------------------------------------

/// (key, rest wavelength in Å, label). Empty labels mark the first member of
/// a doublet whose second member carries the combined label.
const BUILTIN_LINES: &[(&str, f64, &str)] = &[
    ("lybreak", 911.75, r"Lyman Limit $\lambda$911.75"),
    ("lya", 1215.67, r"Ly$\alpha$ $\lambda$1215.67"),
    ("nv", 1240.0, r"NV $\lambda$1240"),
    ("civ", 1548.0, r"CIV $\lambda$1549"),
    ("heii1", 1640.4, r"HeII $\lambda$1640"),
    ("oiii]", 1664.0, r"OIII] $\lambda$1660,1666"),
    ("siiii]", 1883.0, r"SiIII] $\lambda$1883,1892"),
    ("ciii]", 1906.8, "CIII] $\\lambda$1907\n  & $\\lambda$1909"),
    ("mgii", 2798.0, "MgII $\\lambda$2796\n  & $\\lambda$2803"),
    ("[nev]1", 3346.0, ""),
    ("[nev]2", 3426.0, "[NeV] $\\lambda$3346\n    & $\\lambda$3426"),
    ("Hbreak", 3646.0, r"Balmer Limit $\lambda$3646"),
    ("[oii]", 3727.0, "[OII] $\\lambda$3727\n    & $\\lambda$3729"),
    ("[neiii]", 3869.0, r"[NeIII] $\lambda$3869"),
    ("hdelta", 4102.0, r"H$\delta$ $\lambda$4102"),
    ("hgamma", 4341.0, r"H$\gamma$ $\lambda$4341"),
    ("heii2", 4686.0, r"HeII $\lambda$4686"),
    ("hbeta", 4861.0, r"H$\beta$ $\lambda$4863"),
    ("[oiii]1", 4959.0, ""),
    ("[oiii]2", 5007.0, "[OIII] $\\lambda$4959\n    & $\\lambda$5007"),
    ("hei", 5876.0, r"HeI $\lambda$5876"),
    ("halpha", 6563.0, r"H$\alpha$ $\lambda$6563"),
    ("[sii]1", 6716.0, ""),
    ("[sii]2", 6731.0, "[SII] $\\lambda$6716\n    & $\\lambda$6731"),
    ("pabreak", 8250.0, r"Paschen Limit $\lambda$8250"),
    ("pabeta", 12818.0, r"Pa$\beta$ $\lambda$12820"),
    ("paalpha", 18751.0, r"Pa$\alpha$ $\lambda$18750"),
    ("brgamma", 21661.0, r"Br$\gamma$ $\lambda$21661"),
    ("brbeta", 26259.0, r"Br$\beta$ $\lambda$26259"),
    ("pfepsilon", 30383.0, r"Pf$\epsilon$ $\lambda$30383"),
    ("pfdelta", 32970.0, r"Pf$\delta$ $\lambda$32970"),
    ("pfgamma", 37406.0, r"Pf$\gamma$ $\lambda$37406"),
    ("bralpha", 40523.0, r"Br$\alpha$ $\lambda$40523"),
    ("pfbeta", 46538.0, r"Pf$\beta$ $\lambda$46538"),
    ("pfalpha", 74599.0, r"Pf$\alpha$ $\lambda$74599"),
];

/// A preset instrument coverage with literal edges in Å.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandpassPreset {
    pub key: &'static str,
    pub name: &'static str,
    pub min_angstrom: f64,
    pub max_angstrom: f64,
}

const fn preset(key: &'static str, name: &'static str, min: f64, max: f64) -> BandpassPreset {
    BandpassPreset {
        key,
        name,
        min_angstrom: min,
        max_angstrom: max,
    }
}

/// JWST spectroscopic modes followed by Gemini/GMOS.
pub const BANDPASS_PRESETS: &[BandpassPreset] = &[
    preset("miri_lrs", "MIRI LRS", 5e4, 12e4),
    preset("miri_mrs", "MIRI MRS", 5.9e4, 28.1e4),
    preset("niriss_wfss", "NIRISS WFSS", 0.8e4, 2.2e4),
    preset("niriss_soss", "NIRISS SOSS", 0.6e4, 2.8e4),
    preset("nircam_wfss", "NIRCam WFSS", 2.4e4, 5e4),
    preset("nirspec_prism", "NIRSpec Prism", 0.6e4, 5.3e4),
    preset("nirspec_mrs1", "NIRSpec MRS1", 0.7e4, 1.27e4),
    preset("nirspec_mrs2", "NIRSpec MRS2", 0.97e4, 1.89e4),
    preset("nirspec_mrs3", "NIRSpec MRS3", 1.66e4, 3.17e4),
    preset("nirspec_mrs4", "NIRSpec MRS4", 2.87e4, 5.27e4),
    preset("nirspec_mrs", "NIRSpec MRS", 0.6e4, 5.27e4),
    preset("gmos", "Gemini GMOS", 3600.0, 10300.0),
];

const JWST_GROUP: &[&str] = &[
    "miri_lrs",
    "miri_mrs",
    "niriss_wfss",
    "niriss_soss",
    "nircam_wfss",
    "nirspec_prism",
    "nirspec_mrs1",
    "nirspec_mrs2",
    "nirspec_mrs3",
    "nirspec_mrs4",
];

const GEMINI_GROUP: &[&str] = &["gmos"];

impl BandpassPreset {
    pub fn to_bandpass(&self) -> Result<Bandpass> {
        Bandpass::from_edges(self.name, self.min_angstrom, self.max_angstrom)
    }
}

/// Look up a preset by key (case-insensitive).
pub fn find_preset(key: &str) -> Option<&'static BandpassPreset> {
    BANDPASS_PRESETS
        .iter()
        .find(|p| p.key.eq_ignore_ascii_case(key))
}

/// Expand a group name (`jwst`, `gemini`) into its preset keys.
pub fn preset_group(name: &str) -> Option<&'static [&'static str]> {
    match name.to_ascii_lowercase().as_str() {
        "jwst" => Some(JWST_GROUP),
        "gemini" => Some(GEMINI_GROUP),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// LineCatalog
// ---------------------------------------------------------------------------

/// Ordered, read-only mapping from line key to [`SpectralLine`].
#[derive(Debug, Clone)]
pub struct LineCatalog {
    lines: Vec<SpectralLine>,
    index: BTreeMap<String, usize>,
}

#[derive(Serialize)]
struct ExportRow<'a> {
    wave: f64,
    name: &'a str,
}

impl LineCatalog {
    /// Build a catalog; later duplicates of a key replace earlier ones.
    pub fn from_lines(lines: Vec<SpectralLine>) -> Self {
        let mut deduped: Vec<SpectralLine> = Vec::with_capacity(lines.len());
        let mut index = BTreeMap::new();
        for line in lines {
            if let Some(&i) = index.get(line.key()) {
                deduped[i] = line;
                continue;
            }
            index.insert(line.key().to_string(), deduped.len());
            deduped.push(line);
        }
        LineCatalog {
            lines: deduped,
            index,
        }
    }

    /// The lines most often used for high-redshift spectroscopy, Lyman limit
    /// through Pfund-α.
    pub fn builtin() -> Self {
        let lines = BUILTIN_LINES
            .iter()
            .filter_map(|&(key, wave, label)| SpectralLine::new(key, wave, label).ok())
            .collect();
        Self::from_lines(lines)
    }

    pub fn get(&self, key: &str) -> Option<&SpectralLine> {
        self.index.get(key).map(|&i| &self.lines[i])
    }

    /// Like [`LineCatalog::get`] but failing with `UnknownLine`.
    pub fn lookup(&self, key: &str) -> Result<&SpectralLine> {
        self.get(key)
            .ok_or_else(|| CoverageError::UnknownLine(key.to_string()))
    }

    /// Resolve keys in order, failing on the first unknown one.
    pub fn select<S: AsRef<str>>(&self, keys: &[S]) -> Result<Vec<&SpectralLine>> {
        keys.iter().map(|k| self.lookup(k.as_ref())).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpectralLine> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Write the catalog as `wave,name` rows in catalog order.
    pub fn export_csv(&self, path: &Path) -> Result<()> {
        let export_err = |source: csv::Error| CoverageError::Export {
            path: path.to_path_buf(),
            source,
        };
        let mut writer = csv::Writer::from_path(path).map_err(export_err)?;
        for line in &self.lines {
            writer
                .serialize(ExportRow {
                    wave: line.rest_wavelength_angstrom(),
                    name: line.display_label(),
                })
                .map_err(export_err)?;
        }
        writer.flush()?;
        log::info!("Exported {} lines to {}", self.lines.len(), path.display());
        Ok(())
    }
}

impl Default for LineCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_ordered_and_complete() {
        let catalog = LineCatalog::builtin();
        assert_eq!(catalog.len(), BUILTIN_LINES.len());
        assert_eq!(catalog.iter().next().unwrap().key(), "lybreak");
        assert_eq!(catalog.iter().last().unwrap().key(), "pfalpha");

        let waves: Vec<f64> = catalog.iter().map(|l| l.rest_wavelength_angstrom()).collect();
        assert!(waves.windows(2).all(|w| w[0] < w[1]));
        assert!(waves.iter().all(|&w| w > 0.0));
    }

    #[test]
    fn test_lookup_unknown_line() {
        let catalog = LineCatalog::builtin();
        assert_eq!(catalog.lookup("lya").unwrap().rest_wavelength_angstrom(), 1215.67);
        assert!(matches!(
            catalog.lookup("not_a_line"),
            Err(CoverageError::UnknownLine(k)) if k == "not_a_line"
        ));
        assert!(catalog.select(&["lya", "bogus", "halpha"]).is_err());
    }

    #[test]
    fn test_select_preserves_request_order() {
        let catalog = LineCatalog::builtin();
        let picked = catalog.select(&["halpha", "lya", "[oiii]2"]).unwrap();
        let keys: Vec<&str> = picked.iter().map(|l| l.key()).collect();
        assert_eq!(keys, ["halpha", "lya", "[oiii]2"]);
    }

    #[test]
    fn test_duplicate_keys_replace_in_place() {
        let catalog = LineCatalog::from_lines(vec![
            SpectralLine::new("a", 100.0, "first").unwrap(),
            SpectralLine::new("b", 200.0, "").unwrap(),
            SpectralLine::new("a", 150.0, "second").unwrap(),
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.iter().next().unwrap().display_label(), "second");
    }

    #[test]
    fn test_presets_and_groups() {
        let gmos = find_preset("GMOS").unwrap().to_bandpass().unwrap();
        assert_eq!(gmos.name(), "Gemini GMOS");
        assert_eq!(gmos.range_angstrom(), [3600.0, 10300.0]);

        let jwst = preset_group("jwst").unwrap();
        assert_eq!(jwst.len(), 10);
        assert!(jwst.iter().all(|k| find_preset(k).is_some()));
        assert!(preset_group("hubble").is_none());
    }

    #[test]
    fn test_export_csv_writes_wave_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.csv");
        LineCatalog::builtin().export_csv(&path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, ["wave", "name"]);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), BUILTIN_LINES.len());
        assert_eq!(&rows[1][0], "1215.67");
        assert_eq!(&rows[1][1], r"Ly$\alpha$ $\lambda$1215.67");
        assert_eq!(&rows[9][1], "");
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("lines.csv");
        assert!(matches!(
            LineCatalog::builtin().export_csv(&path),
            Err(CoverageError::Export { .. })
        ));
    }
}
