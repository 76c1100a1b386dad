use std::fmt;
use std::str::FromStr;

use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};
use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

use crate::coverage::linspace;
use crate::error::CoverageError;

// ---------------------------------------------------------------------------
// Colour schemes
// ---------------------------------------------------------------------------

/// Base gradients. Names follow matplotlib so existing habits carry over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    RdBu,
    Plasma,
    Viridis,
    Inferno,
    Turbo,
    Greys,
    /// Evenly spaced HSL hues, red through magenta.
    Hues,
}

impl Colormap {
    pub const ALL: [Colormap; 7] = [
        Colormap::RdBu,
        Colormap::Plasma,
        Colormap::Viridis,
        Colormap::Inferno,
        Colormap::Turbo,
        Colormap::Greys,
        Colormap::Hues,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Colormap::RdBu => "RdBu",
            Colormap::Plasma => "plasma",
            Colormap::Viridis => "viridis",
            Colormap::Inferno => "inferno",
            Colormap::Turbo => "turbo",
            Colormap::Greys => "Greys",
            Colormap::Hues => "hues",
        }
    }

    fn keys(&self) -> &'static [(f32, [u8; 3])] {
        match self {
            Colormap::RdBu => RDBU_KEYS,
            Colormap::Plasma => PLASMA_KEYS,
            Colormap::Viridis => VIRIDIS_KEYS,
            Colormap::Inferno => INFERNO_KEYS,
            Colormap::Turbo => TURBO_KEYS,
            Colormap::Greys => GREYS_KEYS,
            Colormap::Hues => &[],
        }
    }

    /// Colour at `t` in [0, 1]; values outside are clamped.
    pub fn at(&self, t: f32) -> Srgb<u8> {
        let t = t.clamp(0.0, 1.0);
        match self {
            Colormap::Hues => {
                let hsl = Hsl::new(t * 300.0, 0.75, 0.55);
                let rgb: Srgb = hsl.into_color();
                rgb.into_format()
            }
            other => interpolate(other.keys(), t),
        }
    }
}

// Diverging red → white → blue (ColorBrewer RdBu).
const RDBU_KEYS: &[(f32, [u8; 3])] = &[
    (0.0, [103, 0, 31]),
    (0.1, [178, 24, 43]),
    (0.2, [214, 96, 77]),
    (0.3, [244, 165, 130]),
    (0.4, [253, 219, 199]),
    (0.5, [247, 247, 247]),
    (0.6, [209, 229, 240]),
    (0.7, [146, 197, 222]),
    (0.8, [67, 147, 195]),
    (0.9, [33, 102, 172]),
    (1.0, [5, 48, 97]),
];

const PLASMA_KEYS: &[(f32, [u8; 3])] = &[
    (0.00, [13, 8, 135]),
    (0.25, [126, 3, 168]),
    (0.50, [204, 71, 120]),
    (0.75, [248, 149, 64]),
    (1.00, [240, 249, 33]),
];

const VIRIDIS_KEYS: &[(f32, [u8; 3])] = &[
    (0.00, [68, 1, 84]),
    (0.25, [59, 82, 139]),
    (0.50, [33, 145, 140]),
    (0.75, [94, 201, 98]),
    (1.00, [253, 231, 37]),
];

const INFERNO_KEYS: &[(f32, [u8; 3])] = &[
    (0.00, [0, 0, 4]),
    (0.20, [40, 11, 84]),
    (0.40, [101, 21, 110]),
    (0.60, [182, 55, 84]),
    (0.80, [243, 132, 48]),
    (1.00, [252, 255, 164]),
];

const TURBO_KEYS: &[(f32, [u8; 3])] = &[
    (0.00, [48, 18, 59]),
    (0.20, [69, 138, 252]),
    (0.40, [40, 200, 220]),
    (0.50, [90, 220, 100]),
    (0.60, [170, 220, 50]),
    (0.80, [250, 170, 50]),
    (1.00, [122, 4, 3]),
];

const GREYS_KEYS: &[(f32, [u8; 3])] = &[(0.0, [255, 255, 255]), (1.0, [0, 0, 0])];

/// Piecewise-linear blend between key colours, mixed in linear light.
fn interpolate(keys: &[(f32, [u8; 3])], t: f32) -> Srgb<u8> {
    let upper_idx = keys
        .iter()
        .position(|&(k, _)| k > t)
        .unwrap_or(keys.len() - 1);
    let lower_idx = upper_idx.saturating_sub(1);

    let (t0, c0) = keys[lower_idx];
    let (t1, c1) = keys[upper_idx];
    if upper_idx == lower_idx || t >= t1 {
        return Srgb::new(c1[0], c1[1], c1[2]);
    }

    let a: LinSrgb = Srgb::new(c0[0], c0[1], c0[2]).into_format::<f32>().into_linear();
    let b: LinSrgb = Srgb::new(c1[0], c1[1], c1[2]).into_format::<f32>().into_linear();
    let mixed = a.mix(b, (t - t0) / (t1 - t0));
    let out: Srgb = Srgb::from_linear(mixed);
    out.into_format()
}

/// A colormap, optionally reversed (`RdBu_r`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColorScheme {
    pub map: Colormap,
    pub reversed: bool,
}

impl ColorScheme {
    pub const fn new(map: Colormap) -> Self {
        ColorScheme {
            map,
            reversed: false,
        }
    }

    pub const fn reversed(map: Colormap) -> Self {
        ColorScheme {
            map,
            reversed: true,
        }
    }

    /// Default for line tracks: blue at short wavelengths, red at long.
    pub const LINES: ColorScheme = ColorScheme::reversed(Colormap::RdBu);

    /// Default for bandpass shading.
    pub const BANDS: ColorScheme = ColorScheme::new(Colormap::Plasma);

    pub fn at(&self, t: f64) -> RGBColor {
        let t = t as f32;
        let t = if self.reversed { 1.0 - t } else { t };
        let (r, g, b) = self.map.at(t).into_components();
        RGBColor(r, g, b)
    }

    /// `n` colours sampled evenly over `[from, to]` of the scheme.
    pub fn sample(&self, n: usize, from: f64, to: f64) -> Vec<RGBColor> {
        linspace(from, to, n).map(|t| self.at(t)).collect()
    }
}

impl FromStr for ColorScheme {
    type Err = CoverageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, reversed) = match s.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (s, false),
        };
        Colormap::ALL
            .iter()
            .find(|m| m.name().eq_ignore_ascii_case(base))
            .map(|&map| ColorScheme { map, reversed })
            .ok_or_else(|| CoverageError::UnknownColorScheme(s.to_string()))
    }
}

impl TryFrom<String> for ColorScheme {
    type Error = CoverageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColorScheme> for String {
    fn from(scheme: ColorScheme) -> Self {
        scheme.to_string()
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.map.name())?;
        if self.reversed {
            write!(f, "_r")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Dash styles and palette assignment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashStyle {
    Solid,
    Dashed,
    DashDot,
    Dotted,
}

impl DashStyle {
    pub const CYCLE: [DashStyle; 4] = [
        DashStyle::Solid,
        DashStyle::Dashed,
        DashStyle::DashDot,
        DashStyle::Dotted,
    ];

    /// Style for the `index`-th series; repeats every four.
    pub fn cycle(index: usize) -> Self {
        Self::CYCLE[index % Self::CYCLE.len()]
    }

    /// Alternating on/off lengths in multiples of the stroke width.
    /// Empty for a continuous stroke.
    pub fn pattern(&self) -> &'static [f64] {
        match self {
            DashStyle::Solid => &[],
            DashStyle::Dashed => &[3.7, 1.6],
            DashStyle::DashDot => &[6.4, 1.6, 1.0, 1.6],
            DashStyle::Dotted => &[1.0, 1.65],
        }
    }
}

/// How one line track is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: RGBColor,
    pub dash: DashStyle,
}

/// Colours spread over the whole scheme, dash styles cycling by position.
pub fn line_styles(n: usize, scheme: ColorScheme) -> Vec<LineStyle> {
    scheme
        .sample(n, 0.0, 1.0)
        .into_iter()
        .enumerate()
        .map(|(i, color)| LineStyle {
            color,
            dash: DashStyle::cycle(i),
        })
        .collect()
}

/// Colours from 10% to 100% of the scheme, skipping its darkest end.
pub fn band_colors(n: usize, scheme: ColorScheme) -> Vec<RGBColor> {
    scheme.sample(n, 0.1, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_endpoints_match_keys() {
        let viridis = ColorScheme::new(Colormap::Viridis);
        assert_eq!(viridis.at(0.0), RGBColor(68, 1, 84));
        assert_eq!(viridis.at(1.0), RGBColor(253, 231, 37));

        let rdbu_r = ColorScheme::LINES;
        assert_eq!(rdbu_r.at(0.0), RGBColor(5, 48, 97));
        assert_eq!(rdbu_r.at(1.0), RGBColor(103, 0, 31));
    }

    #[test]
    fn test_scheme_clamps() {
        let plasma = ColorScheme::BANDS;
        assert_eq!(plasma.at(-0.5), plasma.at(0.0));
        assert_eq!(plasma.at(1.5), plasma.at(1.0));
    }

    #[test]
    fn test_interpolation_stays_between_keys() {
        let greys = ColorScheme::new(Colormap::Greys);
        let RGBColor(r, g, b) = greys.at(0.5);
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert!(r > 0 && r < 255);

        let mut prev = 255;
        for t in linspace(0.0, 1.0, 11) {
            let RGBColor(v, _, _) = greys.at(t);
            assert!(v <= prev);
            prev = v;
        }
    }

    #[test]
    fn test_parse_scheme_names() {
        let s: ColorScheme = "RdBu_r".parse().unwrap();
        assert_eq!(s, ColorScheme::LINES);
        assert_eq!(s.to_string(), "RdBu_r");

        let p: ColorScheme = "PLASMA".parse().unwrap();
        assert_eq!(p, ColorScheme::BANDS);
        assert!(matches!(
            "jet".parse::<ColorScheme>(),
            Err(CoverageError::UnknownColorScheme(_))
        ));
    }

    #[test]
    fn test_scheme_serde_as_string() {
        let json = serde_json::to_string(&ColorScheme::LINES).unwrap();
        assert_eq!(json, "\"RdBu_r\"");
        let back: ColorScheme = serde_json::from_str("\"viridis_r\"").unwrap();
        assert_eq!(back, ColorScheme::reversed(Colormap::Viridis));
        assert!(serde_json::from_str::<ColorScheme>("\"nope\"").is_err());
    }

    #[test]
    fn test_hues_are_distinct() {
        let hues = ColorScheme::new(Colormap::Hues).sample(6, 0.0, 1.0);
        for i in 0..hues.len() {
            for j in (i + 1)..hues.len() {
                assert_ne!(hues[i], hues[j]);
            }
        }
    }

    #[test]
    fn test_dash_cycle_repeats_every_four() {
        let styles = line_styles(6, ColorScheme::LINES);
        let dashes: Vec<DashStyle> = styles.iter().map(|s| s.dash).collect();
        assert_eq!(
            dashes,
            [
                DashStyle::Solid,
                DashStyle::Dashed,
                DashStyle::DashDot,
                DashStyle::Dotted,
                DashStyle::Solid,
                DashStyle::Dashed,
            ]
        );
        // The fifth line reuses the first dash but not its colour.
        assert_ne!(styles[0].color, styles[4].color);
    }

    #[test]
    fn test_single_line_takes_scheme_start() {
        let styles = line_styles(1, ColorScheme::LINES);
        assert_eq!(styles[0].color, ColorScheme::LINES.at(0.0));
    }

    #[test]
    fn test_band_colors_skip_low_end() {
        let scheme = ColorScheme::BANDS;
        let colors = band_colors(3, scheme);
        assert_eq!(colors.len(), 3);
        assert_eq!(colors[0], scheme.at(0.1));
        assert_eq!(colors[2], scheme.at(1.0));
        assert_ne!(colors[0], scheme.at(0.0));
        assert!(band_colors(0, scheme).is_empty());
    }
}
