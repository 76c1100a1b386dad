use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::dash::dash_segments;
use crate::color::LineStyle;

// ---------------------------------------------------------------------------
// Legend panel (right of the chart)
// ---------------------------------------------------------------------------

/// What the swatch next to a legend label looks like.
#[derive(Debug, Clone, PartialEq)]
pub enum Swatch {
    Line { style: LineStyle, width: u32 },
    Band { color: RGBColor, alpha: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub swatch: Swatch,
}

const COLUMNS: usize = 2;
const ROW_HEIGHT: i32 = 30;
const SWATCH_WIDTH: i32 = 44;
const SWATCH_GAP: i32 = 8;

/// Number of rows a column-major layout of `n` entries needs.
pub fn legend_rows(n: usize) -> usize {
    n.div_ceil(COLUMNS)
}

/// Draw entries column-major in two columns, centred vertically.
pub fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    entries: &[LegendEntry],
    font_family: &str,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    if entries.is_empty() {
        return Ok(());
    }

    let (width, height) = area.dim_in_pixel();
    let rows = legend_rows(entries.len()) as i32;
    let column_width = width as i32 / COLUMNS as i32;
    let top = (height as i32 - rows * ROW_HEIGHT).max(0) / 2 + ROW_HEIGHT / 2;

    let text_style = TextStyle::from((font_family, 16).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));

    let frame_bottom = top + (rows - 1) * ROW_HEIGHT + ROW_HEIGHT / 2;
    area.draw(&Rectangle::new(
        [(4, top - ROW_HEIGHT / 2 - 4), (width as i32 - 4, frame_bottom + 4)],
        BLACK.mix(0.3).stroke_width(1),
    ))?;

    for (i, entry) in entries.iter().enumerate() {
        let col = i as i32 / rows;
        let row = i as i32 % rows;
        let x = 12 + col * column_width;
        let y = top + row * ROW_HEIGHT;

        match &entry.swatch {
            Swatch::Line { style, width } => {
                let sample = [(x as f64, y as f64), ((x + SWATCH_WIDTH) as f64, y as f64)];
                let pattern: Vec<f64> = style
                    .dash
                    .pattern()
                    .iter()
                    .map(|len| len * *width as f64)
                    .collect();
                for seg in dash_segments(&sample, &pattern, |p| p) {
                    let pixels: Vec<(i32, i32)> = seg
                        .iter()
                        .map(|&(px, py)| (px.round() as i32, py.round() as i32))
                        .collect();
                    area.draw(&PathElement::new(
                        pixels,
                        style.color.stroke_width(*width),
                    ))?;
                }
            }
            Swatch::Band { color, alpha } => {
                area.draw(&Rectangle::new(
                    [(x, y - ROW_HEIGHT / 3), (x + SWATCH_WIDTH, y + ROW_HEIGHT / 3)],
                    color.mix(*alpha).filled(),
                ))?;
            }
        }

        area.draw(&Text::new(
            entry.label.clone(),
            (x + SWATCH_WIDTH + SWATCH_GAP, y),
            text_style.clone(),
        ))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legend_rows() {
        assert_eq!(legend_rows(0), 0);
        assert_eq!(legend_rows(1), 1);
        assert_eq!(legend_rows(4), 2);
        assert_eq!(legend_rows(5), 3);
    }
}
