/// Rendering: validated request → scene → plotters backend.
///
/// ```text
///   PlotRequest + LineCatalog
///        │
///        ▼
///   ┌──────────┐
///   │  render   │  validate, compute tracks / extents / palette
///   └──────────┘
///        │
///        ├──► dash    pixel-space dash patterns along each track
///        └──► legend  two-column panel right of the chart
///        │
///        ▼
///   .svg / .png / .jpg / .bmp
/// ```

pub mod dash;
pub mod legend;
pub mod render;

pub use render::{CoveragePlotter, PlotRequest};
