//! The drawing surface a recipe lays its panels out on.
//!
//! `Canvas` is the seam between the recipe interpreter and whatever turns
//! panels into pixels. Layout is matplotlib-like: a `Grid` of rows and
//! columns with optional size ratios, `Region`s spanning one or more cells,
//! and figure-level `Spacing` in figure fractions.

use crate::error::{FigureError, Result};
use crate::models::{Field3, History, Snapshot};
use crate::options::DisplayOptions;
use crate::slices::Cell;
use crate::variables::FieldExpr;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    pub height_ratios: Vec<f64>,
    pub width_ratios: Vec<f64>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            height_ratios: vec![1.0; rows],
            width_ratios: vec![1.0; cols],
        }
    }

    pub fn with_height_ratios(mut self, ratios: &[f64]) -> Result<Self> {
        self.height_ratios = checked_ratios("height", ratios, self.rows)?;
        Ok(self)
    }

    pub fn with_width_ratios(mut self, ratios: &[f64]) -> Result<Self> {
        self.width_ratios = checked_ratios("width", ratios, self.cols)?;
        Ok(self)
    }

    pub fn capacity(&self) -> usize {
        self.rows * self.cols
    }

    /// Single cell by 1-based, row-major index.
    pub fn cell(&self, index: usize) -> Result<Region> {
        if index == 0 || index > self.capacity() {
            return Err(FigureError::GridOverflow {
                index,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let (r, c) = ((index - 1) / self.cols, (index - 1) % self.cols);
        self.span(r..r + 1, c..c + 1)
    }

    /// Full-width region covering one row.
    pub fn row(&self, row: usize) -> Result<Region> {
        self.span(row..row + 1, 0..self.cols)
    }

    pub fn span(&self, rows: Range<usize>, cols: Range<usize>) -> Result<Region> {
        if rows.is_empty() || cols.is_empty() || rows.end > self.rows || cols.end > self.cols {
            return Err(FigureError::GridOverflow {
                index: rows.end.max(1) * cols.end.max(1),
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(Region {
            grid: self.clone(),
            rows,
            cols,
        })
    }
}

/// Cells of one grid occupied by an axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub grid: Grid,
    pub rows: Range<usize>,
    pub cols: Range<usize>,
}

impl Region {
    /// Placement in figure fractions, origin top-left.
    pub fn rect(&self, spacing: &Spacing) -> Rect {
        let xs = positions(
            spacing.left,
            spacing.right - spacing.left,
            spacing.wspace,
            &self.grid.width_ratios,
        );
        let ys = positions(
            1.0 - spacing.top,
            spacing.top - spacing.bottom,
            spacing.hspace,
            &self.grid.height_ratios,
        );
        Rect {
            x0: xs[self.cols.start].0,
            x1: xs[self.cols.end - 1].1,
            y0: ys[self.rows.start].0,
            y1: ys[self.rows.end - 1].1,
        }
    }

    /// Short `r0:r1,c0:c1` form used in layout listings.
    pub fn describe(&self) -> String {
        format!(
            "{}x{}[{}:{},{}:{}]",
            self.grid.rows,
            self.grid.cols,
            self.rows.start,
            self.rows.end,
            self.cols.start,
            self.cols.end
        )
    }
}

/// `(start, end)` of every track along one direction.
fn positions(start: f64, len: f64, space: f64, ratios: &[f64]) -> Vec<(f64, f64)> {
    let n = ratios.len();
    if n == 0 {
        return Vec::new();
    }
    let cell = len / (n as f64 + space * (n as f64 - 1.0));
    let sep = space * cell;
    let total: f64 = ratios.iter().sum();
    let norm = if total > 0.0 { cell * n as f64 / total } else { 0.0 };
    let mut pos = start;
    let mut out = Vec::with_capacity(n);
    for (i, r) in ratios.iter().enumerate() {
        if i > 0 {
            pos += sep;
        }
        let s = pos;
        pos += r * norm;
        out.push((s, pos));
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

/// Figure margins and gaps, matplotlib's `subplots_adjust` parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacing {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
    pub wspace: f64,
    pub hspace: f64,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            left: 0.125,
            right: 0.9,
            bottom: 0.11,
            top: 0.88,
            wspace: 0.2,
            hspace: 0.2,
        }
    }
}

/// Partial spacing change; unset fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpacingAdjust {
    pub left: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
    pub top: Option<f64>,
    pub wspace: Option<f64>,
    pub hspace: Option<f64>,
}

impl SpacingAdjust {
    /// No margins and no gaps.
    pub fn flush() -> Self {
        Self {
            left: Some(0.0),
            right: Some(1.0),
            bottom: Some(0.0),
            top: Some(1.0),
            wspace: Some(0.0),
            hspace: Some(0.0),
        }
    }

    pub fn apply(&self, s: &Spacing) -> Spacing {
        Spacing {
            left: self.left.unwrap_or(s.left),
            right: self.right.unwrap_or(s.right),
            bottom: self.bottom.unwrap_or(s.bottom),
            top: self.top.unwrap_or(s.top),
            wspace: self.wspace.unwrap_or(s.wspace),
            hspace: self.hspace.unwrap_or(s.hspace),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AxesId(pub usize);

/// An evaluated field handed to the slice primitives.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Expression text, e.g. `log10(UU/RHO)`.
    pub source: String,
    /// Panel title.
    pub label: String,
    pub field: Field3,
}

impl Layer {
    pub fn evaluate(snap: &Snapshot, expr: &FieldExpr, opts: &DisplayOptions) -> Result<Self> {
        Ok(Self {
            source: expr.to_string(),
            label: opts.label.clone().unwrap_or_else(|| expr.label()),
            field: expr.evaluate(snap)?,
        })
    }
}

/// Plotting primitives a recipe composes.
pub trait Canvas {
    fn axes_count(&self) -> usize;

    fn add_axes(&mut self, region: Region) -> Result<AxesId>;

    /// Poloidal slice (x-z plane).
    fn plot_xz(
        &mut self,
        ax: AxesId,
        snap: &Snapshot,
        layer: &Layer,
        opts: &DisplayOptions,
    ) -> Result<()>;

    /// Equatorial slice (x-y plane).
    fn plot_xy(
        &mut self,
        ax: AxesId,
        snap: &Snapshot,
        layer: &Layer,
        opts: &DisplayOptions,
    ) -> Result<()>;

    /// Shell at radial index `i`, theta against phi.
    fn plot_thphi(
        &mut self,
        ax: AxesId,
        snap: &Snapshot,
        layer: &Layer,
        i: usize,
        opts: &DisplayOptions,
    ) -> Result<()>;

    /// Scalar history series, with a marker at `tline` when given.
    fn plot_hst(
        &mut self,
        ax: AxesId,
        history: &History,
        series: &str,
        tline: Option<f64>,
        opts: &DisplayOptions,
    ) -> Result<()>;

    /// Pre-computed quad mesh.
    fn plot_mesh(
        &mut self,
        ax: AxesId,
        source: &str,
        cells: Vec<Cell>,
        opts: &DisplayOptions,
    ) -> Result<()>;

    /// Plain `y(x)` line.
    fn plot_profile(
        &mut self,
        ax: AxesId,
        source: &str,
        x: &[f64],
        y: &[f64],
        opts: &DisplayOptions,
    ) -> Result<()>;

    /// Turn off frame, ticks and axis labels.
    fn hide_axes(&mut self, ax: AxesId) -> Result<()>;

    fn subplots_adjust(&mut self, adjust: &SpacingAdjust);

    fn set_title(&mut self, title: &str);
}

/// One positive ratio per track.
fn checked_ratios(kind: &str, ratios: &[f64], tracks: usize) -> Result<Vec<f64>> {
    if ratios.len() != tracks || ratios.iter().any(|r| r.is_nan() || *r <= 0.0) {
        return Err(FigureError::ShapeMismatch(format!(
            "{} {kind} ratios for {tracks} tracks: {ratios:?}",
            ratios.len()
        )));
    }
    Ok(ratios.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_row_major_and_one_based() {
        let g = Grid::new(2, 4);
        let r = g.cell(1).unwrap();
        assert_eq!((r.rows, r.cols), (0..1, 0..1));
        let r = g.cell(6).unwrap();
        assert_eq!((r.rows, r.cols), (1..2, 1..2));
        assert!(matches!(
            g.cell(9),
            Err(FigureError::GridOverflow { index: 9, rows: 2, cols: 4 })
        ));
        assert!(g.cell(0).is_err());
    }

    #[test]
    fn flush_spacing_tiles_the_figure() {
        let g = Grid::new(1, 2);
        let s = SpacingAdjust::flush().apply(&Spacing::default());
        let a = g.cell(1).unwrap().rect(&s);
        let b = g.cell(2).unwrap().rect(&s);
        assert!((a.x0 - 0.0).abs() < 1e-12);
        assert!((a.x1 - 0.5).abs() < 1e-12);
        assert!((b.x0 - 0.5).abs() < 1e-12);
        assert!((b.x1 - 1.0).abs() < 1e-12);
        assert!((a.y0 - 0.0).abs() < 1e-12 && (a.y1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ratios_scale_tracks() {
        let g = Grid::new(3, 2).with_height_ratios(&[4.0, 1.0, 1.0]).unwrap();
        let s = SpacingAdjust::flush().apply(&Spacing::default());
        let top = g.row(0).unwrap().rect(&s);
        let mid = g.row(1).unwrap().rect(&s);
        assert!(((top.y1 - top.y0) - 4.0 * (mid.y1 - mid.y0)).abs() < 1e-12);
        assert!((top.x1 - top.x0 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mistyped_ratios_are_errors() {
        assert!(matches!(
            Grid::new(3, 2).with_height_ratios(&[4.0, 1.0]),
            Err(FigureError::ShapeMismatch(_))
        ));
        assert!(Grid::new(2, 2).with_width_ratios(&[1.0, 0.0]).is_err());
        assert!(Grid::new(2, 2).with_width_ratios(&[16.0, 17.0]).is_ok());
    }

    #[test]
    fn spans_must_fit() {
        let g = Grid::new(2, 2);
        assert!(g.span(1..2, 0..2).is_ok());
        assert!(g.span(1..3, 0..2).is_err());
        assert!(g.row(2).is_err());
    }
}
