//! In-memory canvas: keeps axes, evaluated meshes and lines so a figure can
//! be inspected or handed to `viz` for rasterization.

use log::debug;

use super::canvas::{AxesId, Canvas, Layer, Region, Spacing, SpacingAdjust};
use crate::error::{FigureError, Result};
use crate::models::{History, Snapshot};
use crate::options::{DisplayOptions, Ticks};
use crate::slices::{self, Cell};
use crate::variables::pretty;

pub const DEFAULT_CMAP: &str = "jet";

#[derive(Debug, Clone, PartialEq)]
pub enum Artist {
    Mesh {
        source: String,
        cells: Vec<Cell>,
        vmin: f64,
        vmax: f64,
        cmap: String,
        /// Keep x and y scales equal (spatial slices).
        equal_aspect: bool,
    },
    Line {
        source: String,
        points: Vec<(f64, f64)>,
        /// Vertical marker, e.g. the current snapshot time.
        marker: Option<f64>,
    },
}

impl Artist {
    pub fn source(&self) -> &str {
        match self {
            Artist::Mesh { source, .. } | Artist::Line { source, .. } => source,
        }
    }
}

/// Axis decorations resolved from the display options at draw time.
#[derive(Debug, Clone, PartialEq)]
pub struct Decor {
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
    pub xticks: bool,
    pub yticks: bool,
    pub xticklabels: bool,
    pub cbar: bool,
    pub frame: bool,
}

impl Default for Decor {
    fn default() -> Self {
        Self {
            xlabel: None,
            ylabel: None,
            xticks: true,
            yticks: true,
            xticklabels: true,
            cbar: false,
            frame: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Axes {
    pub region: Region,
    pub title: Option<String>,
    pub artists: Vec<Artist>,
    pub decor: Decor,
    pub visible: bool,
}

/// A figure under construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Figure {
    axes: Vec<Axes>,
    spacing: Spacing,
    title: Option<String>,
}

impl Figure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn axes(&self) -> &[Axes] {
        &self.axes
    }

    pub fn spacing(&self) -> Spacing {
        self.spacing
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Axes holding at least one artist.
    pub fn populated_axes(&self) -> usize {
        self.axes.iter().filter(|a| !a.artists.is_empty()).count()
    }

    fn axes_mut(&mut self, ax: AxesId) -> Result<&mut Axes> {
        self.axes
            .get_mut(ax.0)
            .ok_or(FigureError::UnknownAxes(ax.0))
    }

    #[allow(clippy::too_many_arguments)]
    fn push_mesh(
        &mut self,
        ax: AxesId,
        source: &str,
        label: &str,
        cells: Vec<Cell>,
        opts: &DisplayOptions,
        axis_names: (&str, &str),
        equal_aspect: bool,
    ) -> Result<()> {
        let (vmin, vmax) = color_range(&cells, opts);
        debug!(
            "axes {}: mesh '{source}' with {} cells, range [{vmin}, {vmax}]",
            ax.0,
            cells.len()
        );
        let axes = self.axes_mut(ax)?;
        axes.title = Some(label.to_string()).filter(|l| !l.is_empty());
        axes.decor = decor(opts, axis_names, opts.cbar);
        axes.artists.push(Artist::Mesh {
            source: source.to_string(),
            cells,
            vmin,
            vmax,
            cmap: opts.cmap.clone().unwrap_or_else(|| DEFAULT_CMAP.to_string()),
            equal_aspect,
        });
        Ok(())
    }
}

fn decor(opts: &DisplayOptions, names: (&str, &str), cbar: bool) -> Decor {
    Decor {
        xlabel: opts.xlabel.then(|| names.0.to_string()),
        ylabel: opts.ylabel.then(|| names.1.to_string()),
        xticks: opts.xticks == Ticks::Auto,
        yticks: opts.yticks == Ticks::Auto,
        xticklabels: opts.xticklabels,
        cbar,
        frame: opts.frame,
    }
}

/// `vmin`/`vmax` from the options, else the finite data range.
fn color_range(cells: &[Cell], opts: &DisplayOptions) -> (f64, f64) {
    let mut finite = cells.iter().map(|c| c.value).filter(|v| v.is_finite());
    let (lo, hi) = match finite.next() {
        Some(first) => finite.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))),
        None => (0.0, 1.0),
    };
    let vmin = opts.vmin.unwrap_or(lo);
    let vmax = opts.vmax.unwrap_or(hi);
    if (vmax - vmin).abs() < f64::EPSILON {
        (vmin - 0.5, vmax + 0.5)
    } else {
        (vmin, vmax)
    }
}

type AxisNames = (&'static str, &'static str);

fn plane_names(opts: &DisplayOptions, native: AxisNames, projected: AxisNames) -> AxisNames {
    if opts.native { native } else { projected }
}

impl Canvas for Figure {
    fn axes_count(&self) -> usize {
        self.axes.len()
    }

    fn add_axes(&mut self, region: Region) -> Result<AxesId> {
        self.axes.push(Axes {
            region,
            title: None,
            artists: Vec::new(),
            decor: Decor::default(),
            visible: true,
        });
        Ok(AxesId(self.axes.len() - 1))
    }

    fn plot_xz(
        &mut self,
        ax: AxesId,
        snap: &Snapshot,
        layer: &Layer,
        opts: &DisplayOptions,
    ) -> Result<()> {
        let cells = slices::poloidal(snap, &layer.field, opts)?;
        let names = plane_names(opts, ("X1", "X2"), ("x", "z"));
        self.push_mesh(ax, &layer.source, &layer.label, cells, opts, names, !opts.native)
    }

    fn plot_xy(
        &mut self,
        ax: AxesId,
        snap: &Snapshot,
        layer: &Layer,
        opts: &DisplayOptions,
    ) -> Result<()> {
        let cells = slices::midplane(snap, &layer.field, opts)?;
        let names = plane_names(opts, ("X1", "X3"), ("x", "y"));
        self.push_mesh(ax, &layer.source, &layer.label, cells, opts, names, !opts.native)
    }

    fn plot_thphi(
        &mut self,
        ax: AxesId,
        snap: &Snapshot,
        layer: &Layer,
        i: usize,
        opts: &DisplayOptions,
    ) -> Result<()> {
        let cells = slices::shell(snap, &layer.field, i, opts)?;
        self.push_mesh(ax, &layer.source, &layer.label, cells, opts, ("φ", "θ"), false)
    }

    fn plot_hst(
        &mut self,
        ax: AxesId,
        history: &History,
        series: &str,
        tline: Option<f64>,
        opts: &DisplayOptions,
    ) -> Result<()> {
        let ys = history.series(series)?;
        let points = history
            .times()
            .iter()
            .copied()
            .zip(ys.iter().copied())
            .collect();
        let ylabel = pretty(series);
        let axes = self.axes_mut(ax)?;
        axes.title = opts.label.clone();
        axes.decor = decor(opts, ("t", ylabel.as_str()), false);
        axes.artists.push(Artist::Line {
            source: series.to_string(),
            points,
            marker: tline,
        });
        Ok(())
    }

    fn plot_mesh(
        &mut self,
        ax: AxesId,
        source: &str,
        cells: Vec<Cell>,
        opts: &DisplayOptions,
    ) -> Result<()> {
        let label = opts.label.clone().unwrap_or_else(|| pretty(source));
        self.push_mesh(ax, source, &label, cells, opts, ("X1", "X2"), false)
    }

    fn plot_profile(
        &mut self,
        ax: AxesId,
        source: &str,
        x: &[f64],
        y: &[f64],
        opts: &DisplayOptions,
    ) -> Result<()> {
        if x.len() != y.len() {
            return Err(FigureError::ShapeMismatch(format!(
                "profile '{source}': {} x values, {} y values",
                x.len(),
                y.len()
            )));
        }
        let points = x
            .iter()
            .copied()
            .zip(y.iter().copied())
            .filter(|(px, py)| match opts.window {
                Some([x0, x1, y0, y1]) => *px >= x0 && *px <= x1 && *py >= y0 && *py <= y1,
                None => true,
            })
            .collect();
        let axes = self.axes_mut(ax)?;
        axes.title = opts.label.clone();
        axes.decor = decor(opts, ("r", source), false);
        axes.artists.push(Artist::Line {
            source: source.to_string(),
            points,
            marker: None,
        });
        Ok(())
    }

    fn hide_axes(&mut self, ax: AxesId) -> Result<()> {
        self.axes_mut(ax)?.visible = false;
        Ok(())
    }

    fn subplots_adjust(&mut self, adjust: &SpacingAdjust) {
        self.spacing = adjust.apply(&self.spacing);
    }

    fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::canvas::Grid;
    use crate::models::Field3;
    use crate::variables::FieldExpr;

    fn snap() -> Snapshot {
        let shape = [4, 4, 4];
        Snapshot::new(1.0, shape)
            .with_field("rho", Field3::from_fn(shape, |i, _, _| (i + 1) as f64))
            .unwrap()
    }

    #[test]
    fn mesh_range_follows_options_or_data() {
        let s = snap();
        let mut fig = Figure::new();
        let a = fig.add_axes(Grid::new(1, 2).cell(1).unwrap()).unwrap();
        let b = fig.add_axes(Grid::new(1, 2).cell(2).unwrap()).unwrap();
        let opts = DisplayOptions::default();
        let layer = Layer::evaluate(&s, &FieldExpr::named("rho"), &opts).unwrap();
        fig.plot_xz(a, &s, &layer, &opts).unwrap();
        let fixed = opts.with(&[crate::options::Override::Vmin(-1.0)]);
        fig.plot_xy(b, &s, &layer, &fixed).unwrap();

        match &fig.axes()[0].artists[0] {
            Artist::Mesh { vmin, vmax, cmap, .. } => {
                assert_eq!((*vmin, *vmax), (1.0, 4.0));
                assert_eq!(cmap, DEFAULT_CMAP);
            }
            other => panic!("unexpected artist {other:?}"),
        }
        match &fig.axes()[1].artists[0] {
            Artist::Mesh { vmin, .. } => assert_eq!(*vmin, -1.0),
            other => panic!("unexpected artist {other:?}"),
        }
        assert_eq!(fig.axes()[0].title.as_deref(), Some("ρ"));
        assert_eq!(fig.populated_axes(), 2);
    }

    #[test]
    fn unknown_axes_is_an_error() {
        let s = snap();
        let mut fig = Figure::new();
        let opts = DisplayOptions::default();
        let layer = Layer::evaluate(&s, &FieldExpr::named("rho"), &opts).unwrap();
        assert!(matches!(
            fig.plot_xz(AxesId(3), &s, &layer, &opts),
            Err(FigureError::UnknownAxes(3))
        ));
    }

    #[test]
    fn spacing_adjust_is_partial() {
        let mut fig = Figure::new();
        fig.subplots_adjust(&SpacingAdjust {
            hspace: Some(0.25),
            ..SpacingAdjust::default()
        });
        assert_eq!(fig.spacing().hspace, 0.25);
        assert_eq!(fig.spacing().left, Spacing::default().left);
    }
}
