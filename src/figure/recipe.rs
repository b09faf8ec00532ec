//! Declarative figure recipes and the interpreter that draws them.
//!
//! A recipe is a grid layout plus a list of panels. Drawing happens in two
//! passes: every panel is first resolved against the snapshot and history
//! (field lookups, derived expressions, option merging), then the resolved
//! panels are put on the canvas. Missing data therefore fails the call before
//! the canvas is touched.

use log::debug;

use super::canvas::{Canvas, Layer, Region, SpacingAdjust};
use crate::error::{FigureError, Result};
use crate::models::{History, Snapshot};
use crate::options::{DisplayOptions, Override};
use crate::slices::{self, Cell, PatchSpec};
use crate::variables::{FieldExpr, i_of};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlicePlane {
    Xz,
    Xy,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    /// One slice on one axes.
    Slice {
        region: Region,
        plane: SlicePlane,
        expr: FieldExpr,
        overrides: Vec<Override>,
        hide_axes: bool,
    },
    /// Poloidal and equatorial slices of the same field, side by side.
    SlicePair {
        xz: Region,
        xy: Region,
        expr: FieldExpr,
        overrides: Vec<Override>,
    },
    /// History series with a marker at the snapshot time.
    History {
        region: Region,
        series: String,
        overrides: Vec<Override>,
    },
    /// Theta-phi shell at the radius given by the `radius` option.
    ThetaPhi {
        region: Region,
        expr: FieldExpr,
        overrides: Vec<Override>,
    },
    /// Raw native-coordinate sub-block of a stored field.
    Patch {
        region: Region,
        field: String,
        spec: PatchSpec,
        overrides: Vec<Override>,
    },
    /// Sum over theta and phi, plotted against radius.
    Profile {
        region: Region,
        expr: FieldExpr,
        overrides: Vec<Override>,
    },
}

impl Panel {
    pub fn regions(&self) -> Vec<&Region> {
        match self {
            Panel::SlicePair { xz, xy, .. } => vec![xz, xy],
            Panel::Slice { region, .. }
            | Panel::History { region, .. }
            | Panel::ThetaPhi { region, .. }
            | Panel::Patch { region, .. }
            | Panel::Profile { region, .. } => vec![region],
        }
    }

    /// One-line summary for layout listings.
    pub fn describe(&self) -> String {
        let at = self
            .regions()
            .iter()
            .map(|r| r.describe())
            .collect::<Vec<_>>()
            .join(" + ");
        match self {
            Panel::Slice { plane, expr, .. } => format!("{at}  {plane:?} slice of {expr}"),
            Panel::SlicePair { expr, .. } => format!("{at}  Xz/Xy slices of {expr}"),
            Panel::History { series, .. } => format!("{at}  history of {series}"),
            Panel::ThetaPhi { expr, .. } => format!("{at}  theta-phi shell of {expr}"),
            Panel::Patch { field, spec, .. } => format!(
                "{at}  raw {field}[..{}, ..{}, {}]",
                spec.r_max, spec.th_max, spec.phi
            ),
            Panel::Profile { expr, .. } => format!("{at}  radial profile of {expr}"),
        }
    }
}

/// Figure title computed from the snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum TitleSpec {
    Fixed(String),
    /// `t = <int t>, <caption>: <cells where field > 0>`
    FlagTotal { field: String, caption: String },
}

impl TitleSpec {
    pub fn render(&self, snap: &Snapshot) -> Result<String> {
        match self {
            TitleSpec::Fixed(s) => Ok(s.clone()),
            TitleSpec::FlagTotal { field, caption } => {
                let hits = crate::stats::count_positive(snap.field(field)?);
                Ok(format!("t = {}, {caption}: {hits}", snap.t as i64))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub name: String,
    pub about: String,
    /// Applied to the caller's options before any panel override.
    pub base: Vec<Override>,
    pub panels: Vec<Panel>,
    pub spacing: Option<SpacingAdjust>,
    pub title: Option<TitleSpec>,
}

/// A panel with its data looked up and options merged.
enum Resolved<'a> {
    Slice {
        region: &'a Region,
        plane: SlicePlane,
        layer: Layer,
        opts: DisplayOptions,
        hide_axes: bool,
    },
    Pair {
        xz: &'a Region,
        xy: &'a Region,
        layer: Layer,
        opts: DisplayOptions,
    },
    History {
        region: &'a Region,
        series: &'a str,
        opts: DisplayOptions,
    },
    ThetaPhi {
        region: &'a Region,
        layer: Layer,
        index: usize,
        opts: DisplayOptions,
    },
    Patch {
        region: &'a Region,
        field: &'a str,
        cells: Vec<Cell>,
        opts: DisplayOptions,
    },
    Profile {
        region: &'a Region,
        source: String,
        x: Vec<f64>,
        y: Vec<f64>,
        opts: DisplayOptions,
    },
}

impl Recipe {
    pub fn new(name: impl Into<String>, about: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            about: about.into(),
            base: Vec::new(),
            panels: Vec::new(),
            spacing: None,
            title: None,
        }
    }

    pub fn with_base(mut self, base: Vec<Override>) -> Self {
        self.base = base;
        self
    }

    pub fn panel(mut self, panel: Panel) -> Self {
        self.panels.push(panel);
        self
    }

    pub fn with_spacing(mut self, spacing: SpacingAdjust) -> Self {
        self.spacing = Some(spacing);
        self
    }

    pub fn with_title(mut self, title: TitleSpec) -> Self {
        self.title = Some(title);
        self
    }

    /// Number of views (a slice pair counts once).
    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    /// Number of axes the recipe creates.
    pub fn axes_count(&self) -> usize {
        self.panels.iter().map(|p| p.regions().len()).sum()
    }

    pub fn uses_history(&self) -> bool {
        self.panels
            .iter()
            .any(|p| matches!(p, Panel::History { .. }))
    }

    /// Lay out every panel on `canvas` and hand the canvas back.
    ///
    /// `options` is never modified; each panel works on its own derived copy.
    /// The canvas must be empty.
    pub fn produce<'c, C: Canvas + ?Sized>(
        &self,
        canvas: &'c mut C,
        snap: &Snapshot,
        history: Option<&History>,
        options: &DisplayOptions,
    ) -> Result<&'c mut C> {
        let existing = canvas.axes_count();
        if existing > 0 {
            return Err(FigureError::CanvasNotEmpty(existing));
        }

        let base = options.with(&self.base);
        let resolved = self
            .panels
            .iter()
            .map(|p| self.resolve(p, snap, history, &base))
            .collect::<Result<Vec<_>>>()?;
        let title = self
            .title
            .as_ref()
            .map(|t| t.render(snap))
            .transpose()?;

        for (n, panel) in resolved.into_iter().enumerate() {
            debug!("{}: drawing panel {}", self.name, n + 1);
            draw(canvas, panel, snap, history)?;
        }
        if let Some(adjust) = &self.spacing {
            canvas.subplots_adjust(adjust);
        }
        if let Some(title) = title {
            canvas.set_title(&title);
        }
        Ok(canvas)
    }

    fn resolve<'a>(
        &self,
        panel: &'a Panel,
        snap: &Snapshot,
        history: Option<&History>,
        base: &DisplayOptions,
    ) -> Result<Resolved<'a>> {
        Ok(match panel {
            Panel::Slice {
                region,
                plane,
                expr,
                overrides,
                hide_axes,
            } => {
                let opts = base.with(overrides);
                Resolved::Slice {
                    region,
                    plane: *plane,
                    layer: Layer::evaluate(snap, expr, &opts)?,
                    opts,
                    hide_axes: *hide_axes,
                }
            }
            Panel::SlicePair {
                xz,
                xy,
                expr,
                overrides,
            } => {
                let opts = base.with(overrides);
                Resolved::Pair {
                    xz,
                    xy,
                    layer: Layer::evaluate(snap, expr, &opts)?,
                    opts,
                }
            }
            Panel::History {
                region,
                series,
                overrides,
            } => {
                let history =
                    history.ok_or_else(|| FigureError::MissingHistory(self.name.clone()))?;
                history.series(series)?;
                Resolved::History {
                    region,
                    series,
                    opts: base.with(overrides),
                }
            }
            Panel::ThetaPhi {
                region,
                expr,
                overrides,
            } => {
                let opts = base.with(overrides);
                let radius = opts.radius.ok_or(FigureError::MissingOption("radius"))?;
                let index = i_of(&snap.radii(), radius).ok_or_else(|| {
                    FigureError::ShapeMismatch("snapshot has an empty radial axis".into())
                })?;
                Resolved::ThetaPhi {
                    region,
                    layer: Layer::evaluate(snap, expr, &opts)?,
                    index,
                    opts,
                }
            }
            Panel::Patch {
                region,
                field,
                spec,
                overrides,
            } => {
                let opts = base.with(overrides);
                let cells = slices::native_patch(snap, snap.field(field)?, spec, &opts)?;
                Resolved::Patch {
                    region,
                    field,
                    cells,
                    opts,
                }
            }
            Panel::Profile {
                region,
                expr,
                overrides,
            } => {
                let opts = base.with(overrides);
                let field = expr.evaluate(snap)?;
                Resolved::Profile {
                    region,
                    source: expr.to_string(),
                    x: snap.radii(),
                    y: field.shell_sum(),
                    opts,
                }
            }
        })
    }
}

fn draw<C: Canvas + ?Sized>(
    canvas: &mut C,
    panel: Resolved<'_>,
    snap: &Snapshot,
    history: Option<&History>,
) -> Result<()> {
    match panel {
        Resolved::Slice {
            region,
            plane,
            layer,
            opts,
            hide_axes,
        } => {
            let ax = canvas.add_axes(region.clone())?;
            match plane {
                SlicePlane::Xz => canvas.plot_xz(ax, snap, &layer, &opts)?,
                SlicePlane::Xy => canvas.plot_xy(ax, snap, &layer, &opts)?,
            }
            if hide_axes {
                canvas.hide_axes(ax)?;
            }
        }
        Resolved::Pair {
            xz,
            xy,
            layer,
            opts,
        } => {
            let a = canvas.add_axes(xz.clone())?;
            let b = canvas.add_axes(xy.clone())?;
            canvas.plot_xz(a, snap, &layer, &opts)?;
            canvas.plot_xy(b, snap, &layer, &opts)?;
        }
        Resolved::History {
            region,
            series,
            opts,
        } => {
            let ax = canvas.add_axes(region.clone())?;
            // presence was checked while resolving
            if let Some(history) = history {
                canvas.plot_hst(ax, history, series, Some(snap.t), &opts)?;
            }
        }
        Resolved::ThetaPhi {
            region,
            layer,
            index,
            opts,
        } => {
            let ax = canvas.add_axes(region.clone())?;
            canvas.plot_thphi(ax, snap, &layer, index, &opts)?;
        }
        Resolved::Patch {
            region,
            field,
            cells,
            opts,
        } => {
            let ax = canvas.add_axes(region.clone())?;
            canvas.plot_mesh(ax, field, cells, &opts)?;
        }
        Resolved::Profile {
            region,
            source,
            x,
            y,
            opts,
        } => {
            let ax = canvas.add_axes(region.clone())?;
            canvas.plot_profile(ax, &source, &x, &y, &opts)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::canvas::Grid;
    use crate::figure::scene::Figure;
    use crate::models::Field3;

    fn snap() -> Snapshot {
        let shape = [4, 4, 4];
        Snapshot::new(12.7, shape)
            .with_field("rho", Field3::filled(shape, 1.0))
            .unwrap()
            .with_field(
                "fflag",
                Field3::from_fn(shape, |i, _, k| if i == 0 && k < 2 { 3.0 } else { 0.0 }),
            )
            .unwrap()
    }

    fn one_slice(expr: &str) -> Recipe {
        Recipe::new("one", "single slice").panel(Panel::Slice {
            region: Grid::new(1, 1).cell(1).unwrap(),
            plane: SlicePlane::Xz,
            expr: FieldExpr::named(expr),
            overrides: vec![],
            hide_axes: false,
        })
    }

    #[test]
    fn refuses_a_used_canvas() {
        let s = snap();
        let mut fig = Figure::new();
        one_slice("rho")
            .produce(&mut fig, &s, None, &DisplayOptions::default())
            .unwrap();
        let err = one_slice("rho")
            .produce(&mut fig, &s, None, &DisplayOptions::default())
            .unwrap_err();
        assert!(matches!(err, FigureError::CanvasNotEmpty(1)));
    }

    #[test]
    fn missing_field_leaves_canvas_untouched() {
        let s = snap();
        let mut fig = Figure::new();
        let recipe = one_slice("rho").panel(Panel::Slice {
            region: Grid::new(1, 1).cell(1).unwrap(),
            plane: SlicePlane::Xy,
            expr: FieldExpr::named("bsq"),
            overrides: vec![],
            hide_axes: false,
        });
        let err = recipe
            .produce(&mut fig, &s, None, &DisplayOptions::default())
            .unwrap_err();
        assert!(matches!(err, FigureError::MissingField(n) if n == "bsq"));
        assert_eq!(fig.axes_count(), 0);
    }

    #[test]
    fn history_panels_need_history() {
        let s = snap();
        let recipe = Recipe::new("hst", "history only").panel(Panel::History {
            region: Grid::new(1, 1).cell(1).unwrap(),
            series: "Mdot".into(),
            overrides: vec![],
        });
        assert!(recipe.uses_history());
        let err = recipe
            .produce(&mut Figure::new(), &s, None, &DisplayOptions::default())
            .unwrap_err();
        assert!(matches!(err, FigureError::MissingHistory(_)));

        let h = History::new(vec![0.0, 1.0]);
        let err = recipe
            .produce(&mut Figure::new(), &s, Some(&h), &DisplayOptions::default())
            .unwrap_err();
        assert!(matches!(err, FigureError::MissingSeries(n) if n == "Mdot"));
    }

    #[test]
    fn flag_total_title() {
        let s = snap();
        let title = TitleSpec::FlagTotal {
            field: "fflag".into(),
            caption: "Total floor hits".into(),
        };
        assert_eq!(title.render(&s).unwrap(), "t = 12, Total floor hits: 8");
    }

    #[test]
    fn theta_phi_needs_radius() {
        let s = snap();
        let recipe = Recipe::new("shell", "").panel(Panel::ThetaPhi {
            region: Grid::new(1, 1).cell(1).unwrap(),
            expr: FieldExpr::named("rho"),
            overrides: vec![],
        });
        let err = recipe
            .produce(&mut Figure::new(), &s, None, &DisplayOptions::default())
            .unwrap_err();
        assert!(matches!(err, FigureError::MissingOption("radius")));

        let opts = DisplayOptions {
            radius: Some(2.5),
            ..DisplayOptions::default()
        };
        let mut fig = Figure::new();
        recipe.produce(&mut fig, &s, None, &opts).unwrap();
        assert_eq!(fig.populated_axes(), 1);
    }
}
