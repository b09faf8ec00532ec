//! The standard figure set: one builder per named figure.
//!
//! Builders only assemble data; nothing here touches a snapshot.

use std::fmt;
use std::str::FromStr;

use super::canvas::{Grid, Region, SpacingAdjust};
use super::recipe::{Panel, Recipe, SlicePlane, TitleSpec};
use crate::error::{FigureError, Result};
use crate::flags::{self, FlagSet};
use crate::options::{Override, Ticks, bare, count_scale};
use crate::slices::PatchSpec;
use crate::variables::{FieldExpr, pretty};

/// Which slices a figure shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Poloidal,
    Toroidal,
    Both,
}

impl FromStr for View {
    type Err = FigureError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "poloidal" => Ok(View::Poloidal),
            "toroidal" => Ok(View::Toroidal),
            "both" => Ok(View::Both),
            _ => Err(FigureError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            View::Poloidal => "poloidal",
            View::Toroidal => "toroidal",
            View::Both => "both",
        })
    }
}

/// Knobs a few figures take. Unset fields use each figure's own default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeParams {
    pub view: Option<View>,
    pub var: Option<String>,
    pub log: Option<bool>,
    /// Strip labels, ticks and colorbars (`prims`).
    pub simple: Option<bool>,
    pub floor_flags: Option<FlagSet>,
    pub fail_codes: Option<FlagSet>,
}

fn slice(
    region: Region,
    plane: SlicePlane,
    expr: impl Into<FieldExpr>,
    overrides: Vec<Override>,
) -> Panel {
    Panel::Slice {
        region,
        plane,
        expr: expr.into(),
        overrides,
        hide_axes: false,
    }
}

fn pair(xz: Region, xy: Region, expr: impl Into<FieldExpr>, overrides: Vec<Override>) -> Panel {
    Panel::SlicePair {
        xz,
        xy,
        expr: expr.into(),
        overrides,
    }
}

fn hst(region: Region, series: &str, overrides: Vec<Override>) -> Panel {
    Panel::History {
        region,
        series: series.to_string(),
        overrides,
    }
}

fn thphi(region: Region, expr: impl Into<FieldExpr>, overrides: Vec<Override>) -> Panel {
    Panel::ThetaPhi {
        region,
        expr: expr.into(),
        overrides,
    }
}

fn label(s: &str) -> Override {
    Override::Label(s.to_string())
}

fn failures() -> FieldExpr {
    FieldExpr::Positive("pflag".into())
}

fn failure_overrides() -> Vec<Override> {
    let mut o = count_scale(20.0);
    o.extend([label("Failures"), Override::Sum(true)]);
    o
}

/// Log-variable movie without decorations. Poloidal and toroidal halves get
/// separate color scales, the toroidal one shifted up by 0.15.
pub fn simplest(view: View, var: &str) -> Result<Recipe> {
    let mut base = vec![Override::DefaultVmin(-6.0), Override::DefaultVmax(1.0), label("")];
    base.extend(bare());
    let shifted = vec![Override::ShiftRange(0.15)];

    let grid = match view {
        View::Both => Grid::new(1, 2),
        View::Poloidal | View::Toroidal => Grid::new(1, 1),
    };
    let mut panels = Vec::new();
    if matches!(view, View::Poloidal | View::Both) {
        panels.push((grid.cell(1)?, SlicePlane::Xz, vec![]));
    }
    if matches!(view, View::Toroidal | View::Both) {
        panels.push((grid.cell(panels.len() + 1)?, SlicePlane::Xy, shifted));
    }

    let mut recipe = Recipe::new("simplest", "log variable without colorbars, for outreach movies")
        .with_base(base)
        .with_spacing(SpacingAdjust::flush());
    for (region, plane, overrides) in panels {
        recipe = recipe.panel(Panel::Slice {
            region,
            plane,
            expr: FieldExpr::named(var),
            overrides,
            hide_axes: true,
        });
    }
    Ok(recipe)
}

pub fn simpler() -> Result<Recipe> {
    let gs = Grid::new(2, 2)
        .with_height_ratios(&[6.0, 1.0])?
        .with_width_ratios(&[16.0, 17.0])?;
    Ok(Recipe::new("simpler", "density slices and horizon magnetic flux")
        .panel(pair(gs.cell(1)?, gs.cell(2)?, "rho", vec![Override::Log(true)]))
        .panel(hst(gs.row(1)?, "phi_b", vec![])))
}

pub fn simple() -> Result<Recipe> {
    let gs = Grid::new(3, 2).with_height_ratios(&[4.0, 1.0, 1.0])?;
    Ok(Recipe::new("simple", "density slices, accretion rate and horizon flux")
        .panel(pair(gs.cell(1)?, gs.cell(2)?, "rho", vec![Override::Log(true)]))
        .panel(hst(
            gs.row(1)?,
            "Mdot",
            vec![Override::XLabel(false), Override::XTickLabels(false)],
        ))
        .panel(hst(gs.row(2)?, "phi_b", vec![]))
        .with_spacing(SpacingAdjust {
            hspace: Some(0.25),
            bottom: Some(0.05),
            top: Some(0.95),
            ..SpacingAdjust::default()
        }))
}

pub fn traditional() -> Result<Recipe> {
    let slc = Grid::new(2, 4);
    let flux = Grid::new(4, 2);
    let log = || vec![Override::Log(true)];
    Ok(Recipe::new("traditional", "rho, UU and beta slices with accretion histories")
        .panel(pair(slc.cell(1)?, slc.cell(2)?, "rho", log()))
        .panel(pair(
            slc.cell(3)?,
            slc.cell(4)?,
            "UU",
            vec![Override::Log(true), Override::YLabel(false)],
        ))
        .panel(pair(slc.cell(5)?, slc.cell(6)?, "beta", log()))
        .panel(hst(flux.cell(6)?, "Mdot", vec![Override::XTickLabels(false)]))
        .panel(hst(flux.cell(8)?, "phi_b", vec![]))
        .with_spacing(SpacingAdjust {
            hspace: Some(0.1),
            wspace: Some(0.23),
            left: Some(0.05),
            right: Some(0.95),
            bottom: Some(0.05),
            top: Some(0.95),
        }))
}

/// The eight primitive variables in one plane.
pub fn prims(log: bool, simple: bool, view: View) -> Result<Recipe> {
    let plane = match view {
        View::Poloidal => SlicePlane::Xz,
        View::Toroidal => SlicePlane::Xy,
        View::Both => {
            return Err(FigureError::UnsupportedView {
                recipe: "prims".into(),
                view: view.to_string(),
            });
        }
    };
    let slc = Grid::new(2, 4);
    let mut recipe = Recipe::new("prims", "all primitive variables");
    if simple {
        recipe = recipe.with_base(bare()).with_spacing(SpacingAdjust {
            top: Some(0.95),
            ..SpacingAdjust::flush()
        });
    }
    for (i, var) in ["RHO", "UU", "U1", "U2", "U3", "B1", "B2", "B3"]
        .into_iter()
        .enumerate()
    {
        recipe = recipe.panel(slice(slc.cell(i + 1)?, plane, var, vec![Override::Log(log)]));
    }
    Ok(recipe)
}

pub fn vecs_prim() -> Result<Recipe> {
    let slc = Grid::new(2, 4);
    let mut recipe = Recipe::new("vecs_prim", "averaged density with primitive vector components")
        .panel(pair(
            slc.cell(1)?,
            slc.cell(5)?,
            "rho",
            vec![Override::Log(true), Override::Average(true)],
        ));
    for (i, var) in [2, 3, 4, 6, 7, 8]
        .into_iter()
        .zip(["U1", "U2", "U3", "B1", "B2", "B3"])
    {
        recipe = recipe.panel(slice(slc.cell(i)?, SlicePlane::Xz, var, vec![Override::Log(true)]));
    }
    Ok(recipe)
}

fn eight_components(name: &str, about: &str, vars: [&str; 8]) -> Result<Recipe> {
    let slc = Grid::new(2, 4);
    let mut recipe = Recipe::new(name, about);
    for (i, var) in vars.into_iter().enumerate() {
        let log = vec![Override::Log(true)];
        recipe = recipe.panel(slice(slc.cell(i + 1)?, SlicePlane::Xz, var, log));
    }
    Ok(recipe)
}

pub fn vecs_cov() -> Result<Recipe> {
    eight_components(
        "vecs_cov",
        "covariant four-velocity and magnetic field components",
        ["u_0", "u_r", "u_th", "u_3", "b_0", "b_r", "b_th", "b_3"],
    )
}

pub fn vecs_con() -> Result<Recipe> {
    eight_components(
        "vecs_con",
        "contravariant four-velocity and magnetic field components",
        ["u^0", "u^r", "u^th", "u^3", "b^0", "b^r", "b^th", "b^3"],
    )
}

pub fn ejection() -> Result<Recipe> {
    let slc = Grid::new(1, 2);
    let averaged = |var: &str| {
        vec![
            label(&format!("{} phi-average", pretty(var))),
            Override::Average(true),
        ]
    };
    Ok(Recipe::new("ejection", "phi-averaged density and magnetic pressure")
        .panel(slice(slc.cell(1)?, SlicePlane::Xz, "rho", averaged("rho")))
        .panel(slice(slc.cell(2)?, SlicePlane::Xz, "bsq", averaged("bsq"))))
}

/// Raw field values next to the polar axis, for chasing magnetic field glitches.
pub fn b_bug() -> Result<Recipe> {
    let slc = Grid::new(1, 3);
    let spec = PatchSpec {
        r_max: 10,
        th_max: 10,
        phi: 100,
    };
    let mut recipe = Recipe::new("b_bug", "raw b^r, b^th, b^3 near the pole")
        .with_base(vec![Override::Vmin(-4.0), Override::Vmax(0.0)]);
    for (i, field) in ["b^r", "b^th", "b^3"].into_iter().enumerate() {
        recipe = recipe.panel(Panel::Patch {
            region: slc.cell(i + 1)?,
            field: field.to_string(),
            spec: spec.clone(),
            overrides: vec![],
        });
    }
    Ok(recipe)
}

pub fn e_ratio() -> Result<Recipe> {
    let slc = Grid::new(2, 4);
    let averaged = |l: &str| vec![label(l), Override::Average(true)];
    Ok(Recipe::new("e_ratio", "energy ratios and inversion failures")
        .with_base(vec![Override::Vmin(-3.0), Override::Vmax(3.0)])
        .panel(pair(
            slc.cell(1)?,
            slc.cell(2)?,
            FieldExpr::LogRatio("UU".into(), "RHO".into()),
            averaged("log₁₀(U / ρ)"),
        ))
        .panel(pair(
            slc.cell(3)?,
            slc.cell(4)?,
            FieldExpr::LogRatio("bsq".into(), "RHO".into()),
            averaged("log₁₀(b² / ρ)"),
        ))
        .panel(pair(
            slc.cell(5)?,
            slc.cell(6)?,
            FieldExpr::LogInverse("beta".into()),
            averaged("β⁻¹"),
        ))
        .panel(pair(slc.cell(7)?, slc.cell(8)?, failures(), failure_overrides())))
}

/// `e_ratio` on a theta-phi shell at the `radius` display option.
pub fn e_ratio_funnel() -> Result<Recipe> {
    let slc = Grid::new(1, 4);
    let averaged = |l: &str| vec![label(l), Override::Average(true)];
    Ok(Recipe::new("e_ratio_funnel", "energy ratios on a shell at the chosen radius")
        .with_base(vec![
            Override::Vmin(-3.0),
            Override::Vmax(3.0),
            Override::HalfCut(true),
        ])
        .panel(thphi(slc.cell(1)?, "log_Theta", averaged("log₁₀(U / ρ)")))
        .panel(thphi(slc.cell(2)?, "log_sigma", averaged("log₁₀(b² / ρ)")))
        .panel(thphi(slc.cell(3)?, "log_betainv", averaged("β⁻¹")))
        .panel(thphi(slc.cell(4)?, failures(), failure_overrides())))
}

/// Integrated energy and momentum fluxes with the radial failure count.
pub fn conservation() -> Result<Recipe> {
    let slc = Grid::new(2, 4);
    let flux = Grid::new(4, 2);
    Ok(Recipe::new("conservation", "integrated T^1_0 and T^0_0 with failures by radius")
        .with_base(vec![Override::Native(true), Override::Vmin(0.0)])
        .panel(pair(
            slc.cell(1)?,
            slc.cell(2)?,
            "JE1",
            vec![Override::Vmax(2000.0), label("T¹₀ integrated"), Override::Sum(true)],
        ))
        .panel(pair(
            slc.cell(5)?,
            slc.cell(6)?,
            "JE0",
            vec![Override::Vmax(3000.0), label("T⁰₀ integrated"), Override::Sum(true)],
        ))
        .panel(Panel::Profile {
            region: flux.cell(6)?,
            expr: failures(),
            overrides: vec![label("Fails at R"), Override::Window([0.0, 100.0, 0.0, 1000.0])],
        }))
}

pub fn energies() -> Result<Recipe> {
    let slc = Grid::new(2, 4);
    let averaged = |l: &str| vec![label(l), Override::Log(true), Override::Average(true)];
    Ok(Recipe::new("energies", "density, magnetic and internal energy with failures")
        .with_base(vec![
            Override::HalfCut(true),
            Override::Vmin(-3.0),
            Override::Vmax(3.0),
        ])
        .panel(pair(slc.cell(1)?, slc.cell(2)?, "rho", averaged("log₁₀(ρ)")))
        .panel(pair(slc.cell(3)?, slc.cell(4)?, "bsq", averaged("log₁₀(b²)")))
        .panel(pair(slc.cell(5)?, slc.cell(6)?, "UU", averaged("log₁₀(UU)")))
        .panel(pair(slc.cell(7)?, slc.cell(8)?, failures(), failure_overrides())))
}

/// Per-position decorations for flag grids: colorbar on the last column,
/// x labels on the bottom row, y labels on the first column.
fn grid_decorations(p: usize, cols: usize) -> Vec<Override> {
    let bottom = p > cols;
    let first_col = p % cols == 1;
    let ticks = |on: bool| if on { Ticks::Auto } else { Ticks::Hidden };
    vec![
        Override::Cbar(p % cols == 0),
        Override::XLabel(bottom),
        Override::XTicks(ticks(bottom)),
        Override::YLabel(first_col),
        Override::YTicks(ticks(first_col)),
    ]
}

/// Base density panel followed by one summed indicator panel per flag.
fn flag_grid(
    recipe: Recipe,
    grid: &Grid,
    flags: &FlagSet,
    field: &str,
    vmax: f64,
    decorate: bool,
) -> Result<Recipe> {
    let first = if decorate {
        vec![
            Override::Log(true),
            Override::XLabel(false),
            Override::XTicks(Ticks::Hidden),
        ]
    } else {
        vec![label(&pretty("rho"))]
    };
    let mut recipe = recipe.panel(slice(grid.cell(1)?, SlicePlane::Xz, "rho", first));
    for (i, flag) in flags.iter().enumerate() {
        let p = i + 2;
        let mut overrides = count_scale(vmax);
        if decorate {
            overrides.extend(grid_decorations(p, grid.cols));
        }
        overrides.extend([label(&flag.name), Override::Sum(true)]);
        recipe = recipe.panel(slice(
            grid.cell(p)?,
            SlicePlane::Xz,
            flags.indicator(field, flag),
            overrides,
        ));
    }
    Ok(recipe)
}

fn flag_spacing() -> SpacingAdjust {
    SpacingAdjust {
        hspace: Some(0.1),
        wspace: Some(0.12),
        left: Some(0.05),
        right: Some(0.95),
        bottom: Some(0.05),
        top: Some(0.92),
    }
}

/// Floor hits by kind. Up to nine flags fit next to the density panel.
pub fn floors(flags: &FlagSet) -> Result<Recipe> {
    let grid = Grid::new(2, 5);
    let recipe = Recipe::new("floors", "density and floor hits by floor kind")
        .with_spacing(flag_spacing())
        .with_title(TitleSpec::FlagTotal {
            field: "fflag".into(),
            caption: "Total floor hits".into(),
        });
    flag_grid(recipe, &grid, flags, "fflag", 20.0, true)
}

/// Inversion failures by status code; the layout holds exactly seven codes.
pub fn fails(codes: &FlagSet) -> Result<Recipe> {
    let grid = Grid::new(2, 4);
    if codes.len() + 1 != grid.capacity() {
        return Err(FigureError::PanelCountMismatch {
            recipe: "fails".into(),
            expected: grid.capacity(),
            got: codes.len() + 1,
        });
    }
    let recipe = Recipe::new("fails", "density and inversion failures by status")
        .with_spacing(flag_spacing())
        .with_title(TitleSpec::FlagTotal {
            field: "pflag".into(),
            caption: "Total inversion failures".into(),
        });
    flag_grid(recipe, &grid, codes, "pflag", 1.0, true)
}

/// Floor hits in the older iharm3d flag layout.
pub fn old_floors(flags: &FlagSet) -> Result<Recipe> {
    let grid = Grid::new(2, 4);
    let recipe = Recipe::new("old_floors", "density and iharm3d floor hits");
    flag_grid(recipe, &grid, flags, "fflag", 20.0, false)
}

// Registry adapters: unset params fall back to each figure's defaults.

pub(crate) fn build_simplest(p: &RecipeParams) -> Result<Recipe> {
    simplest(
        p.view.unwrap_or(View::Both),
        p.var.as_deref().unwrap_or("log_rho"),
    )
}

pub(crate) fn build_prims(p: &RecipeParams) -> Result<Recipe> {
    prims(
        p.log.unwrap_or(true),
        p.simple.unwrap_or(true),
        p.view.unwrap_or(View::Poloidal),
    )
}

pub(crate) fn build_floors(p: &RecipeParams) -> Result<Recipe> {
    floors(&p.floor_flags.clone().unwrap_or_else(flags::floor_flags_kharma))
}

pub(crate) fn build_fails(p: &RecipeParams) -> Result<Recipe> {
    fails(&p.fail_codes.clone().unwrap_or_else(flags::inversion_failures))
}

pub(crate) fn build_old_floors(p: &RecipeParams) -> Result<Recipe> {
    old_floors(&p.floor_flags.clone().unwrap_or_else(flags::floor_flags_iharm3d))
}
