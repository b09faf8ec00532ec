//! Turn 3D fields into drawable quad meshes.
//!
//! Poloidal slices place cell `(i, j)` at `x = r sin θ, z = r cos θ`, with the
//! phi = 0 half on the right and the opposite half mirrored to the left.
//! Equatorial slices use `x = r cos φ, y = r sin φ` at the midplane. Shells and
//! native plots are rectangular in grid coordinates.

use crate::error::{FigureError, Result};
use crate::models::{Field3, Plane, Reduce, Snapshot};
use crate::options::DisplayOptions;
use std::f64::consts::PI;

/// One filled quad of a mesh. Corners are in plot coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub corners: [(f64, f64); 4],
    pub value: f64,
}

impl Cell {
    pub fn center(&self) -> (f64, f64) {
        let (sx, sy) = self
            .corners
            .iter()
            .fold((0.0, 0.0), |(ax, ay), (x, y)| (ax + x, ay + y));
        (sx / 4.0, sy / 4.0)
    }
}

/// Raw sub-block selection for native-coordinate debugging plots.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchSpec {
    pub r_max: usize,
    pub th_max: usize,
    pub phi: usize,
}

/// Cell edges from cell centers: midpoints inside, mirrored half-steps outside.
pub fn edges(centers: &[f64]) -> Vec<f64> {
    match centers {
        [] => Vec::new(),
        [c] => vec![c - 0.5, c + 0.5],
        _ => {
            let n = centers.len();
            let mut out = Vec::with_capacity(n + 1);
            out.push(centers[0] - 0.5 * (centers[1] - centers[0]));
            out.extend(centers.windows(2).map(|w| 0.5 * (w[0] + w[1])));
            out.push(centers[n - 1] + 0.5 * (centers[n - 1] - centers[n - 2]));
            out
        }
    }
}

fn index_axis(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64).collect()
}

fn display_value(v: f64, opts: &DisplayOptions) -> f64 {
    if opts.log { v.log10() } else { v }
}

fn in_window(cell: &Cell, opts: &DisplayOptions) -> bool {
    match opts.window {
        Some([x0, x1, y0, y1]) => {
            let (x, y) = cell.center();
            x >= x0 && x <= x1 && y >= y0 && y <= y1
        }
        None => true,
    }
}

/// Rectangular cells for a plane indexed `(row, col)` → `(x, y)`.
fn rectangular(plane: &Plane, xs: &[f64], ys: &[f64], opts: &DisplayOptions) -> Vec<Cell> {
    let xe = edges(xs);
    let ye = edges(ys);
    let mut out = Vec::with_capacity(plane.rows * plane.cols);
    for r in 0..plane.rows {
        for c in 0..plane.cols {
            let cell = Cell {
                corners: [
                    (xe[r], ye[c]),
                    (xe[r + 1], ye[c]),
                    (xe[r + 1], ye[c + 1]),
                    (xe[r], ye[c + 1]),
                ],
                value: display_value(plane.get(r, c), opts),
            };
            if in_window(&cell, opts) {
                out.push(cell);
            }
        }
    }
    out
}

/// Cells on polar edges `(radius, angle)`; `to_xy` maps one edge pair to plot coordinates.
fn polar(
    plane: &Plane,
    r_edges: &[f64],
    a_edges: &[f64],
    opts: &DisplayOptions,
    to_xy: impl Fn(f64, f64) -> (f64, f64),
    out: &mut Vec<Cell>,
) {
    for i in 0..plane.rows {
        for j in 0..plane.cols {
            let (r0, r1) = (r_edges[i], r_edges[i + 1]);
            let (a0, a1) = (a_edges[j], a_edges[j + 1]);
            let cell = Cell {
                corners: [to_xy(r0, a0), to_xy(r1, a0), to_xy(r1, a1), to_xy(r0, a1)],
                value: display_value(plane.get(i, j), opts),
            };
            if in_window(&cell, opts) {
                out.push(cell);
            }
        }
    }
}

fn reduction(opts: &DisplayOptions) -> Option<Reduce> {
    if opts.sum {
        Some(Reduce::Sum)
    } else if opts.average {
        Some(Reduce::Mean)
    } else {
        None
    }
}

fn radial_edges(snap: &Snapshot) -> Vec<f64> {
    edges(&snap.radii()).into_iter().map(|r| r.max(0.0)).collect()
}

/// Poloidal (x-z) slice.
pub fn poloidal(snap: &Snapshot, field: &Field3, opts: &DisplayOptions) -> Result<Vec<Cell>> {
    let [n1, n2, n3] = field.shape();
    let (right, left) = match reduction(opts) {
        Some(op) => {
            let p = field.reduce_phi(op);
            (p.clone(), p)
        }
        None => (field.phi_slice(0)?, field.phi_slice(n3 / 2)?),
    };

    if opts.native {
        let xs = snap.coords.x1.clone().unwrap_or_else(|| index_axis(n1));
        let ys = snap.coords.x2.clone().unwrap_or_else(|| index_axis(n2));
        return Ok(rectangular(&right, &xs, &ys, opts));
    }

    let r_e = radial_edges(snap);
    let th_e: Vec<f64> = edges(&snap.thetas())
        .into_iter()
        .map(|t| t.clamp(0.0, PI))
        .collect();
    let mut out = Vec::with_capacity(2 * n1 * n2);
    polar(&right, &r_e, &th_e, opts, |r, t| (r * t.sin(), r * t.cos()), &mut out);
    if !opts.half_cut {
        polar(&left, &r_e, &th_e, opts, |r, t| (-r * t.sin(), r * t.cos()), &mut out);
    }
    Ok(out)
}

/// Equatorial (x-y) slice at the midplane.
pub fn midplane(snap: &Snapshot, field: &Field3, opts: &DisplayOptions) -> Result<Vec<Cell>> {
    let [n1, n2, n3] = field.shape();
    let plane = match reduction(opts) {
        Some(op) => field.reduce_theta(op),
        None => field.theta_slice(n2 / 2)?,
    };

    if opts.native {
        let xs = snap.coords.x1.clone().unwrap_or_else(|| index_axis(n1));
        return Ok(rectangular(&plane, &xs, &index_axis(n3), opts));
    }

    let r_e = radial_edges(snap);
    let ph_e = edges(&snap.phis());
    let mut out = Vec::with_capacity(n1 * n3);
    polar(&plane, &r_e, &ph_e, opts, |r, p| (r * p.cos(), r * p.sin()), &mut out);
    Ok(out)
}

/// Shell at radial index `i`: phi on x, theta on y.
pub fn shell(
    snap: &Snapshot,
    field: &Field3,
    i: usize,
    opts: &DisplayOptions,
) -> Result<Vec<Cell>> {
    let mut plane = field.radial_shell(i)?;
    let mut th = snap.thetas();
    if opts.half_cut {
        let keep = (plane.rows / 2).max(1).min(plane.rows);
        plane = Plane::from_fn(keep, plane.cols, |j, k| plane.get(j, k));
        th.truncate(keep);
    }
    // rows are theta, cols are phi: transpose into (x = phi, y = theta)
    let t = Plane::from_fn(plane.cols, plane.rows, |k, j| plane.get(j, k));
    Ok(rectangular(&t, &snap.phis(), &th, opts))
}

/// Raw sub-block `[0..r_max, 0..th_max]` at one phi index in native coordinates.
/// Ranges are clipped to the grid; an out-of-range phi index is an error.
pub fn native_patch(
    snap: &Snapshot,
    field: &Field3,
    spec: &PatchSpec,
    opts: &DisplayOptions,
) -> Result<Vec<Cell>> {
    let [n1, n2, n3] = field.shape();
    if spec.phi >= n3 {
        return Err(FigureError::IndexOutOfRange {
            index: spec.phi,
            len: n3,
        });
    }
    let (nr, nt) = (spec.r_max.min(n1), spec.th_max.min(n2));
    let plane = Plane::from_fn(nr, nt, |i, j| field.get(i, j, spec.phi));
    let mut xs = snap.coords.x1.clone().unwrap_or_else(|| index_axis(n1));
    let mut ys = snap.coords.x2.clone().unwrap_or_else(|| index_axis(n2));
    xs.truncate(nr);
    ys.truncate(nt);
    Ok(rectangular(&plane, &xs, &ys, opts))
}
