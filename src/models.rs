use crate::error::{FigureError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;

/// Reduction applied along one grid direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduce {
    Mean,
    Sum,
}

/// Dense 3D field on the native `(n1, n2, n3)` = (radius, theta, phi) grid, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Field3 {
    shape: [usize; 3],
    data: Vec<f64>,
}

impl Field3 {
    pub fn new(shape: [usize; 3], data: Vec<f64>) -> Result<Self> {
        let expected = shape.iter().product::<usize>();
        if data.len() != expected {
            return Err(FigureError::ShapeMismatch(format!(
                "{} values cannot fill a {}x{}x{} grid",
                data.len(),
                shape[0],
                shape[1],
                shape[2]
            )));
        }
        Ok(Self { shape, data })
    }

    pub fn filled(shape: [usize; 3], value: f64) -> Self {
        Self {
            shape,
            data: vec![value; shape.iter().product()],
        }
    }

    pub fn from_fn(shape: [usize; 3], f: impl Fn(usize, usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(shape.iter().product());
        for i in 0..shape[0] {
            for j in 0..shape[1] {
                for k in 0..shape[2] {
                    data.push(f(i, j, k));
                }
            }
        }
        Self { shape, data }
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        self.data[(i * self.shape[1] + j) * self.shape[2] + k]
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Field3 {
        Field3 {
            shape: self.shape,
            data: self.data.iter().map(|v| f(*v)).collect(),
        }
    }

    /// Combine two fields cell by cell. Shapes must agree.
    pub fn zip_with(&self, other: &Field3, f: impl Fn(f64, f64) -> f64) -> Result<Field3> {
        if self.shape != other.shape {
            return Err(FigureError::ShapeMismatch(format!(
                "{:?} vs {:?}",
                self.shape, other.shape
            )));
        }
        Ok(Field3 {
            shape: self.shape,
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(a, b)| f(*a, *b))
                .collect(),
        })
    }

    pub fn count_where(&self, pred: impl Fn(f64) -> bool) -> usize {
        self.data.iter().filter(|v| pred(**v)).count()
    }

    /// Poloidal plane at a fixed phi index: `n1 x n2`.
    pub fn phi_slice(&self, k: usize) -> Result<Plane> {
        check_index(k, self.shape[2])?;
        let [n1, n2, _] = self.shape;
        Ok(Plane::from_fn(n1, n2, |i, j| self.get(i, j, k)))
    }

    /// Equatorial-type plane at a fixed theta index: `n1 x n3`.
    pub fn theta_slice(&self, j: usize) -> Result<Plane> {
        check_index(j, self.shape[1])?;
        let [n1, _, n3] = self.shape;
        Ok(Plane::from_fn(n1, n3, |i, k| self.get(i, j, k)))
    }

    /// Spherical shell at a fixed radial index: `n2 x n3`.
    pub fn radial_shell(&self, i: usize) -> Result<Plane> {
        check_index(i, self.shape[0])?;
        let [_, n2, n3] = self.shape;
        Ok(Plane::from_fn(n2, n3, |j, k| self.get(i, j, k)))
    }

    /// Collapse phi: `n1 x n2`.
    pub fn reduce_phi(&self, op: Reduce) -> Plane {
        let [n1, n2, n3] = self.shape;
        Plane::from_fn(n1, n2, |i, j| {
            let total: f64 = (0..n3).map(|k| self.get(i, j, k)).sum();
            finish(total, n3, op)
        })
    }

    /// Collapse theta: `n1 x n3`.
    pub fn reduce_theta(&self, op: Reduce) -> Plane {
        let [n1, n2, n3] = self.shape;
        Plane::from_fn(n1, n3, |i, k| {
            let total: f64 = (0..n2).map(|j| self.get(i, j, k)).sum();
            finish(total, n2, op)
        })
    }

    /// Collapse radius: `n2 x n3`.
    pub fn reduce_radius(&self, op: Reduce) -> Plane {
        let [n1, n2, n3] = self.shape;
        Plane::from_fn(n2, n3, |j, k| {
            let total: f64 = (0..n1).map(|i| self.get(i, j, k)).sum();
            finish(total, n1, op)
        })
    }

    /// Sum over theta and phi at every radius.
    pub fn shell_sum(&self) -> Vec<f64> {
        let [n1, n2, n3] = self.shape;
        let per_shell = n2 * n3;
        (0..n1)
            .map(|i| self.data[i * per_shell..(i + 1) * per_shell].iter().sum())
            .collect()
    }
}

fn finish(total: f64, n: usize, op: Reduce) -> f64 {
    match op {
        Reduce::Sum => total,
        Reduce::Mean if n > 0 => total / n as f64,
        Reduce::Mean => f64::NAN,
    }
}

fn check_index(index: usize, len: usize) -> Result<()> {
    if index >= len {
        Err(FigureError::IndexOutOfRange { index, len })
    } else {
        Ok(())
    }
}

/// Dense 2D array, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f64>,
}

impl Plane {
    pub fn from_fn(rows: usize, cols: usize, f: impl Fn(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }

    #[inline]
    pub fn get(&self, r: usize, c: usize) -> f64 {
        self.data[r * self.cols + c]
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Plane {
        Plane {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|v| f(*v)).collect(),
        }
    }

    /// Finite min/max, or `None` when no value is finite.
    pub fn finite_range(&self) -> Option<(f64, f64)> {
        let mut it = self.data.iter().copied().filter(|v| v.is_finite());
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

/// Optional 1D coordinate axes of a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub th: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phi: Option<Vec<f64>>,
    /// Native radial coordinate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x1: Option<Vec<f64>>,
    /// Native polar coordinate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x2: Option<Vec<f64>>,
}

/// Names that refer to the same primitive in different codes.
const FIELD_ALIASES: &[(&str, &str)] = &[("rho", "RHO"), ("UU", "u"), ("bsq", "b2")];

/// One simulation timestep: named fields sharing one grid plus the simulation time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub t: f64,
    shape: [usize; 3],
    fields: BTreeMap<String, Field3>,
    pub coords: Coordinates,
}

impl Snapshot {
    pub fn new(t: f64, shape: [usize; 3]) -> Self {
        Self {
            t,
            shape,
            fields: BTreeMap::new(),
            coords: Coordinates::default(),
        }
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    pub fn insert(&mut self, name: impl Into<String>, field: Field3) -> Result<()> {
        let name = name.into();
        if self.shape.contains(&0) {
            return Err(FigureError::ShapeMismatch(format!(
                "field '{name}' cannot live on the empty grid {:?}",
                self.shape
            )));
        }
        if field.shape() != self.shape {
            return Err(FigureError::ShapeMismatch(format!(
                "field '{name}' is {:?}, snapshot grid is {:?}",
                field.shape(),
                self.shape
            )));
        }
        self.fields.insert(name, field);
        Ok(())
    }

    pub fn with_field(mut self, name: impl Into<String>, field: Field3) -> Result<Self> {
        self.insert(name, field)?;
        Ok(self)
    }

    pub fn with_coords(mut self, coords: Coordinates) -> Result<Self> {
        let [n1, n2, n3] = self.shape;
        for (label, axis, n) in [
            ("r", &coords.r, n1),
            ("th", &coords.th, n2),
            ("phi", &coords.phi, n3),
            ("x1", &coords.x1, n1),
            ("x2", &coords.x2, n2),
        ] {
            if let Some(v) = axis
                && v.len() != n
            {
                return Err(FigureError::ShapeMismatch(format!(
                    "coordinate '{label}' has {} entries, grid needs {n}",
                    v.len()
                )));
            }
        }
        self.coords = coords;
        Ok(self)
    }

    /// Field lookup, falling back to the alias table (`rho` ↔ `RHO`, `UU` ↔ `u`).
    pub fn field(&self, name: &str) -> Result<&Field3> {
        if let Some(f) = self.fields.get(name) {
            return Ok(f);
        }
        FIELD_ALIASES
            .iter()
            .filter_map(|(a, b)| match name {
                n if n == *a => Some(*b),
                n if n == *b => Some(*a),
                _ => None,
            })
            .find_map(|alt| self.fields.get(alt))
            .ok_or_else(|| FigureError::MissingField(name.to_string()))
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_ok()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field3)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Radii of cell centers; grid index + 1 when the snapshot carries no `r`.
    pub fn radii(&self) -> Vec<f64> {
        self.coords
            .r
            .clone()
            .unwrap_or_else(|| (0..self.shape[0]).map(|i| i as f64 + 1.0).collect())
    }

    /// Polar angles of cell centers; uniform in `(0, π)` when absent.
    pub fn thetas(&self) -> Vec<f64> {
        let n = self.shape[1];
        self.coords
            .th
            .clone()
            .unwrap_or_else(|| (0..n).map(|j| (j as f64 + 0.5) * PI / n as f64).collect())
    }

    /// Azimuths of cell centers; uniform in `(0, 2π)` when absent.
    pub fn phis(&self) -> Vec<f64> {
        let n = self.shape[2];
        self.coords
            .phi
            .clone()
            .unwrap_or_else(|| (0..n).map(|k| (k as f64 + 0.5) * 2.0 * PI / n as f64).collect())
    }
}

/// On-disk snapshot layout (see `storage`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub t: f64,
    pub shape: [usize; 3],
    pub fields: BTreeMap<String, Vec<f64>>,
    #[serde(flatten)]
    pub coords: Coordinates,
}

impl TryFrom<SnapshotFile> for Snapshot {
    type Error = FigureError;

    fn try_from(raw: SnapshotFile) -> Result<Self> {
        let mut snap = Snapshot::new(raw.t, raw.shape).with_coords(raw.coords)?;
        for (name, data) in raw.fields {
            let field = Field3::new(raw.shape, data)
                .map_err(|e| FigureError::ShapeMismatch(format!("field '{name}': {e}")))?;
            snap.insert(name, field)?;
        }
        Ok(snap)
    }
}

impl From<&Snapshot> for SnapshotFile {
    fn from(s: &Snapshot) -> Self {
        Self {
            t: s.t,
            shape: s.shape,
            fields: s
                .fields
                .iter()
                .map(|(k, v)| (k.clone(), v.data.clone()))
                .collect(),
            coords: s.coords.clone(),
        }
    }
}

/// Scalar diagnostics over time: a time column plus named series of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    t: Vec<f64>,
    series: BTreeMap<String, Vec<f64>>,
}

impl History {
    pub fn new(t: Vec<f64>) -> Self {
        Self {
            t,
            series: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        if values.len() != self.t.len() {
            return Err(FigureError::ShapeMismatch(format!(
                "series '{name}' has {} samples, time column has {}",
                values.len(),
                self.t.len()
            )));
        }
        self.series.insert(name, values);
        Ok(())
    }

    pub fn with_series(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        self.insert(name, values)?;
        Ok(self)
    }

    pub fn times(&self) -> &[f64] {
        &self.t
    }

    pub fn series(&self, name: &str) -> Result<&[f64]> {
        self.series
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| FigureError::MissingSeries(name.to_string()))
    }

    pub fn series_names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(shape: [usize; 3]) -> Field3 {
        Field3::from_fn(shape, |i, j, k| (i * 100 + j * 10 + k) as f64)
    }

    #[test]
    fn field_rejects_wrong_length() {
        assert!(Field3::new([2, 2, 2], vec![0.0; 7]).is_err());
        assert!(Field3::new([2, 2, 2], vec![0.0; 8]).is_ok());
    }

    #[test]
    fn slices_pick_expected_cells() {
        let f = ramp([3, 4, 5]);
        let xz = f.phi_slice(2).unwrap();
        assert_eq!((xz.rows, xz.cols), (3, 4));
        assert_eq!(xz.get(1, 3), 132.0);

        let xy = f.theta_slice(1).unwrap();
        assert_eq!((xy.rows, xy.cols), (3, 5));
        assert_eq!(xy.get(2, 4), 214.0);

        let shell = f.radial_shell(0).unwrap();
        assert_eq!((shell.rows, shell.cols), (4, 5));
        assert_eq!(shell.get(3, 1), 31.0);

        assert!(matches!(
            f.phi_slice(5),
            Err(FigureError::IndexOutOfRange { index: 5, len: 5 })
        ));
    }

    #[test]
    fn reductions() {
        let f = Field3::filled([2, 3, 4], 1.0);
        assert_eq!(f.reduce_phi(Reduce::Sum).get(1, 2), 4.0);
        assert_eq!(f.reduce_phi(Reduce::Mean).get(0, 0), 1.0);
        assert_eq!(f.reduce_theta(Reduce::Sum).get(0, 3), 3.0);
        assert_eq!(f.shell_sum(), vec![12.0, 12.0]);
    }

    #[test]
    fn snapshot_aliases_and_missing() {
        let snap = Snapshot::new(10.0, [2, 2, 2])
            .with_field("RHO", Field3::filled([2, 2, 2], 1.0))
            .unwrap();
        assert!(snap.field("rho").is_ok());
        assert!(snap.field("RHO").is_ok());
        assert!(matches!(snap.field("bsq"), Err(FigureError::MissingField(n)) if n == "bsq"));
    }

    #[test]
    fn snapshot_rejects_foreign_shape() {
        let mut snap = Snapshot::new(0.0, [2, 2, 2]);
        assert!(snap.insert("rho", Field3::filled([2, 2, 3], 1.0)).is_err());
    }

    #[test]
    fn snapshot_rejects_fields_on_an_empty_grid() {
        let mut snap = Snapshot::new(0.0, [4, 0, 4]);
        assert!(matches!(
            snap.insert("rho", Field3::filled([4, 0, 4], 1.0)),
            Err(FigureError::ShapeMismatch(_))
        ));
        assert!(snap.field("rho").is_err());
    }

    #[test]
    fn history_lengths_checked() {
        let h = History::new(vec![0.0, 1.0, 2.0]);
        assert!(h.clone().with_series("Mdot", vec![1.0, 2.0]).is_err());
        let h = h.with_series("Mdot", vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(h.series("Mdot").unwrap(), &[1.0, 2.0, 3.0]);
        assert!(h.series("phi_b").is_err());
    }
}
