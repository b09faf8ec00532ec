//! Field expressions, display labels and coordinate lookup.

use crate::error::{FigureError, Result};
use crate::models::{Field3, Snapshot};
use std::fmt;

/// What a panel plots: a stored or derived field, or a transform of one.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldExpr {
    /// Stored field, derived name (`Theta`, `sigma`, `betainv`) or `log_`-prefixed either.
    Named(String),
    /// `log10(num / den)`
    LogRatio(String, String),
    /// `log10(1 / x)`
    LogInverse(String),
    /// `1` where `x > 0`, else `0`
    Positive(String),
    /// `1` where `x == code`, else `0`
    Equals(String, i64),
    /// `1` where `x & mask != 0`, else `0`
    BitSet(String, i64),
}

impl FieldExpr {
    pub fn named(name: impl Into<String>) -> Self {
        FieldExpr::Named(name.into())
    }

    pub fn evaluate(&self, snap: &Snapshot) -> Result<Field3> {
        match self {
            FieldExpr::Named(name) => resolve(snap, name),
            FieldExpr::LogRatio(num, den) => {
                let n = resolve(snap, num)?;
                let d = resolve(snap, den)?;
                n.zip_with(&d, |a, b| (a / b).log10())
            }
            FieldExpr::LogInverse(name) => Ok(resolve(snap, name)?.map(|v| (1.0 / v).log10())),
            FieldExpr::Positive(name) => Ok(resolve(snap, name)?.map(|v| indicator(v > 0.0))),
            FieldExpr::Equals(name, code) => {
                let code = *code as f64;
                Ok(resolve(snap, name)?.map(|v| indicator(v == code)))
            }
            FieldExpr::BitSet(name, mask) => {
                let mask = *mask;
                Ok(resolve(snap, name)?.map(|v| indicator((v as i64) & mask != 0)))
            }
        }
    }

    /// Human-readable label used as the default panel title.
    pub fn label(&self) -> String {
        match self {
            FieldExpr::Named(n) => pretty(n),
            FieldExpr::LogRatio(a, b) => format!("log₁₀({} / {})", pretty(a), pretty(b)),
            FieldExpr::LogInverse(n) => format!("log₁₀(1 / {})", pretty(n)),
            FieldExpr::Positive(n) => format!("{} > 0", pretty(n)),
            FieldExpr::Equals(n, c) => format!("{} = {c}", pretty(n)),
            FieldExpr::BitSet(n, m) => format!("{} & {m}", pretty(n)),
        }
    }
}

impl fmt::Display for FieldExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldExpr::Named(n) => write!(f, "{n}"),
            FieldExpr::LogRatio(a, b) => write!(f, "log10({a}/{b})"),
            FieldExpr::LogInverse(n) => write!(f, "log10(1/{n})"),
            FieldExpr::Positive(n) => write!(f, "{n} > 0"),
            FieldExpr::Equals(n, c) => write!(f, "{n} == {c}"),
            FieldExpr::BitSet(n, m) => write!(f, "{n} & {m}"),
        }
    }
}

impl From<&str> for FieldExpr {
    fn from(s: &str) -> Self {
        FieldExpr::Named(s.to_string())
    }
}

#[inline]
fn indicator(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

fn resolve(snap: &Snapshot, name: &str) -> Result<Field3> {
    match snap.field(name) {
        Ok(f) => Ok(f.clone()),
        Err(missing) => {
            if let Some(base) = name.strip_prefix("log_") {
                return Ok(resolve(snap, base)?.map(f64::log10));
            }
            match name {
                "Theta" => snap.field("UU")?.zip_with(snap.field("RHO")?, |u, r| u / r),
                "sigma" => snap.field("bsq")?.zip_with(snap.field("RHO")?, |b, r| b / r),
                "betainv" => Ok(snap.field("beta")?.map(|b| 1.0 / b)),
                _ => Err(missing),
            }
        }
    }
}

/// Display label for a variable name.
pub fn pretty(name: &str) -> String {
    if let Some(base) = name.strip_prefix("log_") {
        return format!("log₁₀ {}", pretty(base));
    }
    let s = match name {
        "rho" | "RHO" => "ρ",
        "UU" | "u" => "u",
        "bsq" => "b²",
        "beta" => "β",
        "betainv" => "β⁻¹",
        "sigma" => "σ",
        "Theta" => "Θ",
        "U1" => "U¹",
        "U2" => "U²",
        "U3" => "U³",
        "B1" => "B¹",
        "B2" => "B²",
        "B3" => "B³",
        "Mdot" => "Ṁ",
        "phi_b" => "Φ_BH",
        "Edot" => "Ė",
        "Ldot" => "L̇",
        "JE0" => "T⁰₀",
        "JE1" => "T¹₀",
        "fflag" => "floor flags",
        "pflag" => "inversion flags",
        other => other,
    };
    s.to_string()
}

/// Index of the grid point at or just below `value` in an ascending coordinate array.
/// Values below the first point map to 0, above the last to the last index.
pub fn i_of(coords: &[f64], value: f64) -> Option<usize> {
    let (mut best, _) = coords
        .iter()
        .enumerate()
        .map(|(i, c)| (i, (c - value).abs()))
        .min_by(|a, b| a.1.total_cmp(&b.1))?;
    if coords[best] > value && best > 0 {
        best -= 1;
    }
    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap() -> Snapshot {
        let shape = [2, 2, 2];
        Snapshot::new(5.0, shape)
            .with_field("RHO", Field3::filled(shape, 10.0))
            .unwrap()
            .with_field("UU", Field3::filled(shape, 100.0))
            .unwrap()
            .with_field("beta", Field3::filled(shape, 0.01))
            .unwrap()
            .with_field(
                "pflag",
                Field3::new(shape, vec![0.0, 1.0, 2.0, 3.0, 0.0, 5.0, -1.0, 2.0]).unwrap(),
            )
            .unwrap()
    }

    #[test]
    fn log_prefix_and_derived_names() {
        let s = snap();
        let f = FieldExpr::named("log_rho").evaluate(&s).unwrap();
        assert!(f.data().iter().all(|v| (*v - 1.0).abs() < 1e-12));
        let f = FieldExpr::named("log_Theta").evaluate(&s).unwrap();
        assert!(f.data().iter().all(|v| (*v - 1.0).abs() < 1e-12));
        let f = FieldExpr::named("log_betainv").evaluate(&s).unwrap();
        assert!(f.data().iter().all(|v| (*v - 2.0).abs() < 1e-12));
    }

    #[test]
    fn missing_field_is_reported_by_name() {
        let s = snap();
        let err = FieldExpr::LogRatio("bsq".into(), "RHO".into())
            .evaluate(&s)
            .unwrap_err();
        assert!(matches!(err, FigureError::MissingField(n) if n == "bsq"));
        let err = FieldExpr::named("log_sigma").evaluate(&s).unwrap_err();
        assert!(matches!(err, FigureError::MissingField(n) if n == "bsq"));
    }

    #[test]
    fn indicators() {
        let s = snap();
        let pos = FieldExpr::Positive("pflag".into()).evaluate(&s).unwrap();
        assert_eq!(pos.data().iter().sum::<f64>(), 5.0);
        let two = FieldExpr::Equals("pflag".into(), 2).evaluate(&s).unwrap();
        assert_eq!(two.data().iter().sum::<f64>(), 2.0);
        let bit = FieldExpr::BitSet("pflag".into(), 1).evaluate(&s).unwrap();
        // 1, 3, 5 and -1 (all bits set)
        assert_eq!(bit.data().iter().sum::<f64>(), 4.0);
    }

    #[test]
    fn i_of_steps_behind() {
        let r = [1.0, 2.0, 4.0, 8.0];
        assert_eq!(i_of(&r, 4.0), Some(2));
        assert_eq!(i_of(&r, 3.9), Some(1));
        assert_eq!(i_of(&r, 0.1), Some(0));
        assert_eq!(i_of(&r, 100.0), Some(3));
        assert_eq!(i_of(&[], 1.0), None);
    }

    #[test]
    fn pretty_labels() {
        assert_eq!(pretty("rho"), "ρ");
        assert_eq!(pretty("log_bsq"), "log₁₀ b²");
        assert_eq!(pretty("u^r"), "u^r");
    }
}
