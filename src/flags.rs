//! Floor-flag and inversion-status enumerations.
//!
//! Floor flags are non-exclusive bits (a cell can hit several floors at once);
//! inversion statuses are exclusive integer codes. Both are kept as ordered
//! `(name, value)` lists so recipes can lay out one panel per entry in a
//! stable order.

use serde::{Deserialize, Serialize};

use crate::variables::FieldExpr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    /// Test with `field & value != 0`.
    Bits,
    /// Test with `field == value`.
    Codes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagSet {
    pub name: String,
    pub kind: FlagKind,
    pub flags: Vec<Flag>,
}

impl FlagSet {
    pub fn new(name: impl Into<String>, kind: FlagKind, flags: &[(&str, i64)]) -> Self {
        Self {
            name: name.into(),
            kind,
            flags: flags
                .iter()
                .map(|(n, v)| Flag {
                    name: (*n).to_string(),
                    value: *v,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Flag> {
        self.flags.iter()
    }

    /// Name for a value, if it is a member.
    pub fn name_of(&self, value: i64) -> Option<&str> {
        self.flags
            .iter()
            .find(|f| f.value == value)
            .map(|f| f.name.as_str())
    }

    /// Indicator expression selecting cells of `field` carrying `flag`.
    pub fn indicator(&self, field: &str, flag: &Flag) -> FieldExpr {
        match self.kind {
            FlagKind::Bits => FieldExpr::BitSet(field.to_string(), flag.value),
            FlagKind::Codes => FieldExpr::Equals(field.to_string(), flag.value),
        }
    }
}

/// Floor bits written by KHARMA into `fflag`.
pub fn floor_flags_kharma() -> FlagSet {
    FlagSet::new(
        "FloorFlag_KHARMA",
        FlagKind::Bits,
        &[
            ("GEOM_RHO", 1),
            ("GEOM_U", 2),
            ("B_RHO", 4),
            ("B_U", 8),
            ("TEMP", 16),
            ("GAMMA", 32),
            ("KTOT", 64),
            ("GEOM_RHO_FLUX", 128),
            ("GEOM_U_FLUX", 256),
        ],
    )
}

/// Floor bits written by iharm3d into `fflag`.
pub fn floor_flags_iharm3d() -> FlagSet {
    FlagSet::new(
        "FloorFlag_iharm3d",
        FlagKind::Bits,
        &[
            ("HIT_FLOOR_GEOM_RHO", 1),
            ("HIT_FLOOR_GEOM_U", 2),
            ("HIT_FLOOR_B_RHO", 4),
            ("HIT_FLOOR_B_U", 8),
            ("HIT_FLOOR_TEMP", 16),
            ("HIT_FLOOR_GAMMA", 32),
            ("HIT_FLOOR_KTOT", 64),
        ],
    )
}

/// Failure codes of primitive-variable recovery written into `pflag`.
/// `success` (0) and `unused` (-1) are not failures and are left out.
pub fn inversion_failures() -> FlagSet {
    FlagSet::new(
        "InversionStatus",
        FlagKind::Codes,
        &[
            ("neg_input", 1),
            ("max_iter", 2),
            ("bad_ut", 3),
            ("bad_gamma", 4),
            ("neg_rho", 5),
            ("neg_u", 6),
            ("neg_rhou", 7),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_are_stable() {
        let names: Vec<_> = inversion_failures().iter().map(|f| f.name.clone()).collect();
        assert_eq!(names[0], "neg_input");
        assert_eq!(names[6], "neg_rhou");
        assert_eq!(floor_flags_kharma().len(), 9);
    }

    #[test]
    fn floor_bits_are_distinct_powers_of_two() {
        for set in [floor_flags_kharma(), floor_flags_iharm3d()] {
            let mut seen = 0i64;
            for f in set.iter() {
                assert_eq!(f.value.count_ones(), 1, "{} is not a single bit", f.name);
                assert_eq!(seen & f.value, 0);
                seen |= f.value;
            }
        }
    }

    #[test]
    fn indicator_matches_kind() {
        let codes = inversion_failures();
        let flag = &codes.flags[1];
        assert_eq!(
            codes.indicator("pflag", flag),
            FieldExpr::Equals("pflag".into(), 2)
        );
        let bits = floor_flags_kharma();
        assert_eq!(
            bits.indicator("fflag", &bits.flags[3]),
            FieldExpr::BitSet("fflag".into(), 8)
        );
        assert_eq!(codes.name_of(5), Some("neg_rho"));
        assert_eq!(codes.name_of(0), None);
    }
}
