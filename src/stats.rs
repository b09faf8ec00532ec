use crate::flags::{FlagKind, FlagSet};
use crate::models::{Field3, Snapshot};
use serde::{Deserialize, Serialize};

/// Summary statistics for one field of a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSummary {
    pub name: String,
    pub count: usize,
    /// NaN or infinite cells, left out of the other statistics.
    pub nonfinite: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Cells of one flag in a flag field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlagHits {
    pub name: String,
    pub value: i64,
    pub cells: usize,
}

pub fn summarize(name: &str, field: &Field3) -> FieldSummary {
    let mut vals: Vec<f64> = field
        .data()
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    vals.sort_by(f64::total_cmp);
    let count = vals.len();
    let min = vals.first().copied();
    let max = vals.last().copied();
    let mean = (count > 0).then(|| vals.iter().sum::<f64>() / count as f64);
    let median = if count == 0 {
        None
    } else if count % 2 == 1 {
        Some(vals[count / 2])
    } else {
        Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
    };
    FieldSummary {
        name: name.to_string(),
        count,
        nonfinite: field.data().len() - count,
        min,
        max,
        mean,
        median,
    }
}

/// One summary per stored field, in name order.
pub fn field_summary(snap: &Snapshot) -> Vec<FieldSummary> {
    snap.fields().map(|(n, f)| summarize(n, f)).collect()
}

/// Cells with a value above zero, e.g. any floor hit or any failed inversion.
pub fn count_positive(field: &Field3) -> usize {
    field.count_where(|v| v > 0.0)
}

/// Per-flag cell counts of `field`. Bit flags overlap, so the counts can sum
/// to more than [`count_positive`].
pub fn flag_hits(field: &Field3, flags: &FlagSet) -> Vec<FlagHits> {
    flags
        .iter()
        .map(|flag| {
            let cells = match flags.kind {
                FlagKind::Bits => {
                    field.count_where(|v| v.is_finite() && (v as i64) & flag.value != 0)
                }
                FlagKind::Codes => {
                    field.count_where(|v| v.is_finite() && v as i64 == flag.value)
                }
            };
            FlagHits {
                name: flag.name.clone(),
                value: flag.value,
                cells,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::floor_flags_kharma;

    #[test]
    fn summary_skips_nonfinite() {
        let f = Field3::new([1, 1, 5], vec![3.0, f64::NAN, 1.0, 2.0, f64::INFINITY]).unwrap();
        let s = summarize("x", &f);
        assert_eq!(s.count, 3);
        assert_eq!(s.nonfinite, 2);
        assert_eq!(s.min, Some(1.0));
        assert_eq!(s.max, Some(3.0));
        assert_eq!(s.mean, Some(2.0));
        assert_eq!(s.median, Some(2.0));
    }

    #[test]
    fn bits_overlap_codes_do_not() {
        // 3 = GEOM_RHO | GEOM_U
        let f = Field3::new([1, 1, 4], vec![0.0, 3.0, 1.0, 2.0]).unwrap();
        assert_eq!(count_positive(&f), 3);
        let hits = flag_hits(&f, &floor_flags_kharma());
        assert_eq!(hits[0].cells, 2);
        assert_eq!(hits[1].cells, 2);
        assert_eq!(hits[2].cells, 0);

        let codes = FlagSet::new("c", FlagKind::Codes, &[("one", 1), ("three", 3)]);
        let hits = flag_hits(&f, &codes);
        assert_eq!((hits[0].cells, hits[1].cells), (1, 1));
    }
}
