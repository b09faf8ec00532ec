//! Display options shared by every plotting primitive.
//!
//! Options are values: a recipe never edits the caller's copy. Each panel
//! derives its own options with [`DisplayOptions::with`], so a setting made
//! for one panel cannot leak into the next one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tick placement on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ticks {
    #[default]
    Auto,
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    pub cmap: Option<String>,
    /// Plot `log10` of the values.
    pub log: bool,
    /// Average over the direction normal to the slice.
    pub average: bool,
    /// Sum over the direction normal to the slice.
    pub sum: bool,
    /// Only draw the `x > 0` half of poloidal slices.
    pub half_cut: bool,
    pub xlabel: bool,
    pub ylabel: bool,
    pub xticks: Ticks,
    pub yticks: Ticks,
    pub xticklabels: bool,
    pub cbar: bool,
    pub frame: bool,
    /// Plot in native grid coordinates instead of projected Cartesian ones.
    pub native: bool,
    /// Radius for shell (theta-phi) plots.
    pub radius: Option<f64>,
    /// Panel title; the field's pretty name when absent.
    pub label: Option<String>,
    /// `[xmin, xmax, ymin, ymax]` in plot coordinates.
    pub window: Option<[f64; 4]>,
    /// Keys this crate does not know. Kept so option files round-trip, never acted on.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            vmin: None,
            vmax: None,
            cmap: None,
            log: false,
            average: false,
            sum: false,
            half_cut: false,
            xlabel: true,
            ylabel: true,
            xticks: Ticks::Auto,
            yticks: Ticks::Auto,
            xticklabels: true,
            cbar: true,
            frame: true,
            native: false,
            radius: None,
            label: None,
            window: None,
            extra: BTreeMap::new(),
        }
    }
}

/// One change applied when deriving panel options.
#[derive(Debug, Clone, PartialEq)]
pub enum Override {
    Vmin(f64),
    Vmax(f64),
    /// Set `vmin` only when the caller left it unset.
    DefaultVmin(f64),
    /// Set `vmax` only when the caller left it unset.
    DefaultVmax(f64),
    /// Add to whichever of `vmin`/`vmax` are set.
    ShiftRange(f64),
    Cmap(String),
    Log(bool),
    Average(bool),
    Sum(bool),
    HalfCut(bool),
    XLabel(bool),
    YLabel(bool),
    XTicks(Ticks),
    YTicks(Ticks),
    XTickLabels(bool),
    Cbar(bool),
    Frame(bool),
    Native(bool),
    Label(String),
    Window([f64; 4]),
}

impl DisplayOptions {
    /// New options with `overrides` applied in order. `self` is untouched.
    pub fn with(&self, overrides: &[Override]) -> DisplayOptions {
        let mut out = self.clone();
        for o in overrides {
            out.apply(o);
        }
        out
    }

    fn apply(&mut self, o: &Override) {
        match o {
            Override::Vmin(v) => self.vmin = Some(*v),
            Override::Vmax(v) => self.vmax = Some(*v),
            Override::DefaultVmin(v) => {
                self.vmin.get_or_insert(*v);
            }
            Override::DefaultVmax(v) => {
                self.vmax.get_or_insert(*v);
            }
            Override::ShiftRange(d) => {
                self.vmin = self.vmin.map(|v| v + d);
                self.vmax = self.vmax.map(|v| v + d);
            }
            Override::Cmap(c) => self.cmap = Some(c.clone()),
            Override::Log(b) => self.log = *b,
            Override::Average(b) => self.average = *b,
            Override::Sum(b) => self.sum = *b,
            Override::HalfCut(b) => self.half_cut = *b,
            Override::XLabel(b) => self.xlabel = *b,
            Override::YLabel(b) => self.ylabel = *b,
            Override::XTicks(t) => self.xticks = *t,
            Override::YTicks(t) => self.yticks = *t,
            Override::XTickLabels(b) => self.xticklabels = *b,
            Override::Cbar(b) => self.cbar = *b,
            Override::Frame(b) => self.frame = *b,
            Override::Native(b) => self.native = *b,
            Override::Label(s) => self.label = Some(s.clone()),
            Override::Window(w) => self.window = Some(*w),
        }
    }
}

/// Strip every decoration: labels, ticks, colorbar and frame.
pub fn bare() -> Vec<Override> {
    vec![
        Override::XLabel(false),
        Override::YLabel(false),
        Override::XTicks(Ticks::Hidden),
        Override::YTicks(Ticks::Hidden),
        Override::Cbar(false),
        Override::Frame(false),
    ]
}

/// Color scale used by the flag and failure count panels.
pub fn count_scale(vmax: f64) -> Vec<Override> {
    vec![
        Override::Vmin(0.0),
        Override::Vmax(vmax),
        Override::Cmap("Reds".to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_leaves_source_untouched() {
        let base = DisplayOptions {
            vmin: Some(-2.0),
            ..DisplayOptions::default()
        };
        let derived = base.with(&[Override::Vmin(0.0), Override::Cmap("Reds".into())]);
        assert_eq!(base.vmin, Some(-2.0));
        assert_eq!(base.cmap, None);
        assert_eq!(derived.vmin, Some(0.0));
        assert_eq!(derived.cmap.as_deref(), Some("Reds"));
    }

    #[test]
    fn defaults_only_fill_unset() {
        let set = DisplayOptions {
            vmin: Some(-3.0),
            ..DisplayOptions::default()
        };
        let o = set.with(&[Override::DefaultVmin(-6.0), Override::DefaultVmax(1.0)]);
        assert_eq!((o.vmin, o.vmax), (Some(-3.0), Some(1.0)));
    }

    #[test]
    fn shift_moves_both_ends() {
        let o = DisplayOptions::default()
            .with(&[Override::Vmin(-6.0), Override::Vmax(1.0), Override::ShiftRange(0.15)]);
        assert!((o.vmin.unwrap() + 5.85).abs() < 1e-12);
        assert!((o.vmax.unwrap() - 1.15).abs() < 1e-12);
    }

    #[test]
    fn unknown_keys_are_tolerated() {
        let o: DisplayOptions =
            serde_json::from_str(r#"{"vmin": -4, "log": true, "shading": "gouraud"}"#).unwrap();
        assert_eq!(o.vmin, Some(-4.0));
        assert!(o.log);
        assert!(o.cbar, "missing keys keep their defaults");
        assert_eq!(o.extra["shading"], serde_json::json!("gouraud"));
    }
}
