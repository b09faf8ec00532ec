//! Named colormaps sampled on `[0, 1]`.

use log::warn;
use plotters::style::RGBColor;

type Stops = &'static [(f64, (u8, u8, u8))];

const JET: Stops = &[
    (0.0, (0, 0, 128)),
    (0.11, (0, 0, 255)),
    (0.125, (0, 0, 255)),
    (0.34, (0, 219, 255)),
    (0.35, (0, 229, 246)),
    (0.64, (246, 255, 1)),
    (0.65, (255, 234, 0)),
    (0.89, (255, 0, 0)),
    (1.0, (128, 0, 0)),
];

const REDS: Stops = &[
    (0.0, (255, 245, 240)),
    (0.25, (252, 187, 161)),
    (0.5, (251, 106, 74)),
    (0.75, (203, 24, 29)),
    (1.0, (103, 0, 13)),
];

const VIRIDIS: Stops = &[
    (0.0, (68, 1, 84)),
    (0.25, (59, 82, 139)),
    (0.5, (33, 145, 140)),
    (0.75, (94, 201, 98)),
    (1.0, (253, 231, 37)),
];

const RDBU_R: Stops = &[
    (0.0, (5, 48, 97)),
    (0.25, (67, 147, 195)),
    (0.5, (247, 247, 247)),
    (0.75, (214, 96, 77)),
    (1.0, (103, 0, 31)),
];

const GRAY: Stops = &[(0.0, (0, 0, 0)), (1.0, (255, 255, 255))];

#[derive(Debug, Clone, Copy)]
pub struct Colormap {
    stops: Stops,
    reversed: bool,
}

impl Colormap {
    /// Look up a colormap by its matplotlib name; a `_r` suffix reverses it.
    /// Unknown names fall back to `jet`.
    pub fn named(name: &str) -> Self {
        let (base, reversed) = match name.strip_suffix("_r") {
            Some(b) => (b, true),
            None => (name, false),
        };
        let stops = match base.to_ascii_lowercase().as_str() {
            "jet" => JET,
            "reds" => REDS,
            "viridis" => VIRIDIS,
            "rdbu" => {
                return Self {
                    stops: RDBU_R,
                    reversed: !reversed,
                };
            }
            "gray" | "grey" => GRAY,
            other => {
                warn!("unknown colormap '{other}', using jet");
                JET
            }
        };
        Self { stops, reversed }
    }

    /// Color at `t`, clamped to `[0, 1]`.
    pub fn sample(&self, t: f64) -> RGBColor {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let t = if self.reversed { 1.0 - t } else { t };
        let upper = self
            .stops
            .iter()
            .position(|(s, _)| *s >= t)
            .unwrap_or(self.stops.len() - 1);
        if upper == 0 {
            let (r, g, b) = self.stops[0].1;
            return RGBColor(r, g, b);
        }
        let (s0, c0) = self.stops[upper - 1];
        let (s1, c1) = self.stops[upper];
        let f = if s1 > s0 { (t - s0) / (s1 - s0) } else { 0.0 };
        let mix = |a: u8, b: u8| (a as f64 + f * (b as f64 - a as f64)).round() as u8;
        RGBColor(mix(c0.0, c1.0), mix(c0.1, c1.1), mix(c0.2, c1.2))
    }

    /// Color for `value` on the `[vmin, vmax]` scale.
    pub fn color(&self, value: f64, vmin: f64, vmax: f64) -> RGBColor {
        let span = vmax - vmin;
        let t = if span.abs() < f64::EPSILON {
            0.5
        } else {
            (value - vmin) / span
        };
        self.sample(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ends_and_reversal() {
        let reds = Colormap::named("Reds");
        assert_eq!(reds.sample(0.0), RGBColor(255, 245, 240));
        assert_eq!(reds.sample(1.0), RGBColor(103, 0, 13));
        assert_eq!(reds.sample(7.0), RGBColor(103, 0, 13));
        let r = Colormap::named("Reds_r");
        assert_eq!(r.sample(0.0), RGBColor(103, 0, 13));
    }

    #[test]
    fn rdbu_r_runs_blue_to_red() {
        let c = Colormap::named("RdBu_r");
        assert_eq!(c.sample(0.0), RGBColor(5, 48, 97));
        let c = Colormap::named("RdBu");
        assert_eq!(c.sample(0.0), RGBColor(103, 0, 31));
    }

    #[test]
    fn unknown_falls_back_to_jet() {
        let c = Colormap::named("no_such_map");
        assert_eq!(c.sample(0.0), Colormap::named("jet").sample(0.0));
        assert_eq!(c.color(5.0, 0.0, 10.0), Colormap::named("jet").sample(0.5));
    }
}
