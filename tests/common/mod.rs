#![allow(dead_code)]

use harm_figures::{Field3, History, Snapshot};

pub const SHAPE: [usize; 3] = [8, 6, 104];

/// Snapshot carrying every field the standard figures read.
pub fn full_snapshot(t: f64) -> Snapshot {
    let mut snap = Snapshot::new(t, SHAPE);
    let smooth = |scale: f64| {
        Field3::from_fn(SHAPE, move |i, j, k| {
            scale * (1.0 + i as f64) / (1.0 + 0.1 * j as f64 + 0.01 * k as f64)
        })
    };
    let positive = [
        ("RHO", 1.0),
        ("UU", 0.1),
        ("bsq", 0.05),
        ("beta", 20.0),
        ("JE0", 500.0),
        ("JE1", 300.0),
    ];
    for (name, scale) in positive {
        snap.insert(name, smooth(scale)).unwrap();
    }
    let components = [
        "U1", "U2", "U3", "B1", "B2", "B3", "u_0", "u_r", "u_th", "u_3", "b_0", "b_r", "b_th",
        "b_3", "u^0", "u^r", "u^th", "u^3", "b^0", "b^r", "b^th", "b^3",
    ];
    for name in components {
        snap.insert(name, smooth(0.5)).unwrap();
    }
    snap.insert(
        "fflag",
        Field3::from_fn(SHAPE, |i, j, _| if i == 0 { (1 << (j % 5)) as f64 } else { 0.0 }),
    )
    .unwrap();
    snap.insert(
        "pflag",
        Field3::from_fn(SHAPE, |i, j, k| if i == 1 && k < 2 { (1 + j) as f64 } else { 0.0 }),
    )
    .unwrap();
    snap
}

pub fn history() -> History {
    let t: Vec<f64> = (0..20).map(|n| n as f64 * 10.0).collect();
    let mdot = t.iter().map(|x| 1.0 + x / 100.0).collect();
    let phi = t.iter().map(|x| (x / 50.0).sin() + 2.0).collect();
    History::new(t)
        .with_series("Mdot", mdot)
        .unwrap()
        .with_series("phi_b", phi)
        .unwrap()
}
