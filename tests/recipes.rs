mod common;

use harm_figures::figure::catalog::{self, RecipeParams, View};
use harm_figures::figure::{Artist, Canvas, Figure, FigureRegistry};
use harm_figures::{DisplayOptions, FigureError, FlagKind, FlagSet, Snapshot};

fn shell_options() -> DisplayOptions {
    DisplayOptions {
        radius: Some(3.0),
        ..DisplayOptions::default()
    }
}

#[test]
fn every_figure_draws_its_declared_panels() {
    let expected = [
        ("simplest", 2),
        ("simpler", 2),
        ("simple", 3),
        ("traditional", 5),
        ("prims", 8),
        ("vecs_prim", 7),
        ("vecs_cov", 8),
        ("vecs_con", 8),
        ("ejection", 2),
        ("b_bug", 3),
        ("e_ratio", 4),
        ("e_ratio_funnel", 4),
        ("conservation", 3),
        ("energies", 4),
        ("floors", 10),
        ("fails", 8),
        ("old_floors", 8),
    ];
    let registry = FigureRegistry::standard();
    assert_eq!(registry.len(), expected.len());

    let snap = common::full_snapshot(100.0);
    let hist = common::history();
    let opts = shell_options();
    for (name, panels) in expected {
        let recipe = registry.build(name, &RecipeParams::default()).unwrap();
        assert_eq!(recipe.panel_count(), panels, "{name}");

        let mut fig = Figure::new();
        recipe
            .produce(&mut fig, &snap, Some(&hist), &opts)
            .unwrap_or_else(|e| panic!("{name}: {e}"));
        assert_eq!(fig.axes_count(), recipe.axes_count(), "{name}");
        assert_eq!(fig.populated_axes(), recipe.axes_count(), "{name}");
    }
}

#[test]
fn simplest_view_switch() {
    let both = catalog::simplest(View::Both, "log_rho").unwrap();
    assert_eq!(both.panel_count(), 2);
    let pol = catalog::simplest(View::Poloidal, "log_rho").unwrap();
    assert_eq!(pol.panel_count(), 1);

    assert!(matches!(
        "diagonal".parse::<View>(),
        Err(FigureError::InvalidMode(_))
    ));

    let snap = common::full_snapshot(1.0);
    let mut fig = Figure::new();
    both.produce(&mut fig, &snap, None, &DisplayOptions::default())
        .unwrap();
    assert!(fig.axes().iter().all(|a| !a.visible));
    // the toroidal half is shifted up by 0.15 from the default scale
    let ranges: Vec<(f64, f64)> = fig
        .axes()
        .iter()
        .map(|a| match &a.artists[0] {
            Artist::Mesh { vmin, vmax, .. } => (*vmin, *vmax),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(ranges[0], (-6.0, 1.0));
    assert!((ranges[1].0 + 5.85).abs() < 1e-12);
    assert!((ranges[1].1 - 1.15).abs() < 1e-12);
}

#[test]
fn options_do_not_leak_between_calls_or_panels() {
    let snap = common::full_snapshot(50.0);
    let hist = common::history();
    let opts = DisplayOptions {
        cmap: Some("viridis".into()),
        ..DisplayOptions::default()
    };
    let before = opts.clone();
    let recipe = catalog::e_ratio().unwrap();

    let mut a = Figure::new();
    let mut b = Figure::new();
    recipe.produce(&mut a, &snap, Some(&hist), &opts).unwrap();
    recipe.produce(&mut b, &snap, Some(&hist), &opts).unwrap();
    assert_eq!(a, b);
    assert_eq!(opts, before);

    let cmap_of = |fig: &Figure, n: usize| match &fig.axes()[n].artists[0] {
        Artist::Mesh { cmap, .. } => cmap.clone(),
        other => panic!("unexpected {other:?}"),
    };
    assert_eq!(cmap_of(&a, 0), "viridis");
    assert_eq!(cmap_of(&a, 6), "Reds");
    assert_eq!(a.axes()[6].title.as_deref(), Some("Failures"));
    assert_eq!(a.axes()[0].title.as_deref(), Some("log₁₀(U / ρ)"));
}

#[test]
fn simple_draws_three_views_on_the_given_canvas() {
    let snap = common::full_snapshot(30.0);
    let hist = common::history();
    let recipe = catalog::simple().unwrap();

    let mut fig = Figure::new();
    let given: *const Figure = &fig;
    let out = recipe
        .produce(&mut fig, &snap, Some(&hist), &DisplayOptions::default())
        .unwrap();
    assert!(std::ptr::eq(out as *const Figure, given));

    assert_eq!(recipe.panel_count(), 3);
    let sources: Vec<&str> = fig
        .axes()
        .iter()
        .map(|a| a.artists[0].source())
        .collect();
    assert_eq!(sources, ["rho", "rho", "Mdot", "phi_b"]);
    match &fig.axes()[2].artists[0] {
        Artist::Line { marker, points, .. } => {
            assert_eq!(*marker, Some(30.0));
            assert_eq!(points.len(), 20);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(fig.axes()[2].decor.xlabel.is_none());
    assert_eq!(fig.spacing().hspace, 0.25);
}

#[test]
fn floors_with_five_flags() {
    let flags = FlagSet::new(
        "five",
        FlagKind::Bits,
        &[("A", 1), ("B", 2), ("C", 4), ("D", 8), ("E", 16)],
    );
    let recipe = catalog::floors(&flags).unwrap();
    assert_eq!(recipe.panel_count(), 6);

    let snap = common::full_snapshot(1234.56);
    let mut fig = Figure::new();
    recipe
        .produce(&mut fig, &snap, None, &DisplayOptions::default())
        .unwrap();
    assert_eq!(fig.axes_count(), 6);

    // fflag is nonzero only on the innermost radial shell
    let [_, n2, n3] = common::SHAPE;
    let title = fig.title().unwrap();
    assert_eq!(title, format!("t = 1234, Total floor hits: {}", n2 * n3));
    assert_eq!(fig.axes()[1].title.as_deref(), Some("A"));
}

#[test]
fn flag_layout_mismatches_are_errors() {
    let short = FlagSet::new("short", FlagKind::Codes, &[("neg_input", 1)]);
    assert!(matches!(
        catalog::fails(&short),
        Err(FigureError::PanelCountMismatch { expected: 8, got: 2, .. })
    ));
}

#[test]
fn funnel_needs_a_radius() {
    let snap = common::full_snapshot(1.0);
    let recipe = catalog::e_ratio_funnel().unwrap();
    let mut fig = Figure::new();
    let err = recipe
        .produce(&mut fig, &snap, None, &DisplayOptions::default())
        .unwrap_err();
    assert!(matches!(err, FigureError::MissingOption("radius")));
    assert_eq!(fig.axes_count(), 0);
}

#[test]
fn empty_theta_axis_fails_before_drawing() {
    let snap = Snapshot::new(3.0, [4, 0, 4]);
    let opts = DisplayOptions {
        radius: Some(2.0),
        half_cut: true,
        ..DisplayOptions::default()
    };
    let mut fig = Figure::new();
    let err = catalog::e_ratio_funnel()
        .unwrap()
        .produce(&mut fig, &snap, None, &opts)
        .unwrap_err();
    assert!(matches!(err, FigureError::MissingField(_)));
    assert_eq!(fig.axes_count(), 0);
}
