//! Rasterize a [`Figure`] to **SVG** or **PNG**.
//!
//! - Output backend chosen from the file extension (`.svg`, anything else is bitmap)
//! - One cartesian chart per axes, placed from its grid region and the figure spacing
//! - Meshes filled per cell through a named colormap, with optional colorbar
//! - Ticks, tick labels and axis labels follow each axes' decorations
//! - History lines with a vertical marker at the snapshot time

pub mod colormap;
pub mod text;

use crate::figure::{Artist, Axes, Decor, Figure, Rect};
use anyhow::{Result, anyhow};
use colormap::Colormap;
use log::debug;

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::LineSeries;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::ops::Range;
use std::path::Path;
use std::sync::OnceLock;

const TITLE_PX: u32 = 14;
const LABEL_PX: u32 = 12;
const TICK_PX: u32 = 10;
const SUPTITLE_PX: u32 = 18;
const MARGIN: u32 = 4;
/// Label area widths for y tick labels, x tick labels and an axis description.
const Y_TICK_AREA: u32 = 40;
const X_TICK_AREA: u32 = 20;
const DESC_AREA: u32 = 18;
const N_TICKS: usize = 5;
/// Share of an axes' width given to its colorbar.
const CBAR_FRAC: f64 = 0.16;
const CBAR_STEPS: usize = 64;

/// `ab_glyph` doesn't discover OS fonts, so "sans-serif" is registered from
/// the bundled DejaVu Sans on first use.
static FONT_READY: OnceLock<bool> = OnceLock::new();

fn ensure_fonts_registered() -> Result<()> {
    let ready = *FONT_READY.get_or_init(|| {
        plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        )
        .is_ok()
    });
    if ready {
        Ok(())
    } else {
        Err(anyhow!("bundled sans-serif font could not be registered"))
    }
}

/// Write `fig` to `out_path` at `width` x `height` pixels.
pub fn save_figure<P: AsRef<Path>>(
    fig: &Figure,
    out_path: P,
    width: u32,
    height: u32,
) -> Result<()> {
    if fig.axes().is_empty() {
        return Err(anyhow!("figure has no axes to draw"));
    }
    ensure_fonts_registered()?;
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();

    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_figure(&root, fig)?;
        root.present().map_err(|e| anyhow!("{:?}", e))?;
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_figure(&root, fig)?;
        root.present().map_err(|e| anyhow!("{:?}", e))?;
    }
    debug!("wrote {}", out_path.display());
    Ok(())
}

/// Pixel origin and size of a figure-fraction rectangle (origin top-left).
fn pixel_box(r: Rect, w: u32, h: u32) -> ((i32, i32), (u32, u32)) {
    let x0 = (r.x0 * w as f64).round();
    let y0 = (r.y0 * h as f64).round();
    let x1 = (r.x1 * w as f64).round();
    let y1 = (r.y1 * h as f64).round();
    (
        (x0 as i32, y0 as i32),
        ((x1 - x0).max(1.0) as u32, (y1 - y0).max(1.0) as u32),
    )
}

/// Data ranges `(x, y)` covering everything on an axes.
fn data_bounds(axes: &Axes) -> Option<(Range<f64>, Range<f64>)> {
    let pts: Vec<(f64, f64)> = axes
        .artists
        .iter()
        .flat_map(|a| match a {
            Artist::Mesh { cells, .. } => cells.iter().flat_map(|c| c.corners).collect::<Vec<_>>(),
            Artist::Line { points, .. } => points.clone(),
        })
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    let (first, rest) = pts.split_first()?;
    let (mut x0, mut x1, mut y0, mut y1) = (first.0, first.0, first.1, first.1);
    for &(x, y) in rest {
        x0 = x0.min(x);
        x1 = x1.max(x);
        y0 = y0.min(y);
        y1 = y1.max(y);
    }
    if (x1 - x0).abs() < f64::EPSILON {
        x0 -= 0.5;
        x1 += 0.5;
    }
    if (y1 - y0).abs() < f64::EPSILON {
        y0 -= 0.5;
        y1 += 0.5;
    }
    Some((x0..x1, y0..y1))
}

/// Widen the narrower range so one data unit spans the same number of pixels on both axes.
fn equal_aspect(x: Range<f64>, y: Range<f64>, plot_px: (u32, u32)) -> (Range<f64>, Range<f64>) {
    let (w, h) = (plot_px.0.max(1) as f64, plot_px.1.max(1) as f64);
    let per_px = ((x.end - x.start) / w).max((y.end - y.start) / h);
    let centred = |r: Range<f64>, px: f64| {
        let mid = (r.start + r.end) / 2.0;
        let half = per_px * px / 2.0;
        mid - half..mid + half
    };
    (centred(x, w), centred(y, h))
}

/// Label area sizes `(left, bottom)` reserved for an axes' decorations.
fn label_areas(decor: &Decor) -> (u32, u32) {
    let mut left = 0;
    let mut bottom = 0;
    if decor.yticks {
        left += Y_TICK_AREA;
    }
    if decor.ylabel.is_some() {
        left += DESC_AREA;
    }
    if decor.xticks {
        bottom += X_TICK_AREA;
    }
    if decor.xlabel.is_some() {
        bottom += DESC_AREA;
    }
    (left, bottom)
}

fn tick_label(v: &f64) -> String {
    let s = format!("{v:.3}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn draw_figure<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, fig: &Figure) -> Result<()> {
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    let (w, h) = root.dim_in_pixel();
    let spacing = fig.spacing();

    for (n, axes) in fig.axes().iter().enumerate() {
        let (origin, size) = pixel_box(axes.region.rect(&spacing), w, h);
        debug!("axes {n} at {origin:?} size {size:?}");
        let area = root.clone().shrink(origin, size);
        draw_axes(&area, axes)?;
    }

    if let Some(title) = fig.title() {
        let style = TextStyle::from((FontFamily::SansSerif, SUPTITLE_PX))
            .pos(Pos::new(HPos::Center, VPos::Top));
        let line_h = SUPTITLE_PX as i32 + 4;
        let lines = text::wrap_to_width(title, SUPTITLE_PX, w.saturating_sub(20));
        for (i, line) in lines.iter().enumerate() {
            root.draw_text(line, &style, (w as i32 / 2, 4 + i as i32 * line_h))
                .map_err(|e| anyhow!("{:?}", e))?;
        }
    }
    Ok(())
}

fn draw_axes<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, axes: &Axes) -> Result<()> {
    let area = match (&axes.title, axes.visible) {
        (Some(title), true) => {
            let fitted = text::fit_to_width(title, TITLE_PX, area.dim_in_pixel().0);
            area.titled(&fitted, (FontFamily::SansSerif, TITLE_PX))
                .map_err(|e| anyhow!("{:?}", e))?
        }
        _ => area.clone(),
    };

    let mesh = axes.artists.iter().find_map(|a| match a {
        Artist::Mesh {
            vmin, vmax, cmap, ..
        } => Some((*vmin, *vmax, cmap.as_str())),
        Artist::Line { .. } => None,
    });
    let (plot_area, bar_area) = match mesh {
        Some(_) if axes.decor.cbar => {
            let w = area.dim_in_pixel().0 as f64;
            let (p, b) = area.split_horizontally((w * (1.0 - CBAR_FRAC)).round() as i32);
            (p, Some(b))
        }
        _ => (area, None),
    };

    let Some((xr, yr)) = data_bounds(axes) else {
        return Ok(());
    };
    let (left, bottom) = if axes.visible {
        label_areas(&axes.decor)
    } else {
        (0, 0)
    };
    let equal = axes
        .artists
        .iter()
        .any(|a| matches!(a, Artist::Mesh { equal_aspect: true, .. }));
    let (xr, yr) = if equal {
        let (w, h) = plot_area.dim_in_pixel();
        let inner = (
            w.saturating_sub(left + 2 * MARGIN),
            h.saturating_sub(bottom + 2 * MARGIN),
        );
        equal_aspect(xr, yr, inner)
    } else {
        (xr, yr)
    };

    let mut chart = ChartBuilder::on(&plot_area)
        .margin(MARGIN)
        .set_label_area_size(LabelAreaPosition::Left, left)
        .set_label_area_size(LabelAreaPosition::Bottom, bottom)
        .build_cartesian_2d(xr.clone(), yr.clone())
        .map_err(|e| anyhow!("{:?}", e))?;

    for artist in &axes.artists {
        match artist {
            Artist::Mesh {
                cells,
                vmin,
                vmax,
                cmap,
                ..
            } => {
                let cm = Colormap::named(cmap);
                chart
                    .draw_series(cells.iter().filter(|c| c.value.is_finite()).map(|c| {
                        Polygon::new(c.corners.to_vec(), cm.color(c.value, *vmin, *vmax).filled())
                    }))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
            Artist::Line { points, marker, .. } => {
                let finite = points
                    .iter()
                    .copied()
                    .filter(|(x, y)| x.is_finite() && y.is_finite());
                chart
                    .draw_series(LineSeries::new(finite, BLUE.stroke_width(1)))
                    .map_err(|e| anyhow!("{:?}", e))?;
                if let Some(t) = marker {
                    chart
                        .draw_series(LineSeries::new(
                            [(*t, yr.start), (*t, yr.end)],
                            RED.stroke_width(1),
                        ))
                        .map_err(|e| anyhow!("{:?}", e))?;
                }
            }
        }
    }

    if axes.visible {
        let decor = &axes.decor;
        let blank = |_: &f64| String::new();
        let x_fmt: &dyn Fn(&f64) -> String = if decor.xticklabels {
            &tick_label
        } else {
            &blank
        };
        let mut mesh_style = chart.configure_mesh();
        mesh_style
            .disable_mesh()
            .x_labels(if decor.xticks { N_TICKS } else { 0 })
            .y_labels(if decor.yticks { N_TICKS } else { 0 })
            .x_label_formatter(x_fmt)
            .y_label_formatter(&tick_label)
            .label_style((FontFamily::SansSerif, TICK_PX))
            .axis_desc_style((FontFamily::SansSerif, LABEL_PX));
        if let Some(x) = &decor.xlabel {
            mesh_style.x_desc(x.as_str());
        }
        if let Some(y) = &decor.ylabel {
            mesh_style.y_desc(y.as_str());
        }
        mesh_style.draw().map_err(|e| anyhow!("{:?}", e))?;

        if decor.frame {
            chart
                .plotting_area()
                .draw(&Rectangle::new(
                    [(xr.start, yr.start), (xr.end, yr.end)],
                    BLACK.stroke_width(1),
                ))
                .map_err(|e| anyhow!("{:?}", e))?;
        }
    }

    if let (Some(bar), Some((vmin, vmax, cmap))) = (bar_area, mesh) {
        draw_colorbar(&bar, Colormap::named(cmap), vmin, vmax)?;
    }
    Ok(())
}

fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    cm: Colormap,
    vmin: f64,
    vmax: f64,
) -> Result<()> {
    let mut chart = ChartBuilder::on(area)
        .margin(MARGIN)
        .set_label_area_size(LabelAreaPosition::Left, Y_TICK_AREA)
        .build_cartesian_2d(0.0..1.0, vmin..vmax)
        .map_err(|e| anyhow!("{:?}", e))?;

    let step = (vmax - vmin) / CBAR_STEPS as f64;
    chart
        .draw_series((0..CBAR_STEPS).map(|s| {
            let lo = vmin + step * s as f64;
            let t = (s as f64 + 0.5) / CBAR_STEPS as f64;
            Rectangle::new([(0.0, lo), (1.0, lo + step)], cm.sample(t).filled())
        }))
        .map_err(|e| anyhow!("{:?}", e))?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(0)
        .y_labels(N_TICKS)
        .y_label_formatter(&tick_label)
        .label_style((FontFamily::SansSerif, TICK_PX))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;
    chart
        .plotting_area()
        .draw(&Rectangle::new([(0.0, vmin), (1.0, vmax)], BLACK.stroke_width(1)))
        .map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}
