//! harm_figures
//!
//! Declarative multi-panel figures for GRMHD simulation snapshots. Pairs
//! with the `harmfig` CLI.
//!
//! ### Features
//! - A catalog of named figure recipes (slices, history lines, flag grids)
//! - One interpreter that lays any recipe out on a [`figure::Canvas`]
//! - Immutable display options with per-panel overrides
//! - Snapshot JSON, history CSV and options JSON loaders
//! - SVG/PNG output through plotters
//!
//! ### Example
//! ```no_run
//! use harm_figures::figure::{Figure, FigureRegistry, RecipeParams};
//! use harm_figures::{DisplayOptions, storage, viz};
//!
//! let snap = storage::load_snapshot_json("dump_00100.json")?;
//! let hist = storage::load_history_csv("history.csv")?;
//! let recipe = FigureRegistry::standard().build("simple", &RecipeParams::default())?;
//! let mut fig = Figure::new();
//! recipe.produce(&mut fig, &snap, Some(&hist), &DisplayOptions::default())?;
//! viz::save_figure(&fig, "frame_00100.svg", 1600, 1200)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod error;
pub mod figure;
pub mod flags;
pub mod models;
pub mod options;
pub mod slices;
pub mod stats;
pub mod storage;
pub mod variables;
pub mod viz;

pub use error::{FigureError, Result};
pub use flags::{FlagKind, FlagSet};
pub use models::{Field3, History, Snapshot};
pub use options::{DisplayOptions, Override};
pub use variables::FieldExpr;
