//! Figure recipes: layout, the canvas seam, the standard catalog and its registry.

pub mod canvas;
pub mod catalog;
pub mod recipe;
pub mod registry;
pub mod scene;

pub use canvas::{AxesId, Canvas, Grid, Layer, Rect, Region, Spacing, SpacingAdjust};
pub use catalog::{RecipeParams, View};
pub use recipe::{Panel, Recipe, SlicePlane, TitleSpec};
pub use registry::FigureRegistry;
pub use scene::{Artist, Axes, Decor, Figure};
