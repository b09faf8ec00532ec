//! Error type shared by the library.
//!
//! Recipes never recover from these locally: a missing field or a malformed
//! layout aborts the figure and the driver decides whether to skip the frame.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FigureError {
    #[error("snapshot has no field named '{0}'")]
    MissingField(String),

    #[error("history has no series named '{0}'")]
    MissingSeries(String),

    #[error("recipe '{0}' plots history series but no history was supplied")]
    MissingHistory(String),

    #[error("display option '{0}' is required by this recipe")]
    MissingOption(&'static str),

    #[error("unknown figure recipe '{0}'")]
    UnknownRecipe(String),

    #[error("unknown view '{0}', expected one of: poloidal, toroidal, both")]
    InvalidMode(String),

    #[error("recipe '{recipe}' cannot draw the '{view}' view")]
    UnsupportedView { recipe: String, view: String },

    #[error("recipe '{recipe}' expects {expected} panels but the enumeration yields {got}")]
    PanelCountMismatch {
        recipe: String,
        expected: usize,
        got: usize,
    },

    #[error("panel index {index} does not fit a {rows}x{cols} grid")]
    GridOverflow {
        index: usize,
        rows: usize,
        cols: usize,
    },

    #[error("canvas already holds {0} axes; recipes need an empty canvas")]
    CanvasNotEmpty(usize),

    #[error("no axes with id {0} on this canvas")]
    UnknownAxes(usize),

    #[error("index {index} out of range for axis of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, FigureError>;
