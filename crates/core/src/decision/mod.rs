//! Decision module - what the user sees when a full live switch is not possible.

mod decision_surface;

pub use decision_surface::{DecisionAction, DecisionSurface};
