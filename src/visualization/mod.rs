//! Visualization module: evaluation figures rendered to SVG.

mod evaluation_plot;

pub use evaluation_plot::render_evaluation;
