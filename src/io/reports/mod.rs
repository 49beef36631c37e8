//! Report rendering (tables, SVG plots, templates) and output.

mod generator;
mod plots;
mod tables;
mod templates;

pub use generator::{display_report, Report, ReportGenerator, ReportOutcome};
pub use plots::render_svg;
pub use tables::{escape_latex, format_cell, render_markdown};
