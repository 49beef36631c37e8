//! # Kelpie Reports: Paper Figures and Tables from Experiment Results
//!
//! Turns the result files produced by the Kelpie explanation experiments
//! into the tables and plots of the paper. Every report is a pure function
//! of its result file, so regenerating a report yields the same bytes.
//!
//! - **Tables**: end-to-end effectiveness (ΔH@1, ΔMRR) as markdown, LaTeX or CSV
//! - **Plots**: explanation lengths, extraction times, prefilter comparison
//!   and xsi threshold sweeps as SVG
//! - **Batch**: the full paper sequence, sequentially or on a thread pool
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    CLI / Batch Runner                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │   Core             │   Reports          │   I/O             │
//! │ • Config           │ • End-to-end       │ • Generator       │
//! │ • Errors           │ • Lengths          │ • Tables          │
//! │ • Records          │ • Times            │ • Plots (SVG)     │
//! │ • Statistics       │ • Prefilters, xsi  │ • Templates       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kelpie_reports::{Mode, Model, ReportConfig, ReportGenerator, ReportKind, ReportsConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let generator = ReportGenerator::new(ReportsConfig::default())?;
//!     let config = ReportConfig::new(
//!         ReportKind::ExplanationLengths,
//!         Some(Mode::Necessary),
//!         Some(Model::ComplEx),
//!         true,
//!     )?;
//!
//!     let outcome = generator.generate(&config, &mut std::io::stdout())?;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

#[cfg(feature = "mimalloc")]
#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

// Configuration, errors and record handling
pub mod core {
    //! Configuration, errors, result records and summary statistics.

    pub mod config;
    pub mod errors;
    pub mod records;
    pub mod statistics;
}

// Per-kind aggregations
pub mod reports;

// Rendering and persistence
pub mod io {
    //! Report rendering, templates and output.

    pub mod reports;
}

// Batch execution
pub mod api {
    //! High-level batch interface.

    pub mod batch;
}

// Re-export primary types for convenience
pub use api::batch::{BatchJob, BatchPlan, BatchRunner, BatchSummary};
pub use core::config::{Mode, Model, ReportsConfig, TableFormat};
pub use core::errors::{ReportError, Result};
pub use io::reports::{Report, ReportGenerator, ReportOutcome};
pub use reports::{ReportConfig, ReportKind};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
