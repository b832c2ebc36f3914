//! # pbixroll
//!
//! Batch roll-forward of date-period slicer defaults in PBIX report
//! containers.
//!
//! A report container is a ZIP bundle whose `Report/Layout` member (UTF-16LE
//! text) carries the default values of year, month, and quarter slicers as
//! escaped value literals. Once a month closes, every report in a working
//! directory should present the month that just ended. This crate discovers
//! the containers, unpacks each one to a scratch tree, removes the
//! `SecurityBindings` integrity artifact (and its manifest declaration) so
//! the edited file stays openable, rewrites the period literals in the
//! layout resource, and repacks a valid container with the data-model blob
//! left uncompressed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pbixroll::{NoProgress, RollOptions, Workspace};
//!
//! fn main() -> pbixroll::Result<()> {
//!     let workspace = Workspace::open("/data/reports")?;
//!     // Derive the target period from the current date and repack into
//!     // the reserved results tree.
//!     let report = pbixroll::run(&workspace, &RollOptions::default(), &NoProgress)?;
//!     println!(
//!         "{} updated, {} failed",
//!         report.succeeded(),
//!         report.failed()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Explicit periods
//!
//! ```rust,no_run
//! use pbixroll::{NoProgress, OutputMode, RollOptions, Workspace};
//!
//! fn main() -> pbixroll::Result<()> {
//!     let workspace = Workspace::open("/data/reports")?;
//!     let options = RollOptions {
//!         // Roll every report to April 2024, replacing 2023 year literals.
//!         period: Some((2024, 4)),
//!         old_year: Some(2023),
//!         // Overwrite originals; a timestamped backup is always taken first.
//!         output: OutputMode::InPlace,
//!         ..RollOptions::default()
//!     };
//!     let report = pbixroll::run(&workspace, &options, &NoProgress)?;
//!     println!("{} container(s) updated", report.succeeded());
//!     Ok(())
//! }
//! ```
//!
//! ## Failure model
//!
//! Per-container errors (invalid archive, undecodable layout, disk trouble)
//! fail that container only; the batch continues and the [`BatchReport`]
//! records each outcome. Configuration and discovery errors abort the run
//! before any container is touched. Originals are never overwritten until a
//! complete replacement exists on disk.

pub mod archive;
pub mod bindings;
pub mod error;
pub mod layout;
pub mod period;
pub mod pipeline;
pub mod progress;
pub mod rules;
pub mod workspace;

pub use error::{Error, Result};

// Re-export the period API at crate root for convenience
pub use period::{resolve, resolve_at, Period, ResolvedPeriod};

// Re-export the rule API at crate root for convenience
pub use rules::{LiteralKind, ReplacementRule, RuleSet};

// Re-export the pipeline API at crate root for convenience
pub use pipeline::{run, BatchReport, ContainerOutcome, OutputMode, RollOptions};

// Re-export supporting types
pub use archive::BuildResult;
pub use layout::PatchSummary;
pub use progress::{BatchProgress, NoProgress};
pub use workspace::{ContainerRef, Workspace};
