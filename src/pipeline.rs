//! Per-container pipeline and batch orchestration.
//!
//! Each container moves through a fixed sequence of states:
//!
//! ```text
//! Discovered → BackedUp → Extracted → BindingsStripped → LayoutPatched → Repacked → Done
//! ```
//!
//! Any step's failure short-circuits that container to a failed outcome; the
//! batch logs the container identity and the reason and keeps going. There is
//! no shared mutable state between containers, so with the `parallel` feature
//! the same pipeline fans out across a rayon worker pool; each container's
//! scratch tree is derived from its workspace path and file stem, so
//! concurrent extractions never collide.

use std::fs;

use chrono::Local;
use log::{debug, error, info, warn};

use crate::layout::PatchSummary;
use crate::period::resolve;
use crate::progress::BatchProgress;
use crate::rules::RuleSet;
use crate::workspace::{ContainerRef, Workspace};
use crate::{archive, bindings, layout, Error, Result};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Where repacked containers are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Repack into the reserved results tree, leaving originals untouched.
    #[default]
    Results,
    /// Overwrite the original container, after a successful backup.
    InPlace,
}

/// Options for one batch run.
#[derive(Debug, Clone, Default)]
pub struct RollOptions {
    /// Explicit target `(year, month)`; `None` derives from the current date.
    pub period: Option<(i32, u32)>,
    /// Old year literal to search for; `None` uses the previous period's year.
    pub old_year: Option<i32>,
    /// Process only this container instead of discovering the whole root.
    pub target: Option<ContainerRef>,
    /// Output destination for repacked containers.
    pub output: OutputMode,
    /// Copy originals into the timestamped backup tree before processing.
    pub backup: bool,
}

impl RollOptions {
    /// Whether this run takes backups.
    ///
    /// In-place output always does: the original is only ever overwritten
    /// after a successful backup exists.
    pub fn backup_enabled(&self) -> bool {
        self.backup || self.output == OutputMode::InPlace
    }
}

/// Pipeline states of one container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    BackedUp,
    Extracted,
    BindingsStripped,
    LayoutPatched,
    Repacked,
}

/// Outcome of one container's pipeline.
#[derive(Debug)]
pub struct ContainerOutcome {
    /// The container this outcome belongs to.
    pub container: ContainerRef,
    /// The patch summary, or the error that failed the container.
    pub result: Result<PatchSummary>,
}

/// Outcome of a whole batch.
#[must_use = "batch report should be checked for failed containers"]
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Per-container outcomes, in batch order.
    pub outcomes: Vec<ContainerOutcome>,
}

impl BatchReport {
    /// Number of containers processed successfully.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    /// Number of containers that failed.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Total literal replacements across successful containers.
    pub fn replacements(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|s| s.replacements)
            .sum()
    }
}

/// Runs the roll-forward batch over a working directory.
///
/// Configuration and discovery errors abort the run before any container is
/// touched; per-container errors are recorded in the report and the batch
/// continues.
pub fn run(
    workspace: &Workspace,
    options: &RollOptions,
    progress: &dyn BatchProgress,
) -> Result<BatchReport> {
    let resolved = resolve(options.period, options.old_year)?;
    let rules = RuleSet::for_period(&resolved)?;
    info!(
        "target period {}-{:02} (quarter {}), replacing year {}",
        resolved.target.year(),
        resolved.target.month(),
        resolved.target.quarter(),
        resolved.old_year
    );
    for rule in rules.rules() {
        debug!("rule {}: {} -> {}", rule.label(), rule.pattern(), rule.replacement());
    }

    let containers = match &options.target {
        Some(target) => vec![target.clone()],
        None => workspace.discover()?,
    };
    info!("{} container(s) to process", containers.len());

    let stamp = Local::now().format("%Y%m%d-%H%M%S").to_string();
    prepare_directories(workspace, options, &stamp, &containers)?;

    progress.on_batch_start(containers.len());

    let process = |container: &ContainerRef| {
        progress.on_container_start(container);
        let result = process_container(workspace, container, &rules, options, &stamp);
        if let Err(e) = &result {
            error!("{container}: {e}");
        }
        progress.on_container_done(container, &result);
        ContainerOutcome {
            container: container.clone(),
            result,
        }
    };

    #[cfg(feature = "parallel")]
    let outcomes: Vec<ContainerOutcome> = containers.par_iter().map(process).collect();
    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<ContainerOutcome> = containers.iter().map(process).collect();

    let report = BatchReport { outcomes };
    info!(
        "batch done: {} succeeded, {} failed, {} replacement(s)",
        report.succeeded(),
        report.failed(),
        report.replacements()
    );
    Ok(report)
}

/// Creates the reserved output trees, mirroring the workspace structure.
///
/// Creation is idempotent and race-tolerant; concurrent runs sharing parent
/// directories are fine.
fn prepare_directories(
    workspace: &Workspace,
    options: &RollOptions,
    stamp: &str,
    containers: &[ContainerRef],
) -> Result<()> {
    for container in containers {
        if let Some(parent) = workspace.scratch_path(container).parent() {
            fs::create_dir_all(parent)?;
        }
        if options.output == OutputMode::Results {
            if let Some(parent) = workspace.results_path(container).parent() {
                fs::create_dir_all(parent)?;
            }
        }
        if options.backup_enabled() {
            if let Some(parent) = workspace.backup_path(stamp, container).parent() {
                fs::create_dir_all(parent)?;
            }
        }
    }
    Ok(())
}

/// Runs the full pipeline for one container.
fn process_container(
    workspace: &Workspace,
    container: &ContainerRef,
    rules: &RuleSet,
    options: &RollOptions,
    stamp: &str,
) -> Result<PatchSummary> {
    let source = workspace.container_path(container);
    if !source.is_file() {
        return Err(Error::ContainerMissing(source));
    }

    if options.backup_enabled() {
        let backup = workspace.backup_path(stamp, container);
        if let Some(parent) = backup.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&source, &backup)?;
        debug!("{container}: {:?}", Stage::BackedUp);
    }

    let scratch = workspace.scratch_path(container);
    if scratch.exists() {
        // Stale tree from an interrupted run; the scratch namespace is
        // per-container, so this cannot touch anyone else's files.
        fs::remove_dir_all(&scratch)?;
    }
    archive::extract(&source, &scratch)?;
    debug!("{container}: {:?}", Stage::Extracted);

    bindings::strip_bindings(&scratch)?;
    debug!("{container}: {:?}", Stage::BindingsStripped);

    let summary = layout::patch_layout(&scratch, rules)?;
    debug!("{container}: {:?}", Stage::LayoutPatched);

    let dest = match options.output {
        OutputMode::Results => workspace.results_path(container),
        OutputMode::InPlace => source.clone(),
    };
    archive::build(&scratch, &dest)?;
    debug!("{container}: {:?}", Stage::Repacked);

    if let Err(e) = fs::remove_dir_all(&scratch) {
        warn!("{container}: could not remove scratch tree: {e}");
    }

    Ok(summary)
}
