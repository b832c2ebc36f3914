//! Progress reporting for batch runs.
//!
//! The pipeline reports container-level events through this trait so a CLI
//! can render a progress bar without the library depending on any terminal
//! crate. Implementations must be `Sync`: with the `parallel` feature the
//! batch runner invokes them from worker threads.

use crate::layout::PatchSummary;
use crate::workspace::ContainerRef;
use crate::Result;

/// Container-level progress callbacks for a batch run.
pub trait BatchProgress: Sync {
    /// Called once before the batch starts, with the container count.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called when a container's pipeline begins.
    fn on_container_start(&self, container: &ContainerRef) {
        let _ = container;
    }

    /// Called when a container's pipeline finishes, successfully or not.
    fn on_container_done(&self, container: &ContainerRef, result: &Result<PatchSummary>) {
        let _ = (container, result);
    }
}

/// No-op progress reporter.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl BatchProgress for NoProgress {}
