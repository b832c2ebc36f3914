//! Progress bar implementation for CLI operations.

use indicatif::{ProgressBar, ProgressStyle};

use pbixroll::{BatchProgress, ContainerRef, PatchSummary};

/// Container-count progress bar for batch runs.
pub struct CliProgress {
    bar: ProgressBar,
    quiet: bool,
}

impl CliProgress {
    /// Creates a progress display; hidden when quiet.
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::no_length();
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} containers {msg}")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            pb
        };
        Self { bar, quiet }
    }

    /// Finishes the progress display
    pub fn finish(&self) {
        self.bar.finish_with_message("done");
    }
}

impl BatchProgress for CliProgress {
    fn on_batch_start(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn on_container_start(&self, container: &ContainerRef) {
        if !self.quiet {
            self.bar.set_message(container.to_string());
        }
    }

    fn on_container_done(&self, container: &ContainerRef, result: &pbixroll::Result<PatchSummary>) {
        match result {
            Ok(summary) => {
                if !self.quiet {
                    self.bar
                        .println(format!("{container}: {} replacement(s)", summary.replacements));
                }
            }
            Err(e) => {
                if self.quiet {
                    eprintln!("FAILED {container}: {e}");
                } else {
                    self.bar.println(format!("FAILED {container}: {e}"));
                }
            }
        }
        self.bar.inc(1);
    }
}
