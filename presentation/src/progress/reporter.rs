//! Progress reporting for repository syncs

use colored::Colorize;
use harvest_application::ports::progress::{SyncPhase, SyncProgress};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports sync progress with progress bars
pub struct ProgressReporter {
    multi: MultiProgress,
    phase_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            phase_bar: Mutex::new(None),
        }
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn phase_display_name(phase: SyncPhase) -> &'static str {
        match phase {
            SyncPhase::RepositoryInfo => "Resolving repository",
            SyncPhase::Readme => "README",
            SyncPhase::Files => "Files",
            SyncPhase::Issues => "Issues",
            SyncPhase::PullRequests => "Pull requests",
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncProgress for ProgressReporter {
    fn on_phase_start(&self, phase: SyncPhase, total_items: usize) {
        let pb = self.multi.add(ProgressBar::new(total_items as u64));
        pb.set_style(Self::phase_style());
        pb.set_prefix(Self::phase_display_name(phase));
        pb.set_message("starting...");

        if let Ok(mut bar) = self.phase_bar.lock() {
            *bar = Some(pb);
        }
    }

    fn on_item_complete(&self, _phase: SyncPhase, item: &str, success: bool) {
        if let Ok(bar) = self.phase_bar.lock()
            && let Some(pb) = bar.as_ref()
        {
            let status = if success {
                format!("{} {}", "v".green(), item)
            } else {
                format!("{} {}", "x".red(), item)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_phase_complete(&self, phase: SyncPhase) {
        if let Ok(mut bar) = self.phase_bar.lock()
            && let Some(pb) = bar.take()
        {
            pb.finish_with_message(format!(
                "{} done",
                Self::phase_display_name(phase).green()
            ));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl SyncProgress for SimpleProgress {
    fn on_phase_start(&self, phase: SyncPhase, total_items: usize) {
        println!(
            "{} {} ({} items)",
            "->".cyan(),
            ProgressReporter::phase_display_name(phase).bold(),
            total_items
        );
    }

    fn on_item_complete(&self, _phase: SyncPhase, item: &str, success: bool) {
        if success {
            println!("  {} {}", "v".green(), item);
        } else {
            println!("  {} {} (skipped)", "x".red(), item);
        }
    }

    fn on_phase_complete(&self, _phase: SyncPhase) {
        println!();
    }
}
