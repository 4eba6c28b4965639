//! Progress reporting while a planning phase streams

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use planner_application::PlanningProgress;
use planner_domain::PlanningPhase;
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

/// Shows a spinner until the model's first fragment, then echoes the
/// streamed text to stdout as it arrives.
pub struct StreamingReporter {
    spinner: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl StreamingReporter {
    pub fn new(quiet: bool) -> Self {
        Self {
            spinner: Mutex::new(None),
            quiet,
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn clear_spinner(&self) {
        if let Ok(mut spinner) = self.spinner.lock()
            && let Some(pb) = spinner.take()
        {
            pb.finish_and_clear();
        }
    }

    fn waiting(&self) -> bool {
        self.spinner.lock().map(|s| s.is_some()).unwrap_or(false)
    }
}

impl Default for StreamingReporter {
    fn default() -> Self {
        Self::new(false)
    }
}

impl PlanningProgress for StreamingReporter {
    fn on_phase_start(&self, phase: PlanningPhase, target: Option<&str>) {
        if self.quiet {
            return;
        }
        let label = match target {
            Some(target) => format!("{} ({})", phase.display_name(), target),
            None => phase.display_name().to_string(),
        };

        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_message(format!("Waiting for {}...", label.bold()));
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut spinner) = self.spinner.lock()
            && let Some(previous) = spinner.replace(pb)
        {
            previous.finish_and_clear();
        }
    }

    fn on_fragment(&self, fragment: &str) {
        self.clear_spinner();
        if self.quiet {
            return;
        }
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(fragment.as_bytes());
        let _ = stdout.flush();
    }

    fn on_phase_complete(&self, _phase: PlanningPhase, _success: bool) {
        self.clear_spinner();
        if !self.quiet {
            println!();
        }
    }
}
