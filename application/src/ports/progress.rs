//! Progress notification port
//!
//! Defines the interface for reporting progress while a planning phase runs.
//! Streamed text fragments go through [`PlanningProgress::on_fragment`]; the
//! parsed phase result is returned separately by the use case.

use planner_domain::PlanningPhase;
use tokio::sync::mpsc;

/// Callback for progress updates during a planning phase
///
/// Implementations live in the presentation layer.
pub trait PlanningProgress: Send + Sync {
    /// Called when a phase starts. `target` is the layer or group id.
    fn on_phase_start(&self, _phase: PlanningPhase, _target: Option<&str>) {}

    /// Called for each text fragment as it arrives from the model.
    fn on_fragment(&self, fragment: &str);

    /// Called when a phase finished, successfully parsed or not.
    fn on_phase_complete(&self, _phase: PlanningPhase, _success: bool) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl PlanningProgress for NoProgress {
    fn on_fragment(&self, _fragment: &str) {}
}

/// Forwards fragments to an unbounded channel for callers that consume
/// the phase as a stream.
pub struct ChannelProgress {
    sender: mpsc::UnboundedSender<String>,
}

impl ChannelProgress {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl PlanningProgress for ChannelProgress {
    fn on_fragment(&self, fragment: &str) {
        // receiver gone means nobody is watching
        let _ = self.sender.send(fragment.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_progress_forwards_fragments() {
        let (progress, mut rx) = ChannelProgress::new();
        progress.on_fragment("tech");
        progress.on_fragment("-stack");
        assert_eq!(rx.try_recv().unwrap(), "tech");
        assert_eq!(rx.try_recv().unwrap(), "-stack");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_progress_survives_dropped_receiver() {
        let (progress, rx) = ChannelProgress::new();
        drop(rx);
        progress.on_fragment("nobody listens");
    }
}
