/// Trait for reporting long-running enumeration progress.
///
/// The CLI implements it with indicatif spinners. All methods are no-ops by default.
pub trait ProgressReporter {
    fn on_phase_start(&self, _phase: &str) {}
    fn on_item(&self, _processed: usize, _current: &str) {}
    fn on_phase_complete(&self, _phase: &str, _items: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
