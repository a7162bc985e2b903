use std::fmt;
use std::time::Duration;

/// Phases of a single watcher run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    LoadingState,
    ProcessingTargets,
    PersistingState,
    Done,
    Faulted,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Idle => "idle",
            RunPhase::LoadingState => "loading-state",
            RunPhase::ProcessingTargets => "processing-targets",
            RunPhase::PersistingState => "persisting-state",
            RunPhase::Done => "done",
            RunPhase::Faulted => "faulted",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryChannel {
    Chat,
    Call,
}

impl fmt::Display for DeliveryChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryChannel::Chat => write!(f, "chat"),
            DeliveryChannel::Call => write!(f, "call"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub channel: DeliveryChannel,
    pub theatre: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    /// Settled in an earlier run; not rendered.
    AlreadySettled,
    /// Page rendered and extracted, but nothing new was listed.
    NothingListed,
    /// At least one notification was produced.
    Notified {
        events: usize,
        delivery_failures: Vec<DeliveryFailure>,
    },
    /// Rendering or extraction failed; target state untouched.
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReport {
    pub movie: String,
    pub outcome: TargetOutcome,
}

/// Aggregated result of one run, accumulated by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunReport {
    /// Phases entered, in order.
    pub phases: Vec<RunPhase>,
    pub targets: Vec<TargetReport>,
    /// Panic message if target processing was cut short.
    pub interrupted: Option<String>,
    pub persist_error: Option<String>,
    pub duration: Duration,
}

impl RunReport {
    pub fn enter(&mut self, phase: RunPhase) {
        self.phases.push(phase);
    }

    pub fn record(&mut self, movie: impl Into<String>, outcome: TargetOutcome) {
        self.targets.push(TargetReport {
            movie: movie.into(),
            outcome,
        });
    }

    pub fn outcome_for(&self, movie: &str) -> Option<&TargetOutcome> {
        self.targets
            .iter()
            .find(|report| report.movie == movie)
            .map(|report| &report.outcome)
    }

    pub fn events_sent(&self) -> usize {
        self.targets
            .iter()
            .map(|report| match &report.outcome {
                TargetOutcome::Notified { events, .. } => *events,
                _ => 0,
            })
            .sum()
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, TargetOutcome::Skipped { .. }))
    }

    pub fn settled(&self) -> usize {
        self.count(|outcome| matches!(outcome, TargetOutcome::AlreadySettled))
    }

    pub fn delivery_failures(&self) -> usize {
        self.targets
            .iter()
            .map(|report| match &report.outcome {
                TargetOutcome::Notified {
                    delivery_failures, ..
                } => delivery_failures.len(),
                _ => 0,
            })
            .sum()
    }

    pub fn persisted(&self) -> bool {
        self.persist_error.is_none()
    }

    fn count(&self, predicate: impl Fn(&TargetOutcome) -> bool) -> usize {
        self.targets
            .iter()
            .filter(|report| predicate(&report.outcome))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::{DeliveryChannel, DeliveryFailure, RunReport, TargetOutcome};

    #[test]
    fn counts_outcomes() {
        let mut report = RunReport::default();
        report.record("a", TargetOutcome::AlreadySettled);
        report.record(
            "b",
            TargetOutcome::Skipped {
                reason: "timeout".into(),
            },
        );
        report.record(
            "c",
            TargetOutcome::Notified {
                events: 2,
                delivery_failures: vec![DeliveryFailure {
                    channel: DeliveryChannel::Call,
                    theatre: None,
                    reason: "boom".into(),
                }],
            },
        );
        report.record("d", TargetOutcome::NothingListed);

        assert_eq!(report.settled(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.events_sent(), 2);
        assert_eq!(report.delivery_failures(), 1);
        assert_eq!(report.outcome_for("d"), Some(&TargetOutcome::NothingListed));
        assert!(report.persisted());
    }
}
