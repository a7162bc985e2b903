use std::fmt;
use std::str::FromStr;

use crate::{NotificationEvent, TheatreObservation, WatchTarget};

/// How new listings turn into notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcileMode {
    /// One notification per newly seen theatre; the target is never settled.
    Incremental,
    /// One summary notification on the first non-empty listing, then settle.
    #[default]
    FirstAvailability,
}

impl ReconcileMode {
    /// Whether a call should be triggered alongside the chat message.
    pub fn triggers_call(self) -> bool {
        matches!(self, ReconcileMode::FirstAvailability)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode {0:?}: expected \"incremental\" or \"first-availability\"")]
pub struct UnknownMode(pub String);

impl FromStr for ReconcileMode {
    type Err = UnknownMode;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "incremental" => Ok(ReconcileMode::Incremental),
            "first-availability" | "first" => Ok(ReconcileMode::FirstAvailability),
            _ => Err(UnknownMode(raw.to_string())),
        }
    }
}

impl fmt::Display for ReconcileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileMode::Incremental => write!(f, "incremental"),
            ReconcileMode::FirstAvailability => write!(f, "first-availability"),
        }
    }
}

/// Pure reconciliation: applies one observation pass to a target and returns
/// the notifications it produces.
///
/// The target's state is updated in the same step that produces the events,
/// so a later delivery failure never causes the same fact to be re-emitted.
/// Events follow observation order.
pub fn reconcile(
    mut target: WatchTarget,
    observations: &[TheatreObservation],
    mode: ReconcileMode,
    booking_url: &str,
) -> (WatchTarget, Vec<NotificationEvent>) {
    if observations.is_empty() {
        return (target, Vec::new());
    }

    let events = match mode {
        ReconcileMode::Incremental => {
            let mut events = Vec::new();
            for observation in observations {
                if target.record_theatre(observation.name()) {
                    events.push(NotificationEvent::new_theatre(
                        &target,
                        observation,
                        booking_url,
                    ));
                }
            }
            events
        }
        ReconcileMode::FirstAvailability => {
            if target.settled {
                return (target, Vec::new());
            }
            target.settled = true;
            vec![NotificationEvent::bookings_opened(
                &target,
                observations.len(),
                booking_url,
            )]
        }
    };

    (target, events)
}

#[cfg(test)]
mod tests {
    use super::ReconcileMode;

    #[test]
    fn parses_mode_names() {
        assert_eq!(
            "incremental".parse::<ReconcileMode>().unwrap(),
            ReconcileMode::Incremental
        );
        assert_eq!(
            "First_Availability".parse::<ReconcileMode>().unwrap(),
            ReconcileMode::FirstAvailability
        );
        assert!("sometimes".parse::<ReconcileMode>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for mode in [ReconcileMode::Incremental, ReconcileMode::FirstAvailability] {
            assert_eq!(mode.to_string().parse::<ReconcileMode>().unwrap(), mode);
        }
    }
}
