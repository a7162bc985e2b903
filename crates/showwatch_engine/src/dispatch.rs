use showwatch_core::{
    compose_message, DeliveryChannel, DeliveryFailure, NotificationEvent, ReconcileMode,
};
use showwatch_logging::watch_error;

use crate::notify::{CallTrigger, ChatNotifier};

/// Delivers one event: a single chat attempt, plus a single call attempt in
/// first-availability mode when a call trigger is configured.
///
/// The two channels are independent and nothing is retried. Returned
/// failures are informational; the target's state has already been updated.
pub async fn dispatch(
    event: &NotificationEvent,
    mode: ReconcileMode,
    chat: &dyn ChatNotifier,
    call: Option<&dyn CallTrigger>,
) -> Vec<DeliveryFailure> {
    let theatre = event.theatre().map(str::to_string);
    let mut failures = Vec::new();

    let message = compose_message(event);
    if let Err(err) = chat.send_message(&message).await {
        watch_error!(
            "movie={} theatre={} Chat notification failed: {}",
            event.movie,
            theatre.as_deref().unwrap_or("-"),
            err
        );
        failures.push(DeliveryFailure {
            channel: DeliveryChannel::Chat,
            theatre: theatre.clone(),
            reason: err.to_string(),
        });
    }

    if let (true, Some(call)) = (mode.triggers_call(), call) {
        if let Err(err) = call.trigger_call(&event.movie).await {
            watch_error!("movie={} Call trigger failed: {}", event.movie, err);
            failures.push(DeliveryFailure {
                channel: DeliveryChannel::Call,
                theatre,
                reason: err.to_string(),
            });
        }
    }

    failures
}
