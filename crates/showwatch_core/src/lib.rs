//! Showwatch core: pure domain model and the reconciliation policy.
mod booking;
mod event;
mod listing;
mod message;
mod reconcile;
mod report;
mod target;

pub use booking::{BookingLinks, UnknownTemplate, UrlError, UrlTemplate, DEFAULT_BOOKING_BASE};
pub use event::{NotificationDetail, NotificationEvent};
pub use listing::TheatreObservation;
pub use message::{compose_message, ChatMessage, LinkButton, BOOK_NOW_LABEL, PARSE_MODE_MARKDOWN};
pub use reconcile::{reconcile, ReconcileMode, UnknownMode};
pub use report::{
    DeliveryChannel, DeliveryFailure, RunPhase, RunReport, TargetOutcome, TargetReport,
};
pub use target::{title_case, DateError, ShowDate, WatchTarget};
