use crate::{ShowDate, TheatreObservation, WatchTarget};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationDetail {
    /// Incremental mode: a theatre not seen before for this target.
    NewTheatre { theatre: String, show_count: u32 },
    /// First-availability mode: the listing became non-empty.
    BookingsOpened { theatre_count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub movie: String,
    pub city: String,
    pub date: ShowDate,
    pub detail: NotificationDetail,
    pub booking_url: String,
}

impl NotificationEvent {
    pub(crate) fn new_theatre(
        target: &WatchTarget,
        observation: &TheatreObservation,
        booking_url: &str,
    ) -> Self {
        Self::for_target(
            target,
            NotificationDetail::NewTheatre {
                theatre: observation.name().to_string(),
                show_count: observation.show_count(),
            },
            booking_url,
        )
    }

    pub(crate) fn bookings_opened(
        target: &WatchTarget,
        theatre_count: usize,
        booking_url: &str,
    ) -> Self {
        Self::for_target(
            target,
            NotificationDetail::BookingsOpened { theatre_count },
            booking_url,
        )
    }

    fn for_target(target: &WatchTarget, detail: NotificationDetail, booking_url: &str) -> Self {
        Self {
            movie: target.name.clone(),
            city: target.city.clone(),
            date: target.date,
            detail,
            booking_url: booking_url.to_string(),
        }
    }

    pub fn formatted_date(&self) -> String {
        self.date.formatted()
    }

    pub fn theatre(&self) -> Option<&str> {
        match &self.detail {
            NotificationDetail::NewTheatre { theatre, .. } => Some(theatre),
            NotificationDetail::BookingsOpened { .. } => None,
        }
    }
}
