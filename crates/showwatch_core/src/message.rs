use crate::{title_case, NotificationDetail, NotificationEvent};

pub const PARSE_MODE_MARKDOWN: &str = "Markdown";
pub const BOOK_NOW_LABEL: &str = "🎟️ Book Now";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkButton {
    pub text: String,
    pub url: String,
}

/// Chat-ready rendering of a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String,
    pub parse_mode: String,
    pub buttons: Vec<LinkButton>,
}

/// Deterministic Markdown message with a single "Book Now" link button.
pub fn compose_message(event: &NotificationEvent) -> ChatMessage {
    let movie = markdown_safe(&event.movie);
    let date = event.formatted_date();
    let text = match &event.detail {
        NotificationDetail::NewTheatre {
            theatre,
            show_count,
        } => format!(
            "🎬 *ALERT: New Theatre Open!*\n\n🎥 Movie: *{movie}*\n📅 Date: *{date}*\n🏟️ Theatre: *{theatre}*\n🕒 Shows: *{show_count}*",
            theatre = markdown_safe(theatre),
        ),
        NotificationDetail::BookingsOpened { theatre_count } => format!(
            "🎬 *ALERT: Bookings Started!*\n\n🎥 Movie: *{movie}*\n📅 Date: *{date}*\n🏟️ Found {theatre_count} theatres in *{city}*",
            city = markdown_safe(&title_case(&event.city)),
        ),
    };

    ChatMessage {
        text,
        parse_mode: PARSE_MODE_MARKDOWN.to_string(),
        buttons: vec![LinkButton {
            text: BOOK_NOW_LABEL.to_string(),
            url: event.booking_url.clone(),
        }],
    }
}

// Legacy Markdown has no escaping inside a bold entity.
fn markdown_safe(value: &str) -> String {
    value
        .chars()
        .filter_map(|c| match c {
            '*' | '`' | '[' | ']' => None,
            '_' => Some(' '),
            other => Some(other),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::markdown_safe;

    #[test]
    fn strips_markdown_control_characters() {
        assert_eq!(markdown_safe("INOX_GVK *One* [IMAX]"), "INOX GVK One IMAX");
        assert_eq!(markdown_safe("PVR: Forum"), "PVR: Forum");
    }
}
