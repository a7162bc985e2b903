use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::WatchTarget;

pub const DEFAULT_BOOKING_BASE: &str = "https://in.bookmyshow.com";

/// Deep-link layout used by the ticketing provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UrlTemplate {
    /// `{base}/movies/{city}/{slug}/buytickets/{code}/{date}`
    Legacy,
    /// `{base}/buytickets/{slug}-{city}/movie-{city_code}-{code}-MT/{date}`
    #[default]
    Current,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown url template {0:?}: expected \"legacy\" or \"current\"")]
pub struct UnknownTemplate(pub String);

impl FromStr for UrlTemplate {
    type Err = UnknownTemplate;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(UrlTemplate::Legacy),
            "current" => Ok(UrlTemplate::Current),
            _ => Err(UnknownTemplate(raw.to_string())),
        }
    }
}

impl fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlTemplate::Legacy => write!(f, "legacy"),
            UrlTemplate::Current => write!(f, "current"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("invalid booking base url {url:?}: {message}")]
    InvalidBase { url: String, message: String },
}

/// Builds booking deep links for targets from one base URL and template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingLinks {
    base: String,
    template: UrlTemplate,
}

impl BookingLinks {
    pub fn new(base: &str, template: UrlTemplate) -> Result<Self, UrlError> {
        let parsed = Url::parse(base.trim()).map_err(|err| UrlError::InvalidBase {
            url: base.to_string(),
            message: err.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(UrlError::InvalidBase {
                url: base.to_string(),
                message: format!("unsupported scheme {}", parsed.scheme()),
            });
        }
        Ok(Self {
            base: parsed.as_str().trim_end_matches('/').to_string(),
            template,
        })
    }

    pub fn template(&self) -> UrlTemplate {
        self.template
    }

    pub fn url_for(&self, target: &WatchTarget) -> String {
        let date = target.date.compact();
        match self.template {
            UrlTemplate::Legacy => format!(
                "{base}/movies/{city}/{slug}/buytickets/{code}/{date}",
                base = self.base,
                city = target.city,
                slug = target.slug_name,
                code = target.code,
            ),
            UrlTemplate::Current => format!(
                "{base}/buytickets/{slug}-{city}/movie-{city_code}-{code}-MT/{date}",
                base = self.base,
                slug = target.slug_name,
                city = target.city,
                city_code = target.city_code,
                code = target.code,
            ),
        }
    }
}

impl Default for BookingLinks {
    fn default() -> Self {
        Self {
            base: DEFAULT_BOOKING_BASE.to_string(),
            template: UrlTemplate::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BookingLinks, UrlTemplate};
    use crate::WatchTarget;

    fn target() -> WatchTarget {
        WatchTarget::new(
            "Dune: Part Two",
            "dune-part-two",
            "ET00352941",
            "hyderabad",
            "HYD",
            "20240301".parse().unwrap(),
        )
    }

    #[test]
    fn current_template_matches_provider_layout() {
        let links = BookingLinks::new("https://in.bookmyshow.com/", UrlTemplate::Current).unwrap();
        assert_eq!(
            links.url_for(&target()),
            "https://in.bookmyshow.com/buytickets/dune-part-two-hyderabad/movie-HYD-ET00352941-MT/20240301"
        );
    }

    #[test]
    fn legacy_template_matches_provider_layout() {
        let links = BookingLinks::new("https://in.bookmyshow.com", UrlTemplate::Legacy).unwrap();
        assert_eq!(
            links.url_for(&target()),
            "https://in.bookmyshow.com/movies/hyderabad/dune-part-two/buytickets/ET00352941/20240301"
        );
    }

    #[test]
    fn rejects_non_http_base() {
        assert!(BookingLinks::new("ftp://example.com", UrlTemplate::Current).is_err());
        assert!(BookingLinks::new("not a url", UrlTemplate::Current).is_err());
    }
}
