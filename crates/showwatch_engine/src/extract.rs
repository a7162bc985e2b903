use scraper::{ElementRef, Html, Selector};
use showwatch_core::TheatreObservation;

/// Raw selector strings, as supplied by configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorConfig {
    pub container: String,
    pub item: String,
    pub name: String,
    pub count: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            container: ".sc-tk4ce6-2.kozbLe".to_string(),
            item: ".sc-e8nk8f-3.iFKUFD".to_string(),
            name: ".__venue-name".to_string(),
            count: ".showtime-pill".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("invalid {role} selector {selector:?}: {message}")]
    InvalidSelector {
        role: &'static str,
        selector: String,
        message: String,
    },
    #[error("{0} not found")]
    NotFound(&'static str),
}

/// Parsed selectors; invalid strings are rejected once, at startup.
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    container: Selector,
    item: Selector,
    name: Selector,
    count: Selector,
}

impl ListingSelectors {
    pub fn parse(config: &SelectorConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            container: parse_selector("container", &config.container)?,
            item: parse_selector("item", &config.item)?,
            name: parse_selector("name", &config.name)?,
            count: parse_selector("count", &config.count)?,
        })
    }
}

fn parse_selector(role: &'static str, raw: &str) -> Result<Selector, ExtractError> {
    Selector::parse(raw).map_err(|err| ExtractError::InvalidSelector {
        role,
        selector: raw.to_string(),
        message: err.to_string(),
    })
}

pub trait ListingExtractor: Send + Sync {
    /// Theatres currently listed on the page, in document order.
    fn extract(&self, html: &str) -> Result<Vec<TheatreObservation>, ExtractError>;
}

/// Extracts theatres with CSS selectors:
/// - the first container match bounds the listing; none is an error
/// - each item inside it is one theatre
/// - the first name match gives the theatre name, else the item's own text
///   (blank names are dropped)
/// - the number of count matches gives the show count.
#[derive(Debug, Clone)]
pub struct SelectorExtractor {
    selectors: ListingSelectors,
}

impl SelectorExtractor {
    pub fn new(selectors: ListingSelectors) -> Self {
        Self { selectors }
    }
}

impl ListingExtractor for SelectorExtractor {
    fn extract(&self, html: &str) -> Result<Vec<TheatreObservation>, ExtractError> {
        let doc = Html::parse_document(html);
        let container = doc
            .select(&self.selectors.container)
            .next()
            .ok_or(ExtractError::NotFound("container"))?;

        Ok(container
            .select(&self.selectors.item)
            .filter_map(|item| self.observe(item))
            .collect())
    }
}

impl SelectorExtractor {
    fn observe(&self, item: ElementRef<'_>) -> Option<TheatreObservation> {
        // Items without a name element are named by their own text.
        let name = item
            .select(&self.selectors.name)
            .next()
            .map_or_else(|| display_text(item), display_text);
        let shows = item.select(&self.selectors.count).count();
        TheatreObservation::new(&name, u32::try_from(shows).unwrap_or(u32::MAX))
    }
}

/// Text as a browser would display it: whitespace runs collapse to one space.
fn display_text(node: ElementRef<'_>) -> String {
    node.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
