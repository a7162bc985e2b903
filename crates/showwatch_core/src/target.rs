use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const COMPACT_FORMAT: &str = "%Y%m%d";
const DISPLAY_FORMAT: &str = "%d-%m-%Y";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid show date {raw:?}: expected YYYYMMDD")]
pub struct DateError {
    pub raw: String,
}

/// Calendar date of a showing, stored on disk as compact `YYYYMMDD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShowDate(NaiveDate);

impl ShowDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// `YYYYMMDD`, as used in booking URLs and the state file.
    pub fn compact(&self) -> String {
        self.0.format(COMPACT_FORMAT).to_string()
    }

    /// `DD-MM-YYYY`, as shown in notifications.
    pub fn formatted(&self) -> String {
        self.0.format(DISPLAY_FORMAT).to_string()
    }
}

impl FromStr for ShowDate {
    type Err = DateError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        // chrono accepts short fields for %Y%m%d; the format is strictly 8 digits.
        if trimmed.len() != 8 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DateError {
                raw: raw.to_string(),
            });
        }
        NaiveDate::parse_from_str(trimmed, COMPACT_FORMAT)
            .map(ShowDate)
            .map_err(|_| DateError {
                raw: raw.to_string(),
            })
    }
}

impl fmt::Display for ShowDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.compact())
    }
}

impl Serialize for ShowDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.compact())
    }
}

impl<'de> Deserialize<'de> for ShowDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One tracked movie showing, as persisted in the state file.
///
/// `settled` and `discovered` are stored as `found` and `theatres`. The
/// theatre list is omitted entirely until the first theatre is recorded, so
/// first-availability state files keep their existing shape. An empty
/// `city_code` is omitted as well, for legacy-template records without one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchTarget {
    pub name: String,
    pub slug_name: String,
    pub code: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub city_code: String,
    pub date: ShowDate,
    #[serde(rename = "found", default)]
    pub settled: bool,
    #[serde(
        rename = "theatres",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    discovered: Option<Vec<String>>,
}

impl WatchTarget {
    pub fn new(
        name: impl Into<String>,
        slug_name: impl Into<String>,
        code: impl Into<String>,
        city: impl Into<String>,
        city_code: impl Into<String>,
        date: ShowDate,
    ) -> Self {
        Self {
            name: name.into(),
            slug_name: slug_name.into(),
            code: code.into(),
            city: city.into(),
            city_code: city_code.into(),
            date,
            settled: false,
            discovered: None,
        }
    }

    /// Builder-style helper seeding the discovered set, dropping duplicates.
    pub fn with_discovered<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = self.discovered.take().unwrap_or_default();
        for name in names {
            let name = name.into();
            if !list.contains(&name) {
                list.push(name);
            }
        }
        self.discovered = Some(list);
        self
    }

    pub fn discovered(&self) -> &[String] {
        self.discovered.as_deref().unwrap_or(&[])
    }

    pub fn has_discovered(&self, theatre: &str) -> bool {
        self.discovered().iter().any(|known| known == theatre)
    }

    /// Adds `theatre` to the discovered set; returns `false` if already known.
    pub(crate) fn record_theatre(&mut self, theatre: &str) -> bool {
        if self.has_discovered(theatre) {
            return false;
        }
        self.discovered
            .get_or_insert_with(Vec::new)
            .push(theatre.to_string());
        true
    }

    /// City slug in title case, e.g. `navi-mumbai` becomes `Navi-Mumbai`.
    pub fn display_city(&self) -> String {
        title_case(&self.city)
    }
}

pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut at_word_start = true;
    for ch in input.chars() {
        if ch.is_alphanumeric() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}
