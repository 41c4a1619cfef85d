//! Date helper functions

use chrono::{DateTime, Locale, TimeZone};

/// Format a publication date as `d LLL yyyy` (e.g. "25 mar 2021") in the
/// site language. A missing date formats as an empty string.
pub fn format_publication_date<Tz: TimeZone>(
    date: Option<&DateTime<Tz>>,
    language: &str,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match date {
        Some(date) => date
            .format_localized("%-d %b %Y", locale_for(language))
            .to_string(),
        None => String::new(),
    }
}

/// Map a site language such as `pt-BR` to a chrono locale; unknown ones fall back to POSIX
fn locale_for(language: &str) -> Locale {
    Locale::try_from(language.replace('-', "_").as_str()).unwrap_or(Locale::POSIX)
}

/// Format a date in ISO 8601 / XML format, for `<time datetime>`
pub fn date_xml<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}
