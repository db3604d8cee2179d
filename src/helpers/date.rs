//! Date helper functions

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, FixedOffset, TimeZone};
use chrono_tz::Tz;
use std::fmt::Write;

const MONTHS_PT: [&str; 12] = [
    "Janeiro", "Fevereiro", "Março", "Abril", "Maio", "Junho", "Julho", "Agosto", "Setembro",
    "Outubro", "Novembro", "Dezembro",
];
const MONTHS_PT_SHORT: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];
const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];
const MONTHS_EN_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

// Placeholders for month names, substituted after chrono formatting
const FULL_MONTH_MARK: &str = "\u{1}";
const SHORT_MONTH_MARK: &str = "\u{2}";

/// Parse a backend timestamp.
///
/// Accepts RFC 3339 as well as the `+0000` offset form the CMS emits
/// (`2021-04-19T19:25:28+0000`).
pub fn parse_cms_date(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z"))
        .ok()
}

/// Format a date in `tz` using a Moment.js-compatible format string, with
/// month names taken from `language`
///
/// # Examples
/// ```ignore
/// format_date(&date, chrono_tz::America::Sao_Paulo, "DD MMM YYYY", "pt-BR") // -> "19 Abr 2021"
/// ```
pub fn format_date<Z: TimeZone>(date: &DateTime<Z>, tz: Tz, format: &str, language: &str) -> String {
    let local = date.with_timezone(&tz);
    let chrono_format = moment_to_chrono_format(format);
    let mut formatted = String::new();
    if write!(formatted, "{}", local.format(&chrono_format)).is_err() {
        tracing::warn!("Invalid date format {:?}, falling back to ISO dates", format);
        formatted = local.format("%Y-%m-%d").to_string();
    }

    let (full, short) = month_names(language);
    let month = local.month0() as usize;

    formatted
        .replace(FULL_MONTH_MARK, full[month])
        .replace(SHORT_MONTH_MARK, short[month])
}

/// Format a date in ISO 8601 for `datetime` attributes
pub fn date_xml<Z: TimeZone>(date: &DateTime<Z>) -> String
where
    Z::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Whether a Moment.js-style format converts to a usable chrono format
pub fn is_valid_date_format(format: &str) -> bool {
    !StrftimeItems::new(&moment_to_chrono_format(format)).any(|item| matches!(item, Item::Error))
}

/// Full and abbreviated month names for a locale tag; English unless Portuguese
pub fn month_names(language: &str) -> (&'static [&'static str; 12], &'static [&'static str; 12]) {
    let primary = language.split(['-', '_']).next().unwrap_or("").to_lowercase();
    match primary.as_str() {
        "pt" => (&MONTHS_PT, &MONTHS_PT_SHORT),
        _ => (&MONTHS_EN, &MONTHS_EN_SHORT),
    }
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    let replacements = [
        // Year
        ("YYYY", "%Y"),
        ("YY", "%y"),
        // Month names go through the locale tables
        ("MMMM", FULL_MONTH_MARK),
        ("MMM", SHORT_MONTH_MARK),
        ("MM", "%m"),
        // Day of month
        ("DD", "%d"),
        // Time
        ("HH", "%H"),
        ("hh", "%I"),
        ("mm", "%M"),
        ("ss", "%S"),
    ];

    // Anything chrono would read as a specifier stays literal
    let mut result = format.replace('%', "%%");

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cms_date() {
        let date = parse_cms_date("2021-04-19T19:25:28+0000").unwrap();
        assert_eq!(date.to_rfc3339(), "2021-04-19T19:25:28+00:00");
        assert!(parse_cms_date("2021-04-19T19:25:28Z").is_some());
        assert!(parse_cms_date("2021-04-19T19:25:28.000-03:00").is_some());
        assert!(parse_cms_date("19/04/2021").is_none());
    }

    #[test]
    fn test_format_date_pt_br() {
        let date = parse_cms_date("2021-04-19T19:25:28+0000").unwrap();
        assert_eq!(
            format_date(&date, chrono_tz::America::Sao_Paulo, "DD MMM YYYY", "pt-BR"),
            "19 Abr 2021"
        );
        assert_eq!(
            format_date(&date, chrono_tz::UTC, "DD MMMM YYYY", "pt-BR"),
            "19 Abril 2021"
        );
    }

    #[test]
    fn test_format_date_uses_display_timezone() {
        // 01:00 UTC on the 1st is still the previous day in São Paulo
        let date = parse_cms_date("2021-05-01T01:00:00+0000").unwrap();
        assert_eq!(
            format_date(&date, chrono_tz::America::Sao_Paulo, "DD MMM YYYY", "pt-BR"),
            "30 Abr 2021"
        );
        assert_eq!(
            format_date(&date, chrono_tz::UTC, "DD MMM YYYY", "en"),
            "01 May 2021"
        );
    }

    #[test]
    fn test_format_date_keeps_literal_percent() {
        let date = parse_cms_date("2021-04-19T19:25:28+0000").unwrap();
        assert_eq!(
            format_date(&date, chrono_tz::UTC, "DD MMM YYYY %", "pt-BR"),
            "19 Abr 2021 %"
        );
        assert_eq!(
            format_date(&date, chrono_tz::UTC, "%Y DD", "en"),
            "%Y 19"
        );
        assert!(is_valid_date_format("DD MMM YYYY %"));
        assert!(is_valid_date_format("%Q"));
    }

    #[test]
    fn test_date_xml() {
        let date = parse_cms_date("2021-04-19T19:25:28+0000").unwrap();
        assert_eq!(date_xml(&date), "2021-04-19T19:25:28+00:00");
    }

    #[test]
    fn test_moment_to_chrono() {
        assert_eq!(moment_to_chrono_format("YYYY-MM-DD"), "%Y-%m-%d");
        assert_eq!(moment_to_chrono_format("HH:mm:ss"), "%H:%M:%S");
    }
}
