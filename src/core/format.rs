//! Display formatting for bill dates and statuses.

use crate::entities::BillStatus;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Language used for humanized dates and statuses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateLocale {
    #[default]
    En,
    Fr,
}

impl DateLocale {
    // Abbreviated month names as the platform date formatter renders them.
    const fn short_months(self) -> [&'static str; 12] {
        match self {
            Self::En => [
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
            ],
            Self::Fr => [
                "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.",
                "nov.", "déc.",
            ],
        }
    }
}

impl FromStr for DateLocale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "fr" => Ok(Self::Fr),
            other => Err(format!("unsupported locale {other:?}")),
        }
    }
}

/// Humanizes a canonical `YYYY-MM-DD` date, e.g. `2004-04-04` becomes `4 Apr. 04`.
///
/// The month name is capitalized and cut to three characters, the day loses
/// its leading zero and only the last two digits of the year are kept.
pub fn format_date(date: &str, locale: DateLocale) -> Result<String, chrono::ParseError> {
    let parsed = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")?;
    let month_name = locale.short_months()[parsed.month0() as usize];
    let month = capitalize(&month_name.chars().take(3).collect::<String>());
    let year = parsed.year().rem_euclid(100);
    Ok(format!("{} {}. {:02}", parsed.day(), month, year))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Human label for a bill status.
#[must_use]
pub const fn format_status(status: BillStatus, locale: DateLocale) -> &'static str {
    match (locale, status) {
        (DateLocale::En, BillStatus::Pending) => "Pending",
        (DateLocale::En, BillStatus::Accepted) => "Accepted",
        (DateLocale::En, BillStatus::Refused) => "Refused",
        (DateLocale::Fr, BillStatus::Pending) => "En attente",
        (DateLocale::Fr, BillStatus::Accepted) => "Accepté",
        (DateLocale::Fr, BillStatus::Refused) => "Refusé",
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_format_date_english() {
        assert_eq!(format_date("2004-04-04", DateLocale::En).unwrap(), "4 Apr. 04");
        assert_eq!(format_date("2001-01-01", DateLocale::En).unwrap(), "1 Jan. 01");
        assert_eq!(format_date("2021-11-22", DateLocale::En).unwrap(), "22 Nov. 21");
    }

    #[test]
    fn test_format_date_french() {
        assert_eq!(format_date("2004-04-04", DateLocale::Fr).unwrap(), "4 Avr. 04");
        assert_eq!(format_date("2002-02-02", DateLocale::Fr).unwrap(), "2 Fév. 02");
        assert_eq!(format_date("2020-08-15", DateLocale::Fr).unwrap(), "15 Aoû. 20");
        assert_eq!(format_date("2020-06-01", DateLocale::Fr).unwrap(), "1 Jui. 20");
    }

    #[test]
    fn test_format_date_rejects_garbage() {
        assert!(format_date("not a date", DateLocale::En).is_err());
        assert!(format_date("2004-13-01", DateLocale::En).is_err());
        assert!(format_date("", DateLocale::Fr).is_err());
    }

    #[test]
    fn test_format_status() {
        assert_eq!(format_status(BillStatus::Pending, DateLocale::Fr), "En attente");
        assert_eq!(format_status(BillStatus::Refused, DateLocale::Fr), "Refusé");
        assert_eq!(format_status(BillStatus::Accepted, DateLocale::En), "Accepted");
    }

    #[test]
    fn test_parse_locale() {
        assert_eq!("FR".parse::<DateLocale>().unwrap(), DateLocale::Fr);
        assert!("de".parse::<DateLocale>().is_err());
    }
}
