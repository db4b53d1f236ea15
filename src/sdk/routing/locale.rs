use chrono::{DateTime, FixedOffset, Locale, Offset, Utc};
use std::time::Duration;
use thiserror::Error;

/// Long-form date and time, e.g. "Monday, 19 October 2026 14:05:00".
const LONG_FORM: &str = "%A, %e %B %Y %X";

const NARROW_NO_BREAK_SPACE: char = '\u{202f}';

/// Singular and plural words for the units an interval is spelled out in.
#[derive(Debug, PartialEq, Eq)]
struct UnitNames {
    day: (&'static str, &'static str),
    hour: (&'static str, &'static str),
    minute: (&'static str, &'static str),
    second: (&'static str, &'static str),
    /// Whether a zero count takes the singular form, as in French.
    zero_is_singular: bool,
}

static ENGLISH_UNITS: UnitNames = UnitNames {
    day: ("day", "days"),
    hour: ("hour", "hours"),
    minute: ("minute", "minutes"),
    second: ("second", "seconds"),
    zero_is_singular: false,
};

static FRENCH_UNITS: UnitNames = UnitNames {
    day: ("jour", "jours"),
    hour: ("heure", "heures"),
    minute: ("minute", "minutes"),
    second: ("seconde", "secondes"),
    zero_is_singular: true,
};

static GERMAN_UNITS: UnitNames = UnitNames {
    day: ("Tag", "Tage"),
    hour: ("Stunde", "Stunden"),
    minute: ("Minute", "Minuten"),
    second: ("Sekunde", "Sekunden"),
    zero_is_singular: false,
};

static SPANISH_UNITS: UnitNames = UnitNames {
    day: ("día", "días"),
    hour: ("hora", "horas"),
    minute: ("minuto", "minutos"),
    second: ("segundo", "segundos"),
    zero_is_singular: false,
};

static ITALIAN_UNITS: UnitNames = UnitNames {
    day: ("giorno", "giorni"),
    hour: ("ora", "ore"),
    minute: ("minuto", "minuti"),
    second: ("secondo", "secondi"),
    zero_is_singular: false,
};

static PORTUGUESE_UNITS: UnitNames = UnitNames {
    day: ("dia", "dias"),
    hour: ("hora", "horas"),
    minute: ("minuto", "minutos"),
    second: ("segundo", "segundos"),
    zero_is_singular: false,
};

static DUTCH_UNITS: UnitNames = UnitNames {
    day: ("dag", "dagen"),
    hour: ("uur", "uur"),
    minute: ("minuut", "minuten"),
    second: ("seconde", "seconden"),
    zero_is_singular: false,
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LocaleError {
    #[error("unknown locale '{0}'")]
    UnknownLocale(String),
    #[error("UTC offset of {0} minutes is out of range")]
    OffsetOutOfRange(i32),
}

/// Formatting context handed to the error explainer on every call.
///
/// It is a plain immutable value: there is no shared formatter state, so the
/// same context can be used from several threads at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleContext {
    locale: Locale,
    offset: FixedOffset,
    group_separator: char,
    units: &'static UnitNames,
}

impl LocaleContext {
    /// Builds a context from a POSIX locale name such as `fr_FR` and a UTC
    /// offset, in minutes east of Greenwich, used when rendering instants.
    pub fn new(name: &str, utc_offset_minutes: i32) -> Result<Self, LocaleError> {
        let locale =
            Locale::try_from(name).map_err(|_| LocaleError::UnknownLocale(name.to_string()))?;
        let offset = utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(LocaleError::OffsetOutOfRange(utc_offset_minutes))?;
        Ok(Self {
            locale,
            offset,
            group_separator: group_separator_for(name),
            units: unit_names_for(name),
        })
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Decimal rendering with the locale's digit grouping, e.g. "12,345".
    pub fn format_count(&self, count: u64) -> String {
        let digits = count.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, digit) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(self.group_separator);
            }
            out.push(digit);
        }
        out
    }

    /// Spells an interval out in whole units of the locale's language,
    /// largest first: "1 hour", "2 heures, 30 minutes". Sub-second precision
    /// is dropped.
    pub fn format_interval(&self, interval: Duration) -> String {
        let total = interval.as_secs();
        let units = self.units;
        let components = [
            (total / 86_400, units.day),
            (total % 86_400 / 3_600, units.hour),
            (total % 3_600 / 60, units.minute),
            (total % 60, units.second),
        ];

        let parts: Vec<String> = components
            .iter()
            .filter(|(value, _)| *value > 0)
            .map(|&(value, names)| self.format_quantity(value, names))
            .collect();

        if parts.is_empty() {
            self.format_quantity(0, units.second)
        } else {
            parts.join(", ")
        }
    }

    fn format_quantity(&self, value: u64, (singular, plural): (&str, &str)) -> String {
        let unit = match value {
            1 => singular,
            0 if self.units.zero_is_singular => singular,
            _ => plural,
        };
        format!("{} {}", self.format_count(value), unit)
    }

    /// Long-form localized rendering of an instant in the context's offset.
    pub fn format_instant(&self, instant: &DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.offset)
            .format_localized(LONG_FORM, self.locale)
            .to_string()
    }
}

impl Default for LocaleContext {
    fn default() -> Self {
        Self {
            locale: Locale::en_US,
            offset: Utc.fix(),
            group_separator: ',',
            units: &ENGLISH_UNITS,
        }
    }
}

fn group_separator_for(name: &str) -> char {
    match language_of(name) {
        "de" | "es" | "it" | "nl" | "pt" | "da" | "id" | "tr" | "el" => '.',
        "fr" => NARROW_NO_BREAK_SPACE,
        "sv" | "nb" | "nn" | "fi" | "pl" | "cs" | "sk" | "ru" | "uk" | "hu" => ' ',
        _ => ',',
    }
}

fn unit_names_for(name: &str) -> &'static UnitNames {
    match language_of(name) {
        "fr" => &FRENCH_UNITS,
        "de" => &GERMAN_UNITS,
        "es" => &SPANISH_UNITS,
        "it" => &ITALIAN_UNITS,
        "pt" => &PORTUGUESE_UNITS,
        "nl" => &DUTCH_UNITS,
        _ => &ENGLISH_UNITS,
    }
}

fn language_of(name: &str) -> &str {
    name.split(['_', '-', '.', '@']).next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn groups_digits_per_locale() {
        let en = LocaleContext::default();
        assert_eq!(en.format_count(7), "7");
        assert_eq!(en.format_count(300), "300");
        assert_eq!(en.format_count(1_000), "1,000");
        assert_eq!(en.format_count(1_234_567), "1,234,567");

        let de = LocaleContext::new("de_DE", 0).unwrap();
        assert_eq!(de.format_count(1_234_567), "1.234.567");

        let fr = LocaleContext::new("fr_FR", 0).unwrap();
        assert_eq!(fr.format_count(12_345), "12\u{202f}345");
    }

    #[test]
    fn spells_out_interval_units() {
        let ctx = LocaleContext::default();
        assert_eq!(ctx.format_interval(Duration::from_secs(3_600)), "1 hour");
        assert_eq!(ctx.format_interval(Duration::from_secs(60)), "1 minute");
        assert_eq!(
            ctx.format_interval(Duration::from_secs(9_000)),
            "2 hours, 30 minutes"
        );
        assert_eq!(
            ctx.format_interval(Duration::from_secs(86_401)),
            "1 day, 1 second"
        );
        assert_eq!(ctx.format_interval(Duration::ZERO), "0 seconds");
    }

    #[test]
    fn interval_units_follow_locale_language() {
        let fr = LocaleContext::new("fr_FR", 0).unwrap();
        assert_eq!(fr.format_interval(Duration::from_secs(3_600)), "1 heure");
        assert_eq!(
            fr.format_interval(Duration::from_secs(2 * 86_400 + 2)),
            "2 jours, 2 secondes"
        );
        assert_eq!(fr.format_interval(Duration::ZERO), "0 seconde");

        let de = LocaleContext::new("de_DE", 0).unwrap();
        assert_eq!(
            de.format_interval(Duration::from_secs(9_000)),
            "2 Stunden, 30 Minuten"
        );
        assert_eq!(de.format_interval(Duration::ZERO), "0 Sekunden");

        let es = LocaleContext::new("es_ES", 0).unwrap();
        assert_eq!(es.format_interval(Duration::from_secs(86_400)), "1 día");

        let unlisted = LocaleContext::new("ja_JP", 0).unwrap();
        assert_eq!(unlisted.format_interval(Duration::from_secs(60)), "1 minute");
    }

    #[test]
    fn renders_instant_in_long_form() {
        let ctx = LocaleContext::default();
        let instant = Utc.with_ymd_and_hms(2026, 10, 19, 14, 5, 0).unwrap();
        let rendered = ctx.format_instant(&instant);
        assert!(rendered.contains("Monday"), "{}", rendered);
        assert!(rendered.contains("October"), "{}", rendered);
        assert!(rendered.contains("2026"), "{}", rendered);
    }

    #[test]
    fn renders_instant_with_locale_names_and_offset() {
        let ctx = LocaleContext::new("fr_FR", 120).unwrap();
        let instant = Utc.with_ymd_and_hms(2026, 10, 19, 23, 30, 0).unwrap();
        let rendered = ctx.format_instant(&instant);
        assert!(rendered.contains("mardi"), "{}", rendered);
        assert!(rendered.contains("octobre"), "{}", rendered);
        assert!(rendered.contains("20"), "{}", rendered);
    }

    #[test]
    fn rejects_unknown_locale_and_offset() {
        assert_eq!(
            LocaleContext::new("xx_YY", 0),
            Err(LocaleError::UnknownLocale("xx_YY".to_string()))
        );
        assert_eq!(
            LocaleContext::new("en_US", 24 * 60),
            Err(LocaleError::OffsetOutOfRange(24 * 60))
        );
    }
}
