//! Number formatting conventions used when rendering values and converting
//! helper arguments.

use std::borrow::Cow;

/// Decimal and digit-group separators for a culture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    tag: Cow<'static, str>,
    decimal_separator: char,
    group_separator: char,
}

static KNOWN: &[Locale] = &[
    Locale::INVARIANT,
    Locale::EN_US,
    Locale::EN_GB,
    Locale::DE_DE,
    Locale::FR_FR,
    Locale::RU_RU,
];

impl Locale {
    pub const INVARIANT: Locale = Locale::fixed("", '.', ',');
    pub const EN_US: Locale = Locale::fixed("en-US", '.', ',');
    pub const EN_GB: Locale = Locale::fixed("en-GB", '.', ',');
    pub const DE_DE: Locale = Locale::fixed("de-DE", ',', '.');
    pub const FR_FR: Locale = Locale::fixed("fr-FR", ',', '\u{202f}');
    pub const RU_RU: Locale = Locale::fixed("ru-RU", ',', '\u{a0}');

    const fn fixed(tag: &'static str, decimal_separator: char, group_separator: char) -> Self {
        Self {
            tag: Cow::Borrowed(tag),
            decimal_separator,
            group_separator,
        }
    }

    /// Creates a locale with custom separators
    pub fn new(tag: impl Into<String>, decimal_separator: char, group_separator: char) -> Self {
        Self {
            tag: Cow::Owned(tag.into()),
            decimal_separator,
            group_separator,
        }
    }

    /// Finds a built-in locale by tag, ignoring case and accepting `_` for `-`
    pub fn from_tag(tag: &str) -> Option<Self> {
        let wanted = tag.trim().replace('_', "-");
        KNOWN
            .iter()
            .find(|locale| locale.tag.eq_ignore_ascii_case(&wanted))
            .cloned()
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    pub fn group_separator(&self) -> char {
        self.group_separator
    }

    /// Formats a float with this locale's decimal separator and no digit grouping
    pub fn format_float(&self, value: f64) -> String {
        let text = value.to_string();
        if self.decimal_separator == '.' {
            text
        } else {
            text.replace('.', self.decimal_separator.encode_utf8(&mut [0; 4]))
        }
    }

    /// Parses an integer, allowing a sign and surrounding whitespace
    pub fn parse_int(&self, text: &str) -> Option<i64> {
        text.trim().parse().ok()
    }

    /// Parses a finite decimal number written in this locale
    ///
    /// Group separators are skipped wherever they appear, so `"1,21"` reads as
    /// `121` under a comma-grouping locale. A `.` is rejected when it is neither the
    /// decimal nor the group separator, so `"1.21"` does not parse under a
    /// comma-decimal locale.
    pub fn parse_float(&self, text: &str) -> Option<f64> {
        let mut normalized = String::with_capacity(text.len());
        for c in text.trim().chars() {
            if c == self.group_separator {
                continue;
            } else if c == self.decimal_separator {
                normalized.push('.');
            } else if c == '.' || c == ',' {
                return None;
            } else {
                normalized.push(c);
            }
        }
        if !normalized
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        {
            return None;
        }
        normalized.parse::<f64>().ok().filter(|value| value.is_finite())
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::INVARIANT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_decimal_comma() {
        assert_eq!(Locale::RU_RU.format_float(1.21), "1,21");
        assert_eq!(Locale::EN_GB.format_float(1.21), "1.21");
        assert_eq!(Locale::DE_DE.format_float(10.0), "10");
    }

    #[test]
    fn parses_by_locale() {
        assert_eq!(Locale::EN_GB.parse_float("10.21"), Some(10.21));
        assert_eq!(Locale::EN_GB.parse_float("1,000.5"), Some(1000.5));
        assert_eq!(Locale::EN_GB.parse_float("1,21"), Some(121.0));
        assert_eq!(Locale::RU_RU.parse_float("1,21"), Some(1.21));
        assert_eq!(Locale::RU_RU.parse_float("1.21"), None);
        assert_eq!(Locale::DE_DE.parse_float("1.234,5"), Some(1234.5));
        assert_eq!(Locale::INVARIANT.parse_float("inf"), None);
        assert_eq!(Locale::INVARIANT.parse_float("abc"), None);
    }

    #[test]
    fn finds_known_tags() {
        assert_eq!(Locale::from_tag("ru_ru"), Some(Locale::RU_RU));
        assert_eq!(Locale::from_tag("EN-gb"), Some(Locale::EN_GB));
        assert_eq!(Locale::from_tag("xx-YY"), None);
    }

    #[test]
    fn custom_separators() {
        let swiss = Locale::new("de-CH", '.', '\'');
        assert_eq!(swiss.tag(), "de-CH");
        assert_eq!(swiss.group_separator(), '\'');
        assert_eq!(swiss.parse_float("1'234.5"), Some(1234.5));
        assert_eq!(swiss.parse_float("1,5"), None);
    }
}
