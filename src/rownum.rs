//! Dotted row-number tokens: the host/attachment keying convention.

use regex::Regex;

use crate::table::clean_value;

/// Input column carrying the dotted row-number token.
pub const ROW_COLUMN: &str = "Row #";

/// A row-number token, parsed once at ingestion. A bare integer marks a
/// host; `N.x` marks an attachment of host `N`; anything else carries no
/// usable key and is reported as unmatched by the passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowNumber {
    /// Whole-number token, e.g. `3`.
    Host(u64),
    /// Dotted token whose integer part names a host, e.g. `3.1`.
    Attachment {
        /// Host number shared with the owning `Host` row.
        host: u64,
    },
    /// No parseable integer key.
    Unkeyed,
}

/// Parses row-number tokens after stripping every non-digit, non-dot
/// character. Review exports pad these cells with stray markers, so the
/// cleanup runs before any classification.
#[derive(Debug)]
pub struct RowKeyParser {
    strip: Regex,
}

impl RowKeyParser {
    /// Build the parser.
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded cleanup regex is invalid (compile-time
    /// invariant).
    pub fn new() -> Self {
        Self {
            strip: Regex::new(r"[^\d.]").expect("valid regex"),
        }
    }

    /// Reduce a raw cell to its digit-and-dot core.
    pub fn clean(&self, raw: &str) -> String {
        self.strip.replace_all(&clean_value(raw), "").into_owned()
    }

    /// Classify a raw row-number cell.
    pub fn parse(&self, raw: &str) -> RowNumber {
        let cleaned = self.clean(raw);
        if !cleaned.is_empty() && cleaned.bytes().all(|b| b.is_ascii_digit()) {
            return match cleaned.parse() {
                Ok(host) => RowNumber::Host(host),
                Err(_) => RowNumber::Unkeyed,
            };
        }
        let Some((integer_part, _)) = cleaned.split_once('.') else {
            return RowNumber::Unkeyed;
        };
        match integer_part.parse() {
            Ok(host) => RowNumber::Attachment { host },
            Err(_) => RowNumber::Unkeyed,
        }
    }
}

impl Default for RowKeyParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a cleaned token denotes a parent row in the relationship listing:
/// any value that parses as a number with zero fractional part. `3` and
/// `3.0` are both parents; `3.1` and blank cells are not.
pub fn is_whole_number(cleaned: &str) -> bool {
    cleaned.parse::<f64>().is_ok_and(|v| v.fract() == 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_integers_are_hosts() {
        let parser = RowKeyParser::new();
        assert_eq!(parser.parse("3"), RowNumber::Host(3));
        assert_eq!(parser.parse(" 12 "), RowNumber::Host(12));
    }

    #[test]
    fn dotted_tokens_are_attachments_of_the_integer_prefix() {
        let parser = RowKeyParser::new();
        assert_eq!(parser.parse("3.1"), RowNumber::Attachment { host: 3 });
        assert_eq!(parser.parse("3.10"), RowNumber::Attachment { host: 3 });
    }

    #[test]
    fn stray_characters_are_stripped_before_parsing() {
        let parser = RowKeyParser::new();
        assert_eq!(parser.parse("\u{2800}7a"), RowNumber::Host(7));
        assert_eq!(parser.parse("» 4.2"), RowNumber::Attachment { host: 4 });
    }

    #[test]
    fn unkeyed_tokens_are_flagged() {
        let parser = RowKeyParser::new();
        assert_eq!(parser.parse(""), RowNumber::Unkeyed);
        assert_eq!(parser.parse("abc"), RowNumber::Unkeyed);
        assert_eq!(parser.parse(".5"), RowNumber::Unkeyed);
    }

    #[test]
    fn whole_number_test_accepts_trailing_zero_fraction() {
        assert!(is_whole_number("3"));
        assert!(is_whole_number("3.0"));
        assert!(!is_whole_number("3.1"));
        assert!(!is_whole_number(""));
        assert!(!is_whole_number("abc"));
    }
}
