//! Best-effort age parsing.
//!
//! Ages arrive from HTML form fields as text. Parsing is deliberately lenient:
//! leading whitespace is skipped, an optional sign is accepted and the longest
//! run of ASCII digits that follows is used. Anything after that run is
//! ignored, so `"3.7"` is `3` and `"12abc"` is `12`. Input without a digit
//! run parses to [`ParsedAge::NotANumber`]; range checks are left to the API.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of [`parse_age`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum ParsedAge {
    /// A leading integer was found.
    Number(i64),
    /// No leading integer, or it does not fit in an `i64`.
    NotANumber,
}

impl ParsedAge {
    /// The parsed value, or `None` for [`ParsedAge::NotANumber`].
    #[must_use]
    pub const fn value(self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(n),
            Self::NotANumber => None,
        }
    }
}

impl fmt::Display for ParsedAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::NotANumber => f.write_str("NaN"),
        }
    }
}

/// Parse an age from form text.
///
/// # Examples
///
/// ```
/// use user_directory_core::{ParsedAge, parse_age};
///
/// assert_eq!(parse_age("25"), ParsedAge::Number(25));
/// assert_eq!(parse_age("  42 years"), ParsedAge::Number(42));
/// assert_eq!(parse_age("abc"), ParsedAge::NotANumber);
/// ```
#[must_use]
pub fn parse_age(input: &str) -> ParsedAge {
    let trimmed = input.trim_start();

    let (negative, rest) = trimmed.strip_prefix('-').map_or_else(
        || (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        |rest| (true, rest),
    );

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return ParsedAge::NotANumber;
    }

    // ASCII digits are single bytes, so this is a char boundary.
    let (digits, _) = rest.split_at(digits_len);
    let parsed = if negative {
        format!("-{digits}").parse::<i64>()
    } else {
        digits.parse::<i64>()
    };

    parsed.map_or(ParsedAge::NotANumber, ParsedAge::Number)
}
