//! Variation-unit identifiers.
//!
//! A collation-editor apparatus carries a base identifier `n` of the form
//! `B<book>K<chapter>V<verse>` (e.g. `B01K02V03`), plus optional `from` and
//! `to` word indices. Together they describe one unit of variation, which
//! open-cbgm expects as a single identifier `B01K02V03U4-6`.

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;

use super::book::{BookCode, UnknownBookError};

static UNIT_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(B\d+)K(\d+)V(\d+)").expect("unit pattern is valid"));

/// Errors that can occur when parsing a base identifier.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The identifier is not of the form `B<digits>K<digits>V<digits>`.
    #[error("Invalid unit identifier '{0}': expected B<book>K<chapter>V<verse>")]
    Syntax(String),

    /// The identifier is well-formed but names a book outside the table.
    #[error(transparent)]
    Book(#[from] UnknownBookError),
}

/// The book, chapter and verse encoded in an apparatus base identifier.
///
/// Only the leading `B..K..V..` part of the identifier is significant; any
/// trailing characters are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitRef {
    book: BookCode,
    chapter: String,
    verse: String,
}

impl UnitRef {
    /// Returns the book.
    #[must_use]
    pub const fn book(&self) -> BookCode {
        self.book
    }

    /// Returns the chapter number, without leading zeros.
    #[must_use]
    pub fn chapter(&self) -> &str {
        &self.chapter
    }

    /// Returns the verse number, without leading zeros.
    #[must_use]
    pub fn verse(&self) -> &str {
        &self.verse
    }

    /// Builds the human-readable label for this reference over the given
    /// word span.
    #[must_use]
    pub fn label<'a>(&'a self, span: &'a Span) -> Label<'a> {
        Label { unit: self, span }
    }
}

impl FromStr for UnitRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = UNIT_REF
            .captures(s)
            .ok_or_else(|| Error::Syntax(s.to_string()))?;

        let book = captures[1].parse::<BookCode>()?;

        Ok(Self {
            book,
            chapter: strip_leading_zeros(&captures[2]),
            verse: strip_leading_zeros(&captures[3]),
        })
    }
}

fn strip_leading_zeros(digits: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// The `from`/`to` word indices of an apparatus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Span {
    /// First word index, if recorded.
    pub from: Option<String>,
    /// Last word index, if recorded.
    pub to: Option<String>,
}

impl Span {
    /// Creates a span from the raw attribute values.
    #[must_use]
    pub const fn new(from: Option<String>, to: Option<String>) -> Self {
        Self { from, to }
    }

    /// Returns `true` if neither index is recorded.
    ///
    /// Such an apparatus only documents lacunae for a whole verse and carries
    /// no variation.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Returns the end index if it is present and differs from the start.
    fn distinct_end(&self) -> Option<&str> {
        match (&self.from, &self.to) {
            (Some(from), Some(to)) if from == to => None,
            (_, to) => to.as_deref(),
        }
    }

    /// Returns the open-cbgm identifier for this span under the given base
    /// identifier: `<base>U<from>[-<to>]`.
    ///
    /// When only one index is recorded it is used for both ends. Returns
    /// `None` if the span is empty.
    #[must_use]
    pub fn unit_id(&self, base: &str) -> Option<String> {
        let start = self.from.as_deref().or(self.to.as_deref())?;
        let end = match (&self.from, &self.to) {
            (Some(from), Some(to)) if from != to => Some(to.as_str()),
            _ => None,
        };

        Some(match end {
            Some(end) => format!("{base}U{start}-{end}"),
            None => format!("{base}U{start}"),
        })
    }
}

/// A human-readable variation-unit label, e.g. `Matt 2:3/4-6`.
///
/// Returned by [`UnitRef::label`].
#[derive(Debug, Clone, Copy)]
pub struct Label<'a> {
    unit: &'a UnitRef,
    span: &'a Span,
}

impl fmt::Display for Label<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {}:{}",
            self.unit.book.abbreviation(),
            self.unit.chapter,
            self.unit.verse
        )?;
        if let Some(from) = &self.span.from {
            write!(f, "/{from}")?;
        }
        if let Some(to) = self.span.distinct_end() {
            write!(f, "-{to}")?;
        }
        Ok(())
    }
}
