use std::{fmt, str::FromStr};

/// SBL abbreviations for the New Testament books, indexed by book number.
///
/// Book `B01` is `Matt`, book `B27` is `Rev`.
const ABBREVIATIONS: [&str; 27] = [
    "Matt", "Mark", "Luke", "John", "Acts", "Rom", "1 Cor", "2 Cor", "Gal", "Eph", "Phil", "Col",
    "1 Thess", "2 Thess", "1 Tim", "2 Tim", "Titus", "Phlm", "Heb", "Jas", "1 Pet", "2 Pet",
    "1 John", "2 John", "3 John", "Jude", "Rev",
];

/// A New Testament book code of the form `B01`..`B27`.
///
/// The set of codes is closed: any other value is a data error in the
/// collation and is rejected with [`UnknownBookError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BookCode(u8);

impl BookCode {
    /// Looks up a book by its number (1-based).
    ///
    /// # Errors
    ///
    /// Returns [`UnknownBookError`] if the number is outside `1..=27`.
    pub fn new(number: u8) -> Result<Self, UnknownBookError> {
        if (1..=27).contains(&number) {
            Ok(Self(number))
        } else {
            Err(UnknownBookError(format!("B{number:02}")))
        }
    }

    /// Returns the 1-based book number.
    #[must_use]
    pub const fn number(self) -> u8 {
        self.0
    }

    /// Returns the standard abbreviation for this book (e.g. `1 Cor`).
    #[must_use]
    pub const fn abbreviation(self) -> &'static str {
        ABBREVIATIONS[self.0 as usize - 1]
    }
}

impl fmt::Display for BookCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "B{:02}", self.0)
    }
}

impl FromStr for BookCode {
    type Err = UnknownBookError;

    /// Parses a code exactly as it appears in the table, e.g. `B07`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownBookError(s.to_string());

        let digits = s.strip_prefix('B').ok_or_else(unknown)?;
        if digits.len() != 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(unknown());
        }

        let number = digits.parse::<u8>().map_err(|_| unknown())?;
        Self::new(number).map_err(|_| unknown())
    }
}

impl TryFrom<&str> for BookCode {
    type Error = UnknownBookError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_str(value)
    }
}

/// Error returned when a book code is not one of `B01`..`B27`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unknown book code '{0}': expected B01 to B27")]
pub struct UnknownBookError(String);

impl UnknownBookError {
    /// Returns the offending code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("B01", "Matt")]
    #[test_case("B04", "John")]
    #[test_case("B07", "1 Cor")]
    #[test_case("B13", "1 Thess")]
    #[test_case("B18", "Phlm")]
    #[test_case("B25", "3 John")]
    #[test_case("B27", "Rev")]
    fn known_codes(code: &str, expected: &str) {
        let book: BookCode = code.parse().unwrap();
        assert_eq!(book.abbreviation(), expected);
        assert_eq!(book.to_string(), code);
    }

    #[test_case("B00"; "zero")]
    #[test_case("B28"; "past revelation")]
    #[test_case("B1"; "single digit")]
    #[test_case("B001"; "three digits")]
    #[test_case("K01"; "wrong letter")]
    #[test_case(""; "empty")]
    fn unknown_codes(code: &str) {
        let error = BookCode::try_from(code).unwrap_err();
        assert_eq!(error.code(), code);
    }

    #[test]
    fn new_rejects_out_of_range() {
        assert!(BookCode::new(0).is_err());
        assert!(BookCode::new(28).is_err());
        assert_eq!(BookCode::new(27).unwrap().abbreviation(), "Rev");
    }

    #[test]
    fn error_display() {
        let error = BookCode::try_from("B99").unwrap_err();
        assert_eq!(
            error.to_string(),
            "Unknown book code 'B99': expected B01 to B27"
        );
    }
}
