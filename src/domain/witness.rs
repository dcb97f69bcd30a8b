use std::{collections::HashSet, fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;

/// Trailing markers the collation editor appends to a siglum to flag an
/// uncertain attestation: `*` (first hand) and `V` (*ut videtur*).
const UNCERTAINTY_MARKERS: [char; 2] = ['*', 'V'];

/// A canonical witness identifier, e.g. `01` or `P46`.
///
/// Parsing strips a single trailing uncertainty marker, so `B1*` and `C2V`
/// become `B1` and `C2`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Siglum(NonEmptyString);

impl Siglum {
    /// Canonicalizes a raw `wit` token.
    ///
    /// # Errors
    ///
    /// Returns [`EmptySiglumError`] if nothing is left after the marker is
    /// removed (e.g. the token is just `*`).
    pub fn new(token: &str) -> Result<Self, EmptySiglumError> {
        let canonical = token
            .strip_suffix(UNCERTAINTY_MARKERS)
            .unwrap_or(token)
            .to_string();

        NonEmptyString::new(canonical)
            .map(Self)
            .map_err(|_| EmptySiglumError(token.to_string()))
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for Siglum {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl AsRef<str> for Siglum {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Siglum {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Siglum {
    type Err = EmptySiglumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Error returned when a `wit` token has no identifier left after marker
/// stripping.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Witness token '{0}' is empty once its uncertainty marker is removed")]
pub struct EmptySiglumError(String);

/// The distinct witnesses of a collation, in order of first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WitnessList {
    order: Vec<Siglum>,
    seen: HashSet<Siglum>,
}

impl WitnessList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a witness, returning `false` if it was already listed.
    pub fn insert(&mut self, siglum: Siglum) -> bool {
        if self.seen.insert(siglum.clone()) {
            self.order.push(siglum);
            true
        } else {
            false
        }
    }

    /// Adds every token of a space-separated `wit` attribute.
    ///
    /// Tokens that are empty after canonicalization are skipped and
    /// returned to the caller.
    pub fn extend_from_attribute(&mut self, wit: &str) -> Vec<EmptySiglumError> {
        let mut rejected = Vec::new();
        for token in wit.split_whitespace() {
            match Siglum::new(token) {
                Ok(siglum) => {
                    self.insert(siglum);
                }
                Err(e) => rejected.push(e),
            }
        }
        rejected
    }

    /// Iterates the witnesses in first-occurrence order.
    pub fn iter(&self) -> std::slice::Iter<'_, Siglum> {
        self.order.iter()
    }

    /// Returns the number of distinct witnesses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if no witness has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<'a> IntoIterator for &'a WitnessList {
    type Item = &'a Siglum;
    type IntoIter = std::slice::Iter<'a, Siglum>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
