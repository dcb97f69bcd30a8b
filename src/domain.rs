//! Domain types for TEI critical apparatus conversion.
//!
//! This module contains the value types the pipeline reasons about: book
//! codes, variation-unit identifiers, witness sigla, local stemmata and the
//! conversion configuration.

/// New Testament book codes.
pub mod book;
pub use book::{BookCode, UnknownBookError};

mod config;
pub use config::{Config, Error as ConfigError};

/// Local stemmata.
pub mod stemma;
pub use stemma::LocalStemma;

pub mod unit;
pub use unit::{Error as UnitError, Label, Span, UnitRef};

/// Witness sigla and witness lists.
pub mod witness;
pub use witness::{EmptySiglumError, Siglum, WitnessList};
