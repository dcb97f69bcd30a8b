//! Conversion of collation-editor TEI XML to open-cbgm input.
//!
//! A TEI critical apparatus exported by a collation editor is loaded into an
//! in-memory [`Document`], rewritten by the [`Pipeline`] and written back as
//! XML that the open-cbgm library can consume: unit-less and single-reading
//! apparatus are removed, reading text is normalized, every variation unit
//! gets a label, a connectivity value and an empty local stemma, and a
//! header lists the witnesses.

pub mod domain;
pub use domain::{Config, LocalStemma, Siglum, UnitRef, WitnessList};

pub mod pipeline;
pub use pipeline::{Pipeline, Summary};

/// The XML document tree and its file boundary.
pub mod storage;
pub use storage::{Document, default_output_path};
