//! The conversion pipeline.
//!
//! A collation-editor document is rewritten in place by a fixed sequence of
//! passes. Later passes depend on the output of earlier ones (e.g. the
//! annotation pass reads the `from`/`to` attributes that renumbering later
//! removes), so the order is not configurable.
//!
//! The pipeline is meant to be applied once. Running it again over its own
//! output deletes every apparatus (they no longer carry `from`/`to`) and
//! injects a second header.

use std::fmt;

use tracing::instrument;

use crate::{
    domain::Config,
    storage::{Document, Element, NodeId},
};

mod annotate;
mod collapse;
mod header;
mod normalize;
mod prune;
mod renumber;

pub use annotate::add_unit_notes;
pub use collapse::collapse_single_readings;
pub use header::{add_tei_header, collect_witnesses};
pub use normalize::{clear_omission_text, unescape_underdots};
pub use prune::{strip_unitless_apps, strip_wit_subelements};
pub use renumber::renumber_units;

/// Local names of the TEI elements the passes read or generate.
pub(crate) mod tag {
    /// The TEI namespace URI.
    pub const TEI_NS: &str = "http://www.tei-c.org/ns/1.0";

    pub const APP: &str = "app";
    pub const RDG: &str = "rdg";
    pub const LEM: &str = "lem";
    pub const WIT: &str = "wit";
    pub const SEG: &str = "seg";
    pub const NOTE: &str = "note";
    pub const LABEL: &str = "label";
    pub const FS: &str = "fs";
    pub const F: &str = "f";
    pub const NUMERIC: &str = "numeric";
    pub const GRAPH: &str = "graph";
    pub const NODE: &str = "node";
    pub const TEI: &str = "TEI";
    pub const TEI_HEADER: &str = "teiHeader";
    pub const SOURCE_DESC: &str = "sourceDesc";
    pub const LIST_WIT: &str = "listWit";
    pub const WITNESS: &str = "witness";
}

/// Errors that abort the pipeline.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The document has no `TEI` element to receive the header.
    #[error("document has no <TEI> element")]
    MissingTeiElement,
}

/// Counts of what each pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Apparatus elements removed for lacking `from` and `to`.
    pub unitless_apps_removed: usize,
    /// `<wit>` elements removed.
    pub wit_elements_removed: usize,
    /// Readings whose escaped underdots were replaced.
    pub underdots_unescaped: usize,
    /// Omission readings whose text was cleared.
    pub omissions_cleared: usize,
    /// Single-reading apparatus elements replaced by `<seg>`.
    pub apps_collapsed: usize,
    /// Apparatus elements that received a note.
    pub notes_added: usize,
    /// Notes that received a label.
    pub labels_added: usize,
    /// Apparatus elements renumbered.
    pub apps_renumbered: usize,
    /// Distinct witnesses listed in the header.
    pub witnesses: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} variation units", self.notes_added)?;
        writeln!(f, "{} witnesses", self.witnesses)?;
        writeln!(
            f,
            "{} single-reading units collapsed",
            self.apps_collapsed
        )?;
        write!(f, "{} unit-less apparatus removed", self.unitless_apps_removed)
    }
}

/// Runs the conversion passes in order over one document.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    /// Creates a pipeline with the given configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Converts the document in place.
    ///
    /// The document is checked for a `TEI` element before any pass runs, so
    /// a failing conversion leaves it untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingTeiElement`] if there is nowhere to put the
    /// header.
    #[instrument(level = "debug", skip_all)]
    pub fn run(&self, doc: &mut Document) -> Result<Summary, Error> {
        if tei_element(doc).is_none() {
            return Err(Error::MissingTeiElement);
        }

        let mut summary = Summary {
            unitless_apps_removed: strip_unitless_apps(doc),
            wit_elements_removed: strip_wit_subelements(doc),
            underdots_unescaped: unescape_underdots(doc),
            omissions_cleared: clear_omission_text(doc),
            apps_collapsed: collapse_single_readings(doc),
            ..Summary::default()
        };

        let (notes, labels) = add_unit_notes(doc, self.config.connectivity());
        summary.notes_added = notes;
        summary.labels_added = labels;
        summary.apps_renumbered = renumber_units(doc);
        summary.witnesses = add_tei_header(doc)?;

        tracing::info!(
            units = summary.notes_added,
            witnesses = summary.witnesses,
            "Converted document"
        );
        Ok(summary)
    }
}

/// Returns `true` for elements in the TEI namespace, or in no namespace at
/// all (collations exported without a namespace declaration).
fn is_tei(element: &Element) -> bool {
    element.namespace().is_none_or(|namespace| namespace == tag::TEI_NS)
}

/// Finds the first `TEI` element in document order.
fn tei_element(doc: &Document) -> Option<NodeId> {
    tei_elements(doc, tag::TEI).into_iter().next()
}

/// Builds a new element named `local` in the namespace of `reference`,
/// reusing its prefix so that generated markup serializes the same way.
fn sibling_element(reference: &Element, local: &str) -> Element {
    let name = match reference.name().rsplit_once(':') {
        Some((prefix, _)) => format!("{prefix}:{local}"),
        None => local.to_string(),
    };
    Element::new(name).with_namespace(reference.namespace().map(str::to_string))
}

/// Returns the TEI elements with the given local name, in document order.
fn tei_elements(doc: &Document, local: &str) -> Vec<NodeId> {
    elements_named_any(doc, &[local])
}

/// Returns the TEI elements whose local name is any of `names`, in document
/// order.
fn elements_named_any(doc: &Document, names: &[&str]) -> Vec<NodeId> {
    doc.elements_matching(|element| is_tei(element) && names.contains(&element.local_name()))
}

/// Returns the TEI element children of `id` with the given local name.
fn tei_children(doc: &Document, id: NodeId, local: &str) -> Vec<NodeId> {
    doc.children(id)
        .iter()
        .copied()
        .filter(|&child| {
            doc.element(child)
                .is_some_and(|element| is_tei(element) && element.local_name() == local)
        })
        .collect()
}
