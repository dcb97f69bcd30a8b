use tracing::instrument;

use super::{sibling_element, tag, tei_children, tei_elements};
use crate::{
    domain::{LocalStemma, Span, UnitError, UnitRef},
    storage::{Document, Element, NodeId},
};

/// Appends a `<note>` to every `<app>` describing the variation unit for
/// open-cbgm:
///
/// ```xml
/// <note>
///   <label>Matt 2:3/4</label>
///   <fs><f name="connectivity"><numeric value="10"/></f></fs>
///   <graph type="directed"><node n="1"/><node n="2"/></graph>
/// </note>
/// ```
///
/// The label is only written when the apparatus `n` starts with a
/// `B..K..V..` reference to a known book. The graph is a local stemma seeded
/// with one node per `<rdg n>` and no edges.
///
/// Returns the number of notes added and how many of them carry a label.
#[instrument(level = "debug", skip(doc))]
pub fn add_unit_notes(doc: &mut Document, connectivity: u32) -> (usize, usize) {
    let mut notes = 0;
    let mut labels = 0;

    for app in tei_elements(doc, tag::APP) {
        let Some(app_element) = doc.element(app) else {
            continue;
        };
        let element = |local| sibling_element(app_element, local);

        let span = Span::new(
            app_element.attribute("from").map(str::to_string),
            app_element.attribute("to").map(str::to_string),
        );
        let label = app_element
            .attribute("n")
            .and_then(unit_ref)
            .map(|unit| unit.label(&span).to_string());

        let reading_ids: Vec<String> = tei_children(doc, app, tag::RDG)
            .into_iter()
            .filter_map(|rdg| doc.attribute(rdg, "n").map(str::to_string))
            .collect();
        let stemma = LocalStemma::seed(reading_ids);

        let note = Scaffold {
            note: element(tag::NOTE),
            label: label.map(|text| (element(tag::LABEL), text)),
            fs: element(tag::FS),
            f: element(tag::F).with_attribute("name", "connectivity"),
            numeric: element(tag::NUMERIC).with_attribute("value", connectivity.to_string()),
            graph: element(tag::GRAPH).with_attribute("type", "directed"),
            node: element(tag::NODE),
        }
        .build(doc, &stemma);

        if doc
            .children(note)
            .first()
            .is_some_and(|&first| doc.local_name(first) == Some(tag::LABEL))
        {
            labels += 1;
        }
        doc.append(app, note);
        notes += 1;
    }

    tracing::debug!("Added {notes} note(s), {labels} with a label");
    (notes, labels)
}

/// Parses the base identifier, logging why no label can be built.
fn unit_ref(n: &str) -> Option<UnitRef> {
    match n.parse::<UnitRef>() {
        Ok(unit) => Some(unit),
        Err(UnitError::Syntax(_)) => {
            tracing::debug!("No label for unit '{n}': not a book/chapter/verse reference");
            None
        }
        Err(UnitError::Book(e)) => {
            tracing::warn!("No label for unit '{n}': {e}");
            None
        }
    }
}

/// Element templates for one note, named in the apparatus's namespace.
struct Scaffold {
    note: Element,
    label: Option<(Element, String)>,
    fs: Element,
    f: Element,
    numeric: Element,
    graph: Element,
    node: Element,
}

impl Scaffold {
    /// Builds the detached `<note>` subtree and returns its id.
    fn build(self, doc: &mut Document, stemma: &LocalStemma) -> NodeId {
        let note = doc.create_element(self.note);

        if let Some((label, text)) = self.label {
            let label = doc.create_element(label);
            let text = doc.create_text(text);
            doc.append(label, text);
            doc.append(note, label);
        }

        let fs = doc.create_element(self.fs);
        let f = doc.create_element(self.f);
        let numeric = doc.create_element(self.numeric);
        doc.append(f, numeric);
        doc.append(fs, f);
        doc.append(note, fs);

        let graph = doc.create_element(self.graph);
        for reading in stemma.readings() {
            let node = doc.create_element(self.node.clone().with_attribute("n", reading));
            doc.append(graph, node);
        }
        doc.append(note, graph);

        note
    }
}
