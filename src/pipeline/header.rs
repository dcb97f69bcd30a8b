use tracing::instrument;

use super::{Error, sibling_element, tag, tei_element, tei_elements};
use crate::{domain::WitnessList, storage::Document};

/// Collects the distinct witnesses cited by `<rdg wit>` attributes, in order
/// of first occurrence.
///
/// Uncertainty markers are stripped (`B1*` and `B1V` both count as `B1`).
/// Readings without `wit`, and `<lem>` elements, contribute nothing. Readings
/// of apparatus already collapsed into `<seg>` are gone by the time this
/// runs, so their witnesses are not listed.
#[must_use]
pub fn collect_witnesses(doc: &Document) -> WitnessList {
    let mut witnesses = WitnessList::new();

    for rdg in tei_elements(doc, tag::RDG) {
        let Some(wit) = doc.attribute(rdg, "wit") else {
            continue;
        };
        for rejected in witnesses.extend_from_attribute(wit) {
            tracing::warn!("Skipping witness: {rejected}");
        }
    }

    witnesses
}

/// Inserts a `<teiHeader>` listing every witness as the first child of the
/// `<TEI>` element:
///
/// ```xml
/// <teiHeader>
///   <sourceDesc>
///     <listWit><witness n="01"/><witness n="02"/></listWit>
///   </sourceDesc>
/// </teiHeader>
/// ```
///
/// open-cbgm reads its witness list from here. Returns the number of
/// witnesses listed.
///
/// # Errors
///
/// Returns [`Error::MissingTeiElement`] if the document has no `<TEI>`.
#[instrument(level = "debug", skip_all)]
pub fn add_tei_header(doc: &mut Document) -> Result<usize, Error> {
    let witnesses = collect_witnesses(doc);

    let tei = tei_element(doc).ok_or(Error::MissingTeiElement)?;
    let Some(reference) = doc.element(tei) else {
        return Err(Error::MissingTeiElement);
    };
    let element = |local| sibling_element(reference, local);

    let header_element = element(tag::TEI_HEADER);
    let source_desc_element = element(tag::SOURCE_DESC);
    let list_wit_element = element(tag::LIST_WIT);
    let witness_elements: Vec<_> = witnesses
        .iter()
        .map(|siglum| element(tag::WITNESS).with_attribute("n", siglum.as_str()))
        .collect();

    let header = doc.create_element(header_element);
    let source_desc = doc.create_element(source_desc_element);
    let list_wit = doc.create_element(list_wit_element);
    for witness in witness_elements {
        let witness = doc.create_element(witness);
        doc.append(list_wit, witness);
    }
    doc.append(source_desc, list_wit);
    doc.append(header, source_desc);
    doc.insert(tei, 0, header);

    tracing::debug!("Listed {} witness(es) in the header", witnesses.len());
    Ok(witnesses.len())
}
