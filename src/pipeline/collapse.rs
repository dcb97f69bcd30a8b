use tracing::instrument;

use super::{sibling_element, tag, tei_children, tei_elements};
use crate::storage::Document;

/// Replaces every `<app>` with exactly one `<rdg>` child by a `<seg>` holding
/// that reading's text.
///
/// A lemma does not count as a reading here. The segment takes the
/// apparatus's place among its siblings; the reading's attributes (including
/// `wit`) are not carried over. Returns the number of apparatus elements
/// replaced.
#[instrument(level = "debug", skip_all)]
pub fn collapse_single_readings(doc: &mut Document) -> usize {
    let mut collapsed = 0;

    for app in tei_elements(doc, tag::APP) {
        let readings = tei_children(doc, app, tag::RDG);
        let &[reading] = readings.as_slice() else {
            continue;
        };
        let Some(seg_element) = doc.element(app).map(|app| sibling_element(app, tag::SEG)) else {
            continue;
        };

        let text = doc.text(reading);
        let seg = doc.create_element(seg_element);
        if let Some(text) = text {
            let text = doc.create_text(text);
            doc.append(seg, text);
        }

        if doc.replace(app, seg) {
            collapsed += 1;
        }
    }

    tracing::debug!("Collapsed {collapsed} single-reading apparatus element(s)");
    collapsed
}
