use tracing::instrument;

use super::{elements_named_any, tag};
use crate::storage::Document;

/// The character reference for U+0323 COMBINING DOT BELOW, as it appears in
/// reading text when the collation editor has escaped it twice.
const ESCAPED_UNDERDOT: &str = "&#803;";
const UNDERDOT: &str = "\u{0323}";

/// Replaces literal `&#803;` in `<lem>` and `<rdg>` text with the combining
/// underdot it encodes.
///
/// Returns the number of readings changed.
#[instrument(level = "debug", skip_all)]
pub fn unescape_underdots(doc: &mut Document) -> usize {
    let mut changed = 0;

    for reading in elements_named_any(doc, &[tag::LEM, tag::RDG]) {
        let Some(text) = doc.text(reading) else {
            continue;
        };
        if text.contains(ESCAPED_UNDERDOT) {
            doc.set_text(reading, Some(&text.replace(ESCAPED_UNDERDOT, UNDERDOT)));
            changed += 1;
        }
    }

    tracing::debug!("Unescaped underdots in {changed} reading(s)");
    changed
}

/// Clears the text of every `<lem>` and `<rdg>` with `type="om"`.
///
/// An omission has no text; whatever the editor typed there (e.g. `om.`) must
/// not survive into a collapsed segment. Returns the number of readings that
/// had text.
#[instrument(level = "debug", skip_all)]
pub fn clear_omission_text(doc: &mut Document) -> usize {
    let mut cleared = 0;

    for reading in elements_named_any(doc, &[tag::LEM, tag::RDG]) {
        if doc.attribute(reading, "type") != Some("om") {
            continue;
        }
        if doc.text(reading).is_some() {
            cleared += 1;
        }
        doc.set_text(reading, None);
    }

    tracing::debug!("Cleared text of {cleared} omission reading(s)");
    cleared
}
