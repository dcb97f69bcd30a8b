use tracing::instrument;

use super::{tag, tei_elements};
use crate::storage::Document;

/// Removes every `<app>` that has neither `from` nor `to`.
///
/// The collation editor emits such elements to record which witnesses are
/// lacunose for a whole verse; they carry no variation. Returns the number
/// removed.
#[instrument(level = "debug", skip_all)]
pub fn strip_unitless_apps(doc: &mut Document) -> usize {
    let unitless: Vec<_> = tei_elements(doc, tag::APP)
        .into_iter()
        .filter(|&app| doc.attribute(app, "from").is_none() && doc.attribute(app, "to").is_none())
        .collect();

    for &app in &unitless {
        doc.detach(app);
    }

    tracing::debug!("Removed {} unit-less apparatus element(s)", unitless.len());
    unitless.len()
}

/// Removes every `<wit>` element.
///
/// The witnesses are already listed in the `wit` attribute of the enclosing
/// reading. Returns the number removed.
#[instrument(level = "debug", skip_all)]
pub fn strip_wit_subelements(doc: &mut Document) -> usize {
    let wits = tei_elements(doc, tag::WIT);

    for &wit in &wits {
        doc.detach(wit);
    }

    tracing::debug!("Removed {} <wit> element(s)", wits.len());
    wits.len()
}
