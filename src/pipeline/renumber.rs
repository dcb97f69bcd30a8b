use tracing::instrument;

use super::{tag, tei_elements};
use crate::{domain::Span, storage::Document};

/// Folds the word span of every `<app>` into its `n` attribute and drops
/// `from`/`to`.
///
/// `n="B01K02V03" from="4" to="6"` becomes `n="B01K02V03U4-6"`; when both
/// indices are equal the `-6` part is omitted. An apparatus without `n` is
/// renumbered from an empty base. Apparatus elements with neither index are
/// left alone. Returns the number renumbered.
#[instrument(level = "debug", skip_all)]
pub fn renumber_units(doc: &mut Document) -> usize {
    let mut renumbered = 0;

    for app in tei_elements(doc, tag::APP) {
        let Some(element) = doc.element_mut(app) else {
            continue;
        };

        let span = Span::new(
            element.remove_attribute("from"),
            element.remove_attribute("to"),
        );
        if span.is_empty() {
            continue;
        }

        let base = element.attribute("n").unwrap_or_else(|| {
            tracing::warn!("Apparatus without 'n' attribute; renumbering from an empty base");
            ""
        });

        if let Some(id) = span.unit_id(base) {
            element.set_attribute("n", id);
            renumbered += 1;
        }
    }

    tracing::debug!("Renumbered {renumbered} apparatus element(s)");
    renumbered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::xml;

    fn renumbered(input: &str) -> Vec<(Option<String>, bool)> {
        let mut doc = xml::parse(input).unwrap();
        renumber_units(&mut doc);
        doc.elements_named(tag::APP)
            .into_iter()
            .map(|app| {
                let n = doc.attribute(app, "n").map(str::to_string);
                let has_span =
                    doc.attribute(app, "from").is_some() || doc.attribute(app, "to").is_some();
                (n, has_span)
            })
            .collect()
    }

    #[test]
    fn single_word_unit() {
        assert_eq!(
            renumbered(r#"<TEI><app n="B01K02V03" from="4" to="4"/></TEI>"#),
            [(Some("B01K02V03U4".to_string()), false)]
        );
    }

    #[test]
    fn word_range_unit() {
        assert_eq!(
            renumbered(r#"<TEI><app n="B04K01V01" from="2" to="12"/></TEI>"#),
            [(Some("B04K01V01U2-12".to_string()), false)]
        );
    }

    #[test]
    fn partial_span_uses_the_recorded_index() {
        assert_eq!(
            renumbered(r#"<TEI><app n="X" from="3"/><app n="Y" to="5"/></TEI>"#),
            [
                (Some("XU3".to_string()), false),
                (Some("YU5".to_string()), false)
            ]
        );
    }

    #[test]
    fn missing_base_identifier() {
        assert_eq!(
            renumbered(r#"<TEI><app from="1" to="2"/></TEI>"#),
            [(Some("U1-2".to_string()), false)]
        );
    }

    #[test]
    fn unitless_apparatus_is_untouched() {
        assert_eq!(
            renumbered(r#"<TEI><app n="B01K01V01"/></TEI>"#),
            [(Some("B01K01V01".to_string()), false)]
        );
    }

    #[test]
    fn keeps_other_attributes() {
        let mut doc =
            xml::parse(r#"<TEI><app type="main" n="Z" from="1" to="1" xml:id="z"/></TEI>"#)
                .unwrap();
        renumber_units(&mut doc);

        let app = doc.elements_named(tag::APP)[0];
        let attributes: Vec<_> = doc.element(app).unwrap().attributes().collect();
        assert_eq!(
            attributes,
            [("type", "main"), ("n", "ZU1"), ("xml:id", "z")]
        );
    }
}
