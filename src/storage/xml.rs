//! XML reading and writing for [`Document`].
//!
//! Parsing keeps elements, attributes (including namespace declarations),
//! comments and character data, and records the namespace URI each element
//! name resolves to. Entity and character references are resolved, so text
//! held in the tree is plain Unicode. Whitespace-only text is dropped so that
//! the output can be re-indented; all other text is kept verbatim. The XML
//! declaration, processing instructions and DOCTYPE are not retained; output
//! always starts with a fresh UTF-8 declaration.
//!
//! Writing indents element-only content by two spaces. Elements with text
//! children (mixed content) are written exactly as held, without added
//! whitespace anywhere below them.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use quick_xml::{
    NsReader, Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    name::{Namespace, ResolveResult},
};
use tracing::instrument;

use super::document::{Document, Element, NodeId, NodeKind};

const INDENT: usize = 2;

/// Errors that can occur when reading a document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The file could not be read.
    #[error("failed to read input")]
    Io(#[from] io::Error),

    /// The input is not well-formed XML.
    #[error("malformed XML at byte {position}")]
    Xml {
        /// Byte offset at which the reader stopped.
        position: usize,
        /// The underlying reader error.
        #[source]
        source: quick_xml::Error,
    },

    /// An end tag appeared with no open element.
    #[error("unexpected end tag '{name}' at byte {position}")]
    UnexpectedEnd {
        /// The tag name.
        name: String,
        /// Byte offset of the tag.
        position: usize,
    },

    /// Character data appeared before or after the root element.
    #[error("text outside the root element at byte {position}")]
    TextOutsideRoot {
        /// Byte offset of the text.
        position: usize,
    },

    /// A second top-level element followed the root element.
    #[error("second root element '{name}' at byte {position}")]
    MultipleRoots {
        /// The tag name of the extra element.
        name: String,
        /// Byte offset of the tag.
        position: usize,
    },

    /// An element name uses a prefix with no namespace declaration in scope.
    #[error("undeclared namespace prefix '{prefix}' at byte {position}")]
    UnknownPrefix {
        /// The undeclared prefix.
        prefix: String,
        /// Byte offset of the tag.
        position: usize,
    },

    /// The input ended with elements still open.
    #[error("input ended with {0} unclosed element(s)")]
    Unclosed(usize),

    /// The input contains no root element.
    #[error("document has no root element")]
    NoRoot,
}

/// Errors that can occur when writing a document.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// The output could not be written.
    #[error("failed to write output")]
    Io(#[from] io::Error),

    /// The serializer rejected an event.
    #[error("failed to serialize XML")]
    Xml(#[from] quick_xml::Error),
}

/// Parses a document from a string.
///
/// # Errors
///
/// Returns an error if the input is not well-formed, uses an undeclared
/// namespace prefix, or has no root element.
pub fn parse(input: &str) -> Result<Document, ParseError> {
    let mut reader = NsReader::from_str(input);
    let mut doc = Document::new();
    let mut open = vec![doc.document_node()];

    loop {
        let position = reader.buffer_position();
        let xml_error = |source: quick_xml::Error| ParseError::Xml { position, source };

        let event = reader.read_event().map_err(xml_error)?;
        let parent = *open.last().unwrap_or(&doc.document_node());
        let at_top_level = open.len() == 1;

        match event {
            Event::Start(start) | Event::Empty(start)
                if at_top_level && doc.root_element().is_some() =>
            {
                let qname = start.name();
                let name = reader.decoder().decode(qname.as_ref()).map_err(xml_error)?;
                return Err(ParseError::MultipleRoots {
                    name: name.into_owned(),
                    position,
                });
            }
            Event::Start(start) => {
                let element = element_from(&reader, &start, position)?;
                let id = doc.create_element(element);
                doc.append(parent, id);
                open.push(id);
            }
            Event::Empty(start) => {
                let element = element_from(&reader, &start, position)?;
                let id = doc.create_element(element);
                doc.append(parent, id);
            }
            Event::End(end) => {
                if at_top_level {
                    let qname = end.name();
                    let name = reader.decoder().decode(qname.as_ref()).map_err(xml_error)?;
                    return Err(ParseError::UnexpectedEnd {
                        name: name.into_owned(),
                        position,
                    });
                }
                open.pop();
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(xml_error)?;
                append_text(&mut doc, parent, &text, at_top_level, position)?;
            }
            Event::CData(cdata) => {
                let text = reader.decoder().decode(&cdata).map_err(xml_error)?;
                append_text(&mut doc, parent, &text, at_top_level, position)?;
            }
            Event::Comment(comment) => {
                let text = reader.decoder().decode(&comment).map_err(xml_error)?;
                let id = doc.create_comment(text);
                doc.append(parent, id);
            }
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if open.len() > 1 {
        return Err(ParseError::Unclosed(open.len() - 1));
    }
    if doc.root_element().is_none() {
        return Err(ParseError::NoRoot);
    }

    Ok(doc)
}

/// Appends non-blank text under `parent`. Text is only allowed inside the
/// root element.
fn append_text(
    doc: &mut Document,
    parent: NodeId,
    text: &str,
    at_top_level: bool,
    position: usize,
) -> Result<(), ParseError> {
    if text.trim().is_empty() {
        return Ok(());
    }
    if at_top_level {
        return Err(ParseError::TextOutsideRoot { position });
    }
    let id = doc.create_text(text);
    doc.append(parent, id);
    Ok(())
}

fn element_from(
    reader: &NsReader<&[u8]>,
    start: &BytesStart,
    position: usize,
) -> Result<Element, ParseError> {
    let xml_error = |source: quick_xml::Error| ParseError::Xml { position, source };
    let decoder = reader.decoder();

    let qname = start.name();
    let name = decoder.decode(qname.as_ref()).map_err(xml_error)?;
    let namespace = match reader.resolve_element(qname) {
        (ResolveResult::Bound(Namespace(uri)), _) if !uri.is_empty() => {
            Some(decoder.decode(uri).map_err(xml_error)?.into_owned())
        }
        (ResolveResult::Bound(_) | ResolveResult::Unbound, _) => None,
        (ResolveResult::Unknown(prefix), _) => {
            return Err(ParseError::UnknownPrefix {
                prefix: String::from_utf8_lossy(&prefix).into_owned(),
                position,
            });
        }
    };

    let mut element = Element::new(name).with_namespace(namespace);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| xml_error(e.into()))?;
        let key = decoder.decode(attribute.key.as_ref()).map_err(xml_error)?;
        let value = attribute.unescape_value().map_err(xml_error)?;
        element.set_attribute(key, value);
    }

    Ok(element)
}

/// Reads and parses a document from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a well-formed
/// document.
#[instrument]
pub fn load(path: &Path) -> Result<Document, ParseError> {
    let input = std::fs::read_to_string(path)?;
    let doc = parse(&input)?;
    tracing::debug!("Parsed {} bytes from {}", input.len(), path.display());
    Ok(doc)
}

/// One step of the serialization walk.
enum Step {
    /// Write a node (and queue its children). `indent` is whether it starts
    /// on a fresh, indented line.
    Open {
        id: NodeId,
        depth: usize,
        indent: bool,
    },
    /// Write the end tag of an element whose children were already written.
    Close {
        id: NodeId,
        depth: usize,
        indent: bool,
    },
}

/// Serializes a document with an XML declaration and two-space indentation.
///
/// The tree is walked with an explicit stack, so nesting depth is bounded
/// only by memory.
///
/// # Errors
///
/// Returns an error if the sink cannot be written to.
pub fn write<W: Write>(doc: &Document, sink: W) -> Result<(), WriteError> {
    let mut writer = Writer::new(sink);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut stack: Vec<Step> = doc
        .children(doc.document_node())
        .iter()
        .rev()
        .map(|&id| Step::Open {
            id,
            depth: 0,
            indent: true,
        })
        .collect();

    while let Some(step) = stack.pop() {
        match step {
            Step::Open { id, depth, indent } => {
                if indent {
                    line_break(&mut writer, depth)?;
                }
                match doc.kind(id) {
                    NodeKind::Element(element) => {
                        let start = start_tag(element);
                        let children = doc.children(id);
                        if children.is_empty() {
                            writer.write_event(Event::Empty(start))?;
                            continue;
                        }

                        writer.write_event(Event::Start(start))?;
                        let indent_children = indent && !has_text_child(doc, id);
                        stack.push(Step::Close {
                            id,
                            depth,
                            indent: indent_children,
                        });
                        stack.extend(children.iter().rev().map(|&child| Step::Open {
                            id: child,
                            depth: depth + 1,
                            indent: indent_children,
                        }));
                    }
                    NodeKind::Text(text) => {
                        writer.write_event(Event::Text(BytesText::new(text)))?;
                    }
                    NodeKind::Comment(comment) => {
                        writer.write_event(Event::Comment(BytesText::from_escaped(
                            comment.as_str(),
                        )))?;
                    }
                    NodeKind::Document => {}
                }
            }
            Step::Close { id, depth, indent } => {
                if indent {
                    line_break(&mut writer, depth)?;
                }
                if let Some(element) = doc.element(id) {
                    writer.write_event(Event::End(BytesEnd::new(element.name())))?;
                }
            }
        }
    }

    writer.into_inner().write_all(b"\n")?;
    Ok(())
}

fn start_tag(element: &Element) -> BytesStart<'_> {
    let mut start = BytesStart::new(element.name());
    for attribute in element.attributes() {
        start.push_attribute(attribute);
    }
    start
}

fn has_text_child(doc: &Document, id: NodeId) -> bool {
    doc.children(id)
        .iter()
        .any(|&child| matches!(doc.kind(child), NodeKind::Text(_)))
}

fn line_break<W: Write>(writer: &mut Writer<W>, depth: usize) -> io::Result<()> {
    write!(writer.get_mut(), "\n{:width$}", "", width = depth * INDENT)
}

/// Serializes a document to a string.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_string(doc: &Document) -> Result<String, WriteError> {
    let mut buffer = Vec::new();
    write(doc, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| WriteError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Writes a document to a file, creating or truncating it.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
#[instrument(skip(doc))]
pub fn save(doc: &Document, path: &Path) -> Result<(), WriteError> {
    let file = File::create(path)?;
    let mut sink = BufWriter::new(file);
    write(doc, &mut sink)?;
    sink.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<TEI xmlns="http://www.tei-c.org/ns/1.0">
  <!-- collation -->
  <text>
    <ab n="B01K02V03">
      <app n="B01K02V03" from="4" to="4">
        <rdg n="a" wit="01 02">ἐν &amp;#803; <![CDATA[x]]></rdg>
        <rdg n="b" wit="03" type="om"/>
      </app>
    </ab>
  </text>
</TEI>
"#;

    #[test]
    fn parses_structure() {
        let doc = parse(SAMPLE).unwrap();
        let root = doc.root_element().unwrap();
        assert_eq!(doc.local_name(root), Some("TEI"));
        assert_eq!(
            doc.attribute(root, "xmlns"),
            Some("http://www.tei-c.org/ns/1.0")
        );

        let apps = doc.elements_named("app");
        assert_eq!(apps.len(), 1);
        assert_eq!(doc.attribute(apps[0], "from"), Some("4"));

        let rdgs = doc.elements_named("rdg");
        assert_eq!(rdgs.len(), 2);
        assert_eq!(doc.text(rdgs[0]).as_deref(), Some("ἐν &#803; x"));
        assert_eq!(doc.text(rdgs[1]), None);
    }

    #[test]
    fn resolves_namespaces() {
        let doc = parse(
            r#"<tei:TEI xmlns:tei="http://www.tei-c.org/ns/1.0" xmlns:o="urn:other">
                <tei:app/>
                <o:app/>
                <app xmlns="urn:default"><rdg/></app>
                <plain xmlns=""/>
            </tei:TEI>"#,
        )
        .unwrap();

        let namespaces: Vec<_> = doc
            .descendants(doc.document_node())
            .into_iter()
            .filter_map(|id| doc.element(id))
            .map(|element| (element.name(), element.namespace()))
            .collect();
        assert_eq!(
            namespaces,
            [
                ("tei:TEI", Some("http://www.tei-c.org/ns/1.0")),
                ("tei:app", Some("http://www.tei-c.org/ns/1.0")),
                ("o:app", Some("urn:other")),
                ("app", Some("urn:default")),
                ("rdg", Some("urn:default")),
                ("plain", None),
            ]
        );
    }

    #[test]
    fn rejects_undeclared_prefix() {
        assert!(matches!(
            parse("<TEI><x:app/></TEI>"),
            Err(ParseError::UnknownPrefix { prefix, .. }) if prefix == "x"
        ));
    }

    #[test]
    fn keeps_comments() {
        let doc = parse(SAMPLE).unwrap();
        let root = doc.root_element().unwrap();
        assert!(
            doc.children(root)
                .iter()
                .any(|&id| matches!(doc.kind(id), NodeKind::Comment(c) if c.trim() == "collation"))
        );
    }

    #[test]
    fn resolves_character_references() {
        let doc = parse("<rdg>a&#803;</rdg>").unwrap();
        let root = doc.root_element().unwrap();
        assert_eq!(doc.text(root).as_deref(), Some("a\u{0323}"));
    }

    #[test]
    fn rejects_mismatched_tags() {
        assert!(matches!(
            parse("<TEI><app></TEI>"),
            Err(ParseError::Xml { .. })
        ));
    }

    #[test]
    fn rejects_unclosed_elements() {
        assert!(parse("<TEI><app>").is_err());
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(parse(""), Err(ParseError::NoRoot)));
        assert!(matches!(parse("<!-- nothing -->"), Err(ParseError::NoRoot)));
    }

    #[test]
    fn rejects_text_outside_root() {
        assert!(matches!(
            parse("junk<TEI/>"),
            Err(ParseError::TextOutsideRoot { position: 0 })
        ));
        assert!(matches!(
            parse("<TEI/>junk"),
            Err(ParseError::TextOutsideRoot { .. })
        ));
        assert!(parse("\n<TEI/>\n  <!-- trailer -->\n").is_ok());
    }

    #[test]
    fn rejects_multiple_roots() {
        assert!(matches!(
            parse("<TEI/><TEI/>"),
            Err(ParseError::MultipleRoots { name, .. }) if name == "TEI"
        ));
        assert!(matches!(
            parse("<TEI></TEI>\n<other/>"),
            Err(ParseError::MultipleRoots { name, .. }) if name == "other"
        ));
    }

    #[test]
    fn writes_declaration_and_indentation() {
        let doc = parse(r#"<TEI a="x &amp; y"><app><rdg>a &lt; b</rdg></app><seg/></TEI>"#).unwrap();
        let output = to_string(&doc).unwrap();
        assert_eq!(
            output,
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                "\n<TEI a=\"x &amp; y\">",
                "\n  <app>",
                "\n    <rdg>a &lt; b</rdg>",
                "\n  </app>",
                "\n  <seg/>",
                "\n</TEI>\n",
            )
        );
    }

    #[test]
    fn mixed_content_is_not_indented() {
        let doc = parse(r#"<TEI><app><rdg n="a"><hi>x</hi>y<hi><b>z</b></hi></rdg></app></TEI>"#)
            .unwrap();
        let output = to_string(&doc).unwrap();
        assert!(output.contains(r#"<rdg n="a"><hi>x</hi>y<hi><b>z</b></hi></rdg>"#));

        let reparsed = parse(&output).unwrap();
        let rdg = reparsed.elements_named("rdg")[0];
        assert_eq!(reparsed.children(rdg).len(), 3);
    }

    #[test]
    fn writes_deeply_nested_documents() {
        const DEPTH: usize = 100_000;
        let input = format!("<TEI>t{}{}</TEI>", "<a>".repeat(DEPTH), "</a>".repeat(DEPTH));

        let doc = parse(&input).unwrap();
        assert_eq!(doc.elements_named("a").len(), DEPTH);

        let output = to_string(&doc).unwrap();
        assert!(output.contains(&format!("<TEI>t{}<a/>", "<a>".repeat(DEPTH - 1))));
    }

    #[test]
    fn output_parses_back_to_the_same_content() {
        let doc = parse(SAMPLE).unwrap();
        let output = to_string(&doc).unwrap();
        let reparsed = parse(&output).unwrap();
        let rdgs = reparsed.elements_named("rdg");
        assert_eq!(reparsed.text(rdgs[0]).as_deref(), Some("ἐν &#803; x"));
        assert_eq!(reparsed.attribute(rdgs[1], "type"), Some("om"));
        assert_eq!(
            reparsed.element(rdgs[1]).unwrap().namespace(),
            Some("http://www.tei-c.org/ns/1.0")
        );
    }

    #[test]
    fn save_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.xml");

        let doc = parse(SAMPLE).unwrap();
        save(&doc, &path).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.elements_named("rdg").len(), 2);
    }

    #[test]
    fn load_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let error = load(&tmp.path().join("missing.xml")).unwrap_err();
        assert!(matches!(error, ParseError::Io(_)));
    }
}
