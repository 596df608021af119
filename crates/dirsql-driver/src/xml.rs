//! XML field extraction.
//!
//! Given a document, a [`FieldExtractor`] returns its field paths in order
//! of first appearance, each with the first text value found there. The
//! driver treats extraction as a collaborator: the default implementation
//! walks the element tree with `roxmltree`, but anything implementing the
//! trait can be plugged into the [`Driver`](crate::Driver).

use std::collections::HashSet;

use crate::error::{DriverError, DriverResult};

/// One field of a structured document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlField {
    /// `/`-joined element names from the document element; attributes end in `@name`.
    pub path: String,
    /// First non-blank text at this path.
    pub text: Option<String>,
}

/// Turns a document into an ordered list of fields.
pub trait FieldExtractor: Send + Sync {
    fn extract(&self, document: &[u8]) -> DriverResult<Vec<XmlField>>;

    /// Field paths only.
    fn field_paths(&self, document: &[u8]) -> DriverResult<Vec<String>> {
        Ok(self.extract(document)?.into_iter().map(|f| f.path).collect())
    }
}

/// Element-path extractor backed by `roxmltree`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementPathExtractor;

impl FieldExtractor for ElementPathExtractor {
    fn extract(&self, document: &[u8]) -> DriverResult<Vec<XmlField>> {
        let text = String::from_utf8_lossy(document);
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        };
        let doc = roxmltree::Document::parse_with_options(&text, options)
            .map_err(|e| DriverError::malformed(format!("not a well-formed document: {}", e)))?;

        let mut fields = Vec::new();
        let mut seen = HashSet::new();
        walk(doc.root_element(), "", &mut fields, &mut seen);
        Ok(fields)
    }
}

fn walk(
    node: roxmltree::Node<'_, '_>,
    prefix: &str,
    fields: &mut Vec<XmlField>,
    seen: &mut HashSet<String>,
) {
    let path = if prefix.is_empty() {
        node.tag_name().name().to_string()
    } else {
        format!("{}/{}", prefix, node.tag_name().name())
    };

    let text = node
        .children()
        .filter(|c| c.is_text())
        .filter_map(|c| c.text())
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_string);
    record(fields, seen, &path, text);

    for attr in node.attributes() {
        let attr_path = format!("{}/@{}", path, attr.name());
        record(fields, seen, &attr_path, Some(attr.value().to_string()));
    }

    for child in node.children().filter(|c| c.is_element()) {
        walk(child, &path, fields, seen);
    }
}

fn record(
    fields: &mut Vec<XmlField>,
    seen: &mut HashSet<String>,
    path: &str,
    text: Option<String>,
) {
    if seen.insert(path.to_string()) {
        fields.push(XmlField {
            path: path.to_string(),
            text,
        });
    } else if let Some(text) = text {
        // A later occurrence fills a field whose first occurrence was blank.
        if let Some(field) = fields.iter_mut().find(|f| f.path == path && f.text.is_none()) {
            field.text = Some(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"<?xml version="1.0"?>
<catalog>
  <book id="b1">
    <title>Dune</title>
    <author>Herbert</author>
  </book>
  <book id="b2">
    <title>Emma</title>
    <price>7</price>
  </book>
</catalog>"#;

    #[test]
    fn test_paths_in_first_appearance_order() {
        let paths = ElementPathExtractor.field_paths(CATALOG.as_bytes()).unwrap();
        assert_eq!(
            paths,
            vec![
                "catalog",
                "catalog/book",
                "catalog/book/@id",
                "catalog/book/title",
                "catalog/book/author",
                "catalog/book/price",
            ]
        );
    }

    #[test]
    fn test_first_text_wins() {
        let fields = ElementPathExtractor.extract(CATALOG.as_bytes()).unwrap();
        let get = |p: &str| fields.iter().find(|f| f.path == p).unwrap().text.clone();
        assert_eq!(get("catalog/book/title").as_deref(), Some("Dune"));
        assert_eq!(get("catalog/book/@id").as_deref(), Some("b1"));
        assert_eq!(get("catalog/book/price").as_deref(), Some("7"));
        assert_eq!(get("catalog"), None);
    }

    #[test]
    fn test_malformed_document() {
        let err = ElementPathExtractor.extract(b"<open>").unwrap_err();
        assert!(matches!(err, DriverError::MalformedQuery(_)));
    }
}
