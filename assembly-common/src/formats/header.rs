//! Shared header model and text helpers
//!
//! Headers are small XML elements. They are rendered with tab indentation,
//! one element per line, and parsed back with `roxmltree`.

use std::fmt::Write;
use std::str::FromStr;

use roxmltree::Node;

use super::IndexWidth;

/// Component type name of float attributes
pub const FLOAT_TYPE: &str = "FLOAT";

/// Error parsing an artifact header
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// Header text is not well-formed XML
    #[error("malformed header: {0}")]
    Xml(#[from] roxmltree::Error),

    /// Root element has the wrong name
    #[error("expected <{expected}> root element, found <{found}>")]
    UnexpectedRoot { expected: &'static str, found: String },

    /// Required child element is absent
    #[error("<{parent}> has no <{element}> element")]
    MissingElement {
        parent: &'static str,
        element: &'static str,
    },

    /// Required attribute is absent
    #[error("<{element}> is missing attribute `{attribute}`")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// Attribute value does not parse
    #[error("<{element}> attribute `{attribute}` has invalid value {value:?}")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },

    /// Unknown component/index type name
    #[error("unknown component type {0:?}")]
    UnknownType(String),

    /// Declared counts describe more bytes than a buffer can hold
    #[error("<{element}> counts overflow the data size")]
    SizeOverflow { element: &'static str },

    /// Artifact name cannot be used as a single file name
    #[error("artifact name {name:?} {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// Declared child count disagrees with the children present
    #[error("<{element}> declares {declared} entries but contains {found}")]
    CountMismatch {
        element: &'static str,
        declared: usize,
        found: usize,
    },
}

/// Trait for textual artifact headers
///
/// Every header knows how many data bytes follow it, so a reader can
/// validate the buffer before slicing it.
pub trait HeaderText: Sized {
    /// Name of the root element
    const ROOT: &'static str;

    /// Render the header text
    fn to_text(&self) -> String;

    /// Parse header text
    fn parse(text: &str) -> Result<Self, FormatError>;

    /// Size of the data buffer, `None` when the declared counts overflow
    fn checked_data_size(&self) -> Option<usize>;

    /// Size of the data buffer described by this header
    ///
    /// Saturates at `usize::MAX`, which no buffer matches. Parsed headers
    /// never saturate: [`parse`](Self::parse) rejects overflowing counts.
    fn data_size(&self) -> usize {
        self.checked_data_size().unwrap_or(usize::MAX)
    }
}

/// One declared per-vertex attribute: `<Attribute name size type />`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDecl {
    pub name: String,
    /// Components per vertex (1-4 for float attributes)
    pub size: usize,
    /// `None` for FLOAT, otherwise the index width of an integer attribute
    pub index: Option<IndexWidth>,
}

impl AttributeDecl {
    pub fn float(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
            index: None,
        }
    }

    pub fn index(name: impl Into<String>, size: usize, width: IndexWidth) -> Self {
        Self {
            name: name.into(),
            size,
            index: Some(width),
        }
    }

    /// Type name as written in the header
    pub fn type_name(&self) -> &'static str {
        self.index.map_or(FLOAT_TYPE, IndexWidth::as_str)
    }

    /// Bytes of one component
    pub fn component_bytes(&self) -> usize {
        self.index.map_or(super::FLOAT_SIZE, IndexWidth::bytes)
    }

    pub(crate) fn write(&self, out: &mut String, depth: usize) {
        indent(out, depth);
        let _ = writeln!(
            out,
            "<Attribute name=\"{}\" size=\"{}\" type=\"{}\" />",
            escape(&self.name),
            self.size,
            self.type_name()
        );
    }

    pub(crate) fn from_node(node: Node) -> Result<Self, FormatError> {
        let name = required(node, "Attribute", "name")?.to_string();
        let size = attr(node, "Attribute", "size")?;
        let ty = required(node, "Attribute", "type")?;
        let index = if ty == FLOAT_TYPE {
            None
        } else {
            Some(ty.parse::<IndexWidth>()?)
        };
        Ok(Self { name, size, index })
    }
}

pub(crate) fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}

/// Escape a value for use inside a double-quoted XML attribute
pub(crate) fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Check the root element name
pub(crate) fn root<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
    expected: &'static str,
) -> Result<Node<'a, 'input>, FormatError> {
    let root = doc.root_element();
    if root.tag_name().name() != expected {
        return Err(FormatError::UnexpectedRoot {
            expected,
            found: root.tag_name().name().to_string(),
        });
    }
    Ok(root)
}

/// Element children of `node` named `name`
pub(crate) fn children<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

/// First element child named `element`
pub(crate) fn child<'a, 'input>(
    node: Node<'a, 'input>,
    parent: &'static str,
    element: &'static str,
) -> Result<Node<'a, 'input>, FormatError> {
    children(node, element)
        .next()
        .ok_or(FormatError::MissingElement { parent, element })
}

pub(crate) fn required<'a>(
    node: Node<'a, '_>,
    element: &'static str,
    attribute: &'static str,
) -> Result<&'a str, FormatError> {
    node.attribute(attribute)
        .ok_or(FormatError::MissingAttribute { element, attribute })
}

pub(crate) fn attr<T: FromStr>(
    node: Node,
    element: &'static str,
    attribute: &'static str,
) -> Result<T, FormatError> {
    let value = required(node, element, attribute)?;
    value
        .trim()
        .parse()
        .map_err(|_| FormatError::InvalidAttribute {
            element,
            attribute,
            value: value.to_string(),
        })
}

/// Parse the `<Attribute>` children of a `<Vertices>` element
pub(crate) fn attributes(vertices: Node) -> Result<Vec<AttributeDecl>, FormatError> {
    children(vertices, "Attribute")
        .map(AttributeDecl::from_node)
        .collect()
}

pub(crate) fn check_count(
    element: &'static str,
    declared: usize,
    found: usize,
) -> Result<(), FormatError> {
    if declared != found {
        return Err(FormatError::CountMismatch {
            element,
            declared,
            found,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a&b<\"c\">"), "a&amp;b&lt;&quot;c&quot;&gt;");
    }

    #[test]
    fn test_attribute_decl_text() {
        let mut out = String::new();
        AttributeDecl::float("NORMAL", 3).write(&mut out, 2);
        assert_eq!(out, "\t\t<Attribute name=\"NORMAL\" size=\"3\" type=\"FLOAT\" />\n");

        let mut out = String::new();
        AttributeDecl::index("JOINT", 1, IndexWidth::Short).write(&mut out, 0);
        assert_eq!(out, "<Attribute name=\"JOINT\" size=\"1\" type=\"UNSIGNED_SHORT\" />\n");
    }

    #[test]
    fn test_attribute_decl_component_bytes() {
        assert_eq!(AttributeDecl::float("WEIGHT", 1).component_bytes(), 4);
        assert_eq!(
            AttributeDecl::index("JOINT", 1, IndexWidth::Byte).component_bytes(),
            1
        );
    }
}
