//! Mesh artifact header (`N.mesh.xml`)
//!
//! # Layout
//! ```text
//! <Mesh>
//!     <Vertices count="V" attributes="A">
//!         <Attribute name="POSITION" size="3" type="FLOAT" />
//!     </Vertices>
//!     <Triangles type="UNSIGNED_BYTE" groups="G">
//!         <Group name="material" count="T" />
//!     </Triangles>
//! </Mesh>
//! ```
//!
//! Data: each attribute as `f32[V * size]` in declared order, then each
//! group's `3 * T` indices at the triangle index width, in declared order.

use std::fmt::Write;

use super::header::{self, indent, escape};
use super::{AttributeDecl, FormatError, HeaderText, IndexWidth};

/// One triangle group: `<Group name count />`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDecl {
    /// Material name
    pub name: String,
    /// Number of triangles
    pub count: usize,
}

impl GroupDecl {
    pub fn new(name: impl Into<String>, count: usize) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// Mesh artifact header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshHeader {
    pub vertex_count: usize,
    pub attributes: Vec<AttributeDecl>,
    pub index_width: IndexWidth,
    pub groups: Vec<GroupDecl>,
}

impl MeshHeader {
    /// Header for `vertex_count` dense vertices; the index width follows from it
    pub fn new(vertex_count: usize, attributes: Vec<AttributeDecl>, groups: Vec<GroupDecl>) -> Self {
        Self {
            vertex_count,
            attributes,
            index_width: IndexWidth::for_count(vertex_count),
            groups,
        }
    }

    /// Total triangles across all groups
    pub fn triangle_count(&self) -> usize {
        self.groups
            .iter()
            .fold(0usize, |total, g| total.saturating_add(g.count))
    }

    fn block_bytes(&self, attribute: &AttributeDecl) -> Option<usize> {
        self.vertex_count
            .checked_mul(attribute.size)?
            .checked_mul(attribute.component_bytes())
    }

    fn checked_attribute_bytes(&self) -> Option<usize> {
        self.attributes
            .iter()
            .try_fold(0usize, |total, a| total.checked_add(self.block_bytes(a)?))
    }

    fn checked_index_bytes(&self) -> Option<usize> {
        self.groups
            .iter()
            .try_fold(0usize, |total, g| total.checked_add(g.count))?
            .checked_mul(3)?
            .checked_mul(self.index_width.bytes())
    }

    /// Size of the attribute block in bytes
    pub fn attribute_bytes(&self) -> usize {
        self.checked_attribute_bytes().unwrap_or(usize::MAX)
    }

    /// Size of the index block in bytes
    pub fn index_bytes(&self) -> usize {
        self.checked_index_bytes().unwrap_or(usize::MAX)
    }

    /// Byte offset of each attribute block within the data buffer
    pub fn attribute_offsets(&self) -> Vec<usize> {
        let mut offset = 0usize;
        self.attributes
            .iter()
            .map(|a| {
                let start = offset;
                offset = offset.saturating_add(self.block_bytes(a).unwrap_or(usize::MAX));
                start
            })
            .collect()
    }
}

impl HeaderText for MeshHeader {
    const ROOT: &'static str = "Mesh";

    fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("<Mesh>\n");

        indent(&mut out, 1);
        let _ = writeln!(
            out,
            "<Vertices count=\"{}\" attributes=\"{}\">",
            self.vertex_count,
            self.attributes.len()
        );
        for attribute in &self.attributes {
            attribute.write(&mut out, 2);
        }
        indent(&mut out, 1);
        out.push_str("</Vertices>\n");

        indent(&mut out, 1);
        let _ = writeln!(
            out,
            "<Triangles type=\"{}\" groups=\"{}\">",
            self.index_width,
            self.groups.len()
        );
        for group in &self.groups {
            indent(&mut out, 2);
            let _ = writeln!(
                out,
                "<Group name=\"{}\" count=\"{}\" />",
                escape(&group.name),
                group.count
            );
        }
        indent(&mut out, 1);
        out.push_str("</Triangles>\n");

        out.push_str("</Mesh>\n");
        out
    }

    fn parse(text: &str) -> Result<Self, FormatError> {
        let doc = roxmltree::Document::parse(text)?;
        let root = header::root(&doc, Self::ROOT)?;

        let vertices = header::child(root, "Mesh", "Vertices")?;
        let vertex_count = header::attr(vertices, "Vertices", "count")?;
        let declared: usize = header::attr(vertices, "Vertices", "attributes")?;
        let attributes = header::attributes(vertices)?;
        header::check_count("Vertices", declared, attributes.len())?;

        let triangles = header::child(root, "Mesh", "Triangles")?;
        let index_width = header::attr(triangles, "Triangles", "type")?;
        let declared: usize = header::attr(triangles, "Triangles", "groups")?;
        let groups = header::children(triangles, "Group")
            .map(|node| {
                Ok(GroupDecl {
                    name: header::required(node, "Group", "name")?.to_string(),
                    count: header::attr(node, "Group", "count")?,
                })
            })
            .collect::<Result<Vec<_>, FormatError>>()?;
        header::check_count("Triangles", declared, groups.len())?;

        let parsed = Self {
            vertex_count,
            attributes,
            index_width,
            groups,
        };
        if parsed.checked_data_size().is_none() {
            return Err(FormatError::SizeOverflow { element: Self::ROOT });
        }
        Ok(parsed)
    }

    fn checked_data_size(&self) -> Option<usize> {
        self.checked_attribute_bytes()?
            .checked_add(self.checked_index_bytes()?)
    }
}
