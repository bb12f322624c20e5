//! Morph artifact header (`N.morph.xml`)
//!
//! # Layout
//! ```text
//! <Morph source="base" target="smile" weight="0.5" delta="true">
//!     <Vertices count="V" attributes="A">
//!         <Attribute name="POSITION" size="3" type="FLOAT" />
//!     </Vertices>
//! </Morph>
//! ```
//!
//! Data: each attribute as `f32[V * size]` in declared order.

use std::fmt::Write;

use super::header::{self, escape, indent};
use super::{AttributeDecl, FormatError, HeaderText};

/// Morph artifact header
#[derive(Debug, Clone, PartialEq)]
pub struct MorphHeader {
    /// Base geometry name
    pub source: String,
    /// Target geometry name
    pub target: String,
    pub weight: f32,
    /// `true` when values are `weight * target - base`
    pub delta: bool,
    pub vertex_count: usize,
    pub attributes: Vec<AttributeDecl>,
}

impl HeaderText for MorphHeader {
    const ROOT: &'static str = "Morph";

    fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "<Morph source=\"{}\" target=\"{}\" weight=\"{}\" delta=\"{}\">",
            escape(&self.source),
            escape(&self.target),
            self.weight,
            self.delta
        );

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

        out.push_str("</Morph>\n");
        out
    }

    fn parse(text: &str) -> Result<Self, FormatError> {
        let doc = roxmltree::Document::parse(text)?;
        let root = header::root(&doc, Self::ROOT)?;

        let source = header::required(root, "Morph", "source")?.to_string();
        let target = header::required(root, "Morph", "target")?.to_string();
        let weight = header::attr(root, "Morph", "weight")?;
        let delta = header::attr(root, "Morph", "delta")?;

        let vertices = header::child(root, "Morph", "Vertices")?;
        let vertex_count = header::attr(vertices, "Vertices", "count")?;
        let declared: usize = header::attr(vertices, "Vertices", "attributes")?;
        let attributes = header::attributes(vertices)?;
        header::check_count("Vertices", declared, attributes.len())?;

        let parsed = Self {
            source,
            target,
            weight,
            delta,
            vertex_count,
            attributes,
        };
        if parsed.checked_data_size().is_none() {
            return Err(FormatError::SizeOverflow { element: Self::ROOT });
        }
        Ok(parsed)
    }

    fn checked_data_size(&self) -> Option<usize> {
        self.attributes.iter().try_fold(0usize, |total, a| {
            let block = self
                .vertex_count
                .checked_mul(a.size)?
                .checked_mul(a.component_bytes())?;
            total.checked_add(block)
        })
    }
}
