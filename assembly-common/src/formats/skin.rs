//! Skin artifact header (`N.skin.xml`)
//!
//! # Layout
//! ```text
//! <Skin>
//!     <BindShape>1 0 0 0 0 1 0 0 0 0 1 0 0 0 0 1</BindShape>
//!     <Joints count="J" binding="true">
//!         <Joint name="hip" />
//!     </Joints>
//!     <Influences count="V" type="UNSIGNED_BYTE" />
//!     <Vertices count="I">
//!         <Attribute name="WEIGHT" size="1" type="FLOAT" />
//!         <Attribute name="JOINT" size="1" type="UNSIGNED_BYTE" />
//!     </Vertices>
//! </Skin>
//! ```
//!
//! Data, no padding:
//! 1. `f32[J * 16]` inverse bind matrices, only when `binding="true"`
//! 2. `counts[V]` at the influence count width
//! 3. `f32[I]` weights
//! 4. `joints[I]` at the joint width

use std::fmt::Write;

use super::header::{self, escape, indent};
use super::{AttributeDecl, FormatError, HeaderText, IndexWidth, FLOAT_SIZE, MATRIX_FLOATS};

/// Name of the per-influence weight attribute
pub const WEIGHT: &str = "WEIGHT";
/// Name of the per-influence joint attribute
pub const JOINT: &str = "JOINT";

/// 4×4 identity, row-major
pub const IDENTITY: [f32; MATRIX_FLOATS] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Skin artifact header
#[derive(Debug, Clone, PartialEq)]
pub struct SkinHeader {
    /// Bind shape matrix, row-major as authored
    pub bind_shape: [f32; MATRIX_FLOATS],
    pub joints: Vec<String>,
    /// Whether inverse bind matrices lead the data buffer
    pub binding: bool,
    /// Dense vertex count (length of the counts array)
    pub vertex_count: usize,
    pub count_width: IndexWidth,
    /// Total influences across all vertices
    pub influence_count: usize,
    pub joint_width: IndexWidth,
}

impl SkinHeader {
    fn checked_binding_bytes(&self) -> Option<usize> {
        if self.binding {
            self.joints.len().checked_mul(MATRIX_FLOATS * FLOAT_SIZE)
        } else {
            Some(0)
        }
    }

    fn checked_count_bytes(&self) -> Option<usize> {
        self.vertex_count.checked_mul(self.count_width.bytes())
    }

    fn checked_influence_bytes(&self) -> Option<usize> {
        self.influence_count
            .checked_mul(FLOAT_SIZE + self.joint_width.bytes())
    }

    /// Size of the inverse bind matrix block in bytes
    pub fn binding_bytes(&self) -> usize {
        self.checked_binding_bytes().unwrap_or(usize::MAX)
    }

    /// Size of the influence count block in bytes
    pub fn count_bytes(&self) -> usize {
        self.checked_count_bytes().unwrap_or(usize::MAX)
    }

    /// Size of the weight and joint blocks in bytes
    pub fn influence_bytes(&self) -> usize {
        self.checked_influence_bytes().unwrap_or(usize::MAX)
    }

    /// Per-influence attributes as declared under `<Vertices>`
    pub fn attributes(&self) -> [AttributeDecl; 2] {
        [
            AttributeDecl::float(WEIGHT, 1),
            AttributeDecl::index(JOINT, 1, self.joint_width),
        ]
    }
}

fn parse_matrix(text: &str) -> Result<[f32; MATRIX_FLOATS], FormatError> {
    let invalid = || FormatError::InvalidAttribute {
        element: "BindShape",
        attribute: "text",
        value: text.to_string(),
    };
    let values = text
        .split_whitespace()
        .map(|v| v.parse::<f32>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;
    values.try_into().map_err(|_| invalid())
}

impl HeaderText for SkinHeader {
    const ROOT: &'static str = "Skin";

    fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("<Skin>\n");

        indent(&mut out, 1);
        let matrix: Vec<String> = self.bind_shape.iter().map(f32::to_string).collect();
        let _ = writeln!(out, "<BindShape>{}</BindShape>", matrix.join(" "));

        indent(&mut out, 1);
        let _ = writeln!(
            out,
            "<Joints count=\"{}\" binding=\"{}\">",
            self.joints.len(),
            self.binding
        );
        for joint in &self.joints {
            indent(&mut out, 2);
            let _ = writeln!(out, "<Joint name=\"{}\" />", escape(joint));
        }
        indent(&mut out, 1);
        out.push_str("</Joints>\n");

        indent(&mut out, 1);
        let _ = writeln!(
            out,
            "<Influences count=\"{}\" type=\"{}\" />",
            self.vertex_count, self.count_width
        );

        indent(&mut out, 1);
        let _ = writeln!(out, "<Vertices count=\"{}\">", self.influence_count);
        for attribute in &self.attributes() {
            attribute.write(&mut out, 2);
        }
        indent(&mut out, 1);
        out.push_str("</Vertices>\n");

        out.push_str("</Skin>\n");
        out
    }

    fn parse(text: &str) -> Result<Self, FormatError> {
        let doc = roxmltree::Document::parse(text)?;
        let root = header::root(&doc, Self::ROOT)?;

        let bind_shape = match header::children(root, "BindShape").next() {
            Some(node) => parse_matrix(node.text().unwrap_or_default())?,
            None => IDENTITY,
        };

        let joints_node = header::child(root, "Skin", "Joints")?;
        let declared: usize = header::attr(joints_node, "Joints", "count")?;
        let binding = header::attr(joints_node, "Joints", "binding")?;
        let joints = header::children(joints_node, "Joint")
            .map(|node| header::required(node, "Joint", "name").map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?;
        header::check_count("Joints", declared, joints.len())?;

        let influences = header::child(root, "Skin", "Influences")?;
        let vertex_count = header::attr(influences, "Influences", "count")?;
        let count_width = header::attr(influences, "Influences", "type")?;

        let vertices = header::child(root, "Skin", "Vertices")?;
        let influence_count = header::attr(vertices, "Vertices", "count")?;
        let attributes = header::attributes(vertices)?;
        let joint_width = attributes
            .iter()
            .find(|a| a.name == JOINT)
            .and_then(|a| a.index)
            .ok_or(FormatError::MissingElement {
                parent: "Vertices",
                element: "Attribute",
            })?;
        if !attributes.iter().any(|a| a.name == WEIGHT && a.index.is_none()) {
            return Err(FormatError::MissingElement {
                parent: "Vertices",
                element: "Attribute",
            });
        }

        let parsed = Self {
            bind_shape,
            joints,
            binding,
            vertex_count,
            count_width,
            influence_count,
            joint_width,
        };
        if parsed.checked_data_size().is_none() {
            return Err(FormatError::SizeOverflow { element: Self::ROOT });
        }
        Ok(parsed)
    }

    fn checked_data_size(&self) -> Option<usize> {
        self.checked_binding_bytes()?
            .checked_add(self.checked_count_bytes()?)?
            .checked_add(self.checked_influence_bytes()?)
    }
}
