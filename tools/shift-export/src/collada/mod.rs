//! COLLADA conversion (.dae -> mesh, skin and morph artifacts)
//!
//! Reads `library_geometries` and `library_controllers`. Scene graphs are
//! not walked. Every geometry or controller that cannot be converted is
//! reported and skipped, so one bad mesh does not abort the document.

mod controller;
mod geometry;
mod source;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::formats::{Artifact, encode_mesh};
use crate::report::Reporter;
use crate::sink::Sink;
use controller::Geometries;

/// COLLADA conversion options
#[derive(Debug, Clone, Copy)]
pub struct DaeOptions {
    /// Convert `<skin>` controllers
    pub skins: bool,
    /// Convert `<morph>` controllers
    pub morphs: bool,
}

impl Default for DaeOptions {
    fn default() -> Self {
        Self {
            skins: true,
            morphs: true,
        }
    }
}

/// Convert a COLLADA document to artifacts in document order
///
/// Malformed XML or a non-COLLADA root is an error; everything else is
/// reported per geometry or controller.
pub fn parse_collada(
    text: &str,
    options: DaeOptions,
    reporter: &dyn Reporter,
) -> Result<Vec<Artifact>> {
    let doc = roxmltree::Document::parse(text).context("Failed to parse COLLADA XML")?;
    let root = doc.root_element();
    if root.tag_name().name() != "COLLADA" {
        bail!("expected <COLLADA> root, found <{}>", root.tag_name().name());
    }

    let mut artifacts = Vec::new();
    let mut geometries = Geometries::new();

    for (id, mesh) in geometry::geometries(root) {
        match geometry::assemble(id, mesh, reporter) {
            Ok(assembled) if assembled.triangle_count() == 0 => {
                reporter.warn(id, "mesh has no triangles");
            }
            Ok(assembled) => {
                artifacts.push(encode_mesh(&assembled));
                geometries.insert(id.to_string(), assembled);
            }
            Err(e) => reporter.warn(id, &format!("{:#}", e)),
        }
    }

    for (id, node) in controller::controllers(root) {
        if let Some(skin) = source::child(node, "skin") {
            if !options.skins {
                tracing::debug!(controller = id, "skins disabled");
                continue;
            }
            match controller::convert_skin(id, skin, &geometries) {
                Ok(artifact) => artifacts.push(artifact),
                Err(e) => reporter.warn(id, &format!("{:#}", e)),
            }
        } else if let Some(morph) = source::child(node, "morph") {
            if !options.morphs {
                tracing::debug!(controller = id, "morphs disabled");
                continue;
            }
            match controller::convert_morph(id, morph, &geometries, reporter) {
                Ok(morphs) => artifacts.extend(morphs),
                Err(e) => reporter.warn(id, &format!("{:#}", e)),
            }
        }
    }

    Ok(artifacts)
}

/// Convert a COLLADA file to in-memory artifacts
pub fn convert_collada_to_memory(
    input: &Path,
    options: DaeOptions,
    reporter: &dyn Reporter,
) -> Result<Vec<Artifact>> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to open COLLADA: {:?}", input))?;
    parse_collada(&text, options, reporter)
        .with_context(|| format!("Failed to convert COLLADA: {:?}", input))
}

/// Convert a COLLADA file and emit its artifacts; returns the number emitted
pub fn convert_collada(
    input: &Path,
    sink: &mut dyn Sink,
    options: DaeOptions,
    reporter: &dyn Reporter,
) -> Result<usize> {
    let artifacts = convert_collada_to_memory(input, options, reporter)?;
    for artifact in &artifacts {
        artifact.emit(sink)?;
    }
    tracing::info!(
        "Converted COLLADA {:?}: {} artifact(s)",
        input,
        artifacts.len()
    );
    Ok(artifacts.len())
}
