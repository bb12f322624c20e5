//! `<controller>` conversion: skins and morphs

use anyhow::{Context, Result, bail};
use hashbrown::HashMap;
use roxmltree::Node;

use super::source::{self, child, children, input_stride, inputs, local_id, parse_list};
use crate::formats::{Artifact, encode_morph, encode_skin};
use crate::mesh::AssembledMesh;
use crate::morph::MorphTarget;
use crate::report::Reporter;
use crate::skin::{Matrix, Skin};
use assembly_common::MATRIX_FLOATS;
use assembly_common::formats::skin::IDENTITY;

/// Converted geometries by id
pub(super) type Geometries = HashMap<String, AssembledMesh>;

/// `<controller>` elements with an id
pub(super) fn controllers<'a, 'input>(
    root: Node<'a, 'input>,
) -> impl Iterator<Item = (&'a str, Node<'a, 'input>)> {
    child(root, "library_controllers")
        .into_iter()
        .flat_map(|library| children(library, "controller"))
        .filter_map(|controller| Some((controller.attribute("id")?, controller)))
}

fn geometry<'g>(geometries: &'g Geometries, reference: &str) -> Result<&'g AssembledMesh> {
    let id = local_id(reference)
        .with_context(|| format!("source {:?} is not a local geometry", reference))?;
    geometries
        .get(id)
        .with_context(|| format!("geometry {:?} was not converted", id))
}

/// Input of `parent` with the given semantic
fn input_source<'a>(parent: Node<'a, '_>, semantic: &str) -> Option<&'a str> {
    children(parent, "input")
        .find(|i| i.attribute("semantic") == Some(semantic))
        .and_then(|i| i.attribute("source"))
}

fn parse_matrix(node: Option<Node>) -> Result<Matrix> {
    let Some(node) = node else {
        return Ok(IDENTITY);
    };
    let values: Vec<f32> = parse_list(Some(node)).context("invalid bind_shape_matrix")?;
    values
        .try_into()
        .map_err(|v: Vec<f32>| anyhow::anyhow!("bind_shape_matrix has {} values, expected 16", v.len()))
}

/// Convert `<skin>`: read influences, remap them onto the welded geometry
pub(super) fn convert_skin(name: &str, skin: Node, geometries: &Geometries) -> Result<Artifact> {
    let mesh = geometry(geometries, skin.attribute("source").unwrap_or_default())?;
    let column_map = mesh.position_column_map()?;

    let joints_node = child(skin, "joints").context("skin has no <joints>")?;
    let joint_ref = input_source(joints_node, "JOINT").context("joints have no JOINT input")?;
    let joints = source::name_source(source::resolve(skin, "source", joint_ref)?)
        .context("invalid JOINT source")?;

    let inverse_binds = match input_source(joints_node, "INV_BIND_MATRIX") {
        Some(reference) => {
            let floats =
                source::float_source_sized(source::resolve(skin, "source", reference)?, MATRIX_FLOATS)
                    .context("invalid INV_BIND_MATRIX source")?;
            let matrices: Vec<Matrix> = floats
                .values
                .chunks_exact(MATRIX_FLOATS)
                .map(|m| {
                    let mut matrix = [0.0; MATRIX_FLOATS];
                    matrix.copy_from_slice(m);
                    matrix
                })
                .collect();
            Some(matrices)
        }
        None => None,
    };

    let weights_node = child(skin, "vertex_weights").context("skin has no <vertex_weights>")?;
    let weight_inputs = inputs(weights_node)?;
    let joint_input = weight_inputs
        .iter()
        .find(|i| i.semantic == "JOINT")
        .context("vertex_weights have no JOINT input")?;
    let weight_input = weight_inputs
        .iter()
        .find(|i| i.semantic == "WEIGHT")
        .context("vertex_weights have no WEIGHT input")?;
    if joint_input.source != joint_ref {
        bail!("vertex_weights JOINT input does not use the joints source");
    }
    let weights = source::float_source_sized(source::resolve(skin, "source", &weight_input.source)?, 1)
        .context("invalid WEIGHT source")?
        .values;

    let count: usize = source::attribute(weights_node, "count")?;
    let counts: Vec<u32> = parse_list(child(weights_node, "vcount")).context("invalid <vcount>")?;
    if counts.len() != count {
        bail!("vertex_weights declare {} vertices but have {} vcounts", count, counts.len());
    }
    let v: Vec<i64> = parse_list(child(weights_node, "v")).context("invalid <v>")?;
    let stride = input_stride(&weight_inputs)?;
    let influences = counts
        .iter()
        .try_fold(0usize, |total, &c| total.checked_add(c as usize))
        .context("vertex_weights <vcount> total is out of range")?;
    if influences.checked_mul(stride) != Some(v.len()) {
        bail!(
            "vertex_weights <v> has {} values for {} influences of stride {}",
            v.len(),
            influences,
            stride
        );
    }

    let mut joint_indices = Vec::with_capacity(influences);
    let mut weight_indices = Vec::with_capacity(influences);
    for influence in v.chunks_exact(stride) {
        let joint = influence[joint_input.offset];
        let weight = influence[weight_input.offset];
        let (Ok(joint), Ok(weight)) = (u32::try_from(joint), u32::try_from(weight)) else {
            bail!("negative influence index (joint {}, weight {})", joint, weight);
        };
        joint_indices.push(joint);
        weight_indices.push(weight);
    }

    let authored = Skin {
        name: name.to_string(),
        bind_shape: parse_matrix(child(skin, "bind_shape_matrix"))?,
        joints,
        inverse_binds,
        counts,
        joint_indices,
        weight_indices,
        weights,
    };
    let skin = authored.remap(&column_map)?;
    Ok(encode_skin(&skin)?)
}

/// Convert `<morph>`: one artifact per target, named `<controller>.<target>`
///
/// A missing target is reported and the remaining targets still convert.
pub(super) fn convert_morph(
    name: &str,
    morph: Node,
    geometries: &Geometries,
    reporter: &dyn Reporter,
) -> Result<Vec<Artifact>> {
    let base = geometry(geometries, morph.attribute("source").unwrap_or_default())?;
    let delta = morph.attribute("method").unwrap_or("NORMALIZED") != "RELATIVE";

    let targets_node = child(morph, "targets").context("morph has no <targets>")?;
    let target_ref = input_source(targets_node, "MORPH_TARGET").context("targets have no MORPH_TARGET input")?;
    let weight_ref = input_source(targets_node, "MORPH_WEIGHT").context("targets have no MORPH_WEIGHT input")?;
    let targets = source::name_source(source::resolve(morph, "source", target_ref)?)
        .context("invalid MORPH_TARGET source")?;
    let weights = source::float_source_sized(source::resolve(morph, "source", weight_ref)?, 1)
        .context("invalid MORPH_WEIGHT source")?
        .values;
    if weights.len() != targets.len() {
        bail!("morph has {} targets but {} weights", targets.len(), weights.len());
    }

    let mut artifacts = Vec::with_capacity(targets.len());
    for (target_id, &weight) in targets.iter().zip(&weights) {
        let qualified = format!("{}.{}", name, target_id);
        let Some(target) = geometries.get(target_id.as_str()) else {
            reporter.warn(
                &qualified,
                &format!("target geometry {:?} was not converted", target_id),
            );
            continue;
        };
        let built = MorphTarget::build(qualified, base, target, weight, delta);
        artifacts.push(encode_morph(&built));
    }
    Ok(artifacts)
}
