//! `<geometry>/<mesh>` assembly

use anyhow::{Context, Result, bail};
use hashbrown::HashSet;
use roxmltree::Node;

use super::source::{self, Input, child, children, inputs, input_stride, parse_list};
use crate::mesh::{AssembledMesh, MeshAssembler};
use crate::report::Reporter;

const UNSUPPORTED_PRIMITIVES: [&str; 5] = ["lines", "linestrips", "tristrips", "trifans", "polygons"];

/// Group name of primitive blocks without a `material`
const DEFAULT_MATERIAL: &str = "default";

fn is_primitive_block(node: &Node) -> bool {
    node.is_element() && matches!(node.tag_name().name(), "triangles" | "polylist")
}

/// Assemble one `<mesh>` named after its geometry id
///
/// Unsupported content fails the whole mesh; an unreadable attribute source
/// only drops that attribute.
pub(super) fn assemble(name: &str, mesh: Node, reporter: &dyn Reporter) -> Result<AssembledMesh> {
    if let Some(unsupported) = mesh
        .children()
        .find(|n| n.is_element() && UNSUPPORTED_PRIMITIVES.contains(&n.tag_name().name()))
    {
        bail!(
            "<{}> primitives are not supported",
            unsupported.tag_name().name()
        );
    }

    let mut asm = MeshAssembler::new(name);
    let mut shared: Option<Vec<Input>> = None;

    for block in mesh.children().filter(is_primitive_block) {
        let block_inputs = inputs(block)?;
        match &shared {
            Some(first) if *first != block_inputs => {
                bail!("primitive blocks declare different inputs")
            }
            Some(_) => {}
            None => shared = Some(block_inputs.clone()),
        }

        let stride = input_stride(&block_inputs)?;
        let material = block.attribute("material").unwrap_or(DEFAULT_MATERIAL);
        let count: usize = source::attribute(block, "count")?;
        let raw: Vec<i32> = parse_list(child(block, "p")).context("invalid <p>")?;

        if block.tag_name().name() == "triangles" {
            asm.add_triangles(material, &raw, count, stride)?;
        } else {
            let vcounts: Vec<u32> = parse_list(child(block, "vcount")).context("invalid <vcount>")?;
            if vcounts.len() != count {
                bail!("polylist declares {} polygons but has {} vcounts", count, vcounts.len());
            }
            asm.add_polylist(material, &raw, &vcounts, stride)?;
        }
    }

    let Some(shared) = shared else {
        bail!("mesh has no triangles or polylist");
    };

    let mut offsets = HashSet::new();
    for input in &shared {
        if input.semantic == "VERTEX" {
            let vertices = source::resolve(mesh, "vertices", &input.source)?;
            for vertex_input in inputs(vertices)? {
                let expanded = Input {
                    offset: input.offset,
                    set: input.set,
                    ..vertex_input
                };
                if offsets.insert(expanded.offset) {
                    add_source(&mut asm, mesh, &expanded, reporter);
                }
            }
        } else if offsets.insert(input.offset) {
            add_source(&mut asm, mesh, input, reporter);
        }
    }

    Ok(asm.finish()?)
}

/// Attribute name of an input: semantic, suffixed by a non-zero set
fn attribute_name(input: &Input) -> String {
    if input.set == 0 {
        input.semantic.clone()
    } else {
        format!("{}{}", input.semantic, input.set)
    }
}

fn add_source(asm: &mut MeshAssembler, mesh: Node, input: &Input, reporter: &dyn Reporter) {
    let name = attribute_name(input);
    let result = source::resolve(mesh, "source", &input.source)
        .and_then(source::float_source)
        .and_then(|floats| {
            asm.add_attribute(
                name.clone(),
                floats.values,
                floats.count,
                floats.dimension,
                input.offset,
            )
            .map_err(anyhow::Error::from)
        });
    if let Err(e) = result {
        reporter.warn(asm.name(), &format!("skipping attribute {}: {:#}", name, e));
    }
}

/// All `<geometry>` elements with an id and a `<mesh>`
pub(super) fn geometries<'a, 'input>(
    root: Node<'a, 'input>,
) -> impl Iterator<Item = (&'a str, Node<'a, 'input>)> {
    child(root, "library_geometries")
        .into_iter()
        .flat_map(|library| children(library, "geometry"))
        .filter_map(|geometry| Some((geometry.attribute("id")?, child(geometry, "mesh")?)))
}
