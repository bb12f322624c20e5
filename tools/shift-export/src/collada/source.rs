//! `<source>`, `<input>` and `<accessor>` reading

use std::str::FromStr;

use anyhow::{Context, Result, bail};
use roxmltree::Node;

/// Element children of `node` named `name`
pub(super) fn children<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

/// First element child named `name`
pub(super) fn child<'a, 'input>(node: Node<'a, 'input>, name: &'static str) -> Option<Node<'a, 'input>> {
    children(node, name).next()
}

/// Id of a document-local reference (`#id`); `None` for external URIs
pub(super) fn local_id(reference: &str) -> Option<&str> {
    reference.strip_prefix('#').filter(|id| !id.is_empty())
}

/// Child `element` of `parent` whose `id` matches the local `reference`
pub(super) fn resolve<'a, 'input>(
    parent: Node<'a, 'input>,
    element: &'static str,
    reference: &str,
) -> Result<Node<'a, 'input>> {
    let Some(id) = local_id(reference) else {
        bail!("external source {:?} is not supported", reference);
    };
    children(parent, element)
        .find(|n| n.attribute("id") == Some(id))
        .with_context(|| format!("no local <{}> with id {:?}", element, id))
}

/// Whitespace-separated values of an element's text
pub(super) fn parse_list<T: FromStr>(node: Option<Node>) -> Result<Vec<T>> {
    let text = node.and_then(|n| n.text()).unwrap_or_default();
    text.split_whitespace()
        .map(|token| {
            token
                .parse::<T>()
                .ok()
                .with_context(|| format!("invalid value {:?}", token))
        })
        .collect()
}

fn parse_attribute<T: FromStr>(node: Node, name: &str) -> Result<Option<T>> {
    node.attribute(name)
        .map(|value| {
            value.trim().parse::<T>().ok().with_context(|| {
                format!(
                    "<{}> attribute {} has invalid value {:?}",
                    node.tag_name().name(),
                    name,
                    value
                )
            })
        })
        .transpose()
}

/// Required numeric attribute
pub(super) fn attribute<T: FromStr>(node: Node, name: &str) -> Result<T> {
    parse_attribute(node, name)?.with_context(|| {
        format!("<{}> has no {} attribute", node.tag_name().name(), name)
    })
}

/// Optional numeric attribute
pub(super) fn attribute_or<T: FromStr>(node: Node, name: &str, default: T) -> Result<T> {
    Ok(parse_attribute(node, name)?.unwrap_or(default))
}

/// A shared or unshared `<input>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Input {
    pub semantic: String,
    pub source: String,
    pub offset: usize,
    pub set: u32,
}

/// All `<input>` children of `node`
pub(super) fn inputs(node: Node) -> Result<Vec<Input>> {
    children(node, "input")
        .map(|input| {
            Ok(Input {
                semantic: input
                    .attribute("semantic")
                    .context("<input> has no semantic")?
                    .to_string(),
                source: input
                    .attribute("source")
                    .context("<input> has no source")?
                    .to_string(),
                offset: attribute_or(input, "offset", 0)?,
                set: attribute_or(input, "set", 0)?,
            })
        })
        .collect()
}

/// Number of indices per primitive corner: `max(offset) + 1`
pub(super) fn input_stride(inputs: &[Input]) -> Result<usize> {
    let Some(max) = inputs.iter().map(|i| i.offset).max() else {
        return Ok(0);
    };
    max.checked_add(1)
        .with_context(|| format!("input offset {} is out of range", max))
}

/// `<technique_common><accessor>` of a `<source>`
#[derive(Debug, Clone)]
pub(super) struct Accessor {
    pub source: String,
    pub count: usize,
    pub stride: usize,
    pub offset: usize,
    /// `type` of every `<param>`
    pub params: Vec<String>,
}

pub(super) fn accessor(source: Node) -> Result<Accessor> {
    let node = child(source, "technique_common")
        .and_then(|t| child(t, "accessor"))
        .context("source has no technique_common accessor")?;
    Ok(Accessor {
        source: node
            .attribute("source")
            .context("<accessor> has no source")?
            .to_string(),
        count: attribute(node, "count")?,
        stride: attribute_or(node, "stride", 1)?,
        offset: attribute_or(node, "offset", 0)?,
        params: children(node, "param")
            .map(|p| p.attribute("type").unwrap_or_default().to_string())
            .collect(),
    })
}

/// Float elements read through an accessor
#[derive(Debug, Clone, PartialEq)]
pub(super) struct FloatSource {
    pub values: Vec<f32>,
    pub count: usize,
    pub dimension: usize,
}

/// Read a float `<source>` with `dimension` taken from its params
pub(super) fn float_source(source: Node) -> Result<FloatSource> {
    let accessor = accessor(source)?;
    if let Some(other) = accessor.params.iter().find(|t| t.as_str() != "float") {
        bail!("accessor param type {:?} is not float", other);
    }
    read_floats(source, &accessor, accessor.params.len())
}

/// Read a float `<source>` of fixed element size (matrices, weights)
pub(super) fn float_source_sized(source: Node, dimension: usize) -> Result<FloatSource> {
    let accessor = accessor(source)?;
    read_floats(source, &accessor, dimension)
}

fn read_floats(source: Node, accessor: &Accessor, dimension: usize) -> Result<FloatSource> {
    if dimension == 0 {
        bail!("accessor declares no params");
    }
    if dimension > accessor.stride {
        bail!(
            "accessor reads {} values per element with stride {}",
            dimension,
            accessor.stride
        );
    }
    let array = resolve(source, "float_array", &accessor.source)?;
    let raw: Vec<f32> = parse_list(Some(array)).context("invalid float_array")?;

    // Last value read is element count-1 at offset + (count-1)*stride, plus dimension
    let needed = match accessor.count.checked_sub(1) {
        None => Some(0),
        Some(last) => last
            .checked_mul(accessor.stride)
            .and_then(|n| n.checked_add(accessor.offset))
            .and_then(|n| n.checked_add(dimension)),
    };
    match needed {
        Some(needed) if needed <= raw.len() => {}
        _ => bail!(
            "float_array has {} values, accessor reads {} elements of stride {} from offset {}",
            raw.len(),
            accessor.count,
            accessor.stride,
            accessor.offset
        ),
    }

    let mut values = Vec::with_capacity(accessor.count * dimension);
    for i in 0..accessor.count {
        let start = accessor.offset + i * accessor.stride;
        values.extend_from_slice(&raw[start..start + dimension]);
    }

    Ok(FloatSource {
        values,
        count: accessor.count,
        dimension,
    })
}

/// Read a `Name_array` or `IDREF_array` `<source>`
pub(super) fn name_source(source: Node) -> Result<Vec<String>> {
    let accessor = accessor(source)?;
    if accessor.stride != 1 || accessor.offset != 0 {
        bail!("name accessor must have stride 1 and offset 0");
    }
    let array = resolve(source, "Name_array", &accessor.source)
        .or_else(|_| resolve(source, "IDREF_array", &accessor.source))?;
    let names: Vec<String> = parse_list(Some(array))?;
    if names.len() < accessor.count {
        bail!(
            "name array has {} entries, accessor needs {}",
            names.len(),
            accessor.count
        );
    }
    Ok(names.into_iter().take(accessor.count).collect())
}
